//! Core basket synchronization logic for the storefront UI.
//!
//! The basket controller keeps the client-visible basket consistent with
//! server-held stock truth: it serializes mutations, reconciles optimistic
//! user intent against authoritative rejections, and propagates outcomes to
//! the notification queue and the refresh channel without losing or
//! duplicating updates.

pub mod basket;
pub mod catalog;
pub mod notifications;
pub mod refresh;

pub use basket::{classify, BasketApi, BasketController, BasketState, RejectionKind};
pub use catalog::{CatalogService, ProductApi};
pub use notifications::{Notification, NotificationQueue, Severity, DISPLAY_WINDOW};
pub use refresh::{RefreshCoordinator, RefreshSignal};
