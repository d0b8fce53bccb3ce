//! Basket domain: view state, rejection classification, and the controller.

mod classify;
mod controller;
mod state;

pub use classify::{classify, RejectionKind, CODE_INSUFFICIENT_STOCK, CODE_OUT_OF_STOCK};
pub use controller::{BasketApi, BasketController};
pub use state::BasketState;
