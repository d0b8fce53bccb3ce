//! Basket controller: the single writer of the client-side basket view.
//!
//! Mutations are sent to the server one round trip at a time; the visible
//! state is never speculatively changed before confirmation. After every
//! mutation outcome the controller reconciles from a fresh authoritative
//! read, so displayed quantities self-heal to server truth. Rejections are
//! classified, reported once to the notification queue, and leave the
//! basket in a degraded-but-usable state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::sync::RwLock;

use storefront_client::{ApiError, BasketLine, Product, StorefrontClient};

use crate::basket::classify::{classify, RejectionKind};
use crate::basket::state::BasketState;
use crate::notifications::{NotificationQueue, Severity};
use crate::refresh::RefreshCoordinator;

const LOAD_FAILED: &str = "Failed to load basket";
const UPDATE_FAILED: &str = "Failed to update item";
const REMOVE_FAILED: &str = "Failed to remove item";
const CLEAR_FAILED: &str = "Failed to clear basket";
const ADD_FAILED: &str = "Failed to add to basket";

/// Seam over the basket endpoints, so the controller can be driven against
/// scripted implementations in tests.
#[async_trait]
pub trait BasketApi: Send + Sync {
    async fn list_basket(&self) -> Result<Vec<BasketLine>, ApiError>;
    async fn add_line(&self, product_id: i64, quantity: i32) -> Result<BasketLine, ApiError>;
    async fn set_quantity(&self, line_id: i64, quantity: i32) -> Result<BasketLine, ApiError>;
    async fn remove_line(&self, line_id: i64) -> Result<(), ApiError>;
    async fn clear(&self) -> Result<(), ApiError>;
}

#[async_trait]
impl BasketApi for StorefrontClient {
    async fn list_basket(&self) -> Result<Vec<BasketLine>, ApiError> {
        StorefrontClient::list_basket(self).await
    }

    async fn add_line(&self, product_id: i64, quantity: i32) -> Result<BasketLine, ApiError> {
        StorefrontClient::add_line(self, product_id, quantity).await
    }

    async fn set_quantity(&self, line_id: i64, quantity: i32) -> Result<BasketLine, ApiError> {
        StorefrontClient::set_quantity(self, line_id, quantity).await
    }

    async fn remove_line(&self, line_id: i64) -> Result<(), ApiError> {
        StorefrontClient::remove_line(self, line_id).await
    }

    async fn clear(&self) -> Result<(), ApiError> {
        StorefrontClient::clear_basket(self).await
    }
}

/// Owns the authoritative client-side basket view and serializes mutations
/// against the server.
///
/// Cloning yields another handle onto the same state; the controller remains
/// the only writer of the line sequence.
#[derive(Clone)]
pub struct BasketController {
    api: Arc<dyn BasketApi>,
    notifications: NotificationQueue,
    refresh: RefreshCoordinator,
    state: Arc<RwLock<BasketState>>,
    // Issue-order tickets for mutations; reconciling reads whose ticket is
    // behind the applied watermark are discarded instead of clobbering a
    // newer read.
    issued: Arc<AtomicU64>,
    applied: Arc<AtomicU64>,
}

impl BasketController {
    pub fn new(
        api: Arc<dyn BasketApi>,
        notifications: NotificationQueue,
        refresh: RefreshCoordinator,
    ) -> Self {
        Self {
            api,
            notifications,
            refresh,
            state: Arc::new(RwLock::new(BasketState::Loading)),
            issued: Arc::new(AtomicU64::new(0)),
            applied: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> BasketState {
        self.state.read().await.clone()
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn refresh(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    fn ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Full authoritative reload. Re-entered on mount and whenever the host
    /// reacts to a refresh-generation change.
    pub async fn reload(&self) {
        let ticket = self.ticket();
        *self.state.write().await = BasketState::Loading;
        self.reconcile(ticket, None).await;
    }

    /// Increase a line's quantity by one.
    pub async fn increment(&self, line_id: i64) {
        self.change_quantity(line_id, 1).await;
    }

    /// Decrease a line's quantity by one; reaching zero removes the line.
    pub async fn decrement(&self, line_id: i64) {
        self.change_quantity(line_id, -1).await;
    }

    async fn change_quantity(&self, line_id: i64, delta: i32) {
        let Some(current) = self.state.read().await.quantity_of(line_id) else {
            // Line vanished from the local view; the next authoritative read
            // will show whatever the server holds.
            debug!("Quantity change for unknown line {}, reloading", line_id);
            self.reload().await;
            return;
        };

        let new_quantity = current + delta;
        if new_quantity <= 0 {
            self.remove(line_id).await;
            return;
        }

        let ticket = self.ticket();
        match self.api.set_quantity(line_id, new_quantity).await {
            Ok(_) => {
                self.reconcile(ticket, None).await;
                self.refresh.bump();
            }
            Err(err) => self.report_and_reconcile(ticket, &err, UPDATE_FAILED).await,
        }
    }

    /// Remove a line. Succeed-or-report: the view is reconciled on either
    /// outcome.
    pub async fn remove(&self, line_id: i64) {
        let ticket = self.ticket();
        match self.api.remove_line(line_id).await {
            Ok(()) => {
                self.reconcile(ticket, None).await;
                self.refresh.bump();
            }
            Err(err) => self.report_and_reconcile(ticket, &err, REMOVE_FAILED).await,
        }
    }

    /// Clear the whole basket. Safe when already empty.
    pub async fn clear(&self) {
        let ticket = self.ticket();
        match self.api.clear().await {
            Ok(()) => {
                self.reconcile(ticket, None).await;
                self.refresh.bump();
            }
            Err(err) => self.report_and_reconcile(ticket, &err, CLEAR_FAILED).await,
        }
    }

    /// Add one unit of a product, invoked from the product list.
    ///
    /// A zero-stock product never issues a request: the rejection is known
    /// client-side and reported immediately.
    pub async fn add_to_basket(&self, product: &Product) {
        if product.stock <= 0 {
            debug!("Pre-empting add of out-of-stock product {}", product.id);
            self.notifications.push(
                RejectionKind::OutOfStock.user_message(ADD_FAILED),
                Severity::Error,
            );
            return;
        }

        let ticket = self.ticket();
        match self.api.add_line(product.id, 1).await {
            Ok(_) => {
                self.reconcile(ticket, None).await;
                self.refresh.bump();
            }
            Err(err) => self.report_and_reconcile(ticket, &err, ADD_FAILED).await,
        }
    }

    async fn report_and_reconcile(&self, ticket: u64, error: &ApiError, fallback: &str) {
        let kind = classify(error);
        let message = kind.user_message(fallback);
        warn!("Basket mutation rejected ({:?}): {}", kind, error);
        self.notifications.push(message.clone(), Severity::Error);
        self.reconcile(ticket, Some(message)).await;
    }

    /// Re-read the basket and apply the result unless a newer mutation's
    /// read already landed.
    async fn reconcile(&self, ticket: u64, degraded: Option<String>) {
        let outcome = self.api.list_basket().await;

        let mut state = self.state.write().await;
        if self.applied.fetch_max(ticket, Ordering::AcqRel) >= ticket {
            debug!("Discarding stale basket read (ticket {})", ticket);
            return;
        }

        *state = match outcome {
            Ok(lines) => match degraded {
                Some(error) => BasketState::Degraded { lines, error },
                None => BasketState::Ready { lines },
            },
            Err(err) => {
                warn!("Basket read failed: {}", err);
                BasketState::Degraded {
                    lines: Vec::new(),
                    error: LOAD_FAILED.to_string(),
                }
            }
        };
    }
}
