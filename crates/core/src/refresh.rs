//! Coarse invalidation channel for dependent views.
//!
//! A single monotonic generation counter signals "discard held data and
//! refetch" to every subscriber. Consumers only react to the value changing;
//! they never inspect its magnitude. The channel replaces remount-by-key
//! invalidation so subscribers can refetch without discarding unrelated
//! local UI state.

use std::sync::Arc;

use tokio::sync::watch;

/// Monotonically increasing refresh generation, written only by mutation
/// outcomes and shared-read by all views.
#[derive(Debug, Clone)]
pub struct RefreshCoordinator {
    tx: Arc<watch::Sender<u64>>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Bump the generation, waking every subscriber.
    pub fn bump(&self) {
        self.tx.send_modify(|generation| *generation += 1);
    }

    /// Current generation value.
    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Subscribe to future invalidations.
    pub fn subscribe(&self) -> RefreshSignal {
        RefreshSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of the invalidation channel.
///
/// Rapid bumps coalesce: a subscriber that was busy sees one wake-up with
/// the latest generation, which is exactly the refetch-from-scratch
/// contract.
#[derive(Debug)]
pub struct RefreshSignal {
    rx: watch::Receiver<u64>,
}

impl RefreshSignal {
    /// Wait for the next invalidation. Returns the new generation, or `None`
    /// once the coordinator has been dropped.
    pub async fn invalidated(&mut self) -> Option<u64> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    /// Latest generation observed by this subscriber.
    pub fn generation(&self) -> u64 {
        *self.rx.borrow()
    }
}
