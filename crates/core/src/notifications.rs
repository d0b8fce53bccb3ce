//! Time-boxed queue of user-facing messages.
//!
//! Notifications are appended in insertion order (which is the display
//! order), auto-expire after a fixed window, and can be dismissed earlier by
//! the user. The queue exclusively owns its set; other components hold
//! cheap clones of the handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// How long a notification stays visible unless dismissed first.
pub const DISPLAY_WINDOW: Duration = Duration::from_secs(4);

/// Message severity, mirrored into the UI styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

/// One queued user-facing message.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

/// FIFO-rendered, auto-expiring notification queue.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    active: Arc<Mutex<Vec<Notification>>>,
    next_id: Arc<AtomicU64>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self {
            active: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Insert a message at the tail and schedule its automatic dismissal
    /// after [`DISPLAY_WINDOW`].
    pub fn push(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification {
            id,
            message: message.into(),
            severity,
            created_at: Utc::now(),
        };

        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);

        let queue = self.clone();
        // Measure the window from push time, not from the task's first poll,
        // so a delayed poll cannot extend the notification's lifetime.
        let deadline = tokio::time::Instant::now() + DISPLAY_WINDOW;
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            queue.dismiss(id);
        });

        id
    }

    /// Remove a notification. Dismissing an id that already expired or was
    /// dismissed is a no-op, so the timer and a manual close cannot race
    /// into an error.
    pub fn dismiss(&self, id: u64) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|notification| notification.id != id);
    }

    /// Currently visible notifications in insertion order.
    pub fn active(&self) -> Vec<Notification> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}
