//! Classification of server rejections into user-facing categories.
//!
//! The primary channel is the structured `code` field of the error body.
//! Substring matching against the backend's legacy wording is kept as a
//! fallback for deployments that predate structured codes.

use storefront_client::ApiError;

/// Structured rejection codes emitted by current backends.
pub const CODE_OUT_OF_STOCK: &str = "OUT_OF_STOCK";
pub const CODE_INSUFFICIENT_STOCK: &str = "INSUFFICIENT_STOCK";

/// User-facing category of a rejected basket mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// Stock is zero; the item is completely unavailable.
    OutOfStock,
    /// Requested quantity exceeds remaining stock.
    StockExceeded,
    /// Anything else, including network failures.
    Generic,
}

impl RejectionKind {
    /// Message shown to the user; `fallback` supplies the operation-specific
    /// wording for generic failures.
    pub fn user_message(self, fallback: &str) -> String {
        match self {
            Self::OutOfStock => "This product is out of stock".to_string(),
            Self::StockExceeded => "Insufficient stock available".to_string(),
            Self::Generic => fallback.to_string(),
        }
    }
}

/// Map a rejection to exactly one category. Total: every error lands
/// somewhere, defaulting to [`RejectionKind::Generic`].
pub fn classify(error: &ApiError) -> RejectionKind {
    let ApiError::Api {
        status,
        code,
        message,
    } = error
    else {
        return RejectionKind::Generic;
    };

    if let Some(code) = code.as_deref() {
        return match code {
            CODE_OUT_OF_STOCK => RejectionKind::OutOfStock,
            CODE_INSUFFICIENT_STOCK => RejectionKind::StockExceeded,
            _ => RejectionKind::Generic,
        };
    }

    // Legacy fallback: older backends only embed a human-readable phrase in
    // the 400 body ("Only 2 available", "Cannot set quantity ...",
    // "... is out of stock").
    if *status == 400 {
        let lowered = message.to_lowercase();
        if lowered.contains("out of stock") {
            return RejectionKind::OutOfStock;
        }
        if (lowered.contains("only") && lowered.contains("available"))
            || lowered.contains("cannot set quantity")
        {
            return RejectionKind::StockExceeded;
        }
    }

    RejectionKind::Generic
}
