//! Typed request layer over the storefront inventory and basket REST API.
//!
//! This crate owns the wire types and the HTTP transport only. It performs no
//! retries and keeps no state; consistency with server truth is the job of
//! the basket controller in `storefront-core`.

mod client;
mod error;
mod types;

pub use client::StorefrontClient;
pub use error::{ApiError, Result};
pub use types::*;
