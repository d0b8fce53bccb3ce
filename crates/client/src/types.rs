//! Wire types for the storefront REST API.
//!
//! Field names follow the backend's snake_case JSON, so no serde renames
//! are needed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog product as returned by the inventory API.
///
/// `stock` is server-held ground truth; it can change between any two
/// observations and is never adjusted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub stock: i32,
}

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub stock: i32,
}

/// Partial update payload; unset fields are omitted from the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
}

/// One basket entry associating a product with a quantity.
///
/// `product` is a snapshot embedded by the server at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketLine {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub product: Product,
}

/// Payload for adding a product to the basket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBasketLine {
    pub product_id: i64,
    pub quantity: i32,
}

/// Payload for replacing a line's quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityUpdate {
    pub quantity: i32,
}

/// Error body returned by the API on rejections.
///
/// `code` is the structured rejection channel (e.g. `OUT_OF_STOCK`,
/// `INSUFFICIENT_STOCK`); `detail` carries the human-readable phrase that
/// older backend versions emit alone.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub detail: Option<String>,
    pub code: Option<String>,
}
