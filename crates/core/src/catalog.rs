//! Thin product catalog service.
//!
//! Product CRUD itself is plain request plumbing; the one piece of real
//! behavior here is that every successful mutation bumps the refresh
//! generation so the product list and basket view refetch.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use storefront_client::{ApiError, Product, ProductCreate, ProductUpdate, StorefrontClient};

use crate::refresh::RefreshCoordinator;

/// Seam over the product endpoints.
#[async_trait]
pub trait ProductApi: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;
    async fn get_product(&self, id: i64) -> Result<Product, ApiError>;
    async fn create_product(&self, product: ProductCreate) -> Result<Product, ApiError>;
    async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Product, ApiError>;
    async fn delete_product(&self, id: i64) -> Result<(), ApiError>;
}

#[async_trait]
impl ProductApi for StorefrontClient {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        StorefrontClient::list_products(self).await
    }

    async fn get_product(&self, id: i64) -> Result<Product, ApiError> {
        StorefrontClient::get_product(self, id).await
    }

    async fn create_product(&self, product: ProductCreate) -> Result<Product, ApiError> {
        StorefrontClient::create_product(self, product).await
    }

    async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Product, ApiError> {
        StorefrontClient::update_product(self, id, update).await
    }

    async fn delete_product(&self, id: i64) -> Result<(), ApiError> {
        StorefrontClient::delete_product(self, id).await
    }
}

/// Product catalog operations consumed by the (out-of-scope) form layer.
#[derive(Clone)]
pub struct CatalogService {
    api: Arc<dyn ProductApi>,
    refresh: RefreshCoordinator,
}

impl CatalogService {
    pub fn new(api: Arc<dyn ProductApi>, refresh: RefreshCoordinator) -> Self {
        Self { api, refresh }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.api.list_products().await
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, ApiError> {
        self.api.get_product(id).await
    }

    /// Create a product and invalidate dependent views.
    pub async fn create_product(&self, product: ProductCreate) -> Result<Product, ApiError> {
        let created = self.api.create_product(product).await?;
        debug!("Created product {}", created.id);
        self.refresh.bump();
        Ok(created)
    }

    /// Apply a partial update and invalidate dependent views.
    pub async fn update_product(
        &self,
        id: i64,
        update: ProductUpdate,
    ) -> Result<Product, ApiError> {
        let updated = self.api.update_product(id, update).await?;
        self.refresh.bump();
        Ok(updated)
    }

    /// Delete a product and invalidate dependent views.
    pub async fn delete_product(&self, id: i64) -> Result<(), ApiError> {
        self.api.delete_product(id).await?;
        self.refresh.bump();
        Ok(())
    }
}
