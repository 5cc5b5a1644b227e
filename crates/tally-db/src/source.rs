//! # Product Source
//!
//! The product lookup the tax service depends on.
//!
//! ```text
//! TaxService<P: ProductSource>
//!        │
//!        ├── ProductRepository   (SQLite, production)
//!        └── InMemoryProducts    (HashMap, tests and demos)
//! ```
//!
//! The service is handed its source at construction, so tax calculations
//! can run against a fixed set of phones without opening a database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tally_core::dto::UpdatePhoneTaxConfig;
use tally_core::{Product, TaxConfig};
use tokio::sync::RwLock;

use crate::error::DbResult;

/// Looks up phones and updates their tax configuration.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Returns the phone with this id, if any.
    async fn find_product(&self, id: &str) -> DbResult<Option<Product>>;

    /// Applies a partial tax update and returns the resulting configuration,
    /// or `None` when the phone does not exist.
    async fn update_tax_config(
        &self,
        id: &str,
        update: &UpdatePhoneTaxConfig,
    ) -> DbResult<Option<TaxConfig>>;
}

/// Phones held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProducts {
    products: Arc<RwLock<HashMap<String, Product>>>,
}

impl InMemoryProducts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a source holding `products`, keyed by id.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let map = products
            .into_iter()
            .map(|product| (product.id.clone(), product))
            .collect();
        InMemoryProducts {
            products: Arc::new(RwLock::new(map)),
        }
    }

    /// Adds or replaces a phone.
    pub async fn insert(&self, product: Product) {
        self.products.write().await.insert(product.id.clone(), product);
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }
}

#[async_trait]
impl ProductSource for InMemoryProducts {
    async fn find_product(&self, id: &str) -> DbResult<Option<Product>> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn update_tax_config(
        &self,
        id: &str,
        update: &UpdatePhoneTaxConfig,
    ) -> DbResult<Option<TaxConfig>> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(id) else {
            return Ok(None);
        };

        let next = update.apply(product.tax_config());
        product.tax_rate = next.tax_rate;
        product.is_tax_inclusive = next.is_tax_inclusive;
        product.is_tax_exempt = next.is_tax_exempt;
        product.updated_at = Utc::now();

        Ok(Some(next))
    }
}
