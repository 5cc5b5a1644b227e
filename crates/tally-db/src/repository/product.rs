//! # Product Repository
//!
//! Database operations for phones and their tax configuration.
//!
//! ## Tax Configuration Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UpdatePhoneTaxConfig { taxRate: 750, isTaxInclusive: -, isTaxExempt: - }│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE products SET                                                    │
//! │      tax_rate         = COALESCE(750,  tax_rate),                       │
//! │      is_tax_inclusive = COALESCE(NULL, is_tax_inclusive),  ← kept       │
//! │      is_tax_exempt    = COALESCE(NULL, is_tax_exempt)      ← kept       │
//! │  RETURNING tax_rate, is_tax_inclusive, is_tax_exempt                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TaxConfig { 750, false, false }   (or None: no such phone)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::source::ProductSource;
use tally_core::dto::UpdatePhoneTaxConfig;
use tally_core::validation::{
    validate_imei, validate_model_name, validate_price, validate_product_id, validate_tax_rate,
};
use tally_core::{Product, ProductStatus, TaxConfig};

const PRODUCT_COLUMNS: &str = "id, brand_name, model, storage_gb, color, condition, imei, \
     cost_price, selling_price, tax_rate, is_tax_inclusive, is_tax_exempt, \
     status, created_at, updated_at";

/// Repository for phone database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// repo.insert(&phone).await?;
/// let config = repo.get_tax_config(&phone.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a phone after validating its fields.
    ///
    /// ## Errors
    /// * `DbError::Core` - a field failed validation
    /// * `DbError::UniqueViolation` - the id or IMEI is already on file
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        validate_product_id(&product.id)?;
        validate_model_name("brandName", &product.brand_name)?;
        validate_model_name("model", &product.model)?;
        if let Some(imei) = &product.imei {
            validate_imei(imei)?;
        }
        validate_price("costPrice", product.cost_price)?;
        validate_price("sellingPrice", product.selling_price)?;
        validate_tax_rate(product.tax_rate)?;

        debug!(id = %product.id, model = %product.model, "Inserting phone");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, brand_name, model, storage_gb, color, condition, imei,
                cost_price, selling_price, tax_rate, is_tax_inclusive, is_tax_exempt,
                status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&product.id)
        .bind(&product.brand_name)
        .bind(&product.model)
        .bind(product.storage_gb)
        .bind(&product.color)
        .bind(product.condition)
        .bind(&product.imei)
        .bind(product.cost_price)
        .bind(product.selling_price)
        .bind(product.tax_rate)
        .bind(product.is_tax_inclusive)
        .bind(product.is_tax_exempt)
        .bind(product.status)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } if field.ends_with("imei") => {
                DbError::duplicate("imei", product.imei.clone().unwrap_or_default())
            }
            DbError::UniqueViolation { field, .. } if field.ends_with("id") => {
                DbError::duplicate("id", product.id.clone())
            }
            other => other,
        })?;

        Ok(())
    }

    /// Gets a phone by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Phone found
    /// * `Ok(None)` - Phone not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists phones ordered by brand then model.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products ORDER BY brand_name, model, id LIMIT ?1",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Counts all phones.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Gets a phone's tax configuration without loading the whole row.
    pub async fn get_tax_config(&self, id: &str) -> DbResult<Option<TaxConfig>> {
        let config = sqlx::query_as::<_, TaxConfig>(
            "SELECT tax_rate, is_tax_inclusive, is_tax_exempt FROM products WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }

    /// Applies a partial tax update in one statement.
    ///
    /// Returns the configuration after the update, or `None` when no phone
    /// has this id. An empty update reads the current configuration.
    pub async fn update_tax_config(
        &self,
        id: &str,
        update: &UpdatePhoneTaxConfig,
    ) -> DbResult<Option<TaxConfig>> {
        if let Some(rate) = update.tax_rate {
            validate_tax_rate(rate)?;
        }

        if update.is_empty() {
            return self.get_tax_config(id).await;
        }

        let config = sqlx::query_as::<_, TaxConfig>(
            r#"
            UPDATE products SET
                tax_rate = COALESCE(?2, tax_rate),
                is_tax_inclusive = COALESCE(?3, is_tax_inclusive),
                is_tax_exempt = COALESCE(?4, is_tax_exempt),
                updated_at = ?5
            WHERE id = ?1
            RETURNING tax_rate, is_tax_inclusive, is_tax_exempt
            "#,
        )
        .bind(id)
        .bind(update.tax_rate)
        .bind(update.is_tax_inclusive)
        .bind(update.is_tax_exempt)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(config) = &config {
            info!(
                id = %id,
                tax_rate_bps = config.tax_rate.bps(),
                inclusive = config.is_tax_inclusive,
                exempt = config.is_tax_exempt,
                "Phone tax configuration updated"
            );
        }

        Ok(config)
    }

    /// Sets a phone's inventory status. Returns false when no phone matched.
    pub async fn set_status(&self, id: &str, status: ProductStatus) -> DbResult<bool> {
        let result = sqlx::query("UPDATE products SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProductSource for ProductRepository {
    async fn find_product(&self, id: &str) -> DbResult<Option<Product>> {
        self.get_by_id(id).await
    }

    async fn update_tax_config(
        &self,
        id: &str,
        update: &UpdatePhoneTaxConfig,
    ) -> DbResult<Option<TaxConfig>> {
        ProductRepository::update_tax_config(self, id, update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use tally_core::{Money, ProductCondition, TaxRate};
    use uuid::Uuid;

    fn phone(model: &str, imei: Option<&str>) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            brand_name: "Samsung".to_string(),
            model: model.to_string(),
            storage_gb: Some(256),
            color: Some("Graphite".to_string()),
            condition: ProductCondition::Refurbished,
            imei: imei.map(str::to_string),
            cost_price: Money::from_cents(60_000),
            selling_price: Money::from_cents(84_999),
            tax_rate: TaxRate::from_bps(825),
            is_tax_inclusive: true,
            is_tax_exempt: false,
            status: ProductStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    async fn repo() -> ProductRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().products()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = repo().await;
        let product = phone("Galaxy S23", Some("356938035643809"));
        repo.insert(&product).await.unwrap();

        let loaded = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.model, "Galaxy S23");
        assert_eq!(loaded.condition, ProductCondition::Refurbished);
        assert_eq!(loaded.selling_price, Money::from_cents(84_999));
        assert_eq!(loaded.tax_rate, TaxRate::from_bps(825));
        assert!(loaded.is_tax_inclusive);
        assert_eq!(loaded.status, ProductStatus::Available);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_fields() {
        let repo = repo().await;

        let mut bad = phone("Galaxy S23", Some("1234"));
        assert!(matches!(repo.insert(&bad).await, Err(DbError::Core(_))));

        bad.imei = None;
        bad.tax_rate = TaxRate::from_bps(10_001);
        assert!(matches!(repo.insert(&bad).await, Err(DbError::Core(_))));

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_imei() {
        let repo = repo().await;
        repo.insert(&phone("Galaxy S23", Some("356938035643809"))).await.unwrap();

        let err = repo
            .insert(&phone("Galaxy S24", Some("356938035643809")))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "imei"));
    }

    #[tokio::test]
    async fn test_list_orders_by_model() {
        let repo = repo().await;
        repo.insert(&phone("Galaxy S24", None)).await.unwrap();
        repo.insert(&phone("Galaxy A54", None)).await.unwrap();

        let models: Vec<String> = repo.list(10).await.unwrap().into_iter().map(|p| p.model).collect();
        assert_eq!(models, vec!["Galaxy A54", "Galaxy S24"]);
        assert_eq!(repo.list(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_tax_config_is_partial() {
        let repo = repo().await;
        let product = phone("Galaxy S23", None);
        repo.insert(&product).await.unwrap();

        let update = UpdatePhoneTaxConfig {
            tax_rate: Some(TaxRate::from_bps(1000)),
            ..Default::default()
        };
        let config = repo.update_tax_config(&product.id, &update).await.unwrap().unwrap();
        assert_eq!(config.tax_rate, TaxRate::from_bps(1000));
        assert!(config.is_tax_inclusive);
        assert!(!config.is_tax_exempt);

        let stored = repo.get_tax_config(&product.id).await.unwrap().unwrap();
        assert_eq!(stored, config);

        let unchanged = repo
            .update_tax_config(&product.id, &UpdatePhoneTaxConfig::default())
            .await
            .unwrap();
        assert_eq!(unchanged, Some(config));
    }

    #[tokio::test]
    async fn test_update_tax_config_missing_phone() {
        let repo = repo().await;
        let update = UpdatePhoneTaxConfig {
            is_tax_exempt: Some(true),
            ..Default::default()
        };
        assert!(repo.update_tax_config("missing", &update).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_status() {
        let repo = repo().await;
        let product = phone("Galaxy S23", None);
        repo.insert(&product).await.unwrap();

        assert!(repo.set_status(&product.id, ProductStatus::Sold).await.unwrap());
        let loaded = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert!(!loaded.can_sell());

        assert!(!repo.set_status("missing", ProductStatus::Sold).await.unwrap());
    }
}
