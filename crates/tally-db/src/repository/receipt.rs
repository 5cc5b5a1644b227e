//! # Receipt Repository
//!
//! Stores receipts with their tax detail exactly as computed at checkout.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(cart_items, discount)                                           │
//! │     │                                                                   │
//! │     ├── calculate_cart_summary / generate_tax_breakdown (tally-core)    │
//! │     │                                                                   │
//! │     └── BEGIN IMMEDIATE                                                 │
//! │           ├── bump receipt_counters for today                           │
//! │           ├── INSERT receipts               (totals)                    │
//! │           ├── INSERT receipt_items × N      (per-line tax detail)       │
//! │           ├── INSERT receipt_tax_breakdown  (one row per rate)          │
//! │         COMMIT                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is recomputed on read: a receipt loads back with the same amounts
//! it was printed with, even if a phone's tax configuration changed since.
//!
//! Receipt numbers come from a per-day counter that only grows, so a deleted
//! receipt's number is never issued again. The write lock is taken at
//! `BEGIN IMMEDIATE`, before the counter is read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tally_core::validation::{validate_cart_size, validate_discount};
use tally_core::{
    calculate_cart_summary, cart_items_to_receipt_items, generate_tax_breakdown, CartItem,
    CartSummary, Money, ReceiptItem, TaxBreakdownEntry, ValidationError,
};

// =============================================================================
// Stored Types
// =============================================================================

/// Receipt header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: String,
    /// `YYYYMMDD-NNNN`, sequential per day.
    pub receipt_number: String,
    pub subtotal: Money,
    pub total_tax: Money,
    pub grand_total: Money,
    pub discount_amount: Money,
    pub final_total: Money,
    pub total_cost: Money,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A receipt with its lines and per-rate breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReceipt {
    pub receipt: Receipt,
    pub items: Vec<ReceiptItem>,
    /// Sorted ascending by rate.
    pub tax_breakdown: Vec<TaxBreakdownEntry>,
}

impl StoredReceipt {
    /// Totals in the same shape the cart screen shows.
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            subtotal: self.receipt.subtotal,
            tax_amount: self.receipt.total_tax,
            grand_total: self.receipt.grand_total,
            total_cost: self.receipt.total_cost,
            total_profit: self.receipt.subtotal - self.receipt.total_cost,
            item_count: self.receipt.item_count,
            discount_amount: self.receipt.discount_amount,
            final_total: self.receipt.final_total,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for receipt database operations.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: SqlitePool,
}

impl ReceiptRepository {
    /// Creates a new ReceiptRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReceiptRepository { pool }
    }

    /// Computes and stores a receipt for `items` in one transaction.
    ///
    /// ## Errors
    /// * `DbError::Core` - empty or oversized cart, or a discount that is
    ///   negative or larger than the grand total
    pub async fn create(&self, items: &[CartItem], discount: Money) -> DbResult<StoredReceipt> {
        if items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            }
            .into());
        }
        validate_cart_size(items.len())?;

        let summary = calculate_cart_summary(items);
        validate_discount(discount, summary.grand_total)?;
        let summary = summary.with_discount(discount);

        let receipt_items = cart_items_to_receipt_items(items);
        let tax_breakdown = generate_tax_breakdown(items);

        let now = Utc::now();
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;
        let receipt_number = next_receipt_number(&mut tx, now).await?;

        let receipt = Receipt {
            id: Uuid::new_v4().to_string(),
            receipt_number,
            subtotal: summary.subtotal,
            total_tax: summary.tax_amount,
            grand_total: summary.grand_total,
            discount_amount: summary.discount_amount,
            final_total: summary.final_total,
            total_cost: summary.total_cost,
            item_count: summary.item_count,
            created_at: now,
        };

        debug!(
            id = %receipt.id,
            receipt_number = %receipt.receipt_number,
            lines = items.len(),
            "Creating receipt"
        );

        sqlx::query(
            r#"
            INSERT INTO receipts (
                id, receipt_number, subtotal, total_tax, grand_total,
                discount_amount, final_total, total_cost, item_count, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&receipt.id)
        .bind(&receipt.receipt_number)
        .bind(receipt.subtotal)
        .bind(receipt.total_tax)
        .bind(receipt.grand_total)
        .bind(receipt.discount_amount)
        .bind(receipt.final_total)
        .bind(receipt.total_cost)
        .bind(receipt.item_count)
        .bind(receipt.created_at)
        .execute(&mut *tx)
        .await?;

        for (line_number, (cart_item, line)) in items.iter().zip(&receipt_items).enumerate() {
            sqlx::query(
                r#"
                INSERT INTO receipt_items (
                    id, receipt_id, line_number, product_id, name, quantity,
                    unit_price, base_price, tax_amount, total, tax_rate, is_tax_exempt
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&receipt.id)
            .bind(line_number as i64 + 1)
            .bind(&cart_item.product_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.base_price)
            .bind(line.tax_amount)
            .bind(line.total)
            .bind(line.tax_rate)
            .bind(line.is_tax_exempt)
            .execute(&mut *tx)
            .await?;
        }

        for entry in &tax_breakdown {
            sqlx::query(
                r#"
                INSERT INTO receipt_tax_breakdown (
                    receipt_id, tax_rate, taxable_amount, tax_amount, item_count
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&receipt.id)
            .bind(entry.tax_rate)
            .bind(entry.taxable_amount)
            .bind(entry.tax_amount)
            .bind(entry.item_count)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            receipt_number = %receipt.receipt_number,
            grand_total = receipt.grand_total.cents(),
            total_tax = receipt.total_tax.cents(),
            rates = tax_breakdown.len(),
            "Receipt stored"
        );

        Ok(StoredReceipt {
            receipt,
            items: receipt_items,
            tax_breakdown,
        })
    }

    /// Loads a receipt by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StoredReceipt>> {
        let receipt = sqlx::query_as::<_, Receipt>(
            r#"
            SELECT id, receipt_number, subtotal, total_tax, grand_total,
                   discount_amount, final_total, total_cost, item_count, created_at
            FROM receipts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match receipt {
            Some(receipt) => self.load_detail(receipt).await.map(Some),
            None => Ok(None),
        }
    }

    /// Loads a receipt by its printed number.
    pub async fn get_by_number(&self, receipt_number: &str) -> DbResult<Option<StoredReceipt>> {
        let id: Option<String> =
            sqlx::query_scalar("SELECT id FROM receipts WHERE receipt_number = ?1")
                .bind(receipt_number)
                .fetch_optional(&self.pool)
                .await?;

        match id {
            Some(id) => self.get_by_id(&id).await,
            None => Ok(None),
        }
    }

    /// Deletes a receipt and, by cascade, its lines and breakdown.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM receipts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Receipt", id));
        }
        Ok(())
    }

    async fn load_detail(&self, receipt: Receipt) -> DbResult<StoredReceipt> {
        let items = sqlx::query_as::<_, ReceiptItem>(
            r#"
            SELECT name, quantity, unit_price, total, tax_rate, tax_amount, base_price, is_tax_exempt
            FROM receipt_items
            WHERE receipt_id = ?1
            ORDER BY line_number
            "#,
        )
        .bind(&receipt.id)
        .fetch_all(&self.pool)
        .await?;

        let tax_breakdown = sqlx::query_as::<_, TaxBreakdownEntry>(
            r#"
            SELECT tax_rate, taxable_amount, tax_amount, item_count
            FROM receipt_tax_breakdown
            WHERE receipt_id = ?1
            ORDER BY tax_rate
            "#,
        )
        .bind(&receipt.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(StoredReceipt {
            receipt,
            items,
            tax_breakdown,
        })
    }
}

/// Next `YYYYMMDD-NNNN` number from today's counter.
async fn next_receipt_number(
    tx: &mut Transaction<'_, Sqlite>,
    now: DateTime<Utc>,
) -> DbResult<String> {
    let day = now.format("%Y%m%d").to_string();

    let number: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO receipt_counters (day, last_number) VALUES (?1, 1)
        ON CONFLICT (day) DO UPDATE SET last_number = last_number + 1
        RETURNING last_number
        "#,
    )
    .bind(&day)
    .fetch_one(&mut **tx)
    .await?;

    Ok(format!("{}-{:04}", day, number))
}

// =============================================================================
// Unit Tests
// =============================================================================
