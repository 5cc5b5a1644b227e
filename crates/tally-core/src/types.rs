//! # Domain Types
//!
//! Core domain types used throughout Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartItem     │   │  ReceiptItem    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │──►│  product_id     │──►│  name           │       │
//! │  │  brand / model  │   │  sale_price     │   │  total          │       │
//! │  │  selling_price  │   │  base_price     │   │  base_price     │       │
//! │  │  tax profile    │   │  tax_amount     │   │  tax_amount     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │ProductCondition │   │ ProductStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  New            │   │  Available      │       │
//! │  │  750 = 7.5%     │   │  Used           │   │  Reserved       │       │
//! │  └─────────────────┘   │  Refurbished    │   │  Sold           │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `CartItem` copies the product's price and tax profile when it is created,
//! so a later price change never alters an open cart or an issued receipt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::tax::{calculate_item_tax, TaxLineInput};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%. 1000 bps = 10%, 750 bps = 7.5%.
/// Integer bps keep rates hashable and exact, so cart breakdown buckets keyed
/// by rate never split on float noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (`7.5` → 750 bps).
    ///
    /// Negative and non-numeric percentages clamp to zero, so a bad product
    /// record degrades to "no tax" instead of a negative tax line.
    pub fn from_percentage(pct: f64) -> Self {
        if pct.is_nan() || pct <= 0.0 {
            return TaxRate::zero();
        }
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

/// Shortest decimal form of the percentage, without the `%` sign.
///
/// ```text
/// 1000 → "10"    750 → "7.5"    825 → "8.25"    0 → "0"
/// ```
impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let fraction = self.0 % 100;

        if fraction == 0 {
            write!(f, "{}", whole)
        } else if fraction % 10 == 0 {
            write!(f, "{}.{}", whole, fraction / 10)
        } else {
            write!(f, "{}.{:02}", whole, fraction)
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// Physical condition of a handset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductCondition {
    New,
    Used,
    Refurbished,
}

impl Default for ProductCondition {
    fn default() -> Self {
        ProductCondition::New
    }
}

impl fmt::Display for ProductCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductCondition::New => write!(f, "new"),
            ProductCondition::Used => write!(f, "used"),
            ProductCondition::Refurbished => write!(f, "refurbished"),
        }
    }
}

/// Inventory status of a single unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// On the shelf and sellable.
    Available,
    /// Held for a customer.
    Reserved,
    /// Already sold.
    Sold,
}

impl Default for ProductStatus {
    fn default() -> Self {
        ProductStatus::Available
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductStatus::Available => write!(f, "available"),
            ProductStatus::Reserved => write!(f, "reserved"),
            ProductStatus::Sold => write!(f, "sold"),
        }
    }
}

/// A phone in stock.
///
/// Each row is one physical unit (it may carry an IMEI), which is why cart
/// lines for handsets always have quantity 1.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub brand_name: String,

    pub model: String,

    pub storage_gb: Option<i64>,

    pub color: Option<String>,

    pub condition: ProductCondition,

    /// 15-digit device identifier, when known.
    pub imei: Option<String>,

    /// What the shop paid (profit calculations).
    pub cost_price: Money,

    /// Shelf price. Whether it contains tax depends on `is_tax_inclusive`.
    pub selling_price: Money,

    pub tax_rate: TaxRate,

    /// `selling_price` already contains tax.
    pub is_tax_inclusive: bool,

    /// No tax applies, whatever `tax_rate` says.
    pub is_tax_exempt: bool,

    pub status: ProductStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the product's tax configuration.
    pub fn tax_config(&self) -> TaxConfig {
        TaxConfig {
            tax_rate: self.tax_rate,
            is_tax_inclusive: self.is_tax_inclusive,
            is_tax_exempt: self.is_tax_exempt,
        }
    }

    /// Display name used on receipts: `"Apple iPhone 15 Pro 256GB"`.
    pub fn display_name(&self) -> String {
        receipt_name(&self.brand_name, &self.model, self.storage_gb)
    }

    /// Checks whether this unit can be put in a cart.
    pub fn can_sell(&self) -> bool {
        self.status == ProductStatus::Available
    }
}

/// The three fields that decide how a product is taxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxConfig {
    pub tax_rate: TaxRate,
    pub is_tax_inclusive: bool,
    pub is_tax_exempt: bool,
}

impl TaxConfig {
    /// Builds a one-unit tax line for `unit_price` under this configuration.
    pub fn line(&self, unit_price: Money) -> TaxLineInput {
        TaxLineInput {
            unit_price,
            tax_rate: self.tax_rate,
            is_tax_inclusive: self.is_tax_inclusive,
            is_tax_exempt: self.is_tax_exempt,
            quantity: 1,
        }
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// A handset in the cart, frozen at the moment it was added.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub brand_name: String,
    pub model: String,
    pub storage_gb: Option<i64>,
    pub color: Option<String>,
    pub condition: ProductCondition,
    pub imei: Option<String>,
    pub cost_price: Money,
    /// List price at the time of adding.
    pub selling_price: Money,
    /// Price actually charged (may be negotiated below the list price).
    pub sale_price: Money,
    pub tax_rate: TaxRate,
    pub is_tax_inclusive: bool,
    pub is_tax_exempt: bool,
    /// Pre-tax value of `sale_price`.
    pub base_price: Money,
    pub tax_amount: Money,
}

impl CartItem {
    /// Snapshots a product into a cart line, computing its tax split.
    ///
    /// `sale_price` overrides the shelf price when the cashier negotiated.
    pub fn from_product(product: &Product, sale_price: Option<Money>) -> Self {
        let price = sale_price.unwrap_or(product.selling_price);
        let calc = calculate_item_tax(
            price,
            product.tax_rate,
            product.is_tax_inclusive,
            product.is_tax_exempt,
            1,
        );

        CartItem {
            product_id: product.id.clone(),
            brand_name: product.brand_name.clone(),
            model: product.model.clone(),
            storage_gb: product.storage_gb,
            color: product.color.clone(),
            condition: product.condition,
            imei: product.imei.clone(),
            cost_price: product.cost_price,
            selling_price: product.selling_price,
            sale_price: price,
            tax_rate: product.tax_rate,
            is_tax_inclusive: product.is_tax_inclusive,
            is_tax_exempt: product.is_tax_exempt,
            base_price: calc.base_price,
            tax_amount: calc.tax_amount,
        }
    }

    /// The tax line for this cart entry (always one unit).
    pub fn tax_line(&self) -> TaxLineInput {
        TaxLineInput {
            unit_price: self.sale_price,
            tax_rate: self.tax_rate,
            is_tax_inclusive: self.is_tax_inclusive,
            is_tax_exempt: self.is_tax_exempt,
            quantity: 1,
        }
    }

    /// Receipt display name.
    pub fn display_name(&self) -> String {
        receipt_name(&self.brand_name, &self.model, self.storage_gb)
    }
}

// =============================================================================
// Receipt Item
// =============================================================================

/// A line as printed on (and stored with) a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    /// Tax-inclusive line total.
    pub total: Money,
    pub tax_rate: TaxRate,
    pub tax_amount: Money,
    pub base_price: Money,
    pub is_tax_exempt: bool,
}

fn receipt_name(brand: &str, model: &str, storage_gb: Option<i64>) -> String {
    match storage_gb {
        Some(gb) if gb > 0 => format!("{} {} {}GB", brand, model, gb),
        _ => format!("{} {}", brand, model),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        let now = Utc::now();
        Product {
            id: "test-product-1".to_string(),
            brand_name: "Apple".to_string(),
            model: "iPhone 15 Pro".to_string(),
            storage_gb: Some(256),
            color: Some("Black".to_string()),
            condition: ProductCondition::New,
            imei: Some("123456789012345".to_string()),
            cost_price: Money::from_cents(90_000),
            selling_price: Money::from_cents(120_000),
            tax_rate: TaxRate::from_bps(1000),
            is_tax_inclusive: false,
            is_tax_exempt: false,
            status: ProductStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
        assert_eq!(TaxRate::from_percentage(7.5).bps(), 750);
        assert_eq!(TaxRate::from_percentage(-5.0).bps(), 0);
        assert_eq!(TaxRate::from_percentage(f64::NAN).bps(), 0);
    }

    #[test]
    fn test_tax_rate_display_is_minimal() {
        assert_eq!(TaxRate::from_bps(1000).to_string(), "10");
        assert_eq!(TaxRate::from_bps(750).to_string(), "7.5");
        assert_eq!(TaxRate::from_bps(825).to_string(), "8.25");
        assert_eq!(TaxRate::from_bps(5).to_string(), "0.05");
        assert_eq!(TaxRate::zero().to_string(), "0");
    }

    #[test]
    fn test_cart_item_from_product() {
        let mut product = sample_product();
        product.brand_name = "Samsung".to_string();
        product.model = "Galaxy S24".to_string();
        product.selling_price = Money::from_cents(90_000);
        product.tax_rate = TaxRate::from_bps(800);

        let item = CartItem::from_product(&product, None);
        assert_eq!(item.sale_price.cents(), 90_000);
        assert_eq!(item.base_price.cents(), 90_000);
        assert_eq!(item.tax_amount.cents(), 7_200);

        let negotiated = CartItem::from_product(&product, Some(Money::from_cents(80_000)));
        assert_eq!(negotiated.sale_price.cents(), 80_000);
        assert_eq!(negotiated.selling_price.cents(), 90_000);
        assert_eq!(negotiated.tax_amount.cents(), 6_400);
    }

    #[test]
    fn test_display_name() {
        let mut product = sample_product();
        assert_eq!(product.display_name(), "Apple iPhone 15 Pro 256GB");

        product.storage_gb = None;
        assert_eq!(product.display_name(), "Apple iPhone 15 Pro");
    }

    #[test]
    fn test_can_sell() {
        let mut product = sample_product();
        assert!(product.can_sell());
        product.status = ProductStatus::Sold;
        assert!(!product.can_sell());
    }
}
