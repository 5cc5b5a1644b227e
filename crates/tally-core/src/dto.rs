//! # Transfer Objects
//!
//! Request and response shapes for the tax endpoints, serialized in
//! camelCase and exported to TypeScript via `ts-rs`.
//!
//! Amounts travel as integer cents and rates as basis points, the same as
//! [`Money`] and [`TaxRate`] everywhere else.
//!
//! ```text
//! CalculatePhoneTaxRequest ──► TaxService ──► CalculatePhoneTaxResponse
//! CalculateCartTaxRequest  ──► TaxService ──► CalculateCartTaxResponse
//!                                               └── items: CartItemWithTax[]
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{CartTaxSummary, TaxBreakdownEntry};
use crate::money::Money;
use crate::tax::{
    calculate_tax_from_exclusive_price, calculate_tax_from_inclusive_price, ItemTaxCalculation,
};
use crate::types::{Product, TaxConfig, TaxRate};

// =============================================================================
// Single Phone
// =============================================================================

/// Tax for one phone, optionally at a negotiated price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculatePhoneTaxRequest {
    pub phone_id: String,
    #[serde(default)]
    pub override_price: Option<Money>,
    /// Defaults to 1.
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl CalculatePhoneTaxRequest {
    pub fn quantity(&self) -> i64 {
        self.quantity.unwrap_or(1)
    }
}

/// Per-line tax detail for a phone.
///
/// Used both as the single-phone response and as a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculatePhoneTaxResponse {
    pub phone_id: String,
    pub phone_name: String,
    pub brand_name: String,
    /// Price the calculation started from (override or shelf price).
    pub unit_price: Money,
    pub unit_base_price: Money,
    pub unit_tax_amount: Money,
    pub total_base_price: Money,
    pub total_tax_amount: Money,
    pub total_price: Money,
    pub tax_rate: TaxRate,
    pub is_tax_inclusive: bool,
    pub is_tax_exempt: bool,
    pub quantity: i64,
}

/// A cart line in [`CalculateCartTaxResponse`].
pub type CartItemWithTax = CalculatePhoneTaxResponse;

impl CalculatePhoneTaxResponse {
    /// Combines a product with its computed tax.
    ///
    /// Rate and exemption come from `calc`, so an exempt phone reports 0%.
    pub fn from_calculation(product: &Product, unit_price: Money, calc: &ItemTaxCalculation) -> Self {
        CalculatePhoneTaxResponse {
            phone_id: product.id.clone(),
            phone_name: product.model.clone(),
            brand_name: product.brand_name.clone(),
            unit_price,
            unit_base_price: calc.unit_base_price,
            unit_tax_amount: calc.unit_tax_amount,
            total_base_price: calc.base_price,
            total_tax_amount: calc.tax_amount,
            total_price: calc.total_price,
            tax_rate: calc.tax_rate,
            is_tax_inclusive: product.is_tax_inclusive,
            is_tax_exempt: calc.is_tax_exempt,
            quantity: calc.quantity,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One requested cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTaxRequestItem {
    pub phone_id: String,
    #[serde(default)]
    pub override_price: Option<Money>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl CartTaxRequestItem {
    pub fn quantity(&self) -> i64 {
        self.quantity.unwrap_or(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculateCartTaxRequest {
    pub items: Vec<CartTaxRequestItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculateCartTaxResponse {
    pub items: Vec<CartItemWithTax>,
    pub subtotal: Money,
    pub total_tax: Money,
    pub grand_total: Money,
    pub tax_breakdown: Vec<TaxBreakdownEntry>,
}

impl CalculateCartTaxResponse {
    /// Pairs the aggregated totals with the per-line detail.
    pub fn new(items: Vec<CartItemWithTax>, summary: CartTaxSummary) -> Self {
        CalculateCartTaxResponse {
            items,
            subtotal: summary.subtotal,
            total_tax: summary.total_tax,
            grand_total: summary.grand_total,
            tax_breakdown: summary.tax_breakdown,
        }
    }
}

// =============================================================================
// Tax Configuration
// =============================================================================

/// A phone's tax configuration as exposed over the API.
pub type PhoneTaxConfig = TaxConfig;

/// Partial update of a phone's tax configuration; absent fields are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePhoneTaxConfig {
    #[serde(default)]
    pub tax_rate: Option<TaxRate>,
    #[serde(default)]
    pub is_tax_inclusive: Option<bool>,
    #[serde(default)]
    pub is_tax_exempt: Option<bool>,
}

impl UpdatePhoneTaxConfig {
    /// Returns `current` with the present fields replaced.
    pub fn apply(&self, current: TaxConfig) -> TaxConfig {
        TaxConfig {
            tax_rate: self.tax_rate.unwrap_or(current.tax_rate),
            is_tax_inclusive: self.is_tax_inclusive.unwrap_or(current.is_tax_inclusive),
            is_tax_exempt: self.is_tax_exempt.unwrap_or(current.is_tax_exempt),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tax_rate.is_none() && self.is_tax_inclusive.is_none() && self.is_tax_exempt.is_none()
    }
}

// =============================================================================
// Price Splits
// =============================================================================

/// A tax-inclusive price shown as base plus tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxInclusiveBreakdown {
    pub inclusive_price: Money,
    pub base_price: Money,
    pub tax_amount: Money,
    pub tax_rate: TaxRate,
}

impl TaxInclusiveBreakdown {
    pub fn new(inclusive_price: Money, tax_rate: TaxRate) -> Self {
        let split = calculate_tax_from_inclusive_price(inclusive_price, tax_rate);
        TaxInclusiveBreakdown {
            inclusive_price,
            base_price: split.base_price,
            tax_amount: split.tax_amount,
            tax_rate,
        }
    }
}

/// A tax-exclusive price with the tax added on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxExclusiveCalculation {
    pub exclusive_price: Money,
    pub tax_amount: Money,
    pub total_with_tax: Money,
    pub tax_rate: TaxRate,
}

impl TaxExclusiveCalculation {
    pub fn new(exclusive_price: Money, tax_rate: TaxRate) -> Self {
        let split = calculate_tax_from_exclusive_price(exclusive_price, tax_rate);
        TaxExclusiveCalculation {
            exclusive_price,
            tax_amount: split.tax_amount,
            total_with_tax: split.total_with_tax,
            tax_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::calculate_product_tax;
    use crate::types::{ProductCondition, ProductStatus};

    #[test]
    fn test_request_defaults() {
        let request: CalculatePhoneTaxRequest =
            serde_json::from_str(r#"{"phoneId":"abc"}"#).unwrap();
        assert_eq!(request.phone_id, "abc");
        assert_eq!(request.override_price, None);
        assert_eq!(request.quantity(), 1);

        let request: CalculateCartTaxRequest = serde_json::from_str(
            r#"{"items":[{"phoneId":"a","overridePrice":99900,"quantity":2},{"phoneId":"b"}]}"#,
        )
        .unwrap();
        assert_eq!(request.items.len(), 2);
        assert_eq!(request.items[0].override_price, Some(Money::from_cents(99_900)));
        assert_eq!(request.items[0].quantity(), 2);
        assert_eq!(request.items[1].quantity(), 1);
    }

    #[test]
    fn test_update_applies_present_fields_only() {
        let current = TaxConfig {
            tax_rate: TaxRate::from_bps(1000),
            is_tax_inclusive: false,
            is_tax_exempt: false,
        };

        let update = UpdatePhoneTaxConfig {
            is_tax_inclusive: Some(true),
            ..Default::default()
        };
        let next = update.apply(current);
        assert_eq!(next.tax_rate, TaxRate::from_bps(1000));
        assert!(next.is_tax_inclusive);
        assert!(!next.is_tax_exempt);

        assert!(UpdatePhoneTaxConfig::default().is_empty());
        assert_eq!(UpdatePhoneTaxConfig::default().apply(current), current);
    }

    #[test]
    fn test_update_deserializes_partial_json() {
        let update: UpdatePhoneTaxConfig = serde_json::from_str(r#"{"taxRate":750}"#).unwrap();
        assert_eq!(update.tax_rate, Some(TaxRate::from_bps(750)));
        assert_eq!(update.is_tax_exempt, None);
    }

    #[test]
    fn test_price_splits() {
        let inclusive = TaxInclusiveBreakdown::new(Money::from_cents(10_000), TaxRate::from_bps(1000));
        assert_eq!(inclusive.base_price, Money::from_cents(9_091));
        assert_eq!(inclusive.tax_amount, Money::from_cents(909));

        let exclusive = TaxExclusiveCalculation::new(Money::from_cents(10_000), TaxRate::from_bps(1000));
        assert_eq!(exclusive.tax_amount, Money::from_cents(1_000));
        assert_eq!(exclusive.total_with_tax, Money::from_cents(11_000));
    }

    #[test]
    fn test_exempt_phone_reports_effective_rate() {
        let now = chrono::Utc::now();
        let product = Product {
            id: "p-1".to_string(),
            brand_name: "Apple".to_string(),
            model: "iPhone 12".to_string(),
            storage_gb: Some(64),
            color: None,
            condition: ProductCondition::Used,
            imei: None,
            cost_price: Money::from_cents(20_000),
            selling_price: Money::from_cents(30_000),
            tax_rate: TaxRate::from_bps(1000),
            is_tax_inclusive: false,
            is_tax_exempt: true,
            status: ProductStatus::Available,
            created_at: now,
            updated_at: now,
        };

        let calc = calculate_product_tax(&product, 1, None);
        let response = CalculatePhoneTaxResponse::from_calculation(&product, product.selling_price, &calc);
        assert_eq!(response.tax_rate, TaxRate::zero());
        assert!(response.is_tax_exempt);
        assert!(response.total_tax_amount.is_zero());
        assert_eq!(response.total_price, Money::from_cents(30_000));
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = CalculateCartTaxResponse {
            items: vec![],
            subtotal: Money::zero(),
            total_tax: Money::zero(),
            grand_total: Money::zero(),
            tax_breakdown: vec![],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("grandTotal").is_some());
        assert!(json.get("taxBreakdown").is_some());
    }
}
