//! # Tax Calculation
//!
//! Single-item tax math: inclusive extraction, exclusive addition, quantity
//! extension and exemption handling.
//!
//! ## Decision Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  calculate_item_tax(unit_price, rate, inclusive, exempt, quantity)      │
//! │                                                                         │
//! │  exempt? ──yes──► base = price, tax = 0, rate reported as 0            │
//! │     │                                                                   │
//! │     no                                                                  │
//! │     ▼                                                                   │
//! │  inclusive? ──yes──► base = price / (1 + r)    tax = price − base      │
//! │     │                (each rounded on its own, may drift by 1 cent)     │
//! │     no                                                                  │
//! │     ▼                                                                   │
//! │  base = price       tax = price × r                                    │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  extend by quantity: base × q, tax × q, total = base + tax             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here can fail. A zero rate, a zero price or a quantity below one
//! all degrade to a plain zero-tax line. Price validation belongs to the
//! caller (see [`crate::validation`]).
//!
//! ## Example
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::tax::calculate_item_tax;
//! use tally_core::types::TaxRate;
//!
//! let calc = calculate_item_tax(Money::from_cents(10000), TaxRate::from_bps(1000), false, false, 3);
//! assert_eq!(calc.base_price.cents(), 30000);
//! assert_eq!(calc.tax_amount.cents(), 3000);
//! assert_eq!(calc.total_price.cents(), 33000);
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, BPS_SCALE};
use crate::types::{Product, TaxRate};

// =============================================================================
// Inputs & Results
// =============================================================================

/// One line before tax is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxLineInput {
    /// Price per unit as stored; meaning depends on `is_tax_inclusive`.
    pub unit_price: Money,
    pub tax_rate: TaxRate,
    pub is_tax_inclusive: bool,
    pub is_tax_exempt: bool,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

impl TaxLineInput {
    /// A single unit taxed on top of its price.
    pub fn exclusive(unit_price: Money, tax_rate: TaxRate) -> Self {
        TaxLineInput {
            unit_price,
            tax_rate,
            is_tax_inclusive: false,
            is_tax_exempt: false,
            quantity: 1,
        }
    }

    /// A single unit whose price already contains tax.
    pub fn inclusive(unit_price: Money, tax_rate: TaxRate) -> Self {
        TaxLineInput {
            is_tax_inclusive: true,
            ..TaxLineInput::exclusive(unit_price, tax_rate)
        }
    }

    /// A single tax-exempt unit.
    pub fn exempt(unit_price: Money) -> Self {
        TaxLineInput {
            is_tax_exempt: true,
            ..TaxLineInput::exclusive(unit_price, TaxRate::zero())
        }
    }

    /// Sets the quantity.
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Runs [`calculate_item_tax`] for this line.
    pub fn calculate(&self) -> ItemTaxCalculation {
        calculate_item_tax(
            self.unit_price,
            self.tax_rate,
            self.is_tax_inclusive,
            self.is_tax_exempt,
            self.quantity,
        )
    }
}

/// Tax result without unit detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculation {
    pub base_price: Money,
    pub tax_amount: Money,
    pub total_price: Money,
    pub tax_rate: TaxRate,
    pub is_tax_exempt: bool,
}

/// Tax result for one line, per unit and extended by quantity.
///
/// ## Invariants
/// - `total_price == base_price + tax_amount`
/// - `base_price == unit_base_price × quantity`
/// - `tax_amount == unit_tax_amount × quantity`
/// - exempt lines report `tax_rate == 0` and zero tax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemTaxCalculation {
    pub unit_base_price: Money,
    pub unit_tax_amount: Money,
    pub base_price: Money,
    pub tax_amount: Money,
    pub total_price: Money,
    /// Effective rate: the input rate, or zero for exempt lines.
    pub tax_rate: TaxRate,
    pub is_tax_exempt: bool,
    pub quantity: i64,
}

impl ItemTaxCalculation {
    /// Drops the per-unit detail.
    pub fn summary(&self) -> TaxCalculation {
        TaxCalculation {
            base_price: self.base_price,
            tax_amount: self.tax_amount,
            total_price: self.total_price,
            tax_rate: self.tax_rate,
            is_tax_exempt: self.is_tax_exempt,
        }
    }
}

/// Base and tax extracted from a tax-inclusive price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InclusiveSplit {
    pub base_price: Money,
    pub tax_amount: Money,
}

/// Tax added on top of a tax-exclusive price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExclusiveSplit {
    pub tax_amount: Money,
    pub total_with_tax: Money,
}

// =============================================================================
// Primitive Conversions
// =============================================================================

/// Extracts base price and tax from a price that already includes tax.
///
/// `base = price / (1 + r)`, `tax = price − base`. Both are computed from the
/// exact ratio and rounded independently, so `base + tax` can differ from
/// `price` by one cent. That drift is accepted, not corrected.
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::tax::calculate_tax_from_inclusive_price;
/// use tally_core::types::TaxRate;
///
/// // $100 incl. 10% → base $90.91, tax $9.09
/// let split = calculate_tax_from_inclusive_price(Money::from_cents(10000), TaxRate::from_bps(1000));
/// assert_eq!(split.base_price.cents(), 9091);
/// assert_eq!(split.tax_amount.cents(), 909);
/// ```
pub fn calculate_tax_from_inclusive_price(price: Money, rate: TaxRate) -> InclusiveSplit {
    if rate.is_zero() {
        return InclusiveSplit {
            base_price: price,
            tax_amount: Money::zero(),
        };
    }

    let divisor = BPS_SCALE + rate.bps() as i128;

    InclusiveSplit {
        base_price: price.round_ratio(BPS_SCALE, divisor),
        // price − price/(1+r) == price × r/(1+r), kept exact until rounding
        tax_amount: price.round_ratio(rate.bps() as i128, divisor),
    }
}

/// Adds tax on top of a tax-exclusive price.
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::tax::calculate_tax_from_exclusive_price;
/// use tally_core::types::TaxRate;
///
/// let split = calculate_tax_from_exclusive_price(Money::from_cents(10000), TaxRate::from_bps(750));
/// assert_eq!(split.tax_amount.cents(), 750);
/// assert_eq!(split.total_with_tax.cents(), 10750);
/// ```
pub fn calculate_tax_from_exclusive_price(price: Money, rate: TaxRate) -> ExclusiveSplit {
    if rate.is_zero() {
        return ExclusiveSplit {
            tax_amount: Money::zero(),
            total_with_tax: price,
        };
    }

    let tax_amount = price.calculate_tax(rate);

    ExclusiveSplit {
        tax_amount,
        total_with_tax: price + tax_amount,
    }
}

// =============================================================================
// Item Calculation
// =============================================================================

/// Calculates the complete tax picture of one line.
///
/// Exemption wins over every other flag. For non-exempt lines the reported
/// `tax_rate` is the input rate as given.
pub fn calculate_item_tax(
    unit_price: Money,
    rate: TaxRate,
    is_tax_inclusive: bool,
    is_tax_exempt: bool,
    quantity: i64,
) -> ItemTaxCalculation {
    let quantity = quantity.max(1);

    if is_tax_exempt {
        let total_price = unit_price.multiply_quantity(quantity);
        return ItemTaxCalculation {
            unit_base_price: unit_price,
            unit_tax_amount: Money::zero(),
            base_price: total_price,
            tax_amount: Money::zero(),
            total_price,
            tax_rate: TaxRate::zero(),
            is_tax_exempt: true,
            quantity,
        };
    }

    let (unit_base_price, unit_tax_amount) = if is_tax_inclusive {
        let split = calculate_tax_from_inclusive_price(unit_price, rate);
        (split.base_price, split.tax_amount)
    } else {
        let split = calculate_tax_from_exclusive_price(unit_price, rate);
        (unit_price, split.tax_amount)
    };

    let base_price = unit_base_price.multiply_quantity(quantity);
    let tax_amount = unit_tax_amount.multiply_quantity(quantity);

    ItemTaxCalculation {
        unit_base_price,
        unit_tax_amount,
        base_price,
        tax_amount,
        total_price: base_price + tax_amount,
        tax_rate: rate,
        is_tax_exempt: false,
        quantity,
    }
}

/// Calculates tax for a product using its own tax configuration.
///
/// `override_price` replaces the shelf price (negotiated sale price).
pub fn calculate_product_tax(
    product: &Product,
    quantity: i64,
    override_price: Option<Money>,
) -> ItemTaxCalculation {
    let unit_price = override_price.unwrap_or(product.selling_price);
    calculate_item_tax(
        unit_price,
        product.tax_rate,
        product.is_tax_inclusive,
        product.is_tax_exempt,
        quantity,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProductCondition, ProductStatus};
    use chrono::Utc;

    fn rate(bps: u32) -> TaxRate {
        TaxRate::from_bps(bps)
    }

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    fn phone() -> Product {
        let now = Utc::now();
        Product {
            id: "test-product-1".to_string(),
            brand_name: "Apple".to_string(),
            model: "iPhone 15 Pro".to_string(),
            storage_gb: Some(256),
            color: Some("Black".to_string()),
            condition: ProductCondition::New,
            imei: Some("123456789012345".to_string()),
            cost_price: cents(90_000),
            selling_price: cents(120_000),
            tax_rate: rate(1000),
            is_tax_inclusive: false,
            is_tax_exempt: false,
            status: ProductStatus::Available,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_inclusive_ten_percent() {
        let split = calculate_tax_from_inclusive_price(cents(10000), rate(1000));
        assert_eq!(split.base_price, cents(9091));
        assert_eq!(split.tax_amount, cents(909));
    }

    #[test]
    fn test_inclusive_zero_rate() {
        let split = calculate_tax_from_inclusive_price(cents(10000), TaxRate::from_percentage(0.0));
        assert_eq!(split.base_price, cents(10000));
        assert!(split.tax_amount.is_zero());
    }

    #[test]
    fn test_inclusive_negative_rate_clamps_to_zero() {
        let split = calculate_tax_from_inclusive_price(cents(10000), TaxRate::from_percentage(-5.0));
        assert_eq!(split.base_price, cents(10000));
        assert!(split.tax_amount.is_zero());
    }

    #[test]
    fn test_inclusive_twenty_five_percent() {
        let split = calculate_tax_from_inclusive_price(cents(10000), rate(2500));
        assert_eq!(split.base_price, cents(8000));
        assert_eq!(split.tax_amount, cents(2000));
    }

    #[test]
    fn test_inclusive_fractional_rate() {
        // $99.99 incl. 7.5% → 9301.395… / 697.604…
        let split = calculate_tax_from_inclusive_price(cents(9999), rate(750));
        assert_eq!(split.base_price, cents(9301));
        assert_eq!(split.tax_amount, cents(698));
    }

    #[test]
    fn test_inclusive_drift_is_at_most_one_cent() {
        for price in [1, 7, 99, 1001, 9999, 123_457] {
            for bps in [500, 750, 825, 1000, 1500, 2000] {
                let split = calculate_tax_from_inclusive_price(cents(price), rate(bps));
                let drift = (split.base_price + split.tax_amount - cents(price)).cents();
                assert!(drift.abs() <= 1, "price {price} bps {bps} drift {drift}");
            }
        }
    }

    #[test]
    fn test_exclusive_ten_percent() {
        let split = calculate_tax_from_exclusive_price(cents(10000), rate(1000));
        assert_eq!(split.tax_amount, cents(1000));
        assert_eq!(split.total_with_tax, cents(11000));
    }

    #[test]
    fn test_exclusive_zero_and_negative_rate() {
        for r in [TaxRate::zero(), TaxRate::from_percentage(-5.0)] {
            let split = calculate_tax_from_exclusive_price(cents(10000), r);
            assert!(split.tax_amount.is_zero());
            assert_eq!(split.total_with_tax, cents(10000));
        }
    }

    #[test]
    fn test_exclusive_fractional_rate() {
        let split = calculate_tax_from_exclusive_price(cents(10000), TaxRate::from_percentage(7.5));
        assert_eq!(split.tax_amount, cents(750));
        assert_eq!(split.total_with_tax, cents(10750));
    }

    #[test]
    fn test_exclusive_then_inclusive_recovers_base() {
        for base in [1, 50, 999, 10000, 120_000, 987_654] {
            for bps in [1, 500, 750, 825, 1000, 2500] {
                let total = calculate_tax_from_exclusive_price(cents(base), rate(bps)).total_with_tax;
                let recovered = calculate_tax_from_inclusive_price(total, rate(bps)).base_price;
                assert!(
                    (recovered - cents(base)).cents().abs() <= 1,
                    "base {base} bps {bps} recovered {recovered}"
                );
            }
        }
    }

    #[test]
    fn test_item_tax_inclusive() {
        let calc = calculate_item_tax(cents(10000), rate(1000), true, false, 1);
        assert_eq!(calc.unit_base_price, cents(9091));
        assert_eq!(calc.unit_tax_amount, cents(909));
        assert_eq!(calc.base_price, cents(9091));
        assert_eq!(calc.tax_amount, cents(909));
        assert_eq!(calc.total_price, cents(10000));
        assert_eq!(calc.tax_rate, rate(1000));
        assert!(!calc.is_tax_exempt);
    }

    #[test]
    fn test_item_tax_exclusive() {
        let calc = calculate_item_tax(cents(10000), rate(1000), false, false, 1);
        assert_eq!(calc.unit_base_price, cents(10000));
        assert_eq!(calc.unit_tax_amount, cents(1000));
        assert_eq!(calc.total_price, cents(11000));
        assert_eq!(calc.tax_rate, rate(1000));
    }

    #[test]
    fn test_item_tax_exempt() {
        let calc = calculate_item_tax(cents(10000), rate(1000), false, true, 1);
        assert_eq!(calc.unit_base_price, cents(10000));
        assert!(calc.unit_tax_amount.is_zero());
        assert_eq!(calc.base_price, cents(10000));
        assert!(calc.tax_amount.is_zero());
        assert_eq!(calc.total_price, cents(10000));
        assert!(calc.tax_rate.is_zero());
        assert!(calc.is_tax_exempt);
    }

    #[test]
    fn test_exemption_dominates_every_configuration() {
        for bps in [0, 500, 1000, 2500] {
            for inclusive in [false, true] {
                let calc = calculate_item_tax(cents(4321), rate(bps), inclusive, true, 2);
                assert!(calc.tax_amount.is_zero());
                assert!(calc.tax_rate.is_zero());
                assert_eq!(calc.total_price, cents(8642));
            }
        }
    }

    #[test]
    fn test_item_tax_quantity() {
        let calc = calculate_item_tax(cents(10000), rate(1000), false, false, 3);
        assert_eq!(calc.unit_base_price, cents(10000));
        assert_eq!(calc.unit_tax_amount, cents(1000));
        assert_eq!(calc.base_price, cents(30000));
        assert_eq!(calc.tax_amount, cents(3000));
        assert_eq!(calc.total_price, cents(33000));
        assert_eq!(calc.quantity, 3);
    }

    #[test]
    fn test_item_tax_non_positive_quantity_is_one() {
        let calc = calculate_item_tax(cents(10000), rate(1000), false, false, 0);
        assert_eq!(calc.quantity, 1);
        assert_eq!(calc.total_price, cents(11000));
    }

    #[test]
    fn test_item_tax_huge_quantity_saturates() {
        let calc = calculate_item_tax(
            cents(10000),
            rate(1000),
            false,
            false,
            1_000_000_000_000_000,
        );
        assert_eq!(calc.unit_tax_amount, cents(1000));
        assert_eq!(calc.base_price, cents(i64::MAX));
        assert_eq!(calc.tax_amount, cents(i64::MAX));
        assert_eq!(calc.total_price, cents(i64::MAX));

        let exempt = calculate_item_tax(cents(10000), rate(1000), false, true, i64::MAX);
        assert_eq!(exempt.total_price, cents(i64::MAX));
        assert!(exempt.tax_amount.is_zero());
    }

    #[test]
    fn test_item_tax_is_deterministic() {
        let line = TaxLineInput::inclusive(cents(9999), rate(750)).with_quantity(4);
        assert_eq!(line.calculate(), line.calculate());
    }

    #[test]
    fn test_item_tax_invariants() {
        let line = TaxLineInput::inclusive(cents(1999), rate(825)).with_quantity(7);
        let calc = line.calculate();
        assert_eq!(calc.total_price, calc.base_price + calc.tax_amount);
        assert_eq!(calc.base_price, calc.unit_base_price * 7i64);
        assert_eq!(calc.tax_amount, calc.unit_tax_amount * 7i64);
    }

    #[test]
    fn test_product_tax() {
        let product = phone();
        let calc = calculate_product_tax(&product, 1, None);
        assert_eq!(calc.unit_base_price, cents(120_000));
        assert_eq!(calc.unit_tax_amount, cents(12_000));
        assert_eq!(calc.total_price, cents(132_000));
    }

    #[test]
    fn test_product_tax_override_price() {
        let calc = calculate_product_tax(&phone(), 1, Some(cents(100_000)));
        assert_eq!(calc.unit_base_price, cents(100_000));
        assert_eq!(calc.unit_tax_amount, cents(10_000));
        assert_eq!(calc.total_price, cents(110_000));
    }

    #[test]
    fn test_product_tax_inclusive() {
        let product = Product {
            is_tax_inclusive: true,
            ..phone()
        };
        let calc = calculate_product_tax(&product, 1, None);
        assert_eq!(calc.unit_base_price, cents(109_091));
        assert_eq!(calc.unit_tax_amount, cents(10_909));
        assert_eq!(calc.total_price, cents(120_000));
    }

    #[test]
    fn test_product_tax_exempt() {
        let product = Product {
            is_tax_exempt: true,
            ..phone()
        };
        let calc = calculate_product_tax(&product, 1, None);
        assert_eq!(calc.unit_base_price, cents(120_000));
        assert!(calc.unit_tax_amount.is_zero());
        assert_eq!(calc.total_price, cents(120_000));
        assert!(calc.is_tax_exempt);
    }
}
