//! # Cart Aggregation
//!
//! Sums per-line tax results into cart totals and a per-rate breakdown.
//!
//! ## Aggregation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines ──► calculate_item_tax (per line)                                │
//! │              │                                                          │
//! │              ├──► subtotal  += base_price                               │
//! │              ├──► total_tax += tax_amount                               │
//! │              └──► bucket[exempt ? 0 : rate] += (base, tax, count)       │
//! │                                                                         │
//! │  buckets ──► sorted ascending by rate ──► tax_breakdown                 │
//! │  grand_total = subtotal + total_tax                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Partition Invariant
//! Every line lands in exactly one bucket, so the breakdown sums back to the
//! cart: `Σ taxable_amount == subtotal` and `Σ tax_amount == total_tax`.
//! All amounts are whole cents, so the sums are exact.
//!
//! Exempt lines and lines taxed at an explicit 0% share bucket `0`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::tax::{calculate_item_tax, ItemTaxCalculation, TaxLineInput};
use crate::types::{CartItem, ReceiptItem, TaxRate};

// =============================================================================
// Summary Types
// =============================================================================

/// One breakdown bucket: every line sharing an effective tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdownEntry {
    pub tax_rate: TaxRate,
    /// Sum of base prices at this rate.
    pub taxable_amount: Money,
    /// Sum of tax at this rate.
    pub tax_amount: Money,
    pub item_count: i64,
}

/// Result of aggregating a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTaxSummary {
    pub items: Vec<ItemTaxCalculation>,
    pub subtotal: Money,
    pub total_tax: Money,
    pub grand_total: Money,
    /// Sorted ascending by `tax_rate`.
    pub tax_breakdown: Vec<TaxBreakdownEntry>,
}

/// Cart totals including cost basis and profit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub subtotal: Money,
    pub tax_amount: Money,
    pub grand_total: Money,
    pub total_cost: Money,
    /// `subtotal − total_cost`, before any discount.
    pub total_profit: Money,
    /// Number of cart lines.
    pub item_count: i64,
    pub discount_amount: Money,
    /// `grand_total − discount_amount`.
    pub final_total: Money,
}

impl CartSummary {
    /// Applies an already-computed discount.
    ///
    /// Discount rules live with the caller; this only records the amount and
    /// recomputes the final total.
    pub fn with_discount(mut self, discount_amount: Money) -> Self {
        self.discount_amount = discount_amount;
        self.final_total = self.grand_total - discount_amount;
        self
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// How each line's quantity is treated during aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineQuantity {
    /// Each line is one unit; repeated units are repeated lines.
    Single,
    /// Each line carries its own quantity; bucket counts are units.
    PerLine,
}

/// Running bucket totals, keyed by effective rate in a `BTreeMap` so the
/// breakdown comes out already in ascending rate order.
#[derive(Debug, Default)]
struct Accumulator {
    items: Vec<ItemTaxCalculation>,
    subtotal: Money,
    total_tax: Money,
    buckets: BTreeMap<TaxRate, TaxBreakdownEntry>,
}

impl Accumulator {
    fn push(&mut self, calc: ItemTaxCalculation, count: i64) {
        self.subtotal += calc.base_price;
        self.total_tax += calc.tax_amount;

        let key = if calc.is_tax_exempt {
            TaxRate::zero()
        } else {
            calc.tax_rate
        };

        let bucket = self.buckets.entry(key).or_insert(TaxBreakdownEntry {
            tax_rate: key,
            taxable_amount: Money::zero(),
            tax_amount: Money::zero(),
            item_count: 0,
        });
        bucket.taxable_amount += calc.base_price;
        bucket.tax_amount += calc.tax_amount;
        bucket.item_count = bucket.item_count.saturating_add(count);

        self.items.push(calc);
    }

    fn finish(self) -> CartTaxSummary {
        CartTaxSummary {
            items: self.items,
            subtotal: self.subtotal,
            total_tax: self.total_tax,
            grand_total: self.subtotal + self.total_tax,
            tax_breakdown: self.buckets.into_values().collect(),
        }
    }
}

fn aggregate(lines: &[TaxLineInput], mode: LineQuantity) -> CartTaxSummary {
    let mut acc = Accumulator::default();

    for line in lines {
        let quantity = match mode {
            LineQuantity::Single => 1,
            LineQuantity::PerLine => line.quantity.max(1),
        };

        let calc = calculate_item_tax(
            line.unit_price,
            line.tax_rate,
            line.is_tax_inclusive,
            line.is_tax_exempt,
            quantity,
        );

        let count = match mode {
            LineQuantity::Single => 1,
            LineQuantity::PerLine => quantity,
        };

        acc.push(calc, count);
    }

    acc.finish()
}

/// Aggregates a cart where every line is a single unit.
///
/// Line quantities are ignored (fixed at 1) and `item_count` counts lines.
///
/// ## Example
/// ```rust
/// use tally_core::cart::calculate_cart_tax;
/// use tally_core::money::Money;
/// use tally_core::tax::TaxLineInput;
/// use tally_core::types::TaxRate;
///
/// let ten = TaxRate::from_bps(1000);
/// let summary = calculate_cart_tax(&[
///     TaxLineInput::exclusive(Money::from_cents(120_000), ten),
///     TaxLineInput::exclusive(Money::from_cents(100_000), ten),
/// ]);
///
/// assert_eq!(summary.tax_breakdown.len(), 1);
/// assert_eq!(summary.tax_breakdown[0].taxable_amount.cents(), 220_000);
/// assert_eq!(summary.tax_breakdown[0].tax_amount.cents(), 22_000);
/// assert_eq!(summary.tax_breakdown[0].item_count, 2);
/// ```
pub fn calculate_cart_tax(lines: &[TaxLineInput]) -> CartTaxSummary {
    aggregate(lines, LineQuantity::Single)
}

/// Aggregates lines that carry their own quantity.
///
/// Used for request-driven calculations where one line may stand for several
/// units; `item_count` then counts units rather than lines.
pub fn calculate_quantity_cart_tax(lines: &[TaxLineInput]) -> CartTaxSummary {
    aggregate(lines, LineQuantity::PerLine)
}

/// Aggregates cart items.
pub fn calculate_cart_items_tax(items: &[CartItem]) -> CartTaxSummary {
    let lines: Vec<TaxLineInput> = items.iter().map(CartItem::tax_line).collect();
    calculate_cart_tax(&lines)
}

/// Cart totals with cost basis and profit. Discount starts at zero; see
/// [`CartSummary::with_discount`].
pub fn calculate_cart_summary(items: &[CartItem]) -> CartSummary {
    let tax_summary = calculate_cart_items_tax(items);
    let total_cost: Money = items.iter().map(|item| item.cost_price).sum();

    CartSummary {
        subtotal: tax_summary.subtotal,
        tax_amount: tax_summary.total_tax,
        grand_total: tax_summary.grand_total,
        total_cost,
        total_profit: tax_summary.subtotal - total_cost,
        item_count: items.len() as i64,
        discount_amount: Money::zero(),
        final_total: tax_summary.grand_total,
    }
}

/// Per-rate breakdown of a cart, for the receipt footer.
pub fn generate_tax_breakdown(items: &[CartItem]) -> Vec<TaxBreakdownEntry> {
    calculate_cart_items_tax(items).tax_breakdown
}

/// Converts cart items to receipt lines with their tax detail.
pub fn cart_items_to_receipt_items(items: &[CartItem]) -> Vec<ReceiptItem> {
    items
        .iter()
        .map(|item| {
            let calc = item.tax_line().calculate();
            ReceiptItem {
                name: item.display_name(),
                quantity: 1,
                unit_price: item.sale_price,
                total: calc.total_price,
                tax_rate: item.tax_rate,
                tax_amount: calc.tax_amount,
                base_price: calc.base_price,
                is_tax_exempt: item.is_tax_exempt,
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
