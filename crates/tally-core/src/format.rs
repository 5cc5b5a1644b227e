//! # Display Formatting
//!
//! Text shown on the cart screen and printed on receipts.
//!
//! ```text
//! format_tax_rate(750, false)      → "7.5%"
//! format_currency(1099, "$")       → "$10.99"
//! tax_status_label(product)        → "10% Tax (incl.)"
//! breakdown line (taxed bucket)    → "10% Tax on $2200.00: $220.00"
//! breakdown line (exempt bucket)   → "Tax Exempt (2 items): $150.00"
//! ```

use crate::cart::TaxBreakdownEntry;
use crate::money::Money;
use crate::types::{Product, TaxRate};

/// Symbol used when the store configuration does not provide one.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// Formats a tax rate for display.
///
/// Exemption wins over the rate. A rate prints in its shortest decimal form
/// followed by `%`.
pub fn format_tax_rate(rate: TaxRate, is_tax_exempt: bool) -> String {
    if is_tax_exempt {
        return "Tax Exempt".to_string();
    }
    format!("{}%", rate)
}

/// Formats an amount with two decimals after the currency symbol.
///
/// The sign follows the symbol: `$-5.00`.
///
/// ## Example
/// ```rust
/// use tally_core::format::format_currency;
/// use tally_core::money::Money;
///
/// assert_eq!(format_currency(Money::from_cents(1099), "$"), "$10.99");
/// assert_eq!(format_currency(Money::from_cents(-500), "Rs "), "Rs -5.00");
/// ```
pub fn format_currency(amount: Money, currency_symbol: &str) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    format!(
        "{}{}{}.{:02}",
        currency_symbol,
        sign,
        amount.dollars().abs(),
        amount.cents_part()
    )
}

/// One receipt line per breakdown bucket.
///
/// The zero bucket (exempt and 0% lines) is labelled as exempt and shows the
/// number of lines in it.
pub fn generate_tax_breakdown_text(
    entries: &[TaxBreakdownEntry],
    currency_symbol: &str,
) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            if entry.tax_rate.is_zero() {
                let plural = if entry.item_count == 1 { "" } else { "s" };
                format!(
                    "Tax Exempt ({} item{}): {}",
                    entry.item_count,
                    plural,
                    format_currency(entry.taxable_amount, currency_symbol)
                )
            } else {
                format!(
                    "{}% Tax on {}: {}",
                    entry.tax_rate,
                    format_currency(entry.taxable_amount, currency_symbol),
                    format_currency(entry.tax_amount, currency_symbol)
                )
            }
        })
        .collect()
}

/// Short label for a product's tax profile.
pub fn tax_status_label(product: &Product) -> String {
    if product.is_tax_exempt {
        return "Tax Exempt".to_string();
    }
    if product.tax_rate.is_zero() {
        return "No Tax".to_string();
    }
    let inclusive = if product.is_tax_inclusive { " (incl.)" } else { "" };
    format!("{}% Tax{}", product.tax_rate, inclusive)
}

/// True when the product is taxed or explicitly marked exempt.
pub fn has_tax_configured(product: &Product) -> bool {
    !product.tax_rate.is_zero() || product.is_tax_exempt
}
