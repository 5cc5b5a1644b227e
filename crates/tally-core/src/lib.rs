//! # tally-core: Tax Calculation Core for Tally POS
//!
//! Pure tax arithmetic for a phone shop point of sale: splitting a price into
//! base and tax, aggregating a cart by tax rate, and formatting the results
//! for receipts. Nothing in this crate performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │  Callers (cart screen, receipt printer, HTTP handlers)          │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │ DTOs                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │  tally-db: TaxService, repositories, StoreConfig                │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │               ★ tally-core (THIS CRATE) ★                       │    │
//! │  │                                                                 │    │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐            │    │
//! │  │   │  money  │  │   tax   │  │  cart   │  │ format  │            │    │
//! │  │   │  Money  │  │ splits  │  │ buckets │  │ receipt │            │    │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └─────────┘            │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type in integer cents and the rounding rule
//! - [`types`] - Products, tax rates, cart and receipt items
//! - [`tax`] - Single-line tax calculation
//! - [`cart`] - Cart totals and per-rate breakdown
//! - [`format`] - Display strings for rates, amounts and breakdowns
//! - [`dto`] - Request and response shapes
//! - [`validation`] - Request checks
//! - [`error`] - Domain error types
//!
//! ## Rounding
//!
//! Every computed amount is rounded once, to the cent, half away from zero.
//! Inclusive splits round base and tax independently, so `base + tax` may
//! differ from the shelf price by one cent.
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::tax::calculate_item_tax;
//! use tally_core::types::TaxRate;
//!
//! // $100.00 shelf price, 10% included
//! let calc = calculate_item_tax(Money::from_cents(10_000), TaxRate::from_bps(1000), true, false, 1);
//!
//! assert_eq!(calc.base_price.cents(), 9_091);
//! assert_eq!(calc.tax_amount.cents(), 909);
//! assert_eq!(calc.total_price.cents(), 10_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod dto;
pub mod error;
pub mod format;
pub mod money;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{
    calculate_cart_summary, calculate_cart_tax, calculate_quantity_cart_tax,
    cart_items_to_receipt_items, generate_tax_breakdown, CartSummary, CartTaxSummary,
    TaxBreakdownEntry,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use tax::{
    calculate_item_tax, calculate_product_tax, calculate_tax_from_exclusive_price,
    calculate_tax_from_inclusive_price, ItemTaxCalculation, TaxCalculation, TaxLineInput,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart request.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity on a single line.
///
/// Catches a mistyped quantity (1000 instead of 10) before it is priced.
pub const MAX_ITEM_QUANTITY: i64 = 999;
