//! # Money Module
//!
//! Provides the `Money` type and the single rounding primitive used by every
//! monetary calculation in Tally POS.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    1.005 * 100 = 100.49999999999999  ❌ rounds the wrong way            │
//! │                                                                         │
//! │  Receipts, stored breakdown rows and refunds must all agree to the      │
//! │  cent, so they cannot each carry their own float error.                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + one exact rounding step                  │
//! │    $100.00 incl. 10% → 10000 × 10000 / 11000 = 9090.90… → 9091 cents    │
//! │    The remainder is known exactly, so "half" is never ambiguous.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let doubled: Money = price * 2;       // $21.98
//! let total = price + Money::from_cents(500);
//! assert_eq!(total.cents(), 1599);
//! assert_eq!(doubled.cents(), 2198);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

/// Basis points in 100%.
pub const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Rounding Primitive
// =============================================================================

/// Divides `numerator` by `denominator` and rounds half away from zero.
///
/// This is the only rounding step in the crate. Every tax split, extension
/// and aggregate is carried as an exact integer ratio until it reaches this
/// function.
///
/// ```text
///  1050 / 100 → 10.5  → 11
/// -1050 / 100 → -10.5 → -11
///  1049 / 100 → 10.49 → 10
/// ```
///
/// ## Example
/// ```rust
/// use tally_core::money::round_half_away;
///
/// assert_eq!(round_half_away(1050, 100), 11);
/// assert_eq!(round_half_away(-1050, 100), -11);
/// assert_eq!(round_half_away(1049, 100), 10);
/// ```
///
/// A zero denominator yields zero rather than panicking.
pub fn round_half_away(numerator: i128, denominator: i128) -> i128 {
    if denominator == 0 {
        return 0;
    }

    let quotient = numerator / denominator;
    let remainder = numerator % denominator;

    if remainder.abs() * 2 >= denominator.abs() {
        // Sign of the true result decides which way "away from zero" is
        let direction = if (numerator < 0) == (denominator < 0) { 1 } else { -1 };
        quotient + direction
    } else {
        quotient
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: refunds and discounts are negative amounts
/// - **Single field tuple struct**: zero-cost wrapper over i64
/// - **Saturating arithmetic**: operators clamp at the `i64` bounds instead
///   of panicking, so tax arithmetic has no failure path
/// - **Serialized as cents**: the database, the tax core and the API all
///   agree on integer cents; only formatters turn it into "$10.99"
///
/// ## Where Money Flows
/// ```text
/// Product.selling_price ──► CartItem.sale_price ──► calculate_item_tax
///                                                        │
///           ┌────────────────────────────────────────────┘
///           ▼
///  base_price / tax_amount ──► CartTaxSummary ──► StoredReceipt rows
///                                   │
///                                   └──► format_currency ──► "$1,320.00"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -$5.50.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Converts a decimal amount in major units (e.g. `1200.5`) to Money.
    ///
    /// Boundary use only: importing amounts typed as plain numbers by a
    /// legacy client. The value is rounded half away from zero to the cent.
    /// Non-finite input converts to zero.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_f64(90.91).cents(), 9091);
    /// assert_eq!(Money::from_major_f64(0.125).cents(), 13);
    /// ```
    pub fn from_major_f64(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        // Shortest round-trip text keeps 0.125 as "0.125" rather than the
        // nearest binary fraction, so the half case is seen exactly.
        let text = format!("{}", amount);
        match parse_decimal_cents(&text) {
            Some(cents) => Money(cents),
            None => Money((amount * 100.0).round() as i64),
        }
    }

    /// Returns the value in major units as a float (display/export only).
    #[inline]
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion, truncated toward zero.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Scales this amount by `numerator / denominator`, rounding once.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// // $100.00 × 10000 / 11000 = $90.909… → $90.91
    /// let base = Money::from_cents(10000).round_ratio(10_000, 11_000);
    /// assert_eq!(base.cents(), 9091);
    /// ```
    pub fn round_ratio(&self, numerator: i128, denominator: i128) -> Money {
        let scaled = round_half_away(self.0 as i128 * numerator, denominator);
        Money(scaled.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Calculates tax on top of this amount, rounding half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::types::TaxRate;
    ///
    /// let price = Money::from_cents(1000);
    /// let tax = price.calculate_tax(TaxRate::from_bps(825));
    /// // $10.00 × 8.25% = $0.825 → $0.83
    /// assert_eq!(tax.cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.round_ratio(rate.bps() as i128, BPS_SCALE)
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

/// Parses a plain decimal string ("1200", "-0.125") into cents, rounding
/// half away from zero on the third decimal digit.
fn parse_decimal_cents(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = whole.parse().ok()?;
    let mut fraction_digits = fraction.bytes().map(|b| (b - b'0') as i64);
    let tenths = fraction_digits.next().unwrap_or(0);
    let hundredths = fraction_digits.next().unwrap_or(0);
    let round_up = fraction_digits.next().unwrap_or(0) >= 5;

    let mut cents = whole.checked_mul(100)?.checked_add(tenths * 10 + hundredths)?;
    if round_up {
        cents += 1;
    }

    Some(if negative { -cents } else { cents })
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented display ("-$5.50"). Receipts use
/// [`crate::format::format_currency`] so the currency symbol is configurable.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
