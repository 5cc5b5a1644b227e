//! # Validation Module
//!
//! Request checks that run before the tax core sees any input.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Deserialization                                               │
//! │  └── Types, camelCase field names, defaults for optional fields         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── ids, quantities, prices, tax rates, cart size                      │
//! │  └── product fields on insert (model, IMEI)                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  └── NOT NULL, CHECK and UNIQUE constraints                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_product_id, validate_quantity};
//!
//! assert!(validate_product_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, BPS_SCALE};
use crate::types::TaxRate;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product id (UUID).
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_product_id;
///
/// assert!(validate_product_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_product_id("not-a-uuid").is_err());
/// ```
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "phoneId".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "phoneId".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Validates a brand or model name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
pub fn validate_model_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates an IMEI: exactly 15 ASCII digits.
pub fn validate_imei(imei: &str) -> ValidationResult<()> {
    if imei.len() != 15 || !imei.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "imei".to_string(),
            reason: "must be exactly 15 digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ```text
/// validate_quantity(q)
///      │
///      ├── q <= 0?   → MustBePositive
///      ├── q > 999?  → OutOfRange
///      └── OK
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (giveaway units).
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::validation::validate_price;
///
/// assert!(validate_price("price", Money::from_cents(1099)).is_ok());
/// assert!(validate_price("price", Money::zero()).is_ok());
/// assert!(validate_price("price", Money::from_cents(-100)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a tax rate: 0% to 100%.
pub fn validate_tax_rate(rate: TaxRate) -> ValidationResult<()> {
    if rate.bps() as i128 > BPS_SCALE {
        return Err(ValidationError::OutOfRange {
            field: "taxRate".to_string(),
            min: 0,
            max: BPS_SCALE as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines in a cart request.
pub fn validate_cart_size(lines: usize) -> CoreResult<()> {
    if lines > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }

    Ok(())
}

/// Validates a discount against the amount it reduces.
pub fn validate_discount(discount: Money, grand_total: Money) -> CoreResult<()> {
    if discount.is_negative() {
        return Err(CoreError::InvalidDiscount {
            reason: "discount cannot be negative".to_string(),
        });
    }

    if discount > grand_total {
        return Err(CoreError::InvalidDiscount {
            reason: format!("discount {} exceeds total {}", discount, grand_total),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_product_id("").is_err());
        assert!(validate_product_id("   ").is_err());
        assert!(validate_product_id("not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_model_name() {
        assert!(validate_model_name("model", "iPhone 15 Pro").is_ok());
        assert!(validate_model_name("model", "").is_err());
        assert!(validate_model_name("brandName", &"A".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_imei() {
        assert!(validate_imei("356938035643809").is_ok());
        assert!(validate_imei("35693803564380").is_err());
        assert!(validate_imei("35693803564380X").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(matches!(
            validate_quantity(1000),
            Err(ValidationError::OutOfRange { min: 1, max: 999, .. })
        ));
    }

    #[test]
    fn test_validate_tax_rate() {
        assert!(validate_tax_rate(TaxRate::zero()).is_ok());
        assert!(validate_tax_rate(TaxRate::from_bps(825)).is_ok());
        assert!(validate_tax_rate(TaxRate::from_bps(10_000)).is_ok());
        assert!(validate_tax_rate(TaxRate::from_bps(10_001)).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(0).is_ok());
        assert!(validate_cart_size(MAX_CART_ITEMS).is_ok());
        assert!(matches!(
            validate_cart_size(MAX_CART_ITEMS + 1),
            Err(CoreError::CartTooLarge { max: 100 })
        ));
    }

    #[test]
    fn test_validate_discount() {
        let total = Money::from_cents(10_000);
        assert!(validate_discount(Money::zero(), total).is_ok());
        assert!(validate_discount(total, total).is_ok());
        assert!(validate_discount(Money::from_cents(-1), total).is_err());
        assert!(validate_discount(Money::from_cents(10_001), total).is_err());
    }
}
