//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                          │
//! │  ├── CoreError        - Domain errors around the tax core               │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                       │
//! │  ├── DbError          - Database and service failures                   │
//! │  └── ConfigError      - Store configuration failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The tax arithmetic itself never fails. These errors come from checking
//! requests before the arithmetic runs.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors raised while preparing a tax calculation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No phone with this id.
    #[error("Phone not found: {0}")]
    ProductNotFound(String),

    /// The phone exists but is reserved or already sold.
    ///
    /// ## When This Occurs
    /// ```text
    /// Scan phone ──► status = sold ──► ProductUnavailable { id, status: "sold" }
    ///                                        │
    ///                                        ▼
    ///                         UI shows: "Phone ... is sold"
    /// ```
    #[error("Phone {id} is {status}")]
    ProductUnavailable { id: String, status: String },

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Discount larger than the amount it applies to.
    #[error("Invalid discount: {reason}")]
    InvalidDiscount { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, malformed IMEI).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::ProductUnavailable {
            id: "p-42".to_string(),
            status: "sold".to_string(),
        };
        assert_eq!(err.to_string(), "Phone p-42 is sold");

        let err = CoreError::CartTooLarge { max: 100 };
        assert_eq!(err.to_string(), "Cart cannot have more than 100 items");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "phoneId".to_string(),
        };
        assert_eq!(err.to_string(), "phoneId is required");

        let err = ValidationError::OutOfRange {
            field: "taxRate".to_string(),
            min: 0,
            max: 10000,
        };
        assert_eq!(err.to_string(), "taxRate must be between 0 and 10000");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "phoneId".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
