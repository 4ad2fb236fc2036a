//! # Error Types
//!
//! Domain-specific error types for tableside-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tableside-core errors (this file)                                     │
//! │  ├── CoreError        - Cart and order rule violations                 │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tableside-client errors (separate crate)                              │
//! │  └── ClientError      - Network, backend rejection, config             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → presentation        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant here is an `InvalidInput` in the client's taxonomy: it is
//! rejected at the boundary and never stored.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Ordering rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The item has no line in the cart.
    ///
    /// ## When This Occurs
    /// - Quantity entry for an item that was never added
    /// - A stale presentation layer still showing a line after an order cleared the cart
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// The id names no item of the loaded menu.
    #[error("Unknown menu item: {0}")]
    UnknownMenuItem(String),

    /// The cart already holds the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// An order was attempted with nothing in the cart.
    #[error("Cannot place an order with an empty cart")]
    EmptyCart,

    /// An order was attempted before the table was identified.
    ///
    /// ## User Workflow
    /// ```text
    /// Patron taps "Place Order"
    ///      │
    ///      ▼
    /// TableIdentity: Unresolved (or resolved to "")
    ///      │
    ///      ▼
    /// TableNotResolved → UI asks to scan the table code
    /// ```
    #[error("Table has not been identified")]
    TableNotResolved,

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
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-numeric quantity, malformed price).
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
        let err = CoreError::QuantityTooLarge {
            requested: 1500,
            max: 999,
        };
        assert_eq!(err.to_string(), "Quantity 1500 exceeds maximum allowed (999)");
        assert_eq!(
            CoreError::ItemNotInCart("soup".into()).to_string(),
            "Item not in cart: soup"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");

        let err = ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "not a whole number".to_string(),
        };
        assert_eq!(err.to_string(), "quantity has invalid format: not a whole number");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "table_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
