//! # Validation Module
//!
//! Input validation at the boundary of the ordering state machine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation                                                  │
//! │  └── Free-text quantity box, table entry field                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Quantity text → positive whole number                              │
//! │  ├── Table identifier present at submit time                            │
//! │  └── Menu payload sanity (ids, prices)                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                       │
//! │  └── Table exists, items exist, price at order time                     │
//! │                                                                         │
//! │  Invalid input is rejected here and never stored.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::MenuItem;
use crate::{MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Quantity Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<u32> {
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

    // In range 1..=999, always fits
    Ok(qty as u32)
}

/// Parses a free-text quantity entry.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: quantity box                                                     │
/// │                                                                         │
/// │  Patron types: " 3 "                                                    │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  parse_quantity(" 3 ") ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── not a whole number? → InvalidFormat                           │
/// │       ├── <= 0?               → MustBePositive                          │
/// │       ├── > 999?              → OutOfRange                              │
/// │       │                                                                 │
/// │       └── OK(3) → Cart::set_quantity                                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn parse_quantity(text: &str) -> ValidationResult<u32> {
    let text = text.trim();

    if text.is_empty() {
        return Err(ValidationError::Required {
            field: "quantity".to_string(),
        });
    }

    let qty: i64 = text.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "quantity".to_string(),
        reason: format!("'{}' is not a whole number", text),
    })?;

    validate_quantity(qty)
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates that a table identifier is usable for an order.
///
/// Manual entry stores whatever was typed; this check only runs when an
/// order is about to be built.
pub fn validate_table_id(table_id: &str) -> ValidationResult<()> {
    if table_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "table_id".to_string(),
        });
    }

    Ok(())
}

/// Validates a price.
///
/// ## Rules
/// - Zero is allowed (complimentary items)
/// - Must not exceed MAX_PRICE_CENTS, so cart totals cannot overflow
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() || price.cents() > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a freshly loaded menu.
///
/// ## Rules
/// - Every item has a non-empty id and name
/// - Ids are unique
/// - Prices are in `0..=MAX_PRICE_CENTS`
pub fn validate_menu(items: &[MenuItem]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(items.len());

    for item in items {
        if item.id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "menu item id".to_string(),
            });
        }

        if item.name.trim().is_empty() {
            return Err(ValidationError::Required {
                field: format!("name of menu item {}", item.id),
            });
        }

        validate_price(item.price)?;

        if !seen.insert(item.id.as_str()) {
            return Err(ValidationError::InvalidFormat {
                field: "menu".to_string(),
                reason: format!("duplicate item id '{}'", item.id),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
