//! # Domain Types
//!
//! Core domain types shared by every component of the ordering flow.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    MenuItem     │   │  TableSession   │   │  OrderRequest   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  table_id       │   │  table_id       │       │
//! │  │  name           │   │  provenance     │   │  items[]        │       │
//! │  │  description    │   └─────────────────┘   │   menu_item_id  │       │
//! │  │  price (Money)  │                         │   quantity      │       │
//! │  │  category?      │   ┌─────────────────┐   └─────────────────┘       │
//! │  └─────────────────┘   │   Provenance    │                              │
//! │                        │  Manual         │   ┌─────────────────┐       │
//! │  ┌──────────────────┐  │  Scanned        │   │  OrderResult    │       │
//! │  │AsyncOperationState│ └─────────────────┘   │  order_id       │       │
//! │  │ Idle → InFlight  │                        │  table_id       │       │
//! │  │ → Succeeded|Failed│                       │  placed_at      │       │
//! │  └──────────────────┘                        └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Menu Item
// =============================================================================

/// A purchasable menu entry, exactly as `GET /menu` returns it.
///
/// Immutable once loaded. The catalog owns the list; everyone else reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MenuItem {
    /// Stable unique identifier. Older backends send it as `_id`.
    #[serde(alias = "_id")]
    pub id: String,

    /// Display name.
    pub name: String,

    /// Free-text description.
    #[serde(default)]
    pub description: String,

    /// Unit price (non-negative).
    pub price: Money,

    /// Menu section such as "Starters". Display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

// =============================================================================
// Table Session
// =============================================================================

/// Where a table identifier came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Provenance {
    /// Typed in by the patron or staff.
    Manual,

    /// Derived from a decoded table code.
    Scanned {
        /// The raw decoded text, kept for diagnostics.
        payload: String,
    },
}

/// The table the current session is ordering for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TableSession {
    /// Opaque table identifier sent with every order.
    pub table_id: String,

    /// How the identifier was obtained.
    pub provenance: Provenance,
}

impl TableSession {
    /// A session from manual entry. The text is kept verbatim.
    pub fn manual(raw: impl Into<String>) -> Self {
        TableSession {
            table_id: raw.into(),
            provenance: Provenance::Manual,
        }
    }

    /// A session derived from a scanned payload.
    pub fn scanned(table_id: impl Into<String>, payload: impl Into<String>) -> Self {
        TableSession {
            table_id: table_id.into(),
            provenance: Provenance::Scanned {
                payload: payload.into(),
            },
        }
    }
}

// =============================================================================
// Order Request / Result
// =============================================================================

/// One `(menu item, quantity)` pair of an order.
///
/// Price is intentionally absent: the backend prices the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub menu_item_id: String,
    pub quantity: u32,
}

/// Body of `POST /order`.
///
/// ```json
/// { "table_id": "7", "items": [{ "menu_item_id": "a", "quantity": 1 }] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub table_id: String,
    pub items: Vec<OrderLine>,
}

/// A successfully placed order.
///
/// Only the latest one is kept; placing another overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderResult {
    /// Identifier assigned by the backend.
    pub order_id: String,

    /// Table the order was placed for.
    pub table_id: String,

    /// Local time the backend accepted the order.
    #[ts(as = "String")]
    pub placed_at: DateTime<Utc>,
}

// =============================================================================
// Async Operation State
// =============================================================================

/// Lifecycle of one asynchronous operation.
///
/// ## Transitions
/// ```text
/// Idle ──start()──► InFlight ──finish(Ok)──► Succeeded(T)
///                       │
///                       └────finish(Err)──► Failed(message)
///
/// Succeeded / Failed ──start()──► InFlight   (next attempt)
/// ```
///
/// Every operation (menu load, submit, code fetch) owns its own instance;
/// they never share a status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum AsyncOperationState<T> {
    Idle,
    InFlight,
    Succeeded(T),
    Failed(String),
}

impl<T> Default for AsyncOperationState<T> {
    fn default() -> Self {
        AsyncOperationState::Idle
    }
}

impl<T> AsyncOperationState<T> {
    /// Enters `InFlight` from any state.
    pub fn start(&mut self) {
        *self = AsyncOperationState::InFlight;
    }

    /// Applies the terminal transition.
    ///
    /// Returns `false` (and changes nothing) unless the operation is
    /// currently `InFlight`, so a terminal state is never skipped into.
    pub fn finish(&mut self, outcome: Result<T, String>) -> bool {
        if !self.is_in_flight() {
            return false;
        }

        *self = match outcome {
            Ok(value) => AsyncOperationState::Succeeded(value),
            Err(message) => AsyncOperationState::Failed(message),
        };
        true
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, AsyncOperationState::Idle)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, AsyncOperationState::InFlight)
    }

    /// The success payload, if the last attempt succeeded.
    pub fn value(&self) -> Option<&T> {
        match self {
            AsyncOperationState::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    /// The failure message, if the last attempt failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            AsyncOperationState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_menu_item_wire_format() {
        let json = r#"{"id":"a","name":"Soup","description":"Tomato","price":5.0}"#;
        let item: MenuItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "a");
        assert_eq!(item.price, Money::from_cents(500));
        assert_eq!(item.category, None);
    }

    #[test]
    fn test_menu_item_accepts_legacy_id() {
        let json = r#"{"_id":"65f0","name":"Bread","price":2.5,"category":"Sides"}"#;
        let item: MenuItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "65f0");
        assert_eq!(item.description, "");
        assert_eq!(item.price.cents(), 250);
        assert_eq!(item.category.as_deref(), Some("Sides"));
    }

    #[test]
    fn test_order_request_wire_format() {
        let request = OrderRequest {
            table_id: "7".to_string(),
            items: vec![OrderLine {
                menu_item_id: "a".to_string(),
                quantity: 1,
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "table_id": "7",
                "items": [{ "menu_item_id": "a", "quantity": 1 }]
            })
        );
    }

    #[test]
    fn test_async_state_transitions() {
        let mut state: AsyncOperationState<u32> = AsyncOperationState::default();
        assert!(state.is_idle());

        // Terminal transitions are refused outside InFlight
        assert!(!state.finish(Ok(1)));
        assert!(state.is_idle());

        state.start();
        assert!(state.is_in_flight());
        assert!(state.finish(Ok(7)));
        assert_eq!(state.value(), Some(&7));

        state.start();
        assert!(state.finish(Err("backend down".to_string())));
        assert_eq!(state.error(), Some("backend down"));
        assert_eq!(state.value(), None);
    }

    #[test]
    fn test_provenance_serialization() {
        let session = TableSession::scanned("42", "https://host/table/42");
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["provenance"]["kind"], "scanned");
        assert_eq!(value["provenance"]["payload"], "https://host/table/42");
    }
}
