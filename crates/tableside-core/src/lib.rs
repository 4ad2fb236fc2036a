//! # tableside-core: Pure Ordering Logic
//!
//! The state machines of the table-service ordering flow, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tableside Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Presentation (kiosk / web view)              │   │
//! │  │    Scan table ──► Browse menu ──► Cart ──► Place order          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tableside-client                             │   │
//! │  │    MenuCatalog, OrderSubmission, CodeProvisioning, HTTP         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tableside-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │   table   │  │   │
//! │  │   │ MenuItem  │  │   Money   │  │   Cart    │  │ Identity  │  │   │
//! │  │   │ OrderReq  │  │  decimal  │  │ CartLine  │  │ ScanEvent │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO ENVIRONMENT                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (MenuItem, TableSession, OrderRequest, ...)
//! - [`money`] - Integer-cent money with exact decimal wire conversion
//! - [`cart`] - Cart lines, quantities and totals
//! - [`table`] - Table identity state machine and scan payload resolution
//! - [`order`] - Order request construction and its preconditions
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tableside_core::{build_order_request, Cart, MenuItem, Money, TableIdentity};
//!
//! let soup = MenuItem {
//!     id: "a".into(),
//!     name: "Soup".into(),
//!     description: String::new(),
//!     price: Money::from_cents(500),
//!     category: None,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add_item(&soup).unwrap();
//!
//! let mut table = TableIdentity::new();
//! table.enter_manually("7");
//!
//! let request = build_order_request(&table, &cart).unwrap();
//! assert_eq!(request.table_id, "7");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod order;
pub mod table;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartSummary};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::build_order_request;
pub use table::{
    resolve_scan_payload, ScanEvent, ScanOutcome, ScanTicket, TableIdentity, TableStatus,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single item in cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest menu price accepted, in cents ($10,000,000.00)
///
/// A full cart at this price (100 lines × 999 × price) stays far inside `i64`.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;
