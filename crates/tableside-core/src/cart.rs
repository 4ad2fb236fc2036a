//! # Cart
//!
//! The patron's in-progress order.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Patron Action            Operation               Cart Change           │
//! │  ─────────────            ─────────               ───────────           │
//! │                                                                         │
//! │  Tap menu item ──────────► add_item() ──────────► push line (qty 1)     │
//! │                                         or ─────► set_quantity(q + 1)   │
//! │                                                                         │
//! │  Type in qty box ────────► set_quantity_text() ─► lines[i].qty = n      │
//! │                                                                         │
//! │  View cart ──────────────► total() ─────────────► (read only)           │
//! │                                                                         │
//! │  Order accepted ─────────► clear() ─────────────► lines.clear()         │
//! │                                                                         │
//! │  NOTE: clear() is only ever driven by a successful order.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{MenuItem, OrderLine};
use crate::validation::{parse_quantity, validate_price, validate_quantity};
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

/// One aggregated `(item, quantity)` entry.
///
/// ## Design Notes
/// The line holds a copy of the menu item as loaded. The price shown in the
/// cart is the menu price; the backend prices the actual order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct CartLine {
    /// Item as it appeared on the menu.
    pub item: MenuItem,

    /// Always >= 1.
    pub quantity: u32,
}

impl CartLine {
    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.item.price.multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - At most one line per menu item id (adding again increases quantity)
/// - Every quantity is in `1..=MAX_ITEM_QUANTITY`; invalid input is rejected
///   and the previous quantity kept
/// - At most `MAX_CART_LINES` distinct lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,

    /// When the cart was created/last cleared
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds one unit of a menu item.
    ///
    /// ## Behavior
    /// - Item already in cart: quantity + 1 (through `set_quantity`)
    /// - Item not in cart: new line with quantity 1, appended
    /// - Price above `MAX_PRICE_CENTS`: rejected, cart unchanged
    pub fn add_item(&mut self, item: &MenuItem) -> CoreResult<()> {
        validate_price(item.price)?;

        if let Some(line) = self.line(&item.id) {
            let next = i64::from(line.quantity) + 1;
            if next > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: next,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            return self.set_quantity(&item.id, next);
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        debug!(item_id = %item.id, "Cart line added");
        self.lines.push(CartLine {
            item: item.clone(),
            quantity: 1,
        });
        Ok(())
    }

    /// Replaces the quantity of an existing line.
    ///
    /// ## Behavior
    /// - Quantity must be in `1..=999`; anything else is rejected and the
    ///   line keeps its previous quantity
    /// - Item not in cart: `ItemNotInCart`
    pub fn set_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        let quantity = validate_quantity(quantity)?;
        self.apply_quantity(item_id, quantity)
    }

    /// Replaces the quantity of an existing line from free-text entry.
    ///
    /// `"3"` sets 3; `"0"`, `"-1"`, `"abc"` are rejected.
    pub fn set_quantity_text(&mut self, item_id: &str, text: &str) -> CoreResult<()> {
        let quantity = parse_quantity(text)?;
        self.apply_quantity(item_id, quantity)
    }

    fn apply_quantity(&mut self, item_id: &str, quantity: u32) -> CoreResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.item.id == item_id)
            .ok_or_else(|| CoreError::ItemNotInCart(item_id.to_string()))?;

        debug!(item_id, from = line.quantity, to = quantity, "Cart quantity set");
        line.quantity = quantity;
        Ok(())
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    /// Σ price × quantity, recomputed on every call.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Looks up the line for a menu item.
    pub fn line(&self, item_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.item.id == item_id)
    }

    /// Returns the number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity over all lines.
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The `(menu_item_id, quantity)` pairs of an order, in line order.
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.lines
            .iter()
            .map(|l| OrderLine {
                menu_item_id: l.item.id.clone(),
                quantity: l.quantity,
            })
            .collect()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

/// Cart contents plus totals, for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub line_count: usize,
    pub total_quantity: u64,
    pub total: Money,
}

impl From<&Cart> for CartSummary {
    fn from(cart: &Cart) -> Self {
        CartSummary {
            lines: cart.lines.clone(),
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            total: cart.total(),
        }
    }
}
