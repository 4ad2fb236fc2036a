//! # Order Building
//!
//! Turns the cart and the resolved table into the body of `POST /order`.
//!
//! ```text
//! TableIdentity ──table_id──┐
//!                           ├──► build_order_request() ──► OrderRequest
//! Cart ─────order_lines()───┘         │
//!                                     ├── table unresolved/blank → TableNotResolved
//!                                     └── cart empty            → EmptyCart
//! ```
//!
//! These preconditions belong to the state machine, not to a disabled
//! button: a request that fails them is never built, so it is never sent.

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::table::TableIdentity;
use crate::types::OrderRequest;
use crate::validation::validate_table_id;

/// Builds the order for the current table and cart.
///
/// Reads both sides without modifying either.
pub fn build_order_request(table: &TableIdentity, cart: &Cart) -> CoreResult<OrderRequest> {
    let table_id = table.table_id().ok_or(CoreError::TableNotResolved)?;
    validate_table_id(table_id).map_err(|_| CoreError::TableNotResolved)?;

    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    Ok(OrderRequest {
        table_id: table_id.to_string(),
        items: cart.order_lines(),
    })
}
