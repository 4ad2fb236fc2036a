//! # Order Submission
//!
//! Turns the cart and the resolved table into a placed order.
//!
//! ## Submit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Order Submission                                │
//! │                                                                         │
//! │  submit()                                                              │
//! │     │                                                                   │
//! │     ├── already InFlight ────────────► SubmissionInFlight (no request) │
//! │     ├── table unresolved ────────────► TableNotResolved   (no request) │
//! │     ├── cart empty ──────────────────► EmptyCart          (no request) │
//! │     ▼                                                                   │
//! │  InFlight ──POST /order──┬──► Succeeded(OrderResult)                   │
//! │                          │      cart cleared, table kept               │
//! │                          │                                              │
//! │                          └──► Failed(message)                          │
//! │                                 cart and table untouched, retry allowed│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Edits made to the cart while the request is in flight stay applied; a
//! successful submit still clears the whole cart.

use std::sync::Arc;

use chrono::Utc;
use tableside_core::{build_order_request, AsyncOperationState, OrderResult};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{BackendApi, PlacedOrder};
use crate::error::{ClientError, ClientResult};
use crate::state::{CartState, OperationCell, TableState};

pub struct OrderSubmission {
    backend: Arc<dyn BackendApi>,
    cart: Arc<CartState>,
    table: Arc<TableState>,
    status: OperationCell<OrderResult>,
    last_order: watch::Sender<Option<OrderResult>>,
}

impl OrderSubmission {
    pub fn new(backend: Arc<dyn BackendApi>, cart: Arc<CartState>, table: Arc<TableState>) -> Self {
        OrderSubmission {
            backend,
            cart,
            table,
            status: OperationCell::new(),
            last_order: watch::Sender::new(None),
        }
    }

    /// Places the current cart as an order for the current table.
    pub async fn submit(&self) -> ClientResult<OrderResult> {
        if self.status.is_in_flight() {
            debug!("Order submission refused: already in flight");
            return Err(ClientError::SubmissionInFlight);
        }

        let request = self
            .table
            .with_table(|table| self.cart.with_cart(|cart| build_order_request(table, cart)))?;

        if !self.status.try_start() {
            return Err(ClientError::SubmissionInFlight);
        }
        debug!(
            table_id = %request.table_id,
            lines = request.items.len(),
            "Order submission started"
        );

        match self.backend.place_order(&request).await {
            Ok(order_id) => {
                let result = OrderResult {
                    order_id,
                    table_id: request.table_id,
                    placed_at: Utc::now(),
                };
                self.cart.clear();
                self.last_order.send_replace(Some(result.clone()));
                self.status.finish(Ok(result.clone()));
                info!(order_id = %result.order_id, table_id = %result.table_id, "Order placed");
                Ok(result)
            }
            Err(err) => {
                warn!(table_id = %request.table_id, error = %err, "Order submission failed");
                self.status.finish(Err(err.to_string()));
                Err(err)
            }
        }
    }

    /// Asks the backend for its current view of the most recent order.
    ///
    /// Read-only: submission state is not touched.
    pub async fn refresh_last_order(&self) -> ClientResult<PlacedOrder> {
        let order_id = self
            .last_order
            .borrow()
            .as_ref()
            .map(|order| order.order_id.clone())
            .ok_or(ClientError::NoOrderPlaced)?;

        let order = self.backend.fetch_order(&order_id).await?;
        debug!(order_id = %order_id, status = %order.status, "Order status refreshed");
        Ok(order)
    }

    pub fn status(&self) -> AsyncOperationState<OrderResult> {
        self.status.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<AsyncOperationState<OrderResult>> {
        self.status.subscribe()
    }

    /// The most recently placed order. Overwritten by each success; kept
    /// through later failures.
    pub fn last_order(&self) -> Option<OrderResult> {
        self.last_order.borrow().clone()
    }
}
