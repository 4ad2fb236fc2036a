//! # Ordering Session
//!
//! One patron session at one table: the five components wired together.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        OrderingSession                                  │
//! │                                                                         │
//! │   Arc<dyn BackendApi> ──────┬──────────────┬──────────────┐            │
//! │                             ▼              ▼              ▼            │
//! │                       MenuCatalog   OrderSubmission  CodeProvisioning  │
//! │                                       │      │                          │
//! │                     Arc<CartState> ◄──┘      └──► Arc<TableState>      │
//! │                           ▲                            ▲               │
//! │                     add / qty edits           manual entry, scans      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation both returns its result and publishes it through the
//! component's watch channel.

use std::sync::Arc;

use tableside_core::{
    AsyncOperationState, CoreError, MenuItem, OrderResult, ScanEvent, ScanTicket, TableSession,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::{BackendApi, CodeImage, PlacedOrder, TableInfo};
use crate::catalog::MenuCatalog;
use crate::error::ClientResult;
use crate::provisioning::{CodeProvisioning, ProvisionedTable};
use crate::scanner::{drive_scan, ScanReport};
use crate::state::{CartState, TableState};
use crate::submission::OrderSubmission;

/// Buffered events between a sensor and its scan driver.
const SCAN_EVENT_BUFFER: usize = 16;

/// A running scan: push sensor events into `events`; `task` finishes when
/// the scan does.
#[derive(Debug)]
pub struct ScanHandle {
    pub ticket: ScanTicket,
    pub events: mpsc::Sender<ScanEvent>,
    pub task: JoinHandle<ScanReport>,
}

pub struct OrderingSession {
    catalog: MenuCatalog,
    cart: Arc<CartState>,
    table: Arc<TableState>,
    submission: OrderSubmission,
    provisioning: CodeProvisioning,
}

impl OrderingSession {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        let cart = Arc::new(CartState::new());
        let table = Arc::new(TableState::new());

        OrderingSession {
            catalog: MenuCatalog::new(backend.clone()),
            submission: OrderSubmission::new(backend.clone(), cart.clone(), table.clone()),
            provisioning: CodeProvisioning::new(backend),
            cart,
            table,
        }
    }

    /// Startup work, run once: the first menu load.
    pub async fn initialize(&self) -> AsyncOperationState<usize> {
        self.catalog.initialize().await
    }

    // =========================================================================
    // Component Access
    // =========================================================================

    pub fn catalog(&self) -> &MenuCatalog {
        &self.catalog
    }

    pub fn cart(&self) -> &CartState {
        &self.cart
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub fn submission(&self) -> &OrderSubmission {
        &self.submission
    }

    pub fn provisioning(&self) -> &CodeProvisioning {
        &self.provisioning
    }

    // =========================================================================
    // Menu & Cart
    // =========================================================================

    pub async fn reload_menu(&self) -> ClientResult<Vec<MenuItem>> {
        self.catalog.load().await
    }

    /// Adds one of the menu item `item_id` to the cart.
    pub fn add_item(&self, item_id: &str) -> ClientResult<()> {
        let item = self
            .catalog
            .item(item_id)
            .ok_or_else(|| CoreError::UnknownMenuItem(item_id.to_string()))?;
        self.cart.add_item(&item)?;
        Ok(())
    }

    /// Sets a line's quantity from free-text entry.
    pub fn set_quantity_text(&self, item_id: &str, text: &str) -> ClientResult<()> {
        self.cart.set_quantity_text(item_id, text)?;
        Ok(())
    }

    // =========================================================================
    // Table Identity
    // =========================================================================

    pub fn enter_table(&self, raw: &str) -> TableSession {
        self.table.enter_manually(raw)
    }

    /// Starts a scan and spawns its driver on the current runtime.
    pub fn start_scan(&self) -> ScanHandle {
        let ticket = self.table.begin_scan();
        let (events, receiver) = mpsc::channel(SCAN_EVENT_BUFFER);
        let task = tokio::spawn(drive_scan(self.table.clone(), ticket, receiver));
        debug!(?ticket, "Scan driver spawned");

        ScanHandle {
            ticket,
            events,
            task,
        }
    }

    pub fn cancel_scan(&self) -> bool {
        self.table.cancel_scan()
    }

    // =========================================================================
    // Orders & Codes
    // =========================================================================

    pub async fn place_order(&self) -> ClientResult<OrderResult> {
        self.submission.submit().await
    }

    pub async fn refresh_last_order(&self) -> ClientResult<PlacedOrder> {
        self.submission.refresh_last_order().await
    }

    pub async fn provision_code(&self, table_id: &str) -> ClientResult<CodeImage> {
        self.provisioning.provision(table_id).await
    }

    pub async fn lookup_table(&self, table_id: &str) -> ClientResult<TableInfo> {
        self.provisioning.lookup_table(table_id).await
    }

    pub async fn register_table(&self, table_number: u32, seats: u32) -> ClientResult<ProvisionedTable> {
        self.provisioning
            .register_and_provision(table_number, seats)
            .await
    }
}
