//! # tableside-client: Backend Client and Async State Machines
//!
//! Everything in the ordering flow that waits on something: the backend,
//! the scan sensor, or the patron.
//!
//! ## Module Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       tableside-client                                  │
//! │                                                                         │
//! │  session.rs      OrderingSession: wires the components together        │
//! │  catalog.rs      MenuCatalog: GET /menu, newest load wins              │
//! │  submission.rs   OrderSubmission: POST /order, single-flight           │
//! │  provisioning.rs CodeProvisioning: GET /generate_qr, GET/POST /table   │
//! │  scanner.rs      drive_scan: sensor event stream → TableState          │
//! │  state.rs        CartState, TableState, OperationCell (watch-based)    │
//! │  api.rs          BackendApi trait + HttpBackend (reqwest)              │
//! │  config.rs       ClientConfig (TOML + environment)                     │
//! │  error.rs        ClientError, ErrorKind                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let config = ClientConfig::load(None)?;
//! let backend = Arc::new(HttpBackend::new(&config)?);
//! let session = OrderingSession::new(backend);
//!
//! session.initialize().await;
//! session.add_item("a")?;
//! session.enter_table("7");
//! let order = session.place_order().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod provisioning;
pub mod scanner;
pub mod session;
pub mod state;
pub mod submission;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use api::{BackendApi, CodeImage, HttpBackend, PlacedOrder, TableInfo};
pub use catalog::MenuCatalog;
pub use config::{BackendSettings, ClientConfig};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use provisioning::{CodeProvisioning, ProvisionedTable};
pub use scanner::{drive_scan, ScanEnd, ScanReport};
pub use session::{OrderingSession, ScanHandle};
pub use state::{CartState, OperationCell, TableState};
pub use submission::OrderSubmission;
