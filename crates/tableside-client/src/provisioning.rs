//! # Code Provisioning
//!
//! Requests the printable table code for a table, and registers new tables.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Table Code Provisioning                            │
//! │                                                                         │
//! │  Staff: "register 12 4"        (or "lookup <id>" for an existing one)  │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  POST /table {table_number: 12, seats: 4} ──► table_id                 │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  provision(table_id)                                                   │
//! │      │   blank id → InvalidInput, no request                           │
//! │      ▼                                                                  │
//! │  GET /generate_qr/{table_id} ──► CodeImage { url, content_type }       │
//! │                                                                         │
//! │  Independent of the scan path: provisioning never resolves the         │
//! │  session's table.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tableside_core::validation::validate_table_id;
use tableside_core::{AsyncOperationState, ValidationError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{BackendApi, CodeImage, TableInfo};
use crate::error::ClientResult;
use crate::state::OperationCell;

/// A freshly registered table and its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionedTable {
    pub table_id: String,
    pub image: CodeImage,
}

/// Tracks the most recent code request. A newer request supersedes a
/// pending one.
pub struct CodeProvisioning {
    backend: Arc<dyn BackendApi>,
    status: OperationCell<CodeImage>,
    generation: AtomicU64,
}

impl CodeProvisioning {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        CodeProvisioning {
            backend,
            status: OperationCell::new(),
            generation: AtomicU64::new(0),
        }
    }

    /// Requests the code image for `table_id`.
    pub async fn provision(&self, table_id: &str) -> ClientResult<CodeImage> {
        validate_table_id(table_id)?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.status.start();
        debug!(generation, table_id, "Code request started");

        let outcome = self.backend.fetch_code_image(table_id).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, table_id, "Superseded code request discarded");
            return outcome;
        }

        match &outcome {
            Ok(image) => {
                info!(table_id, url = %image.url, "Table code ready");
                self.status.finish(Ok(image.clone()));
            }
            Err(err) => {
                warn!(table_id, error = %err, "Table code request failed");
                self.status.finish(Err(err.to_string()));
            }
        }
        outcome
    }

    /// Creates a table on the backend and returns its id.
    pub async fn register_table(&self, table_number: u32, seats: u32) -> ClientResult<String> {
        if table_number == 0 {
            return Err(ValidationError::MustBePositive {
                field: "table_number".into(),
            }
            .into());
        }
        if seats == 0 {
            return Err(ValidationError::MustBePositive {
                field: "seats".into(),
            }
            .into());
        }

        let table_id = self.backend.create_table(table_number, seats).await?;
        info!(table_number, seats, table_id = %table_id, "Table registered");
        Ok(table_id)
    }

    /// Looks up a registered table. Does not touch the code status.
    pub async fn lookup_table(&self, table_id: &str) -> ClientResult<TableInfo> {
        validate_table_id(table_id)?;

        let table = self.backend.fetch_table(table_id).await?;
        debug!(table_id, table_number = table.table_number, seats = table.seats, "Table found");
        Ok(table)
    }

    /// Registers a table, then provisions its code.
    pub async fn register_and_provision(
        &self,
        table_number: u32,
        seats: u32,
    ) -> ClientResult<ProvisionedTable> {
        let table_id = self.register_table(table_number, seats).await?;
        let image = self.provision(&table_id).await?;
        Ok(ProvisionedTable { table_id, image })
    }

    pub fn status(&self) -> AsyncOperationState<CodeImage> {
        self.status.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<AsyncOperationState<CodeImage>> {
        self.status.subscribe()
    }

    /// The current image reference. `None` unless the latest request
    /// succeeded.
    pub fn image(&self) -> Option<CodeImage> {
        self.status.get().value().cloned()
    }
}
