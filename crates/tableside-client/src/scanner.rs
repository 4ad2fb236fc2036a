//! # Scan Driver
//!
//! Feeds a scan sensor's event stream into the table identity.
//!
//! ## Event Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Scan Driver                                   │
//! │                                                                         │
//! │   sensor ──mpsc<ScanEvent>──► drive_scan(ticket) ──► TableState         │
//! │                                    │                                    │
//! │              ┌─────────────────────┼────────────────────────┐          │
//! │              ▼                     ▼                        ▼          │
//! │        Decoded(payload)      Error(message)          table changed     │
//! │        → Resolved: stop      → noise: keep going     elsewhere         │
//! │                                                      (cancel, manual,  │
//! │                                                       newer scan)      │
//! │                                                      → stop            │
//! │                                                                         │
//! │   Stream closed (sensor gone) → stop, table left as it is              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tableside_core::{ScanEvent, ScanOutcome, ScanTicket, TableSession};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::ErrorKind;
use crate::state::TableState;

/// How a driven scan ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEnd {
    /// A decode resolved the table.
    Resolved(TableSession),

    /// The scan stopped for another reason: cancelled, replaced by manual
    /// entry, or superseded by a newer scan.
    Stopped,

    /// The sensor closed its stream while the scan was still running.
    StreamClosed,
}

/// Summary of one driven scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub ticket: ScanTicket,
    pub end: ScanEnd,
    /// Decode errors and empty decodes seen along the way.
    pub noise: usize,
}

/// Consumes `events` on behalf of the scan with `ticket` until the scan
/// leaves `Resolving`.
pub async fn drive_scan(
    table: Arc<TableState>,
    ticket: ScanTicket,
    mut events: mpsc::Receiver<ScanEvent>,
) -> ScanReport {
    let mut changes = table.subscribe();
    let mut noise = 0;

    let end = loop {
        if table.active_ticket() != Some(ticket) {
            break ScanEnd::Stopped;
        }

        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    debug!(?ticket, "Scan event stream closed");
                    break ScanEnd::StreamClosed;
                };
                match table.apply_scan_event(ticket, event) {
                    ScanOutcome::Resolved(session) => break ScanEnd::Resolved(session),
                    ScanOutcome::Noise => {
                        noise += 1;
                        debug!(?ticket, kind = %ErrorKind::DecodeNoise, noise, "Scan frame discarded");
                    }
                    ScanOutcome::Ignored => break ScanEnd::Stopped,
                }
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break ScanEnd::Stopped;
                }
                changes.borrow_and_update();
            }
        }
    };

    match &end {
        ScanEnd::Resolved(session) => {
            info!(?ticket, table_id = %session.table_id, noise, "Scan resolved table")
        }
        other => debug!(?ticket, end = ?other, noise, "Scan ended"),
    }
    ScanReport { ticket, end, noise }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tableside_core::Provenance;

    #[tokio::test]
    async fn test_first_decode_resolves() {
        let table = Arc::new(TableState::new());
        let ticket = table.begin_scan();
        let (tx, rx) = mpsc::channel(8);

        tx.send(ScanEvent::Error("blurry".into())).await.unwrap();
        tx.send(ScanEvent::Decoded("   ".into())).await.unwrap();
        tx.send(ScanEvent::Decoded("https://host/table/42".into()))
            .await
            .unwrap();
        tx.send(ScanEvent::Decoded("https://host/table/43".into()))
            .await
            .unwrap();

        let report = drive_scan(table.clone(), ticket, rx).await;

        assert_eq!(report.noise, 2);
        assert_eq!(
            report.end,
            ScanEnd::Resolved(TableSession {
                table_id: "42".into(),
                provenance: Provenance::Scanned {
                    payload: "https://host/table/42".into()
                },
            })
        );
        assert_eq!(table.table_id().as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_cancel_stops_driver() {
        let table = Arc::new(TableState::new());
        let ticket = table.begin_scan();
        let (tx, rx) = mpsc::channel(8);

        let driver = tokio::spawn(drive_scan(table.clone(), ticket, rx));
        tokio::task::yield_now().await;
        assert!(table.cancel_scan());

        let report = driver.await.unwrap();
        assert_eq!(report.end, ScanEnd::Stopped);
        assert_eq!(table.table_id(), None);
        drop(tx);
    }

    #[tokio::test]
    async fn test_manual_entry_stops_driver() {
        let table = Arc::new(TableState::new());
        let ticket = table.begin_scan();
        let (_tx, rx) = mpsc::channel(8);

        let driver = tokio::spawn(drive_scan(table.clone(), ticket, rx));
        table.enter_manually("12");

        let report = driver.await.unwrap();
        assert_eq!(report.end, ScanEnd::Stopped);
        assert_eq!(table.table_id().as_deref(), Some("12"));
    }

    #[tokio::test]
    async fn test_closed_stream_keeps_previous_table() {
        let table = Arc::new(TableState::new());
        table.enter_manually("7");
        let ticket = table.begin_scan();
        let (tx, rx) = mpsc::channel(8);
        drop(tx);

        let report = drive_scan(table.clone(), ticket, rx).await;

        assert_eq!(report.end, ScanEnd::StreamClosed);
        assert!(table.with_table(|t| t.is_scanning()));
        assert_eq!(table.table_id().as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_stale_ticket_stops_immediately() {
        let table = Arc::new(TableState::new());
        let old = table.begin_scan();
        let _new = table.begin_scan();
        let (_tx, rx) = mpsc::channel(8);

        let report = drive_scan(table, old, rx).await;
        assert_eq!(report.end, ScanEnd::Stopped);
    }
}
