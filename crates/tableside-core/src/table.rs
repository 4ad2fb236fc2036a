//! # Table Identity
//!
//! Resolves which table the current session is ordering for.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    TableIdentity Transitions                            │
//! │                                                                         │
//! │                 enter_manually(text)                                    │
//! │   ┌────────────┐ ─────────────────────────────────────► ┌──────────┐    │
//! │   │ Unresolved │                                        │ Resolved │    │
//! │   └────────────┘ ──begin_scan()──► ┌───────────┐        └──────────┘    │
//! │         ▲                          │ Resolving │ ──first     ▲  │       │
//! │         │        cancel_scan()     │ (ticket)  │   decode ───┘  │       │
//! │         └───────────────────────── └───────────┘                │       │
//! │                                         ▲  │ decode error       │       │
//! │                                         │  └──► (logged, stays) │       │
//! │                                         └──── begin_scan() ─────┘       │
//! │                                                                         │
//! │  Re-scan from Resolved keeps the old table in effect until a new        │
//! │  decode succeeds (replaces it) or the scan is cancelled (drops it).     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The scan sensor itself is a black box. This module only sees the events
//! it produces: decoded text, or a decode error.

use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::types::TableSession;

// =============================================================================
// Scan Events
// =============================================================================

/// Identifies one scan attempt. Events for an older attempt are ignored.
///
/// Issued tickets start at 1; the default ticket matches no scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ScanTicket(u64);

/// One event from the scan sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// The sensor decoded a code to this text.
    Decoded(String),

    /// The sensor failed to decode a frame. Never fatal.
    Error(String),
}

/// What a scan event did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The event resolved the table.
    Resolved(TableSession),

    /// Decode noise: logged, state unchanged, scanning continues.
    Noise,

    /// The event arrived when no scan with its ticket was running.
    Ignored,
}

// =============================================================================
// Table Status
// =============================================================================

/// Current resolution state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TableStatus {
    Unresolved,

    /// A scan is running.
    Resolving {
        ticket: ScanTicket,
        /// Resolution still in effect while a re-scan runs.
        previous: Option<TableSession>,
    },

    Resolved { session: TableSession },
}

/// The table-identity state machine.
///
/// Mutable only through manual entry and the scan path.
#[derive(Debug, Clone)]
pub struct TableIdentity {
    status: TableStatus,
    next_ticket: u64,
}

impl TableIdentity {
    pub fn new() -> Self {
        TableIdentity {
            status: TableStatus::Unresolved,
            next_ticket: 1,
        }
    }

    pub fn status(&self) -> &TableStatus {
        &self.status
    }

    /// The session currently in effect, if any.
    ///
    /// During a re-scan this is still the previous resolution.
    pub fn session(&self) -> Option<&TableSession> {
        match &self.status {
            TableStatus::Unresolved => None,
            TableStatus::Resolving { previous, .. } => previous.as_ref(),
            TableStatus::Resolved { session } => Some(session),
        }
    }

    /// The table identifier currently in effect, if any.
    pub fn table_id(&self) -> Option<&str> {
        self.session().map(|s| s.table_id.as_str())
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self.status, TableStatus::Resolving { .. })
    }

    /// Ticket of the running scan, if one is running.
    pub fn active_ticket(&self) -> Option<ScanTicket> {
        match self.status {
            TableStatus::Resolving { ticket, .. } => Some(ticket),
            _ => None,
        }
    }

    /// Manual path: the text becomes the table identifier verbatim.
    ///
    /// Ends any running scan.
    pub fn enter_manually(&mut self, raw: impl Into<String>) -> TableSession {
        let session = TableSession::manual(raw);
        debug!(table_id = %session.table_id, "Table entered manually");
        self.status = TableStatus::Resolved {
            session: session.clone(),
        };
        session
    }

    /// Starts a scan attempt and returns its ticket.
    ///
    /// Starting a scan while one is running supersedes it; the older ticket
    /// stops being honoured.
    pub fn begin_scan(&mut self) -> ScanTicket {
        let ticket = ScanTicket(self.next_ticket);
        self.next_ticket += 1;

        let previous = self.session().cloned();
        debug!(ticket = ticket.0, has_previous = previous.is_some(), "Scan started");
        self.status = TableStatus::Resolving { ticket, previous };
        ticket
    }

    /// Applies one sensor event to the scan with `ticket`.
    ///
    /// ## Policy
    /// - First usable decode wins and resolves the session
    /// - Decode errors (and empty decodes) are noise: logged, nothing changes
    /// - Events for any other ticket, or after resolution, are ignored
    pub fn apply_scan_event(&mut self, ticket: ScanTicket, event: ScanEvent) -> ScanOutcome {
        let active = matches!(
            self.status,
            TableStatus::Resolving { ticket: current, .. } if current == ticket
        );
        if !active {
            debug!(ticket = ticket.0, "Scan event ignored");
            return ScanOutcome::Ignored;
        }

        match event {
            ScanEvent::Error(message) => {
                warn!(ticket = ticket.0, %message, "Scan decode error");
                ScanOutcome::Noise
            }
            ScanEvent::Decoded(payload) => match resolve_scan_payload(&payload) {
                Some(table_id) => {
                    let session = TableSession::scanned(table_id, payload);
                    debug!(table_id = %session.table_id, "Table resolved from scan");
                    self.status = TableStatus::Resolved {
                        session: session.clone(),
                    };
                    ScanOutcome::Resolved(session)
                }
                None => {
                    warn!(ticket = ticket.0, "Scan decoded empty payload");
                    ScanOutcome::Noise
                }
            },
        }
    }

    /// Cancels a running scan and returns to `Unresolved`.
    ///
    /// Returns `false` when no scan was running.
    pub fn cancel_scan(&mut self) -> bool {
        if !self.is_scanning() {
            return false;
        }

        debug!("Scan cancelled");
        self.status = TableStatus::Unresolved;
        true
    }
}

impl Default for TableIdentity {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Payload Resolution
// =============================================================================

/// Derives a table identifier from decoded code text.
///
/// ## Rules
/// ```text
/// "https://host/table/42"        → "42"
/// "https://host/table/42/?x=1"   → "42"   (query, fragment, trailing / ignored)
/// "tables/patio-3"               → "patio-3"
/// "5"                            → "5"    (not path-like: whole payload)
/// "   "                          → None   (noise)
/// ```
///
/// URL path segments are percent-decoded.
pub fn resolve_scan_payload(payload: &str) -> Option<String> {
    let payload = payload.trim();
    if payload.is_empty() {
        return None;
    }

    // Only hierarchical URLs count; "table:42" or "host:8000/t/3" fall
    // through to plain path handling.
    if let Some(segments) = Url::parse(payload)
        .ok()
        .and_then(|url| url.path_segments().map(|s| s.map(str::to_string).collect::<Vec<_>>()))
    {
        return match segments.into_iter().filter(|s| !s.is_empty()).last() {
            Some(segment) => Some(
                urlencoding::decode(&segment)
                    .map(|s| s.into_owned())
                    .unwrap_or(segment),
            ),
            None => Some(payload.to_string()),
        };
    }

    let segment = payload
        .rsplit('/')
        .find(|s| !s.trim().is_empty())
        .unwrap_or(payload);
    Some(segment.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Provenance;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_url_payload_takes_last_segment() {
        assert_eq!(
            resolve_scan_payload("https://host/table/42").as_deref(),
            Some("42")
        );
        assert_eq!(
            resolve_scan_payload("https://host/table/42/?src=qr#top").as_deref(),
            Some("42")
        );
        assert_eq!(
            resolve_scan_payload("https://host/t/patio%202").as_deref(),
            Some("patio 2")
        );
    }

    #[test]
    fn test_resolve_plain_payload_is_whole_text() {
        assert_eq!(resolve_scan_payload("5").as_deref(), Some("5"));
        assert_eq!(resolve_scan_payload("  A12 ").as_deref(), Some("A12"));
        assert_eq!(resolve_scan_payload("table:42").as_deref(), Some("table:42"));
        assert_eq!(
            resolve_scan_payload("localhost:8000/table/3").as_deref(),
            Some("3")
        );
    }

    #[test]
    fn test_resolve_relative_path_payload() {
        assert_eq!(resolve_scan_payload("tables/patio-3").as_deref(), Some("patio-3"));
        assert_eq!(resolve_scan_payload("/table/9/").as_deref(), Some("9"));
    }

    #[test]
    fn test_resolve_url_without_path_is_whole_payload() {
        assert_eq!(
            resolve_scan_payload("https://host/").as_deref(),
            Some("https://host/")
        );
    }

    #[test]
    fn test_resolve_empty_payload_is_noise() {
        assert_eq!(resolve_scan_payload(""), None);
        assert_eq!(resolve_scan_payload("   "), None);
    }

    #[test]
    fn test_manual_entry_is_verbatim() {
        let mut table = TableIdentity::new();
        assert_eq!(table.session(), None);

        let session = table.enter_manually(" Bar 3 ");
        assert_eq!(session.table_id, " Bar 3 ");
        assert_eq!(session.provenance, Provenance::Manual);
        assert_eq!(table.table_id(), Some(" Bar 3 "));
    }

    #[test]
    fn test_scan_first_decode_wins() {
        let mut table = TableIdentity::new();
        let ticket = table.begin_scan();
        assert!(table.is_scanning());
        assert_eq!(table.session(), None);

        let outcome = table.apply_scan_event(
            ticket,
            ScanEvent::Decoded("https://host/table/42".to_string()),
        );
        assert!(matches!(outcome, ScanOutcome::Resolved(_)));
        assert_eq!(table.table_id(), Some("42"));

        // A second decode from the same sensor session changes nothing
        let outcome = table.apply_scan_event(ticket, ScanEvent::Decoded("99".to_string()));
        assert_eq!(outcome, ScanOutcome::Ignored);
        assert_eq!(table.table_id(), Some("42"));
    }

    #[test]
    fn test_scan_decode_errors_are_noise() {
        let mut table = TableIdentity::new();
        let ticket = table.begin_scan();

        let outcome = table.apply_scan_event(ticket, ScanEvent::Error("blurry".to_string()));
        assert_eq!(outcome, ScanOutcome::Noise);
        assert!(table.is_scanning());

        let outcome = table.apply_scan_event(ticket, ScanEvent::Decoded("  ".to_string()));
        assert_eq!(outcome, ScanOutcome::Noise);
        assert!(table.is_scanning());

        // Scanning continues and the next good decode resolves
        table.apply_scan_event(ticket, ScanEvent::Decoded("5".to_string()));
        assert_eq!(table.table_id(), Some("5"));
    }

    #[test]
    fn test_cancel_returns_to_unresolved() {
        let mut table = TableIdentity::new();
        let ticket = table.begin_scan();

        assert!(table.cancel_scan());
        assert_eq!(table.status(), &TableStatus::Unresolved);

        // Late events from the cancelled scan are dropped
        let outcome = table.apply_scan_event(ticket, ScanEvent::Decoded("5".to_string()));
        assert_eq!(outcome, ScanOutcome::Ignored);
        assert_eq!(table.session(), None);

        assert!(!table.cancel_scan());
    }

    #[test]
    fn test_rescan_keeps_previous_until_new_decode() {
        let mut table = TableIdentity::new();
        table.enter_manually("7");

        let ticket = table.begin_scan();
        assert_eq!(table.table_id(), Some("7"));

        table.apply_scan_event(ticket, ScanEvent::Error("glare".to_string()));
        assert_eq!(table.table_id(), Some("7"));

        table.apply_scan_event(ticket, ScanEvent::Decoded("https://host/table/8".to_string()));
        assert_eq!(table.table_id(), Some("8"));
    }

    #[test]
    fn test_rescan_cancel_discards_previous() {
        let mut table = TableIdentity::new();
        table.enter_manually("7");

        table.begin_scan();
        table.cancel_scan();
        assert_eq!(table.session(), None);
    }

    #[test]
    fn test_new_scan_supersedes_older_ticket() {
        let mut table = TableIdentity::new();
        let old = table.begin_scan();
        let new = table.begin_scan();

        assert_eq!(
            table.apply_scan_event(old, ScanEvent::Decoded("1".to_string())),
            ScanOutcome::Ignored
        );
        assert_eq!(table.active_ticket(), Some(new));
        table.apply_scan_event(new, ScanEvent::Decoded("2".to_string()));
        assert_eq!(table.table_id(), Some("2"));
        assert_eq!(table.active_ticket(), None);
    }

    #[test]
    fn test_manual_entry_ends_scan() {
        let mut table = TableIdentity::new();
        let ticket = table.begin_scan();
        table.enter_manually("12");

        assert!(!table.is_scanning());
        assert_eq!(
            table.apply_scan_event(ticket, ScanEvent::Decoded("3".to_string())),
            ScanOutcome::Ignored
        );
        assert_eq!(table.table_id(), Some("12"));
    }
}
