//! # Observable State Cells
//!
//! Each piece of session state lives in its own `tokio::sync::watch` channel.
//!
//! ## State Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Observable State                                 │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────────┐  │
//! │  │  CartState   │  │  TableState  │  │  OperationCell<T>            │  │
//! │  │  watch<Cart> │  │  watch<      │  │  watch<AsyncOperationState>  │  │
//! │  │              │  │  TableIdent> │  │  one per async operation     │  │
//! │  └──────┬───────┘  └──────┬───────┘  └──────────────┬───────────────┘  │
//! │         │                 │                         │                   │
//! │         └─────────────────┴────────────┬────────────┘                   │
//! │                                        ▼                                │
//! │                       subscribe() → watch::Receiver                     │
//! │                       (presentation re-renders on change)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations go through `send_if_modified`, so subscribers are woken only
//! when a transition actually happened. No cell is ever held across an
//! `.await`.

use tableside_core::{
    AsyncOperationState, Cart, CoreResult, MenuItem, ScanEvent, ScanOutcome, ScanTicket,
    TableIdentity, TableSession,
};
use tokio::sync::watch;

// =============================================================================
// Cart State
// =============================================================================

/// The session cart.
///
/// Two writers: the patron's edits and a successful order submission.
#[derive(Debug)]
pub struct CartState {
    cart: watch::Sender<Cart>,
}

impl CartState {
    pub fn new() -> Self {
        CartState {
            cart: watch::Sender::new(Cart::new()),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let total = cart_state.with_cart(|cart| cart.total());
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        f(&self.cart.borrow())
    }

    pub fn snapshot(&self) -> Cart {
        self.cart.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.cart.subscribe()
    }

    pub fn add_item(&self, item: &MenuItem) -> CoreResult<()> {
        self.apply(|cart| cart.add_item(item))
    }

    pub fn set_quantity(&self, item_id: &str, quantity: i64) -> CoreResult<()> {
        self.apply(|cart| cart.set_quantity(item_id, quantity))
    }

    pub fn set_quantity_text(&self, item_id: &str, text: &str) -> CoreResult<()> {
        self.apply(|cart| cart.set_quantity_text(item_id, text))
    }

    pub(crate) fn clear(&self) {
        self.cart.send_if_modified(|cart| {
            let had_lines = !cart.is_empty();
            cart.clear();
            had_lines
        });
    }

    /// Runs a fallible cart edit; subscribers hear about it only on success.
    fn apply<F>(&self, edit: F) -> CoreResult<()>
    where
        F: FnOnce(&mut Cart) -> CoreResult<()>,
    {
        let mut result = Ok(());
        self.cart.send_if_modified(|cart| {
            result = edit(cart);
            result.is_ok()
        });
        result
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Table State
// =============================================================================

/// The session's table identity.
#[derive(Debug)]
pub struct TableState {
    table: watch::Sender<TableIdentity>,
}

impl TableState {
    pub fn new() -> Self {
        TableState {
            table: watch::Sender::new(TableIdentity::new()),
        }
    }

    pub fn with_table<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&TableIdentity) -> R,
    {
        f(&self.table.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<TableIdentity> {
        self.table.subscribe()
    }

    pub fn session(&self) -> Option<TableSession> {
        self.with_table(|table| table.session().cloned())
    }

    pub fn table_id(&self) -> Option<String> {
        self.with_table(|table| table.table_id().map(str::to_string))
    }

    pub fn active_ticket(&self) -> Option<ScanTicket> {
        self.with_table(TableIdentity::active_ticket)
    }

    pub fn enter_manually(&self, raw: impl Into<String>) -> TableSession {
        let raw = raw.into();
        let mut session = TableSession::manual(raw.clone());
        self.table.send_modify(|table| session = table.enter_manually(raw));
        session
    }

    pub fn begin_scan(&self) -> ScanTicket {
        let mut ticket = ScanTicket::default();
        self.table.send_modify(|table| ticket = table.begin_scan());
        ticket
    }

    pub fn apply_scan_event(&self, ticket: ScanTicket, event: ScanEvent) -> ScanOutcome {
        let mut outcome = ScanOutcome::Ignored;
        self.table.send_if_modified(|table| {
            outcome = table.apply_scan_event(ticket, event);
            matches!(outcome, ScanOutcome::Resolved(_))
        });
        outcome
    }

    pub fn cancel_scan(&self) -> bool {
        self.table.send_if_modified(TableIdentity::cancel_scan)
    }
}

impl Default for TableState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Operation Cell
// =============================================================================

/// Observable lifecycle of one asynchronous operation.
#[derive(Debug)]
pub struct OperationCell<T> {
    state: watch::Sender<AsyncOperationState<T>>,
}

impl<T: Clone> OperationCell<T> {
    pub fn new() -> Self {
        OperationCell {
            state: watch::Sender::new(AsyncOperationState::Idle),
        }
    }

    pub fn get(&self) -> AsyncOperationState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AsyncOperationState<T>> {
        self.state.subscribe()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.borrow().is_in_flight()
    }

    /// Enters `InFlight` unconditionally (supersede policy).
    pub(crate) fn start(&self) {
        self.state.send_modify(AsyncOperationState::start);
    }

    /// Enters `InFlight` unless already there (single-flight policy).
    pub(crate) fn try_start(&self) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_in_flight() {
                return false;
            }
            state.start();
            true
        })
    }

    pub(crate) fn finish(&self, outcome: Result<T, String>) -> bool {
        self.state.send_if_modified(|state| state.finish(outcome))
    }
}

impl<T: Clone> Default for OperationCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tableside_core::{CoreError, Money, ValidationError};

    fn soup() -> MenuItem {
        MenuItem {
            id: "a".into(),
            name: "Soup".into(),
            description: String::new(),
            price: Money::from_cents(500),
            category: None,
        }
    }

    #[test]
    fn test_cart_edits_notify_subscribers() {
        let cart = CartState::new();
        let mut rx = cart.subscribe();
        assert!(!rx.has_changed().unwrap());

        cart.add_item(&soup()).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().line_count(), 1);
    }

    #[test]
    fn test_rejected_edit_is_silent() {
        let cart = CartState::new();
        cart.add_item(&soup()).unwrap();
        let mut rx = cart.subscribe();
        rx.borrow_and_update();

        let err = cart.set_quantity_text("a", "abc").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidFormat { .. })
        ));
        assert!(!rx.has_changed().unwrap());
        assert_eq!(cart.with_cart(|c| c.line("a").map(|l| l.quantity)), Some(1));
    }

    #[test]
    fn test_clear_empty_cart_is_silent() {
        let cart = CartState::new();
        let rx = cart.subscribe();
        cart.clear();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_table_state_transitions() {
        let table = TableState::new();
        let mut rx = table.subscribe();

        let ticket = table.begin_scan();
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert_eq!(table.active_ticket(), Some(ticket));

        // Noise leaves the state (and subscribers) alone
        assert_eq!(
            table.apply_scan_event(ticket, ScanEvent::Error("blurry".into())),
            ScanOutcome::Noise
        );
        assert!(!rx.has_changed().unwrap());

        let outcome = table.apply_scan_event(
            ticket,
            ScanEvent::Decoded("https://host/table/42".into()),
        );
        assert!(matches!(outcome, ScanOutcome::Resolved(_)));
        assert!(rx.has_changed().unwrap());
        assert_eq!(table.table_id().as_deref(), Some("42"));
    }

    #[test]
    fn test_cancel_without_scan_is_noop() {
        let table = TableState::new();
        table.enter_manually("7");
        assert!(!table.cancel_scan());
        assert_eq!(table.table_id().as_deref(), Some("7"));
    }

    #[test]
    fn test_operation_cell_single_flight() {
        let cell: OperationCell<String> = OperationCell::new();
        assert!(cell.get().is_idle());

        assert!(cell.try_start());
        assert!(!cell.try_start());
        assert!(cell.finish(Ok("ORD-1".into())));
        assert_eq!(cell.get().value().map(String::as_str), Some("ORD-1"));

        // finish outside InFlight changes nothing
        assert!(!cell.finish(Err("late".into())));
        assert_eq!(cell.get().value().map(String::as_str), Some("ORD-1"));
    }
}
