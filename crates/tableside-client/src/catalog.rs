//! # Menu Catalog
//!
//! Loads and holds the list of purchasable items.
//!
//! ## Load Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Menu Load Lifecycle                              │
//! │                                                                         │
//! │  initialize() ──(first call only)──┐                                   │
//! │  load() / reload ──────────────────┤                                   │
//! │                                    ▼                                   │
//! │   Idle ──► InFlight(gen N) ──GET /menu──┬──► Succeeded(count)          │
//! │                                         │    items := response         │
//! │                                         │                               │
//! │                                         └──► Failed(message)           │
//! │                                              items unchanged           │
//! │                                                                         │
//! │  A load started later (gen N+1) supersedes gen N: when gen N finally   │
//! │  completes, its result is discarded and state is not touched.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tableside_core::validation::validate_menu;
use tableside_core::{AsyncOperationState, MenuItem};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::BackendApi;
use crate::error::ClientResult;
use crate::state::OperationCell;

/// The menu, plus the status of the most recent load.
///
/// `status` reports the item count on success; `items` holds the last list
/// that loaded successfully and survives failed reloads.
pub struct MenuCatalog {
    backend: Arc<dyn BackendApi>,
    status: OperationCell<usize>,
    items: watch::Sender<Vec<MenuItem>>,
    generation: AtomicU64,
    initialized: AtomicBool,
}

impl MenuCatalog {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        MenuCatalog {
            backend,
            status: OperationCell::new(),
            items: watch::Sender::new(Vec::new()),
            generation: AtomicU64::new(0),
            initialized: AtomicBool::new(false),
        }
    }

    /// Performs the first load. Every later call is a no-op that reports
    /// the current status.
    pub async fn initialize(&self) -> AsyncOperationState<usize> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("Menu catalog already initialized");
            return self.status.get();
        }

        // The result is in `status`; initialize never fails on its own.
        let _ = self.load().await;
        self.status.get()
    }

    /// Fetches the menu once. No retries.
    ///
    /// The caller always receives its own fetch result, even when a newer
    /// load superseded it and the result was kept out of the catalog.
    pub async fn load(&self) -> ClientResult<Vec<MenuItem>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.status.start();
        debug!(generation, "Menu load started");

        let outcome: ClientResult<Vec<MenuItem>> = match self.backend.fetch_menu().await {
            Ok(items) => validate_menu(&items).map(|_| items).map_err(Into::into),
            Err(err) => Err(err),
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Superseded menu load discarded");
            return outcome;
        }

        match &outcome {
            Ok(items) => {
                info!(generation, count = items.len(), "Menu loaded");
                self.items.send_replace(items.clone());
                self.status.finish(Ok(items.len()));
            }
            Err(err) => {
                warn!(generation, error = %err, "Menu load failed");
                self.status.finish(Err(err.to_string()));
            }
        }
        outcome
    }

    pub fn status(&self) -> AsyncOperationState<usize> {
        self.status.get()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<AsyncOperationState<usize>> {
        self.status.subscribe()
    }

    /// The last successfully loaded menu, in backend order.
    pub fn items(&self) -> Vec<MenuItem> {
        self.items.borrow().clone()
    }

    pub fn item(&self, id: &str) -> Option<MenuItem> {
        self.items.borrow().iter().find(|item| item.id == id).cloned()
    }

    /// Groups the menu by category for display.
    ///
    /// Categories appear in the order their first item appears; items keep
    /// menu order within a group. Uncategorized items group under `None`.
    pub fn items_by_category(&self) -> Vec<(Option<String>, Vec<MenuItem>)> {
        let items = self.items.borrow();
        let mut seen = HashSet::new();
        let mut groups = Vec::new();

        for item in items.iter() {
            if seen.insert(item.category.clone()) {
                let members = items
                    .iter()
                    .filter(|other| other.category == item.category)
                    .cloned()
                    .collect();
                groups.push((item.category.clone(), members));
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::testing::{menu_item, FakeBackend};
    use pretty_assertions::assert_eq;
    use tableside_core::Money;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_load_success() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_menu(Ok(vec![menu_item("a", "Soup", 500), menu_item("b", "Bread", 250)]));
        let catalog = MenuCatalog::new(backend.clone());

        assert!(catalog.status().is_idle());
        let items = catalog.load().await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(catalog.status(), AsyncOperationState::Succeeded(2));
        assert_eq!(catalog.item("b").unwrap().price, Money::from_cents(250));
        assert_eq!(backend.menu_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_prior_items() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_menu(Ok(vec![menu_item("a", "Soup", 500)]));
        backend.push_menu(Err(ClientError::Network("connection refused".into())));
        let catalog = MenuCatalog::new(backend.clone());

        catalog.load().await.unwrap();
        assert!(catalog.load().await.is_err());

        assert_eq!(
            catalog.status().error(),
            Some("Could not reach the restaurant: connection refused")
        );
        assert_eq!(catalog.items().len(), 1);
        assert_eq!(backend.menu_calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_menu_is_failure() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_menu(Ok(vec![menu_item("a", "Soup", 500), menu_item("a", "Dup", 100)]));
        let catalog = MenuCatalog::new(backend);

        assert!(catalog.load().await.is_err());
        assert!(catalog.status().error().is_some());
        assert!(catalog.items().is_empty());
    }

    #[tokio::test]
    async fn test_price_beyond_ceiling_fails_load() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_menu(Ok(vec![menu_item("a", "Soup", 500)]));
        backend.push_menu(Ok(vec![menu_item("w", "Whale", 10_000_000_000_000_000)]));
        let catalog = MenuCatalog::new(backend);

        catalog.load().await.unwrap();
        let err = catalog.load().await.unwrap_err();

        assert!(matches!(err, ClientError::InvalidInput(_)));
        assert_eq!(catalog.item("w"), None);
        assert_eq!(catalog.items().len(), 1);
    }

    #[tokio::test]
    async fn test_initialize_loads_once() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_menu(Ok(vec![menu_item("a", "Soup", 500)]));
        let catalog = MenuCatalog::new(backend.clone());

        assert_eq!(catalog.initialize().await, AsyncOperationState::Succeeded(1));
        assert_eq!(catalog.initialize().await, AsyncOperationState::Succeeded(1));
        assert_eq!(backend.menu_calls(), 1);
    }

    #[tokio::test]
    async fn test_newer_load_supersedes_pending_one() {
        let backend = Arc::new(FakeBackend::new());
        let (release_first, gate) = oneshot::channel();
        backend.push_gated_menu(Ok(vec![menu_item("old", "Old Soup", 400)]), gate);
        backend.push_menu(Ok(vec![menu_item("new", "New Soup", 500)]));
        let catalog = MenuCatalog::new(backend);

        let first = catalog.load();
        let second = async {
            let result = catalog.load().await;
            release_first.send(()).unwrap();
            result
        };
        let (first, second) = tokio::join!(first, second);

        // Both callers get their own response...
        assert_eq!(first.unwrap()[0].id, "old");
        assert_eq!(second.unwrap()[0].id, "new");
        // ...but only the newest load lands in the catalog
        assert_eq!(catalog.items()[0].id, "new");
        assert_eq!(catalog.status(), AsyncOperationState::Succeeded(1));
    }

    #[tokio::test]
    async fn test_items_by_category() {
        let backend = Arc::new(FakeBackend::new());
        let mut soup = menu_item("a", "Soup", 500);
        soup.category = Some("Starters".into());
        let mut steak = menu_item("b", "Steak", 2000);
        steak.category = Some("Mains".into());
        let mut salad = menu_item("c", "Salad", 700);
        salad.category = Some("Starters".into());
        let water = menu_item("d", "Water", 0);
        backend.push_menu(Ok(vec![soup, steak, salad, water]));
        let catalog = MenuCatalog::new(backend);
        catalog.load().await.unwrap();

        let groups: Vec<(Option<String>, Vec<String>)> = catalog
            .items_by_category()
            .into_iter()
            .map(|(category, items)| (category, items.into_iter().map(|i| i.id).collect()))
            .collect();

        assert_eq!(
            groups,
            vec![
                (Some("Starters".to_string()), vec!["a".to_string(), "c".to_string()]),
                (Some("Mains".to_string()), vec!["b".to_string()]),
                (None, vec!["d".to_string()]),
            ]
        );
    }
}
