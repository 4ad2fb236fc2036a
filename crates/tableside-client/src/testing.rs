//! In-memory [`BackendApi`] for component tests.
//!
//! Responses are queued per endpoint and handed out in call order. A queued
//! response may carry a gate; the call then waits until the gate is
//! released (or dropped), which lets tests hold a request in flight.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tableside_core::{MenuItem, Money, OrderRequest};
use tokio::sync::oneshot;

use crate::api::{BackendApi, CodeImage, PlacedOrder, TableInfo};
use crate::error::{ClientError, ClientResult};

type Queue<T> = Mutex<VecDeque<(ClientResult<T>, Option<oneshot::Receiver<()>>)>>;

pub(crate) fn menu_item(id: &str, name: &str, cents: i64) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        price: Money::from_cents(cents),
        category: None,
    }
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    menus: Queue<Vec<MenuItem>>,
    orders: Queue<String>,
    lookups: Queue<PlacedOrder>,
    images: Queue<CodeImage>,
    tables: Queue<String>,
    table_lookups: Queue<TableInfo>,
    menu_calls: Mutex<usize>,
    placed: Mutex<Vec<OrderRequest>>,
    image_requests: Mutex<Vec<String>>,
    lookup_requests: Mutex<Vec<String>>,
    created_tables: Mutex<Vec<(u32, u32)>>,
    table_requests: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_menu(&self, response: ClientResult<Vec<MenuItem>>) {
        self.menus.lock().unwrap().push_back((response, None));
    }

    pub(crate) fn push_gated_menu(
        &self,
        response: ClientResult<Vec<MenuItem>>,
        gate: oneshot::Receiver<()>,
    ) {
        self.menus.lock().unwrap().push_back((response, Some(gate)));
    }

    pub(crate) fn push_order(&self, response: ClientResult<String>) {
        self.orders.lock().unwrap().push_back((response, None));
    }

    pub(crate) fn push_gated_order(&self, response: ClientResult<String>, gate: oneshot::Receiver<()>) {
        self.orders.lock().unwrap().push_back((response, Some(gate)));
    }

    pub(crate) fn push_lookup(&self, response: ClientResult<PlacedOrder>) {
        self.lookups.lock().unwrap().push_back((response, None));
    }

    pub(crate) fn push_image(&self, response: ClientResult<CodeImage>) {
        self.images.lock().unwrap().push_back((response, None));
    }

    pub(crate) fn push_gated_image(
        &self,
        response: ClientResult<CodeImage>,
        gate: oneshot::Receiver<()>,
    ) {
        self.images.lock().unwrap().push_back((response, Some(gate)));
    }

    pub(crate) fn push_table(&self, response: ClientResult<String>) {
        self.tables.lock().unwrap().push_back((response, None));
    }

    pub(crate) fn push_table_info(&self, response: ClientResult<TableInfo>) {
        self.table_lookups.lock().unwrap().push_back((response, None));
    }

    pub(crate) fn menu_calls(&self) -> usize {
        *self.menu_calls.lock().unwrap()
    }

    pub(crate) fn placed_orders(&self) -> Vec<OrderRequest> {
        self.placed.lock().unwrap().clone()
    }

    pub(crate) fn image_requests(&self) -> Vec<String> {
        self.image_requests.lock().unwrap().clone()
    }

    pub(crate) fn lookup_requests(&self) -> Vec<String> {
        self.lookup_requests.lock().unwrap().clone()
    }

    pub(crate) fn created_tables(&self) -> Vec<(u32, u32)> {
        self.created_tables.lock().unwrap().clone()
    }

    pub(crate) fn table_requests(&self) -> Vec<String> {
        self.table_requests.lock().unwrap().clone()
    }

    async fn next<T>(queue: &Queue<T>, endpoint: &str) -> ClientResult<T> {
        let entry = queue.lock().unwrap().pop_front();
        match entry {
            Some((response, gate)) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                response
            }
            None => Err(ClientError::Network(format!("no response queued for {endpoint}"))),
        }
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn fetch_menu(&self) -> ClientResult<Vec<MenuItem>> {
        *self.menu_calls.lock().unwrap() += 1;
        Self::next(&self.menus, "GET /menu").await
    }

    async fn place_order(&self, request: &OrderRequest) -> ClientResult<String> {
        self.placed.lock().unwrap().push(request.clone());
        Self::next(&self.orders, "POST /order").await
    }

    async fn fetch_order(&self, order_id: &str) -> ClientResult<PlacedOrder> {
        self.lookup_requests.lock().unwrap().push(order_id.to_string());
        Self::next(&self.lookups, "GET /order").await
    }

    async fn fetch_code_image(&self, table_id: &str) -> ClientResult<CodeImage> {
        self.image_requests.lock().unwrap().push(table_id.to_string());
        Self::next(&self.images, "GET /generate_qr").await
    }

    async fn create_table(&self, table_number: u32, seats: u32) -> ClientResult<String> {
        self.created_tables.lock().unwrap().push((table_number, seats));
        Self::next(&self.tables, "POST /table").await
    }

    async fn fetch_table(&self, table_id: &str) -> ClientResult<TableInfo> {
        self.table_requests.lock().unwrap().push(table_id.to_string());
        Self::next(&self.table_lookups, "GET /table").await
    }
}
