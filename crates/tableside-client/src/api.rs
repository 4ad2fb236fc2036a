//! # Backend API
//!
//! The restaurant backend as seen from the client, plus its HTTP transport.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Restaurant Backend (REST)                         │
//! │                                                                         │
//! │  GET  /menu                  → [{ id, name, description, price }]      │
//! │  POST /order                 { table_id, items[] } → { order_id }      │
//! │  GET  /order/{order_id}      → { table_id, items[], status }           │
//! │  GET  /generate_qr/{table}   → image resource                          │
//! │  POST /table                 { table_number, seats } → { table_id }    │
//! │  GET  /table/{table_id}      → { _id, table_number, seats }            │
//! │                                                                         │
//! │  Errors: non-2xx with { "detail": "<message>" }                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Components depend on [`BackendApi`], never on reqwest, so tests swap in
//! an in-memory backend.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tableside_core::{MenuItem, OrderLine, OrderRequest};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Wire Types
// =============================================================================

/// Where a provisioned table code can be fetched from.
///
/// Only the reference is kept; the image bytes stay on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeImage {
    /// Resolved resource URL (after redirects).
    pub url: String,

    /// Content type the backend reported, e.g. `image/png`.
    pub content_type: Option<String>,
}

/// The backend's view of a placed order (`GET /order/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    #[serde(alias = "_id", default)]
    pub order_id: String,
    pub table_id: String,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default = "default_order_status")]
    pub status: String,
}

/// A registered table (`GET /table/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    #[serde(alias = "_id", default)]
    pub table_id: String,
    pub table_number: u32,
    pub seats: u32,
}

fn default_order_status() -> String {
    "pending".to_string()
}

#[derive(Debug, Serialize)]
struct NewTable {
    table_number: u32,
    seats: u32,
}

#[derive(Debug, Deserialize)]
struct OrderPlaced {
    order_id: String,
}

#[derive(Debug, Deserialize)]
struct TableCreated {
    table_id: String,
}

/// FastAPI error body. `detail` is a string for `HTTPException` and a list
/// for request validation failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        match self.detail {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) if text.trim().is_empty() => None,
            serde_json::Value::String(text) => Some(text),
            other => Some(other.to_string()),
        }
    }
}

// =============================================================================
// Backend Trait
// =============================================================================

/// Every backend call the ordering flow makes.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `GET /menu`
    async fn fetch_menu(&self) -> ClientResult<Vec<MenuItem>>;

    /// `POST /order`, returning the assigned order id.
    async fn place_order(&self, request: &OrderRequest) -> ClientResult<String>;

    /// `GET /order/{order_id}`
    async fn fetch_order(&self, order_id: &str) -> ClientResult<PlacedOrder>;

    /// `GET /generate_qr/{table_id}`
    async fn fetch_code_image(&self, table_id: &str) -> ClientResult<CodeImage>;

    /// `POST /table`, returning the new table id.
    async fn create_table(&self, table_number: u32, seats: u32) -> ClientResult<String>;

    /// `GET /table/{table_id}`
    async fn fetch_table(&self, table_id: &str) -> ClientResult<TableInfo>;
}

// =============================================================================
// HTTP Backend
// =============================================================================

/// [`BackendApi`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(HttpBackend {
            client,
            base_url: config.base_url().to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turns a non-2xx response into `Rejected`, preferring the body's
    /// `detail` over the bare status line.
    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::message)
            .unwrap_or_else(|| status.to_string());

        debug!(status = status.as_u16(), %message, "Backend rejected request");
        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn fetch_menu(&self) -> ClientResult<Vec<MenuItem>> {
        let response = self.client.get(self.endpoint("/menu")).send().await?;
        let items = Self::check(response).await?.json().await?;
        Ok(items)
    }

    async fn place_order(&self, request: &OrderRequest) -> ClientResult<String> {
        let response = self
            .client
            .post(self.endpoint("/order"))
            .json(request)
            .send()
            .await?;
        let placed: OrderPlaced = Self::check(response).await?.json().await?;

        if placed.order_id.trim().is_empty() {
            return Err(ClientError::InvalidResponse(
                "order accepted without an order_id".into(),
            ));
        }
        Ok(placed.order_id)
    }

    async fn fetch_order(&self, order_id: &str) -> ClientResult<PlacedOrder> {
        let path = format!("/order/{}", urlencoding::encode(order_id));
        let response = self.client.get(self.endpoint(&path)).send().await?;
        let mut order: PlacedOrder = Self::check(response).await?.json().await?;

        if order.order_id.is_empty() {
            order.order_id = order_id.to_string();
        }
        Ok(order)
    }

    async fn fetch_code_image(&self, table_id: &str) -> ClientResult<CodeImage> {
        let path = format!("/generate_qr/{}", urlencoding::encode(table_id));
        let response = Self::check(self.client.get(self.endpoint(&path)).send().await?).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(CodeImage {
            url: response.url().to_string(),
            content_type,
        })
    }

    async fn create_table(&self, table_number: u32, seats: u32) -> ClientResult<String> {
        let response = self
            .client
            .post(self.endpoint("/table"))
            .json(&NewTable {
                table_number,
                seats,
            })
            .send()
            .await?;
        let created: TableCreated = Self::check(response).await?.json().await?;
        Ok(created.table_id)
    }

    async fn fetch_table(&self, table_id: &str) -> ClientResult<TableInfo> {
        let path = format!("/table/{}", urlencoding::encode(table_id));
        let response = self.client.get(self.endpoint(&path)).send().await?;
        let mut table: TableInfo = Self::check(response).await?.json().await?;

        if table.table_id.is_empty() {
            table.table_id = table_id.to_string();
        }
        Ok(table)
    }
}
