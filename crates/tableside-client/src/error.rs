//! # Client Error Types
//!
//! Error types for backend calls and client configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Client Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  NetworkFailure │  │RejectedByBackend│  │     InvalidInput        │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Network        │  │  Rejected       │  │  InvalidInput(Core)     │ │
//! │  │  InvalidResponse│  │  {status, msg}  │  │  SubmissionInFlight     │ │
//! │  │                 │  │                 │  │  NoOrderPlaced          │ │
//! │  │                 │  │                 │  │  InvalidConfig          │ │
//! │  │                 │  │                 │  │  ConfigLoadFailed       │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  DecodeNoise never becomes a ClientError: the scan path logs it and    │
//! │  reports ScanOutcome::Noise.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use tableside_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Everything a client operation can fail with.
///
/// Async operations store `to_string()` of this as their `Failed` message,
/// so every variant renders as something a patron can read.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The backend could not be reached (connect, timeout, reset).
    #[error("Could not reach the restaurant: {0}")]
    Network(String),

    /// The backend answered with something we could not read.
    #[error("Unexpected response from the restaurant: {0}")]
    InvalidResponse(String),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// The backend answered with a non-success status.
    ///
    /// `message` is the FastAPI `detail` when the body carries one.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    // =========================================================================
    // Input Errors
    // =========================================================================
    /// An ordering rule refused the operation before any request was sent.
    #[error(transparent)]
    InvalidInput(#[from] CoreError),

    /// An order is already being submitted.
    #[error("An order is already being placed")]
    SubmissionInFlight,

    /// There is no placed order to look up.
    #[error("No order has been placed yet")]
    NoOrderPlaced,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::InvalidInput(CoreError::Validation(err))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Rejected {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidConfig(format!("base_url: {}", err))
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

/// The four failure categories a presentation layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NetworkFailure,
    RejectedByBackend,
    InvalidInput,
    DecodeNoise,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NetworkFailure => write!(f, "network_failure"),
            ErrorKind::RejectedByBackend => write!(f, "rejected_by_backend"),
            ErrorKind::InvalidInput => write!(f, "invalid_input"),
            ErrorKind::DecodeNoise => write!(f, "decode_noise"),
        }
    }
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Network(_) | ClientError::InvalidResponse(_) => ErrorKind::NetworkFailure,
            ClientError::Rejected { .. } => ErrorKind::RejectedByBackend,
            ClientError::InvalidInput(_)
            | ClientError::SubmissionInFlight
            | ClientError::NoOrderPlaced
            | ClientError::InvalidConfig(_)
            | ClientError::ConfigLoadFailed(_) => ErrorKind::InvalidInput,
        }
    }

    /// Returns true if re-invoking the same operation may succeed.
    ///
    /// Nothing retries automatically; this only tells the UI whether a
    /// "Try again" button makes sense.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NetworkFailure | ErrorKind::RejectedByBackend
        )
    }
}
