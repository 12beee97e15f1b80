//! Error types for the gateway protocol engine.

use axum::http::StatusCode;
use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the gateway.
///
/// Every per-request failure is folded into the `error` field of the
/// response envelope at the dispatch boundary; nothing here terminates
/// the serving process.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed request envelope
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Parameters failed the descriptor's schema
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced tool id absent from the registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Unknown protocol method
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Missing, invalid or expired session token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Key absent from the session store
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// The tool handler itself failed
    #[error("Handler error: {0}")]
    Handler(String),

    /// Configuration error (startup only, never client-facing)
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Outbound network error from a tool handler
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convert error to a JSON-RPC error code
    pub fn json_rpc_code(&self) -> i32 {
        use crate::protocol::error_codes;

        match self {
            Error::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            Error::Validation(_) => error_codes::INVALID_PARAMS,
            Error::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            Error::ToolNotFound(_) => error_codes::TOOL_NOT_FOUND,
            Error::Unauthorized(_) => error_codes::UNAUTHORIZED,
            Error::KeyNotFound(_) => error_codes::KEY_NOT_FOUND,
            Error::Handler(_) | Error::Network(_) => error_codes::HANDLER_ERROR,
            Error::Json(_) => error_codes::PARSE_ERROR,
            _ => error_codes::INTERNAL_ERROR,
        }
    }

    /// HTTP status mirroring the taxonomy
    pub fn http_status(&self) -> StatusCode {
        match self {
            Error::InvalidRequest(_) | Error::Validation(_) | Error::Json(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::ToolNotFound(_) | Error::MethodNotFound(_) | Error::KeyNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
