//! JSON-RPC 2.0 envelope types and helpers.
//!
//! The same envelope travels over plain HTTP POST and the WebSocket
//! streaming transport; server-push messages are notifications, which
//! clients distinguish by the absence of an `id` they generated.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request-scoped correlation value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
    Null,
}

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Option<Value>,
    pub id: RequestId,
}

/// JSON-RPC 2.0 Response
///
/// Exactly one of `result`/`error` is set; use the constructors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: RequestId,
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON-RPC notification (no `id`), used for server-push events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC error code constants
pub mod error_codes {
    /// Invalid JSON
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid as a JSON-RPC request
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method does not exist
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid parameters
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i32 = -32603;

    // Server-defined codes (-32000 to -32099)
    /// Tool handler failure
    pub const HANDLER_ERROR: i32 = -32000;
    /// Tool id absent from the registry
    pub const TOOL_NOT_FOUND: i32 = -32001;
    /// Missing, invalid or expired session token
    pub const UNAUTHORIZED: i32 = -32002;
    /// Key absent from the session store
    pub const KEY_NOT_FOUND: i32 = -32004;
}

/// Protocol version string advertised by `initialize`
pub const PROTOCOL_VERSION: &str = "2025-03-26";

const JSONRPC_VERSION: &str = "2.0";

impl JsonRpcResponse {
    /// Build a success response
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Build an error response from a raw code and message
    pub fn failure(id: RequestId, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
            id,
        }
    }

    /// Build an error response from a gateway error
    pub fn from_error(id: RequestId, err: &Error) -> Self {
        Self::failure(id, err.json_rpc_code(), err.to_string())
    }

    /// Invalid-request response for frames that never parsed to a request
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::failure(RequestId::Null, error_codes::INVALID_REQUEST, message)
    }
}

/// Any message that may appear on the streaming transport
#[derive(Debug, Clone)]
pub enum JsonRpcMessage {
    Request(JsonRpcRequest),
    Response(JsonRpcResponse),
    Notification(JsonRpcNotification),
}

impl JsonRpcMessage {
    /// Classify a raw JSON string.
    ///
    /// `method` + `id` is a request, `method` without `id` a notification,
    /// `result`/`error` a response. The `jsonrpc` field must be `"2.0"`.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;

        match value.get("jsonrpc") {
            Some(version) if version == JSONRPC_VERSION => {}
            Some(version) => {
                return Err(Error::InvalidRequest(format!(
                    "Unsupported JSON-RPC version: {}",
                    version
                )))
            }
            None => {
                return Err(Error::InvalidRequest(
                    "Missing jsonrpc version field".to_string(),
                ))
            }
        }

        if value.get("method").is_some() {
            if value.get("id").is_some() {
                Ok(JsonRpcMessage::Request(serde_json::from_value(value)?))
            } else {
                Ok(JsonRpcMessage::Notification(serde_json::from_value(
                    value,
                )?))
            }
        } else if value.get("result").is_some() || value.get("error").is_some() {
            Ok(JsonRpcMessage::Response(serde_json::from_value(value)?))
        } else {
            Err(Error::InvalidRequest(
                "Invalid JSON-RPC message structure".to_string(),
            ))
        }
    }

    /// Serialize back to a JSON string
    pub fn to_json_string(&self) -> Result<String> {
        let json = match self {
            JsonRpcMessage::Request(req) => serde_json::to_string(req)?,
            JsonRpcMessage::Response(res) => serde_json::to_string(res)?,
            JsonRpcMessage::Notification(notif) => serde_json::to_string(notif)?,
        };
        Ok(json)
    }
}
