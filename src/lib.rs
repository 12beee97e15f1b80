//! # mcp-gateway
//!
//! A JSON-RPC tool gateway: plugins register schema-described tools into
//! a registry at startup, read-only resource and prompt catalogs sit
//! beside them, a dispatch engine routes `initialize`, `tools/list`,
//! `tools/call`, catalog enumeration and per-session user-data methods,
//! and the serving surface offers both single request/response HTTP
//! exchanges and a long-lived WebSocket stream with server-pushed events.

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod plugins;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;

pub use catalog::Catalog;
pub use config::GatewayConfig;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use registry::{ToolDescriptor, ToolHandler, ToolId, ToolRegistry};
pub use server::GatewayServer;
pub use session::{SessionId, SessionManager};
