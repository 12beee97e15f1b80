//! Serving surface: HTTP routes plus the WebSocket streaming transport.

pub mod http;
pub mod stream;

pub use http::{router, AppState, GatewayServer};
