//! Session management.
//!
//! Sessions are opaque bearer tokens mapped to isolated key-value stores.
//! Created by `initialize`, consulted on every stateful request, removed
//! by explicit deletion or the background expiry sweep.

pub mod manager;
pub mod types;

pub use manager::SessionManager;
pub use types::{SessionEntry, SessionId};

use serde::{Deserialize, Serialize};

/// Session lifetime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds of inactivity after which a session expires
    pub ttl_seconds: u64,
    /// Interval between expiry sweeps
    pub sweep_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 3600,
            sweep_interval_seconds: 60,
        }
    }
}
