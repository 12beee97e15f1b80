use crate::error::{Error, Result};
use crate::session::types::{SessionEntry, SessionId};
use crate::session::SessionConfig;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Issues session tokens and guards the per-session stores.
///
/// The outer map is only write-locked to create or remove a session;
/// every store mutation happens under the entry's own lock.
#[derive(Debug)]
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<SessionEntry>>>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    fn ttl(&self) -> Duration {
        Duration::seconds(self.config.ttl_seconds as i64)
    }

    /// Create a fresh session with an empty store. Always succeeds.
    pub async fn create_session(&self) -> SessionId {
        let id = SessionId::generate();
        let entry = Arc::new(SessionEntry::new(id.clone()));
        self.sessions.write().await.insert(id.clone(), entry);
        debug!(session_id = %id, "Created session");
        id
    }

    /// Resolve a bearer token to its session, refreshing its activity.
    ///
    /// Fails with `Unauthorized` if the token is unknown or expired.
    pub async fn authenticate(&self, token: &str) -> Result<Arc<SessionEntry>> {
        let entry = {
            let sessions = self.sessions.read().await;
            sessions.get(&SessionId::from(token)).cloned()
        };

        let entry = entry.ok_or_else(|| Error::Unauthorized("Unknown session token".into()))?;

        if entry.is_expired(self.ttl()).await {
            // Leave removal to the sweep; the token is already unusable.
            return Err(Error::Unauthorized("Session expired".into()));
        }

        entry.touch().await;
        Ok(entry)
    }

    /// Explicitly destroy a session. Returns whether it existed.
    pub async fn remove_session(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop every session idle longer than the TTL. Returns how many.
    pub async fn sweep_expired(&self) -> usize {
        let ttl = self.ttl();
        let mut expired = Vec::new();
        {
            let sessions = self.sessions.read().await;
            for (id, entry) in sessions.iter() {
                if entry.is_expired(ttl).await {
                    expired.push(id.clone());
                }
            }
        }
        if expired.is_empty() {
            return 0;
        }

        let mut sessions = self.sessions.write().await;
        let mut removed = 0;
        for id in expired {
            // Re-check under the write lock; a request may have touched it.
            if let Some(entry) = sessions.get(&id) {
                if entry.is_expired(ttl).await {
                    sessions.remove(&id);
                    removed += 1;
                }
            }
        }
        if removed > 0 {
            info!(removed, "Expiry sweep removed idle sessions");
        }
        removed
    }

    /// Spawn the background expiry sweep.
    ///
    /// Runs independently of request handling; failures are logged and
    /// never surfaced to clients.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let interval = std::time::Duration::from_secs(self.config.sweep_interval_seconds.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = manager.sweep_expired().await;
                if removed > 0 {
                    warn!(removed, "Sessions expired without explicit deletion");
                }
            }
        })
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
