use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;

/// Token length in raw bytes before encoding
const TOKEN_BYTES: usize = 32;

/// Opaque session token, presented as a bearer credential.
///
/// 256 bits from the OS random source, base64url-encoded; the token is
/// the capability, so unguessability within the TTL is the whole scheme.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One session: its store and activity timestamps.
///
/// The store lock is per entry, so mutations of one session serialize on
/// its own lock while unrelated sessions proceed fully in parallel.
#[derive(Debug)]
pub struct SessionEntry {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    last_accessed: RwLock<DateTime<Utc>>,
    store: RwLock<HashMap<String, Value>>,
}

impl SessionEntry {
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            last_accessed: RwLock::new(now),
            store: RwLock::new(HashMap::new()),
        }
    }

    pub async fn last_accessed(&self) -> DateTime<Utc> {
        *self.last_accessed.read().await
    }

    /// Refresh the activity timestamp
    pub async fn touch(&self) {
        *self.last_accessed.write().await = Utc::now();
    }

    pub async fn is_expired(&self, ttl: chrono::Duration) -> bool {
        Utc::now() - self.last_accessed().await >= ttl
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.store.read().await.get(key).cloned()
    }

    /// Upsert; last write wins
    pub async fn put(&self, key: String, value: Value) {
        self.store.write().await.insert(key, value);
    }

    /// Idempotent removal
    pub async fn delete(&self, key: &str) {
        self.store.write().await.remove(key);
    }

    /// Snapshot of the whole store as one JSON object
    pub async fn document(&self) -> Map<String, Value> {
        self.store
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Replace the whole store with the fields of `document`
    pub async fn replace_document(&self, document: Map<String, Value>) {
        let mut store = self.store.write().await;
        store.clear();
        store.extend(document);
    }

    pub async fn clear(&self) {
        self.store.write().await.clear();
    }
}
