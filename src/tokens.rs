//! Short-lived, process-local token maps for the QR and feedback flows.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Visitor details captured at the kiosk before the QR form is filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempVisitor {
    pub name: String,
    /// Minutes the visitor plans to stay.
    pub duration: u32,
}

/// A pending feedback request for one visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackGrant {
    pub visitor_id: i64,
}

/// Result of looking a token up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    Live(V),
    /// The token existed but outlived its TTL. It has been evicted.
    Expired,
    Missing,
}

struct Entry<V> {
    value: V,
    issued_at: Instant,
}

/// A live entry removed from the store by [`TtlStore::claim`].
///
/// Keeps the original issue time so [`TtlStore::restore`] does not extend
/// the token's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim<V> {
    pub value: V,
    issued_at: Instant,
}

/// Time-bounded key-value store keyed by random UUID tokens.
pub struct TtlStore<V> {
    ttl: Duration,
    /// Never held across an `.await`.
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlStore<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store `value` under a fresh token.
    pub fn issue(&self, value: V) -> String {
        let token = Uuid::new_v4().to_string();
        self.insert_at(token.clone(), value, Instant::now());
        token
    }

    fn insert_at(&self, token: String, value: V, issued_at: Instant) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(token, Entry { value, issued_at });
    }

    pub fn lookup(&self, token: &str) -> Lookup<V> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let Some(entry) = entries.get(token) else {
            return Lookup::Missing;
        };
        if entry.issued_at.elapsed() <= self.ttl {
            return Lookup::Live(entry.value.clone());
        }
        entries.remove(token);
        Lookup::Expired
    }

    /// Remove a live entry so no concurrent caller can use the same token.
    /// Expired entries are dropped.
    pub fn claim(&self, token: &str) -> Lookup<Claim<V>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let Some(entry) = entries.remove(token) else {
            return Lookup::Missing;
        };
        if entry.issued_at.elapsed() > self.ttl {
            return Lookup::Expired;
        }
        Lookup::Live(Claim {
            value: entry.value,
            issued_at: entry.issued_at,
        })
    }

    /// Put a claimed entry back under its token, e.g. after the work it
    /// guarded failed.
    pub fn restore(&self, token: &str, claim: Claim<V>) {
        self.insert_at(token.to_string(), claim.value, claim.issued_at);
    }

    /// Evict every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| entry.issued_at.elapsed() <= self.ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
