//! Best-effort key-value preferences with a freshness policy.
//!
//! Values are stored as `{"payload": ..., "savedAt": <epoch ms>}`. Reads never
//! fail toward the caller: stale, malformed or unreadable entries are removed
//! and reported as absent. A bare payload written by older builds is accepted
//! once and rewritten as an envelope.

use crate::FilterSet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, warn};

pub const ROSTER_KEY: &str = "players";
pub const FILTERS_KEY: &str = "card_filters_v1";
pub const ROSTER_TTL: Ttl = Ttl::After(Duration::from_secs(24 * 60 * 60));

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage quota exceeded")]
    QuotaExceeded,
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

/// Raw string key-value storage on the local device.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

pub trait Clock {
    fn now_millis(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn at(millis: u64) -> Self {
        Self {
            now: Cell::new(millis),
        }
    }

    pub fn set(&self, millis: u64) {
        self.now.set(millis);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by.as_millis() as u64);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    Unbounded,
    After(Duration),
}

impl Ttl {
    pub fn is_fresh(self, saved_at: u64, now: u64) -> bool {
        match self {
            Ttl::Unbounded => true,
            Ttl::After(ttl) => u128::from(now.saturating_sub(saved_at)) <= ttl.as_millis(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    #[serde(alias = "players")]
    payload: T,
    saved_at: u64,
}

#[derive(Debug)]
pub struct PreferenceStore<S, C = SystemClock> {
    storage: S,
    clock: C,
}

impl<S: Storage> PreferenceStore<S, SystemClock> {
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, SystemClock)
    }
}

impl<S: Storage, C: Clock> PreferenceStore<S, C> {
    pub fn with_clock(storage: S, clock: C) -> Self {
        Self { storage, clock }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Writes `payload` stamped with the current time. Failures are logged and
    /// reported as `false`.
    pub fn save<T: Serialize>(&mut self, key: &str, payload: &T) -> bool {
        let envelope = Envelope {
            payload,
            saved_at: self.clock.now_millis(),
        };
        let body = match serde_json::to_string(&envelope) {
            Ok(body) => body,
            Err(err) => {
                warn!(key, %err, "failed to encode preference");
                return false;
            }
        };
        match self.storage.set(key, &body) {
            Ok(()) => true,
            Err(err) => {
                warn!(key, %err, "failed to persist preference");
                false
            }
        }
    }

    pub fn load<T>(&mut self, key: &str, ttl: Ttl) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, %err, "failed to read preference");
                return None;
            }
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                self.discard(key, &format!("malformed json: {err}"));
                return None;
            }
        };
        if is_envelope(&value) {
            let envelope: Envelope<T> = match serde_json::from_value(value) {
                Ok(envelope) => envelope,
                Err(err) => {
                    self.discard(key, &format!("malformed envelope: {err}"));
                    return None;
                }
            };
            if !ttl.is_fresh(envelope.saved_at, self.clock.now_millis()) {
                self.discard(key, "expired");
                return None;
            }
            return Some(envelope.payload);
        }
        match serde_json::from_value::<T>(value) {
            Ok(payload) => {
                debug!(key, "migrating bare preference into envelope");
                self.save(key, &payload);
                Some(payload)
            }
            Err(err) => {
                self.discard(key, &format!("unexpected shape: {err}"));
                None
            }
        }
    }

    pub fn clear(&mut self, key: &str) {
        if let Err(err) = self.storage.remove(key) {
            warn!(key, %err, "failed to clear preference");
        }
    }

    pub fn load_roster(&mut self) -> Option<Vec<String>> {
        self.load(ROSTER_KEY, ROSTER_TTL)
    }

    pub fn save_roster(&mut self, players: &[String]) -> bool {
        self.save(ROSTER_KEY, &players)
    }

    pub fn load_filters(&mut self) -> Option<FilterSet> {
        self.load::<BTreeMap<String, bool>>(FILTERS_KEY, Ttl::Unbounded)
            .map(|raw| FilterSet::from_raw(&raw))
    }

    pub fn save_filters(&mut self, filters: &FilterSet) -> bool {
        self.save(FILTERS_KEY, &filters.to_raw())
    }

    fn discard(&mut self, key: &str, reason: &str) {
        debug!(key, reason, "discarding stored preference");
        self.clear(key);
    }
}

fn is_envelope(value: &Value) -> bool {
    value
        .as_object()
        .map_or(false, |object| object.contains_key("savedAt"))
}
