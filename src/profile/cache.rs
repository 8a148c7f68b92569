use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::profile::{
    clock::Clock,
    storage::KeyValueStore,
    types::{CachedProfileEntry, GithubProfile},
    username::Username,
};

pub const CACHE_KEY_PREFIX: &str = "github-profile-";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Time-boxed profile cache over a [`KeyValueStore`].
///
/// Storage is best effort: read failures behave like a miss and write
/// failures are logged and dropped, so the cache can never fail a load.
#[derive(Clone)]
pub struct ProfileCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ProfileCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    pub fn key(username: &Username) -> String {
        format!("{CACHE_KEY_PREFIX}{username}")
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Any entry for `username`, regardless of age.
    pub fn read(&self, username: &Username) -> Option<CachedProfileEntry> {
        let key = Self::key(username);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(
                    target: "profile_cache",
                    key = %key,
                    error = %err,
                    "profile_cache_read_failed"
                );
                return None;
            }
        };

        match serde_json::from_str::<CachedProfileEntry>(&raw) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(
                    target: "profile_cache",
                    key = %key,
                    error = %err,
                    "profile_cache_entry_unreadable"
                );
                None
            }
        }
    }

    pub fn read_fresh(&self, username: &Username) -> Option<CachedProfileEntry> {
        let now_ms = self.clock.now_ms();
        self.read(username)
            .filter(|entry| entry.is_fresh(now_ms, self.ttl))
    }

    /// Stores `data` stamped with the current time. Returns whether the write landed;
    /// nothing is written once `cancel` has fired.
    pub fn write(
        &self,
        username: &Username,
        data: &GithubProfile,
        cancel: &CancellationToken,
    ) -> bool {
        let key = Self::key(username);
        let entry = CachedProfileEntry::new(data.clone(), self.clock.now_ms());
        let serialized = match serde_json::to_string(&entry) {
            Ok(serialized) => serialized,
            Err(err) => {
                tracing::warn!(
                    target: "profile_cache",
                    key = %key,
                    error = %err,
                    "profile_cache_serialize_failed"
                );
                return false;
            }
        };

        if cancel.is_cancelled() {
            tracing::debug!(target: "profile_cache", key = %key, "profile_cache_write_cancelled");
            return false;
        }
        match self.store.set(&key, &serialized) {
            Ok(()) => {
                tracing::debug!(target: "profile_cache", key = %key, "profile_cache_written");
                true
            }
            Err(err) => {
                tracing::warn!(
                    target: "profile_cache",
                    key = %key,
                    error = %err,
                    "profile_cache_write_failed"
                );
                false
            }
        }
    }
}
