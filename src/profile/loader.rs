use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::profile::{
    cache::ProfileCache,
    error::{ProfileError, cancelled},
    sanitize::sanitize_profile,
    source::ProfileSource,
    types::{LoadOutcome, ProfileOrigin},
    username::Username,
};

/// One load attempt: validate, fresh cache, live fetch, stale fallback.
///
/// [`ProfileLoader::resolve`] does the work without touching the cache and
/// [`ProfileLoader::commit`] persists a live result. Callers that decide
/// supersession under a lock commit while holding it.
#[derive(Clone)]
pub struct ProfileLoader {
    source: Arc<dyn ProfileSource>,
    cache: ProfileCache,
}

/// A resolved attempt whose live result has not been cached yet.
#[derive(Debug)]
pub struct PendingLoad {
    username: Username,
    outcome: LoadOutcome,
}

impl PendingLoad {
    pub fn outcome(&self) -> &LoadOutcome {
        &self.outcome
    }
}

impl ProfileLoader {
    pub fn new(source: Arc<dyn ProfileSource>, cache: ProfileCache) -> Self {
        Self { source, cache }
    }

    #[tracing::instrument(name = "load_profile", target = "profile", skip(self, cancel))]
    pub async fn load_profile(
        &self,
        raw_username: &str,
        cancel: &CancellationToken,
    ) -> Result<LoadOutcome, ProfileError> {
        let pending = self.resolve(raw_username, cancel).await?;
        self.commit(pending, cancel)
    }

    pub async fn resolve(
        &self,
        raw_username: &str,
        cancel: &CancellationToken,
    ) -> Result<PendingLoad, ProfileError> {
        let username = Username::parse(raw_username).inspect_err(|err| {
            tracing::warn!(target: "profile", error = %err, "profile_username_rejected");
        })?;

        if cancel.is_cancelled() {
            return Err(cancelled());
        }

        if let Some(entry) = self.cache.read_fresh(&username) {
            tracing::debug!(
                target: "profile",
                username = %username,
                age_ms = entry.age_ms(self.cache.now_ms()),
                "profile_cache_hit"
            );
            return Ok(PendingLoad {
                username,
                outcome: LoadOutcome {
                    data: entry.data,
                    origin: ProfileOrigin::Cache,
                    fallback_reason: None,
                },
            });
        }

        let fetched = self
            .source
            .fetch_profile(&username, cancel)
            .await
            .and_then(|payload| sanitize_profile(&payload));

        if cancel.is_cancelled() {
            tracing::debug!(target: "profile", username = %username, "profile_fetch_cancelled");
            return Err(cancelled());
        }

        let err = match fetched {
            Ok(data) => {
                return Ok(PendingLoad {
                    username,
                    outcome: LoadOutcome {
                        data,
                        origin: ProfileOrigin::Network,
                        fallback_reason: None,
                    },
                });
            }
            Err(err) if !err.is_recoverable() => return Err(err),
            Err(err) => err,
        };

        tracing::warn!(
            target: "profile",
            username = %username,
            kind = ?err.kind,
            error = %err,
            "profile_fetch_failed"
        );
        let Some(entry) = self.cache.read(&username) else {
            return Err(err);
        };
        tracing::info!(
            target: "profile",
            username = %username,
            age_ms = entry.age_ms(self.cache.now_ms()),
            "profile_stale_cache_fallback"
        );
        Ok(PendingLoad {
            username,
            outcome: LoadOutcome {
                data: entry.data,
                origin: ProfileOrigin::StaleCache,
                fallback_reason: Some(err),
            },
        })
    }

    /// Caches a live result unless `cancel` fired first. A cancelled attempt
    /// leaves the cache untouched and reports a cancellation error.
    pub fn commit(
        &self,
        pending: PendingLoad,
        cancel: &CancellationToken,
    ) -> Result<LoadOutcome, ProfileError> {
        if cancel.is_cancelled() {
            return Err(cancelled());
        }

        let PendingLoad { username, outcome } = pending;
        if outcome.origin == ProfileOrigin::Network {
            let written = self.cache.write(&username, &outcome.data, cancel);
            if !written && cancel.is_cancelled() {
                tracing::debug!(target: "profile", username = %username, "profile_commit_cancelled");
                return Err(cancelled());
            }
            tracing::info!(target: "profile", username = %username, written, "profile_fetched");
        }

        Ok(outcome)
    }
}
