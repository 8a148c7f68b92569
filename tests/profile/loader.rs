use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio_util::sync::CancellationToken;

use folio::profile::{
    Clock, DEFAULT_CACHE_TTL, KeyValueStore, ManualClock, MemoryStore, ProfileCache, ProfileError,
    ProfileErrorKind, ProfileLoader, ProfileOrigin,
};

use crate::support::{
    BrokenStore, MockSource, NOW_MS, Scripted, cached_profile, github_payload, harness,
    rate_limited,
};

#[tokio::test]
async fn given_fresh_cache_when_loading_then_network_is_never_called() {
    let h = harness(vec![Scripted::Payload(github_payload("Live"))]);
    h.seed_cache(&cached_profile("Cached"), Duration::from_secs(60));

    let outcome = h
        .loader
        .load_profile("octocat", &CancellationToken::new())
        .await
        .expect("fresh cache should satisfy the load");

    assert_eq!(outcome.origin, ProfileOrigin::Cache);
    assert_eq!(outcome.data, cached_profile("Cached"));
    assert_eq!(h.source.calls(), 0);
}

#[tokio::test]
async fn given_no_cache_when_fetch_succeeds_then_only_allow_listed_trimmed_fields_are_kept() {
    let h = harness(vec![Scripted::Payload(github_payload("  The Octocat  "))]);

    let outcome = h
        .loader
        .load_profile("octocat", &CancellationToken::new())
        .await
        .expect("live fetch should succeed");

    assert_eq!(outcome.origin, ProfileOrigin::Network);
    assert_eq!(outcome.data, cached_profile("The Octocat"));
    assert_eq!(h.source.calls(), 1);

    let cached = h.cached().expect("successful fetch is cached");
    assert_eq!(cached.data, outcome.data);
    assert_eq!(cached.timestamp, NOW_MS);

    let stored_json = serde_json::to_value(&cached.data).expect("profile serializes");
    let stored_keys = stored_json
        .as_object()
        .expect("profile is an object")
        .keys()
        .cloned()
        .collect::<Vec<_>>();
    for forbidden in ["email", "id", "node_id", "followers", "blog", "site_admin"] {
        assert!(!stored_keys.iter().any(|key| key == forbidden), "{forbidden} leaked");
    }
}

#[tokio::test]
async fn given_no_cache_when_fetch_is_rate_limited_then_error_is_returned() {
    let h = harness(vec![Scripted::Fail(rate_limited())]);

    let err = h
        .loader
        .load_profile("octocat", &CancellationToken::new())
        .await
        .expect_err("no fallback is available");

    assert_eq!(err.kind, ProfileErrorKind::RateLimited);
    assert!(!err.message.is_empty());
    assert!(h.cached().is_none());
}

#[tokio::test]
async fn given_stale_cache_when_fetch_fails_then_stale_data_is_served_with_reason() {
    let h = harness(vec![Scripted::Fail(rate_limited())]);
    h.seed_cache(&cached_profile("Yesterday"), Duration::from_secs(24 * 60 * 60));

    let outcome = h
        .loader
        .load_profile("octocat", &CancellationToken::new())
        .await
        .expect("stale cache is a valid fallback");

    assert_eq!(outcome.origin, ProfileOrigin::StaleCache);
    assert!(outcome.is_degraded());
    assert_eq!(outcome.data, cached_profile("Yesterday"));
    assert_eq!(
        outcome.fallback_reason.map(|err| err.kind),
        Some(ProfileErrorKind::RateLimited)
    );
    assert_eq!(h.source.calls(), 1);
}

#[tokio::test]
async fn given_cache_expires_when_loading_again_then_network_is_consulted() {
    let h = harness(vec![Scripted::Payload(github_payload("Refreshed"))]);
    h.seed_cache(&cached_profile("Old"), Duration::from_secs(60));

    h.clock.advance_ms(5 * 60 * 1_000);
    let outcome = h
        .loader
        .load_profile("octocat", &CancellationToken::new())
        .await
        .expect("refresh should succeed");

    assert_eq!(outcome.origin, ProfileOrigin::Network);
    assert_eq!(outcome.data.name.as_deref(), Some("Refreshed"));
}

#[tokio::test]
async fn given_malformed_username_when_loading_then_validation_fails_before_network() {
    let h = harness(vec![Scripted::Payload(github_payload("Never"))]);

    let err = h
        .loader
        .load_profile("-bad-name-", &CancellationToken::new())
        .await
        .expect_err("malformed username must be rejected");

    assert_eq!(err.kind, ProfileErrorKind::Validation);
    assert_eq!(h.source.calls(), 0);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn given_payload_missing_login_when_loading_then_failure_uses_fallback_path() {
    let h = harness(vec![Scripted::Payload(serde_json::json!({"message": "weird"}))]);
    h.seed_cache(&cached_profile("Backup"), Duration::from_secs(600));

    let outcome = h
        .loader
        .load_profile("octocat", &CancellationToken::new())
        .await
        .expect("stale cache covers malformed responses");

    assert_eq!(outcome.origin, ProfileOrigin::StaleCache);
    assert_eq!(
        outcome.fallback_reason.map(|err| err.kind),
        Some(ProfileErrorKind::MalformedResponse)
    );
}

#[tokio::test]
async fn given_broken_storage_when_loading_then_cache_is_skipped_and_fetch_still_succeeds() {
    let source = Arc::new(MockSource::new(vec![Scripted::Payload(github_payload(
        "Live",
    ))]));
    let cache = ProfileCache::new(
        Arc::new(BrokenStore),
        Arc::new(ManualClock::new(NOW_MS)),
        DEFAULT_CACHE_TTL,
    );
    let loader = ProfileLoader::new(source.clone(), cache);

    let outcome = loader
        .load_profile("octocat", &CancellationToken::new())
        .await
        .expect("storage failures are never fatal");

    assert_eq!(outcome.origin, ProfileOrigin::Network);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn given_broken_storage_when_fetch_fails_then_upstream_error_is_reported() {
    let source = Arc::new(MockSource::new(vec![Scripted::Fail(rate_limited())]));
    let cache = ProfileCache::new(
        Arc::new(BrokenStore),
        Arc::new(ManualClock::new(NOW_MS)),
        DEFAULT_CACHE_TTL,
    );
    let loader = ProfileLoader::new(source, cache);

    let err = loader
        .load_profile("octocat", &CancellationToken::new())
        .await
        .expect_err("no cache means the upstream error surfaces");
    assert_eq!(err.kind, ProfileErrorKind::RateLimited);
}

#[tokio::test]
async fn given_cancelled_token_when_response_arrives_then_nothing_is_cached() {
    let (release, gate) = tokio::sync::oneshot::channel();
    let h = harness(vec![Scripted::Gate(gate)]);
    let token = CancellationToken::new();

    let loader = h.loader.clone();
    let task_token = token.clone();
    let task = tokio::spawn(async move { loader.load_profile("octocat", &task_token).await });

    h.source.wait_for_calls(1).await;
    token.cancel();
    release
        .send(Ok(github_payload("Late")))
        .expect("loader is still waiting");

    let err = task
        .await
        .expect("load task should not panic")
        .expect_err("cancelled load reports cancellation");
    assert_eq!(err.kind, ProfileErrorKind::Cancelled);
    assert!(h.cached().is_none());
}

#[tokio::test]
async fn given_cancelled_token_when_fetch_fails_then_stale_fallback_is_not_used() {
    let (release, gate) = tokio::sync::oneshot::channel();
    let h = harness(vec![Scripted::Gate(gate)]);
    h.seed_cache(&cached_profile("Stale"), Duration::from_secs(3_600));
    let token = CancellationToken::new();

    let loader = h.loader.clone();
    let task_token = token.clone();
    let task = tokio::spawn(async move { loader.load_profile("octocat", &task_token).await });

    h.source.wait_for_calls(1).await;
    token.cancel();
    release.send(Err(rate_limited())).expect("loader is still waiting");

    let err = task
        .await
        .expect("load task should not panic")
        .expect_err("cancelled load reports cancellation");
    assert!(err.is_cancelled());
}

/// Clock that cancels `cancel` on its `cancel_on`-th read, simulating a retry
/// landing between the post-fetch check and the cache write.
struct CancellingClock {
    reads: AtomicUsize,
    cancel_on: usize,
    cancel: CancellationToken,
}

impl Clock for CancellingClock {
    fn now_ms(&self) -> i64 {
        if self.reads.fetch_add(1, Ordering::SeqCst) + 1 == self.cancel_on {
            self.cancel.cancel();
        }
        NOW_MS
    }
}

#[tokio::test]
async fn given_cancellation_while_stamping_entry_when_committing_then_cache_is_not_written() {
    let cancel = CancellationToken::new();
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(CancellingClock {
        reads: AtomicUsize::new(0),
        // first read is the fresh-cache check, second stamps the new entry
        cancel_on: 2,
        cancel: cancel.clone(),
    });
    let source = Arc::new(MockSource::new(vec![Scripted::Payload(github_payload(
        "Late",
    ))]));
    let loader = ProfileLoader::new(
        source.clone(),
        ProfileCache::new(store.clone(), clock, DEFAULT_CACHE_TTL),
    );

    let err = loader
        .load_profile("octocat", &cancel)
        .await
        .expect_err("cancelled attempt must not report success");

    assert!(cancel.is_cancelled());
    assert_eq!(err.kind, ProfileErrorKind::Cancelled);
    assert_eq!(source.calls(), 1);
    assert!(store.is_empty());
    assert_eq!(store.get("github-profile-octocat").expect("memory store reads"), None);
}

#[tokio::test]
async fn given_resolved_live_result_when_cancelled_before_commit_then_nothing_is_cached() {
    let h = harness(vec![Scripted::Payload(github_payload("Live"))]);
    let cancel = CancellationToken::new();

    let pending = h
        .loader
        .resolve("octocat", &cancel)
        .await
        .expect("live fetch resolves");
    assert_eq!(pending.outcome().origin, ProfileOrigin::Network);
    assert!(h.cached().is_none());

    cancel.cancel();
    let err = h
        .loader
        .commit(pending, &cancel)
        .expect_err("commit after cancellation is refused");

    assert!(err.is_cancelled());
    assert!(h.cached().is_none());
}

#[tokio::test]
async fn given_unrecoverable_failure_when_stale_cache_exists_then_error_is_not_masked() {
    let h = harness(vec![Scripted::Fail(ProfileError::new(
        ProfileErrorKind::Storage,
        "profile source backing file is unreadable",
    ))]);
    h.seed_cache(&cached_profile("Stale"), Duration::from_secs(3_600));

    let err = h
        .loader
        .load_profile("octocat", &CancellationToken::new())
        .await
        .expect_err("only recoverable failures fall back to the cache");

    assert_eq!(err.kind, ProfileErrorKind::Storage);
    assert!(!err.is_recoverable());
}
