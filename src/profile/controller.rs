use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;

use crate::profile::{loader::ProfileLoader, types::ProfileView};

/// Per-instance profile state machine: `idle -> loading -> {success, error}`,
/// with `retry()` going back to `loading`.
///
/// Every attempt runs under its own child token. Starting a new attempt cancels
/// the previous token under the same lock that guards state transitions, so a
/// late result from a superseded attempt is always discarded.
pub struct ProfileController {
    shared: Arc<ControllerShared>,
}

struct ControllerShared {
    username: String,
    loader: ProfileLoader,
    root: CancellationToken,
    view: watch::Sender<ProfileView>,
    attempt: Mutex<AttemptSlot>,
}

#[derive(Default)]
struct AttemptSlot {
    token: Option<CancellationToken>,
    retry_count: u32,
}

impl ProfileController {
    pub fn new(username: impl Into<String>, loader: ProfileLoader) -> Self {
        let (view, _) = watch::channel(ProfileView::idle());
        Self {
            shared: Arc::new(ControllerShared {
                username: username.into(),
                loader,
                root: CancellationToken::new(),
                view,
                attempt: Mutex::new(AttemptSlot::default()),
            }),
        }
    }

    pub fn username(&self) -> &str {
        &self.shared.username
    }

    pub fn view(&self) -> ProfileView {
        self.shared.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProfileView> {
        self.shared.view.subscribe()
    }

    pub async fn mount(&self) {
        self.start_attempt(false).await;
    }

    /// Re-runs the whole load, fresh-cache check included.
    pub async fn retry(&self) {
        self.start_attempt(true).await;
    }

    pub async fn unmount(&self) {
        let mut slot = self.shared.attempt.lock().await;
        if let Some(token) = slot.token.take() {
            token.cancel();
        }
        self.shared.root.cancel();
        tracing::debug!(
            target: "profile",
            username = %self.shared.username,
            "profile_controller_unmounted"
        );
    }

    pub fn is_mounted(&self) -> bool {
        !self.shared.root.is_cancelled()
    }

    /// Waits for the current attempt to reach `success` or `error`.
    ///
    /// Never resolves for a controller that was not mounted, or that was
    /// unmounted while loading.
    pub async fn settled(&self) -> ProfileView {
        let mut rx = self.subscribe();
        match rx.wait_for(ProfileView::is_settled).await {
            Ok(view) => view.clone(),
            Err(_) => self.view(),
        }
    }

    async fn start_attempt(&self, is_retry: bool) {
        if self.shared.root.is_cancelled() {
            tracing::debug!(
                target: "profile",
                username = %self.shared.username,
                "profile_attempt_after_unmount_ignored"
            );
            return;
        }

        let mut slot = self.shared.attempt.lock().await;
        if let Some(previous) = slot.token.take() {
            previous.cancel();
        }
        if is_retry {
            slot.retry_count = slot.retry_count.saturating_add(1);
        }

        let token = self.shared.root.child_token();
        slot.token = Some(token.clone());
        let retry_count = slot.retry_count;
        self.shared.view.send_replace(ProfileView::loading(retry_count));
        drop(slot);

        tracing::debug!(
            target: "profile",
            username = %self.shared.username,
            retry_count,
            "profile_attempt_started"
        );
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move { shared.run_attempt(token, retry_count).await });
    }
}

impl Drop for ProfileController {
    fn drop(&mut self) {
        self.shared.root.cancel();
    }
}

impl ControllerShared {
    async fn run_attempt(&self, token: CancellationToken, retry_count: u32) {
        let resolved = self.loader.resolve(&self.username, &token).await;

        // retry() and unmount() cancel under this lock, so committing while
        // holding it cannot overwrite a newer attempt's cache entry.
        let _slot = self.attempt.lock().await;
        if token.is_cancelled() {
            tracing::debug!(
                target: "profile",
                username = %self.username,
                retry_count,
                "profile_attempt_superseded"
            );
            return;
        }

        let view = match resolved.and_then(|pending| self.loader.commit(pending, &token)) {
            Ok(outcome) => ProfileView::from_outcome(outcome, retry_count),
            Err(err) if err.is_cancelled() => return,
            Err(err) => ProfileView::from_error(&err, retry_count),
        };
        self.view.send_replace(view);
    }
}
