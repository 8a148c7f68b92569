use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex, PoisonError, Weak,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

pub const REDUCED_MOTION_ENV: &str = "FOLIO_PREFERS_REDUCED_MOTION";

pub type MotionListener = Box<dyn Fn(bool) + Send + Sync>;

/// Platform-level "prefers reduced motion" signal. Read-only from this crate's side.
pub trait ReducedMotionSource: Send + Sync {
    fn current(&self) -> bool;
    fn subscribe(&self, on_change: MotionListener) -> Subscription;
}

/// Handle returned by [`ReducedMotionSource::subscribe`]; unsubscribes when dropped.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn noop() -> Self {
        Self { unsubscribe: None }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticReducedMotion(pub bool);

impl ReducedMotionSource for StaticReducedMotion {
    fn current(&self) -> bool {
        self.0
    }

    fn subscribe(&self, _on_change: MotionListener) -> Subscription {
        Subscription::noop()
    }
}

/// In-process media query whose value can change at runtime; every change is
/// pushed to the registered listeners.
#[derive(Clone, Default)]
pub struct MediaQuery {
    inner: Arc<MediaQueryInner>,
}

#[derive(Default)]
struct MediaQueryInner {
    matches: AtomicBool,
    next_listener_id: AtomicU64,
    listeners: Mutex<BTreeMap<u64, Arc<dyn Fn(bool) + Send + Sync>>>,
}

impl MediaQuery {
    pub fn new(matches: bool) -> Self {
        let query = Self::default();
        query.inner.matches.store(matches, Ordering::Release);
        query
    }

    pub fn from_env() -> Self {
        let matches = std::env::var(REDUCED_MOTION_ENV)
            .ok()
            .is_some_and(|raw| env_flag_enabled(&raw));
        Self::new(matches)
    }

    pub fn set(&self, matches: bool) {
        let previous = self.inner.matches.swap(matches, Ordering::AcqRel);
        if previous == matches {
            return;
        }

        let listeners = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect::<Vec<_>>();
        tracing::debug!(
            target: "motion",
            prefers_reduced_motion = matches,
            listeners = listeners.len(),
            "reduced_motion_changed"
        );
        for listener in listeners {
            listener(matches);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl ReducedMotionSource for MediaQuery {
    fn current(&self) -> bool {
        self.inner.matches.load(Ordering::Acquire)
    }

    fn subscribe(&self, on_change: MotionListener) -> Subscription {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::from(on_change));

        let weak: Weak<MediaQueryInner> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .listeners
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&id);
            }
        })
    }
}

fn env_flag_enabled(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "reduce"
    )
}
