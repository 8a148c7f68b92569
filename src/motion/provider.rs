use std::sync::{Arc, Weak};

use tokio::sync::watch;

use crate::motion::{
    error::MotionError,
    media::{ReducedMotionSource, Subscription},
    types::{AnimationPreferences, MotionVariant, Transition},
    variants::{self, VariantDictionary, variant_names},
};

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSettings {
    pub animation_enabled: bool,
    pub variants: VariantDictionary,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            animation_enabled: true,
            variants: VariantDictionary::default(),
        }
    }
}

/// App-root owner of the animation policy.
///
/// Holds the single reduced-motion subscription for the whole tree and fans
/// the latest preferences out through a `watch` channel. Dropping the provider
/// is the unmount: the subscription is released and every [`AnimationScope`]
/// handed out stops resolving.
pub struct AnimationProvider {
    shared: Arc<ProviderShared>,
    subscription: Option<Subscription>,
}

struct ProviderShared {
    preferences: watch::Sender<AnimationPreferences>,
    variants: Arc<VariantDictionary>,
}

impl AnimationProvider {
    pub fn mount(settings: AnimationSettings, source: &dyn ReducedMotionSource) -> Self {
        let (preferences, _) = watch::channel(AnimationPreferences {
            animation_enabled: settings.animation_enabled,
            prefers_reduced_motion: false,
        });
        let shared = Arc::new(ProviderShared {
            preferences,
            variants: Arc::new(settings.variants),
        });

        let weak = Arc::downgrade(&shared);
        let subscription = source.subscribe(Box::new(move |prefers_reduced_motion| {
            if let Some(shared) = weak.upgrade() {
                shared.apply_reduced_motion(prefers_reduced_motion);
            }
        }));
        // Read only once listening, so a flip during subscribe is not lost.
        shared.apply_reduced_motion(source.current());

        let initial = *shared.preferences.borrow();
        tracing::debug!(
            target: "motion",
            animation_enabled = initial.animation_enabled,
            prefers_reduced_motion = initial.prefers_reduced_motion,
            variants = shared.variants.len(),
            "animation_provider_mounted"
        );

        Self {
            shared,
            subscription: Some(subscription),
        }
    }

    pub fn scope(&self) -> AnimationScope {
        AnimationScope {
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn preferences(&self) -> AnimationPreferences {
        *self.shared.preferences.borrow()
    }

    pub fn state(&self) -> AnimationState {
        self.shared.snapshot()
    }

    /// Flips the master switch for every consumer at once.
    pub fn set_animation_enabled(&self, animation_enabled: bool) {
        let changed = self.shared.preferences.send_if_modified(|prefs| {
            let changed = prefs.animation_enabled != animation_enabled;
            prefs.animation_enabled = animation_enabled;
            changed
        });
        if changed {
            tracing::info!(target: "motion", animation_enabled, "animation_switch_changed");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AnimationPreferences> {
        self.shared.preferences.subscribe()
    }

    pub fn unmount(self) {}
}

impl Drop for AnimationProvider {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        tracing::debug!(target: "motion", "animation_provider_unmounted");
    }
}

impl ProviderShared {
    fn apply_reduced_motion(&self, prefers_reduced_motion: bool) {
        self.preferences.send_if_modified(|prefs| {
            let changed = prefs.prefers_reduced_motion != prefers_reduced_motion;
            prefs.prefers_reduced_motion = prefers_reduced_motion;
            changed
        });
    }

    fn snapshot(&self) -> AnimationState {
        AnimationState::new(*self.preferences.borrow(), Arc::clone(&self.variants))
    }
}

/// Handle passed down the component tree. Does not keep the provider alive.
#[derive(Clone)]
pub struct AnimationScope {
    shared: Weak<ProviderShared>,
}

impl AnimationScope {
    pub fn use_animation(&self) -> Result<AnimationState, MotionError> {
        self.shared
            .upgrade()
            .map(|shared| shared.snapshot())
            .ok_or(MotionError::ProviderUnmounted)
    }

    pub fn watch(&self) -> Result<watch::Receiver<AnimationPreferences>, MotionError> {
        self.shared
            .upgrade()
            .map(|shared| shared.preferences.subscribe())
            .ok_or(MotionError::ProviderUnmounted)
    }
}

/// What a consumer sees when it asks for the animation policy.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    preferences: AnimationPreferences,
    variants: Arc<VariantDictionary>,
}

impl AnimationState {
    pub fn new(preferences: AnimationPreferences, variants: Arc<VariantDictionary>) -> Self {
        Self {
            preferences,
            variants,
        }
    }

    pub fn preferences(&self) -> AnimationPreferences {
        self.preferences
    }

    pub fn animation_enabled(&self) -> bool {
        self.preferences.animation_enabled
    }

    pub fn prefers_reduced_motion(&self) -> bool {
        self.preferences.prefers_reduced_motion
    }

    pub fn should_animate(&self) -> bool {
        self.preferences.should_animate()
    }

    pub fn should_reduce_motion(&self) -> bool {
        !self.should_animate()
    }

    pub fn stagger_unit_ms(&self) -> u64 {
        self.variants.stagger_unit_ms()
    }

    /// Looks up a named variant, already collapsed to its settled form when
    /// animation is off.
    pub fn variant(&self, name: &str) -> Option<MotionVariant> {
        self.variants.get(name).map(|variant| self.resolve(*variant))
    }

    pub fn fade_in_variants(&self) -> MotionVariant {
        self.variant_or(variant_names::FADE_IN, variants::fade_in)
    }

    pub fn slide_up_variants(&self) -> MotionVariant {
        self.variant_or(variant_names::SLIDE_UP, variants::slide_up)
    }

    pub fn scale_variants(&self) -> MotionVariant {
        self.variant_or(variant_names::SCALE, variants::scale)
    }

    /// Transition for the `index`-th item of a staggered list.
    pub fn get_animation_delay(&self, index: usize) -> Transition {
        if !self.should_animate() {
            return Transition::instant();
        }

        let index = u64::try_from(index).unwrap_or(u64::MAX);
        self.fade_in_variants()
            .transition
            .with_delay(index.saturating_mul(self.stagger_unit_ms()))
    }

    fn variant_or(&self, name: &str, fallback: fn() -> MotionVariant) -> MotionVariant {
        self.variant(name)
            .unwrap_or_else(|| self.resolve(fallback()))
    }

    fn resolve(&self, variant: MotionVariant) -> MotionVariant {
        if self.should_animate() {
            variant
        } else {
            variant.settled()
        }
    }
}
