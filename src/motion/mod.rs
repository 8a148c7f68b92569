pub mod error;
pub mod media;
pub mod provider;
pub mod types;
pub mod variants;

pub use error::MotionError;
pub use media::{MediaQuery, ReducedMotionSource, StaticReducedMotion, Subscription};
pub use provider::{AnimationProvider, AnimationScope, AnimationSettings, AnimationState};
pub use types::{AnimationPreferences, Easing, MotionStyle, MotionVariant, Transition};
pub use variants::{VariantDictionary, variant_names};
