use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MotionError {
    #[error("animation state requested outside of an animation provider")]
    OutsideProvider,
    #[error("animation provider has been unmounted")]
    ProviderUnmounted,
}
