pub mod atoms;
pub mod molecules;
pub mod node;
pub mod profile_card;

pub use atoms::{Badge, SectionHeading, SkipLink};
pub use molecules::{BadgeList, ProjectCard};
pub use node::{MotionProps, Node};
pub use profile_card::ProfileCard;

use crate::motion::{AnimationScope, AnimationState, MotionError};

pub trait Component {
    fn render(&self, ctx: &RenderContext) -> Result<Node, MotionError>;
}

/// Dependencies handed down the component tree at render time.
#[derive(Clone, Default)]
pub struct RenderContext {
    animation: Option<AnimationScope>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_animation(scope: AnimationScope) -> Self {
        Self {
            animation: Some(scope),
        }
    }

    pub fn animation(&self) -> Result<AnimationState, MotionError> {
        self.animation
            .as_ref()
            .ok_or(MotionError::OutsideProvider)?
            .use_animation()
    }
}

/// Resolves motion for one consumer: the global policy ANDed with the local flag.
pub(crate) fn motion_for(
    state: &AnimationState,
    variant_name: &str,
    animated: bool,
) -> MotionProps {
    let variant = state
        .variant(variant_name)
        .unwrap_or_else(|| state.fade_in_variants());
    MotionProps::from_variant(&variant, animated && state.should_animate())
}
