use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseIn,
    #[default]
    EaseOut,
    EaseInOut,
    CubicBezier([f32; 4]),
}

/// Visual state a component is drawn in at one end of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionStyle {
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub translate_x: f32,
    #[serde(default)]
    pub translate_y: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_opacity() -> f32 {
    1.0
}

fn default_scale() -> f32 {
    1.0
}

impl MotionStyle {
    pub fn resting() -> Self {
        Self {
            opacity: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_offset(mut self, translate_x: f32, translate_y: f32) -> Self {
        self.translate_x = translate_x;
        self.translate_y = translate_y;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for MotionStyle {
    fn default() -> Self {
        Self::resting()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default)]
    pub easing: Easing,
    #[serde(default)]
    pub stagger_children_ms: Option<u64>,
}

impl Transition {
    pub fn new(duration_ms: u64, easing: Easing) -> Self {
        Self {
            duration_ms,
            delay_ms: 0,
            easing,
            stagger_children_ms: None,
        }
    }

    /// Zero duration, zero delay: the target state is shown immediately.
    pub fn instant() -> Self {
        Self {
            duration_ms: 0,
            delay_ms: 0,
            easing: Easing::Linear,
            stagger_children_ms: None,
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_stagger_children(mut self, stagger_ms: u64) -> Self {
        self.stagger_children_ms = Some(stagger_ms);
        self
    }

    pub fn is_instant(&self) -> bool {
        self.duration_ms == 0 && self.delay_ms == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionVariant {
    pub hidden: MotionStyle,
    pub visible: MotionStyle,
    #[serde(default)]
    pub hover: Option<MotionStyle>,
    pub transition: Transition,
}

impl MotionVariant {
    /// Collapses the variant to its final state with no transition.
    pub fn settled(&self) -> Self {
        Self {
            hidden: self.visible,
            visible: self.visible,
            hover: None,
            transition: Transition::instant(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationPreferences {
    pub animation_enabled: bool,
    pub prefers_reduced_motion: bool,
}

impl AnimationPreferences {
    pub fn should_animate(&self) -> bool {
        self.animation_enabled && !self.prefers_reduced_motion
    }
}
