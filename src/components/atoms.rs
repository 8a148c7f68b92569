use crate::{
    components::{Component, Node, RenderContext, motion_for},
    motion::{MotionError, variant_names},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub label: String,
    pub variant: String,
    pub animated: bool,
}

impl Badge {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            variant: variant_names::SCALE.to_string(),
            animated: true,
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }
}

impl Component for Badge {
    fn render(&self, ctx: &RenderContext) -> Result<Node, MotionError> {
        let state = ctx.animation()?;
        Ok(Node::new("span")
            .with_attr("class", "badge")
            .with_text(self.label.clone())
            .with_motion(motion_for(&state, &self.variant, self.animated)))
    }
}

/// Keyboard shortcut past the navigation, visible once focused.
#[derive(Debug, Clone, PartialEq)]
pub struct SkipLink {
    pub target: String,
    pub label: String,
    pub animated: bool,
}

impl Default for SkipLink {
    fn default() -> Self {
        Self {
            target: "#main-content".to_string(),
            label: "Skip to main content".to_string(),
            animated: true,
        }
    }
}

impl Component for SkipLink {
    fn render(&self, ctx: &RenderContext) -> Result<Node, MotionError> {
        let state = ctx.animation()?;
        Ok(Node::new("a")
            .with_attr("class", "skip-link")
            .with_attr("href", self.target.clone())
            .with_text(self.label.clone())
            .with_motion(motion_for(&state, variant_names::FADE_IN, self.animated)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionHeading {
    pub title: String,
    pub subtitle: Option<String>,
    pub animated: bool,
}

impl SectionHeading {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            animated: true,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }
}

impl Component for SectionHeading {
    fn render(&self, ctx: &RenderContext) -> Result<Node, MotionError> {
        let state = ctx.animation()?;
        let mut header = Node::new("header").with_child(
            Node::new("h2")
                .with_text(self.title.clone())
                .with_motion(motion_for(&state, variant_names::SLIDE_UP, self.animated)),
        );
        if let Some(subtitle) = &self.subtitle {
            let delay_ms = if self.animated {
                state.get_animation_delay(1).delay_ms
            } else {
                0
            };
            header = header.with_child(
                Node::new("p").with_text(subtitle.clone()).with_motion(
                    motion_for(&state, variant_names::FADE_IN, self.animated).with_delay(delay_ms),
                ),
            );
        }
        Ok(header)
    }
}
