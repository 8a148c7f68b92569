use crate::{
    components::{Badge, Component, Node, RenderContext, motion_for},
    motion::{MotionError, variant_names},
};

/// Row of badges that enter one after another.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeList {
    pub labels: Vec<String>,
    pub animated: bool,
}

impl BadgeList {
    pub fn new(labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            animated: true,
        }
    }

    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }
}

impl Component for BadgeList {
    fn render(&self, ctx: &RenderContext) -> Result<Node, MotionError> {
        let state = ctx.animation()?;
        let animate = self.animated && state.should_animate();

        let mut items = Vec::with_capacity(self.labels.len());
        for (index, label) in self.labels.iter().enumerate() {
            let mut badge = Badge::new(label.clone())
                .animated(self.animated)
                .render(ctx)?;
            if let Some(motion) = badge.motion.take() {
                let delay_ms = if animate {
                    state.get_animation_delay(index).delay_ms
                } else {
                    0
                };
                badge.motion = Some(motion.with_delay(delay_ms));
            }
            items.push(Node::new("li").with_child(badge));
        }

        Ok(Node::new("ul")
            .with_attr("class", "badge-list")
            .with_motion(motion_for(
                &state,
                variant_names::STAGGER_CONTAINER,
                self.animated,
            ))
            .with_children(items))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectCard {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub link: Option<String>,
    /// Position in the surrounding grid, drives the entrance delay.
    pub index: usize,
    pub animated: bool,
}

impl ProjectCard {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tags: Vec::new(),
            link: None,
            index: 0,
            animated: true,
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn at_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }
}

impl Component for ProjectCard {
    fn render(&self, ctx: &RenderContext) -> Result<Node, MotionError> {
        let state = ctx.animation()?;
        let delay_ms = if self.animated {
            state.get_animation_delay(self.index).delay_ms
        } else {
            0
        };

        let mut card = Node::new("article")
            .with_attr("class", "project-card")
            .with_motion(
                motion_for(&state, variant_names::SLIDE_UP, self.animated).with_delay(delay_ms),
            )
            .with_child(Node::new("h3").with_text(self.title.clone()))
            .with_child(Node::new("p").with_text(self.description.clone()));

        if !self.tags.is_empty() {
            card = card.with_child(
                BadgeList::new(self.tags.clone())
                    .animated(self.animated)
                    .render(ctx)?,
            );
        }
        if let Some(link) = &self.link {
            card = card.with_child(
                Node::new("a")
                    .with_attr("href", link.clone())
                    .with_attr("rel", "noopener noreferrer")
                    .with_text("View project"),
            );
        }

        Ok(card)
    }
}
