use crate::{
    components::{Component, Node, RenderContext, motion_for},
    motion::{MotionError, variant_names},
    profile::{FetchStatus, ProfileView},
};

pub const LOADING_TEXT: &str = "Loading GitHub profile...";
pub const RETRY_LABEL: &str = "Retry";

/// Presents a [`ProfileView`]. Always renders visible text, whatever the status.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCard {
    pub view: ProfileView,
    pub animated: bool,
}

impl ProfileCard {
    pub fn new(view: ProfileView) -> Self {
        Self {
            view,
            animated: true,
        }
    }

    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }
}

impl Component for ProfileCard {
    fn render(&self, ctx: &RenderContext) -> Result<Node, MotionError> {
        let state = ctx.animation()?;
        let mut card = Node::new("section")
            .with_attr("class", "github-profile")
            .with_attr("data-status", status_label(self.view.status))
            .with_motion(motion_for(&state, variant_names::FADE_IN, self.animated));

        if matches!(self.view.status, FetchStatus::Idle | FetchStatus::Loading) {
            return Ok(card.with_child(
                Node::new("p")
                    .with_attr("role", "status")
                    .with_text(LOADING_TEXT),
            ));
        }

        if let Some(data) = &self.view.data {
            card = card
                .with_child(
                    Node::new("img")
                        .with_attr("src", data.avatar_url.clone())
                        .with_attr("alt", format!("{} avatar", data.login)),
                )
                .with_child(Node::new("h3").with_text(data.display_name().to_string()));
            for (class, value) in [
                ("bio", &data.bio),
                ("location", &data.location),
                ("company", &data.company),
            ] {
                if let Some(value) = value {
                    card = card.with_child(
                        Node::new("p")
                            .with_attr("class", class)
                            .with_text(value.clone()),
                    );
                }
            }
            card = card.with_child(
                Node::new("a")
                    .with_attr("href", data.html_url.clone())
                    .with_attr("rel", "noopener noreferrer")
                    .with_text("View GitHub profile"),
            );
        }

        if let Some(message) = &self.view.error_message {
            card = card
                .with_child(
                    Node::new("p")
                        .with_attr("role", "alert")
                        .with_text(message.clone()),
                )
                .with_child(
                    Node::new("button")
                        .with_attr("type", "button")
                        .with_attr("data-action", "retry")
                        .with_text(RETRY_LABEL),
                );
        }

        Ok(card)
    }
}

fn status_label(status: FetchStatus) -> &'static str {
    match status {
        FetchStatus::Idle => "idle",
        FetchStatus::Loading => "loading",
        FetchStatus::Success => "success",
        FetchStatus::Error => "error",
    }
}
