use folio::{
    components::{
        Badge, BadgeList, Component, ProfileCard, ProjectCard, RenderContext, SectionHeading,
        SkipLink,
    },
    motion::MotionError,
    profile::{
        GithubProfile, ProfileView,
        types::{LoadOutcome, ProfileOrigin},
    },
};

use crate::{context, mounted};

fn settled_profile(origin: ProfileOrigin) -> ProfileView {
    ProfileView::from_outcome(
        LoadOutcome {
            data: GithubProfile {
                login: "octocat".to_string(),
                avatar_url: "https://avatars.githubusercontent.com/u/583231".to_string(),
                html_url: "https://github.com/octocat".to_string(),
                name: Some("The Octocat".to_string()),
                bio: Some("Mascot".to_string()),
                location: Some("San Francisco".to_string()),
                company: None,
            },
            origin,
            fallback_reason: None,
        },
        0,
    )
}

fn catalogue() -> Vec<Box<dyn Component>> {
    vec![
        Box::new(Badge::new("Rust")),
        Box::new(SkipLink::default()),
        Box::new(SectionHeading::new("Projects").with_subtitle("Things I have built")),
        Box::new(BadgeList::new(["Rust", "Tokio", "Serde"])),
        Box::new(
            ProjectCard::new("folio", "Portfolio toolkit")
                .with_tags(["rust", "async"])
                .with_link("https://github.com/octocat/folio")
                .at_index(2),
        ),
        Box::new(ProfileCard::new(settled_profile(ProfileOrigin::Network))),
        Box::new(ProfileCard::new(settled_profile(ProfileOrigin::StaleCache))),
    ]
}

#[test]
fn given_component_without_provider_when_rendered_then_usage_error_is_returned() {
    let ctx = RenderContext::new();
    for component in catalogue() {
        assert_eq!(component.render(&ctx), Err(MotionError::OutsideProvider));
    }
}

#[test]
fn given_animation_disabled_when_rendered_then_structure_and_text_are_unchanged() {
    let animated = mounted(true, false);
    let disabled = mounted(false, false);
    let reduced = mounted(true, true);

    for component in catalogue() {
        let with_motion = component.render(&context(&animated)).expect("render");
        let without_motion = component.render(&context(&disabled)).expect("render");
        let reduced_motion = component.render(&context(&reduced)).expect("render");

        assert!(!with_motion.text_content().is_empty());
        assert_eq!(with_motion.text_content(), without_motion.text_content());
        assert_eq!(with_motion.structure(), without_motion.structure());
        assert_eq!(with_motion.structure(), reduced_motion.structure());

        for motion in without_motion.descendants_with_motion() {
            assert!(motion.is_static(), "disabled render must not animate: {motion:?}");
        }
        assert!(
            with_motion
                .descendants_with_motion()
                .iter()
                .any(|motion| !motion.is_static()),
            "enabled render should animate something"
        );
    }
}

#[test]
fn given_local_flag_off_when_globally_enabled_then_component_stays_static() {
    let provider = mounted(true, false);
    let node = Badge::new("Rust")
        .animated(false)
        .render(&context(&provider))
        .expect("render");

    let motion = node.motion.expect("badge carries motion props");
    assert!(motion.is_static());
}

#[test]
fn given_local_flag_on_when_globally_disabled_then_global_switch_wins() {
    let provider = mounted(false, false);
    let node = Badge::new("Rust")
        .animated(true)
        .render(&context(&provider))
        .expect("render");

    assert!(node.motion.expect("badge carries motion props").is_static());
}

#[test]
fn given_badge_list_when_animating_then_items_enter_in_order() {
    let provider = mounted(true, false);
    let node = BadgeList::new(["a", "b", "c", "d"])
        .render(&context(&provider))
        .expect("render");

    let delays = node
        .children
        .iter()
        .filter_map(|item| item.children.first())
        .filter_map(|badge| badge.motion.map(|motion| motion.transition.delay_ms))
        .collect::<Vec<_>>();
    assert_eq!(delays, vec![0, 100, 200, 300]);
}

#[test]
fn given_runtime_toggle_when_rerendered_then_new_policy_applies() {
    let provider = mounted(true, false);
    let ctx = context(&provider);
    let heading = SectionHeading::new("About");

    let before = heading.render(&ctx).expect("render");
    provider.set_animation_enabled(false);
    let after = heading.render(&ctx).expect("render");

    assert!(before.descendants_with_motion().iter().any(|m| !m.is_static()));
    assert!(after.descendants_with_motion().iter().all(|m| m.is_static()));
    assert_eq!(before.structure(), after.structure());
}
