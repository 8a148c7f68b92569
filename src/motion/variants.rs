use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::motion::types::{Easing, MotionStyle, MotionVariant, Transition};

pub const DEFAULT_STAGGER_UNIT_MS: u64 = 100;

pub mod variant_names {
    pub const FADE_IN: &str = "fadeIn";
    pub const SLIDE_UP: &str = "slideUp";
    pub const SLIDE_IN_LEFT: &str = "slideInLeft";
    pub const SLIDE_IN_RIGHT: &str = "slideInRight";
    pub const SCALE: &str = "scale";
    pub const STAGGER_CONTAINER: &str = "staggerContainer";
}

/// Named motion descriptions shared by every animated component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantDictionary {
    stagger_unit_ms: u64,
    entries: BTreeMap<String, MotionVariant>,
}

impl VariantDictionary {
    pub fn new(stagger_unit_ms: u64) -> Self {
        Self {
            stagger_unit_ms,
            entries: BTreeMap::new(),
        }
    }

    pub fn with_variant(mut self, name: impl Into<String>, variant: MotionVariant) -> Self {
        self.insert(name, variant);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, variant: MotionVariant) -> Option<MotionVariant> {
        self.entries.insert(name.into(), variant)
    }

    pub fn get(&self, name: &str) -> Option<&MotionVariant> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stagger_unit_ms(&self) -> u64 {
        self.stagger_unit_ms
    }

    /// Also retimes every container variant that staggers its children.
    pub fn set_stagger_unit_ms(&mut self, stagger_unit_ms: u64) {
        self.stagger_unit_ms = stagger_unit_ms;
        for variant in self.entries.values_mut() {
            if variant.transition.stagger_children_ms.is_some() {
                variant.transition.stagger_children_ms = Some(stagger_unit_ms);
            }
        }
    }

    /// Adds or replaces entries; existing names not in `overrides` are kept.
    pub fn merge(mut self, overrides: BTreeMap<String, MotionVariant>) -> Self {
        self.entries.extend(overrides);
        self
    }
}

impl Default for VariantDictionary {
    fn default() -> Self {
        Self::new(DEFAULT_STAGGER_UNIT_MS)
            .with_variant(variant_names::FADE_IN, fade_in())
            .with_variant(variant_names::SLIDE_UP, slide_up())
            .with_variant(variant_names::SLIDE_IN_LEFT, slide_in_horizontal(-50.0))
            .with_variant(variant_names::SLIDE_IN_RIGHT, slide_in_horizontal(50.0))
            .with_variant(variant_names::SCALE, scale())
            .with_variant(variant_names::STAGGER_CONTAINER, stagger_container())
    }
}

pub fn fade_in() -> MotionVariant {
    MotionVariant {
        hidden: MotionStyle::resting().with_opacity(0.0),
        visible: MotionStyle::resting(),
        hover: None,
        transition: Transition::new(500, Easing::EaseOut),
    }
}

pub fn slide_up() -> MotionVariant {
    MotionVariant {
        hidden: MotionStyle::resting().with_opacity(0.0).with_offset(0.0, 20.0),
        visible: MotionStyle::resting(),
        hover: None,
        transition: Transition::new(500, Easing::EaseOut),
    }
}

fn slide_in_horizontal(from_x: f32) -> MotionVariant {
    MotionVariant {
        hidden: MotionStyle::resting().with_opacity(0.0).with_offset(from_x, 0.0),
        visible: MotionStyle::resting(),
        hover: None,
        transition: Transition::new(500, Easing::EaseOut),
    }
}

pub fn scale() -> MotionVariant {
    MotionVariant {
        hidden: MotionStyle::resting().with_opacity(0.0).with_scale(0.8),
        visible: MotionStyle::resting(),
        hover: Some(MotionStyle::resting().with_scale(1.05)),
        transition: Transition::new(300, Easing::EaseOut),
    }
}

fn stagger_container() -> MotionVariant {
    MotionVariant {
        hidden: MotionStyle::resting().with_opacity(0.0),
        visible: MotionStyle::resting(),
        hover: None,
        transition: Transition::new(300, Easing::EaseOut)
            .with_stagger_children(DEFAULT_STAGGER_UNIT_MS),
    }
}
