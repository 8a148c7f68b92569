use std::collections::BTreeMap;

use serde::Serialize;

use crate::motion::{MotionStyle, MotionVariant, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotionProps {
    pub initial: MotionStyle,
    pub animate: MotionStyle,
    pub while_hover: Option<MotionStyle>,
    pub transition: Transition,
}

impl MotionProps {
    pub fn from_variant(variant: &MotionVariant, animate: bool) -> Self {
        let variant = if animate { *variant } else { variant.settled() };
        Self {
            initial: variant.hidden,
            animate: variant.visible,
            while_hover: variant.hover,
            transition: variant.transition,
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.transition.delay_ms = delay_ms;
        self
    }

    /// True when the element is drawn in its final state with no transition.
    pub fn is_static(&self) -> bool {
        self.initial == self.animate && self.while_hover.is_none() && self.transition.is_instant()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub tag: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion: Option<MotionProps>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            text: None,
            motion: None,
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_motion(mut self, motion: MotionProps) -> Self {
        self.motion = Some(motion);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Text of this node and its descendants, depth-first, space separated.
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    /// Same tree with every motion annotation removed.
    pub fn structure(&self) -> Node {
        Node {
            tag: self.tag.clone(),
            attrs: self.attrs.clone(),
            text: self.text.clone(),
            motion: None,
            children: self.children.iter().map(Node::structure).collect(),
        }
    }

    pub fn find(&self, predicate: &dyn Fn(&Node) -> bool) -> Option<&Node> {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(predicate))
    }

    pub fn descendants_with_motion(&self) -> Vec<&MotionProps> {
        let mut out = Vec::new();
        self.collect_motion(&mut out);
        out
    }

    fn collect_text<'a>(&'a self, parts: &mut Vec<&'a str>) {
        if let Some(text) = self.text.as_deref() {
            parts.push(text);
        }
        for child in &self.children {
            child.collect_text(parts);
        }
    }

    fn collect_motion<'a>(&'a self, out: &mut Vec<&'a MotionProps>) {
        if let Some(motion) = self.motion.as_ref() {
            out.push(motion);
        }
        for child in &self.children {
            child.collect_motion(out);
        }
    }
}
