//! The template node tree: JSON model, style defaults, and content binding.

use std::collections::HashMap;

use serde::Deserialize;
use taffy::prelude::*;

use crate::display::Slot;
use crate::error::Error;

/// What a node is allowed to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Text leaf.
    Text,
    /// Image leaf.
    Img,
    /// Container; accepts either content kind when bound directly.
    #[default]
    #[serde(other)]
    Div,
}

/// One element of a layout template.
///
/// Style enums stay as strings here; unknown values fall back to the
/// documented defaults when translated (column, nowrap, flex-start, stretch,
/// auto). Unknown JSON fields are ignored so templates can carry metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Node {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub children: Vec<Node>,
    #[serde(rename = "fontSize")]
    pub font_size: f32,
    pub padding: f32,
    pub margin: f32,
    #[serde(rename = "flexDirection")]
    pub flex_direction: String,
    #[serde(rename = "flexGrow")]
    pub flex_grow: f32,
    #[serde(rename = "flexShrink")]
    pub flex_shrink: f32,
    #[serde(rename = "flexWrap")]
    pub flex_wrap: String,
    #[serde(rename = "justifyContent")]
    pub justify_content: String,
    #[serde(rename = "alignItems")]
    pub align_items: String,
    #[serde(rename = "alignContent")]
    pub align_content: String,
    #[serde(rename = "alignSelf")]
    pub align_self: String,
    #[serde(rename = "flexBasis")]
    pub flex_basis: Option<String>,
    #[serde(skip)]
    pub content: Option<Slot>,
}

impl Default for Node {
    fn default() -> Self {
        Node {
            id: None,
            node_type: NodeType::Div,
            children: Vec::new(),
            font_size: 1.0,
            padding: 0.0,
            margin: 0.0,
            flex_direction: String::new(),
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_wrap: String::new(),
            justify_content: String::new(),
            align_items: String::new(),
            align_content: String::new(),
            align_self: String::new(),
            flex_basis: None,
            content: None,
        }
    }
}

impl Node {
    /// Parses a template document into a node tree.
    pub fn parse(template: &str) -> Result<Node, Error> {
        Ok(serde_json::from_str(template)?)
    }

    /// Depth-first search for a node by id, the node itself included.
    /// The first match wins on duplicate ids.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Attaches content slots to their nodes.
    ///
    /// Ids without a matching node are dropped silently. A slot whose kind
    /// the node type cannot draw is a bind-time error, before any bus or
    /// canvas work happens.
    pub fn bind(&mut self, slots: HashMap<String, Slot>) -> Result<(), Error> {
        for (id, slot) in slots {
            let Some(node) = self.find_mut(&id) else {
                log::debug!("content id '{id}' has no slot in the template");
                continue;
            };
            let accepted = match node.node_type {
                NodeType::Div => true,
                NodeType::Text => matches!(slot, Slot::Text(_)),
                NodeType::Img => matches!(slot, Slot::Image(_)),
            };
            if !accepted {
                return Err(Error::SlotTypeMismatch {
                    slot: id,
                    kind: slot.kind(),
                });
            }
            node.content = Some(slot);
        }
        Ok(())
    }

    /// Taffy style for this node. Translation is one-to-one, except padding,
    /// which only applies to content-bound nodes: the measure function
    /// already folds it into the reported size, and the rasterizer insets
    /// the content box by it.
    pub(crate) fn style(&self) -> Style {
        let mut style = Style {
            flex_direction: direction_from_str(&self.flex_direction),
            flex_wrap: wrap_from_str(&self.flex_wrap),
            flex_grow: self.flex_grow,
            flex_shrink: self.flex_shrink,
            justify_content: justify_from_str(&self.justify_content),
            align_items: align_items_from_str(&self.align_items),
            align_content: align_content_from_str(&self.align_content),
            align_self: align_items_from_str(&self.align_self),
            margin: Rect {
                left: LengthPercentageAuto::Length(self.margin),
                right: LengthPercentageAuto::Length(self.margin),
                top: LengthPercentageAuto::Length(self.margin),
                bottom: LengthPercentageAuto::Length(self.margin),
            },
            ..Style::default()
        };
        if self.content.is_some() {
            style.padding = Rect {
                left: LengthPercentage::Length(self.padding),
                right: LengthPercentage::Length(self.padding),
                top: LengthPercentage::Length(self.padding),
                bottom: LengthPercentage::Length(self.padding),
            };
        }
        style.flex_basis = basis_from_str(self.flex_basis.as_deref());
        style
    }
}

/// "row" | "row-reverse" | "column" | "column-reverse"; unknown → column.
fn direction_from_str(value: &str) -> FlexDirection {
    match value {
        "row" => FlexDirection::Row,
        "row-reverse" => FlexDirection::RowReverse,
        "column-reverse" => FlexDirection::ColumnReverse,
        _ => FlexDirection::Column,
    }
}

/// "nowrap" | "wrap" | "wrap-reverse"; unknown → nowrap.
fn wrap_from_str(value: &str) -> FlexWrap {
    match value {
        "wrap" => FlexWrap::Wrap,
        "wrap-reverse" => FlexWrap::WrapReverse,
        _ => FlexWrap::NoWrap,
    }
}

/// Unknown → none, which taffy resolves to flex-start.
fn justify_from_str(value: &str) -> Option<JustifyContent> {
    match value {
        "flex-start" => Some(JustifyContent::FlexStart),
        "flex-end" => Some(JustifyContent::FlexEnd),
        "center" => Some(JustifyContent::Center),
        "space-between" => Some(JustifyContent::SpaceBetween),
        "space-around" => Some(JustifyContent::SpaceAround),
        _ => None,
    }
}

/// Unknown → none: stretch for items, auto for self.
fn align_items_from_str(value: &str) -> Option<AlignItems> {
    match value {
        "flex-start" => Some(AlignItems::FlexStart),
        "flex-end" => Some(AlignItems::FlexEnd),
        "center" => Some(AlignItems::Center),
        "stretch" => Some(AlignItems::Stretch),
        "baseline" => Some(AlignItems::Baseline),
        _ => None,
    }
}

/// Unknown → none, which taffy resolves to stretch.
fn align_content_from_str(value: &str) -> Option<AlignContent> {
    match value {
        "flex-start" => Some(AlignContent::FlexStart),
        "flex-end" => Some(AlignContent::FlexEnd),
        "center" => Some(AlignContent::Center),
        "stretch" => Some(AlignContent::Stretch),
        "space-between" => Some(AlignContent::SpaceBetween),
        "space-around" => Some(AlignContent::SpaceAround),
        _ => None,
    }
}

/// A decimal integer string is pixels; anything else is auto.
/// Percent syntax is not supported.
fn basis_from_str(value: Option<&str>) -> Dimension {
    match value {
        Some(v) if !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()) => {
            match v.parse::<u32>() {
                Ok(px) => Dimension::Length(px as f32),
                Err(_) => Dimension::Auto,
            }
        }
        _ => Dimension::Auto,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Slot;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let node = Node::parse(r#"{"type": "div"}"#).unwrap();
        assert_eq!(node.font_size, 1.0);
        assert_eq!(node.flex_grow, 0.0);
        assert_eq!(node.flex_shrink, 1.0);
        assert!(node.children.is_empty());
    }

    #[test]
    fn unknown_node_type_falls_back_to_div() {
        let node = Node::parse(r#"{"type": "blink"}"#).unwrap();
        assert_eq!(node.node_type, NodeType::Div);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let node = Node::parse(r#"{"type": "text", "blinkRate": 3, "id": "x"}"#).unwrap();
        assert_eq!(node.node_type, NodeType::Text);
        assert_eq!(node.id.as_deref(), Some("x"));
    }

    #[test]
    fn unknown_enum_strings_fall_back() {
        assert_eq!(direction_from_str("diagonal"), FlexDirection::Column);
        assert_eq!(wrap_from_str("sometimes"), FlexWrap::NoWrap);
        assert_eq!(justify_from_str("space-evenly"), None);
        assert_eq!(align_items_from_str("stetch"), None);
    }

    #[test]
    fn basis_accepts_integer_strings_only() {
        assert_eq!(basis_from_str(Some("120")), Dimension::Length(120.0));
        assert_eq!(basis_from_str(Some("auto")), Dimension::Auto);
        assert_eq!(basis_from_str(Some("50%")), Dimension::Auto);
        assert_eq!(basis_from_str(Some("-3")), Dimension::Auto);
        assert_eq!(basis_from_str(None), Dimension::Auto);
    }

    #[test]
    fn find_is_depth_first_first_match() {
        let mut root = Node::parse(
            r#"{
                "id": "root",
                "children": [
                    {"id": "a", "children": [{"id": "dup", "type": "text"}]},
                    {"id": "dup", "type": "img"}
                ]
            }"#,
        )
        .unwrap();
        let hit = root.find_mut("dup").unwrap();
        assert_eq!(hit.node_type, NodeType::Text);
    }

    #[test]
    fn binding_unknown_ids_is_silent() {
        let mut root = Node::parse(r#"{"id": "root", "children": [{"id": "title"}]}"#).unwrap();
        let mut slots = HashMap::new();
        slots.insert("title".to_string(), Slot::Text("A".to_string()));
        slots.insert("unknown".to_string(), Slot::Text("Z".to_string()));
        root.bind(slots).unwrap();
        assert!(root.find_mut("title").unwrap().content.is_some());
    }

    #[test]
    fn binding_text_into_img_node_is_rejected() {
        let mut root = Node::parse(r#"{"children": [{"id": "img", "type": "img"}]}"#).unwrap();
        let mut slots = HashMap::new();
        slots.insert("img".to_string(), Slot::Text("nope".to_string()));
        let err = root.bind(slots).unwrap_err();
        assert!(matches!(err, Error::SlotTypeMismatch { .. }));
    }
}
