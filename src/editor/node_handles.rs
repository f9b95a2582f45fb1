//! Node geometry and connection handles.
//!
//! All positions here are in canvas space. The canvas converts them with
//! [`super::coordinate_transform`] before painting.
//!
//! # Handles
//! - every node except `start` has one target handle on its left edge
//! - `condition` has two source handles, `yes` and `no`, on its right edge
//! - every other node has a single unnamed source handle on its right edge

use crate::graph::{FlowDocument, FlowNode};
use crate::node_types::{NodeData, NodeKind};
use egui::{Pos2, Rect, Vec2};

pub const NODE_WIDTH: f32 = 200.0;
pub const HEADER_HEIGHT: f32 = 28.0;
pub const LINE_HEIGHT: f32 = 22.0;
pub const HANDLE_RADIUS: f32 = 6.0;

/// A handle picked on the canvas: node id plus the named handle, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandleRef {
    pub node_id: String,
    pub handle: Option<&'static str>,
}

pub fn node_size(node: &FlowNode) -> Vec2 {
    match &node.data {
        NodeData::Start => Vec2::new(120.0, HEADER_HEIGHT + 12.0),
        NodeData::Message(_) => Vec2::new(NODE_WIDTH, HEADER_HEIGHT + LINE_HEIGHT * 2.0),
        NodeData::Button(b) => Vec2::new(
            NODE_WIDTH,
            HEADER_HEIGHT + LINE_HEIGHT * (1 + b.options.len()) as f32 + 8.0,
        ),
        NodeData::Condition(_) => Vec2::new(NODE_WIDTH, HEADER_HEIGHT + LINE_HEIGHT * 2.0 + 8.0),
    }
}

pub fn node_rect(node: &FlowNode) -> Rect {
    Rect::from_min_size(Pos2::new(node.position.x, node.position.y), node_size(node))
}

pub fn target_handle_pos(node: &FlowNode) -> Option<Pos2> {
    if !node.kind().has_target_handle() {
        return None;
    }
    let rect = node_rect(node);
    Some(Pos2::new(rect.left(), rect.center().y))
}

/// Position of a source handle. Unknown handle names fall back to the first handle.
pub fn source_handle_pos(node: &FlowNode, handle: Option<&str>) -> Pos2 {
    let rect = node_rect(node);
    let handles = node.kind().source_handles();
    let index = handles.iter().position(|h| *h == handle).unwrap_or(0);
    let slot = rect.height() / (handles.len() + 1) as f32;
    Pos2::new(rect.right(), rect.top() + slot * (index + 1) as f32)
}

/// Topmost node under `pos` (later nodes are drawn on top).
pub fn hit_node<'a>(doc: &'a FlowDocument, pos: Pos2) -> Option<&'a FlowNode> {
    doc.nodes
        .iter()
        .rev()
        .map(|n| &**n)
        .find(|n| node_rect(n).contains(pos))
}

pub fn hit_source_handle(doc: &FlowDocument, pos: Pos2, radius: f32) -> Option<HandleRef> {
    doc.nodes.iter().rev().find_map(|node| {
        node.kind()
            .source_handles()
            .iter()
            .find(|h| source_handle_pos(node, **h).distance(pos) <= radius)
            .map(|h| HandleRef {
                node_id: node.id.clone(),
                handle: *h,
            })
    })
}

/// Target handle under `pos`. The whole body of a node that accepts
/// connections counts, so drops do not need pixel precision.
pub fn hit_target(doc: &FlowDocument, pos: Pos2, radius: f32) -> Option<String> {
    doc.nodes
        .iter()
        .rev()
        .filter(|n| n.kind().has_target_handle())
        .find(|n| {
            target_handle_pos(n).is_some_and(|p| p.distance(pos) <= radius) || node_rect(n).contains(pos)
        })
        .map(|n| n.id.clone())
}

pub fn handle_label(kind: NodeKind, handle: Option<&str>) -> Option<&'static str> {
    match (kind, handle) {
        (NodeKind::Condition, Some("yes")) => Some("Yes"),
        (NodeKind::Condition, Some("no")) => Some("No"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Position;
    use crate::node_types::{ConditionData, NodeOrigin};
    use std::sync::Arc;

    fn condition_at(id: &str, x: f32, y: f32) -> FlowNode {
        FlowNode::new(id, Position::new(x, y), NodeData::Condition(ConditionData::default()))
    }

    #[test]
    fn condition_has_two_stacked_source_handles() {
        let node = condition_at("c", 0.0, 0.0);
        let yes = source_handle_pos(&node, Some("yes"));
        let no = source_handle_pos(&node, Some("no"));
        assert_eq!(yes.x, NODE_WIDTH);
        assert!(yes.y < no.y);
    }

    #[test]
    fn start_has_no_target_handle() {
        let doc = FlowDocument::seeded();
        assert!(target_handle_pos(&doc.nodes[0]).is_none());
        assert!(target_handle_pos(&doc.nodes[1]).is_some());
    }

    #[test]
    fn button_grows_with_options() {
        let mut a = FlowNode::new(
            "b",
            Position::default(),
            NodeData::default_for(NodeKind::Button, NodeOrigin::CanvasDrop),
        );
        let small = node_size(&a).y;
        if let NodeData::Button(b) = &mut a.data {
            b.options.push("Third".into());
        }
        assert_eq!(node_size(&a).y, small + LINE_HEIGHT);
    }

    #[test]
    fn hits_prefer_topmost_node() {
        let mut doc = FlowDocument::default();
        doc.nodes.push(Arc::new(condition_at("below", 0.0, 0.0)));
        doc.nodes.push(Arc::new(condition_at("above", 10.0, 10.0)));
        assert_eq!(hit_node(&doc, Pos2::new(20.0, 20.0)).map(|n| n.id.as_str()), Some("above"));
        assert_eq!(hit_node(&doc, Pos2::new(5.0, 5.0)).map(|n| n.id.as_str()), Some("below"));
        assert!(hit_node(&doc, Pos2::new(-5.0, -5.0)).is_none());
    }

    #[test]
    fn source_handle_hit_reports_branch() {
        let mut doc = FlowDocument::default();
        let node = condition_at("c", 0.0, 0.0);
        let no = source_handle_pos(&node, Some("no"));
        doc.nodes.push(Arc::new(node));
        let hit = hit_source_handle(&doc, no + Vec2::new(2.0, 0.0), HANDLE_RADIUS).unwrap();
        assert_eq!(hit, HandleRef { node_id: "c".into(), handle: Some("no") });
    }

    #[test]
    fn target_hit_skips_start() {
        let doc = FlowDocument::seeded();
        let start_center = node_rect(&doc.nodes[0]).center();
        assert!(hit_target(&doc, start_center, HANDLE_RADIUS).is_none());
        let welcome_center = node_rect(&doc.nodes[1]).center();
        assert_eq!(hit_target(&doc, welcome_center, HANDLE_RADIUS).as_deref(), Some("welcome"));
    }
}
