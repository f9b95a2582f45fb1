//! # Flow Store
//!
//! The single owner of the document being edited plus the editor's
//! selection. Every mutation replaces the touched node by id with a new
//! `Arc`, so nodes that were not edited keep their identity across
//! snapshots.
//!
//! Edit-time failures (unknown payload, missing node id, an edit that does
//! not fit the node type) are silent no-ops reported through the return
//! value.

use crate::editor::coordinate_transform::{from_screen, pos2_to_position};
use crate::graph::{FlowDocument, FlowEdge, FlowNode, Position, Viewport};
use crate::node_types::{NodeData, NodeEdit, NodeKind, NodeOrigin};
use egui::Pos2;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct FlowStore {
    document: FlowDocument,
    selected: Option<String>,
}

impl FlowStore {
    pub fn new(document: FlowDocument) -> Self {
        Self {
            document,
            selected: None,
        }
    }

    pub fn seeded() -> Self {
        Self::new(FlowDocument::seeded())
    }

    pub fn document(&self) -> &FlowDocument {
        &self.document
    }

    pub fn nodes(&self) -> &[Arc<FlowNode>] {
        &self.document.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.document.edges
    }

    pub fn node(&self, id: &str) -> Option<&Arc<FlowNode>> {
        self.document.node(id)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.document.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.document.viewport
    }

    /// Replace the whole document (load, new). Clears the selection.
    pub fn replace_document(&mut self, document: FlowDocument) {
        self.document = document;
        self.selected = None;
    }

    /// Restore a snapshot (undo/redo). The current pan and zoom are kept and
    /// the selection survives if its node does.
    pub fn restore(&mut self, document: FlowDocument) {
        let viewport = self.document.viewport;
        self.document = document;
        self.document.viewport = viewport;
        if let Some(id) = &self.selected {
            if !self.document.contains_node(id) {
                self.selected = None;
            }
        }
    }

    // ---- Selection ----

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_node(&self) -> Option<&Arc<FlowNode>> {
        self.selected.as_deref().and_then(|id| self.document.node(id))
    }

    /// Make `id` the sole selected node. Unknown ids leave the selection untouched.
    pub fn select_node(&mut self, id: &str) -> bool {
        if !self.document.contains_node(id) {
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // ---- Nodes ----

    /// Handle a palette drop. `payload` is the node-type tag carried by the drag.
    ///
    /// Returns the id of the new node, or `None` when the payload is missing
    /// or names a type without a renderer.
    pub fn drop_node(&mut self, payload: Option<&str>, pointer: Pos2, canvas_offset: Pos2) -> Option<String> {
        let Some(tag) = payload else {
            log::debug!("Drop without payload ignored");
            return None;
        };
        let kind = match NodeKind::from_tag(tag) {
            Some(kind) if kind != NodeKind::Start => kind,
            _ => {
                log::debug!("Drop of unsupported node type '{}' ignored", tag);
                return None;
            }
        };
        let position = pos2_to_position(from_screen(pointer, &self.document.viewport, canvas_offset));
        Some(self.insert_node(kind, position, NodeOrigin::CanvasDrop))
    }

    /// Add a node without a drop (seeding, palette shortcut).
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> String {
        self.insert_node(kind, position, NodeOrigin::Programmatic)
    }

    fn insert_node(&mut self, kind: NodeKind, position: Position, origin: NodeOrigin) -> String {
        let id = self.generate_node_id(kind);
        let node = FlowNode::new(id.clone(), position, NodeData::default_for(kind, origin));
        log::debug!("Added {} node '{}' at ({}, {})", kind, id, position.x, position.y);
        self.document.nodes.push(Arc::new(node));
        id
    }

    /// `{type}_{unix millis}`, suffixed when two nodes land in the same millisecond.
    fn generate_node_id(&self, kind: NodeKind) -> String {
        let base = format!("{}_{}", kind.tag(), chrono::Utc::now().timestamp_millis());
        let mut candidate = base.clone();
        let mut suffix = 1u32;
        while self.document.contains_node(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        candidate
    }

    /// Apply a config panel edit to the node with `id`.
    pub fn update_node(&mut self, id: &str, edit: &NodeEdit) -> bool {
        self.replace_node(id, |node| node.data.apply(edit))
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> bool {
        self.replace_node(id, |node| {
            node.position = position;
            true
        })
    }

    fn replace_node(&mut self, id: &str, edit: impl FnOnce(&mut FlowNode) -> bool) -> bool {
        let Some(index) = self.document.node_index(id) else {
            log::debug!("Edit for unknown node '{}' ignored", id);
            return false;
        };
        let mut updated = FlowNode::clone(&self.document.nodes[index]);
        if !edit(&mut updated) {
            return false;
        }
        self.document.nodes[index] = Arc::new(updated);
        true
    }

    /// Remove a node together with every edge touching it.
    pub fn delete_node(&mut self, id: &str) -> bool {
        let Some(index) = self.document.node_index(id) else {
            return false;
        };
        self.document.nodes.remove(index);
        let before = self.document.edges.len();
        self.document.edges.retain(|e| e.source != id && e.target != id);
        log::debug!(
            "Deleted node '{}' and {} edge(s)",
            id,
            before - self.document.edges.len()
        );
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        true
    }

    // ---- Edges ----

    /// Append an edge drawn between two handles. Endpoints are not validated.
    pub fn connect(
        &mut self,
        source: &str,
        source_handle: Option<&str>,
        target: &str,
        target_handle: Option<&str>,
    ) -> String {
        let id = format!("e-{}-{}-{}", source, target, Uuid::new_v4().simple());
        let mut edge = FlowEdge::new(id.clone(), source, target);
        edge.source_handle = source_handle.map(str::to_string);
        edge.target_handle = target_handle.map(str::to_string);
        log::debug!("Connected '{}' -> '{}'", source, target);
        self.document.edges.push(edge);
        id
    }

    pub fn delete_edge(&mut self, id: &str) -> bool {
        let before = self.document.edges.len();
        self.document.edges.retain(|e| e.id != id);
        before != self.document.edges.len()
    }
}
