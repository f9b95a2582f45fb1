//! # Flow Editor
//!
//! The canvas of the chatbot builder: paints nodes and edges, turns pointer
//! input into store operations and accepts node-type drops from the palette.
//!
//! ## Submodules
//! - [`coordinate_transform`]: canvas/screen conversions, zoom, grid snap
//! - [`node_handles`]: node geometry, handles and hit testing
//! - [`connection_renderer`]: bezier edges and dashed previews
//! - [`style`]: colors and font size
//!
//! ## Interaction
//! - drag a palette entry onto the canvas to add a node
//! - drag a node body to move it
//! - drag from a right-hand handle onto another node to connect
//! - click a node to select it, click the background to clear the selection
//! - middle drag, Alt + drag or drag on the background to pan, scroll to zoom
//! - right click an edge to delete it, Delete removes the selected node

pub mod connection_renderer;
pub mod coordinate_transform;
pub mod node_handles;
pub mod style;

pub use style::EditorStyle;

use crate::graph::{FlowNode, Viewport};
use crate::node_types::{NodeData, NodeKind};
use crate::palette::PaletteDrag;
use crate::store::FlowStore;
use coordinate_transform::{from_screen, pos2_to_position, position_to_pos2, snap, to_screen, zoom_around};
use egui::{Align2, Color32, CornerRadius, FontId, PointerButton, Pos2, Rect, Sense, Stroke, StrokeKind, Vec2};
use node_handles::{
    handle_label, hit_node, hit_source_handle, hit_target, node_rect, source_handle_pos, target_handle_pos,
    HandleRef, HANDLE_RADIUS, HEADER_HEIGHT, LINE_HEIGHT,
};

/// Characters of message text shown on a node before it is cut off.
const PREVIEW_CHARS: usize = 28;

/// What happened on the canvas this frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorResponse {
    /// A mutation that deserves an undo snapshot was committed.
    pub changed: bool,
    pub dropped: Option<String>,
    pub connected: Option<String>,
    pub deleted: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
enum DragState {
    #[default]
    Idle,
    Pan,
    Node { id: String, grab_offset: Vec2 },
    Connection(HandleRef),
}

pub struct FlowEditor {
    pub style: EditorStyle,
    pub snap_to_grid: bool,
    pub grid_size: f32,
    drag: DragState,
    last_canvas_size: Vec2,
}

impl Default for FlowEditor {
    fn default() -> Self {
        Self {
            style: EditorStyle::default(),
            snap_to_grid: false,
            grid_size: 20.0,
            drag: DragState::Idle,
            last_canvas_size: Vec2::new(1000.0, 700.0),
        }
    }
}

impl FlowEditor {
    pub fn show(&mut self, ui: &mut egui::Ui, store: &mut FlowStore) -> EditorResponse {
        let mut out = EditorResponse::default();
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let canvas_rect = response.rect;
        let origin = canvas_rect.min;
        self.last_canvas_size = canvas_rect.size();

        // Zoom around the pointer: pinch / ctrl+scroll first, plain wheel otherwise
        if response.hovered() {
            let (zoom_delta, scroll) = ui.input(|i| (i.zoom_delta(), i.raw_scroll_delta.y));
            let factor = if zoom_delta != 1.0 {
                zoom_delta
            } else {
                1.0 + scroll * 0.002
            };
            if factor != 1.0 {
                if let Some(anchor) = response.hover_pos() {
                    zoom_around(store.viewport_mut(), factor, anchor, origin);
                }
            }
        }

        let pointer_screen = response.interact_pointer_pos().or_else(|| ui.ctx().pointer_latest_pos());
        let viewport = *store.viewport();
        let pointer_canvas = pointer_screen.map(|p| from_screen(p, &viewport, origin));

        if response.drag_started() {
            // What was grabbed is decided where the button went down, not where
            // the pointer is once the drag threshold is crossed.
            let press_canvas = ui
                .input(|i| i.pointer.press_origin())
                .map(|p| from_screen(p, &viewport, origin))
                .or(pointer_canvas);
            self.begin_drag(ui, &response, store, press_canvas);
        }

        if response.dragged() {
            match &self.drag {
                DragState::Pan => {
                    let delta = response.drag_delta();
                    let vp = store.viewport_mut();
                    vp.x += delta.x;
                    vp.y += delta.y;
                }
                DragState::Node { id, grab_offset } => {
                    if let Some(pc) = pointer_canvas {
                        let mut target = pc + *grab_offset;
                        if self.snap_to_grid {
                            target = snap(target, self.grid_size);
                        }
                        store.move_node(id, pos2_to_position(target));
                    }
                }
                DragState::Connection(_) | DragState::Idle => {}
            }
        }

        if response.drag_stopped() {
            match std::mem::take(&mut self.drag) {
                DragState::Node { id, .. } => {
                    log::debug!("Moved node '{}'", id);
                    out.changed = true;
                }
                DragState::Connection(from) => {
                    let target = pointer_canvas.and_then(|pc| hit_target(store.document(), pc, HANDLE_RADIUS * 2.0));
                    match target {
                        Some(target) if target != from.node_id => {
                            let id = store.connect(&from.node_id, from.handle, &target, None);
                            out.connected = Some(id);
                            out.changed = true;
                        }
                        _ => log::debug!("Connection from '{}' dropped on nothing", from.node_id),
                    }
                }
                DragState::Pan | DragState::Idle => {}
            }
        }

        if response.clicked() {
            let hit = pointer_canvas.and_then(|pc| hit_node(store.document(), pc).map(|n| n.id.clone()));
            match hit {
                Some(id) => {
                    store.select_node(&id);
                }
                None => store.clear_selection(),
            }
        }

        if response.secondary_clicked() {
            if let Some(pointer) = pointer_screen {
                if let Some(edge_id) = self.hit_edge(store, pointer, origin) {
                    store.delete_edge(&edge_id);
                    out.changed = true;
                }
            }
        }

        let delete_pressed = ui.input(|i| i.key_pressed(egui::Key::Delete)) && !ui.ctx().wants_keyboard_input();
        if delete_pressed {
            if let Some(id) = store.selected_id().map(str::to_string) {
                if store.delete_node(&id) {
                    out.deleted = Some(id);
                    out.changed = true;
                }
            }
        }

        if let Some(payload) = response.dnd_release_payload::<PaletteDrag>() {
            if let Some(pointer) = ui.ctx().pointer_latest_pos() {
                if let Some(id) = store.drop_node(Some(payload.tag()), pointer, origin) {
                    store.select_node(&id);
                    out.dropped = Some(id);
                    out.changed = true;
                }
            }
        }

        // --- Painting ---
        painter.rect_filled(canvas_rect, 0.0, Color32::from_gray(28));
        let viewport = *store.viewport();
        self.draw_grid(&painter, canvas_rect, &viewport);
        self.draw_edges(&painter, store, origin);

        if let (DragState::Connection(from), Some(pointer)) = (&self.drag, pointer_screen) {
            if let Some(node) = store.node(&from.node_id) {
                let start = to_screen(source_handle_pos(node, from.handle), &viewport, origin);
                connection_renderer::draw_dashed_line(
                    &painter,
                    start,
                    pointer,
                    8.0,
                    5.0,
                    Stroke::new(2.0, self.style.edge_color),
                );
            }
        }

        for node in store.nodes() {
            let selected = store.selected_id() == Some(node.id.as_str());
            self.draw_node(&painter, node, selected, &viewport, origin);
        }

        if response.dnd_hover_payload::<PaletteDrag>().is_some() {
            painter.rect_stroke(
                canvas_rect.shrink(1.0),
                0.0,
                Stroke::new(2.0, self.style.edge_color),
                StrokeKind::Inside,
            );
        }

        out
    }

    fn begin_drag(&mut self, ui: &egui::Ui, response: &egui::Response, store: &mut FlowStore, pointer: Option<Pos2>) {
        let alt = ui.input(|i| i.modifiers.alt);
        if response.drag_started_by(PointerButton::Middle) || alt {
            self.drag = DragState::Pan;
            return;
        }
        let Some(pc) = pointer else {
            return;
        };
        let handle_radius = HANDLE_RADIUS * 1.5;
        if let Some(handle) = hit_source_handle(store.document(), pc, handle_radius) {
            self.drag = DragState::Connection(handle);
            return;
        }
        let grabbed = hit_node(store.document(), pc).map(|n| (n.id.clone(), position_to_pos2(n.position) - pc));
        self.drag = match grabbed {
            Some((id, grab_offset)) => {
                store.select_node(&id);
                DragState::Node { id, grab_offset }
            }
            None => DragState::Pan,
        };
    }

    /// Move the view so that every node fits, at 100% zoom.
    pub fn center_view(&self, store: &mut FlowStore) {
        let bounds = store
            .nodes()
            .iter()
            .map(|n| node_rect(n))
            .reduce(|a, b| a.union(b));
        let vp = store.viewport_mut();
        vp.zoom = 1.0;
        match bounds {
            Some(bounds) => {
                let pan = self.last_canvas_size / 2.0 - bounds.center().to_vec2();
                vp.x = pan.x;
                vp.y = pan.y;
            }
            None => {
                vp.x = 0.0;
                vp.y = 0.0;
            }
        }
    }

    /// Programmatic add from the palette: the node lands at the view center
    /// and becomes the selection.
    pub fn add_at_view_center(&self, store: &mut FlowStore, kind: NodeKind) -> String {
        let center = self.view_center(store.viewport());
        let id = store.add_node(kind, pos2_to_position(center));
        store.select_node(&id);
        id
    }

    /// Canvas position currently at the middle of the view.
    pub fn view_center(&self, viewport: &Viewport) -> Pos2 {
        from_screen((self.last_canvas_size / 2.0).to_pos2(), viewport, Pos2::ZERO)
    }

    fn hit_edge(&self, store: &FlowStore, pointer: Pos2, origin: Pos2) -> Option<String> {
        let viewport = store.viewport();
        store.edges().iter().rev().find_map(|edge| {
            let (p1, p2) = edge_endpoints(store, edge, viewport, origin)?;
            connection_renderer::hit_test_bezier(pointer, p1, p2, 8.0).then(|| edge.id.clone())
        })
    }

    fn draw_grid(&self, painter: &egui::Painter, rect: Rect, viewport: &Viewport) {
        let step = self.grid_size.max(5.0) * 2.0 * viewport.zoom;
        if step < 8.0 {
            return;
        }
        let color = Stroke::new(1.0, Color32::from_gray(36));
        let mut x = rect.left() + viewport.x.rem_euclid(step);
        while x < rect.right() {
            painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], color);
            x += step;
        }
        let mut y = rect.top() + viewport.y.rem_euclid(step);
        while y < rect.bottom() {
            painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], color);
            y += step;
        }
    }

    fn draw_edges(&self, painter: &egui::Painter, store: &FlowStore, origin: Pos2) {
        let viewport = store.viewport();
        for edge in store.edges() {
            let Some((p1, p2)) = edge_endpoints(store, edge, viewport, origin) else {
                continue;
            };
            let stroke_color = style::parse_hex_color(&edge.style.stroke).unwrap_or(self.style.edge_color);
            let (c1, c2) = match (
                self.style.use_gradient_connections,
                store.node(&edge.source),
                store.node(&edge.target),
            ) {
                (true, Some(src), Some(tgt)) => (
                    self.style.header_color(src.kind()),
                    self.style.header_color(tgt.kind()),
                ),
                _ => (stroke_color, stroke_color),
            };
            connection_renderer::draw_bezier(painter, p1, p2, c1, c2, edge.style.stroke_width * viewport.zoom);
        }
    }

    fn draw_node(&self, painter: &egui::Painter, node: &FlowNode, selected: bool, viewport: &Viewport, origin: Pos2) {
        let zoom = viewport.zoom;
        let rect = node_rect(node);
        let min = to_screen(rect.min, viewport, origin);
        let screen_rect = Rect::from_min_size(min, rect.size() * zoom);
        let radius = (6.0 * zoom).clamp(0.0, 255.0) as u8;
        let header_color = self.style.header_color(node.kind());

        painter.rect_filled(screen_rect, CornerRadius::same(radius), Color32::from_gray(48));
        let header_rect = Rect::from_min_size(min, Vec2::new(screen_rect.width(), HEADER_HEIGHT * zoom));
        painter.rect_filled(
            header_rect,
            CornerRadius {
                nw: radius,
                ne: radius,
                sw: 0,
                se: 0,
            },
            header_color,
        );
        painter.text(
            header_rect.left_center() + Vec2::new(8.0 * zoom, 0.0),
            Align2::LEFT_CENTER,
            node.kind().display_name(),
            FontId::proportional(self.style.font_size * zoom),
            Color32::WHITE,
        );

        let body_font = FontId::proportional((self.style.font_size - 2.0).max(6.0) * zoom);
        for (i, line) in body_lines(&node.data).into_iter().enumerate() {
            let y = header_rect.bottom() + (LINE_HEIGHT * (i as f32 + 0.5)) * zoom + 2.0 * zoom;
            painter.text(
                Pos2::new(screen_rect.left() + 10.0 * zoom, y),
                Align2::LEFT_CENTER,
                line,
                body_font.clone(),
                Color32::from_gray(220),
            );
        }

        let (stroke_width, stroke_color) = if selected {
            (2.0, self.style.selected_color)
        } else {
            (1.0, Color32::from_gray(80))
        };
        painter.rect_stroke(
            screen_rect,
            CornerRadius::same(radius),
            Stroke::new(stroke_width, stroke_color),
            StrokeKind::Outside,
        );

        // Handles
        let handle_radius = HANDLE_RADIUS * zoom;
        if let Some(target) = target_handle_pos(node) {
            painter.circle_filled(to_screen(target, viewport, origin), handle_radius, Color32::from_gray(200));
        }
        for handle in node.kind().source_handles() {
            let pos = to_screen(source_handle_pos(node, *handle), viewport, origin);
            painter.circle_filled(pos, handle_radius, header_color);
            if let Some(label) = handle_label(node.kind(), *handle) {
                painter.text(
                    pos - Vec2::new(handle_radius + 4.0 * zoom, 0.0),
                    Align2::RIGHT_CENTER,
                    label,
                    FontId::proportional(11.0 * zoom),
                    Color32::from_gray(200),
                );
            }
        }
    }
}

/// Screen positions of an edge's two ends. `None` if either node is missing.
fn edge_endpoints(
    store: &FlowStore,
    edge: &crate::graph::FlowEdge,
    viewport: &Viewport,
    origin: Pos2,
) -> Option<(Pos2, Pos2)> {
    let source = store.node(&edge.source)?;
    let target = store.node(&edge.target)?;
    let p1 = source_handle_pos(source, edge.source_handle.as_deref());
    let p2 = target_handle_pos(target).unwrap_or_else(|| node_rect(target).left_center());
    Some((to_screen(p1, viewport, origin), to_screen(p2, viewport, origin)))
}

/// Text lines painted in a node's body.
pub fn body_lines(data: &NodeData) -> Vec<String> {
    match data {
        NodeData::Start => vec!["Conversation starts".to_string()],
        NodeData::Message(m) => vec![preview_or(&m.content, "(empty message)")],
        NodeData::Button(b) => {
            let mut lines = vec![preview_or(&b.content, "(no text)")];
            lines.extend(b.options.iter().map(|o| format!("[ {} ]", preview(o, PREVIEW_CHARS - 4))));
            lines
        }
        NodeData::Condition(c) => {
            let field = if c.condition.field.is_empty() {
                "?"
            } else {
                c.condition.field.as_str()
            };
            vec![
                format!("if {} {}", preview(field, 16), c.condition.operator.label()),
                format!("\"{}\"", preview(&c.condition.value, PREVIEW_CHARS - 2)),
            ]
        }
    }
}

/// First line of `text`, cut to `max_chars` with an ellipsis.
pub fn preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or("");
    if first_line.chars().count() <= max_chars && !text.contains('\n') {
        return first_line.to_string();
    }
    let cut: String = first_line.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut)
}

fn preview_or(text: &str, empty: &str) -> String {
    if text.trim().is_empty() {
        empty.to_string()
    } else {
        preview(text, PREVIEW_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_types::{ButtonData, Condition, ConditionData, ConditionOperator, MessageData};

    #[test]
    fn preview_cuts_long_and_multiline_text() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("abcdefghijkl", 5), "abcd…");
        assert_eq!(preview("one\ntwo", 10), "one…");
    }

    #[test]
    fn body_lines_per_type() {
        assert_eq!(
            body_lines(&NodeData::Message(MessageData::default())),
            vec!["(empty message)"]
        );
        let button = NodeData::Button(ButtonData {
            content: "Choose".into(),
            options: vec!["Yes".into(), "No".into()],
        });
        assert_eq!(body_lines(&button), vec!["Choose", "[ Yes ]", "[ No ]"]);
        let condition = NodeData::Condition(ConditionData {
            condition: Condition {
                field: "city".into(),
                operator: ConditionOperator::Contains,
                value: "York".into(),
            },
        });
        assert_eq!(body_lines(&condition), vec!["if city contains", "\"York\""]);
    }

    #[test]
    fn center_view_puts_nodes_in_the_middle() {
        let editor = FlowEditor::default();
        let mut store = FlowStore::seeded();
        editor.center_view(&mut store);
        let center = editor.view_center(store.viewport());
        let bounds = store
            .nodes()
            .iter()
            .map(|n| node_rect(n))
            .reduce(|a, b| a.union(b))
            .unwrap();
        assert!((center - bounds.center()).length() < 1e-3);
    }

    #[test]
    fn idle_frame_changes_nothing() {
        let ctx = egui::Context::default();
        let mut editor = FlowEditor::default();
        let mut store = FlowStore::seeded();
        let before = store.document().clone();
        let mut result = EditorResponse::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                result = editor.show(ui, &mut store);
            });
        });
        assert_eq!(result, EditorResponse::default());
        assert_eq!(store.document(), &before);
    }

    /// Drives the canvas headlessly on a 1000x700 screen with no panel margin,
    /// so screen and canvas coordinates coincide at the default viewport.
    struct Canvas {
        ctx: egui::Context,
        editor: FlowEditor,
        store: FlowStore,
        time: f64,
    }

    impl Canvas {
        fn new(store: FlowStore) -> Self {
            let mut canvas = Self {
                ctx: egui::Context::default(),
                editor: FlowEditor::default(),
                store,
                time: 0.0,
            };
            canvas.frame(Vec::new());
            canvas
        }

        fn frame(&mut self, events: Vec<egui::Event>) -> EditorResponse {
            self.time += 1.0 / 60.0;
            let input = egui::RawInput {
                screen_rect: Some(Rect::from_min_size(Pos2::ZERO, Vec2::new(1000.0, 700.0))),
                time: Some(self.time),
                events,
                ..Default::default()
            };
            let mut result = EditorResponse::default();
            let (editor, store) = (&mut self.editor, &mut self.store);
            let _ = self.ctx.run(input, |ctx| {
                egui::CentralPanel::default().frame(egui::Frame::NONE).show(ctx, |ui| {
                    result = editor.show(ui, store);
                });
            });
            result
        }

        fn button(pos: Pos2, pressed: bool) -> egui::Event {
            egui::Event::PointerButton {
                pos,
                button: PointerButton::Primary,
                pressed,
                modifiers: egui::Modifiers::NONE,
            }
        }

        fn click(&mut self, pos: Pos2) -> EditorResponse {
            self.frame(vec![egui::Event::PointerMoved(pos)]);
            self.frame(vec![Self::button(pos, true)]);
            self.frame(vec![Self::button(pos, false)])
        }

        fn drag(&mut self, from: Pos2, to: Pos2) -> EditorResponse {
            self.frame(vec![egui::Event::PointerMoved(from)]);
            self.frame(vec![Self::button(from, true)]);
            self.frame(vec![egui::Event::PointerMoved(to)]);
            self.frame(vec![Self::button(to, false)])
        }
    }

    fn center_of(store: &FlowStore, id: &str) -> Pos2 {
        node_rect(store.node(id).unwrap()).center()
    }

    #[test]
    fn clicking_selects_node_and_background_clears() {
        let mut canvas = Canvas::new(FlowStore::seeded());
        let welcome = center_of(&canvas.store, "welcome");

        canvas.click(welcome);
        assert_eq!(canvas.store.selected_id(), Some("welcome"));

        canvas.click(Pos2::new(800.0, 600.0));
        assert!(canvas.store.selected_id().is_none());
    }

    #[test]
    fn dragging_from_a_handle_connects_to_another_node() {
        let mut canvas = Canvas::new(FlowStore::seeded());
        let from = source_handle_pos(canvas.store.node("start").unwrap(), None);
        let to = center_of(&canvas.store, "welcome");

        let response = canvas.drag(from, to);
        assert!(response.changed);
        let id = response.connected.unwrap();
        let edge = canvas.store.document().edge(&id).unwrap();
        assert_eq!((edge.source.as_str(), edge.target.as_str()), ("start", "welcome"));
        assert_eq!(canvas.store.edges().len(), 2);
    }

    #[test]
    fn dropping_a_connection_on_its_own_node_adds_nothing() {
        let mut canvas = Canvas::new(FlowStore::seeded());
        let before = canvas.store.document().clone();
        let from = source_handle_pos(canvas.store.node("welcome").unwrap(), None);
        let to = center_of(&canvas.store, "welcome");

        let response = canvas.drag(from, to);
        assert!(response.connected.is_none());
        assert!(!response.changed);
        assert_eq!(canvas.store.document(), &before);
    }

    #[test]
    fn dragging_a_node_body_moves_it() {
        let mut canvas = Canvas::new(FlowStore::seeded());
        let grab = center_of(&canvas.store, "welcome");

        let response = canvas.drag(grab, grab + Vec2::new(40.0, 30.0));
        assert!(response.changed);
        let moved = canvas.store.node("welcome").unwrap().position;
        assert_eq!((moved.x, moved.y), (290.0, 180.0));
        assert_eq!(canvas.store.selected_id(), Some("welcome"));
    }

    #[test]
    fn delete_key_removes_selected_node() {
        let mut canvas = Canvas::new(FlowStore::seeded());
        canvas.store.select_node("welcome");

        let response = canvas.frame(vec![egui::Event::Key {
            key: egui::Key::Delete,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }]);
        assert_eq!(response.deleted.as_deref(), Some("welcome"));
        assert!(response.changed);
        assert!(canvas.store.node("welcome").is_none());
        assert!(canvas.store.edges().is_empty());
    }

    #[test]
    fn add_at_view_center_uses_programmatic_defaults() {
        let editor = FlowEditor::default();
        let mut store = FlowStore::seeded();
        let id = editor.add_at_view_center(&mut store, NodeKind::Button);
        let node = store.node(&id).unwrap();
        assert_eq!(position_to_pos2(node.position), editor.view_center(store.viewport()));
        assert_eq!(store.selected_id(), Some(id.as_str()));
        match &node.data {
            NodeData::Button(b) => assert_eq!(b.options, vec!["Yes", "No"]),
            other => panic!("unexpected data {:?}", other),
        }
    }
}
