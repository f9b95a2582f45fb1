use crate::error::FlowError;
use crate::node_types::{ButtonData, ConditionData, MessageData, NodeData, NodeKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub const DOCUMENT_VERSION: u32 = 1;

/// Default edge stroke (WhatsApp green).
pub const DEFAULT_EDGE_COLOR: &str = "#25D366";

pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 2.0;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Pan offset and zoom of the canvas.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Zoom clamped to `[MIN_ZOOM, MAX_ZOOM]`; a zero, negative or
    /// non-finite zoom resets to 1 and a non-finite pan to 0.
    pub fn normalized(self) -> Self {
        let finite_or_zero = |v: f32| if v.is_finite() { v } else { 0.0 };
        let zoom = if self.zoom.is_finite() && self.zoom > 0.0 {
            self.zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            1.0
        };
        Self {
            x: finite_or_zero(self.x),
            y: finite_or_zero(self.y),
            zoom,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireNode", into = "WireNode")]
pub struct FlowNode {
    pub id: String,
    pub position: Position,
    pub data: NodeData,
}

impl FlowNode {
    pub fn new(id: impl Into<String>, position: Position, data: NodeData) -> Self {
        Self {
            id: id.into(),
            position,
            data,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

/// On-disk shape of a node: `data` is keyed by the `type` tag.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct WireNode {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    position: Position,
    #[serde(default)]
    data: Value,
}

impl From<FlowNode> for WireNode {
    fn from(node: FlowNode) -> Self {
        let data = match &node.data {
            NodeData::Start => Value::Object(Default::default()),
            NodeData::Message(m) => serde_json::to_value(m).unwrap_or_default(),
            NodeData::Button(b) => serde_json::to_value(b).unwrap_or_default(),
            NodeData::Condition(c) => serde_json::to_value(c).unwrap_or_default(),
        };
        WireNode {
            id: node.id,
            kind: node.data.kind().tag().to_string(),
            position: node.position,
            data,
        }
    }
}

impl TryFrom<WireNode> for FlowNode {
    type Error = FlowError;

    fn try_from(wire: WireNode) -> Result<Self, Self::Error> {
        let kind = NodeKind::from_tag(&wire.kind).ok_or_else(|| FlowError::UnknownNodeType(wire.kind.clone()))?;
        let raw = match wire.data {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        let invalid = |e: serde_json::Error| FlowError::InvalidNodeData {
            id: wire.id.clone(),
            message: e.to_string(),
        };
        let data = match kind {
            NodeKind::Start => NodeData::Start,
            NodeKind::Message => NodeData::Message(serde_json::from_value::<MessageData>(raw).map_err(invalid)?),
            NodeKind::Button => NodeData::Button(serde_json::from_value::<ButtonData>(raw).map_err(invalid)?),
            NodeKind::Condition => {
                NodeData::Condition(serde_json::from_value::<ConditionData>(raw).map_err(invalid)?)
            }
        };
        Ok(FlowNode {
            id: wire.id,
            position: wire.position,
            data,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f32,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            stroke: DEFAULT_EDGE_COLOR.to_string(),
            stroke_width: 2.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default)]
    pub animated: bool,
    #[serde(default)]
    pub style: EdgeStyle,
}

impl FlowEdge {
    /// Edge with the default connection style.
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
            animated: true,
            style: EdgeStyle::default(),
        }
    }

    pub fn with_source_handle(mut self, handle: impl Into<String>) -> Self {
        self.source_handle = Some(handle.into());
        self
    }
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

/// A complete flow: nodes, edges and the viewport they were saved with.
///
/// Nodes are `Arc`-shared so that snapshots for the undo stack are cheap
/// and an edit only allocates the node it touches.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FlowDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub nodes: Vec<Arc<FlowNode>>,
    #[serde(default)]
    pub edges: Vec<FlowEdge>,
    #[serde(default)]
    pub viewport: Viewport,
}

impl Default for FlowDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            nodes: Vec::new(),
            edges: Vec::new(),
            viewport: Viewport::default(),
        }
    }
}

impl FlowDocument {
    /// The flow a new chatbot starts with: a start node wired to a welcome message.
    pub fn seeded() -> Self {
        let start = FlowNode::new("start", Position::new(250.0, 50.0), NodeData::Start);
        let welcome = FlowNode::new(
            "welcome",
            Position::new(250.0, 150.0),
            NodeData::Message(MessageData {
                content: "Welcome! How can I help you today?".to_string(),
            }),
        );
        Self {
            nodes: vec![Arc::new(start), Arc::new(welcome)],
            edges: vec![FlowEdge::new("e-start-welcome", "start", "welcome")],
            ..Self::default()
        }
    }

    pub fn node(&self, id: &str) -> Option<&Arc<FlowNode>> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index(id).is_some()
    }

    pub fn edge(&self, id: &str) -> Option<&FlowEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a FlowEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == id)
    }

    /// Parse a document, reporting node problems as typed errors rather
    /// than as opaque JSON errors.
    pub fn parse(json: &str) -> Result<Self, FlowError> {
        let wire: WireDocument = serde_json::from_str(json)?;
        let nodes = wire
            .nodes
            .into_iter()
            .map(|n| FlowNode::try_from(n).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            version: wire.version,
            nodes,
            edges: wire.edges,
            viewport: wire.viewport.normalized(),
        })
    }
}

#[derive(Deserialize)]
struct WireDocument {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    nodes: Vec<WireNode>,
    #[serde(default)]
    edges: Vec<FlowEdge>,
    #[serde(default)]
    viewport: Viewport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_types::{Condition, ConditionOperator};
    use serde_json::json;

    #[test]
    fn parse_repairs_unusable_viewport() {
        for (raw, expected) in [
            (json!({ "x": 5, "y": 6, "zoom": 0 }), Viewport { x: 5.0, y: 6.0, zoom: 1.0 }),
            (json!({ "x": 0, "y": 0, "zoom": -2 }), Viewport::default()),
            (json!({ "x": 0, "y": 0, "zoom": 9 }), Viewport { x: 0.0, y: 0.0, zoom: MAX_ZOOM }),
            (json!({ "x": 0, "y": 0, "zoom": 0.01 }), Viewport { x: 0.0, y: 0.0, zoom: MIN_ZOOM }),
        ] {
            let doc = FlowDocument::parse(&json!({ "viewport": raw.clone() }).to_string()).unwrap();
            assert_eq!(doc.viewport, expected, "from {}", raw);
        }
    }

    #[test]
    fn normalized_drops_non_finite_values() {
        let vp = Viewport {
            x: f32::NAN,
            y: f32::INFINITY,
            zoom: f32::NAN,
        }
        .normalized();
        assert_eq!(vp, Viewport::default());
    }

    #[test]
    fn seeded_flow_has_start_and_welcome() {
        let doc = FlowDocument::seeded();
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodes[0].kind(), NodeKind::Start);
        assert_eq!(doc.nodes[1].kind(), NodeKind::Message);
        assert_eq!(doc.edges[0].source, "start");
        assert_eq!(doc.edges[0].target, "welcome");
    }

    #[test]
    fn node_serializes_with_type_tag() {
        let node = FlowNode::new(
            "cond_1",
            Position::new(10.0, 20.0),
            NodeData::Condition(ConditionData {
                condition: Condition {
                    field: "city".into(),
                    operator: ConditionOperator::StartsWith,
                    value: "Ber".into(),
                },
            }),
        );
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "cond_1",
                "type": "condition",
                "position": {"x": 10.0, "y": 20.0},
                "data": {"condition": {"field": "city", "operator": "starts_with", "value": "Ber"}}
            })
        );
    }

    #[test]
    fn start_node_ignores_data() {
        let node: FlowNode = serde_json::from_value(json!({
            "id": "s", "type": "start", "position": {"x": 0, "y": 0}, "data": {"label": "Start"}
        }))
        .unwrap();
        assert_eq!(node.data, NodeData::Start);
    }

    #[test]
    fn missing_data_fields_use_defaults() {
        let node: FlowNode = serde_json::from_value(json!({
            "id": "b", "type": "button", "position": {"x": 1, "y": 2}
        }))
        .unwrap();
        assert_eq!(node.data, NodeData::Button(ButtonData::default()));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = serde_json::from_value::<FlowNode>(json!({
            "id": "m", "type": "media", "position": {"x": 0, "y": 0}, "data": {}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("Unknown node type 'media'"));
    }

    #[test]
    fn edge_omits_absent_handles() {
        let edge = FlowEdge::new("e1", "a", "b");
        let value = serde_json::to_value(&edge).unwrap();
        assert!(value.get("sourceHandle").is_none());
        let tagged = serde_json::to_value(edge.with_source_handle("yes")).unwrap();
        assert_eq!(tagged["sourceHandle"], "yes");
        assert_eq!(tagged["style"]["strokeWidth"], 2.0);
    }
}
