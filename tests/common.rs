//! Shared builders for flow documents used across the integration tests.
use chatflow_builder::prelude::*;
use std::sync::Arc;

#[allow(dead_code)]
pub fn message(id: &str, content: &str, x: f32, y: f32) -> Arc<FlowNode> {
    Arc::new(FlowNode::new(
        id,
        Position::new(x, y),
        NodeData::Message(MessageData {
            content: content.to_string(),
        }),
    ))
}

#[allow(dead_code)]
pub fn button(id: &str, content: &str, options: &[&str]) -> Arc<FlowNode> {
    Arc::new(FlowNode::new(
        id,
        Position::default(),
        NodeData::Button(ButtonData {
            content: content.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }),
    ))
}

#[allow(dead_code)]
pub fn start(id: &str) -> Arc<FlowNode> {
    Arc::new(FlowNode::new(id, Position::default(), NodeData::Start))
}

/// start -> ask (button) -> {yes, no} via a condition on the reply.
///
/// Every node is reachable and there is no cycle.
#[allow(dead_code)]
pub fn create_branching_flow() -> FlowDocument {
    let check = Arc::new(FlowNode::new(
        "check",
        Position::new(250.0, 350.0),
        NodeData::Condition(ConditionData {
            condition: Condition {
                field: "last_message".to_string(),
                operator: ConditionOperator::Equals,
                value: "Yes".to_string(),
            },
        }),
    ));
    FlowDocument {
        nodes: vec![
            start("start"),
            button("ask", "Do you want a quote?", &["Yes", "No"]),
            check,
            message("yes", "Great, sending it now.", 100.0, 450.0),
            message("no", "No problem!", 400.0, 450.0),
        ],
        edges: vec![
            FlowEdge::new("e1", "start", "ask"),
            FlowEdge::new("e2", "ask", "check"),
            FlowEdge::new("e3", "check", "yes").with_source_handle("yes"),
            FlowEdge::new("e4", "check", "no").with_source_handle("no"),
        ],
        ..FlowDocument::default()
    }
}

#[allow(dead_code)]
pub fn options_of(store: &FlowStore, id: &str) -> Vec<String> {
    match store.node(id).map(|n| &n.data) {
        Some(NodeData::Button(b)) => b.options.clone(),
        other => panic!("node {} is not a button: {:?}", id, other),
    }
}
