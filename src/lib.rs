//! Visual builder for WhatsApp chatbot flows.
//!
//! A flow is a graph of typed nodes (start, message, button, condition)
//! joined by directed edges. The [`store::FlowStore`] owns the document and
//! the selection, the [`editor`] canvas and [`config_panel`] turn UI events
//! into store operations, and [`persistence`] reads and writes the JSON
//! document.

pub mod config_panel;
pub mod editor;
pub mod error;
pub mod graph;
pub mod history;
pub mod node_types;
pub mod notifications;
pub mod palette;
pub mod persistence;
pub mod settings;
pub mod store;
pub mod validation;

pub mod prelude {
    pub use crate::error::FlowError;
    pub use crate::graph::{EdgeStyle, FlowDocument, FlowEdge, FlowNode, Position, Viewport};
    pub use crate::history::UndoStack;
    pub use crate::node_types::{
        ButtonData, Condition, ConditionData, ConditionOperator, MessageData, NodeData, NodeEdit, NodeKind,
        NodeOrigin,
    };
    pub use crate::store::FlowStore;
    pub use crate::validation::{check_flow, FlowIssue, Severity};
}
