use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of options the config panel lets a button node carry.
/// The data layer does not enforce it.
pub const MAX_BUTTON_OPTIONS: usize = 3;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Start,
    Message,
    Button,
    Condition,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Start,
        NodeKind::Message,
        NodeKind::Button,
        NodeKind::Condition,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Message => "message",
            NodeKind::Button => "button",
            NodeKind::Condition => "condition",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            NodeKind::Start => "Start",
            NodeKind::Message => "Message",
            NodeKind::Button => "Buttons",
            NodeKind::Condition => "Condition",
        }
    }

    /// Named source handles. `None` is the single unnamed output.
    pub fn source_handles(&self) -> &'static [Option<&'static str>] {
        match self {
            NodeKind::Condition => &[Some("yes"), Some("no")],
            _ => &[None],
        }
    }

    pub fn has_target_handle(&self) -> bool {
        !matches!(self, NodeKind::Start)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    #[default]
    Equals,
    Contains,
    StartsWith,
}

impl ConditionOperator {
    pub const ALL: [ConditionOperator; 3] = [
        ConditionOperator::Equals,
        ConditionOperator::Contains,
        ConditionOperator::StartsWith,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::StartsWith => "starts with",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MessageData {
    #[serde(default)]
    pub content: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ButtonData {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ConditionData {
    #[serde(default)]
    pub condition: Condition,
}

/// Where a node came from. Button defaults differ between the two paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeOrigin {
    CanvasDrop,
    Programmatic,
}

/// Per-type node payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    Start,
    Message(MessageData),
    Button(ButtonData),
    Condition(ConditionData),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Start => NodeKind::Start,
            NodeData::Message(_) => NodeKind::Message,
            NodeData::Button(_) => NodeKind::Button,
            NodeData::Condition(_) => NodeKind::Condition,
        }
    }

    pub fn default_for(kind: NodeKind, origin: NodeOrigin) -> Self {
        match kind {
            NodeKind::Start => NodeData::Start,
            NodeKind::Message => NodeData::Message(MessageData::default()),
            NodeKind::Button => {
                let options = match origin {
                    NodeOrigin::CanvasDrop => vec!["Button 1".to_string(), "Button 2".to_string()],
                    NodeOrigin::Programmatic => vec!["Yes".to_string(), "No".to_string()],
                };
                NodeData::Button(ButtonData {
                    content: String::new(),
                    options,
                })
            }
            NodeKind::Condition => NodeData::Condition(ConditionData::default()),
        }
    }

    /// Text body for message and button nodes.
    pub fn content(&self) -> Option<&str> {
        match self {
            NodeData::Message(m) => Some(&m.content),
            NodeData::Button(b) => Some(&b.content),
            _ => None,
        }
    }

    /// Applies an edit in place. Returns `false` when the edit does not fit
    /// this node type or refers to an option that does not exist.
    pub fn apply(&mut self, edit: &NodeEdit) -> bool {
        match (self, edit) {
            (NodeData::Message(m), NodeEdit::Content(text)) => {
                m.content = text.clone();
                true
            }
            (NodeData::Button(b), NodeEdit::Content(text)) => {
                b.content = text.clone();
                true
            }
            (NodeData::Button(b), NodeEdit::AddOption) => {
                let label = format!("Button {}", b.options.len() + 1);
                b.options.push(label);
                true
            }
            (NodeData::Button(b), NodeEdit::RemoveOption(index)) => {
                if *index >= b.options.len() {
                    return false;
                }
                b.options = b
                    .options
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| i != index)
                    .map(|(_, o)| o.clone())
                    .collect();
                true
            }
            (NodeData::Button(b), NodeEdit::RenameOption(index, label)) => match b.options.get_mut(*index) {
                Some(option) => {
                    *option = label.clone();
                    true
                }
                None => false,
            },
            (NodeData::Condition(c), NodeEdit::ConditionField(field)) => {
                c.condition.field = field.clone();
                true
            }
            (NodeData::Condition(c), NodeEdit::ConditionOperator(op)) => {
                c.condition.operator = *op;
                true
            }
            (NodeData::Condition(c), NodeEdit::ConditionValue(value)) => {
                c.condition.value = value.clone();
                true
            }
            _ => false,
        }
    }
}

/// A single change requested by the config panel.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeEdit {
    Content(String),
    AddOption,
    RemoveOption(usize),
    RenameOption(usize, String),
    ConditionField(String),
    ConditionOperator(ConditionOperator),
    ConditionValue(String),
}

impl NodeEdit {
    /// Edits produced keystroke by keystroke from a text field.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            NodeEdit::Content(_) | NodeEdit::RenameOption(..) | NodeEdit::ConditionField(_) | NodeEdit::ConditionValue(_)
        )
    }
}

/// An entry in the node palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaletteEntry {
    pub tag: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

impl PaletteEntry {
    /// Only tags with a node renderer produce a node on drop.
    pub fn kind(&self) -> Option<NodeKind> {
        NodeKind::from_tag(self.tag).filter(|k| *k != NodeKind::Start)
    }
}

pub const PALETTE: &[PaletteEntry] = &[
    PaletteEntry { tag: "message", label: "Message", description: "Send a text message" },
    PaletteEntry { tag: "button", label: "Buttons", description: "Message with reply buttons" },
    PaletteEntry { tag: "condition", label: "Condition", description: "Branch on a field value" },
    PaletteEntry { tag: "action", label: "Action", description: "Run an action" },
    PaletteEntry { tag: "media", label: "Media", description: "Send an image or file" },
    PaletteEntry { tag: "delay", label: "Delay", description: "Wait before continuing" },
    PaletteEntry { tag: "input", label: "User Input", description: "Collect a reply" },
];
