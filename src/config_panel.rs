//! Config panel for the selected node.
//!
//! The form depends on the node type. The panel never mutates the store
//! itself; it returns [`PanelAction`]s that [`apply_actions`] feeds
//! through [`FlowStore::update_node`].

use crate::graph::FlowNode;
use crate::node_types::{ConditionOperator, NodeData, NodeEdit, MAX_BUTTON_OPTIONS};
use crate::store::FlowStore;
use egui::{Color32, RichText};

#[derive(Clone, Debug, PartialEq)]
pub enum PanelAction {
    Edit(NodeEdit),
    Delete,
    Close,
}

pub fn show(ui: &mut egui::Ui, node: &FlowNode) -> Vec<PanelAction> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        ui.heading(format!("{} node", node.kind().display_name()));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("✕").on_hover_text("Close").clicked() {
                actions.push(PanelAction::Close);
            }
        });
    });
    ui.label(RichText::new(format!("id: {}", node.id)).small().weak());
    ui.separator();

    match &node.data {
        NodeData::Start => {
            ui.label("The conversation enters the flow here. Nothing to configure.");
        }
        NodeData::Message(m) => {
            ui.label("Message");
            let mut content = m.content.clone();
            if ui
                .add(
                    egui::TextEdit::multiline(&mut content)
                        .hint_text("Type the message to send...")
                        .desired_rows(4)
                        .desired_width(f32::INFINITY),
                )
                .changed()
            {
                actions.push(PanelAction::Edit(NodeEdit::Content(content)));
            }
        }
        NodeData::Button(b) => {
            ui.label("Message");
            let mut content = b.content.clone();
            if ui
                .add(
                    egui::TextEdit::multiline(&mut content)
                        .hint_text("Text shown above the buttons")
                        .desired_rows(3)
                        .desired_width(f32::INFINITY),
                )
                .changed()
            {
                actions.push(PanelAction::Edit(NodeEdit::Content(content)));
            }

            ui.add_space(6.0);
            ui.label(format!("Buttons ({}/{})", b.options.len(), MAX_BUTTON_OPTIONS));
            for (index, option) in b.options.iter().enumerate() {
                ui.horizontal(|ui| {
                    let mut label = option.clone();
                    if ui.text_edit_singleline(&mut label).changed() {
                        actions.push(PanelAction::Edit(NodeEdit::RenameOption(index, label)));
                    }
                    if ui.small_button("🗑").on_hover_text("Remove option").clicked() {
                        actions.push(PanelAction::Edit(NodeEdit::RemoveOption(index)));
                    }
                });
            }
            if b.options.len() < MAX_BUTTON_OPTIONS && ui.button("+ Add option").clicked() {
                actions.push(PanelAction::Edit(NodeEdit::AddOption));
            }
        }
        NodeData::Condition(c) => {
            ui.label("Field");
            let mut field = c.condition.field.clone();
            if ui
                .add(egui::TextEdit::singleline(&mut field).hint_text("e.g. last_message"))
                .changed()
            {
                actions.push(PanelAction::Edit(NodeEdit::ConditionField(field)));
            }

            ui.label("Operator");
            let mut operator = c.condition.operator;
            egui::ComboBox::from_id_salt(("condition_operator", node.id.as_str()))
                .selected_text(operator.label())
                .show_ui(ui, |ui| {
                    for op in ConditionOperator::ALL {
                        ui.selectable_value(&mut operator, op, op.label());
                    }
                });
            if operator != c.condition.operator {
                actions.push(PanelAction::Edit(NodeEdit::ConditionOperator(operator)));
            }

            ui.label("Value");
            let mut value = c.condition.value.clone();
            if ui.text_edit_singleline(&mut value).changed() {
                actions.push(PanelAction::Edit(NodeEdit::ConditionValue(value)));
            }

            ui.add_space(4.0);
            ui.label(RichText::new("Connect the Yes / No handles to branch.").small().weak());
        }
    }

    ui.add_space(12.0);
    ui.separator();
    if ui
        .button(RichText::new("Delete node").color(Color32::from_rgb(220, 80, 80)))
        .clicked()
    {
        actions.push(PanelAction::Delete);
    }

    actions
}

/// Outcome of applying a frame's panel actions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanelOutcome {
    pub edited: bool,
    pub deleted: bool,
    /// Every applied edit came from typing in a text field.
    pub typing: bool,
}

/// Apply panel actions to node `id`. Edits that do not fit are dropped.
pub fn apply_actions(store: &mut FlowStore, id: &str, actions: &[PanelAction]) -> PanelOutcome {
    let mut outcome = PanelOutcome {
        typing: true,
        ..PanelOutcome::default()
    };
    for action in actions {
        match action {
            PanelAction::Edit(edit) => {
                if store.update_node(id, edit) {
                    outcome.edited = true;
                    outcome.typing &= edit.is_text();
                }
            }
            PanelAction::Delete => {
                outcome.deleted |= store.delete_node(id);
            }
            PanelAction::Close => store.clear_selection(),
        }
    }
    outcome.typing &= outcome.edited && !outcome.deleted;
    outcome
}
