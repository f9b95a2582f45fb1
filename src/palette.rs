//! Node palette: the draggable catalog of node types.
//!
//! Dragging an entry carries its type tag as a [`PaletteDrag`] payload that
//! the canvas reads on release. The `+` button next to an entry asks for a
//! programmatic add instead.

use crate::node_types::{NodeKind, PaletteEntry, PALETTE};
use egui::{Color32, Id, RichText};

/// Drag payload: the node-type tag of a palette entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteDrag(pub String);

impl PaletteDrag {
    pub fn new(entry: &PaletteEntry) -> Self {
        Self(entry.tag.to_string())
    }

    pub fn tag(&self) -> &str {
        &self.0
    }
}

/// Draw the palette. Returns a node type when an entry's `+` was clicked.
pub fn show(ui: &mut egui::Ui) -> Option<NodeKind> {
    let mut requested = None;
    ui.heading("Nodes");
    ui.label(RichText::new("Drag onto the canvas").small().weak());
    ui.separator();

    for entry in PALETTE {
        let kind = entry.kind();
        ui.horizontal(|ui| {
            ui.dnd_drag_source(Id::new(("palette", entry.tag)), PaletteDrag::new(entry), |ui| {
                let text = RichText::new(entry.label);
                let text = if kind.is_some() {
                    text.strong()
                } else {
                    text.color(Color32::GRAY)
                };
                ui.label(text)
            })
            .response
            .on_hover_text(entry.description);

            if let Some(kind) = kind {
                if ui.small_button("+").on_hover_text("Add at view center").clicked() {
                    requested = Some(kind);
                }
            } else {
                ui.label(RichText::new("soon").small().weak());
            }
        });
    }

    requested
}
