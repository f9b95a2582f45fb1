//! Editor styling and constants.

use crate::node_types::NodeKind;
use egui::Color32;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Visual styling configuration for the flow canvas.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EditorStyle {
    /// Header color per node type tag.
    pub header_colors: HashMap<String, Color32>,
    pub edge_color: Color32,
    pub selected_color: Color32,
    pub use_gradient_connections: bool,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

fn default_font_size() -> f32 {
    14.0
}

impl Default for EditorStyle {
    fn default() -> Self {
        let mut map = HashMap::new();
        map.insert("start".into(), Color32::from_rgb(37, 211, 102));
        map.insert("message".into(), Color32::from_rgb(50, 100, 200));
        map.insert("button".into(), Color32::from_rgb(150, 100, 50));
        map.insert("condition".into(), Color32::from_rgb(100, 50, 200));
        map.insert("default".into(), Color32::from_rgb(100, 100, 100));
        Self {
            header_colors: map,
            edge_color: Color32::from_rgb(37, 211, 102),
            selected_color: Color32::from_rgb(255, 200, 60),
            use_gradient_connections: true,
            font_size: 14.0,
        }
    }
}

impl EditorStyle {
    pub fn header_color(&self, kind: NodeKind) -> Color32 {
        self.header_colors
            .get(kind.tag())
            .or_else(|| self.header_colors.get("default"))
            .copied()
            .unwrap_or(Color32::from_rgb(100, 100, 100))
    }
}

/// Parse `#RRGGBB` edge strokes as stored in the document.
pub fn parse_hex_color(hex: &str) -> Option<Color32> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(digits.get(range)?, 16).ok();
    Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
