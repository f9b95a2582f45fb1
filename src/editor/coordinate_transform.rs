//! Coordinate transformation utilities for the flow canvas.
//!
//! Handles conversions between canvas coordinates (where node positions
//! live) and screen coordinates, accounting for pan and zoom.

pub use crate::graph::{MAX_ZOOM, MIN_ZOOM};
use crate::graph::{Position, Viewport};
use egui::{Pos2, Vec2};

pub fn pan(viewport: &Viewport) -> Vec2 {
    Vec2::new(viewport.x, viewport.y)
}

/// Convert canvas coordinates to screen coordinates.
///
/// # Arguments
/// * `pos` - Position in canvas space
/// * `viewport` - Current pan and zoom
/// * `canvas_offset` - Top-left corner of the canvas in screen space
pub fn to_screen(pos: Pos2, viewport: &Viewport, canvas_offset: Pos2) -> Pos2 {
    canvas_offset + pan(viewport) + pos.to_vec2() * viewport.zoom
}

/// Convert screen coordinates to canvas coordinates.
pub fn from_screen(screen_pos: Pos2, viewport: &Viewport, canvas_offset: Pos2) -> Pos2 {
    let relative = screen_pos - canvas_offset - pan(viewport);
    (relative / viewport.zoom).to_pos2()
}

pub fn position_to_pos2(position: Position) -> Pos2 {
    Pos2::new(position.x, position.y)
}

pub fn pos2_to_position(pos: Pos2) -> Position {
    Position::new(pos.x, pos.y)
}

/// Zoom by `factor` keeping the screen point `anchor` fixed.
pub fn zoom_around(viewport: &mut Viewport, factor: f32, anchor: Pos2, canvas_offset: Pos2) {
    let old_zoom = viewport.zoom;
    let new_zoom = (old_zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    let ratio = new_zoom / old_zoom;
    let pointer = anchor - canvas_offset;
    let new_pan = pointer - (pointer - pan(viewport)) * ratio;
    viewport.x = new_pan.x;
    viewport.y = new_pan.y;
    viewport.zoom = new_zoom;
}

/// Round a canvas position to the nearest grid point.
pub fn snap(pos: Pos2, grid_size: f32) -> Pos2 {
    if grid_size <= 0.0 {
        return pos;
    }
    Pos2::new(
        (pos.x / grid_size).round() * grid_size,
        (pos.y / grid_size).round() * grid_size,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_round_trip() {
        let viewport = Viewport {
            x: 40.0,
            y: -12.0,
            zoom: 0.5,
        };
        let origin = Pos2::new(200.0, 30.0);
        let p = Pos2::new(123.0, 456.0);
        let back = from_screen(to_screen(p, &viewport, origin), &viewport, origin);
        assert!((back - p).length() < 1e-3);
    }

    #[test]
    fn from_screen_removes_pan_and_zoom() {
        let viewport = Viewport {
            x: 100.0,
            y: 50.0,
            zoom: 2.0,
        };
        let p = from_screen(Pos2::new(310.0, 160.0), &viewport, Pos2::new(10.0, 10.0));
        assert_eq!(p, Pos2::new(100.0, 50.0));
    }

    #[test]
    fn zoom_keeps_anchor_fixed_and_clamps() {
        let mut viewport = Viewport::default();
        let origin = Pos2::ZERO;
        let anchor = Pos2::new(300.0, 200.0);
        let before = from_screen(anchor, &viewport, origin);
        zoom_around(&mut viewport, 1.5, anchor, origin);
        let after = from_screen(anchor, &viewport, origin);
        assert!((before - after).length() < 1e-3);

        zoom_around(&mut viewport, 100.0, anchor, origin);
        assert_eq!(viewport.zoom, MAX_ZOOM);
    }

    #[test]
    fn snap_rounds_to_grid() {
        assert_eq!(snap(Pos2::new(14.0, 26.0), 20.0), Pos2::new(20.0, 20.0));
        assert_eq!(snap(Pos2::new(14.0, 26.0), 0.0), Pos2::new(14.0, 26.0));
    }
}
