//! Connection rendering utilities.
//!
//! Handles drawing bezier curves between node handles and
//! hit-testing for edge selection.

use egui::{Color32, Pos2, Stroke};

const CURVE_STEPS: usize = 30;

/// Control points for a left-to-right connection curve.
pub fn bezier_control_points(p1: Pos2, p2: Pos2) -> (Pos2, Pos2) {
    let dist = (p2.x - p1.x).abs();
    let control_offset = (dist * 0.5).max(50.0);
    (
        Pos2::new(p1.x + control_offset, p1.y),
        Pos2::new(p2.x - control_offset, p2.y),
    )
}

/// Sample the cubic bezier between `p1` and `p2` into `steps + 1` points.
pub fn bezier_points(p1: Pos2, p2: Pos2, steps: usize) -> Vec<Pos2> {
    let (cp1, cp2) = bezier_control_points(p1, p2);
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let t = i as f32 / steps as f32;
            let it = 1.0 - t;
            let x = it.powi(3) * p1.x
                + 3.0 * it.powi(2) * t * cp1.x
                + 3.0 * it * t.powi(2) * cp2.x
                + t.powi(3) * p2.x;
            let y = it.powi(3) * p1.y
                + 3.0 * it.powi(2) * t * cp1.y
                + 3.0 * it * t.powi(2) * cp2.y
                + t.powi(3) * p2.y;
            Pos2::new(x, y)
        })
        .collect()
}

/// Draw a bezier curve between two points, optionally with gradient coloring.
pub fn draw_bezier(
    painter: &egui::Painter,
    p1: Pos2,
    p2: Pos2,
    c1_color: Color32,
    c2_color: Color32,
    width: f32,
) {
    let points = bezier_points(p1, p2, CURVE_STEPS);
    if c1_color == c2_color {
        painter.add(egui::Shape::line(points, Stroke::new(width, c1_color)));
        return;
    }
    for (i, pair) in points.windows(2).enumerate() {
        let t = i as f32 / (points.len() - 1) as f32;
        painter.line_segment([pair[0], pair[1]], Stroke::new(width, lerp_color(c1_color, c2_color, t)));
    }
}

/// Test if a point is within a threshold distance of a bezier curve.
pub fn hit_test_bezier(pos: Pos2, p1: Pos2, p2: Pos2, threshold: f32) -> bool {
    bezier_points(p1, p2, 20)
        .windows(2)
        .any(|pair| distance_to_segment(pos, pair[0], pair[1]) < threshold)
}

/// Calculate distance from a point to a line segment.
pub fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    if ab.length_sq() < 1e-6 {
        return p.distance(a);
    }
    let ap = p - a;
    let t = (ap.dot(ab) / ab.length_sq()).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Draw a dashed line between two points.
pub fn draw_dashed_line(
    painter: &egui::Painter,
    start: Pos2,
    end: Pos2,
    dash_length: f32,
    gap_length: f32,
    stroke: Stroke,
) {
    let dir = end - start;
    let total_length = dir.length();
    if total_length < 0.001 {
        return;
    }

    let unit = dir / total_length;
    let mut current = 0.0;
    let mut drawing = true;

    while current < total_length {
        let segment_length = if drawing { dash_length } else { gap_length };
        let segment_end = (current + segment_length).min(total_length);

        if drawing {
            painter.line_segment([start + unit * current, start + unit * segment_end], stroke);
        }

        current = segment_end;
        drawing = !drawing;
    }
}

pub fn lerp_color(c1: Color32, c2: Color32, t: f32) -> Color32 {
    let mix = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t) as u8;
    Color32::from_rgba_premultiplied(
        mix(c1.r(), c2.r()),
        mix(c1.g(), c2.g()),
        mix(c1.b(), c2.b()),
        mix(c1.a(), c2.a()),
    )
}
