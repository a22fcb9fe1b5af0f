use egui::{Pos2, Rect};

/// Even-odd containment test against a closed polygon.
///
/// Self-intersecting outlines are handled by the same rule: a point is inside
/// when a ray from it crosses the outline an odd number of times. Fewer than
/// three vertices contain nothing.
pub fn point_in_polygon(point: Pos2, polygon: &[Pos2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let cross_x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Half-open containment: the max edges are outside, so adjacent rects never
/// both claim a pixel.
pub fn point_in_rect(point: Pos2, rect: Rect) -> bool {
    point.x >= rect.min.x && point.x < rect.max.x && point.y >= rect.min.y && point.y < rect.max.y
}
