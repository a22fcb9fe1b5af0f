use egui::{Pos2, Rect, Vec2};

// Common constants for all element types
pub const MIN_ELEMENT_SIZE: f32 = 1.0;

/// Floors a width or height to the minimum element size.
///
/// Non-finite and non-positive values become `MIN_ELEMENT_SIZE`, so downstream
/// rasterization is never asked to place a zero-size region.
pub(crate) fn floor_extent(value: f32) -> f32 {
    if value.is_finite() && value >= MIN_ELEMENT_SIZE {
        value
    } else {
        MIN_ELEMENT_SIZE
    }
}

/// Builds a rect from an origin and a size, flooring both dimensions.
pub(crate) fn floored_rect(origin: Pos2, size: Vec2) -> Rect {
    Rect::from_min_size(origin, Vec2::new(floor_extent(size.x), floor_extent(size.y)))
}

/// Calculate the bounding box for a set of points.
///
/// An empty point set yields a 1x1 rect at the origin instead of `Rect::NOTHING`.
pub(crate) fn calculate_bounds(points: &[Pos2]) -> Rect {
    if points.is_empty() {
        return floored_rect(Pos2::ZERO, Vec2::ZERO);
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    if !min_x.is_finite() || !min_y.is_finite() {
        return floored_rect(Pos2::ZERO, Vec2::ZERO);
    }

    floored_rect(Pos2::new(min_x, min_y), Vec2::new(max_x - min_x, max_y - min_y))
}

/// Normalized rect spanned by two drag points.
pub(crate) fn drag_rect(start: Pos2, end: Pos2) -> Rect {
    Rect::from_two_pos(start, end)
}
