//! Geometry generators for the shape tool.
//!
//! Every generator takes the fixed gesture start and the live pointer position
//! and rebuilds the whole shape from scratch. A zero-size drag (start == end)
//! yields zero-area geometry with the usual vertex count.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use egui::{Pos2, Rect, Vec2, pos2};
use serde::{Deserialize, Serialize};

use crate::element::{PathFigure, PathShape, PolygonKind, Shape, drag_rect};

/// Shapes offered by the shape tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    Line,
    #[default]
    Rectangle,
    Ellipse,
    Triangle,
    Pentagon,
    Hexagon,
    Star,
    Star4,
    Star6,
    Diamond,
    Heart,
    Cloud,
    Lightning,
    FourWayArrow,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 18] = [
        ShapeKind::Line,
        ShapeKind::Rectangle,
        ShapeKind::Ellipse,
        ShapeKind::Triangle,
        ShapeKind::Pentagon,
        ShapeKind::Hexagon,
        ShapeKind::Star,
        ShapeKind::Star4,
        ShapeKind::Star6,
        ShapeKind::Diamond,
        ShapeKind::Heart,
        ShapeKind::Cloud,
        ShapeKind::Lightning,
        ShapeKind::FourWayArrow,
        ShapeKind::ArrowUp,
        ShapeKind::ArrowDown,
        ShapeKind::ArrowLeft,
        ShapeKind::ArrowRight,
    ];

    /// Build the geometry spanned by a drag from `start` to `end`
    pub fn build(self, start: Pos2, end: Pos2) -> Shape {
        match self {
            ShapeKind::Line => Shape::Line { start, end },
            ShapeKind::Rectangle => {
                let rect = drag_rect(start, end);
                Shape::Rect {
                    origin: rect.min,
                    size: rect.size(),
                }
            }
            ShapeKind::Ellipse => {
                let rect = drag_rect(start, end);
                Shape::Ellipse {
                    origin: rect.min,
                    size: rect.size(),
                }
            }
            ShapeKind::Triangle => Shape::Polygon {
                points: triangle(start, end),
                kind: PolygonKind::Triangle,
            },
            ShapeKind::Pentagon => Shape::Polygon {
                points: regular_polygon(start, end, 5),
                kind: PolygonKind::Regular(5),
            },
            ShapeKind::Hexagon => Shape::Polygon {
                points: regular_polygon(start, end, 6),
                kind: PolygonKind::Regular(6),
            },
            ShapeKind::Star => Shape::Polygon {
                points: star(start, end, 5),
                kind: PolygonKind::Star,
            },
            ShapeKind::Star4 => Shape::Polygon {
                points: star(start, end, 4),
                kind: PolygonKind::Star,
            },
            ShapeKind::Star6 => Shape::Polygon {
                points: star(start, end, 6),
                kind: PolygonKind::Star,
            },
            ShapeKind::Diamond => Shape::Polygon {
                points: diamond(start, end),
                kind: PolygonKind::Diamond,
            },
            ShapeKind::Heart => Shape::Path(heart(start, end)),
            ShapeKind::Cloud => Shape::Path(cloud(start, end)),
            ShapeKind::Lightning => Shape::Path(lightning(start, end)),
            ShapeKind::FourWayArrow => Shape::Path(four_way_arrow(start, end)),
            ShapeKind::ArrowUp => Shape::Path(block_arrow(start, end, ArrowDirection::Up)),
            ShapeKind::ArrowDown => Shape::Path(block_arrow(start, end, ArrowDirection::Down)),
            ShapeKind::ArrowLeft => Shape::Path(block_arrow(start, end, ArrowDirection::Left)),
            ShapeKind::ArrowRight => Shape::Path(block_arrow(start, end, ArrowDirection::Right)),
        }
    }
}

/// Direction a single block arrow points to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    Up,
    Down,
    Left,
    Right,
}

fn center_and_radius(start: Pos2, end: Pos2) -> (Pos2, f32) {
    let center = start.lerp(end, 0.5);
    let radius = (end.x - start.x).abs().min((end.y - start.y).abs()) / 2.0;
    (center, radius)
}

fn polar(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    pos2(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// Point at fractions `(u, v)` of `rect`
fn at(rect: Rect, u: f32, v: f32) -> Pos2 {
    pos2(rect.min.x + rect.width() * u, rect.min.y + rect.height() * v)
}

/// Regular N-gon inscribed in the circle fitting the drag box, first vertex on top.
/// Fewer than three sides yields no points.
pub fn regular_polygon(start: Pos2, end: Pos2, sides: usize) -> Vec<Pos2> {
    if sides < 3 {
        return Vec::new();
    }
    let (center, radius) = center_and_radius(start, end);
    (0..sides)
        .map(|i| polar(center, radius, -FRAC_PI_2 + TAU * i as f32 / sides as f32))
        .collect()
}

/// Star alternating outer (radius r) and inner (radius r/2) vertices
pub fn star(start: Pos2, end: Pos2, branches: usize) -> Vec<Pos2> {
    let (center, radius) = center_and_radius(start, end);
    let mut points = Vec::with_capacity(branches * 2);
    for i in 0..branches {
        let outer = TAU / branches as f32 * i as f32 - FRAC_PI_2;
        let inner = outer + PI / branches as f32;
        points.push(polar(center, radius, outer));
        points.push(polar(center, radius / 2.0, inner));
    }
    points
}

/// Apex at the top middle of the drag, base on the pointer's row
pub fn triangle(start: Pos2, end: Pos2) -> Vec<Pos2> {
    vec![
        pos2((start.x + end.x) / 2.0, start.y),
        end,
        pos2(start.x, end.y),
    ]
}

/// Top, right, bottom, left of the drag box
pub fn diamond(start: Pos2, end: Pos2) -> Vec<Pos2> {
    let center = start.lerp(end, 0.5);
    let half = Vec2::new((end.x - start.x).abs(), (end.y - start.y).abs()) / 2.0;
    vec![
        pos2(center.x, center.y - half.y),
        pos2(center.x + half.x, center.y),
        pos2(center.x, center.y + half.y),
        pos2(center.x - half.x, center.y),
    ]
}

pub fn heart(start: Pos2, end: Pos2) -> PathShape {
    let r = drag_rect(start, end);
    let bottom = at(r, 0.5, 1.0);
    let top_center = at(r, 0.5, 0.25);
    PathShape::new(vec![
        PathFigure::new(bottom, true)
            .cubic_to(at(r, 0.2, 0.75), at(r, 0.0, 0.4), top_center)
            .cubic_to(at(r, 1.0, 0.4), at(r, 0.8, 0.75), bottom),
    ])
}

pub fn cloud(start: Pos2, end: Pos2) -> PathShape {
    let r = drag_rect(start, end);
    PathShape::new(vec![
        PathFigure::new(at(r, 0.25, 0.5), true)
            .cubic_to(at(r, 0.0, 0.0), at(r, 0.5, -0.2), at(r, 0.5, 0.3))
            .cubic_to(at(r, 0.5, -0.2), at(r, 1.0, 0.0), at(r, 0.75, 0.5))
            .cubic_to(at(r, 1.0, 1.0), at(r, 0.5, 1.2), at(r, 0.25, 0.5)),
    ])
}

pub fn lightning(start: Pos2, end: Pos2) -> PathShape {
    let r = drag_rect(start, end);
    let points = [
        (0.4, 0.0),
        (0.6, 0.4),
        (0.5, 0.4),
        (0.7, 1.0),
        (0.3, 0.6),
        (0.5, 0.6),
    ]
    .map(|(u, v)| at(r, u, v));
    PathShape::new(vec![PathFigure::polyline(&points)])
}

/// Four triangular heads around the centre, unit `min(w, h) / 4`
pub fn four_way_arrow(start: Pos2, end: Pos2) -> PathShape {
    let c = start.lerp(end, 0.5);
    let s = (end.x - start.x).abs().min((end.y - start.y).abs()) / 4.0;
    let head = |tip: Pos2, a: Pos2, b: Pos2| PathFigure::polyline(&[tip, a, b]);
    PathShape::new(vec![
        head(
            pos2(c.x, c.y - 2.0 * s),
            pos2(c.x - s, c.y - s),
            pos2(c.x + s, c.y - s),
        ),
        head(
            pos2(c.x + 2.0 * s, c.y),
            pos2(c.x + s, c.y - s),
            pos2(c.x + s, c.y + s),
        ),
        head(
            pos2(c.x, c.y + 2.0 * s),
            pos2(c.x - s, c.y + s),
            pos2(c.x + s, c.y + s),
        ),
        head(
            pos2(c.x - 2.0 * s, c.y),
            pos2(c.x - s, c.y - s),
            pos2(c.x - s, c.y + s),
        ),
    ])
}

/// Seven-vertex block arrow filling the drag box
pub fn block_arrow(start: Pos2, end: Pos2, direction: ArrowDirection) -> PathShape {
    let r = drag_rect(start, end);
    // Outline of an upward arrow, remapped for the other directions.
    const UP: [(f32, f32); 7] = [
        (0.5, 0.0),
        (1.0, 0.5),
        (0.7, 0.5),
        (0.7, 1.0),
        (0.3, 1.0),
        (0.3, 0.5),
        (0.0, 0.5),
    ];
    let points: Vec<Pos2> = UP
        .iter()
        .map(|&(u, v)| match direction {
            ArrowDirection::Up => (u, v),
            ArrowDirection::Down => (u, 1.0 - v),
            ArrowDirection::Left => (v, u),
            ArrowDirection::Right => (1.0 - v, u),
        })
        .map(|(u, v)| at(r, u, v))
        .collect();
    PathShape::new(vec![PathFigure::polyline(&points)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_has_requested_vertex_count() {
        for sides in 3..12 {
            let points = regular_polygon(pos2(0.0, 0.0), pos2(100.0, 80.0), sides);
            assert_eq!(points.len(), sides);
        }
        assert!(regular_polygon(pos2(0.0, 0.0), pos2(10.0, 10.0), 2).is_empty());
    }

    #[test]
    fn polygon_first_vertex_is_on_top() {
        let points = regular_polygon(pos2(0.0, 0.0), pos2(100.0, 100.0), 6);
        assert!((points[0].x - 50.0).abs() < 1e-4);
        assert!(points[0].y.abs() < 1e-4);
    }

    #[test]
    fn star_alternates_radii() {
        let center = pos2(50.0, 50.0);
        let points = star(pos2(0.0, 0.0), pos2(100.0, 100.0), 5);
        assert_eq!(points.len(), 10);
        for (i, point) in points.iter().enumerate() {
            let expected = if i % 2 == 0 { 50.0 } else { 25.0 };
            assert!((point.distance(center) - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn degenerate_drag_is_safe_for_every_kind() {
        let p = pos2(20.0, 30.0);
        for kind in ShapeKind::ALL {
            let shape = kind.build(p, p);
            let element = crate::element::Element::new(shape, Default::default());
            let bounds = element.bounds();
            assert!(bounds.width() >= 1.0 && bounds.height() >= 1.0, "{kind:?}");
            assert!(bounds.min.x.is_finite() && bounds.min.y.is_finite(), "{kind:?}");
        }
    }

    #[test]
    fn right_arrow_tip_is_on_the_right_edge() {
        let path = block_arrow(pos2(0.0, 0.0), pos2(40.0, 20.0), ArrowDirection::Right);
        assert_eq!(path.figures[0].start, pos2(40.0, 10.0));
    }

    #[test]
    fn reversed_drag_matches_forward_drag() {
        let a = diamond(pos2(0.0, 0.0), pos2(40.0, 20.0));
        let b = diamond(pos2(40.0, 20.0), pos2(0.0, 0.0));
        assert_eq!(a, b);
    }
}
