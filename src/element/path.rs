use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::common;

/// Number of line segments used when flattening one cubic segment.
pub const CUBIC_FLATTEN_STEPS: usize = 16;

/// One drawing command after the figure's start point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    Line(Pos2),
    Cubic { ctrl1: Pos2, ctrl2: Pos2, to: Pos2 },
}

impl PathSegment {
    pub fn end(&self) -> Pos2 {
        match self {
            PathSegment::Line(to) => *to,
            PathSegment::Cubic { to, .. } => *to,
        }
    }

    fn translate(&mut self, delta: Vec2) {
        match self {
            PathSegment::Line(to) => *to += delta,
            PathSegment::Cubic { ctrl1, ctrl2, to } => {
                *ctrl1 += delta;
                *ctrl2 += delta;
                *to += delta;
            }
        }
    }
}

/// A connected run of segments starting at `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathFigure {
    pub start: Pos2,
    pub segments: Vec<PathSegment>,
    pub closed: bool,
}

impl PathFigure {
    pub fn new(start: Pos2, closed: bool) -> Self {
        Self {
            start,
            segments: Vec::new(),
            closed,
        }
    }

    pub fn line_to(mut self, to: Pos2) -> Self {
        self.segments.push(PathSegment::Line(to));
        self
    }

    pub fn cubic_to(mut self, ctrl1: Pos2, ctrl2: Pos2, to: Pos2) -> Self {
        self.segments.push(PathSegment::Cubic { ctrl1, ctrl2, to });
        self
    }

    /// Closed figure through the given vertices.
    pub fn polyline(points: &[Pos2]) -> Self {
        let mut figure = Self::new(points.first().copied().unwrap_or(Pos2::ZERO), true);
        for point in points.iter().skip(1) {
            figure.segments.push(PathSegment::Line(*point));
        }
        figure
    }

    /// Approximates the figure with a polyline, including the start point.
    pub fn flatten(&self) -> Vec<Pos2> {
        let mut points = vec![self.start];
        let mut current = self.start;
        for segment in &self.segments {
            match *segment {
                PathSegment::Line(to) => points.push(to),
                PathSegment::Cubic { ctrl1, ctrl2, to } => {
                    for step in 1..=CUBIC_FLATTEN_STEPS {
                        let t = step as f32 / CUBIC_FLATTEN_STEPS as f32;
                        points.push(cubic_point(current, ctrl1, ctrl2, to, t));
                    }
                }
            }
            current = segment.end();
        }
        points
    }
}

/// Curve description for heart, cloud, lightning and arrow shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathShape {
    pub figures: Vec<PathFigure>,
}

impl PathShape {
    pub fn new(figures: Vec<PathFigure>) -> Self {
        Self { figures }
    }

    pub fn flatten(&self) -> Vec<Pos2> {
        self.figures.iter().flat_map(PathFigure::flatten).collect()
    }

    /// Bounds of the rendered curve (flattened, so control points outside the
    /// curve do not inflate the box).
    pub fn bounds(&self) -> Rect {
        common::calculate_bounds(&self.flatten())
    }

    pub fn translate(&mut self, delta: Vec2) {
        for figure in &mut self.figures {
            figure.start += delta;
            for segment in &mut figure.segments {
                segment.translate(delta);
            }
        }
    }
}

fn cubic_point(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, t: f32) -> Pos2 {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Pos2::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}
