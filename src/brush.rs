//! Brush emission policies.
//!
//! Continuous brushes grow one live stroke element per gesture. Scatter
//! brushes drop independent dab elements on every pointer sample.

use std::f32::consts::{SQRT_2, TAU};

use egui::{Color32, Pos2, Vec2, pos2};
use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::document::{Scene, SceneChange};
use crate::element::{Element, LineCap, LineJoin, Shape, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BrushKind {
    #[default]
    Basic,
    CalligraphyBrush,
    CalligraphyPen,
    Oil,
    Marker,
    Airbrush,
    Crayon,
    NaturalPencil,
    Watercolor,
}

impl BrushKind {
    pub const ALL: [BrushKind; 9] = [
        BrushKind::Basic,
        BrushKind::CalligraphyBrush,
        BrushKind::CalligraphyPen,
        BrushKind::Oil,
        BrushKind::Marker,
        BrushKind::Airbrush,
        BrushKind::Crayon,
        BrushKind::NaturalPencil,
        BrushKind::Watercolor,
    ];

    /// Scatter brushes emit separate dabs instead of growing one stroke
    pub fn is_scatter(self) -> bool {
        matches!(
            self,
            BrushKind::Airbrush | BrushKind::Crayon | BrushKind::NaturalPencil | BrushKind::Watercolor
        )
    }
}

fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

/// Turns pointer samples into brush elements
pub struct BrushEngine {
    rng: StdRng,
    kind: BrushKind,
    color: Color32,
    size: f32,
    /// Scene index of the stroke grown by a continuous brush
    live_stroke: Option<usize>,
}

impl std::fmt::Debug for BrushEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrushEngine")
            .field("kind", &self.kind)
            .field("color", &self.color)
            .field("size", &self.size)
            .field("live_stroke", &self.live_stroke)
            .finish()
    }
}

impl Default for BrushEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BrushEngine {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Deterministic jitter, for tests and reproducible scripts
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            kind: BrushKind::Basic,
            color: Color32::BLACK,
            size: 2.0,
            live_stroke: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.live_stroke.is_some()
    }

    /// Start a brush gesture at `pos`
    pub fn begin(
        &mut self,
        scene: &mut Scene,
        kind: BrushKind,
        pos: Pos2,
        color: Color32,
        size: f32,
    ) -> Vec<SceneChange> {
        self.kind = kind;
        self.color = color;
        self.size = size;
        self.live_stroke = None;
        trace!("Brush {kind:?} begin at {pos:?}");

        if kind.is_scatter() {
            return self.scatter(scene, pos);
        }

        let (color, thickness, cap, join) = match kind {
            BrushKind::CalligraphyBrush => (color, size * 1.5, LineCap::Triangle, LineJoin::Bevel),
            BrushKind::CalligraphyPen => (color, size * 0.7, LineCap::Flat, LineJoin::Round),
            BrushKind::Oil => (with_alpha(color, 200), size * 2.0, LineCap::Round, LineJoin::Round),
            BrushKind::Marker => (with_alpha(color, 100), size * 3.0, LineCap::Square, LineJoin::Round),
            _ => (color, size, LineCap::Round, LineJoin::Round),
        };
        let stroke = Element::new(
            Shape::Stroke {
                points: vec![pos],
                cap,
                join,
            },
            Style::stroke(color, thickness),
        );
        let change = scene.append(stroke);
        if let SceneChange::Added { index } = change {
            self.live_stroke = Some(index);
        }
        vec![change]
    }

    /// Feed the next pointer sample of the gesture
    pub fn update(&mut self, scene: &mut Scene, pos: Pos2) -> Vec<SceneChange> {
        if self.kind.is_scatter() {
            return self.scatter(scene, pos);
        }
        let Some(index) = self.live_stroke else {
            return Vec::new();
        };
        let oil_alpha = (self.kind == BrushKind::Oil).then(|| self.rng.random_range(150..220u8));
        let Some(element) = scene.get_mut(index) else {
            self.live_stroke = None;
            return Vec::new();
        };
        if let Some(alpha) = oil_alpha {
            element.style.stroke = with_alpha(self.color, alpha);
        }
        match element.stroke_points_mut() {
            Some(points) => {
                points.push(pos);
                vec![SceneChange::ContentChanged { index }]
            }
            None => Vec::new(),
        }
    }

    /// Finish the gesture. The live stroke becomes immutable.
    pub fn end(&mut self) -> Option<usize> {
        self.live_stroke.take()
    }

    fn scatter(&mut self, scene: &mut Scene, pos: Pos2) -> Vec<SceneChange> {
        let dabs = match self.kind {
            BrushKind::Airbrush => self.airbrush(pos),
            BrushKind::Crayon => self.crayon(pos),
            BrushKind::NaturalPencil => self.natural_pencil(pos),
            BrushKind::Watercolor => self.watercolor(pos),
            _ => Vec::new(),
        };
        dabs.into_iter().map(|dab| scene.append(dab)).collect()
    }

    /// Small dots whose boxes stay inside a circle of radius `size`
    fn airbrush(&mut self, pos: Pos2) -> Vec<Element> {
        let size = self.size;
        let count = ((size * 8.0) as usize).max(1);
        // Below size 1/sqrt(2) even a 1 px dot would poke out of the radius
        let max_dot = (size * 0.5).clamp(1.0, 2.5).min(size.max(0.0) * SQRT_2);
        let min_dot = max_dot.min(1.0);
        (0..count)
            .map(|_| {
                let w = self.rng.random_range(min_dot..=max_dot);
                let h = self.rng.random_range(min_dot..=max_dot);
                let half_diagonal = Vec2::new(w, h).length() / 2.0;
                let reach = (size - half_diagonal).max(0.0);
                let radius = if reach > 0.0 {
                    self.rng.random_range(0.0..reach)
                } else {
                    0.0
                };
                let angle = self.rng.random_range(0.0..TAU);
                let center = pos + radius * Vec2::angled(angle);
                let alpha = self.rng.random_range(120..200u8);
                Element::new(
                    Shape::Ellipse {
                        origin: center - Vec2::new(w, h) / 2.0,
                        size: Vec2::new(w, h),
                    },
                    Style::filled(with_alpha(self.color, alpha)),
                )
            })
            .collect()
    }

    fn crayon(&mut self, pos: Pos2) -> Vec<Element> {
        let half = self.size / 2.0;
        (0..6)
            .map(|_| {
                let start = self.jitter(pos, half);
                let end = self.jitter(pos, half);
                let alpha = self.rng.random_range(60..150u8);
                Element::new(
                    Shape::Line { start, end },
                    Style::stroke(with_alpha(self.color, alpha), 1.0),
                )
            })
            .collect()
    }

    fn natural_pencil(&mut self, pos: Pos2) -> Vec<Element> {
        let thickness = (self.size * 0.6).max(0.5);
        (0..3)
            .map(|_| {
                let start = self.jitter(pos, 0.75);
                let end = self.jitter(pos, 0.75);
                let alpha = self.rng.random_range(90..220u8);
                Element::new(
                    Shape::Line { start, end },
                    Style::stroke(with_alpha(self.color, alpha), thickness),
                )
            })
            .collect()
    }

    fn watercolor(&mut self, pos: Pos2) -> Vec<Element> {
        (0..3)
            .map(|_| {
                let size = Vec2::new(
                    self.size * self.rng.random_range(1.2..1.5),
                    self.size * self.rng.random_range(0.8..1.1),
                );
                let alpha = self.rng.random_range(40..80u8);
                Element::new(
                    Shape::Ellipse {
                        origin: pos - size / 2.0,
                        size,
                    },
                    Style::filled(with_alpha(self.color, alpha)),
                )
            })
            .collect()
    }

    /// Uniform offset in `[-amount, amount)` on both axes
    fn jitter(&mut self, pos: Pos2, amount: f32) -> Pos2 {
        if amount <= 0.0 {
            return pos;
        }
        pos2(
            pos.x + self.rng.random_range(-amount..amount),
            pos.y + self.rng.random_range(-amount..amount),
        )
    }
}
