use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

mod common;
pub(crate) mod image;
pub(crate) mod path;

pub use common::MIN_ELEMENT_SIZE;
pub(crate) use common::drag_rect;
pub use self::image::{PixelBufferRef, RasterImage};
pub use path::{PathFigure, PathSegment, PathShape};

/// End-cap style of an open polyline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineCap {
    Flat,
    #[default]
    Round,
    Square,
    Triangle,
}

/// Join style between polyline segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineJoin {
    Miter,
    #[default]
    Round,
    Bevel,
}

/// Which generator produced a polygon. Only used for display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolygonKind {
    Triangle,
    Star,
    Diamond,
    Regular(u32),
    Custom,
}

impl PolygonKind {
    /// Best guess from the vertex count alone, as imported records carry no tag.
    pub fn from_point_count(count: usize) -> Self {
        match count {
            3 => PolygonKind::Triangle,
            4 => PolygonKind::Diamond,
            10 => PolygonKind::Star,
            5 | 6 => PolygonKind::Regular(count as u32),
            _ => PolygonKind::Custom,
        }
    }
}

/// Paint attributes every element carries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub stroke: Color32,
    pub thickness: f32,
    pub fill: Option<Color32>,
    pub filled: bool,
}

impl Style {
    pub fn stroke(stroke: Color32, thickness: f32) -> Self {
        Self {
            stroke,
            thickness,
            fill: None,
            filled: false,
        }
    }

    /// Fill only, no outline
    pub fn filled(fill: Color32) -> Self {
        Self {
            stroke: Color32::TRANSPARENT,
            thickness: 0.0,
            fill: Some(fill),
            filled: true,
        }
    }

    /// The fill color when filling is enabled
    pub fn active_fill(&self) -> Option<Color32> {
        if self.filled { self.fill } else { None }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::stroke(Color32::BLACK, 2.0)
    }
}

/// Text content placed at a point. The text color is the element's stroke color.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub origin: Pos2,
    pub content: String,
    pub font: String,
    pub size: f32,
}

impl TextBlock {
    /// Layout-free size estimate, enough for bounds and hit areas
    pub fn estimated_size(&self) -> Vec2 {
        let lines = self.content.lines().count().max(1);
        let longest = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        Vec2::new(
            longest as f32 * self.size * 0.6,
            lines as f32 * self.size * 1.2,
        )
    }
}

/// Geometry of one element, exactly one variant per shape kind
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line { start: Pos2, end: Pos2 },
    Rect { origin: Pos2, size: Vec2 },
    Ellipse { origin: Pos2, size: Vec2 },
    Stroke {
        points: Vec<Pos2>,
        cap: LineCap,
        join: LineJoin,
    },
    Polygon { points: Vec<Pos2>, kind: PolygonKind },
    Path(PathShape),
    Text(TextBlock),
    Raster(RasterImage),
}

/// A drawable element of the scene
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub shape: Shape,
    pub style: Style,
}

impl Element {
    pub fn new(shape: Shape, style: Style) -> Self {
        Self { shape, style }
    }

    /// Get the element type as a string
    pub fn element_type(&self) -> &'static str {
        match &self.shape {
            Shape::Line { .. } => "line",
            Shape::Rect { .. } => "rect",
            Shape::Ellipse { .. } => "ellipse",
            Shape::Stroke { .. } => "stroke",
            Shape::Polygon { .. } => "polygon",
            Shape::Path(_) => "path",
            Shape::Text(_) => "text",
            Shape::Raster(_) => "image",
        }
    }

    /// Name shown for this element in a layers list
    pub fn display_name(&self) -> String {
        match &self.shape {
            Shape::Line { .. } => "Line".to_owned(),
            Shape::Rect { .. } => "Rectangle".to_owned(),
            Shape::Ellipse { .. } => "Ellipse / Circle".to_owned(),
            Shape::Stroke { .. } => "Pencil / Brush Stroke".to_owned(),
            Shape::Polygon { kind, .. } => match kind {
                PolygonKind::Triangle => "Triangle".to_owned(),
                PolygonKind::Star => "Star".to_owned(),
                PolygonKind::Diamond => "Diamond".to_owned(),
                PolygonKind::Regular(5) => "Pentagon".to_owned(),
                PolygonKind::Regular(6) => "Hexagon".to_owned(),
                PolygonKind::Regular(_) | PolygonKind::Custom => "Polygon".to_owned(),
            },
            Shape::Path(_) => "Custom Shape".to_owned(),
            Shape::Text(text) => {
                let preview: String = text.content.chars().take(15).collect();
                format!("Text: {preview}")
            }
            Shape::Raster(_) => "Image".to_owned(),
        }
    }

    /// Bounding box of the element, never smaller than 1x1
    pub fn bounds(&self) -> Rect {
        match &self.shape {
            Shape::Line { start, end } => common::floored_rect(
                Pos2::new(start.x.min(end.x), start.y.min(end.y)),
                Vec2::new((end.x - start.x).abs(), (end.y - start.y).abs()),
            ),
            Shape::Stroke { points, .. } | Shape::Polygon { points, .. } => {
                common::calculate_bounds(points)
            }
            Shape::Path(path) => path.bounds(),
            Shape::Rect { origin, size } | Shape::Ellipse { origin, size } => {
                common::floored_rect(*origin, *size)
            }
            Shape::Text(text) => common::floored_rect(text.origin, text.estimated_size()),
            Shape::Raster(raster) => raster.rect(),
        }
    }

    /// Translate the element by the given delta
    pub fn translate(&mut self, delta: Vec2) {
        match &mut self.shape {
            Shape::Line { start, end } => {
                *start += delta;
                *end += delta;
            }
            Shape::Rect { origin, .. } | Shape::Ellipse { origin, .. } => *origin += delta,
            Shape::Stroke { points, .. } | Shape::Polygon { points, .. } => {
                for point in points {
                    *point += delta;
                }
            }
            Shape::Path(path) => path.translate(delta),
            Shape::Text(text) => text.origin += delta,
            Shape::Raster(raster) => raster.translate(delta),
        }
    }

    pub fn as_raster(&self) -> Option<&RasterImage> {
        match &self.shape {
            Shape::Raster(raster) => Some(raster),
            _ => None,
        }
    }

    pub fn stroke_points_mut(&mut self) -> Option<&mut Vec<Pos2>> {
        match &mut self.shape {
            Shape::Stroke { points, .. } => Some(points),
            _ => None,
        }
    }
}

/// Factory functions for creating elements
pub mod factory {
    use super::*;

    /// Create a new stroke element with round caps and joins
    pub fn create_stroke(points: Vec<Pos2>, thickness: f32, color: Color32) -> Element {
        Element::new(
            Shape::Stroke {
                points,
                cap: LineCap::Round,
                join: LineJoin::Round,
            },
            Style::stroke(color, thickness),
        )
    }

    /// Create a new raster element at its natural size
    pub fn create_image(pixels: ::image::RgbaImage, position: Pos2) -> Element {
        Element::new(
            Shape::Raster(RasterImage::new(position, pixels)),
            Style::stroke(Color32::TRANSPARENT, 0.0),
        )
    }

    /// Create a rectangle from an origin and size
    pub fn create_rect(origin: Pos2, size: Vec2, style: Style) -> Element {
        Element::new(Shape::Rect { origin, size }, style)
    }

    /// Create a text element
    pub fn create_text(
        origin: Pos2,
        content: impl Into<String>,
        font: impl Into<String>,
        size: f32,
        color: Color32,
    ) -> Element {
        Element::new(
            Shape::Text(TextBlock {
                origin,
                content: content.into(),
                font: font.into(),
                size,
            }),
            Style::stroke(color, 0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn line_bounds_inflate_to_one_pixel() {
        let line = Element::new(
            Shape::Line {
                start: pos2(5.0, 5.0),
                end: pos2(5.0, 30.0),
            },
            Style::default(),
        );
        let bounds = line.bounds();
        assert_eq!(bounds.min, pos2(5.0, 5.0));
        assert_eq!(bounds.width(), 1.0);
        assert_eq!(bounds.height(), 25.0);
    }

    #[test]
    fn negative_rect_size_is_floored() {
        let rect = factory::create_rect(pos2(3.0, 4.0), Vec2::new(-10.0, 0.0), Style::default());
        let bounds = rect.bounds();
        assert_eq!(bounds.min, pos2(3.0, 4.0));
        assert_eq!(bounds.size(), Vec2::splat(1.0));
    }

    #[test]
    fn text_display_name_is_truncated() {
        let text = factory::create_text(
            pos2(0.0, 0.0),
            "a rather long piece of text",
            "Arial",
            16.0,
            Color32::BLACK,
        );
        assert_eq!(text.display_name(), "Text: a rather long p");
    }

    #[test]
    fn translate_moves_every_point() {
        let mut stroke =
            factory::create_stroke(vec![pos2(1.0, 1.0), pos2(4.0, 9.0)], 2.0, Color32::RED);
        stroke.translate(Vec2::new(10.0, -1.0));
        assert_eq!(stroke.bounds().min, pos2(11.0, 0.0));
        assert_eq!(stroke.bounds().max, pos2(14.0, 8.0));
    }
}
