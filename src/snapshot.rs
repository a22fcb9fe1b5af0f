//! Plain-data shape records for export, import and project files.
//!
//! Colors are `#AARRGGBB` strings and raster pixels travel as base64 PNG.
//! Undo history does not go through here; it clones scenes directly.

use std::io::Cursor;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use egui::{Color32, Pos2, Vec2, pos2};
use image::{ImageFormat, RgbaImage};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::document::Scene;
use crate::element::{
    Element, LineCap, LineJoin, PathFigure, PathShape, PolygonKind, RasterImage, Shape, Style,
    TextBlock,
};
use crate::error::{PersistenceError, RecordError};

/// One exported element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    pub stroke: String,
    pub thickness: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default)]
    pub filled: bool,
    pub geometry: GeometryRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum GeometryRecord {
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
    Ellipse {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
    Stroke {
        points: Vec<[f32; 2]>,
        #[serde(default)]
        cap: LineCap,
        #[serde(default)]
        join: LineJoin,
    },
    Polygon {
        points: Vec<[f32; 2]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subtype: Option<PolygonKind>,
    },
    Path {
        figures: Vec<PathFigure>,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        font: String,
        size: f32,
    },
    Image {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        /// Base64 PNG
        png: String,
    },
}

pub fn color_to_hex(color: Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    format!("#{a:02X}{r:02X}{g:02X}{b:02X}")
}

/// Parse `#AARRGGBB`, or `#RRGGBB` as opaque
pub fn color_from_hex(text: &str) -> Result<Color32, RecordError> {
    let invalid = || RecordError::InvalidColor(text.to_owned());
    let digits = text.strip_prefix('#').ok_or_else(invalid)?;
    if !digits.is_ascii() {
        return Err(invalid());
    }
    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    match digits.len() {
        8 => Ok(Color32::from_rgba_unmultiplied(
            byte(2)?,
            byte(4)?,
            byte(6)?,
            byte(0)?,
        )),
        6 => Ok(Color32::from_rgb(byte(0)?, byte(2)?, byte(4)?)),
        _ => Err(invalid()),
    }
}

fn to_pairs(points: &[Pos2]) -> Vec<[f32; 2]> {
    points.iter().map(|p| [p.x, p.y]).collect()
}

fn from_pairs(points: &[[f32; 2]]) -> Vec<Pos2> {
    points.iter().map(|&[x, y]| pos2(x, y)).collect()
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

pub fn decode_png(bytes: &[u8]) -> Result<RgbaImage, image::ImageError> {
    Ok(image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8())
}

impl ShapeRecord {
    pub fn from_element(element: &Element) -> Result<Self, PersistenceError> {
        let geometry = match &element.shape {
            Shape::Line { start, end } => GeometryRecord::Line {
                x1: start.x,
                y1: start.y,
                x2: end.x,
                y2: end.y,
            },
            Shape::Rect { origin, size } => GeometryRecord::Rect {
                x: origin.x,
                y: origin.y,
                w: size.x,
                h: size.y,
            },
            Shape::Ellipse { origin, size } => GeometryRecord::Ellipse {
                x: origin.x,
                y: origin.y,
                w: size.x,
                h: size.y,
            },
            Shape::Stroke { points, cap, join } => GeometryRecord::Stroke {
                points: to_pairs(points),
                cap: *cap,
                join: *join,
            },
            Shape::Polygon { points, kind } => GeometryRecord::Polygon {
                points: to_pairs(points),
                subtype: Some(*kind),
            },
            Shape::Path(path) => GeometryRecord::Path {
                figures: path.figures.clone(),
            },
            Shape::Text(text) => GeometryRecord::Text {
                x: text.origin.x,
                y: text.origin.y,
                text: text.content.clone(),
                font: text.font.clone(),
                size: text.size,
            },
            Shape::Raster(raster) => GeometryRecord::Image {
                x: raster.origin.x,
                y: raster.origin.y,
                w: raster.size.x,
                h: raster.size.y,
                png: general_purpose::STANDARD.encode(encode_png(raster.pixels())?),
            },
        };
        let style = &element.style;
        Ok(Self {
            stroke: color_to_hex(style.stroke),
            thickness: style.thickness,
            fill: style.fill.map(color_to_hex),
            filled: style.filled,
            geometry,
        })
    }

    pub fn into_element(self) -> Result<Element, RecordError> {
        let style = Style {
            stroke: color_from_hex(&self.stroke)?,
            thickness: self.thickness,
            fill: self.fill.as_deref().map(color_from_hex).transpose()?,
            filled: self.filled,
        };
        let shape = match self.geometry {
            GeometryRecord::Line { x1, y1, x2, y2 } => Shape::Line {
                start: pos2(x1, y1),
                end: pos2(x2, y2),
            },
            GeometryRecord::Rect { x, y, w, h } => Shape::Rect {
                origin: pos2(x, y),
                size: Vec2::new(w, h),
            },
            GeometryRecord::Ellipse { x, y, w, h } => Shape::Ellipse {
                origin: pos2(x, y),
                size: Vec2::new(w, h),
            },
            GeometryRecord::Stroke { points, cap, join } => Shape::Stroke {
                points: from_pairs(&points),
                cap,
                join,
            },
            GeometryRecord::Polygon { points, subtype } => Shape::Polygon {
                kind: subtype.unwrap_or_else(|| PolygonKind::from_point_count(points.len())),
                points: from_pairs(&points),
            },
            GeometryRecord::Path { figures } => Shape::Path(PathShape::new(figures)),
            GeometryRecord::Text {
                x,
                y,
                text,
                font,
                size,
            } => Shape::Text(TextBlock {
                origin: pos2(x, y),
                content: text,
                font,
                size,
            }),
            GeometryRecord::Image { x, y, w, h, png } => {
                let pixels = decode_png(&general_purpose::STANDARD.decode(png)?)?;
                if !(w.is_finite() && h.is_finite()) {
                    return Err(RecordError::InvalidGeometry(format!("{w}x{h}")));
                }
                Shape::Raster(RasterImage::with_size(
                    pos2(x, y),
                    Vec2::new(w, h),
                    Arc::new(pixels),
                ))
            }
        };
        Ok(Element::new(shape, style))
    }
}

/// Records for every element. Elements that cannot be encoded are left out.
pub fn export_records(scene: &Scene) -> Vec<ShapeRecord> {
    scene
        .elements()
        .iter()
        .enumerate()
        .filter_map(|(index, element)| match ShapeRecord::from_element(element) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("Skipping element {index} on export: {err}");
                None
            }
        })
        .collect()
}

/// Scene as a JSON array of shape records
pub fn export_snapshot(scene: &Scene) -> serde_json::Value {
    serde_json::Value::Array(
        export_records(scene)
            .into_iter()
            .filter_map(|record| serde_json::to_value(record).ok())
            .collect(),
    )
}

/// Rebuild a scene from JSON records. Malformed records are skipped one by one.
pub fn import_snapshot(records: &[serde_json::Value]) -> Scene {
    let mut elements = Vec::with_capacity(records.len());
    for (index, value) in records.iter().enumerate() {
        let element = ShapeRecord::deserialize(value)
            .map_err(RecordError::from)
            .and_then(ShapeRecord::into_element);
        match element {
            Ok(element) => elements.push(element),
            Err(err) => warn!("Skipping shape record {index}: {err}"),
        }
    }
    Scene::from_elements(elements)
}

/// Like [`import_snapshot`] for already-typed records
pub fn import_records(records: Vec<ShapeRecord>) -> Scene {
    let elements = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match record.into_element() {
            Ok(element) => Some(element),
            Err(err) => {
                warn!("Skipping shape record {index}: {err}");
                None
            }
        })
        .collect();
    Scene::from_elements(elements)
}
