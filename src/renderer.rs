use egui::{Color32, Rect};
use image::{Rgba, RgbaImage};
use log::trace;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, LineCap as SkiaCap, LineJoin as SkiaJoin, Paint, Path,
    PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

use crate::document::Scene;
use crate::element::{Element, LineCap, LineJoin, PathShape, PathSegment, RasterImage, Shape};

/// Turns a scene into pixels.
///
/// Output is RGBA8, unmultiplied, top-left origin, exactly `width` x `height`.
/// Elements are composited in scene order.
pub trait Renderer {
    fn rasterize(&self, scene: &Scene, width: u32, height: u32) -> RgbaImage;
}

/// Software renderer on tiny-skia. Text elements are not drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkiaRenderer {
    pub background: Color32,
    pub anti_alias: bool,
}

impl Default for SkiaRenderer {
    fn default() -> Self {
        Self {
            background: Color32::WHITE,
            anti_alias: true,
        }
    }
}

impl SkiaRenderer {
    pub fn new(background: Color32) -> Self {
        Self {
            background,
            ..Default::default()
        }
    }

    fn paint(&self, color: Color32) -> Paint<'static> {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = self.anti_alias;
        paint
    }

    fn draw_element(&self, pixmap: &mut Pixmap, element: &Element) {
        let style = &element.style;
        let fill = style.active_fill();
        let outline = (style.thickness > 0.0 && style.stroke.a() > 0).then(|| Stroke {
            width: style.thickness,
            ..Default::default()
        });

        match &element.shape {
            Shape::Line { start, end } => {
                let mut pb = PathBuilder::new();
                pb.move_to(start.x, start.y);
                pb.line_to(end.x, end.y);
                self.stroke(pixmap, pb.finish(), style.stroke, outline);
            }
            Shape::Rect { .. } => {
                let path = skia_rect(element.bounds()).map(PathBuilder::from_rect);
                self.fill_and_stroke(pixmap, path, fill, style.stroke, outline);
            }
            Shape::Ellipse { .. } => {
                let path = skia_rect(element.bounds()).and_then(PathBuilder::from_oval);
                self.fill_and_stroke(pixmap, path, fill, style.stroke, outline);
            }
            Shape::Stroke { points, cap, join } => {
                let Some(first) = points.first() else {
                    return;
                };
                let mut pb = PathBuilder::new();
                pb.move_to(first.x, first.y);
                if points.len() == 1 {
                    // A single sample still leaves a dot
                    pb.line_to(first.x, first.y);
                }
                for point in &points[1..] {
                    pb.line_to(point.x, point.y);
                }
                let outline = outline.map(|stroke| Stroke {
                    line_cap: skia_cap(*cap),
                    line_join: skia_join(*join),
                    ..stroke
                });
                self.stroke(pixmap, pb.finish(), style.stroke, outline);
            }
            Shape::Polygon { points, .. } => {
                let Some(first) = points.first() else {
                    return;
                };
                let mut pb = PathBuilder::new();
                pb.move_to(first.x, first.y);
                for point in &points[1..] {
                    pb.line_to(point.x, point.y);
                }
                pb.close();
                self.fill_and_stroke(pixmap, pb.finish(), fill, style.stroke, outline);
            }
            Shape::Path(path) => {
                self.fill_and_stroke(pixmap, build_path(path), fill, style.stroke, outline);
            }
            Shape::Text(text) => {
                trace!("Skipping text element {:?}", text.content);
            }
            Shape::Raster(raster) => draw_raster(pixmap, raster),
        }
    }

    fn fill_and_stroke(
        &self,
        pixmap: &mut Pixmap,
        path: Option<Path>,
        fill: Option<Color32>,
        stroke_color: Color32,
        outline: Option<Stroke>,
    ) {
        let Some(path) = path else {
            return;
        };
        if let Some(fill) = fill {
            pixmap.fill_path(
                &path,
                &self.paint(fill),
                FillRule::EvenOdd,
                Transform::identity(),
                None,
            );
        }
        if let Some(outline) = outline {
            pixmap.stroke_path(
                &path,
                &self.paint(stroke_color),
                &outline,
                Transform::identity(),
                None,
            );
        }
    }

    fn stroke(&self, pixmap: &mut Pixmap, path: Option<Path>, color: Color32, outline: Option<Stroke>) {
        if let (Some(path), Some(outline)) = (path, outline) {
            pixmap.stroke_path(&path, &self.paint(color), &outline, Transform::identity(), None);
        }
    }
}

impl Renderer for SkiaRenderer {
    fn rasterize(&self, scene: &Scene, width: u32, height: u32) -> RgbaImage {
        let Some(mut pixmap) = Pixmap::new(width, height) else {
            return RgbaImage::new(width, height);
        };
        let [r, g, b, a] = self.background.to_srgba_unmultiplied();
        pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));

        for element in scene.elements() {
            self.draw_element(&mut pixmap, element);
        }

        let pixels = pixmap.pixels();
        RgbaImage::from_fn(width, height, |x, y| {
            let color = pixels[(y * width + x) as usize].demultiply();
            Rgba([color.red(), color.green(), color.blue(), color.alpha()])
        })
    }
}

fn skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(rect.min.x, rect.min.y, rect.width(), rect.height())
}

fn skia_cap(cap: LineCap) -> SkiaCap {
    match cap {
        LineCap::Flat => SkiaCap::Butt,
        LineCap::Round => SkiaCap::Round,
        // No pointed cap in tiny-skia, square is the closest extent
        LineCap::Square | LineCap::Triangle => SkiaCap::Square,
    }
}

fn skia_join(join: LineJoin) -> SkiaJoin {
    match join {
        LineJoin::Miter => SkiaJoin::Miter,
        LineJoin::Round => SkiaJoin::Round,
        LineJoin::Bevel => SkiaJoin::Bevel,
    }
}

fn build_path(shape: &PathShape) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for figure in &shape.figures {
        pb.move_to(figure.start.x, figure.start.y);
        for segment in &figure.segments {
            match *segment {
                PathSegment::Line(to) => pb.line_to(to.x, to.y),
                PathSegment::Cubic { ctrl1, ctrl2, to } => {
                    pb.cubic_to(ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y)
                }
            }
        }
        if figure.closed {
            pb.close();
        }
    }
    pb.finish()
}

/// Premultiplied copy of an unmultiplied buffer
fn pixmap_from_image(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Stretch the buffer over the element bounds, nearest-neighbour
fn draw_raster(pixmap: &mut Pixmap, raster: &RasterImage) {
    let Some(source) = pixmap_from_image(raster.pixels()) else {
        return;
    };
    let rect = raster.rect();
    let sx = rect.width() / source.width() as f32;
    let sy = rect.height() / source.height() as f32;
    let paint = PixmapPaint {
        quality: FilterQuality::Nearest,
        ..Default::default()
    };
    pixmap.draw_pixmap(
        0,
        0,
        source.as_ref(),
        &paint,
        Transform::from_row(sx, 0.0, 0.0, sy, rect.min.x, rect.min.y),
        None,
    );
}
