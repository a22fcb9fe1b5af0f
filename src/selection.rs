//! Rectangle and lasso selections, floating drags and crop.
//!
//! A selection turns into a floating raster on the first drag move: the
//! rendered pixels under the region are copied into a raster element placed on
//! top of the scene, with an opaque backing shape beneath it covering the hole.

use egui::{Color32, Pos2, Rect, Vec2, pos2};
use image::{RgbaImage, imageops};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::document::{Scene, SceneChange};
use crate::element::{Element, PolygonKind, RasterImage, Shape, Style, factory};
use crate::geometry::{point_in_polygon, point_in_rect};
use crate::renderer::Renderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionMode {
    #[default]
    Rectangle,
    Freeform,
}

/// Area picked by the select tool
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionRegion {
    /// Axis-aligned box grown from a fixed anchor corner
    Rect { anchor: Pos2, current: Pos2 },
    /// Closed lasso outline
    Freeform(Vec<Pos2>),
}

impl SelectionRegion {
    pub fn start(mode: SelectionMode, pos: Pos2) -> Self {
        match mode {
            SelectionMode::Rectangle => SelectionRegion::Rect {
                anchor: pos,
                current: pos,
            },
            SelectionMode::Freeform => SelectionRegion::Freeform(vec![pos]),
        }
    }

    pub fn grow(&mut self, pos: Pos2) {
        match self {
            SelectionRegion::Rect { current, .. } => *current = pos,
            SelectionRegion::Freeform(points) => {
                if points.last() != Some(&pos) {
                    points.push(pos);
                }
            }
        }
    }

    /// Exact bounds, without the 1x1 floor applied to elements
    pub fn bounds(&self) -> Rect {
        match self {
            SelectionRegion::Rect { anchor, current } => Rect::from_two_pos(*anchor, *current),
            SelectionRegion::Freeform(points) => {
                let Some(first) = points.first() else {
                    return Rect::from_min_max(Pos2::ZERO, Pos2::ZERO);
                };
                points
                    .iter()
                    .fold(Rect::from_min_max(*first, *first), |rect, p| {
                        rect.union(Rect::from_min_max(*p, *p))
                    })
            }
        }
    }

    /// Large enough to act on: at least 1x1, and more than two lasso points
    pub fn is_active(&self) -> bool {
        let bounds = self.bounds();
        let big_enough = bounds.width() >= 1.0 && bounds.height() >= 1.0;
        match self {
            SelectionRegion::Rect { .. } => big_enough,
            SelectionRegion::Freeform(points) => big_enough && points.len() > 2,
        }
    }

    /// Containment test, even-odd for lassos. Used both for drag hit tests and
    /// for masking floating lasso pixels.
    pub fn contains(&self, pos: Pos2) -> bool {
        match self {
            SelectionRegion::Rect { .. } => point_in_rect(pos, self.bounds()),
            SelectionRegion::Freeform(points) => point_in_polygon(pos, points),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            SelectionRegion::Rect { anchor, current } => {
                *anchor += delta;
                *current += delta;
            }
            SelectionRegion::Freeform(points) => {
                for point in points {
                    *point += delta;
                }
            }
        }
    }
}

/// Integer pixel box covering `rect`, clamped to the canvas.
/// Returns `(x, y, width, height)`, or `None` when nothing is left.
pub fn pixel_bounds(rect: Rect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let clamp = |v: f32, max: u32| v.clamp(0.0, max as f32) as u32;
    let x0 = clamp(rect.min.x.floor(), width);
    let y0 = clamp(rect.min.y.floor(), height);
    let x1 = clamp(rect.max.x.ceil(), width);
    let y1 = clamp(rect.max.y.ceil(), height);
    (x1 > x0 && y1 > y0).then(|| (x0, y0, x1 - x0, y1 - y0))
}

/// Copy of the canvas under `region`.
///
/// Rectangles are cut as the whole covering pixel box, the same box their
/// backing fills. For lassos, pixels whose centre fails the containment test
/// become fully transparent.
pub fn masked_cutout(canvas: &RgbaImage, region: &SelectionRegion) -> Option<(RgbaImage, Pos2)> {
    let (x0, y0, w, h) = pixel_bounds(region.bounds(), canvas.width(), canvas.height())?;
    let mut cutout = imageops::crop_imm(canvas, x0, y0, w, h).to_image();
    let origin = pos2(x0 as f32, y0 as f32);
    if matches!(region, SelectionRegion::Rect { .. }) {
        return Some((cutout, origin));
    }
    for (x, y, pixel) in cutout.enumerate_pixels_mut() {
        let center = pos2((x0 + x) as f32 + 0.5, (y0 + y) as f32 + 0.5);
        if !region.contains(center) {
            pixel.0[3] = 0;
        }
    }
    Some((cutout, origin))
}

/// Result of releasing a selection drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// The floating pixels moved, the scene needs a history entry
    Moved,
    /// Extracted in this drag but never moved, the extraction was undone
    Discarded,
    Unchanged,
}

#[derive(Debug, Clone, Copy)]
struct SelectionDrag {
    start: Pos2,
    last: Pos2,
    /// Raster origin when the drag started, set once the raster exists
    origin: Option<Pos2>,
    extracted: bool,
}

/// Selection state of the select tool
#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    pub mode: SelectionMode,
    region: Option<SelectionRegion>,
    /// Scene index of the floating raster; its backing sits right below it
    floating: Option<usize>,
    drag: Option<SelectionDrag>,
    crop_armed: bool,
}

impl SelectionEngine {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn region(&self) -> Option<&SelectionRegion> {
        self.region.as_ref()
    }

    pub fn has_selection(&self) -> bool {
        self.region.as_ref().is_some_and(SelectionRegion::is_active)
    }

    /// Bounds of the active selection
    pub fn bounds(&self) -> Option<Rect> {
        self.region
            .as_ref()
            .filter(|region| region.is_active())
            .map(SelectionRegion::bounds)
    }

    pub fn is_floating(&self) -> bool {
        self.floating.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_crop_armed(&self) -> bool {
        self.crop_armed
    }

    /// The next completed selection crops the canvas
    pub fn arm_crop(&mut self) {
        self.crop_armed = true;
    }

    pub fn disarm_crop(&mut self) {
        self.crop_armed = false;
    }

    /// Whether a press at `pos` should drag the current selection
    pub fn hit(&self, pos: Pos2) -> bool {
        self.region
            .as_ref()
            .is_some_and(|region| region.is_active() && region.contains(pos))
    }

    /// Forget the region. A floating raster stays in the scene where it is.
    pub fn clear(&mut self) {
        self.region = None;
        self.floating = None;
        self.drag = None;
    }

    pub fn begin_selection(&mut self, pos: Pos2) {
        self.clear();
        self.region = Some(SelectionRegion::start(self.mode, pos));
    }

    pub fn grow(&mut self, pos: Pos2) {
        if let Some(region) = &mut self.region {
            region.grow(pos);
        }
    }

    /// Finalize the region on pointer-up. Returns whether a usable selection
    /// remains; degenerate regions are dropped.
    pub fn finish_selection(&mut self) -> bool {
        if self.has_selection() {
            debug!("Selection finished at {:?}", self.bounds());
            true
        } else {
            self.region = None;
            false
        }
    }

    pub fn begin_drag(&mut self, pos: Pos2) {
        self.drag = Some(SelectionDrag {
            start: pos,
            last: pos,
            origin: None,
            extracted: false,
        });
    }

    /// Move the floating pixels to follow the pointer, extracting them first
    /// if this is the first move.
    pub fn drag_to(
        &mut self,
        scene: &mut Scene,
        renderer: &dyn Renderer,
        canvas: (u32, u32),
        pos: Pos2,
        backing: Color32,
    ) -> Vec<SceneChange> {
        let Some(mut drag) = self.drag else {
            return Vec::new();
        };
        let mut changes = Vec::new();

        if self.floating.is_none() {
            changes = self.extract(scene, renderer, canvas, backing);
            if self.floating.is_none() {
                return changes;
            }
            drag.extracted = true;
        }
        let Some(index) = self.floating else {
            return changes;
        };
        let Some(Shape::Raster(raster)) = scene.get_mut(index).map(|element| &mut element.shape)
        else {
            // The raster went away under us, nothing left to drag
            self.floating = None;
            return changes;
        };
        let origin = *drag.origin.get_or_insert(raster.origin);
        raster.origin = origin + (pos - drag.start);
        drag.last = pos;
        self.drag = Some(drag);
        changes.push(SceneChange::ContentChanged { index });
        changes
    }

    /// Release the drag. A net move translates the region along with the pixels.
    pub fn end_drag(&mut self, scene: &mut Scene) -> (DragOutcome, Vec<SceneChange>) {
        let Some(drag) = self.drag.take() else {
            return (DragOutcome::Unchanged, Vec::new());
        };
        let delta = drag.last - drag.start;
        if delta != Vec2::ZERO {
            if let Some(region) = &mut self.region {
                region.translate(delta);
            }
            return (DragOutcome::Moved, Vec::new());
        }
        if !drag.extracted {
            return (DragOutcome::Unchanged, Vec::new());
        }

        let mut changes = Vec::new();
        if let Some(index) = self.floating.take() {
            changes.extend(scene.remove(index));
            if index > 0 {
                changes.extend(scene.remove(index - 1));
            }
        }
        debug!("Zero-distance drag, floating selection discarded");
        (DragOutcome::Discarded, changes)
    }

    fn extract(
        &mut self,
        scene: &mut Scene,
        renderer: &dyn Renderer,
        (width, height): (u32, u32),
        backing: Color32,
    ) -> Vec<SceneChange> {
        let Some(region) = self.region.as_ref().filter(|region| region.is_active()) else {
            return Vec::new();
        };
        let canvas = renderer.rasterize(scene, width, height);
        let Some((cutout, origin)) = masked_cutout(&canvas, region) else {
            return Vec::new();
        };

        let backing_shape = match region {
            SelectionRegion::Rect { .. } => Shape::Rect {
                origin,
                size: Vec2::new(cutout.width() as f32, cutout.height() as f32),
            },
            SelectionRegion::Freeform(points) => Shape::Polygon {
                points: points.clone(),
                kind: PolygonKind::Custom,
            },
        };
        info!(
            "Floating selection extracted, {}x{} at {origin:?}",
            cutout.width(),
            cutout.height()
        );
        let changes = vec![
            scene.append(Element::new(backing_shape, Style::filled(backing))),
            scene.append(factory::create_image(cutout, origin)),
        ];
        self.floating = Some(scene.len() - 1);
        changes
    }

    /// Replace the scene with the rendered pixels under the selection.
    /// Returns the new canvas size, or `None` when there is nothing to crop.
    pub fn crop(
        &mut self,
        scene: &mut Scene,
        renderer: &dyn Renderer,
        (width, height): (u32, u32),
    ) -> Option<(SceneChange, u32, u32)> {
        let bounds = self.bounds()?;
        let (x, y, w, h) = pixel_bounds(bounds, width, height)?;
        let canvas = renderer.rasterize(scene, width, height);
        let cropped = imageops::crop_imm(&canvas, x, y, w, h).to_image();
        let change = scene.replace_with(vec![Element::new(
            Shape::Raster(RasterImage::new(Pos2::ZERO, cropped)),
            Style::stroke(Color32::TRANSPARENT, 0.0),
        )]);
        self.clear();
        self.crop_armed = false;
        info!("Cropped canvas to {w}x{h} at ({x}, {y})");
        Some((change, w, h))
    }
}
