use std::path::Path;

use egui::{Color32, Modifiers, Pos2};
use image::{RgbaImage, imageops};
use log::{debug, info, warn};

use super::{AUTO_CLOSE_DISTANCE, TextDraft, Tool, ToolSettings, ToolState, ZOOM_STEP};
use crate::brush::{BrushEngine, BrushKind};
use crate::document::{Scene, SceneChange};
use crate::element::{Element, Style, factory};
use crate::error::PersistenceResult;
use crate::event::{EditorEvent, EventBus, EventHandler};
use crate::fill;
use crate::geometry::ShapeKind;
use crate::history::{Snapshot, UndoHistory};
use crate::persistence::{self, Layer, Project};
use crate::renderer::{Renderer, SkiaRenderer};
use crate::selection::{DragOutcome, SelectionEngine, SelectionMode};
use crate::snapshot::{self, ShapeRecord};

/// Pointer-gesture state machine over one document.
///
/// Owns the scene, its undo history and all live gesture state. Every edit
/// that completes a gesture pushes exactly one history snapshot.
pub struct ToolController {
    scene: Scene,
    history: UndoHistory,
    selection: SelectionEngine,
    brush: BrushEngine,
    settings: ToolSettings,
    state: ToolState,
    canvas_width: u32,
    canvas_height: u32,
    renderer: Box<dyn Renderer>,
    events: EventBus,
}

impl std::fmt::Debug for ToolController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolController")
            .field("elements", &self.scene.len())
            .field("state", &self.state.name())
            .field("tool", &self.settings.tool)
            .field("canvas", &(self.canvas_width, self.canvas_height))
            .field("undo_len", &self.history.undo_len())
            .field("redo_len", &self.history.redo_len())
            .finish()
    }
}

impl Default for ToolController {
    fn default() -> Self {
        Self::new(ToolSettings::default())
    }
}

impl ToolController {
    pub fn new(settings: ToolSettings) -> Self {
        let renderer = Box::new(SkiaRenderer::new(settings.background));
        Self::with_renderer(settings, renderer)
    }

    pub fn with_renderer(settings: ToolSettings, renderer: Box<dyn Renderer>) -> Self {
        let canvas_width = settings.canvas_width.max(1);
        let canvas_height = settings.canvas_height.max(1);
        let scene = Scene::new();
        Self {
            history: UndoHistory::new(Snapshot::new(scene.clone(), canvas_width, canvas_height)),
            scene,
            selection: SelectionEngine::new(settings.selection_mode),
            brush: BrushEngine::new(),
            settings,
            state: ToolState::Idle,
            canvas_width,
            canvas_height,
            renderer,
            events: EventBus::new(),
        }
    }

    /// Seed the brush jitter so scatter brushes are reproducible
    pub fn with_brush_seed(mut self, seed: u64) -> Self {
        self.brush = BrushEngine::with_seed(seed);
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    pub fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Register an observer for editor events
    pub fn subscribe(&self, handler: impl EventHandler + 'static) {
        self.events.subscribe(Box::new(handler));
    }

    fn emit_changes(&self, changes: impl IntoIterator<Item = SceneChange>) {
        self.events
            .emit_all(changes.into_iter().map(EditorEvent::SceneChanged));
    }

    fn emit_history(&self) {
        self.events.emit(EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn emit_selection(&self) {
        self.events.emit(EditorEvent::SelectionChanged {
            bounds: self.selection.bounds(),
        });
    }

    fn push_history(&mut self) {
        self.history.push(Snapshot::new(
            self.scene.clone(),
            self.canvas_width,
            self.canvas_height,
        ));
        self.emit_history();
    }

    fn resize_canvas(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.canvas_width, self.canvas_height) {
            return;
        }
        self.canvas_width = width;
        self.canvas_height = height;
        self.events.emit(EditorEvent::CanvasResized { width, height });
    }

    fn drop_selection(&mut self) {
        let had_selection = self.selection.region().is_some();
        self.selection.clear();
        if had_selection {
            self.emit_selection();
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.drop_selection();
        let change = self.scene.replace_with(snapshot.scene.into_elements());
        self.resize_canvas(snapshot.width, snapshot.height);
        self.emit_changes([change]);
    }

    /// Close any open gesture or text draft before a host operation
    fn settle(&mut self) {
        match self.state {
            ToolState::Idle => {}
            ToolState::EditingText(_) => self.commit_pending_text(),
            _ => self.pointer_up(),
        }
    }

    // ---------------------------------------------------------------------
    // Pointer events

    pub fn pointer_down(&mut self, pos: Pos2, modifiers: Modifiers) {
        self.settle();
        let color = self.settings.color;
        let thickness = self.settings.thickness;
        debug!("{} down at {pos:?}", self.settings.tool.name());

        match self.settings.tool {
            Tool::Pencil => self.begin_stroke(pos, color, thickness),
            Tool::Eraser => self.begin_stroke(pos, self.settings.background, thickness * 2.0),
            Tool::Shape => {
                let kind = self.settings.shape;
                let element = Element::new(kind.build(pos, pos), Style::stroke(color, thickness));
                let change = self.scene.append(element);
                self.state = ToolState::DrawingShape {
                    index: self.scene.len() - 1,
                    kind,
                    start: pos,
                    last: pos,
                };
                self.emit_changes([change]);
            }
            Tool::Brush => {
                let changes =
                    self.brush
                        .begin(&mut self.scene, self.settings.brush, pos, color, thickness);
                self.state = ToolState::DrawingStroke {
                    live: None,
                    brush: true,
                };
                self.emit_changes(changes);
            }
            Tool::Fill => {
                self.fill_at(pos);
            }
            Tool::Select => {
                if self.selection.hit(pos) {
                    self.selection.begin_drag(pos);
                    self.state = ToolState::DraggingSelection;
                } else {
                    self.selection.begin_selection(pos);
                    self.state = ToolState::Selecting;
                    self.emit_selection();
                }
            }
            Tool::Text => {
                self.state = ToolState::EditingText(TextDraft {
                    origin: pos,
                    content: String::new(),
                });
            }
            Tool::Magnifier => {
                let delta = if modifiers.shift { -ZOOM_STEP } else { ZOOM_STEP };
                self.events.emit(EditorEvent::ZoomRequested { delta });
            }
        }
    }

    fn begin_stroke(&mut self, pos: Pos2, color: Color32, thickness: f32) {
        let change = self
            .scene
            .append(factory::create_stroke(vec![pos], thickness, color));
        self.state = ToolState::DrawingStroke {
            live: Some(self.scene.len() - 1),
            brush: false,
        };
        self.emit_changes([change]);
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        match &mut self.state {
            ToolState::Idle | ToolState::EditingText(_) => {}
            ToolState::DrawingStroke { live, brush } => {
                if *brush {
                    let changes = self.brush.update(&mut self.scene, pos);
                    self.emit_changes(changes);
                } else if let Some(index) = *live {
                    if let Some(points) = self.scene.get_mut(index).and_then(Element::stroke_points_mut)
                    {
                        points.push(pos);
                        self.emit_changes([SceneChange::ContentChanged { index }]);
                    }
                }
            }
            ToolState::DrawingShape {
                index,
                kind,
                start,
                last,
            } => {
                *last = pos;
                let (index, shape) = (*index, kind.build(*start, pos));
                if let Some(element) = self.scene.get_mut(index) {
                    element.shape = shape;
                    self.emit_changes([SceneChange::ContentChanged { index }]);
                }
            }
            ToolState::Selecting => {
                self.selection.grow(pos);
                self.events.emit(EditorEvent::SelectionChanged {
                    bounds: self.selection.region().map(|region| region.bounds()),
                });
            }
            ToolState::DraggingSelection => {
                let changes = self.selection.drag_to(
                    &mut self.scene,
                    self.renderer.as_ref(),
                    (self.canvas_width, self.canvas_height),
                    pos,
                    self.settings.background,
                );
                self.emit_changes(changes);
            }
        }
    }

    pub fn pointer_up(&mut self) {
        let state = std::mem::replace(&mut self.state, ToolState::Idle);
        match state {
            ToolState::Idle => {}
            ToolState::EditingText(draft) => {
                // The press that opened the draft; keep editing.
                self.state = ToolState::EditingText(draft);
            }
            ToolState::DrawingStroke { live, brush } => {
                let live = if brush { self.brush.end() } else { live };
                if let Some(index) = live {
                    self.auto_close(index);
                }
                self.push_history();
            }
            ToolState::DrawingShape {
                index, start, last, ..
            } => {
                if start == last {
                    debug!("Shape gesture without extent discarded");
                    let change = self.scene.remove(index);
                    self.emit_changes(change);
                } else {
                    self.push_history();
                }
            }
            ToolState::Selecting => {
                let active = self.selection.finish_selection();
                self.emit_selection();
                if active && self.selection.is_crop_armed() {
                    self.crop_now();
                }
            }
            ToolState::DraggingSelection => {
                let (outcome, changes) = self.selection.end_drag(&mut self.scene);
                self.emit_changes(changes);
                if outcome == DragOutcome::Moved {
                    self.push_history();
                }
                self.emit_selection();
            }
        }
    }

    /// Join a stroke whose ends nearly meet
    fn auto_close(&mut self, index: usize) {
        let Some(points) = self.scene.get_mut(index).and_then(Element::stroke_points_mut) else {
            return;
        };
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return;
        };
        if points.len() > 2 && first.distance(last) < AUTO_CLOSE_DISTANCE {
            points.push(first);
            self.emit_changes([SceneChange::ContentChanged { index }]);
        }
    }

    fn fill_at(&mut self, pos: Pos2) -> bool {
        let Some(change) = fill::flood_fill(
            &mut self.scene,
            self.renderer.as_ref(),
            self.canvas_width,
            self.canvas_height,
            pos,
            self.settings.color,
        ) else {
            return false;
        };
        self.drop_selection();
        self.emit_changes([change]);
        self.push_history();
        true
    }

    // ---------------------------------------------------------------------
    // History

    pub fn undo(&mut self) {
        self.settle();
        let Some(snapshot) = self.history.undo().cloned() else {
            return;
        };
        self.restore(snapshot);
        self.emit_history();
    }

    pub fn redo(&mut self) {
        self.settle();
        let Some(snapshot) = self.history.redo().cloned() else {
            return;
        };
        self.restore(snapshot);
        self.emit_history();
    }

    // ---------------------------------------------------------------------
    // Tool settings

    pub fn set_tool(&mut self, tool: Tool) {
        self.settle();
        if tool != Tool::Select {
            self.selection.disarm_crop();
            self.drop_selection();
        }
        if self.settings.tool != tool {
            self.settings.tool = tool;
            info!("Tool changed to {}", tool.name());
            self.events.emit(EditorEvent::ToolChanged(tool));
        }
    }

    /// Pick a shape; this also activates the shape tool
    pub fn set_shape(&mut self, shape: ShapeKind) {
        self.settings.shape = shape;
        self.set_tool(Tool::Shape);
    }

    /// Pick a brush; this also activates the brush tool
    pub fn set_brush(&mut self, brush: BrushKind) {
        self.settings.brush = brush;
        self.set_tool(Tool::Brush);
    }

    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.settings.selection_mode = mode;
        self.selection.mode = mode;
    }

    pub fn set_color(&mut self, color: Color32) {
        self.settings.color = color;
    }

    pub fn set_thickness(&mut self, thickness: f32) {
        if thickness.is_finite() && thickness > 0.0 {
            self.settings.thickness = thickness;
        } else {
            warn!("Ignoring invalid thickness {thickness}");
        }
    }

    pub fn set_font(&mut self, family: impl Into<String>, size: f32) {
        self.settings.font_family = family.into();
        if size.is_finite() && size > 0.0 {
            self.settings.font_size = size;
        } else {
            warn!("Ignoring invalid font size {size}");
        }
    }

    // ---------------------------------------------------------------------
    // Selection and canvas

    pub fn clear_selection(&mut self) {
        self.drop_selection();
    }

    /// Switch to the select tool; the next finished selection crops
    pub fn begin_crop_mode(&mut self) {
        self.set_tool(Tool::Select);
        self.selection.arm_crop();
    }

    /// Crop to the active selection, or arm crop mode when there is none.
    /// Returns whether the canvas was cropped.
    pub fn crop_selection(&mut self) -> bool {
        self.settle();
        if self.selection.has_selection() {
            self.crop_now()
        } else {
            self.begin_crop_mode();
            false
        }
    }

    fn crop_now(&mut self) -> bool {
        let Some((change, width, height)) = self.selection.crop(
            &mut self.scene,
            self.renderer.as_ref(),
            (self.canvas_width, self.canvas_height),
        ) else {
            return false;
        };
        self.emit_changes([change]);
        self.resize_canvas(width, height);
        self.emit_selection();
        self.push_history();
        true
    }

    /// Rotate the whole canvas a quarter turn clockwise
    pub fn rotate_canvas_90(&mut self) {
        self.settle();
        let rotated = imageops::rotate90(&self.render());
        self.drop_selection();
        let (width, height) = rotated.dimensions();
        let change = self
            .scene
            .replace_with(vec![factory::create_image(rotated, Pos2::ZERO)]);
        self.emit_changes([change]);
        self.resize_canvas(width, height);
        info!("Rotated canvas to {width}x{height}");
        self.push_history();
    }

    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.settle();
        let before = self.canvas_size();
        self.resize_canvas(width, height);
        if self.canvas_size() != before {
            self.push_history();
        }
    }

    /// Replace the document with an image at its own size
    pub fn open_image(&mut self, image: RgbaImage) {
        self.settle();
        self.drop_selection();
        let (width, height) = image.dimensions();
        let change = self
            .scene
            .replace_with(vec![factory::create_image(image, Pos2::ZERO)]);
        self.emit_changes([change]);
        self.resize_canvas(width, height);
        self.push_history();
    }

    pub fn clear_canvas(&mut self) {
        self.settle();
        if self.scene.is_empty() {
            return;
        }
        self.drop_selection();
        let change = self.scene.clear();
        self.emit_changes([change]);
        self.push_history();
    }

    /// Rasterize the current scene at canvas size
    pub fn render(&self) -> RgbaImage {
        self.renderer
            .rasterize(&self.scene, self.canvas_width, self.canvas_height)
    }

    // ---------------------------------------------------------------------
    // Text

    /// Replace the text of the open draft
    pub fn update_text(&mut self, text: &str) {
        if let ToolState::EditingText(draft) = &mut self.state {
            draft.content = text.to_owned();
        }
    }

    /// Finish the open draft with `text`
    pub fn commit_text(&mut self, text: &str) {
        self.update_text(text);
        self.commit_pending_text();
    }

    pub fn cancel_text(&mut self) {
        if matches!(self.state, ToolState::EditingText(_)) {
            self.state = ToolState::Idle;
        }
    }

    fn commit_pending_text(&mut self) {
        let ToolState::EditingText(draft) = std::mem::replace(&mut self.state, ToolState::Idle)
        else {
            return;
        };
        if draft.content.trim().is_empty() {
            debug!("Empty text draft discarded");
            return;
        }
        let element = factory::create_text(
            draft.origin,
            draft.content,
            self.settings.font_family.clone(),
            self.settings.font_size,
            self.settings.color,
        );
        let change = self.scene.append(element);
        self.emit_changes([change]);
        self.push_history();
    }

    // ---------------------------------------------------------------------
    // Layers panel

    /// `(index, name)` for every element, bottom first
    pub fn layer_entries(&self) -> Vec<(usize, String)> {
        self.scene
            .elements()
            .iter()
            .enumerate()
            .map(|(index, element)| (index, element.display_name()))
            .collect()
    }

    fn layer_edit(&mut self, edit: impl FnOnce(&mut Scene) -> Option<SceneChange>) -> bool {
        self.settle();
        self.drop_selection();
        let Some(change) = edit(&mut self.scene) else {
            return false;
        };
        self.emit_changes([change]);
        self.push_history();
        true
    }

    pub fn remove_element(&mut self, index: usize) -> bool {
        self.layer_edit(|scene| scene.remove(index))
    }

    pub fn move_element(&mut self, index: usize, new_index: usize) -> bool {
        self.layer_edit(|scene| scene.move_to_index(index, new_index))
    }

    pub fn bring_to_front(&mut self, index: usize) -> bool {
        self.layer_edit(|scene| scene.bring_to_front(index))
    }

    pub fn send_to_back(&mut self, index: usize) -> bool {
        self.layer_edit(|scene| scene.send_to_back(index))
    }

    // ---------------------------------------------------------------------
    // Import / export

    pub fn export_shapes(&self) -> Vec<ShapeRecord> {
        snapshot::export_records(&self.scene)
    }

    /// Replace the scene with the given records; bad records are skipped
    pub fn import_shapes(&mut self, records: Vec<ShapeRecord>) {
        self.settle();
        self.drop_selection();
        let imported = snapshot::import_records(records);
        let change = self.scene.replace_with(imported.into_elements());
        self.emit_changes([change]);
        self.push_history();
    }

    /// The scene as one layer of a project
    pub fn to_project(&self) -> Project {
        Project {
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            layers: vec![Layer::new("Layer 1", self.scene.clone())],
        }
    }

    /// Open a project: visible layers are flattened and history starts over
    pub fn load_project(&mut self, project: &Project) {
        self.settle();
        self.drop_selection();
        let change = self.scene.replace_with(project.flatten().into_elements());
        self.emit_changes([change]);
        self.resize_canvas(project.canvas_width, project.canvas_height);
        self.history.reset(Snapshot::new(
            self.scene.clone(),
            self.canvas_width,
            self.canvas_height,
        ));
        self.emit_history();
    }

    /// Render the canvas into a PNG file
    pub fn save_png(&self, path: impl AsRef<Path>) -> PersistenceResult<()> {
        persistence::save_png(&self.render(), path)
    }
}
