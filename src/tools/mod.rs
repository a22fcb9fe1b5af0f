use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

use crate::brush::BrushKind;
use crate::geometry::ShapeKind;
use crate::selection::SelectionMode;

mod controller;

pub use controller::ToolController;

/// Tools the pointer can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
    Shape,
    Brush,
    Fill,
    Select,
    Text,
    Magnifier,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pencil => "Pencil",
            Tool::Eraser => "Eraser",
            Tool::Shape => "Shape",
            Tool::Brush => "Brush",
            Tool::Fill => "Fill",
            Tool::Select => "Select",
            Tool::Text => "Text",
            Tool::Magnifier => "Magnifier",
        }
    }
}

/// Zoom step of one magnifier click, in percent
pub const ZOOM_STEP: i32 = 10;

/// Distance under which a stroke's ends are joined on release
pub const AUTO_CLOSE_DISTANCE: f32 = 10.0;

/// Text placed by the text tool, waiting for the host to supply the string
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraft {
    pub origin: Pos2,
    pub content: String,
}

/// Gesture state of the controller
#[derive(Debug, Clone, PartialEq)]
pub enum ToolState {
    Idle,
    DrawingStroke {
        /// Scene index of the growing stroke; `None` for scatter brushes
        live: Option<usize>,
        brush: bool,
    },
    DrawingShape {
        index: usize,
        kind: ShapeKind,
        start: Pos2,
        last: Pos2,
    },
    Selecting,
    DraggingSelection,
    EditingText(TextDraft),
}

impl ToolState {
    pub fn name(&self) -> &'static str {
        match self {
            ToolState::Idle => "Idle",
            ToolState::DrawingStroke { .. } => "DrawingStroke",
            ToolState::DrawingShape { .. } => "DrawingShape",
            ToolState::Selecting => "Selecting",
            ToolState::DraggingSelection => "DraggingSelection",
            ToolState::EditingText(_) => "EditingText",
        }
    }
}

/// User-adjustable tool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub tool: Tool,
    pub shape: ShapeKind,
    pub brush: BrushKind,
    pub selection_mode: SelectionMode,
    pub color: Color32,
    pub thickness: f32,
    pub font_family: String,
    pub font_size: f32,
    pub background: Color32,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Pencil,
            shape: ShapeKind::Rectangle,
            brush: BrushKind::Basic,
            selection_mode: SelectionMode::Rectangle,
            color: Color32::BLACK,
            thickness: 2.0,
            font_family: "Arial".to_owned(),
            font_size: 16.0,
            background: Color32::WHITE,
            canvas_width: 1000,
            canvas_height: 600,
        }
    }
}
