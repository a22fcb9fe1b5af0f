use egui::Rect;

use crate::document::SceneChange;
use crate::tools::Tool;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    SceneChanged(SceneChange),
    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
    },
    SelectionChanged {
        bounds: Option<Rect>,
    },
    /// Magnifier click, delta in percent
    ZoomRequested {
        delta: i32,
    },
    CanvasResized {
        width: u32,
        height: u32,
    },
    ToolChanged(Tool),
}
