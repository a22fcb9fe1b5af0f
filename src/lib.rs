#![warn(clippy::all, rust_2018_idioms)]

pub mod brush;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod fill;
pub mod geometry;
pub mod history;
pub mod persistence;
pub mod renderer;
pub mod selection;
pub mod snapshot;
pub mod tools;

pub use brush::{BrushEngine, BrushKind};
pub use document::{Scene, SceneChange};
pub use element::{Element, Shape, Style};
pub use error::{PersistenceError, PersistenceResult, RecordError};
pub use event::{EditorEvent, EventBus, EventHandler};
pub use geometry::ShapeKind;
pub use history::{Snapshot, UndoHistory};
pub use persistence::{Layer, Project};
pub use renderer::{Renderer, SkiaRenderer};
pub use selection::{SelectionEngine, SelectionMode, SelectionRegion};
pub use snapshot::ShapeRecord;
pub use tools::{Tool, ToolController, ToolSettings, ToolState};
