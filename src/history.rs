use log::debug;

use crate::document::Scene;

/// Full deep copy of the document at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub scene: Scene,
    pub width: u32,
    pub height: u32,
}

impl Snapshot {
    pub fn new(scene: Scene, width: u32, height: u32) -> Self {
        Self {
            scene,
            width,
            height,
        }
    }
}

/// Two-stack snapshot history.
///
/// The top of `undo_stack` is always the current state, and the stack is never
/// empty: the state the history was created with stays at the bottom.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl UndoHistory {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            undo_stack: vec![initial],
            redo_stack: Vec::new(),
        }
    }

    /// Record a new current state and drop everything that could be redone.
    /// Pushes are unconditional, callers skip no-op gestures themselves.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();
        debug!("History push, {} undo entries", self.undo_stack.len());
    }

    /// Step back. Returns the state to restore, or `None` when only the initial
    /// snapshot is left.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.undo_stack.len() <= 1 {
            return None;
        }
        let current = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        self.undo_stack.last()
    }

    /// Step forward. Returns the state to restore, or `None` when nothing was undone.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(next);
        self.undo_stack.last()
    }

    /// Drop all history and start over from `initial`
    pub fn reset(&mut self, initial: Snapshot) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undo_stack.push(initial);
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.undo_stack.last()
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
}
