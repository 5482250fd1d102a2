//! Snapshot-based linear undo/redo.
//!
//! Each entry is a full structural copy of objects and ink. The entry at
//! `index` always mirrors the live scene after the last push/undo/redo.

use crate::config::MAX_UNDO_HISTORY;
use crate::scene::{SceneSnapshot, SceneStore};

#[derive(Debug, Clone)]
pub struct History {
    stack: Vec<SceneSnapshot>,
    index: usize,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_UNDO_HISTORY)
    }
}

impl History {
    /// Create an empty history holding at most `capacity` snapshots.
    pub fn new(capacity: usize) -> Self {
        Self {
            stack: Vec::new(),
            index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record the current scene.
    ///
    /// No-op if it equals the snapshot at the current index. Otherwise the redo
    /// branch is discarded and the snapshot appended; past capacity the oldest
    /// entry is dropped. Returns true if a snapshot was recorded.
    pub fn push(&mut self, scene: &SceneStore) -> bool {
        let snapshot = scene.snapshot();
        if self.stack.get(self.index) == Some(&snapshot) {
            return false;
        }

        if !self.stack.is_empty() {
            self.stack.truncate(self.index + 1);
        }
        self.stack.push(snapshot);
        if self.stack.len() > self.capacity {
            self.stack.remove(0);
        }
        self.index = self.stack.len() - 1;
        true
    }

    /// Step back one snapshot and restore it into `scene`.
    /// Returns false if nothing to undo.
    pub fn undo(&mut self, scene: &mut SceneStore) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.index -= 1;
        scene.restore(self.stack[self.index].clone());
        true
    }

    /// Step forward one snapshot and restore it into `scene`.
    /// Returns false if nothing to redo.
    pub fn redo(&mut self, scene: &mut SceneStore) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.index += 1;
        scene.restore(self.stack[self.index].clone());
        true
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.stack.len()
    }

    /// Drop all entries and start over from the current scene.
    pub fn reset(&mut self, scene: &SceneStore) {
        self.stack.clear();
        self.index = 0;
        self.push(scene);
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
