//! The scene aggregate: objects, ink, selection, activity mode and viewport.

use crate::objects::{InkStroke, ObjectId, SceneObject};
use crate::viewport::Viewport;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// What pointer input currently does on this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityMode {
    /// Select, move and edit objects.
    #[default]
    Edit,
    /// Read-only presentation.
    Present,
    /// Pointer draws ink.
    Draw,
}

/// A structural copy of the undoable part of the scene.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Objects in insertion order.
    pub objects: Vec<SceneObject>,
    pub ink: Vec<InkStroke>,
}

/// The scene owned by one board session.
///
/// Object ids are unique: `insert` refuses duplicates. Removal of objects that
/// may participate in containment goes through [`crate::hierarchy`].
#[derive(Debug, Clone, Default)]
pub struct SceneStore {
    objects: HashMap<ObjectId, SceneObject>,
    /// Insertion order, used for deterministic iteration and snapshots.
    order: Vec<ObjectId>,
    ink: Vec<InkStroke>,
    selection: HashSet<ObjectId>,
    pub mode: ActivityMode,
    pub viewport: Viewport,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object. Returns false (and leaves the scene untouched) if the id is taken.
    pub fn insert(&mut self, object: SceneObject) -> bool {
        let id = object.id().to_string();
        if self.objects.contains_key(&id) {
            return false;
        }
        self.order.push(id.clone());
        self.objects.insert(id, object);
        true
    }

    /// Overwrite an existing object by id. Returns false if the id is unknown.
    pub fn replace(&mut self, object: SceneObject) -> bool {
        match self.objects.get_mut(object.id()) {
            Some(existing) => {
                *existing = object;
                true
            }
            None => false,
        }
    }

    /// Remove an object without touching containment or groups.
    pub(crate) fn remove_raw(&mut self, id: &str) -> Option<SceneObject> {
        let removed = self.objects.remove(id)?;
        self.order.retain(|o| o != id);
        self.selection.remove(id);
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut SceneObject> {
        self.objects.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }

    /// Objects in insertion order.
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Objects sorted back to front by `zOrder`, ties broken by insertion order.
    pub fn objects_by_z(&self) -> Vec<&SceneObject> {
        let mut sorted: Vec<&SceneObject> = self.objects().collect();
        sorted.sort_by_key(|o| o.base().z_order);
        sorted
    }

    pub fn ids(&self) -> &[ObjectId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Ids of all objects carrying the given group tag.
    pub fn group_members(&self, group_id: &str) -> Vec<ObjectId> {
        self.objects()
            .filter(|o| o.base().group_id.as_deref() == Some(group_id))
            .map(|o| o.id().to_string())
            .collect()
    }

    /// Bounding boxes of every object except `exclude`.
    pub fn rects_except(&self, exclude: Option<&str>) -> Vec<Rect> {
        self.objects()
            .filter(|o| Some(o.id()) != exclude)
            .map(|o| o.bounds())
            .collect()
    }

    /// Highest `zOrder` in the scene, or 0 when empty.
    pub fn max_z(&self) -> i64 {
        self.objects.values().map(|o| o.base().z_order).max().unwrap_or(0)
    }

    pub fn min_z(&self) -> i64 {
        self.objects.values().map(|o| o.base().z_order).min().unwrap_or(0)
    }

    // --- Ink ---

    pub fn ink(&self) -> &[InkStroke] {
        &self.ink
    }

    /// Append a stroke. Returns false if a stroke with that id already exists.
    pub fn add_ink(&mut self, stroke: InkStroke) -> bool {
        if self.ink.iter().any(|s| s.id == stroke.id) {
            return false;
        }
        self.ink.push(stroke);
        true
    }

    /// Remove every stroke matching the predicate. Returns the number removed.
    pub fn remove_ink_where(&mut self, mut pred: impl FnMut(&InkStroke) -> bool) -> usize {
        let before = self.ink.len();
        self.ink.retain(|s| !pred(s));
        before - self.ink.len()
    }

    // --- Selection ---

    pub fn selection(&self) -> &HashSet<ObjectId> {
        &self.selection
    }

    /// Add an id to the selection if it resolves.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.objects.contains_key(id) {
            return false;
        }
        self.selection.insert(id.to_string());
        true
    }

    pub fn deselect(&mut self, id: &str) {
        self.selection.remove(id);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    /// Selected ids in insertion order.
    pub fn selected_ids(&self) -> Vec<ObjectId> {
        self.order
            .iter()
            .filter(|id| self.selection.contains(*id))
            .cloned()
            .collect()
    }

    // --- Snapshots ---

    /// Deep copy of objects and ink.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            objects: self.objects().cloned().collect(),
            ink: self.ink.clone(),
        }
    }

    /// Replace objects and ink wholesale. Selection entries that no longer
    /// resolve are dropped. Duplicate ids keep their first occurrence.
    pub fn restore(&mut self, snapshot: SceneSnapshot) {
        self.objects.clear();
        self.order.clear();
        for object in snapshot.objects {
            if !self.insert(object) {
                log::warn!("Dropping duplicate object id while restoring scene");
            }
        }
        self.ink = snapshot.ink;
        let objects = &self.objects;
        self.selection.retain(|id| objects.contains_key(id));
    }
}
