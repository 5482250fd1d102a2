//! The board session: one scene plus its history and outgoing sync queue.
//!
//! Every local mutation follows the same path: change the scene (through
//! [`hierarchy`] for containment and [`layout`] for zone members), record a
//! history snapshot, mark the board dirty for persistence and queue the
//! matching [`SyncMessage`]. Remote messages take a shorter path through
//! [`Board::apply_remote`]: no history, no broadcast.

use crate::arrange::{self, AlignEdge, Axis};
use crate::config::BoardConfig;
use crate::error::BoardResult;
use crate::hierarchy;
use crate::history::History;
use crate::layout::{self, Ghost, LayoutResult};
use crate::objects::{InkStroke, ObjectId, SceneObject, ZoneKind, new_object_id};
use crate::placement::{self, JitterRng, PlacementResult};
use crate::scene::{ActivityMode, SceneSnapshot, SceneStore};
use crate::sync::{self, Outbox, SyncMessage, Transport};
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// The persisted form of a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    #[serde(default)]
    pub ink: Vec<InkStroke>,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub mode: ActivityMode,
    /// Milliseconds since the Unix epoch at export.
    #[serde(default)]
    pub timestamp: u64,
}

impl BoardRecord {
    /// An empty record with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_object_id(),
            name: name.into(),
            objects: Vec::new(),
            ink: Vec::new(),
            viewport: Viewport::default(),
            mode: ActivityMode::default(),
            timestamp: now_millis(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Coordinator for one board.
pub struct Board {
    id: String,
    name: String,
    scene: SceneStore,
    history: History,
    outbox: Outbox,
    config: BoardConfig,
    rng: JitterRng,
    /// Unsaved changes since the last [`Board::take_dirty`].
    dirty: bool,
}

impl Board {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, BoardConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: BoardConfig) -> Self {
        let seed = config
            .jitter_seed
            .unwrap_or_else(|| Uuid::new_v4().as_u128() as u64);
        let scene = SceneStore::new();
        let mut history = History::new(config.history_capacity);
        history.reset(&scene);
        Self {
            id: new_object_id(),
            name: name.into(),
            scene,
            history,
            outbox: Outbox::new(),
            config,
            rng: JitterRng::new(seed),
            dirty: false,
        }
    }

    /// Open a stored board. Nothing is queued for broadcast.
    pub fn from_record(record: BoardRecord, config: BoardConfig) -> Self {
        let mut board = Self::with_config(record.name.clone(), config);
        board.load_record(record);
        board
    }

    fn load_record(&mut self, record: BoardRecord) {
        self.id = record.id;
        self.name = record.name;
        self.scene.restore(SceneSnapshot {
            objects: record.objects,
            ink: record.ink,
        });
        self.scene.clear_selection();
        self.scene.viewport = record.viewport;
        self.scene.mode = record.mode;
        self.history.reset(&self.scene);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.dirty = true;
    }

    pub fn scene(&self) -> &SceneStore {
        &self.scene
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // --- Queries ---

    pub fn get_object(&self, id: &str) -> Option<&SceneObject> {
        self.scene.get(id)
    }

    pub fn zone_members(&self, zone_id: &str) -> Vec<&SceneObject> {
        hierarchy::zone_members(&self.scene, zone_id)
    }

    /// Layout for a zone without applying it.
    pub fn compute_layout(&self, zone_id: &str, ghost: Option<&Ghost>) -> Option<LayoutResult> {
        layout::preview(&self.scene, zone_id, ghost, &self.config.layout)
    }

    /// Free spot near `target` for an object of `size`, ignoring `exclude`.
    pub fn find_free_space(&mut self, target: Point, size: Size, exclude: Option<&str>) -> PlacementResult {
        let existing = self.scene.rects_except(exclude);
        placement::find_free_space(target, size, &existing, &self.config.placement, &mut self.rng)
    }

    // --- Sync plumbing ---

    fn emit(&mut self, message: SyncMessage) {
        self.outbox.push(message);
    }

    /// Queue a BATCH_UPDATE with the current state of `ids`.
    fn emit_batch(&mut self, ids: &[ObjectId]) {
        let mut seen = HashSet::new();
        let items: Vec<SceneObject> = ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| self.scene.get(id).cloned())
            .collect();
        if !items.is_empty() {
            self.emit(SyncMessage::BatchUpdate { items });
        }
    }

    fn emit_reorder(&mut self, zone_id: &str) {
        let children = self
            .scene
            .get(zone_id)
            .and_then(SceneObject::as_zone)
            .map(|z| z.children.clone());
        if let Some(children) = children {
            self.emit(SyncMessage::ZoneReorder { zone_id: zone_id.to_string(), children });
        }
    }

    /// Take queued messages (drains the queue).
    pub fn take_outgoing(&mut self) -> Vec<SyncMessage> {
        self.outbox.take_outgoing()
    }

    pub fn has_outgoing(&self) -> bool {
        self.outbox.has_outgoing()
    }

    /// Send every queued message through `transport`.
    pub fn flush_to(&mut self, transport: &mut dyn Transport) -> usize {
        self.outbox.flush_to(transport)
    }

    /// Queue the whole scene, e.g. for a peer that just joined.
    pub fn broadcast_full_sync(&mut self) {
        let message = SyncMessage::full_sync(&self.scene);
        self.emit(message);
    }

    // --- Persistence ---

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Return and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn to_record(&self) -> BoardRecord {
        let SceneSnapshot { objects, ink } = self.scene.snapshot();
        BoardRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            objects,
            ink,
            viewport: self.scene.viewport,
            mode: self.scene.mode,
            timestamp: now_millis(),
        }
    }

    /// Replace this board with `record`, start a fresh history and broadcast the result.
    pub fn import_record(&mut self, record: BoardRecord) {
        log::info!("Importing board {} ({} objects)", record.id, record.objects.len());
        self.load_record(record);
        self.dirty = true;
        self.broadcast_full_sync();
    }

    fn commit(&mut self) {
        self.history.push(&self.scene);
        self.dirty = true;
    }

    // --- Mode & viewport (local only) ---

    pub fn mode(&self) -> ActivityMode {
        self.scene.mode
    }

    pub fn set_mode(&mut self, mode: ActivityMode) {
        if self.scene.mode != mode {
            self.scene.mode = mode;
            self.dirty = true;
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.scene.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.scene.viewport = viewport;
        self.dirty = true;
    }

    // --- Layout helpers ---

    /// Re-lay-out `zone_id` and every zone containing it, innermost first.
    ///
    /// Zone members moved by the layout carry their own descendants along.
    /// Returns the ids of everything that changed.
    fn relayout(&mut self, zone_id: &str) -> Vec<ObjectId> {
        self.relayout_from(zone_id, false)
    }

    /// [`Self::relayout`] after a member of `zone_id` was dragged, letting a
    /// freeform zone shrink back to its members. Enclosing zones are not
    /// treated as dragged.
    fn relayout_dragged(&mut self, zone_id: &str) -> Vec<ObjectId> {
        self.relayout_from(zone_id, true)
    }

    fn relayout_from(&mut self, zone_id: &str, dragged: bool) -> Vec<ObjectId> {
        let mut changed = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(zone_id.to_string());
        let mut dragged = dragged;

        while let Some(zone) = current.take() {
            if !visited.insert(zone.clone()) {
                break;
            }
            let nested: Vec<(ObjectId, Point)> = hierarchy::zone_members(&self.scene, &zone)
                .iter()
                .filter(|m| m.is_zone())
                .map(|m| (m.id().to_string(), m.base().origin()))
                .collect();

            let update = if dragged {
                layout::update_after_drag(&mut self.scene, &zone, &self.config.layout)
            } else {
                layout::update(&mut self.scene, &zone, None, &self.config.layout)
            };
            let Some(update) = update else {
                break;
            };
            dragged = false;
            for (member, before) in nested {
                if !update.moved.contains(&member) {
                    continue;
                }
                let Some(after) = self.scene.get(&member).map(|m| m.base().origin()) else {
                    continue;
                };
                let descendants = hierarchy::descendants(&self.scene, &member);
                changed.extend(self.shift_exact(&descendants, after - before));
            }
            changed.extend(update.changed_ids(&zone));
            current = self
                .scene
                .get(&zone)
                .and_then(|z| z.base().parent_zone_id.clone());
        }
        changed
    }

    /// Offset exactly `ids`, without expanding to descendants.
    fn shift_exact(&mut self, ids: &[ObjectId], delta: Vec2) -> Vec<ObjectId> {
        let mut moved = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(obj) = self.scene.get_mut(id) {
                let base = obj.base_mut();
                base.x += delta.x;
                base.y += delta.y;
                moved.push(id.clone());
            }
        }
        moved
    }

    /// Offset `roots` and everything they contain.
    fn shift(&mut self, roots: &[ObjectId], delta: Vec2) -> Vec<ObjectId> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for root in roots {
            let expanded =
                std::iter::once(root.clone()).chain(hierarchy::descendants(&self.scene, root));
            for id in expanded {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }
        self.shift_exact(&ids, delta)
    }

    /// Re-lay-out the parents of `ids` that were not moved themselves.
    fn relayout_parents(
        &mut self,
        ids: &[ObjectId],
        moved: &[ObjectId],
        dragged: bool,
    ) -> Vec<ObjectId> {
        let mut parents = Vec::new();
        for id in ids {
            if let Some(parent) = self.scene.get(id).and_then(|o| o.base().parent_zone_id.clone()) {
                if !moved.contains(&parent) && !parents.contains(&parent) {
                    parents.push(parent);
                }
            }
        }
        parents.iter().flat_map(|p| self.relayout_from(p, dragged)).collect()
    }

    /// Existing, unlocked ids with their bounds, minus anything inside another listed zone.
    fn arrangeable(&self, ids: &[ObjectId]) -> Vec<(ObjectId, Rect)> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        ids.iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| self.scene.get(id))
            .filter(|obj| !obj.base().locked)
            .filter(|obj| !self.has_ancestor_in(obj.id(), &wanted))
            .map(|obj| (obj.id().to_string(), obj.bounds()))
            .collect()
    }

    fn has_ancestor_in(&self, id: &str, set: &HashSet<&str>) -> bool {
        let mut visited = HashSet::new();
        let mut current = self.scene.get(id).and_then(|o| o.base().parent_zone_id.as_deref());
        while let Some(parent) = current {
            if set.contains(parent) {
                return true;
            }
            if !visited.insert(parent) {
                return false;
            }
            current = self.scene.get(parent).and_then(|o| o.base().parent_zone_id.as_deref());
        }
        false
    }

    fn apply_deltas(&mut self, deltas: Vec<(ObjectId, Vec2)>) -> bool {
        if deltas.is_empty() {
            return false;
        }
        let mut changed = Vec::new();
        for (id, delta) in &deltas {
            changed.extend(self.shift(std::slice::from_ref(id), *delta));
        }
        let roots: Vec<ObjectId> = deltas.into_iter().map(|(id, _)| id).collect();
        let reflowed = self.relayout_parents(&roots, &changed, false);
        changed.extend(reflowed);
        self.commit();
        self.emit_batch(&changed);
        true
    }

    // --- Creation & editing ---

    /// Add a new top-level object under a fresh id and return the id.
    ///
    /// With `place`, the object is moved to the nearest free spot around its
    /// requested position first.
    pub fn add_object(&mut self, object: SceneObject, place: bool) -> ObjectId {
        let mut object = object;
        object.regenerate_id();
        object.base_mut().parent_zone_id = None;
        if let Some(zone) = object.as_zone_mut() {
            zone.children.clear();
        }
        if place {
            let base = object.base();
            let size = Size::new(base.w, base.height());
            let result = self.find_free_space(base.origin(), size, None);
            let base = object.base_mut();
            base.x = result.point.x;
            base.y = result.point.y;
        }
        if !self.scene.is_empty() {
            object.base_mut().z_order = self.scene.max_z() + 1;
        }

        let id = object.id().to_string();
        self.scene.insert(object.clone());
        self.commit();
        self.emit(SyncMessage::AddItem { item: object });
        log::debug!("Added {}", id);
        id
    }

    /// Add a new object directly into a zone, appended to its members.
    /// Returns None if `zone_id` is not a zone.
    pub fn add_to_zone(&mut self, object: SceneObject, zone_id: &str) -> Option<ObjectId> {
        if !self.scene.get(zone_id).is_some_and(SceneObject::is_zone) {
            log::debug!("add_to_zone: {} is not a zone", zone_id);
            return None;
        }
        let mut object = object;
        object.regenerate_id();
        object.base_mut().parent_zone_id = None;
        if let Some(zone) = object.as_zone_mut() {
            zone.children.clear();
        }
        let id = object.id().to_string();
        self.scene.insert(object);
        hierarchy::link(&mut self.scene, &id, zone_id, None);
        let changed = self.relayout(zone_id);
        self.commit();

        if let Some(item) = self.scene.get(&id).cloned() {
            self.emit(SyncMessage::AddItem { item });
        }
        self.emit_reorder(zone_id);
        let others: Vec<ObjectId> = changed.into_iter().filter(|c| *c != id).collect();
        self.emit_batch(&others);
        Some(id)
    }

    /// Overwrite an object's content by id.
    ///
    /// Containment is kept from the stored copy; use the zone operations to
    /// change it. The kind must match. Returns false if nothing was replaced.
    pub fn update_object(&mut self, object: SceneObject) -> bool {
        let id = object.id().to_string();
        let Some(current) = self.scene.get(&id) else {
            log::debug!("update_object: unknown id {}", id);
            return false;
        };
        if current.kind_name() != object.kind_name() {
            log::warn!("Refusing to change {} from {} to {}", id, current.kind_name(), object.kind_name());
            return false;
        }
        let parent = current.base().parent_zone_id.clone();
        let children = current.as_zone().map(|z| z.children.clone());

        let mut object = object;
        object.base_mut().parent_zone_id = parent.clone();
        if let (Some(zone), Some(children)) = (object.as_zone_mut(), children) {
            zone.children = children;
        }
        self.scene.replace(object);

        let mut changed = Vec::new();
        if self.scene.get(&id).is_some_and(SceneObject::is_zone) {
            changed.extend(self.relayout(&id));
        } else if let Some(parent) = parent {
            changed.extend(self.relayout(&parent));
        }
        self.commit();

        if let Some(note) = self.scene.get(&id).cloned() {
            self.emit(SyncMessage::NoteUpdate { note });
        }
        let others: Vec<ObjectId> = changed.into_iter().filter(|c| *c != id).collect();
        self.emit_batch(&others);
        true
    }

    /// Move objects by an offset. Zones bring their members; locked objects stay.
    ///
    /// Members of laid-out zones are re-flowed afterwards, so within a flow or
    /// column zone a move only sticks for freeform zones, which then resize to
    /// fit and may shrink. Returns changed ids.
    pub fn move_objects(&mut self, ids: &[ObjectId], dx: f64, dy: f64) -> Vec<ObjectId> {
        let mut seen = HashSet::new();
        let roots: Vec<ObjectId> = ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter(|id| self.scene.get(id).is_some_and(|o| !o.base().locked))
            .cloned()
            .collect();
        if roots.is_empty() {
            return Vec::new();
        }

        let mut changed = self.shift(&roots, Vec2::new(dx, dy));
        let reflowed = self.relayout_parents(&roots, &changed, true);
        changed.extend(reflowed);
        self.commit();
        self.emit_batch(&changed);
        changed
    }

    // --- Zones ---

    /// Move `id` into `zone_id` at the slot under `point`.
    ///
    /// Freeform zones keep the object where it was dropped, with `point` as its
    /// new top-left, and resize to fit. Both the old and new zone are re-laid-out.
    pub fn drop_into_zone(&mut self, id: &str, zone_id: &str, point: Point) -> bool {
        let Some(zone) = self.scene.get(zone_id).and_then(SceneObject::as_zone) else {
            return false;
        };
        let freeform = zone.zone_kind == ZoneKind::Freeform;
        if !self.scene.get(id).is_some_and(|o| !o.base().locked) {
            return false;
        }
        let index = {
            let members = hierarchy::zone_members(&self.scene, zone_id);
            layout::insertion_index(&members, point, Some(id))
        };
        let old_parent = self.scene.get(id).and_then(|o| o.base().parent_zone_id.clone());

        if !hierarchy::link(&mut self.scene, id, zone_id, Some(index)) {
            return false;
        }
        let mut changed = vec![id.to_string()];
        if freeform {
            if let Some(origin) = self.scene.get(id).map(|o| o.base().origin()) {
                changed.extend(self.shift(&[id.to_string()], point - origin));
            }
        }
        let old_parent = old_parent.filter(|p| p != zone_id);
        if let Some(old) = &old_parent {
            changed.extend(self.relayout(old));
        }
        changed.extend(self.relayout_dragged(zone_id));
        self.commit();

        if let Some(old) = &old_parent {
            self.emit_reorder(old);
        }
        self.emit_reorder(zone_id);
        self.emit_batch(&changed);
        true
    }

    /// Take `id` out of its zone; it keeps its current position.
    pub fn remove_from_zone(&mut self, id: &str) -> bool {
        let Some(parent) = self.scene.get(id).and_then(|o| o.base().parent_zone_id.clone()) else {
            return false;
        };
        hierarchy::unlink(&mut self.scene, id);
        let mut changed = vec![id.to_string()];
        changed.extend(self.relayout(&parent));
        self.commit();

        self.emit_reorder(&parent);
        self.emit_batch(&changed);
        true
    }

    /// Where the zone's members would go if `id` were dropped at `point`.
    /// Nothing in the scene changes.
    pub fn preview_drop(&self, id: &str, zone_id: &str, point: Point) -> Option<LayoutResult> {
        let object = self.scene.get(id)?;
        self.scene.get(zone_id)?.as_zone()?;
        let members = hierarchy::zone_members(&self.scene, zone_id);
        let index = layout::insertion_index(&members, point, Some(id));

        let mut ghost = object.clone();
        ghost.base_mut().x = point.x;
        ghost.base_mut().y = point.y;
        let ghost = Ghost { object: ghost, index };
        layout::preview(&self.scene, zone_id, Some(&ghost), &self.config.layout)
    }

    // --- Deletion ---

    /// Delete `ids` with their group closure. Zones release their members.
    /// Returns the deleted ids.
    pub fn delete_many(&mut self, ids: &[ObjectId]) -> Vec<ObjectId> {
        let outcome = hierarchy::delete_many(&mut self.scene, ids);
        if outcome.deleted.is_empty() {
            return Vec::new();
        }
        for id in &outcome.deleted {
            self.emit(SyncMessage::DeleteNote { id: id.clone() });
        }
        let mut changed = hierarchy::prune_singleton_groups(&mut self.scene);
        for zone in &outcome.parent_zones {
            changed.extend(self.relayout(zone));
        }
        self.commit();
        self.emit_batch(&changed);
        log::debug!(
            "Deleted {} objects, orphaned {}",
            outcome.deleted.len(),
            outcome.orphaned.len()
        );
        outcome.deleted
    }

    pub fn delete_selection(&mut self) -> Vec<ObjectId> {
        let selected = self.scene.selected_ids();
        self.delete_many(&selected)
    }

    // --- Groups ---

    /// Tag at least two existing objects with a fresh group id.
    pub fn group(&mut self, ids: &[ObjectId]) -> Option<String> {
        let mut seen = HashSet::new();
        let members: Vec<ObjectId> = ids
            .iter()
            .filter(|id| self.scene.contains(id) && seen.insert(id.as_str()))
            .cloned()
            .collect();
        if members.len() < 2 {
            return None;
        }
        let group_id = new_object_id();
        for id in &members {
            if let Some(obj) = self.scene.get_mut(id) {
                obj.base_mut().group_id = Some(group_id.clone());
            }
        }
        // Regrouping can leave a single member behind in an old group.
        let cleared = hierarchy::prune_singleton_groups(&mut self.scene);
        self.commit();
        self.emit(SyncMessage::GroupItems { ids: members, group_id: group_id.clone() });
        self.emit_batch(&cleared);
        Some(group_id)
    }

    pub fn ungroup(&mut self, group_id: &str) -> bool {
        let members = self.scene.group_members(group_id);
        if members.is_empty() {
            return false;
        }
        for id in &members {
            if let Some(obj) = self.scene.get_mut(id) {
                obj.base_mut().group_id = None;
            }
        }
        self.commit();
        self.emit(SyncMessage::UngroupItems { group_id: group_id.to_string() });
        true
    }

    // --- Arrange ---

    pub fn align(&mut self, ids: &[ObjectId], edge: AlignEdge) -> bool {
        let items = self.arrangeable(ids);
        if items.len() < 2 {
            return false;
        }
        self.apply_deltas(arrange::align_deltas(&items, edge))
    }

    pub fn distribute(&mut self, ids: &[ObjectId], axis: Axis) -> bool {
        let items = self.arrangeable(ids);
        self.apply_deltas(arrange::distribute_deltas(&items, axis))
    }

    /// Raise objects above everything else, keeping their relative order.
    pub fn bring_to_front(&mut self, ids: &[ObjectId]) -> bool {
        let ordered = self.by_z(ids);
        let top = self.scene.max_z();
        self.restack(ordered, |i| top + 1 + i as i64)
    }

    /// Lower objects below everything else, keeping their relative order.
    pub fn send_to_back(&mut self, ids: &[ObjectId]) -> bool {
        let ordered = self.by_z(ids);
        let bottom = self.scene.min_z() - ordered.len() as i64;
        self.restack(ordered, |i| bottom + i as i64)
    }

    fn by_z(&self, ids: &[ObjectId]) -> Vec<ObjectId> {
        self.scene
            .objects_by_z()
            .into_iter()
            .filter(|o| ids.iter().any(|id| id == o.id()))
            .map(|o| o.id().to_string())
            .collect()
    }

    fn restack(&mut self, ordered: Vec<ObjectId>, z_for: impl Fn(usize) -> i64) -> bool {
        if ordered.is_empty() {
            return false;
        }
        for (i, id) in ordered.iter().enumerate() {
            if let Some(obj) = self.scene.get_mut(id) {
                obj.base_mut().z_order = z_for(i);
            }
        }
        self.commit();
        self.emit_batch(&ordered);
        true
    }

    // --- Selection (local only) ---

    /// Replace the selection with `id`.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.scene.contains(id) {
            return false;
        }
        self.scene.clear_selection();
        self.scene.select(id)
    }

    pub fn add_to_selection(&mut self, id: &str) -> bool {
        self.scene.select(id)
    }

    pub fn clear_selection(&mut self) {
        self.scene.clear_selection();
    }

    /// Replace the selection with `id` and everything grouped with it.
    pub fn select_with_groups(&mut self, id: &str) -> Vec<ObjectId> {
        let closure = hierarchy::group_closure(&self.scene, &[id.to_string()]);
        if closure.is_empty() {
            return closure;
        }
        self.scene.clear_selection();
        for member in &closure {
            self.scene.select(member);
        }
        closure
    }

    pub fn selected_ids(&self) -> Vec<ObjectId> {
        self.scene.selected_ids()
    }

    // --- Ink ---

    pub fn add_ink(&mut self, stroke: InkStroke) -> bool {
        if !self.scene.add_ink(stroke.clone()) {
            return false;
        }
        self.commit();
        self.emit(SyncMessage::InkAdd { ink: stroke });
        true
    }

    /// Remove every stroke with a point within `radius` of `point`.
    pub fn erase_ink(&mut self, point: Point, radius: f64) -> usize {
        let removed = self.scene.remove_ink_where(|s| s.touches(point, radius));
        if removed > 0 {
            self.commit();
            self.broadcast_full_sync();
        }
        removed
    }

    pub fn clear_ink(&mut self) -> usize {
        let removed = self.scene.remove_ink_where(|_| true);
        if removed > 0 {
            self.commit();
            self.broadcast_full_sync();
        }
        removed
    }

    // --- History ---

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.scene) {
            return false;
        }
        log::info!("Undo to snapshot {}", self.history.index());
        self.dirty = true;
        self.broadcast_full_sync();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo(&mut self.scene) {
            return false;
        }
        log::info!("Redo to snapshot {}", self.history.index());
        self.dirty = true;
        self.broadcast_full_sync();
        true
    }

    // --- Inbound ---

    /// Decode and apply a JSON message from a peer.
    ///
    /// Malformed input is logged and dropped; the error is returned for the
    /// caller's information only and the scene is untouched.
    pub fn handle_message(&mut self, json: &str) -> BoardResult<bool> {
        match SyncMessage::from_json(json) {
            Ok(message) => Ok(self.apply_remote(message)),
            Err(e) => {
                log::warn!("Dropping malformed sync message: {}", e);
                Err(e.into())
            }
        }
    }

    /// Apply a peer's message. Never queues anything for broadcast and does
    /// not record history. Returns true if the scene changed.
    pub fn apply_remote(&mut self, message: SyncMessage) -> bool {
        let kind = message.type_name();
        let changed = sync::apply(&mut self.scene, message);
        if changed {
            self.dirty = true;
        }
        log::debug!("Applied remote {} (changed: {})", kind, changed);
        changed
    }
}
