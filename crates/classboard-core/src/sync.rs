//! Peer synchronisation contract.
//!
//! The board emits [`SyncMessage`]s into an [`Outbox`]; a [`Transport`] carries
//! them to other peers, which feed them to [`apply`]. Conflicts resolve by
//! arrival order: the last message applied for an id wins.

use crate::hierarchy;
use crate::objects::{InkStroke, ObjectId, SceneObject};
use crate::scene::{SceneSnapshot, SceneStore};
use serde::{Deserialize, Serialize};

/// Messages exchanged between peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncMessage {
    /// Insert an object if its id is not present yet.
    AddItem { item: SceneObject },
    /// Remove one object. The sender has already expanded groups.
    DeleteNote { id: ObjectId },
    /// Overwrite one object by id.
    NoteUpdate { note: SceneObject },
    /// Append an ink stroke.
    InkAdd { ink: InkStroke },
    /// Overwrite several objects by id.
    BatchUpdate { items: Vec<SceneObject> },
    /// Replace a zone's member order.
    #[serde(rename_all = "camelCase")]
    ZoneReorder { zone_id: ObjectId, children: Vec<ObjectId> },
    /// Tag objects with a shared group id.
    #[serde(rename_all = "camelCase")]
    GroupItems { ids: Vec<ObjectId>, group_id: String },
    /// Clear a group tag wherever it appears.
    #[serde(rename_all = "camelCase")]
    UngroupItems { group_id: String },
    /// Replace all objects and ink.
    FullSync {
        objects: Vec<SceneObject>,
        ink: Vec<InkStroke>,
    },
}

impl SyncMessage {
    /// Wire discriminator, for logging.
    pub fn type_name(&self) -> &'static str {
        match self {
            SyncMessage::AddItem { .. } => "ADD_ITEM",
            SyncMessage::DeleteNote { .. } => "DELETE_NOTE",
            SyncMessage::NoteUpdate { .. } => "NOTE_UPDATE",
            SyncMessage::InkAdd { .. } => "INK_ADD",
            SyncMessage::BatchUpdate { .. } => "BATCH_UPDATE",
            SyncMessage::ZoneReorder { .. } => "ZONE_REORDER",
            SyncMessage::GroupItems { .. } => "GROUP_ITEMS",
            SyncMessage::UngroupItems { .. } => "UNGROUP_ITEMS",
            SyncMessage::FullSync { .. } => "FULL_SYNC",
        }
    }

    pub fn full_sync(scene: &SceneStore) -> Self {
        let SceneSnapshot { objects, ink } = scene.snapshot();
        SyncMessage::FullSync { objects, ink }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Delivery to remote peers.
///
/// `broadcast` is fire-and-forget. Implementations must not route a message
/// back into the board that produced it: messages handed to
/// [`crate::Board::apply_remote`] are never re-broadcast, so a transport that
/// echoes would only cause redundant re-application, never a loop.
pub trait Transport {
    fn broadcast(&mut self, message: &SyncMessage);
}

/// Outgoing messages waiting for the transport.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    pending: Vec<SyncMessage>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: SyncMessage) {
        log::debug!("Queued {}", message.type_name());
        self.pending.push(message);
    }

    /// Take pending messages (drains the queue).
    pub fn take_outgoing(&mut self) -> Vec<SyncMessage> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_outgoing(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Hand every pending message to `transport`, in order. Returns how many were sent.
    pub fn flush_to(&mut self, transport: &mut dyn Transport) -> usize {
        let messages = self.take_outgoing();
        for message in &messages {
            transport.broadcast(message);
        }
        messages.len()
    }
}

/// Apply a remote message to `scene`. Returns true if the scene changed.
///
/// Unknown ids are skipped. Containment fields carried by incoming objects are
/// applied through [`hierarchy`], so both sides of every link stay in step even
/// when messages arrive out of order.
pub fn apply(scene: &mut SceneStore, message: SyncMessage) -> bool {
    match message {
        SyncMessage::AddItem { item } => insert_linked(scene, item),
        SyncMessage::DeleteNote { id } => {
            if !scene.contains(&id) {
                log::debug!("DELETE_NOTE for unknown id {}", id);
                return false;
            }
            hierarchy::detach(scene, &id);
            scene.remove_raw(&id).is_some()
        }
        SyncMessage::NoteUpdate { note } => replace_linked(scene, note),
        SyncMessage::InkAdd { ink } => scene.add_ink(ink),
        SyncMessage::BatchUpdate { items } => {
            let mut changed = false;
            for item in items {
                changed |= replace_linked(scene, item);
            }
            changed
        }
        SyncMessage::ZoneReorder { zone_id, children } => {
            let before = zone_children(scene, &zone_id);
            hierarchy::reorder_children(scene, &zone_id, &children)
                && zone_children(scene, &zone_id) != before
        }
        SyncMessage::GroupItems { ids, group_id } => {
            let mut changed = false;
            for id in &ids {
                if let Some(obj) = scene.get_mut(id) {
                    let base = obj.base_mut();
                    if base.group_id.as_deref() != Some(group_id.as_str()) {
                        base.group_id = Some(group_id.clone());
                        changed = true;
                    }
                }
            }
            changed
        }
        SyncMessage::UngroupItems { group_id } => {
            let members = scene.group_members(&group_id);
            for id in &members {
                if let Some(obj) = scene.get_mut(id) {
                    obj.base_mut().group_id = None;
                }
            }
            !members.is_empty()
        }
        SyncMessage::FullSync { objects, ink } => {
            scene.restore(SceneSnapshot { objects, ink });
            true
        }
    }
}

fn zone_children(scene: &SceneStore, zone_id: &str) -> Option<Vec<ObjectId>> {
    scene.get(zone_id).and_then(SceneObject::as_zone).map(|z| z.children.clone())
}

/// Split an object into its bare form and the containment it asks for.
fn strip_links(mut object: SceneObject) -> (SceneObject, Option<ObjectId>, Option<Vec<ObjectId>>) {
    let parent = object.base_mut().parent_zone_id.take();
    let children = object.as_zone_mut().map(|z| std::mem::take(&mut z.children));
    (object, parent, children)
}

fn insert_linked(scene: &mut SceneStore, item: SceneObject) -> bool {
    let id = item.id().to_string();
    let (bare, parent, children) = strip_links(item);
    if !scene.insert(bare) {
        log::debug!("ADD_ITEM for existing id {}", id);
        return false;
    }
    if let Some(children) = children {
        hierarchy::reorder_children(scene, &id, &children);
    }
    if let Some(parent) = parent {
        hierarchy::link(scene, &id, &parent, None);
    }
    true
}

fn replace_linked(scene: &mut SceneStore, item: SceneObject) -> bool {
    let id = item.id().to_string();
    let Some(current) = scene.get(&id) else {
        log::debug!("Update for unknown id {}", id);
        return false;
    };
    if *current == item {
        return false;
    }
    let was_zone = current.is_zone();
    let (mut bare, parent, children) = strip_links(item);
    if was_zone && !bare.is_zone() {
        hierarchy::detach(scene, &id);
    }

    // Swap the payload in with the links currently in the store, then move
    // the links through the hierarchy to what the sender had.
    let old_parent = scene.get(&id).and_then(|o| o.base().parent_zone_id.clone());
    let kept_children = scene
        .get(&id)
        .and_then(SceneObject::as_zone)
        .map(|z| z.children.clone())
        .unwrap_or_default();
    bare.base_mut().parent_zone_id = old_parent.clone();
    if let Some(zone) = bare.as_zone_mut() {
        zone.children = kept_children;
    }
    scene.replace(bare);

    if parent != old_parent {
        match &parent {
            Some(p) => {
                hierarchy::link(scene, &id, p, None);
            }
            None => {
                hierarchy::unlink(scene, &id);
            }
        }
    }
    if let Some(children) = children {
        hierarchy::reorder_children(scene, &id, &children);
    }
    true
}
