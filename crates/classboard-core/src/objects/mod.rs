//! Scene object definitions for the board.

mod ink;
mod note;
mod widgets;
mod zone;

pub use ink::InkStroke;
pub use note::{Note, NoteSubtype};
pub use widgets::{DataSeries, Graph, Poll, PollOption, Spinner};
pub use zone::{Zone, ZoneKind};

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for scene objects and ink strokes.
///
/// Ids are opaque strings so peers running other clients can mint their own.
pub type ObjectId = String;

/// Height used for layout and hit-testing when an object has no explicit height.
pub const AUTO_HEIGHT_FALLBACK: f64 = 100.0;

/// Generate a fresh object id.
pub fn new_object_id() -> ObjectId {
    Uuid::new_v4().to_string()
}

/// Fields shared by every scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectBase {
    pub id: ObjectId,
    /// Scene-space left edge.
    pub x: f64,
    /// Scene-space top edge.
    pub y: f64,
    pub w: f64,
    /// `None` for auto-height containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(default)]
    pub z_order: i64,
    /// Co-selection / co-deletion tag. Never implies co-movement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub locked: bool,
    /// Back-reference to the zone listing this object in its children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_zone_id: Option<ObjectId>,
}

impl ObjectBase {
    /// Create a base with a fresh id at the given position and size.
    pub fn new(x: f64, y: f64, w: f64, h: Option<f64>) -> Self {
        Self {
            id: new_object_id(),
            x,
            y,
            w,
            h,
            z_order: 0,
            group_id: None,
            locked: false,
            parent_zone_id: None,
        }
    }

    /// Height used for layout, falling back for auto-height objects.
    pub fn height(&self) -> f64 {
        self.h.unwrap_or(AUTO_HEIGHT_FALLBACK)
    }

    /// Bounding box in scene coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.height())
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Enum wrapper for all object kinds (the `kind` field on the wire).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SceneObject {
    Note(Note),
    Zone(Zone),
    Poll(Poll),
    Spinner(Spinner),
    Graph(Graph),
}

impl SceneObject {
    pub fn base(&self) -> &ObjectBase {
        match self {
            SceneObject::Note(o) => &o.base,
            SceneObject::Zone(o) => &o.base,
            SceneObject::Poll(o) => &o.base,
            SceneObject::Spinner(o) => &o.base,
            SceneObject::Graph(o) => &o.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut ObjectBase {
        match self {
            SceneObject::Note(o) => &mut o.base,
            SceneObject::Zone(o) => &mut o.base,
            SceneObject::Poll(o) => &mut o.base,
            SceneObject::Spinner(o) => &mut o.base,
            SceneObject::Graph(o) => &mut o.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn bounds(&self) -> Rect {
        self.base().bounds()
    }

    /// The wire name of this object's kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SceneObject::Note(_) => "note",
            SceneObject::Zone(_) => "zone",
            SceneObject::Poll(_) => "poll",
            SceneObject::Spinner(_) => "spinner",
            SceneObject::Graph(_) => "graph",
        }
    }

    /// Check if this object is a zone.
    pub fn is_zone(&self) -> bool {
        matches!(self, SceneObject::Zone(_))
    }

    pub fn as_zone(&self) -> Option<&Zone> {
        match self {
            SceneObject::Zone(z) => Some(z),
            _ => None,
        }
    }

    pub fn as_zone_mut(&mut self) -> Option<&mut Zone> {
        match self {
            SceneObject::Zone(z) => Some(z),
            _ => None,
        }
    }

    pub fn as_note(&self) -> Option<&Note> {
        match self {
            SceneObject::Note(n) => Some(n),
            _ => None,
        }
    }

    /// Semantic column for claim/evidence/reasoning layouts, if the object carries one.
    pub fn semantic_column(&self) -> Option<usize> {
        self.as_note().and_then(|n| n.subtype.cer_column())
    }

    /// Replace the id with a fresh one. Used when creating or duplicating objects.
    pub fn regenerate_id(&mut self) {
        self.base_mut().id = new_object_id();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_wire_format() {
        let mut note = Note::new(10.0, 20.0, "hello");
        note.base.id = "n1".to_string();
        note.base.group_id = Some("g1".to_string());
        let json = serde_json::to_value(SceneObject::Note(note)).unwrap();

        assert_eq!(json["kind"], "note");
        assert_eq!(json["id"], "n1");
        assert_eq!(json["groupId"], "g1");
        assert_eq!(json["zOrder"], 0);
        assert!(json.get("parentZoneId").is_none());
    }

    #[test]
    fn test_zone_from_wire() {
        let json = r#"{
            "kind": "zone", "id": "z1", "x": 0, "y": 0, "w": 600,
            "title": "Exit ticket", "zoneKind": "exitTicket", "children": ["a", "b"]
        }"#;
        let obj: SceneObject = serde_json::from_str(json).unwrap();
        let zone = obj.as_zone().unwrap();

        assert_eq!(zone.zone_kind, ZoneKind::ExitTicket);
        assert_eq!(zone.children, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(obj.base().h, None);
        assert!(!obj.base().locked);
    }

    #[test]
    fn test_auto_height_bounds() {
        let base = ObjectBase::new(0.0, 0.0, 50.0, None);
        assert_eq!(base.bounds().height(), AUTO_HEIGHT_FALLBACK);
    }

    #[test]
    fn test_regenerate_id() {
        let mut obj = SceneObject::Note(Note::new(0.0, 0.0, ""));
        let before = obj.id().to_string();
        obj.regenerate_id();
        assert_ne!(before, obj.id());
    }
}
