//! Zones: containers that lay out their members.

use super::{ObjectBase, ObjectId};
use serde::{Deserialize, Serialize};

/// Default zone size.
pub const ZONE_WIDTH: f64 = 600.0;
pub const ZONE_HEIGHT: f64 = 400.0;

/// Layout strategy of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoneKind {
    /// Left-to-right row packing.
    #[default]
    Plain,
    /// Claim / evidence / reasoning columns.
    Columns3,
    /// Members keep their own positions ("consensus" board).
    Freeform,
    /// Row packing below a prompt strip.
    ExitTicket,
}

/// A container object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    #[serde(flatten)]
    pub base: ObjectBase,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub zone_kind: ZoneKind,
    /// Member ids in layout order. No duplicates.
    #[serde(default)]
    pub children: Vec<ObjectId>,
}

impl Zone {
    pub fn new(x: f64, y: f64, title: impl Into<String>, zone_kind: ZoneKind) -> Self {
        Self {
            base: ObjectBase::new(x, y, ZONE_WIDTH, Some(ZONE_HEIGHT)),
            title: title.into(),
            zone_kind,
            children: Vec::new(),
        }
    }

    pub fn with_width(mut self, w: f64) -> Self {
        self.base.w = w;
        self
    }

    pub fn contains_child(&self, id: &str) -> bool {
        self.children.iter().any(|c| c == id)
    }

    /// Insert a child at `index` (clamped), skipping duplicates. `None` appends.
    pub(crate) fn insert_child(&mut self, id: ObjectId, index: Option<usize>) {
        if self.contains_child(&id) {
            return;
        }
        let at = index.unwrap_or(self.children.len()).min(self.children.len());
        self.children.insert(at, id);
    }

    /// Remove a child. Returns true if it was present.
    pub(crate) fn remove_child(&mut self, id: &str) -> bool {
        let before = self.children.len();
        self.children.retain(|c| c != id);
        before != self.children.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_child_clamps_and_dedups() {
        let mut zone = Zone::new(0.0, 0.0, "z", ZoneKind::Plain);
        zone.insert_child("a".into(), None);
        zone.insert_child("b".into(), Some(99));
        zone.insert_child("c".into(), Some(0));
        zone.insert_child("a".into(), Some(1));

        assert_eq!(zone.children, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_zone_kind_wire_names() {
        assert_eq!(serde_json::to_string(&ZoneKind::Columns3).unwrap(), "\"columns3\"");
        assert_eq!(serde_json::to_string(&ZoneKind::ExitTicket).unwrap(), "\"exitTicket\"");
    }
}
