//! Sticky notes and image cards.

use super::ObjectBase;
use serde::{Deserialize, Serialize};

/// Default note size.
pub const NOTE_SIZE: f64 = 150.0;

/// Visual category of a note.
///
/// The claim/evidence/reasoning tags double as column hints in CER zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteSubtype {
    #[default]
    Sticky,
    Claim,
    Evidence,
    Reasoning,
    Question,
    Image,
    /// Categories introduced by newer clients.
    #[serde(other)]
    Other,
}

impl NoteSubtype {
    /// Column index in a three-column CER zone.
    pub fn cer_column(self) -> Option<usize> {
        match self {
            NoteSubtype::Claim => Some(0),
            NoteSubtype::Evidence => Some(1),
            NoteSubtype::Reasoning => Some(2),
            _ => None,
        }
    }
}

/// A note on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(flatten)]
    pub base: ObjectBase,
    #[serde(default)]
    pub subtype: NoteSubtype,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl Note {
    /// Create a sticky note at the given position.
    pub fn new(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            base: ObjectBase::new(x, y, NOTE_SIZE, Some(NOTE_SIZE)),
            subtype: NoteSubtype::Sticky,
            text: text.into(),
            image_ref: None,
        }
    }

    /// Builder-style subtype setter.
    pub fn with_subtype(mut self, subtype: NoteSubtype) -> Self {
        self.subtype = subtype;
        self
    }

    /// Builder-style size setter.
    pub fn with_size(mut self, w: f64, h: f64) -> Self {
        self.base.w = w;
        self.base.h = Some(h);
        self
    }
}
