//! Board configuration.
//!
//! Every field has a default matching the classroom board's behaviour, so a
//! config file only needs the values it overrides.

use crate::error::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};

/// Maximum number of undo snapshots to keep.
pub const MAX_UNDO_HISTORY: usize = 20;

/// Spacing and sizing used by the zone layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Inner margin between the zone edge and its members.
    pub padding: f64,
    /// Space between neighbouring members.
    pub gap: f64,
    /// Height reserved for the zone title bar.
    pub header_height: f64,
    /// Extra header space for the exit-ticket prompt strip.
    pub exit_ticket_header: f64,
    /// Zones never shrink below this height.
    pub min_zone_height: f64,
    /// Height changes at or below this are ignored.
    pub height_debounce: f64,
    /// Free space kept below the lowest member of a freeform zone.
    pub freeform_margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: 20.0,
            gap: 15.0,
            header_height: 50.0,
            exit_ticket_header: 40.0,
            min_zone_height: 300.0,
            height_debounce: 2.0,
            freeform_margin: 50.0,
        }
    }
}

/// Parameters for collision-free placement of new objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlacementConfig {
    /// Clearance required around a new object.
    pub padding: f64,
    /// Spiral steps tried before falling back to jitter.
    pub max_attempts: usize,
    /// Maximum jitter on each axis for the fallback.
    pub jitter: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            padding: 10.0,
            max_attempts: 150,
            jitter: 20.0,
        }
    }
}

/// Top-level configuration for a [`crate::Board`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardConfig {
    pub layout: LayoutConfig,
    pub placement: PlacementConfig,
    /// Undo snapshots retained, including the current state.
    pub history_capacity: usize,
    /// Fixed seed for placement jitter. Random when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter_seed: Option<u64>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            placement: PlacementConfig::default(),
            history_capacity: MAX_UNDO_HISTORY,
            jitter_seed: None,
        }
    }
}

impl BoardConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> BoardResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BoardError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> BoardResult<()> {
        if self.history_capacity == 0 {
            return Err(BoardError::Config("historyCapacity must be at least 1".into()));
        }
        let l = &self.layout;
        let spacing = [
            ("padding", l.padding),
            ("gap", l.gap),
            ("headerHeight", l.header_height),
            ("exitTicketHeader", l.exit_ticket_header),
            ("heightDebounce", l.height_debounce),
            ("freeformMargin", l.freeform_margin),
            ("placement.padding", self.placement.padding),
            ("placement.jitter", self.placement.jitter),
        ];
        if let Some((name, _)) = spacing.iter().find(|(_, v)| !(*v >= 0.0)) {
            return Err(BoardError::Config(format!("{name} must be a non-negative number")));
        }
        if !(l.min_zone_height > 0.0) {
            return Err(BoardError::Config("minZoneHeight must be positive".into()));
        }
        Ok(())
    }
}
