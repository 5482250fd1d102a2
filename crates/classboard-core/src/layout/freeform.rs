//! Freeform ("consensus") zones: members keep their own positions.

use super::{Arrangement, LayoutItem};
use crate::config::LayoutConfig;

/// Keep every item where it is and size the zone to fit.
///
/// The zone grows to keep `freeform_margin` below the lowest member. Without a
/// drag in progress it never shrinks; while a member is being dragged the
/// height follows the members, so dragging upward can shrink it.
pub(crate) fn arrange(
    items: &[LayoutItem],
    current_height: Option<f64>,
    dragging: bool,
    config: &LayoutConfig,
) -> Arrangement {
    let lowest = items
        .iter()
        .map(|i| i.rel.y + i.h)
        .fold(0.0_f64, f64::max);
    let needed = lowest + config.freeform_margin;
    let content_height = match current_height {
        Some(h) if !dragging => h.max(needed),
        _ => needed,
    };

    Arrangement {
        positions: items.iter().map(|i| i.rel).collect(),
        content_height,
    }
}
