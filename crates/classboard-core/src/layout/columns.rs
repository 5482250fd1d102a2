//! Claim / evidence / reasoning columns.

use super::{Arrangement, LayoutItem};
use crate::config::LayoutConfig;
use kurbo::Point;

pub(crate) const COLUMN_COUNT: usize = 3;

/// Width of one column for a zone of the given width.
pub(crate) fn column_width(zone_width: f64, config: &LayoutConfig) -> f64 {
    ((zone_width - 2.0 * config.padding) / COLUMN_COUNT as f64).max(0.0)
}

/// Column an item belongs to: its semantic tag if any, otherwise
/// `floor(centre / col_width)` on its zone-relative horizontal centre.
pub(crate) fn column_for(item: &LayoutItem, col_width: f64) -> usize {
    if let Some(col) = item.column {
        return col.min(COLUMN_COUNT - 1);
    }
    if col_width <= 0.0 {
        return 0;
    }
    let center = item.rel.x + item.w / 2.0;
    let idx = (center / col_width).floor();
    idx.clamp(0.0, (COLUMN_COUNT - 1) as f64) as usize
}

/// Stack items top to bottom inside their columns.
pub(crate) fn arrange(items: &[LayoutItem], zone_width: f64, config: &LayoutConfig) -> Arrangement {
    let col_width = column_width(zone_width, config);
    let mut cursors = [config.header_height; COLUMN_COUNT];
    let mut bottoms = [config.header_height; COLUMN_COUNT];
    let mut positions = Vec::with_capacity(items.len());

    for item in items {
        let col = column_for(item, col_width);
        let x = config.padding + col as f64 * col_width;
        let y = cursors[col];
        positions.push(Point::new(x, y));
        bottoms[col] = y + item.h;
        cursors[col] = y + item.h + config.gap;
    }

    let tallest = bottoms.iter().copied().fold(config.header_height, f64::max);
    Arrangement {
        positions,
        content_height: tallest + config.padding,
    }
}
