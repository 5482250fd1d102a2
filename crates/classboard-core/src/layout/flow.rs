//! Row packing for plain and exit-ticket zones.

use super::{Arrangement, LayoutItem};
use crate::config::LayoutConfig;
use kurbo::Point;

/// Pack items left to right, wrapping to a new row when the next item would
/// cross the right padding. An item never wraps while the cursor is at the
/// left edge, so oversized items get a row of their own.
pub(crate) fn arrange(
    items: &[LayoutItem],
    zone_width: f64,
    top: f64,
    config: &LayoutConfig,
) -> Arrangement {
    let right_limit = zone_width - config.padding;
    let mut cursor_x = config.padding;
    let mut cursor_y = top;
    let mut row_height = 0.0_f64;
    let mut positions = Vec::with_capacity(items.len());

    for item in items {
        if cursor_x + item.w > right_limit && cursor_x > config.padding {
            cursor_x = config.padding;
            cursor_y += row_height + config.gap;
            row_height = 0.0;
        }
        positions.push(Point::new(cursor_x, cursor_y));
        cursor_x += item.w + config.gap;
        row_height = row_height.max(item.h);
    }

    Arrangement {
        positions,
        content_height: cursor_y + row_height + config.padding,
    }
}
