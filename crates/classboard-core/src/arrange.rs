//! Align and distribute.
//!
//! Both functions only compute offsets; the board applies them so zones carry
//! their members along.

use crate::objects::ObjectId;
use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Edge or centre line to align to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlignEdge {
    Left,
    Right,
    Top,
    Bottom,
    CenterX,
    CenterY,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Offsets that line every rectangle up on `edge` of their union.
/// Rectangles already in place are left out.
pub fn align_deltas(items: &[(ObjectId, Rect)], edge: AlignEdge) -> Vec<(ObjectId, Vec2)> {
    let Some(union) = items.iter().map(|(_, r)| *r).reduce(|a, b| a.union(b)) else {
        return Vec::new();
    };
    let center = union.center();

    items
        .iter()
        .map(|(id, r)| {
            let delta = match edge {
                AlignEdge::Left => Vec2::new(union.x0 - r.x0, 0.0),
                AlignEdge::Right => Vec2::new(union.x1 - r.x1, 0.0),
                AlignEdge::Top => Vec2::new(0.0, union.y0 - r.y0),
                AlignEdge::Bottom => Vec2::new(0.0, union.y1 - r.y1),
                AlignEdge::CenterX => Vec2::new(center.x - r.center().x, 0.0),
                AlignEdge::CenterY => Vec2::new(0.0, center.y - r.center().y),
            };
            (id.clone(), delta)
        })
        .filter(|(_, d)| d.x.abs() > f64::EPSILON || d.y.abs() > f64::EPSILON)
        .collect()
}

/// Offsets that space rectangles evenly along `axis`.
///
/// The outermost two stay put; the rest are placed so every gap between
/// neighbours is equal. Needs at least three rectangles.
pub fn distribute_deltas(items: &[(ObjectId, Rect)], axis: Axis) -> Vec<(ObjectId, Vec2)> {
    if items.len() < 3 {
        return Vec::new();
    }
    let start = |r: &Rect| match axis {
        Axis::Horizontal => r.x0,
        Axis::Vertical => r.y0,
    };
    let extent = |r: &Rect| match axis {
        Axis::Horizontal => r.width(),
        Axis::Vertical => r.height(),
    };

    let mut sorted: Vec<&(ObjectId, Rect)> = items.iter().collect();
    sorted.sort_by(|a, b| start(&a.1).total_cmp(&start(&b.1)));

    let first = sorted[0].1;
    let last = sorted[sorted.len() - 1].1;
    let span = start(&last) + extent(&last) - start(&first);
    let occupied: f64 = sorted.iter().map(|(_, r)| extent(r)).sum();
    let gap = (span - occupied) / (sorted.len() - 1) as f64;

    let mut cursor = start(&first);
    let mut deltas = Vec::new();
    for (id, rect) in sorted {
        let shift = cursor - start(rect);
        if shift.abs() > f64::EPSILON {
            let delta = match axis {
                Axis::Horizontal => Vec2::new(shift, 0.0),
                Axis::Vertical => Vec2::new(0.0, shift),
            };
            deltas.push((id.clone(), delta));
        }
        cursor += extent(rect) + gap;
    }
    deltas
}
