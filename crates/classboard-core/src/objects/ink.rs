//! Freehand ink strokes.

use super::{ObjectId, new_object_id};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A freehand stroke (series of points).
///
/// Strokes are append-only for their author; erasing removes whole strokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InkStroke {
    pub id: ObjectId,
    /// Points in the stroke path.
    pub points: Vec<Point>,
    pub color: String,
    pub width: f64,
}

impl InkStroke {
    /// Create an empty stroke.
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            id: new_object_id(),
            points: Vec::new(),
            color: color.into(),
            width,
        }
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<Point>, color: impl Into<String>, width: f64) -> Self {
        Self {
            id: new_object_id(),
            points,
            color: color.into(),
            width,
        }
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of the stroke's points, if any.
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.points.first()?;
        Some(
            self.points
                .iter()
                .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p)),
        )
    }

    /// Check if any point of the stroke lies within `radius` of `center`.
    pub fn touches(&self, center: Point, radius: f64) -> bool {
        let r2 = radius * radius;
        self.points.iter().any(|p| {
            let dx = p.x - center.x;
            let dy = p.y - center.y;
            dx * dx + dy * dy <= r2
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touches() {
        let stroke = InkStroke::from_points(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
            "#000",
            2.0,
        );
        assert!(stroke.touches(Point::new(12.0, 0.0), 5.0));
        assert!(!stroke.touches(Point::new(50.0, 50.0), 5.0));
    }

    #[test]
    fn test_bounds() {
        let mut stroke = InkStroke::new("#f00", 3.0);
        assert!(stroke.bounds().is_none());
        stroke.add_point(Point::new(5.0, 5.0));
        stroke.add_point(Point::new(-5.0, 20.0));
        assert_eq!(stroke.bounds(), Some(Rect::new(-5.0, 5.0, 5.0, 20.0)));
    }

    #[test]
    fn test_point_wire_format() {
        let stroke = InkStroke::from_points(vec![Point::new(1.0, 2.0)], "#000", 1.0);
        let json = serde_json::to_value(&stroke).unwrap();
        assert_eq!(json["points"][0]["x"], 1.0);
        assert_eq!(json["points"][0]["y"], 2.0);
    }
}
