//! Line drawable.

use super::{DrawableId, DrawableTrait};
use crate::geometry::Segment;
use crate::interchange::Entity;
use crate::style::StrokeOverride;
use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A straight line. The only drawable that takes part in splitting,
/// pruning and deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub(crate) id: DrawableId,
    pub segment: Segment,
    #[serde(default)]
    pub style: StrokeOverride,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self::from_segment(Segment::new(start, end), StrokeOverride::default())
    }

    pub fn from_segment(segment: Segment, style: StrokeOverride) -> Self {
        Self {
            id: Uuid::new_v4(),
            segment,
            style,
        }
    }

    /// Split this line at already-sorted interior points. Each fragment is
    /// a new line with a fresh id and a copy of this line's style.
    pub fn fragments(&self, points: &[Point]) -> Vec<Line> {
        self.segment
            .split_at(points)
            .into_iter()
            .map(|segment| Line::from_segment(segment, self.style))
            .collect()
    }

    pub fn start(&self) -> Point {
        self.segment.a
    }

    pub fn end(&self) -> Point {
        self.segment.b
    }
}

impl DrawableTrait for Line {
    fn id(&self) -> DrawableId {
        self.id
    }

    fn segment(&self) -> &Segment {
        &self.segment
    }

    fn segment_mut(&mut self) -> &mut Segment {
        &mut self.segment
    }

    fn style(&self) -> &StrokeOverride {
        &self.style
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.segment.a);
        path.line_to(self.segment.b);
        path
    }

    fn to_entity(&self, layer: &str) -> Entity {
        Entity::Line {
            layer: layer.to_string(),
            start: self.segment.a,
            end: self.segment.b,
            style: self.style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_keep_style() {
        let mut line = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        line.style.weight = Some(crate::style::LineWeight::new(5));
        let parts = line.fragments(&[Point::new(5.0, 0.0)]);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].end(), Point::new(5.0, 0.0));
        assert_eq!(parts[1].start(), Point::new(5.0, 0.0));
        assert!(parts.iter().all(|p| p.style == line.style && p.id != line.id));
    }

    #[test]
    fn test_line_path() {
        let line = Line::new(Point::new(1.0, 2.0), Point::new(3.0, 4.0));
        assert_eq!(line.to_path().elements().len(), 2);
    }
}
