//! Text drawable: a label laid out along its baseline segment.

use super::{DrawableId, DrawableTrait};
use crate::geometry::Segment;
use crate::interchange::Entity;
use crate::render::{RenderSurface, StrokeParams};
use crate::style::StrokeOverride;
use kurbo::{Affine, BezPath, Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default glyph height in world units.
pub const DEFAULT_TEXT_HEIGHT: f64 = 25.0;

/// Baseline length assumed when an imported text carries no width.
pub const DEFAULT_TEXT_WIDTH: f64 = 25.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: DrawableId,
    /// Baseline from the insertion point to the far end.
    pub segment: Segment,
    pub text: String,
    pub height: f64,
    #[serde(default)]
    pub style: StrokeOverride,
}

impl Text {
    pub fn new(start: Point, end: Point, text: impl Into<String>, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            segment: Segment::new(start, end),
            text: text.into(),
            height,
            style: StrokeOverride::default(),
        }
    }

    /// Rebuild the baseline from an insertion point, a direction in
    /// degrees and a width.
    pub fn from_placement(
        insert: Point,
        rotation_degrees: f64,
        width: Option<f64>,
        text: impl Into<String>,
        height: f64,
    ) -> Self {
        let width = width.unwrap_or(DEFAULT_TEXT_WIDTH);
        let (sin, cos) = rotation_degrees.to_radians().sin_cos();
        let end = insert + Vec2::new(cos, sin) * width;
        Self::new(insert, end, text, height)
    }

    /// Baseline direction in degrees.
    pub fn rotation_degrees(&self) -> f64 {
        self.segment.direction_degrees()
    }
}

impl DrawableTrait for Text {
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

    /// Text has no stroked outline; backends draw the glyphs.
    fn to_path(&self) -> BezPath {
        BezPath::new()
    }

    fn render(&self, surface: &mut dyn RenderSurface, transform: Affine, params: &StrokeParams) {
        surface.draw_text(
            &self.text,
            self.segment.a,
            self.rotation_degrees(),
            self.height,
            transform,
            params,
        );
    }

    fn to_entity(&self, layer: &str) -> Entity {
        Entity::Text {
            layer: layer.to_string(),
            insert: self.segment.a,
            text: self.text.clone(),
            height: self.height,
            rotation: self.rotation_degrees(),
            width: Some(self.segment.length()),
            style: self.style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(p: Point, q: Point) -> bool {
        (p.x - q.x).abs() < 1e-9 && (p.y - q.y).abs() < 1e-9
    }

    #[test]
    fn test_placement_roundtrip() {
        let text = Text::new(Point::new(10.0, 10.0), Point::new(10.0, 40.0), "label", 12.0);
        let rebuilt = Text::from_placement(
            text.segment.a,
            text.rotation_degrees(),
            Some(text.segment.length()),
            text.text.clone(),
            text.height,
        );
        assert!(close(rebuilt.segment.b, text.segment.b));
    }

    #[test]
    fn test_placement_default_width() {
        let text = Text::from_placement(Point::ZERO, 0.0, None, "x", DEFAULT_TEXT_HEIGHT);
        assert!(close(text.segment.b, Point::new(DEFAULT_TEXT_WIDTH, 0.0)));
    }
}
