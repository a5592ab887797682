//! Linear dimension: measures the distance between two points.

use super::{DrawableId, DrawableTrait};
use crate::geometry::Segment;
use crate::interchange::Entity;
use crate::render::{RenderSurface, StrokeParams};
use crate::style::StrokeOverride;
use kurbo::{Affine, BezPath, Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default distance between the measured points and the dimension line.
pub const DEFAULT_DIMENSION_OFFSET: f64 = 25.0;

/// Half size of the tick marks at either end of the dimension line.
const TICK: f64 = 2.0;

/// Label glyph height.
const LABEL_HEIGHT: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimension {
    pub(crate) id: DrawableId,
    /// The measured points.
    pub segment: Segment,
    pub offset_distance: f64,
    #[serde(default)]
    pub style: StrokeOverride,
}

impl Dimension {
    pub fn new(start: Point, end: Point) -> Self {
        Self::with_offset(start, end, DEFAULT_DIMENSION_OFFSET)
    }

    pub fn with_offset(start: Point, end: Point, offset_distance: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            segment: Segment::new(start, end),
            offset_distance,
            style: StrokeOverride::default(),
        }
    }

    /// Measured distance.
    pub fn measurement(&self) -> f64 {
        self.segment.length()
    }

    /// Measurement formatted to one decimal.
    pub fn label(&self) -> String {
        format!("{:.1}", self.measurement())
    }

    /// Ends of the dimension line, offset perpendicular to the measured
    /// segment.
    pub fn dimension_line(&self) -> Segment {
        Segment::new(
            self.segment.offset_point(self.segment.a, self.offset_distance),
            self.segment.offset_point(self.segment.b, self.offset_distance),
        )
    }

    /// Label rotation in degrees, folded into `[-90, 90)` so the text
    /// never reads upside down.
    pub fn label_rotation(&self) -> f64 {
        (self.segment.direction_degrees() + 90.0).rem_euclid(180.0) - 90.0
    }
}

impl DrawableTrait for Dimension {
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

    /// Dimension line, both extension lines and a tick at each end.
    fn to_path(&self) -> BezPath {
        let line = self.dimension_line();
        let mut path = BezPath::new();
        path.move_to(line.a);
        path.line_to(line.b);
        path.move_to(self.segment.a);
        path.line_to(line.a);
        path.move_to(self.segment.b);
        path.line_to(line.b);
        for p in [line.a, line.b] {
            path.move_to(p + Vec2::new(-TICK, TICK));
            path.line_to(p + Vec2::new(TICK, -TICK));
        }
        path
    }

    fn render(&self, surface: &mut dyn RenderSurface, transform: Affine, params: &StrokeParams) {
        surface.stroke_path(&self.to_path(), transform, params);
        surface.draw_text(
            &self.label(),
            self.dimension_line().midpoint(),
            self.label_rotation(),
            LABEL_HEIGHT,
            transform,
            params,
        );
    }

    fn to_entity(&self, layer: &str) -> Entity {
        Entity::Dimension {
            layer: layer.to_string(),
            defpoint2: self.segment.a,
            defpoint3: self.segment.b,
            offset: Some(self.offset_distance),
            style: self.style,
        }
    }
}
