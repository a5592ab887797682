//! Drawable entities: lines, text and dimensions.
//!
//! All three are anchored on a two-point [`Segment`], so containment,
//! rectangle tests and hotspots are shared. Only lines take part in the
//! layer cleanup.

mod dimension;
mod line;
mod text;

pub use dimension::{DEFAULT_DIMENSION_OFFSET, Dimension};
pub use line::Line;
pub use text::{DEFAULT_TEXT_HEIGHT, DEFAULT_TEXT_WIDTH, Text};

use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Endpoint, Segment};
use crate::hotspot::{Hotspot, HotspotAddress, HotspotClass, SnapPoint};
use crate::interchange::Entity;
use crate::layer::LayerId;
use crate::render::{RenderSurface, StrokeParams};
use crate::style::StrokeOverride;

/// Unique identifier for drawables.
pub type DrawableId = Uuid;

/// Behaviour every drawable kind provides.
pub trait DrawableTrait {
    /// Get the unique identifier.
    fn id(&self) -> DrawableId;

    /// The two points this drawable is anchored on.
    fn segment(&self) -> &Segment;

    fn segment_mut(&mut self) -> &mut Segment;

    /// Per-drawable stroke overrides.
    fn style(&self) -> &StrokeOverride;

    /// Stroked outline in world coordinates.
    fn to_path(&self) -> BezPath;

    fn render(&self, surface: &mut dyn RenderSurface, transform: Affine, params: &StrokeParams) {
        surface.stroke_path(&self.to_path(), transform, params);
    }

    /// Interchange record for this drawable on the named layer.
    fn to_entity(&self, layer: &str) -> Entity;
}

/// Discriminant of [`Drawable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawableKind {
    Line,
    Text,
    Dimension,
}

/// Enum wrapper for all drawable kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Drawable {
    Line(Line),
    Text(Text),
    Dimension(Dimension),
}

impl Drawable {
    fn inner(&self) -> &dyn DrawableTrait {
        match self {
            Drawable::Line(d) => d,
            Drawable::Text(d) => d,
            Drawable::Dimension(d) => d,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn DrawableTrait {
        match self {
            Drawable::Line(d) => d,
            Drawable::Text(d) => d,
            Drawable::Dimension(d) => d,
        }
    }

    pub fn id(&self) -> DrawableId {
        self.inner().id()
    }

    pub fn kind(&self) -> DrawableKind {
        match self {
            Drawable::Line(_) => DrawableKind::Line,
            Drawable::Text(_) => DrawableKind::Text,
            Drawable::Dimension(_) => DrawableKind::Dimension,
        }
    }

    pub fn segment(&self) -> &Segment {
        self.inner().segment()
    }

    pub fn style(&self) -> &StrokeOverride {
        self.inner().style()
    }

    pub fn as_line(&self) -> Option<&Line> {
        match self {
            Drawable::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.segment().bounds()
    }

    /// Whether `point` is within `margin` of the anchoring segment.
    pub fn hit_test(&self, point: Point, margin: f64) -> bool {
        self.segment().contains_point(point, margin)
    }

    /// Whether the anchoring segment touches `rect`.
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        self.segment().intersects_rect(rect)
    }

    /// Whether cleanup should drop this drawable. Only lines can be short.
    pub fn is_short(&self, threshold: f64) -> bool {
        match self {
            Drawable::Line(line) => line.segment.is_short(threshold),
            _ => false,
        }
    }

    /// Crossing point with another drawable. Only line pairs cross.
    pub fn intersect(&self, other: &Drawable) -> Option<Point> {
        match (self, other) {
            (Drawable::Line(a), Drawable::Line(b)) => a.segment.intersect(&b.segment),
            _ => None,
        }
    }

    /// Endpoint, midpoint, endpoint.
    pub fn snap_points(&self) -> [SnapPoint; 3] {
        let s = self.segment();
        [
            SnapPoint::new(HotspotClass::Endpoint, s.a),
            SnapPoint::new(HotspotClass::Midpoint, s.midpoint()),
            SnapPoint::new(HotspotClass::Endpoint, s.b),
        ]
    }

    /// The two editable endpoints, addressed as drawable `index` on `layer`.
    pub fn hotspots(&self, layer: LayerId, index: usize) -> [Hotspot; 2] {
        let s = self.segment();
        [Endpoint::Start, Endpoint::End].map(|endpoint| Hotspot {
            class: HotspotClass::Endpoint,
            point: s.endpoint(endpoint),
            address: HotspotAddress {
                layer,
                drawable: index,
                endpoint,
            },
        })
    }

    /// Move one endpoint. No cleanup runs.
    pub fn set_endpoint(&mut self, endpoint: Endpoint, point: Point) {
        self.inner_mut().segment_mut().set_endpoint(endpoint, point);
    }

    pub fn to_path(&self) -> BezPath {
        self.inner().to_path()
    }

    pub fn render(&self, surface: &mut dyn RenderSurface, transform: Affine, params: &StrokeParams) {
        self.inner().render(surface, transform, params);
    }

    pub fn to_entity(&self, layer: &str) -> Entity {
        self.inner().to_entity(layer)
    }

    /// Build a drawable from an interchange record.
    pub fn from_entity(entity: &Entity) -> Drawable {
        match entity {
            Entity::Line { start, end, style, .. } => {
                Drawable::Line(Line::from_segment(Segment::new(*start, *end), *style))
            }
            Entity::Text {
                insert,
                text,
                height,
                rotation,
                width,
                style,
                ..
            } => {
                let mut t = Text::from_placement(*insert, *rotation, *width, text.clone(), *height);
                t.style = *style;
                Drawable::Text(t)
            }
            Entity::Dimension {
                defpoint2,
                defpoint3,
                offset,
                style,
                ..
            } => {
                let mut d = Dimension::with_offset(
                    *defpoint2,
                    *defpoint3,
                    offset.unwrap_or(DEFAULT_DIMENSION_OFFSET),
                );
                d.style = *style;
                Drawable::Dimension(d)
            }
        }
    }
}

impl From<Line> for Drawable {
    fn from(line: Line) -> Self {
        Drawable::Line(line)
    }
}

impl From<Text> for Drawable {
    fn from(text: Text) -> Self {
        Drawable::Text(text)
    }
}

impl From<Dimension> for Drawable {
    fn from(dimension: Dimension) -> Self {
        Drawable::Dimension(dimension)
    }
}
