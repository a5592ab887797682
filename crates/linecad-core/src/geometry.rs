//! Segment primitives and line-line math.
//!
//! Every function here is total: degenerate input (zero-length segments,
//! parallel or collinear pairs) yields a defined fallback value instead of
//! dividing by zero.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Default margin (world units) for point containment and hit testing.
pub const DEFAULT_HIT_MARGIN: f64 = 5.0;

/// Segments shorter than this are removed by the layer cleanup.
pub const DEFAULT_MIN_LENGTH: f64 = 1.0;

/// Which end of a segment an edit refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    Start,
    End,
}

impl Endpoint {
    /// Index of the endpoint (0 = start, 1 = end).
    pub fn index(self) -> usize {
        match self {
            Endpoint::Start => 0,
            Endpoint::End => 1,
        }
    }

    /// Endpoint for an index, if it is 0 or 1.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Endpoint::Start),
            1 => Some(Endpoint::End),
            _ => None,
        }
    }
}

/// Orientation test: true when `a`, `b`, `c` turn counter-clockwise.
///
/// Collinear triples report `false`, so a point lying exactly on a line
/// counts as being on the clockwise side.
fn ccw(a: Point, b: Point, c: Point) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

/// Whether segment `p1`-`p2` and segment `q1`-`q2` straddle each other.
pub fn straddles(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    ccw(p1, q1, q2) != ccw(p2, q1, q2) && ccw(p1, p2, q1) != ccw(p1, p2, q2)
}

/// An undirected straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        (self.b - self.a).hypot()
    }

    pub fn midpoint(&self) -> Point {
        self.a.midpoint(self.b)
    }

    /// Vector from `a` to `b`.
    pub fn vector(&self) -> Vec2 {
        self.b - self.a
    }

    /// Axis-aligned bounding box.
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.a, self.b)
    }

    /// The same segment with its endpoints swapped.
    pub fn reversed(&self) -> Self {
        Self::new(self.b, self.a)
    }

    pub fn endpoint(&self, which: Endpoint) -> Point {
        match which {
            Endpoint::Start => self.a,
            Endpoint::End => self.b,
        }
    }

    /// Rewrite one endpoint in place.
    pub fn set_endpoint(&mut self, which: Endpoint, point: Point) {
        match which {
            Endpoint::Start => self.a = point,
            Endpoint::End => self.b = point,
        }
    }

    /// Angle in radians of the vector pointing from `b` back to `a`.
    pub fn rotation(&self) -> f64 {
        (self.a.y - self.b.y).atan2(self.a.x - self.b.x)
    }

    /// Direction from `a` to `b` in degrees, in `[0, 360]`.
    pub fn direction_degrees(&self) -> f64 {
        (self.rotation() + PI).to_degrees()
    }

    /// Intersection point of two properly crossing segments.
    ///
    /// Returns `None` when the segments do not straddle each other, and
    /// when they are parallel or collinear (overlaps are not crossings).
    pub fn intersect(&self, other: &Segment) -> Option<Point> {
        let (a, b, c, d) = (self.a, self.b, other.a, other.b);
        if !straddles(a, b, c, d) {
            return None;
        }
        let denom = (a.x - b.x) * (c.y - d.y) - (a.y - b.y) * (c.x - d.x);
        if denom == 0.0 {
            return None;
        }
        let ab = a.x * b.y - a.y * b.x;
        let cd = c.x * d.y - c.y * d.x;
        Some(Point::new(
            (ab * (c.x - d.x) - (a.x - b.x) * cd) / denom,
            (ab * (c.y - d.y) - (a.y - b.y) * cd) / denom,
        ))
    }

    /// Whether `point` lies within `margin` of this segment.
    ///
    /// The bounding box inflated by `margin` rejects far points first; the
    /// remaining ones are measured against the infinite line.
    pub fn contains_point(&self, point: Point, margin: f64) -> bool {
        if !self.bounds().inflate(margin, margin).contains_inclusive(point) {
            return false;
        }
        let len = self.length();
        if len == 0.0 {
            return (point - self.a).hypot() <= margin;
        }
        let (x1, y1, x2, y2) = (self.a.x, self.a.y, self.b.x, self.b.y);
        let distance = ((y2 - y1) * point.x - (x2 - x1) * point.y + x2 * y1 - y2 * x1).abs() / len;
        distance <= margin
    }

    /// Whether the segment touches `rect`: an endpoint inside it, or a
    /// proper crossing with one of its four edges.
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        if rect.contains_inclusive(self.a) || rect.contains_inclusive(self.b) {
            return true;
        }
        rect_edges(rect)
            .iter()
            .any(|&(c, d)| straddles(self.a, self.b, c, d))
    }

    /// Whether the segment is shorter than `threshold`.
    pub fn is_short(&self, threshold: f64) -> bool {
        self.length() < threshold
    }

    /// Translate `point` by `distance` along the left-hand normal of the
    /// segment. A zero-length segment has no normal; `point` is returned.
    pub fn offset_point(&self, point: Point, distance: f64) -> Point {
        let dir = self.vector();
        let len = dir.hypot();
        if len == 0.0 {
            return point;
        }
        let unit = dir / len;
        let normal = Vec2::new(-unit.y, unit.x);
        point + normal * distance
    }

    /// Sort points by distance from `a`. The sort is stable, so points at
    /// equal distance keep the order they were discovered in.
    pub fn sort_points_along(&self, points: &mut [Point]) {
        let start = self.a;
        points.sort_by(|p, q| {
            let dp = (*p - start).hypot();
            let dq = (*q - start).hypot();
            dp.total_cmp(&dq)
        });
    }

    /// Split at already-sorted interior points into consecutive pieces:
    /// `a→p1, p1→p2, …, pn→b`.
    pub fn split_at(&self, points: &[Point]) -> Vec<Segment> {
        let mut pieces = Vec::with_capacity(points.len() + 1);
        let mut start = self.a;
        for &p in points {
            pieces.push(Segment::new(start, p));
            start = p;
        }
        pieces.push(Segment::new(start, self.b));
        pieces
    }
}

/// The four edges of `rect`, clockwise from the top-left corner.
fn rect_edges(rect: Rect) -> [(Point, Point); 4] {
    let tl = Point::new(rect.x0, rect.y0);
    let tr = Point::new(rect.x1, rect.y0);
    let br = Point::new(rect.x1, rect.y1);
    let bl = Point::new(rect.x0, rect.y1);
    [(tl, tr), (tr, br), (br, bl), (bl, tl)]
}

/// Inclusive containment for rects (kurbo's `contains` is half-open).
pub trait ContainsInclusive {
    fn contains_inclusive(&self, point: Point) -> bool;
}

impl ContainsInclusive for Rect {
    fn contains_inclusive(&self, point: Point) -> bool {
        point.x >= self.x0 && point.x <= self.x1 && point.y >= self.y0 && point.y <= self.y1
    }
}
