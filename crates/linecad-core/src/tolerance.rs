//! Tolerance-based equality for points and segments, and a deduplicator
//! that avoids the quadratic all-pairs scan.

use std::collections::HashMap;

use kurbo::Point;

use crate::geometry::Segment;

/// Default per-axis tolerance in world units.
pub const DEFAULT_TOLERANCE: f64 = 2.0;

/// Smallest cell edge used for bucketing; keeps a zero tolerance from
/// dividing by zero.
const MIN_CELL: f64 = 1e-9;

/// Two points are equal when both coordinates differ by at most `tolerance`.
pub fn points_equal(p: Point, q: Point, tolerance: f64) -> bool {
    (p.x - q.x).abs() <= tolerance && (p.y - q.y).abs() <= tolerance
}

/// Two segments are equal when their endpoints match pairwise in either
/// orientation.
pub fn segments_equal(s: &Segment, t: &Segment, tolerance: f64) -> bool {
    (points_equal(s.a, t.a, tolerance) && points_equal(s.b, t.b, tolerance))
        || (points_equal(s.a, t.b, tolerance) && points_equal(s.b, t.a, tolerance))
}

/// Grid cell a point falls into when the plane is bucketed by `cell` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Cell {
    x: i64,
    y: i64,
}

impl Cell {
    fn of(p: Point, cell: f64) -> Self {
        Self {
            x: (p.x / cell).floor() as i64,
            y: (p.y / cell).floor() as i64,
        }
    }

    fn shifted(self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Orientation-independent bucket key for a segment.
///
/// Points within `tolerance` of each other land in the same or an adjacent
/// cell (cells are floored, so they never differ by more than one), so a
/// lookup over the 3x3 neighbourhood of each endpoint finds every candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentKey {
    lo: Cell,
    hi: Cell,
}

impl SegmentKey {
    pub fn new(segment: &Segment, tolerance: f64) -> Self {
        let cell = tolerance.max(MIN_CELL);
        Self::from_cells(Cell::of(segment.a, cell), Cell::of(segment.b, cell))
    }

    fn from_cells(a: Cell, b: Cell) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// Every key a tolerance-equal segment could have been stored under.
    fn neighbours(segment: &Segment, tolerance: f64) -> impl Iterator<Item = SegmentKey> {
        let cell = tolerance.max(MIN_CELL);
        let a = Cell::of(segment.a, cell);
        let b = Cell::of(segment.b, cell);
        const OFFSETS: [(i64, i64); 9] = [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 0),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ];
        OFFSETS.into_iter().flat_map(move |(ax, ay)| {
            OFFSETS
                .into_iter()
                .map(move |(bx, by)| SegmentKey::from_cells(a.shifted(ax, ay), b.shifted(bx, by)))
        })
    }
}

/// Drop every item whose segment equals (within `tolerance`) the segment of
/// an earlier kept item. Items without a segment always pass through.
///
/// The first occurrence wins and relative order is preserved, so applying
/// this twice gives the same result as applying it once.
pub fn dedupe_by<T, F>(items: Vec<T>, segment_of: F, tolerance: f64) -> Vec<T>
where
    F: Fn(&T) -> Option<Segment>,
{
    let mut buckets: HashMap<SegmentKey, Vec<Segment>> = HashMap::new();
    let mut kept = Vec::with_capacity(items.len());

    for item in items {
        let Some(segment) = segment_of(&item) else {
            kept.push(item);
            continue;
        };
        let duplicate = SegmentKey::neighbours(&segment, tolerance).any(|key| {
            buckets
                .get(&key)
                .is_some_and(|list| list.iter().any(|s| segments_equal(s, &segment, tolerance)))
        });
        if duplicate {
            continue;
        }
        buckets
            .entry(SegmentKey::new(&segment, tolerance))
            .or_default()
            .push(segment);
        kept.push(item);
    }
    kept
}
