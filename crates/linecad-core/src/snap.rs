//! Snap resolution: turn a raw pointer position into a nearby grid corner
//! or drawable feature, and lock line directions to angle increments.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::drawables::Drawable;
use crate::hotspot::{HotspotClass, SnapPoint};
use crate::render::sanitize_zoom;

/// Default grid spacing on both axes.
pub const DEFAULT_GRID_SPACING: f64 = 25.0;

/// Default snap radius in screen units.
pub const DEFAULT_SNAP_DISTANCE: f64 = 5.0;

/// Half size of the square searched for drawable snap points.
pub const DEFAULT_NEIGHBORHOOD: f64 = 50.0;

/// Angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Snap configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Grid spacing per axis. A non-positive spacing disables grid
    /// snapping on that axis.
    pub grid_spacing: Vec2,
    /// Snap radius in screen units; divided by zoom to get world units.
    pub snap_distance: f64,
    pub grid_snap_enabled: bool,
    pub vertex_snap_enabled: bool,
    /// Half size of the neighbourhood square used to gather drawable
    /// snap points.
    pub neighborhood: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            grid_spacing: Vec2::new(DEFAULT_GRID_SPACING, DEFAULT_GRID_SPACING),
            snap_distance: DEFAULT_SNAP_DISTANCE,
            grid_snap_enabled: true,
            vertex_snap_enabled: true,
            neighborhood: DEFAULT_NEIGHBORHOOD,
        }
    }
}

impl SnapConfig {
    /// Acceptance radius in world units at the given zoom.
    pub fn threshold(&self, zoom: f64) -> f64 {
        self.snap_distance / sanitize_zoom(zoom)
    }

    /// Square around `point` whose drawables contribute snap points.
    pub fn neighborhood_rect(&self, point: Point) -> Rect {
        Rect::from_center_size(point, (self.neighborhood * 2.0, self.neighborhood * 2.0))
    }
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point, or the raw point when nothing was close enough.
    pub point: Point,
    /// The candidate that was accepted.
    pub target: Option<SnapPoint>,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self { point, target: None }
    }

    pub fn is_snapped(&self) -> bool {
        self.target.is_some()
    }
}

/// Floor and ceiling multiples of `spacing` around `value`, or `value`
/// twice when the spacing is not positive.
fn bracket(value: f64, spacing: f64) -> (f64, f64) {
    if spacing <= 0.0 || !spacing.is_finite() {
        return (value, value);
    }
    (
        (value / spacing).floor() * spacing,
        (value / spacing).ceil() * spacing,
    )
}

/// The four grid-cell corners bracketing `point`.
pub fn grid_candidates(point: Point, spacing: Vec2) -> [SnapPoint; 4] {
    let (x0, x1) = bracket(point.x, spacing.x);
    let (y0, y1) = bracket(point.y, spacing.y);
    [(x0, y0), (x1, y0), (x0, y1), (x1, y1)].map(|(x, y)| SnapPoint::new(HotspotClass::Grid, Point::new(x, y)))
}

/// Gather candidates for `point`: grid corners first, then snap points of
/// drawables touching the neighbourhood square, in iteration order.
pub fn collect_candidates<'a>(
    point: Point,
    config: &SnapConfig,
    drawables: impl IntoIterator<Item = &'a Drawable>,
) -> Vec<SnapPoint> {
    let mut candidates = Vec::new();
    if config.grid_snap_enabled {
        candidates.extend(grid_candidates(point, config.grid_spacing));
    }
    if config.vertex_snap_enabled {
        let area = config.neighborhood_rect(point);
        candidates.extend(
            drawables
                .into_iter()
                .filter(|d| d.intersects_rect(area))
                .flat_map(Drawable::snap_points),
        );
    }
    candidates
}

/// Nearest candidate to `point` and its distance. Ties go to the
/// candidate that comes first.
pub fn nearest(point: Point, candidates: &[SnapPoint]) -> Option<(SnapPoint, f64)> {
    let mut best: Option<(SnapPoint, f64)> = None;
    for candidate in candidates {
        let distance = (candidate.point - point).hypot();
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((*candidate, distance));
        }
    }
    best
}

/// Pick the nearest candidate if it lies within the zoom-scaled threshold.
pub fn resolve_candidates(point: Point, zoom: f64, config: &SnapConfig, candidates: &[SnapPoint]) -> SnapResult {
    match nearest(point, candidates) {
        Some((target, distance)) if distance <= config.threshold(zoom) => SnapResult {
            point: target.point,
            target: Some(target),
        },
        _ => SnapResult::none(point),
    }
}

/// Snap `point` against the grid and the given drawables.
pub fn resolve<'a>(
    point: Point,
    zoom: f64,
    config: &SnapConfig,
    drawables: impl IntoIterator<Item = &'a Drawable>,
) -> SnapResult {
    let candidates = collect_candidates(point, config, drawables);
    resolve_candidates(point, zoom, config, &candidates)
}

/// Result of an angle snap operation.
#[derive(Debug, Clone, Copy)]
pub struct AngleSnapResult {
    /// The (possibly rotated) end point.
    pub point: Point,
    /// Snapped angle in degrees, in `[0, 360)`.
    pub angle_degrees: f64,
    /// Angle of the unsnapped direction in degrees.
    pub original_angle_degrees: f64,
    /// Distance from the anchor, unchanged by snapping.
    pub distance: f64,
}

impl AngleSnapResult {
    pub fn snapped(&self) -> bool {
        (self.angle_degrees - self.original_angle_degrees).abs() > 1e-9
    }
}

/// Round an angle in degrees to the nearest multiple of `increment`,
/// normalized to `[0, 360)`.
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    let snapped = (angle_degrees / increment).round() * increment;
    snapped.rem_euclid(360.0)
}

/// Rotate `end` around `anchor` so the direction is a multiple of
/// `increment` degrees, keeping its distance from `anchor`.
pub fn snap_line_endpoint(anchor: Point, end: Point, increment: f64) -> AngleSnapResult {
    let delta = end - anchor;
    let distance = delta.hypot();
    if distance == 0.0 || increment <= 0.0 || !increment.is_finite() {
        return AngleSnapResult {
            point: end,
            angle_degrees: 0.0,
            original_angle_degrees: 0.0,
            distance,
        };
    }
    let original = delta.y.atan2(delta.x).to_degrees().rem_euclid(360.0);
    let snapped = snap_angle(original, increment);
    let (sin, cos) = snapped.to_radians().sin_cos();
    AngleSnapResult {
        point: anchor + Vec2::new(cos, sin) * distance,
        angle_degrees: snapped,
        original_angle_degrees: original,
        distance,
    }
}
