//! Tools and the multi-point build session that drives them.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::drawables::{Dimension, Drawable, Line, Text};
use crate::geometry::Segment;
use crate::tolerance::points_equal;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Line,
    Text,
    Dimension,
    Polyline,
    /// Drag hotspots of committed drawables.
    Edit,
}

/// When a build session has collected enough points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointTarget {
    /// Done once this many points are collected.
    Count(usize),
    /// Done once a point lands on the first point again.
    Closing,
}

impl ToolKind {
    /// Completion rule for tools that build drawables.
    pub fn target(self) -> Option<PointTarget> {
        match self {
            ToolKind::Line | ToolKind::Text | ToolKind::Dimension => Some(PointTarget::Count(2)),
            ToolKind::Polyline => Some(PointTarget::Closing),
            ToolKind::Edit => None,
        }
    }

    /// Tools whose points come from a press-drag-release gesture.
    pub fn is_drag_built(self) -> bool {
        matches!(self.target(), Some(PointTarget::Count(2)))
    }
}

/// State of a build session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BuildState {
    #[default]
    Idle,
    Building {
        /// Committed points, in click order.
        points: Vec<Point>,
        /// Latest pointer position, for preview only.
        moving: Option<Point>,
    },
    Done {
        points: Vec<Point>,
    },
}

/// Collects points for one drawable (or one polyline) at a time.
#[derive(Debug, Clone)]
pub struct BuildSession {
    tool: ToolKind,
    state: BuildState,
    /// Closing tolerance for polylines.
    tolerance: f64,
}

impl BuildSession {
    pub fn new(tool: ToolKind, tolerance: f64) -> Self {
        Self {
            tool,
            state: BuildState::Idle,
            tolerance,
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Switch tools, discarding any collected points.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
        self.state = BuildState::Idle;
    }

    pub fn state(&self) -> &BuildState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, BuildState::Idle)
    }

    pub fn is_building(&self) -> bool {
        matches!(self.state, BuildState::Building { .. })
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, BuildState::Done { .. })
    }

    /// Committed points so far.
    pub fn points(&self) -> &[Point] {
        match &self.state {
            BuildState::Idle => &[],
            BuildState::Building { points, .. } | BuildState::Done { points } => points,
        }
    }

    pub fn moving_point(&self) -> Option<Point> {
        match &self.state {
            BuildState::Building { moving, .. } => *moving,
            _ => None,
        }
    }

    /// Commit a point.
    ///
    /// Ignored while `Done` (take the points first) and for tools that
    /// don't build anything. For polylines, repeating the first point
    /// before a second one exists is ignored.
    pub fn push_point(&mut self, point: Point) -> &BuildState {
        let Some(target) = self.tool.target() else {
            return &self.state;
        };
        match &mut self.state {
            BuildState::Idle => {
                self.state = BuildState::Building {
                    points: vec![point],
                    moving: None,
                };
            }
            BuildState::Building { points, moving } => {
                let complete = match target {
                    PointTarget::Count(n) => points.len() + 1 >= n,
                    PointTarget::Closing => {
                        let first = points[0];
                        if points.len() == 1 && points_equal(point, first, self.tolerance) {
                            return &self.state;
                        }
                        points_equal(point, first, self.tolerance)
                    }
                };
                points.push(point);
                *moving = None;
                if complete {
                    self.finalize();
                }
            }
            BuildState::Done { .. } => {}
        }
        &self.state
    }

    /// Update the preview point. Only has an effect while building.
    pub fn move_to(&mut self, point: Point) {
        if let BuildState::Building { moving, .. } = &mut self.state {
            *moving = Some(point);
        }
    }

    /// Finish with the points collected so far. Fewer than two points
    /// can't make a drawable, so the session goes back to idle.
    pub fn finalize(&mut self) {
        if let BuildState::Building { points, .. } = &mut self.state {
            self.state = if points.len() >= 2 {
                BuildState::Done {
                    points: std::mem::take(points),
                }
            } else {
                BuildState::Idle
            };
        }
    }

    /// Discard everything and go back to idle.
    pub fn cancel(&mut self) {
        self.state = BuildState::Idle;
    }

    /// Take the points of a finished session, leaving it idle.
    pub fn take(&mut self) -> Option<Vec<Point>> {
        match std::mem::take(&mut self.state) {
            BuildState::Done { points } => Some(points),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Segments to preview: committed consecutive pairs, then the last
    /// committed point to the moving point.
    pub fn preview_segments(&self) -> Vec<Segment> {
        let points = self.points();
        let mut segments: Vec<Segment> = points.windows(2).map(|w| Segment::new(w[0], w[1])).collect();
        if let (Some(&last), Some(moving)) = (points.last(), self.moving_point()) {
            segments.push(Segment::new(last, moving));
        }
        segments
    }
}

/// Parameters for turning collected points into drawables.
#[derive(Debug, Clone)]
pub struct BuildDefaults {
    pub text_height: f64,
    pub text_placeholder: String,
    pub dimension_offset: f64,
}

/// Drawables for a finished set of points.
///
/// Two-point tools use the first and last point; a polyline becomes one
/// line per consecutive pair.
pub fn build_drawables(tool: ToolKind, points: &[Point], defaults: &BuildDefaults) -> Vec<Drawable> {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    if points.len() < 2 {
        return Vec::new();
    }
    match tool {
        ToolKind::Line => vec![Line::new(first, last).into()],
        ToolKind::Text => vec![Text::new(first, last, defaults.text_placeholder.clone(), defaults.text_height).into()],
        ToolKind::Dimension => vec![Dimension::with_offset(first, last, defaults.dimension_offset).into()],
        ToolKind::Polyline => points.windows(2).map(|w| Line::new(w[0], w[1]).into()).collect(),
        ToolKind::Edit => Vec::new(),
    }
}
