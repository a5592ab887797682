//! Layers and the cleanup pipeline that runs whenever a drawable is added.
//!
//! Cleanup stages, in order:
//! 1. split (only when `autocut` is on): every crossing between two lines
//!    splits both lines at the crossing point;
//! 2. prune: lines shorter than the minimum length are removed;
//! 3. dedupe: lines equal within tolerance to an earlier line are removed.
//!
//! Text and dimensions pass through all three stages untouched.

use std::collections::{HashMap, HashSet};

use kurbo::{Point, Rect};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::drawables::{Drawable, DrawableId};
use crate::error::{EditError, EditResult};
use crate::geometry::{DEFAULT_MIN_LENGTH, Endpoint, Segment};
use crate::hotspot::Hotspot;
use crate::interchange::LayerRecord;
use crate::style::{LineType, LineWeight, RgbColor};
use crate::tolerance::{DEFAULT_TOLERANCE, dedupe_by, points_equal};

/// Unique identifier for layers.
pub type LayerId = Uuid;

/// How the split stage treats fragments produced in the same pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum SplitMode {
    /// One scan over the layer as it was before the pass.
    #[default]
    SinglePass,
    /// Repeat split and prune until no new crossing is found, up to
    /// `max_passes` times. Crossings that only touch endpoints of both
    /// lines do not count as new.
    Fixpoint { max_passes: usize },
}

/// Parameters for the cleanup pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    /// Per-axis tolerance for duplicate detection.
    pub tolerance: f64,
    /// Lines shorter than this are pruned.
    pub min_length: f64,
    pub split_mode: SplitMode,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            min_length: DEFAULT_MIN_LENGTH,
            split_mode: SplitMode::SinglePass,
        }
    }
}

/// What one cleanup run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub passes: usize,
    pub crossings: usize,
    /// Lines that were replaced by their fragments.
    pub split: usize,
    pub fragments: usize,
    pub pruned: usize,
    pub duplicates: usize,
}

impl CleanupReport {
    /// Add the counts of another run to this one.
    pub fn absorb(&mut self, other: CleanupReport) {
        self.passes += other.passes;
        self.crossings += other.crossings;
        self.split += other.split;
        self.fragments += other.fragments;
        self.pruned += other.pruned;
        self.duplicates += other.duplicates;
    }
}

/// A named, styled, ordered collection of drawables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub(crate) id: LayerId,
    pub name: String,
    pub color: RgbColor,
    pub line_weight: LineWeight,
    pub line_type: LineType,
    pub visible: bool,
    /// Whether adding a drawable splits crossing lines.
    pub autocut: bool,
    drawables: Vec<Drawable>,
}

impl Layer {
    /// A visible layer with default attributes: black, weight class 2,
    /// continuous, autocut off.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: RgbColor::BLACK,
            line_weight: LineWeight::DEFAULT,
            line_type: LineType::Continuous,
            visible: true,
            autocut: false,
            drawables: Vec::new(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Drawable> {
        self.drawables.get(index)
    }

    /// Append a drawable, then run cleanup over the whole layer.
    pub fn add_drawable(&mut self, drawable: impl Into<Drawable>, settings: &CleanupSettings) -> CleanupReport {
        self.drawables.push(drawable.into());
        self.cleanup(settings)
    }

    /// Append without running cleanup.
    pub fn push_raw(&mut self, drawable: impl Into<Drawable>) {
        self.drawables.push(drawable.into());
    }

    /// Run split (if autocut), prune and dedupe over the layer.
    pub fn cleanup(&mut self, settings: &CleanupSettings) -> CleanupReport {
        let mut report = CleanupReport::default();
        if self.autocut {
            match settings.split_mode {
                SplitMode::SinglePass => {
                    self.split_pass(None, &mut report);
                    report.passes = 1;
                }
                SplitMode::Fixpoint { max_passes } => {
                    let max_passes = max_passes.max(1);
                    loop {
                        let found = self.split_pass(Some(settings.min_length), &mut report);
                        report.passes += 1;
                        report.pruned += self.prune_short(settings.min_length);
                        if found == 0 {
                            break;
                        }
                        if report.passes >= max_passes {
                            warn!(
                                "layer {}: split did not settle after {} passes",
                                self.name, report.passes
                            );
                            break;
                        }
                    }
                }
            }
        }
        report.pruned += self.prune_short(settings.min_length);
        report.duplicates = self.remove_duplicates(settings.tolerance);
        debug!(
            "layer {}: cleanup crossings={} split={} fragments={} pruned={} duplicates={}",
            self.name, report.crossings, report.split, report.fragments, report.pruned, report.duplicates
        );
        report
    }

    /// One split scan over the current drawables. Returns the number of
    /// crossings found.
    ///
    /// With `endpoint_guard`, crossings that lie within the guard distance
    /// of an endpoint of both lines are skipped.
    fn split_pass(&mut self, endpoint_guard: Option<f64>, report: &mut CleanupReport) -> usize {
        // Split points per line, in discovery order.
        let mut groups: Vec<(usize, Vec<Point>)> = Vec::new();
        let mut slots: HashMap<usize, usize> = HashMap::new();
        let mut record = |index: usize, point: Point| {
            let slot = *slots.entry(index).or_insert_with(|| {
                groups.push((index, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(point);
        };

        let mut crossings = 0;
        for i in 0..self.drawables.len() {
            let Some(first) = self.drawables[i].as_line() else { continue };
            for j in (i + 1)..self.drawables.len() {
                let Some(second) = self.drawables[j].as_line() else { continue };
                let Some(point) = first.segment.intersect(&second.segment) else { continue };
                let touching = endpoint_guard.is_some_and(|guard| {
                    near_endpoint(&first.segment, point, guard)
                        && near_endpoint(&second.segment, point, guard)
                });
                if touching {
                    continue;
                }
                crossings += 1;
                record(i, point);
                record(j, point);
            }
        }

        report.crossings += crossings;
        if groups.is_empty() {
            return crossings;
        }

        let mut fragments = Vec::new();
        for (index, mut points) in groups.iter().cloned() {
            if let Drawable::Line(line) = &self.drawables[index] {
                line.segment.sort_points_along(&mut points);
                fragments.extend(line.fragments(&points).into_iter().map(Drawable::Line));
            }
        }
        let replaced: HashSet<usize> = groups.iter().map(|(index, _)| *index).collect();
        report.split += replaced.len();
        report.fragments += fragments.len();

        let mut kept: Vec<Drawable> = std::mem::take(&mut self.drawables)
            .into_iter()
            .enumerate()
            .filter(|(index, _)| !replaced.contains(index))
            .map(|(_, d)| d)
            .collect();
        kept.extend(fragments);
        self.drawables = kept;
        crossings
    }

    /// Remove lines shorter than `min_length`. Returns how many went.
    fn prune_short(&mut self, min_length: f64) -> usize {
        let before = self.drawables.len();
        self.drawables.retain(|d| !d.is_short(min_length));
        before - self.drawables.len()
    }

    /// Remove lines equal to an earlier line. Returns how many went.
    fn remove_duplicates(&mut self, tolerance: f64) -> usize {
        let before = self.drawables.len();
        let drawables = std::mem::take(&mut self.drawables);
        self.drawables = dedupe_by(drawables, |d| d.as_line().map(|l| l.segment), tolerance);
        before - self.drawables.len()
    }

    /// Index of the first drawable within `margin` of `point`.
    pub fn hit_test(&self, point: Point, margin: f64) -> Option<usize> {
        self.drawables.iter().position(|d| d.hit_test(point, margin))
    }

    /// Remove and return the first drawable within `margin` of `point`.
    pub fn remove_at_point(&mut self, point: Point, margin: f64) -> Option<Drawable> {
        let index = self.hit_test(point, margin)?;
        Some(self.drawables.remove(index))
    }

    pub fn remove(&mut self, id: DrawableId) -> Option<Drawable> {
        let index = self.drawables.iter().position(|d| d.id() == id)?;
        Some(self.drawables.remove(index))
    }

    /// Drawables whose segment touches `rect`, with their indices.
    pub fn drawables_in_rect(&self, rect: Rect) -> impl Iterator<Item = (usize, &Drawable)> {
        self.drawables
            .iter()
            .enumerate()
            .filter(move |(_, d)| d.intersects_rect(rect))
    }

    /// Editable endpoints of drawables touching `rect`.
    pub fn hotspots_in_rect(&self, rect: Rect) -> Vec<Hotspot> {
        self.drawables_in_rect(rect)
            .flat_map(|(index, d)| d.hotspots(self.id, index))
            .collect()
    }

    /// Move one endpoint of the drawable at `index`. Cleanup does not run.
    pub fn set_endpoint(&mut self, index: usize, endpoint: Endpoint, point: Point) -> EditResult<()> {
        let len = self.drawables.len();
        let drawable = self
            .drawables
            .get_mut(index)
            .ok_or(EditError::DrawableOutOfRange { index, len })?;
        drawable.set_endpoint(endpoint, point);
        Ok(())
    }

    /// Layer table record for interchange.
    pub fn to_record(&self) -> LayerRecord {
        LayerRecord {
            name: self.name.clone(),
            true_color: self.color.packed(),
            lineweight: self.line_weight.to_interchange(),
            linetype: self.line_type.name().to_string(),
            visible: self.visible,
            autocut: self.autocut,
        }
    }

    /// Empty layer with the attributes of an interchange record. Unknown
    /// line type names fall back to continuous.
    pub fn from_record(record: &LayerRecord) -> Self {
        let mut layer = Layer::new(record.name.clone());
        layer.color = RgbColor::from_packed(record.true_color);
        layer.line_weight = LineWeight::from_interchange(record.lineweight);
        layer.line_type = record.linetype.parse().unwrap_or_else(|e| {
            warn!("layer {}: {e}, using Continuous", record.name);
            LineType::Continuous
        });
        layer.visible = record.visible;
        layer.autocut = record.autocut;
        layer
    }
}

fn near_endpoint(segment: &Segment, point: Point, guard: f64) -> bool {
    points_equal(segment.a, point, guard) || points_equal(segment.b, point, guard)
}
