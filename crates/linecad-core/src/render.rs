//! Rendering abstraction.
//!
//! Drawables turn themselves into kurbo paths and text runs; a
//! [`RenderSurface`] backend puts them on screen.

use kurbo::{Affine, BezPath, Point, Stroke};
use peniko::Color;

use crate::camera::Camera;
use crate::drawing::Drawing;
use crate::geometry::Segment;
use crate::layer::Layer;
use crate::style::StrokeOverride;
use crate::tools::BuildSession;

/// Color and stroke geometry for one draw call.
#[derive(Debug, Clone)]
pub struct StrokeParams {
    pub color: Color,
    pub stroke: Stroke,
}

/// A backend that can stroke paths and place text.
///
/// All geometry passed in is in world coordinates; `transform` maps it to
/// the screen.
pub trait RenderSurface {
    fn stroke_path(&mut self, path: &BezPath, transform: Affine, params: &StrokeParams);

    /// Draw `text` with its baseline starting at `anchor`, rotated by
    /// `rotation_degrees` around the anchor.
    fn draw_text(
        &mut self,
        text: &str,
        anchor: Point,
        rotation_degrees: f64,
        height: f64,
        transform: Affine,
        params: &StrokeParams,
    );
}

/// Stroke for something on `layer`, honouring per-drawable overrides.
///
/// Widths are divided by `zoom` so they stay constant on screen.
pub fn stroke_for(layer: &Layer, style: &StrokeOverride, zoom: f64) -> StrokeParams {
    let color = style.color.unwrap_or(layer.color);
    let weight = style.weight.unwrap_or(layer.line_weight);
    let zoom = sanitize_zoom(zoom);
    let mut stroke = Stroke::new(weight.width() / zoom);
    let dashes = layer.line_type.dash_pattern();
    if !dashes.is_empty() {
        let scaled: Vec<f64> = dashes.iter().map(|d| d / zoom).collect();
        stroke = stroke.with_dashes(0.0, scaled);
    }
    StrokeParams {
        color: color.into(),
        stroke,
    }
}

/// Zoom factors that are zero, negative or non-finite behave as 1.
pub fn sanitize_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 }
}

/// Draw every visible layer of `drawing` in order.
pub fn render_drawing(drawing: &Drawing, camera: &Camera, surface: &mut dyn RenderSurface) {
    let transform = camera.transform();
    for layer in drawing.layers().iter().filter(|l| l.visible) {
        for drawable in layer.drawables() {
            let params = stroke_for(layer, drawable.style(), camera.zoom);
            drawable.render(surface, transform, &params);
        }
    }
}

/// Draw the rubber-band preview of an in-progress build session.
pub fn render_preview(
    session: &BuildSession,
    camera: &Camera,
    surface: &mut dyn RenderSurface,
    params: &StrokeParams,
) {
    let segments = session.preview_segments();
    if segments.is_empty() {
        return;
    }
    surface.stroke_path(&segments_path(&segments), camera.transform(), params);
}

/// One open subpath per segment.
pub fn segments_path(segments: &[Segment]) -> BezPath {
    let mut path = BezPath::new();
    for s in segments {
        path.move_to(s.a);
        path.line_to(s.b);
    }
    path
}
