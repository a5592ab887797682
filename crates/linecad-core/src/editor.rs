//! Interactive editor: routes pointer and key events through snapping,
//! the build session and the drawing.

use kurbo::Point;
use log::{debug, warn};

use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::drawables::DrawableId;
use crate::drawing::Drawing;
use crate::geometry::Endpoint;
use crate::hotspot::{Hotspot, HotspotAddress, SnapPoint};
use crate::input::{Key, Modifiers, MouseButton, PointerEvent};
use crate::layer::CleanupReport;
use crate::render::{RenderSurface, render_drawing, render_preview, stroke_for};
use crate::snap::{self, snap_line_endpoint};
use crate::style::StrokeOverride;
use crate::tolerance::points_equal;
use crate::tools::{BuildSession, ToolKind, build_drawables};

/// Where the pointer is, before and after snapping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cursor {
    pub screen: Point,
    /// Pointer position in world coordinates.
    pub raw: Point,
    /// Position after snapping and angle lock.
    pub snapped: Point,
    pub target: Option<SnapPoint>,
}

/// What an event changed in the drawing.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// A finished build session was inserted into the current layer.
    Committed { drawables: usize, report: CleanupReport },
    Deleted(DrawableId),
    /// A hotspot drag moved an endpoint.
    Moved(HotspotAddress),
}

pub struct Editor {
    drawing: Drawing,
    pub camera: Camera,
    config: EditorConfig,
    session: BuildSession,
    cursor: Cursor,
    drag: Option<HotspotAddress>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_drawing(Drawing::new(), config)
    }

    /// Edit an existing drawing. The drawing adopts the cleanup settings
    /// of `config`.
    pub fn with_drawing(mut drawing: Drawing, config: EditorConfig) -> Self {
        drawing.cleanup = config.cleanup;
        let session = BuildSession::new(ToolKind::default(), config.cleanup.tolerance);
        Self {
            drawing,
            camera: Camera::new(),
            config,
            session,
            cursor: Cursor::default(),
            drag: None,
        }
    }

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    pub fn drawing_mut(&mut self) -> &mut Drawing {
        &mut self.drawing
    }

    pub fn into_drawing(self) -> Drawing {
        self.drawing
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn session(&self) -> &BuildSession {
        &self.session
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn tool(&self) -> ToolKind {
        self.session.tool()
    }

    /// Switch tools, dropping any session or drag in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.session.set_tool(tool);
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Snap a screen position, then apply angle lock around `anchor`
    /// when ctrl is held.
    fn locate(&mut self, screen: Point, anchor: Option<Point>, modifiers: Modifiers) -> Point {
        let raw = self.camera.screen_to_world(screen);
        let result = snap::resolve(raw, self.camera.zoom, &self.config.snap, self.drawing.visible_drawables());
        let mut point = result.point;
        if let (true, Some(anchor)) = (modifiers.ctrl, anchor) {
            point = snap_line_endpoint(anchor, point, self.config.angle_increment_degrees).point;
        }
        self.cursor = Cursor {
            screen,
            raw,
            snapped: point,
            target: result.target,
        };
        point
    }

    /// Anchor for angle lock: the last committed point, or the fixed end
    /// of the drawable being dragged.
    fn anchor(&self) -> Option<Point> {
        if let Some(address) = self.drag {
            let other = match address.endpoint {
                Endpoint::Start => Endpoint::End,
                Endpoint::End => Endpoint::Start,
            };
            return self
                .drawing
                .layer(address.layer)
                .and_then(|l| l.get(address.drawable))
                .map(|d| d.segment().endpoint(other));
        }
        self.session.points().last().copied()
    }

    pub fn handle_pointer(&mut self, event: &PointerEvent, modifiers: Modifiers) -> Option<EditOutcome> {
        match *event {
            PointerEvent::Move { position } => self.pointer_moved(position, modifiers),
            PointerEvent::Down { position, button } => self.pointer_pressed(position, button, modifiers),
            PointerEvent::Up { position, button } => self.pointer_released(position, button, modifiers),
            PointerEvent::Scroll { position, delta } => {
                self.scroll(position, delta.y);
                None
            }
        }
    }

    fn pointer_moved(&mut self, screen: Point, modifiers: Modifiers) -> Option<EditOutcome> {
        let anchor = self.anchor();
        let point = self.locate(screen, anchor, modifiers);
        if let Some(address) = self.drag {
            return match self.drawing.set_endpoint(address, point) {
                Ok(()) => Some(EditOutcome::Moved(address)),
                Err(e) => {
                    warn!("hotspot drag lost its target: {e}");
                    self.drag = None;
                    None
                }
            };
        }
        self.session.move_to(point);
        None
    }

    fn pointer_pressed(&mut self, screen: Point, button: MouseButton, modifiers: Modifiers) -> Option<EditOutcome> {
        match button {
            MouseButton::Left if self.tool() == ToolKind::Edit => {
                let raw = self.camera.screen_to_world(screen);
                let grab = self.config.hotspot_grab_distance / self.camera.zoom;
                self.drag = self.drawing.hotspot_at(raw, grab).map(|h| h.address);
                None
            }
            MouseButton::Left => {
                let anchor = self.anchor();
                let point = self.locate(screen, anchor, modifiers);
                self.session.push_point(point);
                self.commit_if_done()
            }
            MouseButton::Right => self.delete_at(screen),
            MouseButton::Middle => None,
        }
    }

    fn pointer_released(&mut self, screen: Point, button: MouseButton, modifiers: Modifiers) -> Option<EditOutcome> {
        if button != MouseButton::Left {
            return None;
        }
        if self.drag.take().is_some() {
            return None;
        }
        // Two-point tools finish on release unless the pointer didn't move,
        // in which case the next press supplies the second point.
        if self.tool().is_drag_built() && self.session.is_building() {
            let anchor = self.anchor();
            let point = self.locate(screen, anchor, modifiers);
            if anchor.is_some_and(|a| points_equal(a, point, self.config.cleanup.tolerance)) {
                return None;
            }
            self.session.push_point(point);
            return self.commit_if_done();
        }
        None
    }

    fn scroll(&mut self, screen: Point, delta_y: f64) {
        let factor = if delta_y > 0.0 {
            self.config.wheel_zoom_in
        } else if delta_y < 0.0 {
            self.config.wheel_zoom_out
        } else {
            return;
        };
        self.camera.zoom_at(screen, factor);
    }

    /// Delete the first drawable on the current layer under the raw
    /// pointer position.
    fn delete_at(&mut self, screen: Point) -> Option<EditOutcome> {
        let raw = self.camera.screen_to_world(screen);
        let removed = self.drawing.delete_at(raw, self.config.hit_margin)?;
        debug!("deleted {:?} {}", removed.kind(), removed.id());
        Some(EditOutcome::Deleted(removed.id()))
    }

    pub fn handle_key(&mut self, key: &Key) -> Option<EditOutcome> {
        match key {
            Key::Escape => {
                self.session.cancel();
                self.drag = None;
                None
            }
            Key::Enter => {
                self.session.finalize();
                self.commit_if_done()
            }
            Key::Other(_) => None,
        }
    }

    fn commit_if_done(&mut self) -> Option<EditOutcome> {
        let points = self.session.take()?;
        let tool = self.session.tool();
        let drawables = build_drawables(tool, &points, &self.config.build_defaults());
        let layer = self.drawing.current_layer_id();
        let count = drawables.len();
        let mut report = CleanupReport::default();
        for drawable in drawables {
            match self.drawing.add_drawable(layer, drawable) {
                Ok(r) => report.absorb(r),
                Err(e) => warn!("commit failed: {e}"),
            }
        }
        debug!("committed {count} drawables from {tool:?} ({} points)", points.len());
        Some(EditOutcome::Committed {
            drawables: count,
            report,
        })
    }

    /// Hotspots of drawables near the pointer.
    pub fn hotspots_near_cursor(&self) -> Vec<Hotspot> {
        self.drawing
            .hotspots_in_rect(self.config.snap.neighborhood_rect(self.cursor.raw))
    }

    /// Draw the drawing and the current session preview.
    pub fn render(&self, surface: &mut dyn RenderSurface) {
        render_drawing(&self.drawing, &self.camera, surface);
        let params = stroke_for(self.drawing.current_layer(), &StrokeOverride::default(), self.camera.zoom);
        render_preview(&self.session, &self.camera, surface, &params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawables::DrawableKind;
    use crate::render::tests::RecordingSurface;
    use kurbo::Vec2;

    fn editor() -> Editor {
        let mut config = EditorConfig::default();
        config.snap.grid_snap_enabled = false;
        config.snap.vertex_snap_enabled = false;
        Editor::new(config)
    }

    fn press(editor: &mut Editor, x: f64, y: f64) -> Option<EditOutcome> {
        editor.handle_pointer(
            &PointerEvent::Down {
                position: Point::new(x, y),
                button: MouseButton::Left,
            },
            Modifiers::default(),
        )
    }

    fn release(editor: &mut Editor, x: f64, y: f64) -> Option<EditOutcome> {
        editor.handle_pointer(
            &PointerEvent::Up {
                position: Point::new(x, y),
                button: MouseButton::Left,
            },
            Modifiers::default(),
        )
    }

    fn drag_line(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) -> Option<EditOutcome> {
        press(editor, from.0, from.1);
        editor.handle_pointer(
            &PointerEvent::Move {
                position: Point::new(to.0, to.1),
            },
            Modifiers::default(),
        );
        release(editor, to.0, to.1)
    }

    #[test]
    fn test_drag_commits_line() {
        let mut editor = editor();
        let outcome = drag_line(&mut editor, (0.0, 0.0), (100.0, 0.0));
        assert!(matches!(outcome, Some(EditOutcome::Committed { drawables: 1, .. })));
        assert_eq!(editor.drawing().drawable_count(), 1);
        assert!(editor.session().is_idle());
    }

    #[test]
    fn test_autocut_through_editor() {
        let mut editor = editor();
        editor.drawing_mut().current_layer_mut().autocut = true;
        drag_line(&mut editor, (0.0, 0.0), (10.0, 0.0));
        let outcome = drag_line(&mut editor, (5.0, -5.0), (5.0, 5.0));
        match outcome {
            Some(EditOutcome::Committed { report, .. }) => assert_eq!(report.crossings, 1),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(editor.drawing().drawable_count(), 4);
    }

    #[test]
    fn test_click_click_line() {
        let mut editor = editor();
        press(&mut editor, 0.0, 0.0);
        assert!(release(&mut editor, 0.0, 0.0).is_none());
        assert!(editor.session().is_building());
        press(&mut editor, 50.0, 50.0);
        assert_eq!(editor.drawing().drawable_count(), 1);
    }

    #[test]
    fn test_grid_snap_applies() {
        let mut config = EditorConfig::default();
        config.snap.vertex_snap_enabled = false;
        let mut editor = Editor::new(config);
        drag_line(&mut editor, (1.0, 2.0), (98.0, 1.0));
        let segment = *editor.drawing().current_layer().drawables()[0].segment();
        assert_eq!(segment.a, Point::new(0.0, 0.0));
        assert_eq!(segment.b, Point::new(100.0, 0.0));
    }

    #[test]
    fn test_angle_lock_with_ctrl() {
        let mut editor = editor();
        press(&mut editor, 0.0, 0.0);
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };
        editor.handle_pointer(
            &PointerEvent::Up {
                position: Point::new(100.0, 8.0),
                button: MouseButton::Left,
            },
            ctrl,
        );
        let segment = *editor.drawing().current_layer().drawables()[0].segment();
        assert!(segment.b.y.abs() < 1e-9);
        assert!((segment.b.x - Point::new(100.0, 8.0).to_vec2().hypot()).abs() < 1e-9);
    }

    #[test]
    fn test_polyline_session() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Polyline);
        for (x, y) in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)] {
            assert!(press(&mut editor, x, y).is_none());
            release(&mut editor, x, y);
        }
        let outcome = press(&mut editor, 0.0, 0.0);
        assert!(matches!(outcome, Some(EditOutcome::Committed { drawables: 3, .. })));
        assert_eq!(editor.drawing().drawable_count(), 3);
    }

    #[test]
    fn test_escape_cancels_and_enter_finalizes() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Polyline);
        press(&mut editor, 0.0, 0.0);
        press(&mut editor, 10.0, 0.0);
        editor.handle_key(&Key::Escape);
        assert!(editor.session().is_idle());
        assert_eq!(editor.drawing().drawable_count(), 0);

        press(&mut editor, 0.0, 0.0);
        press(&mut editor, 10.0, 0.0);
        press(&mut editor, 20.0, 10.0);
        let outcome = editor.handle_key(&Key::Enter);
        assert!(matches!(outcome, Some(EditOutcome::Committed { drawables: 2, .. })));
    }

    #[test]
    fn test_right_click_deletes() {
        let mut editor = editor();
        drag_line(&mut editor, (0.0, 0.0), (100.0, 0.0));
        let miss = editor.handle_pointer(
            &PointerEvent::Down {
                position: Point::new(50.0, 40.0),
                button: MouseButton::Right,
            },
            Modifiers::default(),
        );
        assert!(miss.is_none());
        let hit = editor.handle_pointer(
            &PointerEvent::Down {
                position: Point::new(50.0, 3.0),
                button: MouseButton::Right,
            },
            Modifiers::default(),
        );
        assert!(matches!(hit, Some(EditOutcome::Deleted(_))));
        assert_eq!(editor.drawing().drawable_count(), 0);
    }

    #[test]
    fn test_hotspot_drag() {
        let mut editor = editor();
        drag_line(&mut editor, (0.0, 0.0), (100.0, 0.0));
        editor.set_tool(ToolKind::Edit);
        press(&mut editor, 101.0, 1.0);
        assert!(editor.is_dragging());
        let outcome = editor.handle_pointer(
            &PointerEvent::Move {
                position: Point::new(100.0, 50.0),
            },
            Modifiers::default(),
        );
        assert!(matches!(outcome, Some(EditOutcome::Moved(_))));
        release(&mut editor, 100.0, 50.0);
        assert!(!editor.is_dragging());
        let segment = *editor.drawing().current_layer().drawables()[0].segment();
        assert_eq!(segment.b, Point::new(100.0, 50.0));
        assert_eq!(segment.a, Point::ZERO);
    }

    #[test]
    fn test_text_and_dimension_tools() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Text);
        drag_line(&mut editor, (0.0, 0.0), (60.0, 0.0));
        editor.set_tool(ToolKind::Dimension);
        drag_line(&mut editor, (0.0, 100.0), (60.0, 100.0));
        let kinds: Vec<DrawableKind> = editor
            .drawing()
            .current_layer()
            .drawables()
            .iter()
            .map(|d| d.kind())
            .collect();
        assert_eq!(kinds, vec![DrawableKind::Text, DrawableKind::Dimension]);
    }

    #[test]
    fn test_wheel_zoom_changes_snap_threshold() {
        let mut editor = editor();
        editor.handle_pointer(
            &PointerEvent::Scroll {
                position: Point::ZERO,
                delta: Vec2::new(0.0, 1.0),
            },
            Modifiers::default(),
        );
        assert!((editor.camera.zoom - 1.1).abs() < 1e-9);
        editor.handle_pointer(
            &PointerEvent::Scroll {
                position: Point::ZERO,
                delta: Vec2::new(0.0, -1.0),
            },
            Modifiers::default(),
        );
        assert!((editor.camera.zoom - 0.99).abs() < 1e-9);
    }

    #[test]
    fn test_render_with_preview() {
        let mut editor = editor();
        drag_line(&mut editor, (0.0, 0.0), (100.0, 0.0));
        editor.set_tool(ToolKind::Polyline);
        press(&mut editor, 0.0, 50.0);
        editor.handle_pointer(
            &PointerEvent::Move {
                position: Point::new(30.0, 50.0),
            },
            Modifiers::default(),
        );
        let mut surface = RecordingSurface::default();
        editor.render(&mut surface);
        assert_eq!(surface.paths.len(), 2);
        assert_eq!(editor.hotspots_near_cursor().len(), 2);
    }
}
