//! Recorded input sessions and their replay against an [`Editor`].

use std::fs;
use std::path::Path;

use linecad_core::error::EditError;
use linecad_core::input::{Key, Modifiers, PointerEvent};
use linecad_core::layer::Layer;
use linecad_core::tools::ToolKind;
use linecad_core::{ConfigError, EditOutcome, Editor, StorageError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read session: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid session: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("event {index}: {source}")]
    Edit { index: usize, source: EditError },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One recorded user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    Pointer {
        event: PointerEvent,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Key {
        key: Key,
    },
    Tool {
        tool: ToolKind,
    },
    /// Toggle autocut on the current layer.
    Autocut {
        enabled: bool,
    },
    /// Add a layer and make it current.
    AddLayer {
        name: String,
    },
    SelectLayer {
        index: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub events: Vec<SessionEvent>,
}

impl Session {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Counts of what a replay did to the drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub committed: usize,
    pub deleted: usize,
    pub moved: usize,
}

impl ReplaySummary {
    fn record(&mut self, outcome: Option<EditOutcome>) {
        match outcome {
            Some(EditOutcome::Committed { drawables, .. }) => self.committed += drawables,
            Some(EditOutcome::Deleted(_)) => self.deleted += 1,
            Some(EditOutcome::Moved(_)) => self.moved += 1,
            None => {}
        }
    }
}

/// Feed every event of `session` to `editor` in order.
pub fn replay(editor: &mut Editor, session: &Session) -> Result<ReplaySummary, AppError> {
    let mut summary = ReplaySummary::default();
    for (index, event) in session.events.iter().enumerate() {
        summary.events += 1;
        match event {
            SessionEvent::Pointer { event, modifiers } => {
                let outcome = editor.handle_pointer(event, *modifiers);
                summary.record(outcome);
            }
            SessionEvent::Key { key } => {
                let outcome = editor.handle_key(key);
                summary.record(outcome);
            }
            SessionEvent::Tool { tool } => editor.set_tool(*tool),
            SessionEvent::Autocut { enabled } => {
                let drawing = editor.drawing_mut();
                let settings = drawing.cleanup;
                let layer = drawing.current_layer_mut();
                layer.autocut = *enabled;
                if *enabled {
                    layer.cleanup(&settings);
                }
            }
            SessionEvent::AddLayer { name } => {
                let drawing = editor.drawing_mut();
                drawing.add_layer(Layer::new(name.clone()));
                let last = drawing.layers().len() - 1;
                drawing
                    .set_current_layer(last)
                    .map_err(|source| AppError::Edit { index, source })?;
            }
            SessionEvent::SelectLayer { index: layer } => {
                editor
                    .drawing_mut()
                    .set_current_layer(*layer)
                    .map_err(|source| AppError::Edit { index, source })?;
            }
        }
    }
    log::debug!("replayed {summary:?}");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use linecad_core::EditorConfig;
    use linecad_core::input::MouseButton;

    fn editor() -> Editor {
        let mut config = EditorConfig::default();
        config.snap.grid_snap_enabled = false;
        config.snap.vertex_snap_enabled = false;
        Editor::new(config)
    }

    fn click(x: f64, y: f64) -> [SessionEvent; 2] {
        let position = Point::new(x, y);
        [
            SessionEvent::Pointer {
                event: PointerEvent::Down {
                    position,
                    button: MouseButton::Left,
                },
                modifiers: Modifiers::default(),
            },
            SessionEvent::Pointer {
                event: PointerEvent::Up {
                    position,
                    button: MouseButton::Left,
                },
                modifiers: Modifiers::default(),
            },
        ]
    }

    #[test]
    fn test_session_json() {
        let json = r#"{"events": [
            {"type": "Tool", "tool": "Polyline"},
            {"type": "Pointer", "event": {"Down": {"position": {"x": 0.0, "y": 0.0}, "button": "Left"}}},
            {"type": "Key", "key": "Escape"},
            {"type": "Autocut", "enabled": true}
        ]}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.events.len(), 4);
        assert_eq!(session.events[0], SessionEvent::Tool { tool: ToolKind::Polyline });
        assert!(matches!(
            session.events[1],
            SessionEvent::Pointer { modifiers: Modifiers { ctrl: false, .. }, .. }
        ));
    }

    #[test]
    fn test_replay_click_click_line() {
        let mut editor = editor();
        let mut events = Vec::new();
        events.extend(click(0.0, 0.0));
        events.extend(click(100.0, 0.0));
        let summary = replay(&mut editor, &Session { events }).unwrap();
        assert_eq!(summary.events, 4);
        assert_eq!(summary.committed, 1);
        assert_eq!(editor.drawing().drawable_count(), 1);
    }

    #[test]
    fn test_replay_autocut_splits_crossing() {
        let mut editor = editor();
        let mut events = vec![SessionEvent::Autocut { enabled: true }];
        events.extend(click(0.0, 0.0));
        events.extend(click(100.0, 100.0));
        events.extend(click(0.0, 100.0));
        events.extend(click(100.0, 0.0));
        replay(&mut editor, &Session { events }).unwrap();
        assert_eq!(editor.drawing().current_layer().len(), 4);
    }

    #[test]
    fn test_replay_layers() {
        let mut editor = editor();
        let mut events = vec![SessionEvent::AddLayer { name: "walls".to_string() }];
        events.extend(click(0.0, 0.0));
        events.extend(click(50.0, 0.0));
        events.push(SessionEvent::SelectLayer { index: 0 });
        replay(&mut editor, &Session { events }).unwrap();

        let drawing = editor.drawing();
        assert_eq!(drawing.current_layer_index(), 0);
        assert_eq!(drawing.layer_by_name("walls").map(Layer::len), Some(1));
        assert!(drawing.current_layer().is_empty());
    }

    #[test]
    fn test_replay_bad_layer_index() {
        let mut editor = editor();
        let session = Session {
            events: vec![SessionEvent::SelectLayer { index: 7 }],
        };
        assert!(matches!(
            replay(&mut editor, &session),
            Err(AppError::Edit { index: 0, .. })
        ));
    }
}
