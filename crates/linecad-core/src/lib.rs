//! linecad core library
//!
//! Geometry, layer cleanup, snapping and interactive editing for a 2D
//! line-drawing CAD editor. Windowing and rasterization live outside this
//! crate behind [`render::RenderSurface`].

pub mod camera;
pub mod config;
pub mod drawables;
pub mod drawing;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod hotspot;
pub mod input;
pub mod interchange;
pub mod layer;
pub mod render;
pub mod snap;
pub mod storage;
pub mod style;
pub mod tolerance;
pub mod tools;

pub use camera::Camera;
pub use config::{ConfigError, EditorConfig};
pub use drawables::{Dimension, Drawable, DrawableId, DrawableKind, DrawableTrait, Line, Text};
pub use drawing::Drawing;
pub use editor::{Cursor, EditOutcome, Editor};
pub use error::{EditError, EditResult};
pub use geometry::{Endpoint, Segment};
pub use hotspot::{Hotspot, HotspotAddress, HotspotClass, SnapPoint};
pub use input::{Key, Modifiers, MouseButton, PointerEvent};
pub use interchange::{Entity, InterchangeDocument, LayerRecord};
pub use layer::{CleanupReport, CleanupSettings, Layer, LayerId, SplitMode};
pub use render::{RenderSurface, StrokeParams};
pub use snap::{SnapConfig, SnapResult, snap_line_endpoint};
pub use storage::{FileStorage, MemoryStorage, RetryQueue, Storage, StorageError, StorageResult};
pub use style::{LineType, LineWeight, RgbColor, StrokeOverride};
pub use tolerance::{points_equal, segments_equal};
pub use tools::{BuildSession, BuildState, ToolKind};
