//! Errors raised by edits on a drawing.

use thiserror::Error;

use crate::layer::LayerId;

/// Error type for drawing and layer edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("layer not found: {0}")]
    LayerNotFound(LayerId),

    #[error("layer index {index} out of range ({len} layers)")]
    LayerIndexOutOfRange { index: usize, len: usize },

    #[error("drawable index {index} out of range ({len} drawables)")]
    DrawableOutOfRange { index: usize, len: usize },

    #[error("a drawing must keep at least one layer")]
    LastLayer,
}

/// Result type for edit operations.
pub type EditResult<T> = Result<T, EditError>;
