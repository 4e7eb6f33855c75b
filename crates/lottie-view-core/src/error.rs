//! Error types for the view adapter.
//!
//! The adapter never returns errors across the host boundary: a failure is
//! either discarded locally (late callback, rejected bounds) or fanned out
//! through the `Failed` view event. `AdapterError` is the payload of that
//! event and of the internal validation helpers.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AdapterError {
    /// The engine rejected the animation source.
    #[error("animation source rejected: {reason}")]
    SourceRejected { reason: String },

    /// A frame bound pair with min above max.
    #[error("invalid frame range: {min} > {max}")]
    InvalidFrameRange { min: u32, max: u32 },

    /// A progress bound pair with min above max.
    #[error("invalid progress range: {min} > {max}")]
    InvalidProgressRange { min: f32, max: f32 },

    /// Opaque failure reported by the engine at runtime.
    #[error("engine failure: {message}")]
    Engine { message: String },
}

impl AdapterError {
    /// Wrap an opaque engine message.
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// Category label for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::SourceRejected { .. } => "load",
            Self::InvalidFrameRange { .. } | Self::InvalidProgressRange { .. } => "bounds",
            Self::Engine { .. } => "engine",
        }
    }
}
