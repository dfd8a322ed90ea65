//! Error types for aura configuration loading and presentation.

use std::io;
use thiserror::Error;

/// Problems found in an aura configuration.
///
/// None of these abort rendering: the particle field treats an invalid
/// configuration as an empty population.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// `density > 0` but no entity templates were supplied
    #[error("aura has density {0} but no entities")]
    MissingEntities(u32),

    /// Every entity weight is zero (or was clamped to zero)
    #[error("entity weights sum to zero")]
    ZeroTotalWeight,

    /// A `[min, max]` range with `min > max` (or a non-finite bound)
    #[error("entity {entity}: {field} range [{min}, {max}] is degenerate")]
    InvalidRange {
        entity: usize,
        field: &'static str,
        min: f32,
        max: f32,
    },

    /// A color string that is not `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()` or `rgba()`
    #[error("invalid color: {0:?}")]
    InvalidColor(String),
}

/// Top level error for everything that can fail outside the per-frame path.
#[derive(Debug, Error)]
pub enum AuraError {
    #[error("invalid aura config: {0}")]
    Config(#[from] ConfigError),

    #[error("malformed aura JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("cannot allocate a {width}x{height} canvas")]
    CanvasSize { width: u32, height: u32 },

    #[error("renderer error: {0}")]
    Renderer(String),
}

pub type Result<T> = std::result::Result<T, AuraError>;
