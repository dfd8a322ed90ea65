//! Data-driven 2D particle auras.
//!
//! An [`AuraConfig`] (usually loaded from JSON) describes weighted entity
//! templates, their shapes and movement, plus an optional hollow outer
//! silhouette. A [`FrameDriver`] turns that description into frames drawn
//! through the [`canvas::Canvas`] trait.

pub mod canvas;
pub mod color;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod movement;
pub mod outer_shape;
pub mod particle;
pub mod presets;
pub mod shape;
pub mod utils;

pub use color::Color;
pub use config::{AuraConfig, Tunables};
pub use driver::{DriverState, FrameDriver, FrameStats};
pub use error::{AuraError, ConfigError, Result};
pub use outer_shape::OuterShapeRenderer;
pub use particle::{Particle, ParticleField};
