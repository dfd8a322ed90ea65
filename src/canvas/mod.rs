//! Immediate-mode 2D drawing surface.
//!
//! [`Canvas`] is the only thing the aura core draws through. It mirrors the
//! familiar HTML canvas model: a save/restore state stack holding the current
//! transform, global alpha and blend mode, plus fill/stroke calls that take a
//! [`Path`] and a [`Paint`].
//!
//! Two implementations ship with the crate:
//! - [`PixelCanvas`], a tiny-skia pixmap used by the viewer and headless runs
//! - [`RecordingCanvas`], which only records commands (used by tests)

mod path;
mod raster;
mod recording;

pub use path::{Path, PathCommand};
pub use raster::PixelCanvas;
pub use recording::{DrawCommand, DrawStyle, RecordingCanvas};

use crate::color::Color;
use glam::{Affine2, Vec2};

/// How a draw call is composited onto what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source-over
    #[default]
    Normal,
    /// Additive (`lighter` in canvas terms, `Plus` in tiny-skia), saturating at 1.0
    Lighter,
    /// `1 - (1 - src) * (1 - dst)`
    Screen,
}

/// A single stop of a gradient, `offset` in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Circular gradient centered on `center`, expressed in the coordinate space
/// that was current when the fill was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub radius: f32,
    pub stops: Vec<GradientStop>,
}

impl RadialGradient {
    pub fn new(center: Vec2, radius: f32, stops: Vec<GradientStop>) -> Self {
        Self {
            center,
            radius,
            stops,
        }
    }
}

/// What a fill or stroke is painted with.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Radial(RadialGradient),
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

impl From<RadialGradient> for Paint {
    fn from(gradient: RadialGradient) -> Self {
        Paint::Radial(gradient)
    }
}

/// The 2D surface the aura renders into.
pub trait Canvas {
    /// Surface size in pixels.
    fn size(&self) -> (f32, f32);

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn rotate(&mut self, angle: f32);
    fn set_global_alpha(&mut self, alpha: f32);
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Erase the whole surface to transparent, ignoring transform and blend state.
    fn clear(&mut self);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: &Paint);
    fn fill_path(&mut self, path: &Path, paint: &Paint);
    fn stroke_path(&mut self, path: &Path, paint: &Paint, line_width: f32);
}

/// Transform/alpha/blend state shared by the canvas implementations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CanvasState {
    pub transform: Affine2,
    pub alpha: f32,
    pub blend: BlendMode,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            alpha: 1.0,
            blend: BlendMode::Normal,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct StateStack {
    current: CanvasState,
    saved: Vec<CanvasState>,
}

impl StateStack {
    pub fn current(&self) -> CanvasState {
        self.current
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    pub fn restore(&mut self) {
        // Unbalanced restore is a no-op, as on an HTML canvas.
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.current.transform =
            self.current.transform * Affine2::from_translation(Vec2::new(dx, dy));
    }

    pub fn rotate(&mut self, angle: f32) {
        self.current.transform = self.current.transform * Affine2::from_angle(angle);
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.current.alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn set_blend(&mut self, mode: BlendMode) {
        self.current.blend = mode;
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_stack_restores() {
        let mut stack = StateStack::default();
        stack.save();
        stack.translate(5.0, 5.0);
        stack.set_alpha(0.25);
        stack.set_blend(BlendMode::Lighter);
        assert_eq!(stack.depth(), 1);
        stack.restore();
        assert_eq!(stack.current(), CanvasState::default());
        stack.restore();
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_non_finite_alpha_is_zeroed() {
        let mut stack = StateStack::default();
        stack.set_alpha(f32::NAN);
        assert_eq!(stack.current().alpha, 0.0);
        stack.set_alpha(3.0);
        assert_eq!(stack.current().alpha, 1.0);
    }
}
