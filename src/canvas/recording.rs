//! A [`Canvas`] that records draw calls instead of rasterizing them.

use super::{BlendMode, Canvas, Paint, Path, StateStack};
use glam::Affine2;

/// Transform/alpha/blend state captured with each recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawStyle {
    pub transform: Affine2,
    pub alpha: f32,
    pub blend: BlendMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        paint: Paint,
        style: DrawStyle,
    },
    FillPath {
        path: Path,
        paint: Paint,
        style: DrawStyle,
    },
    StrokePath {
        path: Path,
        paint: Paint,
        line_width: f32,
        style: DrawStyle,
    },
}

impl DrawCommand {
    /// Style the command was issued with (`None` for [`DrawCommand::Clear`]).
    pub fn style(&self) -> Option<&DrawStyle> {
        match self {
            DrawCommand::Clear => None,
            DrawCommand::FillRect { style, .. }
            | DrawCommand::FillPath { style, .. }
            | DrawCommand::StrokePath { style, .. } => Some(style),
        }
    }
}

/// Records every draw call along with the state it was issued under.
///
/// State changes (save/restore/translate/...) are not recorded themselves,
/// only their effect on subsequent draws.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    width: f32,
    height: f32,
    state: StateStack,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of fill/stroke calls, ignoring clears.
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| !matches!(c, DrawCommand::Clear))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn save_depth(&self) -> usize {
        self.state.depth()
    }

    fn style(&self) -> DrawStyle {
        let current = self.state.current();
        DrawStyle {
            transform: current.transform,
            alpha: current.alpha,
            blend: current.blend,
        }
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        self.state.restore();
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.translate(dx, dy);
    }

    fn rotate(&mut self, angle: f32) {
        self.state.rotate(angle);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.set_alpha(alpha);
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.set_blend(mode);
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: &Paint) {
        let style = self.style();
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            paint: paint.clone(),
            style,
        });
    }

    fn fill_path(&mut self, path: &Path, paint: &Paint) {
        let style = self.style();
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            paint: paint.clone(),
            style,
        });
    }

    fn stroke_path(&mut self, path: &Path, paint: &Paint, line_width: f32) {
        let style = self.style();
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            paint: paint.clone(),
            line_width,
            style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use glam::Vec2;

    #[test]
    fn test_records_state_with_each_draw() {
        let mut canvas = RecordingCanvas::new(100.0, 50.0);
        canvas.save();
        canvas.translate(10.0, 20.0);
        canvas.set_global_alpha(0.5);
        canvas.set_blend_mode(BlendMode::Lighter);
        canvas.fill_path(&Path::new().circle(0.0, 0.0, 1.0), &Color::WHITE.into());
        canvas.restore();
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, &Color::BLACK.into());

        let commands = canvas.commands();
        assert_eq!(commands.len(), 2);
        let first = commands[0].style().unwrap();
        assert_eq!(first.blend, BlendMode::Lighter);
        assert_eq!(first.alpha, 0.5);
        assert_eq!(
            first.transform.transform_point2(Vec2::ZERO),
            Vec2::new(10.0, 20.0)
        );
        let second = commands[1].style().unwrap();
        assert_eq!(second.blend, BlendMode::Normal);
        assert_eq!(second.alpha, 1.0);
        assert_eq!(canvas.save_depth(), 0);
    }

    #[test]
    fn test_clear_is_not_a_draw() {
        let mut canvas = RecordingCanvas::new(10.0, 10.0);
        canvas.clear();
        assert_eq!(canvas.draw_count(), 0);
        assert!(!canvas.is_empty());
        assert_eq!(canvas.take_commands(), vec![DrawCommand::Clear]);
        assert!(canvas.is_empty());
    }
}
