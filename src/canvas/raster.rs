//! CPU canvas backed by a `tiny_skia::Pixmap`.
//!
//! The pixmap stores premultiplied RGBA8. Global alpha is folded into the
//! paint colors, and the current transform is handed to tiny-skia with each
//! draw call so gradients follow it too.

use super::{BlendMode, Canvas, CanvasState, Paint, Path, StateStack};
use crate::color::Color;
use crate::error::{AuraError, Result};
use glam::Affine2;
use tiny_skia::{FillRule, Pixmap, Point, Rect, Shader, SpreadMode, Stroke, Transform};

/// An RGBA pixel buffer that implements [`Canvas`].
pub struct PixelCanvas {
    pixmap: Pixmap,
    state: StateStack,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width.max(1), height.max(1))
            .ok_or(AuraError::CanvasSize { width, height })?;
        Ok(Self {
            pixmap,
            state: StateStack::default(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Resize the surface. Contents and drawing state are discarded; on
    /// error the old surface is kept.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        *self = Self::new(width, height)?;
        Ok(())
    }

    /// Premultiplied RGBA at `(x, y)` in `0.0..=1.0`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        let px = self.pixmap.pixel(x, y)?;
        let unit = |v: u8| v as f32 / 255.0;
        Some([
            unit(px.red()),
            unit(px.green()),
            unit(px.blue()),
            unit(px.alpha()),
        ])
    }

    /// Straight-alpha RGBA8 bytes, row-major, ready for texture upload.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    fn draw(&mut self, paint: &Paint, draw: impl FnOnce(&mut Pixmap, &tiny_skia::Paint, Transform)) {
        let state = self.state.current();
        if state.alpha <= 0.0 {
            return;
        }
        let Some(skia_paint) = skia_paint(paint, state) else {
            return;
        };
        draw(&mut self.pixmap, &skia_paint, skia_transform(state.transform));
    }
}

fn skia_color(color: Color, alpha: f32) -> tiny_skia::Color {
    let unit = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
    tiny_skia::Color::from_rgba(
        unit(color.r),
        unit(color.g),
        unit(color.b),
        unit(color.a * alpha),
    )
    .unwrap_or(tiny_skia::Color::TRANSPARENT)
}

fn skia_blend(mode: BlendMode) -> tiny_skia::BlendMode {
    match mode {
        BlendMode::Normal => tiny_skia::BlendMode::SourceOver,
        BlendMode::Lighter => tiny_skia::BlendMode::Plus,
        BlendMode::Screen => tiny_skia::BlendMode::Screen,
    }
}

fn skia_transform(t: Affine2) -> Transform {
    let (x, y) = (t.matrix2.x_axis, t.matrix2.y_axis);
    Transform::from_row(x.x, x.y, y.x, y.y, t.translation.x, t.translation.y)
}

/// `None` when the paint cannot produce any pixels (no stops, zero radius).
fn skia_paint(paint: &Paint, state: CanvasState) -> Option<tiny_skia::Paint<'static>> {
    let shader = match paint {
        Paint::Solid(color) => Shader::SolidColor(skia_color(*color, state.alpha)),
        Paint::Radial(gradient) => {
            let center = Point::from_xy(gradient.center.x, gradient.center.y);
            let stops = gradient
                .stops
                .iter()
                .map(|s| {
                    tiny_skia::GradientStop::new(
                        s.offset.clamp(0.0, 1.0),
                        skia_color(s.color, state.alpha),
                    )
                })
                .collect();
            tiny_skia::RadialGradient::new(
                center,
                center,
                gradient.radius,
                stops,
                SpreadMode::Pad,
                Transform::identity(),
            )?
        }
    };
    Some(tiny_skia::Paint {
        shader,
        blend_mode: skia_blend(state.blend),
        anti_alias: true,
        ..Default::default()
    })
}

impl Canvas for PixelCanvas {
    fn size(&self) -> (f32, f32) {
        (self.width() as f32, self.height() as f32)
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
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: &Paint) {
        let Some(rect) = Rect::from_xywh(x, y, width, height) else {
            return;
        };
        self.draw(paint, |pixmap, paint, transform| {
            pixmap.fill_rect(rect, paint, transform, None)
        });
    }

    fn fill_path(&mut self, path: &Path, paint: &Paint) {
        let Some(path) = path.to_skia() else {
            return;
        };
        self.draw(paint, |pixmap, paint, transform| {
            pixmap.fill_path(&path, paint, FillRule::Winding, transform, None)
        });
    }

    fn stroke_path(&mut self, path: &Path, paint: &Paint, line_width: f32) {
        if !(line_width.is_finite() && line_width > 0.0) {
            return;
        }
        let Some(path) = path.to_skia() else {
            return;
        };
        let stroke = Stroke {
            width: line_width,
            ..Stroke::default()
        };
        self.draw(paint, |pixmap, paint, transform| {
            pixmap.stroke_path(&path, paint, &stroke, transform, None)
        });
    }
}

impl std::fmt::Debug for PixelCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelCanvas")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("depth", &self.state.depth())
            .finish()
    }
}
