//! Hollow animated silhouette drawn around the avatar.
//!
//! The outline is sampled at `OUTER_SHAPE_SAMPLES` angles. At each angle the
//! 12 `radii` control points are interpolated with a closed Catmull-Rom
//! spline, then perturbed by a few time-varying sine harmonics. Angle 0 is
//! straight up and angles grow clockwise, matching the order of `radii`.
//!
//! Unlike the particle field this clock runs on measured `dt`.

use crate::canvas::{BlendMode, Canvas, GradientStop, Paint, Path, RadialGradient};
use crate::config::OuterShapeConfig;
use crate::constants::*;
use glam::Vec2;
use log::debug;
use std::f32::consts::TAU;

// (angular frequency, time frequency, phase offset, weight) per harmonic
const NOISE_HARMONICS: [(f32, f32, f32, f32); 3] = [
    (3.0, 1.7, 0.0, 0.5),
    (5.0, -2.3, 1.3, 0.3),
    (9.0, 3.1, 2.1, 0.2),
];

#[derive(Debug, Clone)]
pub struct OuterShapeRenderer {
    config: Option<OuterShapeConfig>,
    time: f32,
    width: f32,
    height: f32,
}

impl OuterShapeRenderer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            config: None,
            time: 0.0,
            width,
            height,
        }
    }

    /// Replace the silhouette parameters. The running clock is kept.
    pub fn configure(&mut self, config: Option<OuterShapeConfig>) {
        debug!(
            "outer shape {}",
            if config.is_some() { "configured" } else { "disabled" }
        );
        self.config = config.map(|c| c.clamped());
    }

    pub fn config(&self) -> Option<&OuterShapeConfig> {
        self.config.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn step(&mut self, dt: f32) {
        if let Some(config) = &self.config {
            if dt.is_finite() && dt > 0.0 {
                self.time += dt * config.speed;
            }
        }
    }

    /// Point the silhouette is centered on: upper torso, not canvas center.
    pub fn anchor(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * OUTER_SHAPE_ANCHOR_FRACTION)
    }

    pub fn base_radius(&self) -> f32 {
        let scale = self.config.as_ref().map_or(1.0, |c| c.scale);
        self.width.min(self.height) * OUTER_SHAPE_BASE_RADIUS_FRACTION * scale
    }

    /// Spline-interpolated `radii` multiplier at `angle` (radians, 0 = up).
    pub fn radius_multiplier_at(&self, angle: f32) -> f32 {
        match &self.config {
            Some(config) => catmull_rom_closed(&config.radii, angle),
            None => 1.0,
        }
    }

    /// Outline radius at `angle` for a layer of nominal radius `layer_radius`,
    /// at the current clock. Pure: no state is touched.
    pub fn radius_at(&self, angle: f32, layer_radius: f32) -> f32 {
        let Some(config) = &self.config else {
            return layer_radius;
        };
        let multiplier = catmull_rom_closed(&config.radii, angle);
        let t = self.time * config.noise_speed;
        let wave: f32 = NOISE_HARMONICS
            .iter()
            .map(|&(freq, speed, offset, weight)| (angle * freq + t * speed + offset).sin() * weight)
            .sum();
        // Extensions (multiplier above 1) flicker harder than the base band.
        let extension = (multiplier - 1.0).max(0.0);
        let amplitude = config.noise_amount * OUTER_SHAPE_NOISE_PX * (1.0 + 2.0 * extension);
        (layer_radius * multiplier + wave * amplitude).max(0.0)
    }

    /// Nominal radius of layer `index` (0 = outermost) including the pulse.
    pub fn layer_radius(&self, index: u32) -> f32 {
        let Some(config) = &self.config else {
            return self.base_radius();
        };
        let frac = layer_fraction(index, config.layers);
        let pulse = 1.0 + (self.time * 2.0 + index as f32).sin() * config.pulse_amount;
        self.base_radius() * (1.0 - OUTER_SHAPE_INNER_SHRINK * frac) * pulse
    }

    /// Draw every layer, outermost first. Draws nothing when disabled.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let Some(config) = &self.config else {
            return;
        };
        if config.intensity <= 0.0 {
            return;
        }
        let anchor = self.anchor();

        canvas.save();
        canvas.set_global_alpha(1.0);
        canvas.set_blend_mode(BlendMode::Screen);

        for index in 0..config.layers {
            let frac = layer_fraction(index, config.layers);
            let layer_radius = self.layer_radius(index);

            let mut path = Path::new();
            let mut reach = 0.0f32;
            for sample in 0..OUTER_SHAPE_SAMPLES {
                let angle = sample as f32 / OUTER_SHAPE_SAMPLES as f32 * TAU;
                let r = self.radius_at(angle, layer_radius);
                reach = reach.max(r);
                let x = anchor.x + angle.sin() * r * config.scale_x;
                let y = anchor.y - angle.cos() * r;
                path = if sample == 0 {
                    path.move_to(x, y)
                } else {
                    path.line_to(x, y)
                };
            }
            let path = path.close();
            if reach <= 0.0 {
                continue;
            }

            let color = config.color.lerp(config.secondary_color, 1.0 - frac);
            let peak = config.intensity * (0.35 + 0.5 * frac);
            let clear = color.with_alpha(0.0);
            let hollow = config.hollow_ratio;
            let gradient = RadialGradient::new(
                anchor,
                reach,
                vec![
                    GradientStop::new(0.0, clear),
                    GradientStop::new((hollow - 0.15).max(0.0), clear),
                    GradientStop::new(hollow, color.fade(peak)),
                    GradientStop::new(1.0, clear),
                ],
            );
            canvas.fill_path(&path, &Paint::Radial(gradient));
        }

        canvas.restore();
    }
}

fn layer_fraction(index: u32, layers: u32) -> f32 {
    if layers <= 1 {
        0.0
    } else {
        index as f32 / (layers - 1) as f32
    }
}

/// Closed (periodic) Catmull-Rom through `points`, evenly spaced over a full turn.
fn catmull_rom_closed(points: &[f32], angle: f32) -> f32 {
    let n = points.len();
    if n == 0 {
        return 1.0;
    }
    let t = (angle / TAU).rem_euclid(1.0) * n as f32;
    let i = (t.floor() as usize) % n;
    let f = t - t.floor();
    let p0 = points[(i + n - 1) % n];
    let p1 = points[i];
    let p2 = points[(i + 1) % n];
    let p3 = points[(i + 2) % n];
    let value = 0.5
        * (2.0 * p1
            + (p2 - p0) * f
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * f * f
            + (3.0 * p1 - p0 - 3.0 * p2 + p3) * f * f * f);
    value.max(0.0)
}
