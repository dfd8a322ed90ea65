//! Frame driver: composes background, particle field and outer shape each frame.

use crate::canvas::{BlendMode, Canvas, Paint};
use crate::config::{AuraConfig, Background, RenderMode, Tunables};
use crate::constants::{BLACK_FADE, DARK_FADE};
use crate::outer_shape::OuterShapeRenderer;
use crate::particle::{FieldRng, ParticleField};
use log::{debug, info};
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No aura selected. The canvas is cleared and nothing is simulated.
    Idle,
    /// An aura is loaded and animating.
    Active,
    /// A new aura was handed over and replaces the current one at the start
    /// of the next frame.
    Transitioning,
}

/// Snapshot for title bars and logs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub particles: usize,
    pub state: DriverState,
}

pub struct FrameDriver {
    state: DriverState,
    running: bool,
    field: Option<ParticleField>,
    outer_shape: OuterShapeRenderer,
    pending: Option<AuraConfig>,
    tunables: Tunables,
    width: f32,
    height: f32,
    rng: FieldRng,
    frame: u64,
}

impl FrameDriver {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_rng(width, height, FieldRng::from_entropy())
    }

    /// Deterministic driver: the same seed and config replay the same frames.
    pub fn with_seed(width: f32, height: f32, seed: u64) -> Self {
        Self::with_rng(width, height, FieldRng::seed_from_u64(seed))
    }

    fn with_rng(width: f32, height: f32, rng: FieldRng) -> Self {
        Self {
            state: DriverState::Idle,
            running: false,
            field: None,
            outer_shape: OuterShapeRenderer::new(width, height),
            pending: None,
            tunables: Tunables::default(),
            width,
            height,
            rng,
            frame: 0,
        }
    }

    // --- Loop Control ---

    pub fn start(&mut self) {
        if !self.running {
            debug!("frame loop started");
        }
        self.running = true;
    }

    /// Cancel future frames. A frame already in progress still completes.
    pub fn stop(&mut self) {
        if self.running {
            debug!("frame loop stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // --- Configuration ---

    /// Hand over a new aura. The current pool keeps animating until the next
    /// frame, which discards it and builds the new one before drawing.
    pub fn swap_config(&mut self, config: AuraConfig) {
        debug!("aura swap requested: {:?}", config.name);
        self.pending = Some(config);
        self.state = DriverState::Transitioning;
    }

    /// Drop the current aura and go back to idle.
    pub fn clear_config(&mut self) {
        self.pending = None;
        self.field = None;
        self.outer_shape.configure(None);
        self.state = DriverState::Idle;
        debug!("aura cleared, idle");
    }

    /// Rebuild the current aura from a fresh random stream.
    pub fn reseed(&mut self) {
        if self.pending.is_none() {
            if let Some(field) = &self.field {
                self.swap_config(field.config().clone());
            }
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// The aura currently on screen (not a pending one).
    pub fn config(&self) -> Option<&AuraConfig> {
        self.field.as_ref().map(ParticleField::config)
    }

    pub fn field(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    pub fn outer_shape(&self) -> &OuterShapeRenderer {
        &self.outer_shape
    }

    // --- Tunables ---

    pub fn tunables(&self) -> Tunables {
        self.tunables
    }

    pub fn set_density_multiplier(&mut self, value: f32) {
        self.tunables.set_density(value);
    }

    pub fn set_speed_multiplier(&mut self, value: f32) {
        self.tunables.set_speed(value);
    }

    pub fn set_size_multiplier(&mut self, value: f32) {
        self.tunables.set_size(value);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if width == self.width && height == self.height {
            return;
        }
        debug!("driver resized to {width}x{height}");
        self.width = width;
        self.height = height;
        if let Some(field) = &mut self.field {
            field.resize(width, height);
        }
        self.outer_shape.resize(width, height);
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            frame: self.frame,
            particles: self.field.as_ref().map_or(0, ParticleField::len),
            state: self.state,
        }
    }

    // --- Frame ---

    /// Run one frame against `canvas`, `dt` seconds after the previous one.
    ///
    /// Returns whether the host should schedule another frame.
    pub fn frame(&mut self, canvas: &mut dyn Canvas, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        let (width, height) = canvas.size();
        self.resize(width, height);
        self.apply_pending();

        match self.state {
            DriverState::Idle => canvas.clear(),
            DriverState::Active | DriverState::Transitioning => {
                if let Some(field) = &mut self.field {
                    paint_background(canvas, field.config());
                    field.set_density_multiplier(self.tunables.density());
                    field.update(self.tunables.speed());
                    field.draw(canvas, self.tunables.size());
                }
                self.outer_shape.step(dt);
                self.outer_shape.draw(canvas);
            }
        }

        self.frame += 1;
        self.running
    }

    fn apply_pending(&mut self) {
        let Some(config) = self.pending.take() else {
            return;
        };
        // The old pool is dropped here, before anything of this frame is drawn.
        let rng = FieldRng::seed_from_u64(self.rng.r#gen());
        let field = ParticleField::new(
            config,
            self.width,
            self.height,
            self.tunables.density(),
            rng,
        );
        self.outer_shape.configure(field.config().outer_shape.clone());
        info!(
            "aura {:?} active with {} particles",
            field.config().name,
            field.len()
        );
        self.field = Some(field);
        self.state = DriverState::Active;
    }
}

fn paint_background(canvas: &mut dyn Canvas, config: &AuraConfig) {
    // Trails look wrong on expanding gradients, so fluid always clears.
    let fade = match (config.render_mode, config.background) {
        (RenderMode::Fluid, _) | (_, Background::Clear) => None,
        (_, Background::DarkFade) => Some(DARK_FADE),
        (_, Background::BlackFade) => Some(BLACK_FADE),
    };
    let Some(fade) = fade else {
        canvas.clear();
        return;
    };
    let (width, height) = canvas.size();
    canvas.save();
    canvas.set_global_alpha(1.0);
    canvas.set_blend_mode(BlendMode::Normal);
    canvas.fill_rect(0.0, 0.0, width, height, &Paint::Solid(fade));
    canvas.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, PixelCanvas, RecordingCanvas};
    use crate::config::{EntityTemplate, OuterShapeConfig};
    use crate::constants::{FRICTION_MAX, GRAVITY_BOUND, MAX_PARAM_VELOCITY, SCALE_MAX};
    use crate::movement::{Movement, MovementParams};
    use crate::shape::ShapeSpec;
    use crate::color::Color;

    fn aura(density: u32) -> AuraConfig {
        AuraConfig {
            density,
            entities: vec![EntityTemplate {
                shapes: vec![ShapeSpec::circle(0.5).with_fill(Color::WHITE)],
                ..EntityTemplate::default()
            }],
            ..AuraConfig::default()
        }
    }

    fn running_driver() -> FrameDriver {
        let mut driver = FrameDriver::with_seed(400.0, 300.0, 11);
        driver.start();
        driver
    }

    #[test]
    fn test_stopped_driver_draws_nothing() {
        let mut driver = FrameDriver::with_seed(400.0, 300.0, 11);
        driver.swap_config(aura(10));
        let mut canvas = RecordingCanvas::new(400.0, 300.0);
        assert!(!driver.frame(&mut canvas, 0.016));
        assert!(canvas.is_empty());
        assert_eq!(driver.state(), DriverState::Transitioning);
    }

    #[test]
    fn test_idle_clears_only() {
        let mut driver = running_driver();
        let mut canvas = RecordingCanvas::new(400.0, 300.0);
        assert!(driver.frame(&mut canvas, 0.016));
        assert_eq!(canvas.commands(), &[DrawCommand::Clear]);
        assert_eq!(driver.stats().particles, 0);
    }

    #[test]
    fn test_swap_is_atomic() {
        let mut driver = running_driver();
        let mut canvas = RecordingCanvas::new(400.0, 300.0);
        driver.swap_config(aura(100));
        for _ in 0..5 {
            driver.frame(&mut canvas, 0.016);
            assert_eq!(driver.stats().particles, 100);
        }
        driver.swap_config(aura(40));
        // Still the old pool until the next frame runs.
        assert_eq!(driver.state(), DriverState::Transitioning);
        assert_eq!(driver.stats().particles, 100);
        for _ in 0..5 {
            canvas.take_commands();
            driver.frame(&mut canvas, 0.016);
            let drawn = canvas.draw_count();
            assert!(drawn == 40 || drawn == 100, "drew {drawn}");
            assert_eq!(driver.stats().particles, 40);
            assert_eq!(driver.state(), DriverState::Active);
        }
    }

    #[test]
    fn test_background_policy() {
        let mut driver = running_driver();
        let mut canvas = RecordingCanvas::new(400.0, 300.0);

        driver.swap_config(AuraConfig {
            background: Background::DarkFade,
            ..aura(3)
        });
        driver.frame(&mut canvas, 0.016);
        match &canvas.commands()[0] {
            DrawCommand::FillRect {
                width,
                height,
                paint,
                style,
                ..
            } => {
                assert_eq!((*width, *height), (400.0, 300.0));
                assert_eq!(*paint, Paint::Solid(DARK_FADE));
                assert_eq!(style.blend, BlendMode::Normal);
            }
            other => panic!("unexpected {other:?}"),
        }

        // fluid mode overrides the fade
        canvas.take_commands();
        driver.swap_config(AuraConfig {
            background: Background::BlackFade,
            render_mode: RenderMode::Fluid,
            ..aura(3)
        });
        driver.frame(&mut canvas, 0.016);
        assert_eq!(canvas.commands()[0], DrawCommand::Clear);
    }

    #[test]
    fn test_outer_shape_drawn_last() {
        let mut driver = running_driver();
        let mut canvas = RecordingCanvas::new(400.0, 300.0);
        driver.swap_config(AuraConfig {
            outer_shape: Some(OuterShapeConfig {
                layers: 2,
                ..OuterShapeConfig::default()
            }),
            ..aura(5)
        });
        driver.frame(&mut canvas, 0.016);
        let commands = canvas.commands();
        // clear + 5 particles + 2 layers
        assert_eq!(commands.len(), 8);
        assert_eq!(commands[0], DrawCommand::Clear);
        for command in &commands[6..] {
            assert_eq!(command.style().unwrap().blend, BlendMode::Screen);
        }
        assert!(driver.outer_shape().time() > 0.0);
    }

    #[test]
    fn test_tunables_apply_next_frame() {
        let mut driver = running_driver();
        let mut canvas = RecordingCanvas::new(400.0, 300.0);
        driver.swap_config(aura(20));
        driver.frame(&mut canvas, 0.016);
        driver.set_density_multiplier(2.0);
        driver.set_speed_multiplier(100.0);
        assert_eq!(driver.stats().particles, 20);
        driver.frame(&mut canvas, 0.016);
        assert_eq!(driver.stats().particles, 40);
        assert_eq!(driver.tunables().speed(), crate::constants::MAX_SPEED_MULTIPLIER);
    }

    #[test]
    fn test_clear_config_returns_to_idle() {
        let mut driver = running_driver();
        let mut canvas = RecordingCanvas::new(400.0, 300.0);
        driver.swap_config(aura(10));
        driver.frame(&mut canvas, 0.016);
        driver.clear_config();
        assert_eq!(driver.state(), DriverState::Idle);
        assert!(driver.config().is_none());
        canvas.take_commands();
        driver.frame(&mut canvas, 0.016);
        assert_eq!(canvas.commands(), &[DrawCommand::Clear]);
    }

    #[test]
    fn test_same_seed_same_pixels() {
        let render = || {
            let mut driver = running_driver();
            driver.swap_config(aura(30));
            let mut canvas = PixelCanvas::new(64, 48).unwrap();
            for _ in 0..10 {
                driver.frame(&mut canvas, 0.016);
            }
            canvas.to_rgba8()
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn test_swapped_params_are_clamped() {
        let mut config = aura(20);
        config.entities[0].movement = Movement::Params(MovementParams {
            friction: 1.5,
            scale: 2.0,
            gravity: 3.0,
            ..MovementParams::default()
        });
        let mut driver = running_driver();
        let mut canvas = RecordingCanvas::new(400.0, 300.0);
        driver.swap_config(config);
        for _ in 0..150 {
            driver.frame(&mut canvas, 0.016);
            canvas.take_commands();
        }

        let Some(Movement::Params(params)) = driver.config().map(|c| c.entities[0].movement)
        else {
            panic!("params movement lost on swap");
        };
        assert_eq!(params.friction, FRICTION_MAX);
        assert_eq!(params.scale, SCALE_MAX);
        assert_eq!(params.gravity, GRAVITY_BOUND);
        let field = driver.field().unwrap();
        assert!(field.particles().iter().all(|p| p.size.is_finite()));
        assert!(
            field
                .particles()
                .iter()
                .all(|p| p.velocity.abs().max_element() <= MAX_PARAM_VELOCITY)
        );
    }

    #[test]
    fn test_reseed_keeps_aura() {
        let mut driver = running_driver();
        let mut canvas = RecordingCanvas::new(400.0, 300.0);
        driver.swap_config(aura(10));
        driver.frame(&mut canvas, 0.016);
        let before = driver.field().unwrap().particles()[0].clone();
        driver.reseed();
        driver.frame(&mut canvas, 0.016);
        assert_eq!(driver.stats().particles, 10);
        assert_ne!(driver.field().unwrap().particles()[0], before);
    }
}
