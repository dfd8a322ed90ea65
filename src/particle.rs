// --- File: particle.rs ---
use crate::canvas::{BlendMode, Canvas, GradientStop, Paint, Path, RadialGradient};
use crate::color::Color;
use crate::config::{AuraConfig, EntityTemplate, RenderMode, Style};
use crate::constants::*;
use crate::movement::MotionContext;
use crate::shape::ShapeSpec;
use crate::utils::{sample_range, sample_symmetric};
use glam::Vec2;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

pub type FieldRng = StdRng;

// (scale, alpha, blend) for each layered draw pass
const GLOW_PASSES: [(f32, f32, BlendMode); 3] = [
    (2.0, 0.15, BlendMode::Lighter),
    (1.3, 0.3, BlendMode::Lighter),
    (1.0, 1.0, BlendMode::Normal),
];
const SMOKE_PASSES: [(f32, f32, BlendMode); 3] = [
    (2.0, 0.3, BlendMode::Lighter),
    (1.4, 0.45, BlendMode::Lighter),
    (1.0, 0.7, BlendMode::Lighter),
];

/// One live particle. Always bound to exactly one entity template.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    /// In `(0, 1]` whenever observed from outside an update.
    pub life: f32,
    pub decay: f32,
    /// Monotonic, advanced by `PHASE_STEP` per update.
    pub phase: f32,
    /// Index into the aura's `entities`.
    pub template: usize,
}

/// Fixed-size pool of particles for one aura.
///
/// Dead particles are respawned in place, so the pool size only changes when
/// the density multiplier does.
pub struct ParticleField {
    config: AuraConfig,
    particles: Vec<Particle>,
    total_weight: f32,
    valid: bool,
    width: f32,
    height: f32,
    density_multiplier: f32,
    rng: FieldRng,
}

impl ParticleField {
    pub fn new(
        config: AuraConfig,
        width: f32,
        height: f32,
        density_multiplier: f32,
        rng: FieldRng,
    ) -> Self {
        // Configs built in code skip the JSON loader, so clamp here too.
        let config = config.sanitized();
        let valid = match config.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("refusing to spawn particles: {e}");
                false
            }
        };
        let total_weight = config
            .entities
            .iter()
            .map(EntityTemplate::effective_weight)
            .sum();

        let mut field = Self {
            config,
            particles: Vec::new(),
            total_weight,
            valid,
            width,
            height,
            density_multiplier: density_multiplier.max(0.0),
            rng,
        };
        field.fill_to_target();
        debug!(
            "particle field built: {} particles ({:?} mode)",
            field.particles.len(),
            field.config.render_mode
        );
        field
    }

    pub fn with_seed(config: AuraConfig, width: f32, height: f32, seed: u64) -> Self {
        Self::new(
            config,
            width,
            height,
            INITIAL_DENSITY_MULTIPLIER,
            FieldRng::seed_from_u64(seed),
        )
    }

    pub fn config(&self) -> &AuraConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// `round(density × multiplier)`, or 0 for an invalid config.
    pub fn target_population(&self) -> usize {
        if !self.valid {
            return 0;
        }
        (self.config.density as f32 * self.density_multiplier).round() as usize
    }

    pub fn set_density_multiplier(&mut self, multiplier: f32) {
        let multiplier = multiplier.max(0.0);
        if multiplier == self.density_multiplier {
            return;
        }
        self.density_multiplier = multiplier;
        let before = self.particles.len();
        self.fill_to_target();
        debug!("pool resized {before} -> {}", self.particles.len());
    }

    /// New surface size. Live particles keep their positions; new spawns
    /// use the new geometry.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn fill_to_target(&mut self) {
        let target = self.target_population();
        if self.particles.len() > target {
            self.particles.truncate(target);
            return;
        }
        self.particles.reserve(target - self.particles.len());
        while self.particles.len() < target {
            let p = spawn_particle(
                &self.config,
                self.total_weight,
                self.width,
                self.height,
                &mut self.rng,
            );
            self.particles.push(p);
        }
    }

    /// Advance every particle by one frame.
    ///
    /// Frame-coupled: `speed` scales velocity integration, the phase always
    /// advances by `PHASE_STEP`.
    pub fn update(&mut self, speed: f32) {
        let Self {
            config,
            particles,
            total_weight,
            width,
            height,
            rng,
            ..
        } = self;
        let ctx = MotionContext::new(*width, *height);
        let fluid = config.render_mode == RenderMode::Fluid;

        for p in particles.iter_mut() {
            // 1. Integrate
            p.position += p.velocity * speed;
            p.rotation += p.rotation_speed;
            p.phase += PHASE_STEP;

            let template = &config.entities[p.template];
            let size_cap = template.size_range.max * FLUID_MAX_GROWTH;

            // 2. Plume expansion
            if fluid {
                let age = 1.0 - p.life;
                let growth = FLUID_BASE_GROWTH_RATE + age * FLUID_AGED_GROWTH_RATE;
                p.size = (p.size * (1.0 + growth)).min(size_cap);
                p.position.x += sample_symmetric(rng, FLUID_MAX_DRIFT * age);
                p.velocity.y *= FLUID_VY_DAMPING;
            }

            // 3. Movement rule
            template.movement.apply(p, &ctx, rng);
            if fluid {
                p.size = p.size.min(size_cap);
            }

            // 4. Age
            p.life -= p.decay;
            if p.life <= 0.0 {
                *p = spawn_particle(config, *total_weight, *width, *height, rng);
            }
        }
    }

    /// Draw every particle in pool order.
    pub fn draw(&self, canvas: &mut dyn Canvas, size_multiplier: f32) {
        let fluid = self.config.render_mode == RenderMode::Fluid;
        let glow = self.config.glow_color;

        for p in &self.particles {
            let template = &self.config.entities[p.template];
            let scale = p.size * size_multiplier;
            if !(scale.is_finite() && scale > 0.0) {
                continue;
            }

            canvas.save();
            canvas.translate(p.position.x, p.position.y);
            canvas.rotate(p.rotation);

            match template.style {
                Style::Solid => {
                    let alpha = if fluid { p.life * FLUID_SOLID_ALPHA } else { p.life };
                    canvas.set_global_alpha(alpha);
                    canvas.set_blend_mode(BlendMode::Normal);
                    draw_shapes(canvas, &template.shapes, scale, glow);
                }
                Style::Glow => draw_passes(canvas, template, &GLOW_PASSES, p.life, scale, glow),
                Style::Smoke if fluid => draw_smoke_disc(canvas, template, p.life, scale, glow),
                Style::Smoke => draw_passes(canvas, template, &SMOKE_PASSES, p.life, scale, glow),
            }

            canvas.restore();
        }
    }
}

// --- Spawning ---

/// Index of the first template whose cumulative weight share covers `r`.
///
/// `r` is expected in `[0, total_weight)`. Float rounding at the very top of
/// the range lands on the last template with positive weight.
pub fn pick_template(entities: &[EntityTemplate], mut r: f32) -> usize {
    let mut last_positive = 0;
    for (i, entity) in entities.iter().enumerate() {
        let weight = entity.effective_weight();
        if weight <= 0.0 {
            continue;
        }
        if r < weight {
            return i;
        }
        r -= weight;
        last_positive = i;
    }
    last_positive
}

fn spawn_particle(
    config: &AuraConfig,
    total_weight: f32,
    width: f32,
    height: f32,
    rng: &mut FieldRng,
) -> Particle {
    let template_index = pick_template(&config.entities, rng.gen_range(0.0..total_weight));
    let template = &config.entities[template_index];

    let size = sample_range(rng, template.size_range.min, template.size_range.max);
    let vx = sample_range(
        rng,
        template.velocity_range.vx.min,
        template.velocity_range.vx.max,
    );
    let mut vy = sample_range(
        rng,
        template.velocity_range.vy.min,
        template.velocity_range.vy.max,
    );
    if !template.movement.keeps_downward_velocity() {
        vy = -vy.abs();
    }

    let center_x = width * 0.5;
    let feet = height * FEET_LINE_FRACTION;
    let (x, y, decay) = match config.render_mode {
        RenderMode::Fluid => (
            center_x + sample_symmetric(rng, width * FLUID_SPAWN_HALF_WIDTH_FRACTION),
            feet + sample_symmetric(rng, FLUID_SPAWN_HALF_HEIGHT_PX),
            sample_range(rng, FLUID_DECAY_MIN, FLUID_DECAY_MAX),
        ),
        RenderMode::Discrete => (
            center_x + sample_symmetric(rng, width * DISCRETE_SPAWN_HALF_WIDTH_FRACTION),
            sample_range(
                rng,
                feet - height * DISCRETE_SPAWN_ABOVE_FRACTION,
                feet + height * DISCRETE_SPAWN_BELOW_FRACTION,
            ),
            sample_range(rng, DISCRETE_DECAY_MIN, DISCRETE_DECAY_MAX),
        ),
    };

    Particle {
        position: Vec2::new(x, y),
        velocity: Vec2::new(vx, vy),
        size,
        rotation: rng.gen_range(0.0..TAU),
        rotation_speed: sample_symmetric(rng, MAX_ROTATION_SPEED),
        life: 1.0,
        decay,
        phase: rng.gen_range(0.0..TAU),
        template: template_index,
    }
}

// --- Drawing Helpers ---

fn draw_shapes(canvas: &mut dyn Canvas, shapes: &[ShapeSpec], scale: f32, glow: Color) {
    if shapes.is_empty() {
        // A template without shapes still shows up as a soft dot.
        canvas.fill_path(&Path::new().circle(0.0, 0.0, 0.5 * scale), &Paint::Solid(glow));
        return;
    }
    for shape in shapes {
        shape.draw(canvas, scale, glow);
    }
}

fn draw_passes(
    canvas: &mut dyn Canvas,
    template: &EntityTemplate,
    passes: &[(f32, f32, BlendMode)],
    life: f32,
    scale: f32,
    glow: Color,
) {
    for &(pass_scale, alpha, blend) in passes {
        canvas.set_global_alpha(alpha * life);
        canvas.set_blend_mode(blend);
        draw_shapes(canvas, &template.shapes, scale * pass_scale, glow);
    }
}

fn draw_smoke_disc(
    canvas: &mut dyn Canvas,
    template: &EntityTemplate,
    life: f32,
    scale: f32,
    glow: Color,
) {
    let color = template.theme_color(glow);
    let alpha = 0.5 * life * life;
    let radius = 0.5 * scale;
    let gradient = RadialGradient::new(
        Vec2::ZERO,
        radius,
        vec![
            GradientStop::new(0.0, color.fade(alpha)),
            GradientStop::new(0.4, color.fade(alpha * 0.5)),
            GradientStop::new(1.0, color.with_alpha(0.0)),
        ],
    );
    canvas.set_global_alpha(1.0);
    canvas.set_blend_mode(BlendMode::Normal);
    canvas.fill_path(&Path::new().circle(0.0, 0.0, radius), &gradient.into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, RecordingCanvas};
    use crate::config::{Range, VelocityRange};
    use crate::movement::{BounceParams, Movement, MovementParams, MovementPreset};
    use proptest::prelude::*;

    fn entity(weight: f32) -> EntityTemplate {
        EntityTemplate {
            weight,
            shapes: vec![ShapeSpec::circle(0.5).with_fill(Color::WHITE)],
            ..EntityTemplate::default()
        }
    }

    fn aura(density: u32, entities: Vec<EntityTemplate>) -> AuraConfig {
        AuraConfig {
            density,
            entities,
            ..AuraConfig::default()
        }
    }

    #[test]
    fn test_population_matches_density() {
        let mut field = ParticleField::with_seed(aura(50, vec![entity(1.0)]), 800.0, 600.0, 1);
        assert_eq!(field.len(), 50);
        for _ in 0..300 {
            field.update(1.0);
        }
        assert_eq!(field.len(), 50);

        field.set_density_multiplier(1.5);
        assert_eq!(field.len(), 75);
        field.set_density_multiplier(0.25);
        assert_eq!(field.len(), 13);
    }

    #[test]
    fn test_invalid_config_spawns_nothing() {
        let field = ParticleField::with_seed(aura(50, Vec::new()), 800.0, 600.0, 1);
        assert!(field.is_empty());

        let field = ParticleField::with_seed(aura(50, vec![entity(0.0)]), 800.0, 600.0, 1);
        assert!(field.is_empty());

        let mut inverted = entity(1.0);
        inverted.size_range = Range::new(9.0, 2.0);
        let field = ParticleField::with_seed(aura(50, vec![inverted]), 800.0, 600.0, 1);
        assert_eq!(field.target_population(), 0);
    }

    #[test]
    fn test_pick_template_first_cover_wins() {
        let entities = vec![entity(1.0), entity(0.0), entity(3.0)];
        assert_eq!(pick_template(&entities, 0.0), 0);
        assert_eq!(pick_template(&entities, 0.999), 0);
        assert_eq!(pick_template(&entities, 1.0), 2);
        assert_eq!(pick_template(&entities, 3.999), 2);
        assert_eq!(pick_template(&entities, 4.0), 2);
    }

    #[test]
    fn test_weighted_draw_distribution() {
        let config = aura(1, vec![entity(1.0), entity(3.0)]);
        let mut rng = FieldRng::seed_from_u64(42);
        let trials = 10_000;
        let second = (0..trials)
            .filter(|_| spawn_particle(&config, 4.0, 800.0, 600.0, &mut rng).template == 1)
            .count();
        let share = second as f32 / trials as f32;
        assert!((share - 0.75).abs() < 0.02, "share {share}");
    }

    #[test]
    fn test_upward_bias_negates_vy() {
        let mut template = entity(1.0);
        template.movement = Movement::Preset(MovementPreset::Float);
        template.velocity_range = VelocityRange {
            vx: Range::new(-1.0, 1.0),
            vy: Range::new(1.0, 2.0),
        };
        let field = ParticleField::with_seed(aura(500, vec![template]), 800.0, 600.0, 3);
        assert!(field.particles().iter().all(|p| p.velocity.y <= 0.0));
    }

    #[test]
    fn test_rain_keeps_downward_vy() {
        let mut template = entity(1.0);
        template.movement = Movement::Preset(MovementPreset::Rain);
        template.velocity_range.vy = Range::new(1.0, 2.0);
        let field = ParticleField::with_seed(aura(100, vec![template]), 800.0, 600.0, 3);
        assert!(field.particles().iter().all(|p| p.velocity.y >= 1.0));
    }

    #[test]
    fn test_fluid_plume_grows_and_rises() {
        let mut template = entity(1.0);
        template.size_range = Range::new(20.0, 35.0);
        let config = AuraConfig {
            render_mode: RenderMode::Fluid,
            ..aura(60, vec![template])
        };
        let mut field = ParticleField::with_seed(config, 800.0, 600.0, 9);
        let mean_y = |f: &ParticleField| {
            f.particles().iter().map(|p| p.position.y).sum::<f32>() / f.len() as f32
        };
        let start = mean_y(&field);
        for _ in 0..50 {
            field.update(1.0);
        }
        assert!(field.particles().iter().all(|p| p.size <= 4.0 * 35.0));
        assert!(mean_y(&field) < start);
    }

    #[test]
    fn test_bounce_floor_in_update() {
        let mut template = entity(1.0);
        template.movement = Movement::Params(MovementParams {
            bounce: Some(BounceParams {
                floor: 0.75,
                elasticity: 0.6,
            }),
            ..MovementParams::default()
        });
        let mut field = ParticleField::with_seed(aura(1, vec![template]), 500.0, 700.0, 5);
        {
            let p = &mut field.particles[0];
            p.position = Vec2::new(250.0, 524.0);
            p.velocity = Vec2::new(0.0, 3.0);
            p.life = 1.0;
            p.decay = 0.01;
        }
        field.update(1.0);
        let p = &field.particles()[0];
        assert_eq!(p.position.y, 525.0);
        assert!((p.velocity.y + 1.8).abs() < 1e-5);
    }

    #[test]
    fn test_dead_particle_respawns_same_call() {
        let mut field = ParticleField::with_seed(aura(1, vec![entity(1.0)]), 800.0, 600.0, 5);
        field.particles[0].life = 0.001;
        field.update(1.0);
        assert_eq!(field.particles()[0].life, 1.0);
    }

    #[test]
    fn test_glow_draws_three_passes() {
        let mut template = entity(1.0);
        template.style = Style::Glow;
        let field = ParticleField::with_seed(aura(1, vec![template]), 800.0, 600.0, 5);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        field.draw(&mut canvas, 1.0);
        let blends: Vec<BlendMode> = canvas
            .commands()
            .iter()
            .filter_map(|c| c.style().map(|s| s.blend))
            .collect();
        assert_eq!(
            blends,
            vec![BlendMode::Lighter, BlendMode::Lighter, BlendMode::Normal]
        );
        let last_alpha = canvas.commands()[2].style().unwrap().alpha;
        assert_eq!(last_alpha, 1.0);
        assert_eq!(canvas.save_depth(), 0);
    }

    #[test]
    fn test_glow_pass_scales() {
        let mut template = entity(1.0);
        template.style = Style::Glow;
        let field = ParticleField::with_seed(aura(1, vec![template]), 800.0, 600.0, 5);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        field.draw(&mut canvas, 1.0);
        let widths: Vec<f32> = canvas
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillPath { path, .. } => path.bounds().map(|(min, max)| max.x - min.x),
                _ => None,
            })
            .collect();
        assert_eq!(widths.len(), 3);
        let core = widths[2];
        assert!((core - field.particles()[0].size).abs() < 1e-3);
        for (width, (pass_scale, _, _)) in widths.iter().zip(GLOW_PASSES) {
            assert!((width / core - pass_scale).abs() < 1e-4, "{widths:?}");
        }
    }

    #[test]
    fn test_fluid_growth_speeds_up_with_age() {
        let mut template = entity(1.0);
        template.size_range = Range::new(10.0, 10.0);
        template.movement = Movement::Params(MovementParams::default());
        let config = AuraConfig {
            render_mode: RenderMode::Fluid,
            ..aura(2, vec![template])
        };
        let mut field = ParticleField::with_seed(config, 800.0, 600.0, 5);
        for (p, life) in field.particles.iter_mut().zip([1.0, 0.2]) {
            p.size = 10.0;
            p.life = life;
            p.decay = 0.01;
        }
        field.update(1.0);
        let fresh = field.particles()[0].size / 10.0;
        let aged = field.particles()[1].size / 10.0;
        assert!((fresh - (1.0 + FLUID_BASE_GROWTH_RATE)).abs() < 1e-6);
        let expected = 1.0 + FLUID_BASE_GROWTH_RATE + 0.8 * FLUID_AGED_GROWTH_RATE;
        assert!((aged - expected).abs() < 1e-6);
        assert!(aged > fresh);
    }

    #[test]
    fn test_fluid_smoke_draws_gradient_disc() {
        let mut template = entity(1.0);
        template.style = Style::Smoke;
        template.shapes = vec![
            ShapeSpec::circle(0.5).with_fill(Color::from_rgb8(200, 200, 220)),
            ShapeSpec::circle(0.2),
        ];
        let config = AuraConfig {
            render_mode: RenderMode::Fluid,
            ..aura(1, vec![template])
        };
        let field = ParticleField::with_seed(config, 800.0, 600.0, 5);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        field.draw(&mut canvas, 1.0);
        assert_eq!(canvas.draw_count(), 1);
        match &canvas.commands()[0] {
            DrawCommand::FillPath {
                paint: Paint::Radial(gradient),
                ..
            } => {
                // life = 1 at spawn, so the core alpha is 0.5
                assert!((gradient.stops[0].color.a - 0.5).abs() < 1e-6);
                assert_eq!(gradient.stops[2].color.a, 0.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_discrete_smoke_is_additive() {
        let mut template = entity(1.0);
        template.style = Style::Smoke;
        let field = ParticleField::with_seed(aura(1, vec![template]), 800.0, 600.0, 5);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        field.draw(&mut canvas, 1.0);
        let alphas: Vec<f32> = canvas
            .commands()
            .iter()
            .filter_map(|c| c.style())
            .map(|s| {
                assert_eq!(s.blend, BlendMode::Lighter);
                s.alpha
            })
            .collect();
        assert_eq!(alphas, vec![0.3, 0.45, 0.7]);
    }

    proptest! {
        #[test]
        fn prop_population_and_life_bounds(
            seed in any::<u64>(),
            density in 0u32..120,
            multiplier in 0.0f32..3.0,
            steps in 1usize..200,
            fluid in any::<bool>(),
        ) {
            let mut template = entity(1.0);
            template.movement = Movement::Preset(MovementPreset::Swarm);
            let config = AuraConfig {
                render_mode: if fluid { RenderMode::Fluid } else { RenderMode::Discrete },
                ..aura(density, vec![template, entity(2.0)])
            };
            let mut field = ParticleField::new(
                config, 640.0, 480.0, multiplier, FieldRng::seed_from_u64(seed),
            );
            let expected = (density as f32 * multiplier).round() as usize;
            prop_assert_eq!(field.len(), expected);
            for _ in 0..steps {
                field.update(1.0);
                prop_assert_eq!(field.len(), expected);
                for p in field.particles() {
                    prop_assert!(p.life > 0.0 && p.life <= 1.0);
                    prop_assert!(p.template < 2);
                }
            }
        }
    }
}
