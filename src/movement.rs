//! Per-frame motion rules applied after position integration.
//!
//! A template either names one of the [`MovementPreset`]s, each a fixed
//! closed-form adjustment, or supplies [`MovementParams`], a composable set
//! of bounded influences. Both are deterministic functions of the particle
//! state, except for `jitter` which draws from the field's RNG.

use crate::constants::*;
use crate::particle::Particle;
use crate::utils::{bounded, sample_symmetric};
use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Canvas geometry the motion rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionContext {
    pub width: f32,
    pub height: f32,
}

impl MotionContext {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

// --- Named Presets ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementPreset {
    #[default]
    Float,
    Zigzag,
    Orbit,
    Rise,
    Wander,
    Spiral,
    Rain,
    Explode,
    Swarm,
    Bounce,
    Pulse,
    Vortex,
    Levitate,
    Fountain,
    Wave,
    Tornado,
    Drift,
    Flutter,
    Whirlpool,
    Magnetic,
    Gravity,
    Hover,
}

impl MovementPreset {
    pub const ALL: [MovementPreset; 22] = [
        MovementPreset::Float,
        MovementPreset::Zigzag,
        MovementPreset::Orbit,
        MovementPreset::Rise,
        MovementPreset::Wander,
        MovementPreset::Spiral,
        MovementPreset::Rain,
        MovementPreset::Explode,
        MovementPreset::Swarm,
        MovementPreset::Bounce,
        MovementPreset::Pulse,
        MovementPreset::Vortex,
        MovementPreset::Levitate,
        MovementPreset::Fountain,
        MovementPreset::Wave,
        MovementPreset::Tornado,
        MovementPreset::Drift,
        MovementPreset::Flutter,
        MovementPreset::Whirlpool,
        MovementPreset::Magnetic,
        MovementPreset::Gravity,
        MovementPreset::Hover,
    ];

    /// Presets whose spawn velocity is allowed to point down.
    pub fn keeps_downward_velocity(self) -> bool {
        matches!(self, MovementPreset::Rain | MovementPreset::Bounce)
    }

    pub fn apply(self, p: &mut Particle, ctx: &MotionContext) {
        let phase = p.phase;
        let center = ctx.center();
        // Unit vector from the canvas center to the particle.
        let outward = (p.position - center).normalize_or_zero();

        match self {
            MovementPreset::Float => {
                p.position.x += phase.sin() * 0.6;
                p.position.y += (phase * 0.5).cos() * 0.2;
            }
            MovementPreset::Zigzag => {
                let s = (phase * 3.0).sin();
                if s > 0.0 {
                    p.position.x += 1.2;
                } else if s < 0.0 {
                    p.position.x -= 1.2;
                }
            }
            MovementPreset::Orbit => {
                let offset = p.position - center;
                p.position = center + Vec2::from_angle(0.02).rotate(offset);
            }
            MovementPreset::Rise => {
                p.velocity.y -= 0.03;
                p.position.x += (phase * 0.7).sin() * 0.3;
            }
            MovementPreset::Wander => {
                p.velocity.x += (phase * 1.3).sin() * 0.05 + (phase * 0.7).cos() * 0.05;
                p.velocity.y += (phase * 0.9).cos() * 0.04;
            }
            MovementPreset::Spiral => {
                p.position.x += (phase * 2.0).cos() * (1.0 - p.life) * 2.0;
                p.position.y -= 0.3;
            }
            MovementPreset::Rain => {
                p.velocity.y = (p.velocity.y + 0.15).min(12.0);
                p.velocity.x *= 0.98;
            }
            MovementPreset::Explode => {
                p.velocity += outward * 0.08;
                p.velocity *= 0.99;
            }
            MovementPreset::Swarm => {
                p.velocity += (center - p.position) * 0.0015;
                p.velocity.x += (phase * 3.0).sin() * 0.05;
                p.velocity.y += (phase * 2.3).cos() * 0.05;
            }
            MovementPreset::Bounce => {
                p.velocity.y += 0.2;
                let floor = ctx.height * 0.9;
                if p.position.y > floor {
                    p.position.y = floor;
                    p.velocity.y = -p.velocity.y * 0.7;
                }
            }
            MovementPreset::Pulse => {
                p.position += outward * (phase * 3.0).sin() * 1.5;
            }
            MovementPreset::Vortex => {
                let distance = p.position.distance(center);
                p.position += outward.perp() * (60.0 / (distance + 30.0));
            }
            MovementPreset::Levitate => {
                p.position.y += (phase * 1.5).sin() * 0.8;
                p.velocity.y *= 0.97;
            }
            MovementPreset::Fountain => {
                p.velocity.y += 0.08;
                p.velocity.x *= 0.995;
            }
            MovementPreset::Wave => {
                p.position.y += (phase * 2.0 + p.position.x * 0.02).sin();
            }
            MovementPreset::Tornado => {
                // 0 at the bottom edge, 1 at the top: the funnel widens as it climbs.
                let height = if ctx.height > 0.0 {
                    (1.0 - p.position.y / ctx.height).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                p.position.x += (phase * 4.0).cos() * (1.0 + height * 6.0);
                p.velocity.y -= 0.02;
            }
            MovementPreset::Drift => {
                p.velocity.x += (phase * 0.3).sin() * 0.02;
                p.velocity.y *= 0.99;
            }
            MovementPreset::Flutter => {
                p.position.x += (phase * 6.0).sin() * 1.2;
                p.position.y += (phase * 9.0).sin().abs() * 0.6 - 0.3;
            }
            MovementPreset::Whirlpool => {
                p.position += outward.perp() * 1.5 - outward * 0.5;
            }
            MovementPreset::Magnetic => {
                p.velocity += -outward * 0.06 * (phase * 0.5).sin();
            }
            MovementPreset::Gravity => {
                p.velocity.y += 0.1;
            }
            MovementPreset::Hover => {
                p.position.y += (phase * 2.0).sin() * 0.4;
                p.velocity.x *= 0.95;
                p.velocity.y *= 0.9;
            }
        }
    }
}

// --- Structured Params ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveAxis {
    #[default]
    X,
    Y,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    pub axis: WaveAxis,
    pub amp: f32,
    pub freq: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BounceParams {
    /// Floor line as a fraction of canvas height.
    pub floor: f32,
    pub elasticity: f32,
}

impl Default for BounceParams {
    fn default() -> Self {
        Self {
            floor: 0.9,
            elasticity: 0.6,
        }
    }
}

/// Composable motion influences. Missing fields are neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MovementParams {
    pub gravity: f32,
    pub friction: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave: Option<WaveParams>,
    pub attract: f32,
    pub spin: f32,
    pub jitter: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounce: Option<BounceParams>,
    pub scale: f32,
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            gravity: 0.0,
            friction: 1.0,
            wave: None,
            attract: 0.0,
            spin: 0.0,
            jitter: 0.0,
            bounce: None,
            scale: 1.0,
        }
    }
}

impl MovementParams {
    /// Copy with every field pulled into its documented bounds.
    pub fn clamped(&self) -> Self {
        Self {
            gravity: bounded(self.gravity, -GRAVITY_BOUND, GRAVITY_BOUND, 0.0),
            friction: bounded(self.friction, FRICTION_MIN, FRICTION_MAX, 1.0),
            wave: self.wave.map(|w| WaveParams {
                axis: w.axis,
                amp: bounded(w.amp, 0.0, WAVE_MAX_AMPLITUDE, 0.0),
                freq: bounded(w.freq, 0.0, WAVE_MAX_FREQUENCY, 0.0),
            }),
            attract: bounded(self.attract, -ATTRACT_BOUND, ATTRACT_BOUND, 0.0),
            spin: bounded(self.spin, -SPIN_BOUND, SPIN_BOUND, 0.0),
            jitter: bounded(self.jitter, 0.0, JITTER_MAX, 0.0),
            bounce: self.bounce.map(|b| BounceParams {
                floor: bounded(b.floor, 0.0, 1.0, 1.0),
                elasticity: bounded(b.elasticity, 0.0, 1.0, 0.0),
            }),
            scale: bounded(self.scale, SCALE_MIN, SCALE_MAX, 1.0),
        }
    }

    /// Apply in fixed order: gravity, friction, wave, attract, spin, jitter,
    /// bounce, scale. Velocity ends clamped to `±MAX_PARAM_VELOCITY`.
    ///
    /// Expects already clamped params; `ParticleField::new` sanitizes its config.
    pub fn apply<R: Rng + ?Sized>(&self, p: &mut Particle, ctx: &MotionContext, rng: &mut R) {
        let phase = p.phase;

        p.velocity.y += self.gravity;
        p.velocity *= self.friction;

        if let Some(wave) = self.wave {
            let offset = (phase * wave.freq).sin() * wave.amp;
            match wave.axis {
                WaveAxis::X => p.position.x += offset,
                WaveAxis::Y => p.position.y += offset,
                WaveAxis::Both => p.position += Vec2::splat(offset),
            }
        }

        if self.attract != 0.0 {
            p.velocity += (ctx.center() - p.position) * self.attract;
        }

        if self.spin != 0.0 {
            p.position.x += phase.cos() * self.spin;
            p.position.y += phase.sin() * self.spin;
        }

        if self.jitter > 0.0 {
            p.velocity.x += sample_symmetric(rng, self.jitter);
            p.velocity.y += sample_symmetric(rng, self.jitter);
        }

        if let Some(bounce) = self.bounce {
            let floor = bounce.floor * ctx.height;
            if p.position.y > floor {
                p.position.y = floor;
                p.velocity.y = -p.velocity.y * bounce.elasticity;
            }
        }

        p.size *= self.scale;

        p.velocity = p
            .velocity
            .clamp(Vec2::splat(-MAX_PARAM_VELOCITY), Vec2::splat(MAX_PARAM_VELOCITY));
    }
}

// --- Movement ---

/// Either a named preset (`"spiral"`) or a params object (`{"gravity": 0.05}`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Movement {
    Preset(MovementPreset),
    Params(MovementParams),
}

impl Default for Movement {
    fn default() -> Self {
        Movement::Preset(MovementPreset::default())
    }
}

impl Movement {
    /// Whether a freshly spawned particle keeps a downward `vy`.
    ///
    /// Only structured params and the falling presets opt out of the upward bias.
    pub fn keeps_downward_velocity(&self) -> bool {
        match self {
            Movement::Preset(preset) => preset.keeps_downward_velocity(),
            Movement::Params(_) => true,
        }
    }

    pub fn clamped(&self) -> Self {
        match self {
            Movement::Preset(preset) => Movement::Preset(*preset),
            Movement::Params(params) => Movement::Params(params.clamped()),
        }
    }

    pub fn apply<R: Rng + ?Sized>(&self, p: &mut Particle, ctx: &MotionContext, rng: &mut R) {
        match self {
            Movement::Preset(preset) => preset.apply(p, ctx),
            Movement::Params(params) => params.apply(p, ctx, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn particle_at(x: f32, y: f32, vx: f32, vy: f32) -> Particle {
        Particle {
            position: Vec2::new(x, y),
            velocity: Vec2::new(vx, vy),
            size: 10.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            life: 0.5,
            decay: 0.01,
            phase: 1.0,
            template: 0,
        }
    }

    #[test]
    fn test_parse_preset_and_params() {
        let m: Movement = serde_json::from_str("\"whirlpool\"").unwrap();
        assert_eq!(m, Movement::Preset(MovementPreset::Whirlpool));

        let m: Movement =
            serde_json::from_str(r#"{"gravity": 0.05, "wave": {"axis": "both", "amp": 2, "freq": 1}}"#)
                .unwrap();
        let Movement::Params(params) = m else {
            panic!("expected params");
        };
        assert_eq!(params.gravity, 0.05);
        assert_eq!(params.friction, 1.0);
        assert_eq!(params.wave.unwrap().axis, WaveAxis::Both);

        assert!(serde_json::from_str::<Movement>("\"teleport\"").is_err());
    }

    #[test]
    fn test_params_are_clamped() {
        let params = MovementParams {
            gravity: 3.0,
            friction: 1.5,
            attract: -1.0,
            jitter: f32::NAN,
            scale: 2.0,
            ..MovementParams::default()
        }
        .clamped();
        assert_eq!(params.gravity, GRAVITY_BOUND);
        assert_eq!(params.friction, 1.0);
        assert_eq!(params.attract, -ATTRACT_BOUND);
        assert_eq!(params.jitter, 0.0);
        assert_eq!(params.scale, SCALE_MAX);
    }

    #[test]
    fn test_bounce_floor_reflects() {
        let ctx = MotionContext::new(500.0, 700.0);
        let params = MovementParams {
            bounce: Some(BounceParams {
                floor: 0.75,
                elasticity: 0.6,
            }),
            ..MovementParams::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let mut p = particle_at(250.0, 530.0, 0.0, 3.0);
        params.apply(&mut p, &ctx, &mut rng);
        assert_eq!(p.position.y, 525.0);
        assert!((p.velocity.y + 1.8).abs() < 1e-5);
    }

    #[test]
    fn test_velocity_clamped_after_params() {
        let ctx = MotionContext::new(100.0, 100.0);
        let mut rng = StdRng::seed_from_u64(7);
        let mut p = particle_at(0.0, 0.0, 50.0, -50.0);
        MovementParams::default().apply(&mut p, &ctx, &mut rng);
        assert_eq!(p.velocity, Vec2::new(MAX_PARAM_VELOCITY, -MAX_PARAM_VELOCITY));
    }

    #[test]
    fn test_presets_are_deterministic() {
        let ctx = MotionContext::new(400.0, 300.0);
        for preset in MovementPreset::ALL {
            let mut a = particle_at(120.0, 80.0, 0.5, -1.0);
            let mut b = a.clone();
            preset.apply(&mut a, &ctx);
            preset.apply(&mut b, &ctx);
            assert_eq!(a, b, "{preset:?}");
            assert!(a.position.is_finite() && a.velocity.is_finite(), "{preset:?}");
        }
    }

    #[test]
    fn test_presets_differ() {
        let ctx = MotionContext::new(400.0, 300.0);
        let results: Vec<Particle> = MovementPreset::ALL
            .iter()
            .map(|preset| {
                let mut p = particle_at(120.0, 80.0, 0.5, -1.0);
                preset.apply(&mut p, &ctx);
                p
            })
            .collect();
        for i in 0..results.len() {
            for j in i + 1..results.len() {
                assert_ne!(
                    results[i], results[j],
                    "{:?} vs {:?}",
                    MovementPreset::ALL[i], MovementPreset::ALL[j]
                );
            }
        }
    }

    #[test]
    fn test_orbit_preserves_distance() {
        let ctx = MotionContext::new(200.0, 200.0);
        let mut p = particle_at(150.0, 100.0, 0.0, 0.0);
        MovementPreset::Orbit.apply(&mut p, &ctx);
        assert!((p.position.distance(ctx.center()) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_rain_velocity_capped() {
        let ctx = MotionContext::new(100.0, 100.0);
        let mut p = particle_at(0.0, 0.0, 1.0, 11.95);
        MovementPreset::Rain.apply(&mut p, &ctx);
        assert_eq!(p.velocity.y, 12.0);
    }

    #[test]
    fn test_upward_bias_opt_outs() {
        assert!(Movement::Preset(MovementPreset::Rain).keeps_downward_velocity());
        assert!(Movement::Preset(MovementPreset::Bounce).keeps_downward_velocity());
        assert!(!Movement::Preset(MovementPreset::Gravity).keeps_downward_velocity());
        assert!(Movement::Params(MovementParams::default()).keeps_downward_velocity());
    }
}
