// --- File: constants.rs ---
// --- Global Aura Constants ---
use crate::color::Color;

pub const WINDOW_WIDTH: u32 = 960;
pub const WINDOW_HEIGHT: u32 = 720;
pub const FPS_UPDATE_INTERVAL_SECS: f64 = 1.0;

// --- Runtime Multipliers (host knobs) ---
pub const INITIAL_DENSITY_MULTIPLIER: f32 = 1.0;
pub const MIN_DENSITY_MULTIPLIER: f32 = 0.0;
pub const MAX_DENSITY_MULTIPLIER: f32 = 4.0;
pub const DENSITY_ADJUST_STEP: f32 = 0.25;

pub const INITIAL_SPEED_MULTIPLIER: f32 = 1.0;
pub const MIN_SPEED_MULTIPLIER: f32 = 0.0;
pub const MAX_SPEED_MULTIPLIER: f32 = 5.0;
pub const SPEED_ADJUST_STEP: f32 = 0.25;

pub const INITIAL_SIZE_MULTIPLIER: f32 = 1.0;
pub const MIN_SIZE_MULTIPLIER: f32 = 0.1;
pub const MAX_SIZE_MULTIPLIER: f32 = 5.0;
pub const SIZE_ADJUST_STEP: f32 = 0.1;

// --- Particle Field ---
// Frame-coupled: every particle advances its phase by this much per update, regardless of dt.
pub const PHASE_STEP: f32 = 0.05;
pub const FEET_LINE_FRACTION: f32 = 0.82;
pub const MAX_ROTATION_SPEED: f32 = 0.05;

pub const FLUID_SPAWN_HALF_WIDTH_FRACTION: f32 = 0.12;
pub const FLUID_SPAWN_HALF_HEIGHT_PX: f32 = 8.0;
pub const FLUID_DECAY_MIN: f32 = 0.004;
pub const FLUID_DECAY_MAX: f32 = 0.009;
pub const FLUID_MAX_GROWTH: f32 = 4.0;
pub const FLUID_BASE_GROWTH_RATE: f32 = 0.004;
pub const FLUID_AGED_GROWTH_RATE: f32 = 0.012;
pub const FLUID_MAX_DRIFT: f32 = 0.6;
pub const FLUID_VY_DAMPING: f32 = 0.995;
pub const FLUID_SOLID_ALPHA: f32 = 0.6;

pub const DISCRETE_SPAWN_HALF_WIDTH_FRACTION: f32 = 0.25;
pub const DISCRETE_SPAWN_ABOVE_FRACTION: f32 = 0.12;
pub const DISCRETE_SPAWN_BELOW_FRACTION: f32 = 0.04;
pub const DISCRETE_DECAY_MIN: f32 = 0.005;
pub const DISCRETE_DECAY_MAX: f32 = 0.013;

pub const MAX_PARAM_VELOCITY: f32 = 8.0;

// --- Movement Param Bounds ---
pub const GRAVITY_BOUND: f32 = 0.15;
pub const FRICTION_MIN: f32 = 0.9;
pub const FRICTION_MAX: f32 = 1.0;
pub const WAVE_MAX_AMPLITUDE: f32 = 8.0;
pub const WAVE_MAX_FREQUENCY: f32 = 5.0;
pub const ATTRACT_BOUND: f32 = 0.01;
pub const SPIN_BOUND: f32 = 4.0;
pub const JITTER_MAX: f32 = 2.0;
pub const SCALE_MIN: f32 = 0.95;
pub const SCALE_MAX: f32 = 1.05;

// --- Outer Shape ---
pub const OUTER_SHAPE_SAMPLES: usize = 120;
pub const OUTER_SHAPE_CONTROL_POINTS: usize = 12;
pub const OUTER_SHAPE_ANCHOR_FRACTION: f32 = 0.45;
pub const OUTER_SHAPE_BASE_RADIUS_FRACTION: f32 = 0.32;
pub const OUTER_SHAPE_INNER_SHRINK: f32 = 0.35;
pub const OUTER_SHAPE_MAX_LAYERS: u32 = 8;
pub const OUTER_SHAPE_NOISE_PX: f32 = 14.0;

// --- Background Policy ---
pub const DARK_FADE: Color = Color::new(0.03, 0.02, 0.08, 0.18);
pub const BLACK_FADE: Color = Color::new(0.0, 0.0, 0.0, 0.12);

// --- End of File: constants.rs ---
