// --- File: presets.rs ---
//! Built-in auras and backdrop swatches.

use crate::color::Color;
use crate::config::{
    AuraConfig, Background, EntityTemplate, OuterShapeConfig, RenderMode, Style, VelocityRange,
};
use crate::constants::OUTER_SHAPE_CONTROL_POINTS;
use crate::error::{AuraError, Result};
use crate::movement::{
    BounceParams, Movement, MovementParams, MovementPreset, WaveAxis, WaveParams,
};
use crate::shape::{ShapeKind, ShapeSpec};

const PRESET_NAMES: [&str; 5] = ["fire", "wind", "shock", "cosmic", "smoke"];

const BACKDROPS: [(&str, &str); 11] = [
    ("black", "#000000"),
    ("dark navy", "#0a0e1a"),
    ("charcoal", "#1a1a2e"),
    ("deep purple", "#1a0a2e"),
    ("midnight blue", "#0d1b2a"),
    ("forest", "#0a1a0a"),
    ("dark red", "#1a0a0a"),
    ("slate", "#1e293b"),
    ("storm", "#111827"),
    ("red", "#ff0000"),
    ("blue", "#0000ff"),
];

pub fn names() -> &'static [&'static str] {
    &PRESET_NAMES
}

pub fn backdrop_names() -> impl Iterator<Item = &'static str> {
    BACKDROPS.iter().map(|(name, _)| *name)
}

/// Backdrop color by name, case-insensitive ("Dark Navy", "dark-navy").
pub fn backdrop(name: &str) -> Option<Color> {
    let wanted = name.trim().to_ascii_lowercase().replace(['-', '_'], " ");
    BACKDROPS
        .iter()
        .find(|(n, _)| *n == wanted)
        .and_then(|(_, hex)| hex.parse().ok())
}

/// Built-in aura by name. `electric` is accepted as an alias of `shock`.
pub fn builtin(name: &str) -> Result<AuraConfig> {
    let config = match name.trim().to_ascii_lowercase().as_str() {
        "fire" => fire(),
        "wind" => wind(),
        "shock" | "electric" => shock(),
        "cosmic" => cosmic(),
        "smoke" => smoke(),
        other => return Err(AuraError::UnknownPreset(other.to_string())),
    };
    Ok(config.sanitized())
}

fn hex(s: &str) -> Color {
    let parsed = s.parse::<Color>();
    debug_assert!(parsed.is_ok(), "bad built-in color {s:?}");
    parsed.unwrap_or(Color::WHITE)
}

fn template(weight: f32, size: [f32; 2], vx: [f32; 2], vy: [f32; 2]) -> EntityTemplate {
    EntityTemplate {
        weight,
        size_range: size.into(),
        velocity_range: VelocityRange {
            vx: vx.into(),
            vy: vy.into(),
        },
        ..EntityTemplate::default()
    }
}

fn polygon(points: &[[f32; 2]]) -> ShapeKind {
    ShapeKind::Polygon {
        points: points.to_vec(),
    }
}

fn fire() -> AuraConfig {
    let mut config = AuraConfig {
        name: Some("Fire".into()),
        glow_color: hex("#ff5500"),
        density: 90,
        background: Background::DarkFade,
        render_mode: RenderMode::Discrete,
        ..AuraConfig::default()
    };

    // --- Flames ---
    let mut flame = template(3.0, [10.0, 22.0], [-0.4, 0.4], [-2.2, -1.0]);
    flame.style = Style::Glow;
    flame.movement = Movement::Preset(MovementPreset::Rise);
    flame.shapes = vec![
        ShapeSpec::new(polygon(&[[0.0, -0.5], [0.3, 0.1], [0.0, 0.5], [-0.3, 0.1]]))
            .with_fill(hex("#ff5500")),
        ShapeSpec::new(ShapeKind::Ellipse {
            x: 0.0,
            y: 0.15,
            rx: 0.14,
            ry: 0.25,
            rotation: 0.0,
        })
        .with_fill(hex("#ffd000")),
    ];

    // --- Embers ---
    let mut ember = template(2.0, [2.0, 4.0], [-0.8, 0.8], [-1.6, -0.6]);
    ember.style = Style::Solid;
    ember.movement = Movement::Params(MovementParams {
        gravity: -0.02,
        wave: Some(WaveParams {
            axis: WaveAxis::X,
            amp: 1.2,
            freq: 2.0,
        }),
        jitter: 0.05,
        ..MovementParams::default()
    });
    ember.shapes = vec![ShapeSpec::circle(0.5).with_fill(hex("#ffb347"))];

    config.entities = vec![flame, ember];

    let mut radii = [1.0; OUTER_SHAPE_CONTROL_POINTS];
    // Flame crown: tall at the top, tapering down the sides.
    radii[0] = 1.7;
    radii[1] = 1.35;
    radii[11] = 1.35;
    radii[2] = 1.1;
    radii[10] = 1.1;
    radii[6] = 0.85;
    config.outer_shape = Some(OuterShapeConfig {
        color: hex("#ff5500"),
        secondary_color: hex("#ffd000"),
        intensity: 0.75,
        speed: 1.4,
        pulse_amount: 0.06,
        hollow_ratio: 0.65,
        layers: 4,
        radii,
        noise_amount: 0.6,
        noise_speed: 1.8,
        scale_x: 0.8,
        ..OuterShapeConfig::default()
    });
    config
}

fn wind() -> AuraConfig {
    let mut config = AuraConfig {
        name: Some("Wind".into()),
        glow_color: hex("#00ffcc"),
        density: 70,
        background: Background::BlackFade,
        render_mode: RenderMode::Discrete,
        ..AuraConfig::default()
    };

    let mut streak = template(2.0, [14.0, 26.0], [-0.6, 0.6], [-1.2, -0.4]);
    streak.style = Style::Glow;
    streak.movement = Movement::Preset(MovementPreset::Tornado);
    streak.shapes = vec![
        ShapeSpec::new(ShapeKind::Arc {
            x: 0.0,
            y: 0.0,
            r: 0.45,
            start: 0.0,
            end: 2.4,
            closed: false,
        })
        .with_stroke(hex("#00ffcc"), 2.0),
    ];

    let mut mote = template(1.0, [2.0, 5.0], [-1.0, 1.0], [-1.0, -0.2]);
    mote.movement = Movement::Preset(MovementPreset::Vortex);
    mote.shapes = vec![ShapeSpec::circle(0.5).with_fill(hex("#b3fff0"))];

    config.entities = vec![streak, mote];
    config.outer_shape = Some(OuterShapeConfig {
        color: hex("#00ffcc"),
        secondary_color: hex("#0088ff"),
        intensity: 0.5,
        speed: 2.0,
        pulse_amount: 0.04,
        hollow_ratio: 0.7,
        layers: 3,
        noise_amount: 0.4,
        noise_speed: 2.5,
        scale_x: 0.9,
        ..OuterShapeConfig::default()
    });
    config
}

fn shock() -> AuraConfig {
    let mut config = AuraConfig {
        name: Some("Shock".into()),
        glow_color: hex("#aa00ff"),
        density: 60,
        background: Background::BlackFade,
        render_mode: RenderMode::Discrete,
        ..AuraConfig::default()
    };

    let mut bolt = template(2.0, [12.0, 24.0], [-0.3, 0.3], [-0.6, 0.0]);
    bolt.style = Style::Glow;
    bolt.movement = Movement::Preset(MovementPreset::Zigzag);
    bolt.shapes = vec![
        ShapeSpec::new(ShapeKind::Line {
            x1: 0.0,
            y1: -0.5,
            x2: 0.15,
            y2: -0.1,
        })
        .with_stroke(hex("#e0b3ff"), 2.0),
        ShapeSpec::new(ShapeKind::Line {
            x1: 0.15,
            y1: -0.1,
            x2: -0.15,
            y2: 0.1,
        })
        .with_stroke(hex("#e0b3ff"), 2.0),
        ShapeSpec::new(ShapeKind::Line {
            x1: -0.15,
            y1: 0.1,
            x2: 0.0,
            y2: 0.5,
        })
        .with_stroke(hex("#e0b3ff"), 2.0),
    ];

    let mut spark = template(3.0, [2.0, 4.0], [-2.0, 2.0], [-2.0, 2.0]);
    spark.movement = Movement::Params(MovementParams {
        friction: 0.95,
        jitter: 0.6,
        bounce: Some(BounceParams {
            floor: 0.9,
            elasticity: 0.5,
        }),
        ..MovementParams::default()
    });
    spark.shapes = vec![ShapeSpec::circle(0.5).with_fill(hex("#4d7cff"))];

    config.entities = vec![bolt, spark];
    config.outer_shape = Some(OuterShapeConfig {
        color: hex("#aa00ff"),
        secondary_color: hex("#4d7cff"),
        intensity: 0.7,
        speed: 3.0,
        pulse_amount: 0.1,
        hollow_ratio: 0.75,
        layers: 2,
        noise_amount: 1.2,
        noise_speed: 4.0,
        scale_x: 0.85,
        ..OuterShapeConfig::default()
    });
    config
}

fn cosmic() -> AuraConfig {
    let mut config = AuraConfig {
        name: Some("Cosmic".into()),
        glow_color: hex("#6366f1"),
        density: 110,
        background: Background::DarkFade,
        render_mode: RenderMode::Discrete,
        ..AuraConfig::default()
    };

    let mut star = template(3.0, [4.0, 9.0], [-0.3, 0.3], [-0.5, -0.1]);
    star.style = Style::Glow;
    star.movement = Movement::Preset(MovementPreset::Orbit);
    star.shapes = vec![
        ShapeSpec::new(polygon(&[
            [0.0, -0.5],
            [0.12, -0.12],
            [0.5, 0.0],
            [0.12, 0.12],
            [0.0, 0.5],
            [-0.12, 0.12],
            [-0.5, 0.0],
            [-0.12, -0.12],
        ]))
        .with_fill(hex("#e0e7ff")),
    ];

    let mut nebula = template(1.0, [18.0, 34.0], [-0.2, 0.2], [-0.4, -0.1]);
    nebula.style = Style::Smoke;
    nebula.movement = Movement::Preset(MovementPreset::Spiral);
    nebula.shapes = vec![ShapeSpec::circle(0.5).with_fill(hex("#6366f1").with_alpha(0.5))];

    config.entities = vec![star, nebula];
    config.outer_shape = Some(OuterShapeConfig {
        color: hex("#6366f1"),
        secondary_color: hex("#c026d3"),
        intensity: 0.55,
        speed: 0.6,
        pulse_amount: 0.08,
        hollow_ratio: 0.55,
        layers: 5,
        noise_amount: 0.25,
        noise_speed: 0.5,
        scale_x: 0.9,
        ..OuterShapeConfig::default()
    });
    config
}

fn smoke() -> AuraConfig {
    let mut config = AuraConfig {
        name: Some("Smoke".into()),
        glow_color: hex("#94a3b8"),
        density: 45,
        background: Background::Clear,
        render_mode: RenderMode::Fluid,
        ..AuraConfig::default()
    };

    let mut puff = template(1.0, [20.0, 35.0], [-0.3, 0.3], [-1.2, -0.5]);
    puff.style = Style::Smoke;
    puff.movement = Movement::Preset(MovementPreset::Drift);
    puff.shapes = vec![ShapeSpec::circle(0.5).with_fill(hex("#94a3b8"))];

    let mut wisp = template(0.5, [8.0, 14.0], [-0.4, 0.4], [-1.0, -0.4]);
    wisp.style = Style::Solid;
    wisp.movement = Movement::Preset(MovementPreset::Levitate);
    wisp.shapes = vec![ShapeSpec::circle(0.5).with_fill(hex("#cbd5e1"))];

    config.entities = vec![puff, wisp];
    config.outer_shape = Some(OuterShapeConfig {
        color: hex("#94a3b8"),
        secondary_color: hex("#e2e8f0"),
        intensity: 0.35,
        speed: 0.5,
        pulse_amount: 0.03,
        hollow_ratio: 0.6,
        layers: 3,
        noise_amount: 0.5,
        noise_speed: 0.6,
        scale_x: 0.85,
        ..OuterShapeConfig::default()
    });
    config
}
