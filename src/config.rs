// --- File: config.rs ---
//! Aura configuration: the JSON contract the engine consumes.
//!
//! Loading is lenient where a partial aura is still useful. A shape with an
//! unknown `type` is dropped on its own, a malformed `outerShape` just
//! disables the silhouette, an unknown movement falls back to `float`.
//! Whole-config problems (no entities, zero weight, inverted ranges) are
//! reported by [`AuraConfig::validate`] and make the particle field spawn
//! nothing.

use crate::color::Color;
use crate::constants::*;
use crate::error::{ConfigError, Result};
use crate::movement::Movement;
use crate::shape::ShapeSpec;
use crate::utils::bounded;
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

// --- Enums ---

/// Per-frame canvas clear policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Background {
    #[default]
    Clear,
    DarkFade,
    BlackFade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Discrete,
    Fluid,
}

/// Layering recipe used when a particle is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Solid,
    Smoke,
    Glow,
}

// --- Ranges ---

/// Inclusive `[min, max]`, written as a two element array in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

impl From<[f32; 2]> for Range {
    fn from([min, max]: [f32; 2]) -> Self {
        Self { min, max }
    }
}

impl From<Range> for [f32; 2] {
    fn from(range: Range) -> Self {
        [range.min, range.max]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityRange {
    pub vx: Range,
    pub vy: Range,
}

impl Default for VelocityRange {
    fn default() -> Self {
        Self {
            vx: Range::new(-0.5, 0.5),
            vy: Range::new(-1.5, -0.5),
        }
    }
}

// --- Entity Template ---

fn default_weight() -> f32 {
    1.0
}

fn default_size_range() -> Range {
    Range::new(4.0, 10.0)
}

/// Recipe particles are stamped from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTemplate {
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default = "default_size_range")]
    pub size_range: Range,
    #[serde(default)]
    pub velocity_range: VelocityRange,
    #[serde(default)]
    pub style: Style,
    #[serde(default, deserialize_with = "lenient_movement")]
    pub movement: Movement,
    #[serde(default, deserialize_with = "lenient_shapes")]
    pub shapes: Vec<ShapeSpec>,
}

impl Default for EntityTemplate {
    fn default() -> Self {
        Self {
            weight: default_weight(),
            size_range: default_size_range(),
            velocity_range: VelocityRange::default(),
            style: Style::default(),
            movement: Movement::default(),
            shapes: Vec::new(),
        }
    }
}

impl EntityTemplate {
    /// Weight actually used by the spawn draw (negative/NaN count as zero).
    pub fn effective_weight(&self) -> f32 {
        if self.weight.is_finite() {
            self.weight.max(0.0)
        } else {
            0.0
        }
    }

    /// Color used when a shape has no fill/stroke of its own, or for the
    /// fluid smoke disc: first shape's fill, then its stroke, then `fallback`.
    pub fn theme_color(&self, fallback: Color) -> Color {
        self.shapes
            .first()
            .and_then(ShapeSpec::primary_color)
            .unwrap_or(fallback)
    }
}

// --- Outer Shape ---

/// Parameters of the hollow silhouette drawn around the avatar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OuterShapeConfig {
    pub color: Color,
    pub secondary_color: Color,
    pub intensity: f32,
    pub speed: f32,
    pub scale: f32,
    pub pulse_amount: f32,
    pub hollow_ratio: f32,
    pub layers: u32,
    /// Radius multipliers at 12 evenly spaced angles, starting at the top and
    /// going clockwise.
    pub radii: [f32; OUTER_SHAPE_CONTROL_POINTS],
    pub noise_amount: f32,
    pub noise_speed: f32,
    pub scale_x: f32,
}

impl Default for OuterShapeConfig {
    fn default() -> Self {
        Self {
            color: Color::from_rgb8(0xa8, 0x55, 0xf7),
            secondary_color: Color::WHITE,
            intensity: 0.6,
            speed: 1.0,
            scale: 1.0,
            pulse_amount: 0.05,
            hollow_ratio: 0.6,
            layers: 3,
            radii: [1.0; OUTER_SHAPE_CONTROL_POINTS],
            noise_amount: 0.3,
            noise_speed: 1.0,
            scale_x: 0.85,
        }
    }
}

impl OuterShapeConfig {
    pub fn clamped(&self) -> Self {
        let mut radii = self.radii;
        for r in &mut radii {
            *r = bounded(*r, 0.0, 4.0, 1.0);
        }
        Self {
            color: self.color,
            secondary_color: self.secondary_color,
            intensity: bounded(self.intensity, 0.0, 1.0, 0.0),
            speed: bounded(self.speed, -10.0, 10.0, 1.0),
            scale: bounded(self.scale, 0.0, 4.0, 1.0),
            pulse_amount: bounded(self.pulse_amount, 0.0, 1.0, 0.0),
            hollow_ratio: bounded(self.hollow_ratio, 0.05, 0.95, 0.6),
            layers: self.layers.clamp(1, OUTER_SHAPE_MAX_LAYERS),
            radii,
            noise_amount: bounded(self.noise_amount, 0.0, 4.0, 0.0),
            noise_speed: bounded(self.noise_speed, -10.0, 10.0, 1.0),
            scale_x: bounded(self.scale_x, 0.1, 3.0, 1.0),
        }
    }
}

// --- Aura Config ---

fn default_glow_color() -> Color {
    Color::from_rgb8(0xa8, 0x55, 0xf7)
}

/// A complete aura. Swapped in wholesale, never mutated while running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuraConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_glow_color")]
    pub glow_color: Color,
    #[serde(default)]
    pub density: u32,
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub render_mode: RenderMode,
    #[serde(default)]
    pub entities: Vec<EntityTemplate>,
    #[serde(
        default,
        deserialize_with = "lenient_outer_shape",
        skip_serializing_if = "Option::is_none"
    )]
    pub outer_shape: Option<OuterShapeConfig>,
}

impl Default for AuraConfig {
    fn default() -> Self {
        Self {
            name: None,
            glow_color: default_glow_color(),
            density: 0,
            background: Background::default(),
            render_mode: RenderMode::default(),
            entities: Vec::new(),
            outer_shape: None,
        }
    }
}

impl AuraConfig {
    /// Parse, clamp out-of-range numbers, and log any validation problem.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AuraConfig = serde_json::from_str(json)?;
        let config = config.sanitized();
        if let Err(e) = config.validate() {
            warn!("aura config will spawn no particles: {e}");
        }
        debug!(
            "loaded aura {:?}: density {}, {} entities, outer shape {}",
            config.name,
            config.density,
            config.entities.len(),
            if config.outer_shape.is_some() { "on" } else { "off" }
        );
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the invariants the particle field relies on.
    ///
    /// A config with `density == 0` is always valid: it simply spawns nothing.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.density == 0 {
            return Ok(());
        }
        if self.entities.is_empty() {
            return Err(ConfigError::MissingEntities(self.density));
        }
        for (index, entity) in self.entities.iter().enumerate() {
            let ranges = [
                ("sizeRange", entity.size_range),
                ("velocityRange.vx", entity.velocity_range.vx),
                ("velocityRange.vy", entity.velocity_range.vy),
            ];
            for (field, range) in ranges {
                if !range.is_valid() {
                    return Err(ConfigError::InvalidRange {
                        entity: index,
                        field,
                        min: range.min,
                        max: range.max,
                    });
                }
            }
        }
        let total: f32 = self.entities.iter().map(EntityTemplate::effective_weight).sum();
        if !(total > 0.0 && total.is_finite()) {
            return Err(ConfigError::ZeroTotalWeight);
        }
        Ok(())
    }

    /// Copy with every bounded numeric field clamped into range.
    pub fn sanitized(mut self) -> Self {
        for entity in &mut self.entities {
            entity.weight = entity.effective_weight();
            entity.movement = entity.movement.clamped();
        }
        self.outer_shape = self.outer_shape.as_ref().map(OuterShapeConfig::clamped);
        self
    }
}

// --- Lenient Field Deserializers ---

fn lenient_shapes<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<ShapeSpec>, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    let Value::Array(items) = raw else {
        warn!("entity `shapes` is not an array, ignoring it");
        return Ok(Vec::new());
    };
    let shapes = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<ShapeSpec>(item) {
            Ok(shape) if shape.is_drawable() => Some(shape),
            Ok(shape) => {
                warn!("dropping shape {i}: degenerate geometry {:?}", shape.kind);
                None
            }
            Err(e) => {
                warn!("dropping shape {i}: {e}");
                None
            }
        })
        .collect();
    Ok(shapes)
}

fn lenient_movement<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Movement, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(Movement::default());
    }
    Ok(serde_json::from_value(raw.clone()).unwrap_or_else(|_| {
        warn!("unknown movement {raw}, falling back to float");
        Movement::default()
    }))
}

fn lenient_outer_shape<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<OuterShapeConfig>, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(raw) {
        Ok(shape) => Ok(Some(shape)),
        Err(e) => {
            warn!("outer shape disabled, malformed config: {e}");
            Ok(None)
        }
    }
}

// --- Runtime Tunables ---

/// Host-owned multipliers, read by the particle field every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tunables {
    density: f32,
    speed: f32,
    size: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            density: INITIAL_DENSITY_MULTIPLIER,
            speed: INITIAL_SPEED_MULTIPLIER,
            size: INITIAL_SIZE_MULTIPLIER,
        }
    }
}

impl Tunables {
    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_density(&mut self, value: f32) {
        self.density = bounded(
            value,
            MIN_DENSITY_MULTIPLIER,
            MAX_DENSITY_MULTIPLIER,
            self.density,
        );
    }

    pub fn set_speed(&mut self, value: f32) {
        self.speed = bounded(value, MIN_SPEED_MULTIPLIER, MAX_SPEED_MULTIPLIER, self.speed);
    }

    pub fn set_size(&mut self, value: f32) {
        self.size = bounded(value, MIN_SIZE_MULTIPLIER, MAX_SIZE_MULTIPLIER, self.size);
    }
}
