use rand::Rng;

// --- Helper Functions ---

/// Uniform draw from `[min, max]`, tolerating a collapsed range.
///
/// Callers validate `min <= max` up front; a zero-width range just yields `min`.
pub fn sample_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

/// Symmetric uniform draw in `[-magnitude, magnitude]`.
pub fn sample_symmetric<R: Rng + ?Sized>(rng: &mut R, magnitude: f32) -> f32 {
    if magnitude > 0.0 {
        rng.gen_range(-magnitude..=magnitude)
    } else {
        0.0
    }
}

/// Clamp into `[min, max]`, replacing NaN/infinite input with `fallback`.
pub fn bounded(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
