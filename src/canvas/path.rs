//! Path building

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, TAU};
use tiny_skia::PathBuilder;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    /// Circular arc, angles in radians, drawn from `start` to `end`
    Arc {
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
    },
    /// Elliptical arc around `center`, rotated by `rotation`
    Ellipse {
        center: Vec2,
        radii: Vec2,
        rotation: f32,
        start: f32,
        end: f32,
    },
    Close,
}

/// A sequence of path commands, built with a chainable API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, x: f32, y: f32) -> Self {
        self.commands.push(PathCommand::MoveTo(Vec2::new(x, y)));
        self
    }

    pub fn line_to(mut self, x: f32, y: f32) -> Self {
        self.commands.push(PathCommand::LineTo(Vec2::new(x, y)));
        self
    }

    pub fn arc(mut self, cx: f32, cy: f32, radius: f32, start: f32, end: f32) -> Self {
        self.commands.push(PathCommand::Arc {
            center: Vec2::new(cx, cy),
            radius,
            start,
            end,
        });
        self
    }

    pub fn circle(self, cx: f32, cy: f32, radius: f32) -> Self {
        self.move_to(cx + radius, cy).arc(cx, cy, radius, 0.0, TAU).close()
    }

    pub fn ellipse(mut self, cx: f32, cy: f32, rx: f32, ry: f32, rotation: f32) -> Self {
        self.commands.push(PathCommand::Ellipse {
            center: Vec2::new(cx, cy),
            radii: Vec2::new(rx, ry),
            rotation,
            start: 0.0,
            end: TAU,
        });
        self.close()
    }

    pub fn close(mut self) -> Self {
        self.commands.push(PathCommand::Close);
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Build the tiny-skia path, in the coordinate space the commands were
    /// written in. `None` when nothing drawable is left.
    ///
    /// Arcs connect to the current point with a straight segment, like the
    /// HTML canvas `arc()` call.
    pub fn to_skia(&self) -> Option<tiny_skia::Path> {
        let mut builder = PathBuilder::new();
        let mut started = false;

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    builder.move_to(p.x, p.y);
                    started = true;
                }
                PathCommand::LineTo(p) => {
                    if started {
                        builder.line_to(p.x, p.y);
                    } else {
                        builder.move_to(p.x, p.y);
                        started = true;
                    }
                }
                PathCommand::Arc {
                    center,
                    radius,
                    start,
                    end,
                } => {
                    let radii = Vec2::splat(radius);
                    push_arc(&mut builder, &mut started, center, radii, 0.0, start, end);
                }
                PathCommand::Ellipse {
                    center,
                    radii,
                    rotation,
                    start,
                    end,
                } => push_arc(&mut builder, &mut started, center, radii, rotation, start, end),
                PathCommand::Close => {
                    if started {
                        builder.close();
                    }
                }
            }
        }
        builder.finish()
    }

    /// Axis-aligned bounds `(min, max)` of the built path.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let rect = self.to_skia()?.bounds();
        Some((
            Vec2::new(rect.left(), rect.top()),
            Vec2::new(rect.right(), rect.bottom()),
        ))
    }
}

/// Append an elliptical arc as cubic Béziers, one per quarter turn at most.
#[allow(clippy::too_many_arguments)]
fn push_arc(
    builder: &mut PathBuilder,
    started: &mut bool,
    center: Vec2,
    radii: Vec2,
    rotation: f32,
    start: f32,
    end: f32,
) {
    if !(radii.is_finite() && start.is_finite() && end.is_finite()) || radii.min_element() < 0.0 {
        return;
    }
    let rot = Vec2::from_angle(rotation);
    let point = |angle: f32| {
        center + rot.rotate(Vec2::new(angle.cos() * radii.x, angle.sin() * radii.y))
    };
    let tangent = |angle: f32| rot.rotate(Vec2::new(-angle.sin() * radii.x, angle.cos() * radii.y));

    let first = point(start);
    if *started {
        builder.line_to(first.x, first.y);
    } else {
        builder.move_to(first.x, first.y);
        *started = true;
    }

    let sweep = (end - start).clamp(-TAU, TAU);
    let segments = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
    let step = sweep / segments as f32;
    let k = 4.0 / 3.0 * (step / 4.0).tan();
    for i in 0..segments {
        let a0 = start + step * i as f32;
        let a1 = a0 + step;
        let c0 = point(a0) + tangent(a0) * k;
        let c1 = point(a1) - tangent(a1) * k;
        let p1 = point(a1);
        builder.cubic_to(c0.x, c0.y, c1.x, c1.y, p1.x, p1.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_builds_closed() {
        let path = Path::new()
            .move_to(0.0, 0.0)
            .line_to(10.0, 0.0)
            .line_to(10.0, 10.0)
            .close();
        let built = path.to_skia().unwrap();
        assert_eq!(built.len(), 4);
        assert_eq!(path.bounds(), Some((Vec2::ZERO, Vec2::splat(10.0))));
    }

    #[test]
    fn test_circle_bounds_match_radius() {
        let (min, max) = Path::new().circle(5.0, -3.0, 20.0).bounds().unwrap();
        assert!((min - Vec2::new(-15.0, -23.0)).abs().max_element() < 1e-3);
        assert!((max - Vec2::new(25.0, 17.0)).abs().max_element() < 1e-3);
    }

    #[test]
    fn test_rotated_ellipse_swaps_extent() {
        let (min, max) = Path::new()
            .ellipse(0.0, 0.0, 10.0, 2.0, FRAC_PI_2)
            .bounds()
            .unwrap();
        let size = max - min;
        assert!(size.y > size.x * 3.0, "size {size:?}");
    }

    #[test]
    fn test_lone_move_builds_nothing() {
        assert!(Path::new().move_to(1.0, 1.0).to_skia().is_none());
        assert!(Path::new().to_skia().is_none());
    }

    #[test]
    fn test_negative_radius_is_skipped() {
        let path = Path::new().move_to(0.0, 0.0).arc(0.0, 0.0, -1.0, 0.0, TAU);
        assert!(path.to_skia().is_none());
    }
}
