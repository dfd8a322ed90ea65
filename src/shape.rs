//! Vector primitives an entity template is drawn from.
//!
//! Coordinates live in particle-local space, normalized so a particle of
//! size 1 spans roughly `[-0.5, 0.5]`. Everything except `lineWidth` is
//! multiplied by the draw scale.

use crate::canvas::{Canvas, Paint, Path};
use crate::color::Color;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

fn default_radius() -> f32 {
    0.5
}

fn default_corner() -> f32 {
    -0.5
}

fn default_extent() -> f32 {
    1.0
}

fn default_line_width() -> f32 {
    1.5
}

fn default_arc_end() -> f32 {
    TAU
}

/// Geometry of one primitive, tagged by `"type"` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeKind {
    Circle {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default = "default_radius")]
        r: f32,
    },
    Ellipse {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default = "default_radius")]
        rx: f32,
        #[serde(default = "default_radius")]
        ry: f32,
        #[serde(default)]
        rotation: f32,
    },
    Rect {
        #[serde(default = "default_corner")]
        x: f32,
        #[serde(default = "default_corner")]
        y: f32,
        #[serde(default = "default_extent")]
        w: f32,
        #[serde(default = "default_extent")]
        h: f32,
    },
    Triangle {
        points: Vec<[f32; 2]>,
    },
    Polygon {
        points: Vec<[f32; 2]>,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    Arc {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default = "default_radius")]
        r: f32,
        #[serde(default)]
        start: f32,
        #[serde(default = "default_arc_end")]
        end: f32,
        #[serde(default)]
        closed: bool,
    },
}

/// One drawing op of an entity template: geometry plus fill/stroke colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeSpec {
    #[serde(flatten)]
    pub kind: ShapeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
    #[serde(default = "default_line_width")]
    pub line_width: f32,
}

impl ShapeSpec {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            fill: None,
            stroke: None,
            line_width: default_line_width(),
        }
    }

    pub fn circle(r: f32) -> Self {
        Self::new(ShapeKind::Circle { x: 0.0, y: 0.0, r })
    }

    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn with_stroke(mut self, color: Color, line_width: f32) -> Self {
        self.stroke = Some(color);
        self.line_width = line_width;
        self
    }

    /// The color that best represents this shape (fill, else stroke).
    pub fn primary_color(&self) -> Option<Color> {
        self.fill.or(self.stroke)
    }

    /// Whether the geometry can produce a path at all.
    ///
    /// Shapes failing this are dropped when a config is loaded.
    pub fn is_drawable(&self) -> bool {
        let finite = |v: &[f32]| v.iter().all(|f| f.is_finite());
        match &self.kind {
            ShapeKind::Circle { x, y, r } => finite(&[*x, *y, *r]) && *r >= 0.0,
            ShapeKind::Ellipse {
                x,
                y,
                rx,
                ry,
                rotation,
            } => finite(&[*x, *y, *rx, *ry, *rotation]) && *rx >= 0.0 && *ry >= 0.0,
            ShapeKind::Rect { x, y, w, h } => finite(&[*x, *y, *w, *h]),
            ShapeKind::Triangle { points } => {
                points.len() == 3 && points.iter().all(|p| finite(p))
            }
            ShapeKind::Polygon { points } => {
                points.len() >= 3 && points.iter().all(|p| finite(p))
            }
            ShapeKind::Line { x1, y1, x2, y2 } => finite(&[*x1, *y1, *x2, *y2]),
            ShapeKind::Arc {
                x,
                y,
                r,
                start,
                end,
                ..
            } => finite(&[*x, *y, *r, *start, *end]) && *r >= 0.0,
        }
    }

    /// Path of the shape with every coordinate multiplied by `scale`.
    pub fn path(&self, scale: f32) -> Path {
        let s = scale;
        match &self.kind {
            ShapeKind::Circle { x, y, r } => Path::new().circle(x * s, y * s, r * s),
            ShapeKind::Ellipse {
                x,
                y,
                rx,
                ry,
                rotation,
            } => Path::new().ellipse(x * s, y * s, rx * s, ry * s, *rotation),
            ShapeKind::Rect { x, y, w, h } => {
                let (x0, y0, x1, y1) = (x * s, y * s, (x + w) * s, (y + h) * s);
                Path::new()
                    .move_to(x0, y0)
                    .line_to(x1, y0)
                    .line_to(x1, y1)
                    .line_to(x0, y1)
                    .close()
            }
            ShapeKind::Triangle { points } | ShapeKind::Polygon { points } => {
                let mut path = Path::new();
                for (i, [px, py]) in points.iter().enumerate() {
                    path = if i == 0 {
                        path.move_to(px * s, py * s)
                    } else {
                        path.line_to(px * s, py * s)
                    };
                }
                path.close()
            }
            ShapeKind::Line { x1, y1, x2, y2 } => {
                Path::new().move_to(x1 * s, y1 * s).line_to(x2 * s, y2 * s)
            }
            ShapeKind::Arc {
                x,
                y,
                r,
                start,
                end,
                closed,
            } => {
                let (cx, cy, r) = (x * s, y * s, r * s);
                let path = Path::new()
                    .move_to(cx + r * start.cos(), cy + r * start.sin())
                    .arc(cx, cy, r, *start, *end);
                if *closed { path.close() } else { path }
            }
        }
    }

    /// Open geometry (lines, unclosed arcs) can only be stroked.
    fn is_open(&self) -> bool {
        matches!(
            self.kind,
            ShapeKind::Line { .. } | ShapeKind::Arc { closed: false, .. }
        )
    }

    /// Draw at the canvas' current transform, scaled by `scale`.
    ///
    /// A shape with neither fill nor stroke is painted with `fallback`.
    pub fn draw(&self, canvas: &mut dyn Canvas, scale: f32, fallback: Color) {
        if !(scale.is_finite() && scale > 0.0) {
            return;
        }
        let path = self.path(scale);
        let open = self.is_open();

        match (self.fill, self.stroke) {
            (None, None) if open => {
                canvas.stroke_path(&path, &Paint::Solid(fallback), self.line_width)
            }
            (None, None) => canvas.fill_path(&path, &Paint::Solid(fallback)),
            (fill, stroke) => {
                if let Some(fill) = fill {
                    if open {
                        // An open shape with only a fill still shows up as a line.
                        if stroke.is_none() {
                            canvas.stroke_path(&path, &Paint::Solid(fill), self.line_width);
                        }
                    } else {
                        canvas.fill_path(&path, &Paint::Solid(fill));
                    }
                }
                if let Some(stroke) = stroke {
                    canvas.stroke_path(&path, &Paint::Solid(stroke), self.line_width);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCommand, RecordingCanvas};

    #[test]
    fn test_deserialize_tagged_shapes() {
        let json = r##"[
            {"type": "circle", "r": 0.4, "fill": "#ff0000"},
            {"type": "rect", "x": -0.25, "y": -0.25, "w": 0.5, "h": 0.5, "stroke": "#00ff00", "lineWidth": 2},
            {"type": "triangle", "points": [[0, -0.5], [0.5, 0.5], [-0.5, 0.5]]},
            {"type": "arc", "r": 0.5, "start": 0, "end": 3.14, "closed": true}
        ]"##;
        let shapes: Vec<ShapeSpec> = serde_json::from_str(json).unwrap();
        assert_eq!(shapes.len(), 4);
        assert_eq!(shapes[0].kind, ShapeKind::Circle { x: 0.0, y: 0.0, r: 0.4 });
        assert_eq!(shapes[1].line_width, 2.0);
        assert!(shapes.iter().all(ShapeSpec::is_drawable));
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let err = serde_json::from_str::<ShapeSpec>(r#"{"type": "hexagram"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_degenerate_triangle_not_drawable() {
        let shape = ShapeSpec::new(ShapeKind::Triangle {
            points: vec![[0.0, 0.0], [1.0, 1.0]],
        });
        assert!(!shape.is_drawable());
    }

    #[test]
    fn test_coordinates_scale_with_size() {
        let shape = ShapeSpec::circle(0.5);
        let mut canvas = RecordingCanvas::new(100.0, 100.0);
        shape.draw(&mut canvas, 20.0, Color::WHITE);
        let DrawCommand::FillPath { path, .. } = &canvas.commands()[0] else {
            panic!("expected a fill");
        };
        let (min, max) = path.bounds().unwrap();
        assert!((max.x - 10.0).abs() < 1e-3);
        assert!((min.x + 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_fill_and_stroke_issue_two_calls() {
        let shape = ShapeSpec::circle(0.5)
            .with_fill(Color::WHITE)
            .with_stroke(Color::BLACK, 1.0);
        let mut canvas = RecordingCanvas::new(10.0, 10.0);
        shape.draw(&mut canvas, 4.0, Color::WHITE);
        assert!(matches!(canvas.commands()[0], DrawCommand::FillPath { .. }));
        assert!(matches!(canvas.commands()[1], DrawCommand::StrokePath { .. }));
    }

    #[test]
    fn test_line_is_stroked_with_fallback() {
        let shape = ShapeSpec::new(ShapeKind::Line {
            x1: -0.5,
            y1: 0.0,
            x2: 0.5,
            y2: 0.0,
        });
        let mut canvas = RecordingCanvas::new(10.0, 10.0);
        shape.draw(&mut canvas, 4.0, Color::BLACK);
        match &canvas.commands()[0] {
            DrawCommand::StrokePath { paint, .. } => {
                assert_eq!(*paint, Paint::Solid(Color::BLACK))
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
