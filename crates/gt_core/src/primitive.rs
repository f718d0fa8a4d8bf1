//! Vector shapes drawn as a colored outline over a filled body.

use glam::{Affine2, Vec2};

use crate::canvas::{Canvas, Rgb};

pub const CIRCLE_SEGMENTS: usize = 50;
pub const OUTLINE_WIDTH: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Square { side: f32 },
    Triangle { base: f32, height: f32 },
}

/// A shape plus its outline and fill colors. Plain value, no owned resources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub line: Rgb,
    pub fill: Rgb,
}

impl Primitive {
    pub fn circle(line: Rgb, fill: Rgb, radius: f32) -> Self {
        Self {
            shape: Shape::Circle { radius },
            line,
            fill,
        }
    }

    pub fn square(line: Rgb, fill: Rgb, side: f32) -> Self {
        Self {
            shape: Shape::Square { side },
            line,
            fill,
        }
    }

    pub fn triangle(line: Rgb, fill: Rgb, base: f32, height: f32) -> Self {
        Self {
            shape: Shape::Triangle { base, height },
            line,
            fill,
        }
    }

    /// Local-space polygon, centered on the origin.
    pub fn outline(&self) -> Vec<Vec2> {
        match self.shape {
            Shape::Circle { radius } => (0..CIRCLE_SEGMENTS)
                .map(|i| {
                    let theta = (i as f32 / CIRCLE_SEGMENTS as f32 * 360.0).to_radians();
                    Vec2::new(theta.cos() * radius, theta.sin() * radius)
                })
                .collect(),
            Shape::Square { side } => {
                let half = side / 2.0;
                vec![
                    Vec2::new(-half, -half),
                    Vec2::new(half, -half),
                    Vec2::new(half, half),
                    Vec2::new(-half, half),
                ]
            }
            Shape::Triangle { base, height } => vec![
                Vec2::new(-base / 2.0, -height / 2.0),
                Vec2::new(base / 2.0, -height / 2.0),
                Vec2::new(0.0, height / 2.0),
            ],
        }
    }

    pub fn draw(&self, transform: &Affine2, canvas: &mut dyn Canvas) {
        let points: Vec<Vec2> = self
            .outline()
            .into_iter()
            .map(|p| transform.transform_point2(p))
            .collect();
        canvas.line_loop(&points, self.line, OUTLINE_WIDTH);
        canvas.polygon(&points, self.fill);
    }
}
