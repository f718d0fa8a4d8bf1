use glam::{Affine2, Vec2};

use crate::canvas::{Canvas, Viewport};
use crate::primitive::Primitive;
use crate::sprite::Sprite;

#[derive(Debug)]
pub enum Drawable {
    Shape(Primitive),
    Sprite(Sprite),
}

/// A transform plus exactly one drawable.
///
/// Objects holding a sprite are move-only. Shape-only objects can be
/// duplicated with [`GameObject::try_clone`].
#[derive(Debug)]
pub struct GameObject {
    position: Vec2,
    velocity: Vec2,
    rotation_deg: f32,
    scale: Vec2,
    visible: bool,
    active: bool,
    drawable: Drawable,
}

impl GameObject {
    pub fn new(position: Vec2, velocity: Vec2, drawable: Drawable) -> Self {
        Self {
            position,
            velocity,
            rotation_deg: 0.0,
            scale: Vec2::ONE,
            visible: true,
            active: true,
            drawable,
        }
    }

    pub fn with_shape(position: Vec2, velocity: Vec2, primitive: Primitive) -> Self {
        Self::new(position, velocity, Drawable::Shape(primitive))
    }

    pub fn with_sprite(position: Vec2, velocity: Vec2, sprite: Sprite) -> Self {
        Self::new(position, velocity, Drawable::Sprite(sprite))
    }

    /// Copy of a shape-only object. `None` when the object owns a sprite.
    pub fn try_clone(&self) -> Option<Self> {
        let Drawable::Shape(primitive) = &self.drawable else {
            return None;
        };
        Some(Self {
            position: self.position,
            velocity: self.velocity,
            rotation_deg: self.rotation_deg,
            scale: self.scale,
            visible: self.visible,
            active: self.active,
            drawable: Drawable::Shape(*primitive),
        })
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub fn rotation(&self) -> f32 {
        self.rotation_deg
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation_deg = degrees;
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn drawable(&self) -> &Drawable {
        &self.drawable
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        match &self.drawable {
            Drawable::Sprite(sprite) => Some(sprite),
            Drawable::Shape(_) => None,
        }
    }

    pub fn sprite_mut(&mut self) -> Option<&mut Sprite> {
        match &mut self.drawable {
            Drawable::Sprite(sprite) => Some(sprite),
            Drawable::Shape(_) => None,
        }
    }

    /// Animate, integrate velocity, then clip the position to the viewport.
    /// Velocity is left untouched by the clip.
    pub fn update(&mut self, dt: f32, viewport: Viewport) {
        if !self.active {
            return;
        }
        if let Drawable::Sprite(sprite) = &mut self.drawable {
            sprite.advance(dt);
        }
        self.position += self.velocity * dt;
        self.position = self.position.clamp(Vec2::ZERO, viewport.size());
    }

    /// Translate, then rotate, then scale.
    pub fn transform(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(
            self.scale,
            self.rotation_deg.to_radians(),
            self.position,
        )
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        if !self.visible {
            return;
        }
        let transform = self.transform();
        match &self.drawable {
            Drawable::Shape(primitive) => primitive.draw(&transform, canvas),
            Drawable::Sprite(sprite) => sprite.draw(&transform, canvas),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Rgb;
    use crate::testing::{approx_eq, DrawOp, FakeLoader, RecordingCanvas};
    use glam::UVec2;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 500.0)
    }

    fn square_at(position: Vec2, velocity: Vec2) -> GameObject {
        GameObject::with_shape(
            position,
            velocity,
            Primitive::square(Rgb::WHITE, Rgb::BLACK, 10.0),
        )
    }

    fn sprite_object() -> GameObject {
        let mut loader = FakeLoader::default();
        let sprite = Sprite::new(
            &mut loader,
            "sprites/player.png",
            Vec2::new(26.0, 22.0),
            UVec2::new(8, 1),
            false,
        );
        GameObject::with_sprite(Vec2::new(100.0, 100.0), Vec2::ZERO, sprite)
    }

    #[test]
    fn update_integrates_velocity() {
        let mut obj = square_at(Vec2::new(100.0, 100.0), Vec2::new(20.0, -10.0));
        obj.update(0.5, viewport());
        assert!(approx_eq(obj.position(), Vec2::new(110.0, 95.0)));
    }

    #[test]
    fn update_clamps_to_right_edge() {
        let mut obj = square_at(Vec2::new(790.0, 0.0), Vec2::new(50.0, 0.0));
        obj.update(1.0, viewport());
        assert!(approx_eq(obj.position(), Vec2::new(800.0, 0.0)));
        // Clip only, not a bounce.
        assert_eq!(obj.velocity(), Vec2::new(50.0, 0.0));
    }

    #[test]
    fn update_clamps_below_zero_on_both_axes() {
        let mut obj = square_at(Vec2::new(5.0, 600.0), Vec2::new(-100.0, 50.0));
        obj.update(1.0, viewport());
        assert!(approx_eq(obj.position(), Vec2::new(0.0, 500.0)));
    }

    #[test]
    fn update_matches_clamped_integration_for_many_inputs() {
        let vp = viewport();
        let starts = [Vec2::ZERO, Vec2::new(400.0, 250.0), Vec2::new(799.0, 1.0)];
        let velocities = [Vec2::new(-300.0, 0.0), Vec2::new(33.0, 77.0), Vec2::ZERO];
        for &p in &starts {
            for &v in &velocities {
                for dt in [0.0f32, 0.016, 0.5, 3.0] {
                    let mut obj = square_at(p, v);
                    obj.update(dt, vp);
                    let expected = (p + v * dt).clamp(Vec2::ZERO, vp.size());
                    assert!(approx_eq(obj.position(), expected));
                }
            }
        }
    }

    #[test]
    fn inactive_object_does_not_move_or_animate() {
        let mut obj = sprite_object();
        obj.set_velocity(Vec2::new(100.0, 100.0));
        obj.set_active(false);
        obj.update(1.0, viewport());
        assert_eq!(obj.position(), Vec2::new(100.0, 100.0));
        assert_eq!(obj.sprite().map(Sprite::current_frame), Some(0));
    }

    #[test]
    fn update_advances_sprite_animation() {
        let mut obj = sprite_object();
        obj.update(0.3, viewport());
        assert_eq!(obj.sprite().map(Sprite::current_frame), Some(1));
    }

    #[test]
    fn invisible_object_renders_nothing() {
        let mut obj = square_at(Vec2::new(10.0, 10.0), Vec2::ZERO);
        obj.set_visible(false);
        let mut canvas = RecordingCanvas::default();
        obj.render(&mut canvas);
        assert!(canvas.ops.is_empty());
    }

    #[test]
    fn render_dispatches_to_shape() {
        let obj = square_at(Vec2::new(10.0, 10.0), Vec2::ZERO);
        let mut canvas = RecordingCanvas::default();
        obj.render(&mut canvas);
        assert_eq!(canvas.ops.len(), 2);
        let DrawOp::Polygon { points, .. } = &canvas.ops[1] else {
            panic!("expected polygon");
        };
        assert!(approx_eq(points[0], Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn render_dispatches_to_sprite() {
        let obj = sprite_object();
        let mut canvas = RecordingCanvas::default();
        obj.render(&mut canvas);
        assert_eq!(canvas.ops.len(), 1);
        let DrawOp::Quad { blend, corners, .. } = &canvas.ops[0] else {
            panic!("expected quad");
        };
        assert!(!blend);
        assert!(approx_eq(corners[0], Vec2::new(100.0, 100.0)));
    }

    #[test]
    fn transform_scales_before_rotating_before_translating() {
        let mut obj = square_at(Vec2::new(100.0, 50.0), Vec2::ZERO);
        obj.set_scale(Vec2::new(2.0, 1.0));
        obj.set_rotation(90.0);
        let p = obj.transform().transform_point2(Vec2::new(1.0, 0.0));
        // (1,0) scaled to (2,0), rotated to (0,2), translated to (100,52).
        assert!(approx_eq(p, Vec2::new(100.0, 52.0)));
    }

    #[test]
    fn try_clone_copies_shape_objects_only() {
        let mut shape = square_at(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0));
        shape.set_rotation(45.0);
        let copy = shape.try_clone().expect("shape objects are copyable");
        assert_eq!(copy.position(), shape.position());
        assert_eq!(copy.velocity(), shape.velocity());
        assert_eq!(copy.rotation(), 45.0);

        assert!(sprite_object().try_clone().is_none());
    }

    #[test]
    fn sprite_mut_allows_flipping() {
        let mut obj = sprite_object();
        obj.sprite_mut()
            .expect("sprite object")
            .set_flip(true, false);
        assert_eq!(obj.sprite().map(Sprite::flip), Some((true, false)));
        assert!(square_at(Vec2::ZERO, Vec2::ZERO).sprite_mut().is_none());
    }
}
