//! Per-frame game logic, independent of the window and GPU.
//!
//! Each tick: read input, move the player, update every object, then refresh
//! the input tracker so press edges and mouse deltas are ready for the next
//! frame. Rendering walks the objects in creation order.

use glam::Vec2;
use gt_core::canvas::{Canvas, Rgb, TextureLoader, Viewport};
use gt_core::config::GameConfig;
use gt_core::game_object::GameObject;
use gt_core::input::{InputState, Key};
use gt_core::primitive::Primitive;
use gt_core::sprite::Sprite;

/// Requests the driver makes of the shell around it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCommands {
    pub exit: bool,
    pub toggle_overlay: bool,
    pub cursor_lock_changed: bool,
}

pub struct FrameDriver {
    pub objects: Vec<GameObject>,
    pub input: InputState,
    pub paused: bool,
    player: usize,
    player_speed: f32,
}

impl FrameDriver {
    pub fn new(config: &GameConfig, loader: &mut dyn TextureLoader) -> Self {
        let mut input = InputState::new();
        input.set_cursor_locked(config.cursor_locked);

        let mut objects = demo_shapes();
        let player = objects.len();
        objects.push(build_player(config, loader));
        log::info!("Scene ready: {} objects", objects.len());

        Self {
            objects,
            input,
            paused: false,
            player,
            player_speed: config.player.speed,
        }
    }

    pub fn player(&self) -> &GameObject {
        &self.objects[self.player]
    }

    pub fn player_mut(&mut self) -> &mut GameObject {
        &mut self.objects[self.player]
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::info!(
            "Simulation {}",
            if self.paused { "PAUSED" } else { "RESUMED" }
        );
    }

    pub fn toggle_cursor_lock(&mut self) {
        let locked = !self.input.is_cursor_locked();
        self.input.set_cursor_locked(locked);
        log::info!("Cursor lock: {}", if locked { "ON" } else { "OFF" });
    }

    pub fn tick(&mut self, dt: f32, viewport: Viewport) -> FrameCommands {
        let mut commands = FrameCommands::default();
        if self.input.is_pressed(Key::ESCAPE) {
            commands.exit = true;
        }
        if Key::function(3).is_some_and(|f3| self.input.is_pressed(f3)) {
            commands.toggle_overlay = true;
        }
        if self.input.is_pressed(Key::L) {
            self.toggle_cursor_lock();
            commands.cursor_lock_changed = true;
        }
        if self.input.is_pressed(Key::P) {
            self.toggle_pause();
        }

        if !self.paused {
            self.move_player(dt);
            for object in &mut self.objects {
                object.update(dt, viewport);
            }
        }

        self.input.update(viewport);
        commands
    }

    fn move_player(&mut self, dt: f32) {
        let step = self.player_speed * dt;
        let left = self.input.is_held(Key::A) || self.input.is_held(Key::LEFT);
        let right = self.input.is_held(Key::D) || self.input.is_held(Key::RIGHT);
        let player = &mut self.objects[self.player];
        if left {
            player.set_position(player.position() - Vec2::new(step, 0.0));
            if let Some(sprite) = player.sprite_mut() {
                sprite.set_flip(true, false);
            }
        }
        if right {
            player.set_position(player.position() + Vec2::new(step, 0.0));
            if let Some(sprite) = player.sprite_mut() {
                sprite.set_flip(false, false);
            }
        }
    }

    pub fn render(&self, canvas: &mut dyn Canvas) {
        for object in &self.objects {
            object.render(canvas);
        }
    }
}

fn build_player(config: &GameConfig, loader: &mut dyn TextureLoader) -> GameObject {
    let player = &config.player;
    let mut sprite = Sprite::new(
        loader,
        &player.sprite,
        player.size(),
        player.frames(),
        player.transparent,
    );
    sprite.set_frame_duration(player.frame_duration);
    GameObject::with_sprite(player.start(), Vec2::ZERO, sprite)
}

fn demo_shapes() -> Vec<GameObject> {
    let outline = Rgb::new(0.1, 0.1, 0.1);

    let circle = GameObject::with_shape(
        Vec2::new(200.0, 300.0),
        Vec2::new(40.0, 25.0),
        Primitive::circle(outline, Rgb::new(0.9, 0.4, 0.2), 30.0),
    );

    let mut square = GameObject::with_shape(
        Vec2::new(400.0, 150.0),
        Vec2::new(-30.0, 0.0),
        Primitive::square(outline, Rgb::new(0.2, 0.6, 0.9), 50.0),
    );
    square.set_rotation(15.0);

    let mut triangle = GameObject::with_shape(
        Vec2::new(600.0, 350.0),
        Vec2::new(0.0, -20.0),
        Primitive::triangle(outline, Rgb::new(0.3, 0.8, 0.3), 60.0, 50.0),
    );
    triangle.set_scale(Vec2::new(1.5, 1.0));

    vec![circle, square, triangle]
}
