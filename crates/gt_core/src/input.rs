//! Keyboard and mouse state, refreshed once per frame.
//!
//! - **Level-triggered (held):** `is_held(key)` is true every frame the key is
//!   physically down.
//!
//! - **Edge-triggered (pressed):** `is_pressed(key)` reports a press exactly
//!   once. Reading it consumes the edge, so a second poll in the same frame (or
//!   any later frame) returns false until the key is released and pressed again.
//!
//! - **Released:** `is_released(key)` is true while the key is up and its press
//!   edge is still unconsumed, i.e. the key went down and up without anyone
//!   polling `is_pressed`. `update()` drops unconsumed edges of keys that are
//!   not held, so this only holds until the end of the frame. A key whose press
//!   *was* polled never reports a release.
//!
//! Keys live in a 256-entry table. Letters are folded to upper case; codes
//! outside the table are ignored on write and read back as not pressed.

use glam::Vec2;

use crate::canvas::Viewport;

pub const KEY_TABLE_SIZE: usize = 256;

/// Key code in the 256-entry table. Printable keys use their ASCII code,
/// navigation and function keys use the otherwise unused 0x80.. range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(u32);

impl Key {
    pub const BACKSPACE: Key = Key(0x08);
    pub const TAB: Key = Key(0x09);
    pub const ENTER: Key = Key(0x0d);
    pub const ESCAPE: Key = Key(0x1b);
    pub const SPACE: Key = Key(b' ' as u32);
    pub const A: Key = Key(b'A' as u32);
    pub const D: Key = Key(b'D' as u32);
    pub const L: Key = Key(b'L' as u32);
    pub const P: Key = Key(b'P' as u32);
    pub const S: Key = Key(b'S' as u32);
    pub const W: Key = Key(b'W' as u32);
    pub const LEFT: Key = Key(0x80);
    pub const RIGHT: Key = Key(0x81);
    pub const UP: Key = Key(0x82);
    pub const DOWN: Key = Key(0x83);
    pub const F1: Key = Key(0x90);

    pub const fn from_code(code: u32) -> Self {
        Self(code)
    }

    /// Key typed as `c`; letters map to their upper-case code.
    pub fn from_char(c: char) -> Self {
        Self(c.to_ascii_uppercase() as u32)
    }

    /// Function key `F1..=F12`.
    pub fn function(n: u8) -> Option<Self> {
        (1..=12)
            .contains(&n)
            .then(|| Self(Self::F1.0 + u32::from(n) - 1))
    }

    pub fn code(self) -> u32 {
        self.0
    }

    fn slot(self) -> Option<usize> {
        let index = self.0 as usize;
        (index < KEY_TABLE_SIZE).then_some(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseBtn {
    Left,
    Right,
    Middle,
}

impl MouseBtn {
    fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Middle => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct KeyState {
    held: bool,
    press_pending: bool,
}

pub struct InputState {
    keys: [KeyState; KEY_TABLE_SIZE],
    mouse_held: [bool; 3],
    mouse_position: Vec2,
    last_mouse_position: Vec2,
    mouse_delta: Vec2,
    cursor_locked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys: [KeyState::default(); KEY_TABLE_SIZE],
            mouse_held: [false; 3],
            mouse_position: Vec2::ZERO,
            last_mouse_position: Vec2::ZERO,
            mouse_delta: Vec2::ZERO,
            cursor_locked: false,
        }
    }

    pub fn key_down(&mut self, key: Key) {
        let Some(slot) = key.slot() else {
            return;
        };
        let state = &mut self.keys[slot];
        if !state.held {
            state.held = true;
            state.press_pending = true;
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if let Some(slot) = key.slot() {
            self.keys[slot].held = false;
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        key.slot().is_some_and(|slot| self.keys[slot].held)
    }

    /// Consume-on-read press edge.
    pub fn is_pressed(&mut self, key: Key) -> bool {
        let Some(slot) = key.slot() else {
            return false;
        };
        let state = &mut self.keys[slot];
        if state.held && state.press_pending {
            state.press_pending = false;
            return true;
        }
        false
    }

    pub fn is_released(&self, key: Key) -> bool {
        key.slot().is_some_and(|slot| {
            let state = self.keys[slot];
            !state.held && state.press_pending
        })
    }

    pub fn is_any_key_held(&self) -> bool {
        self.keys.iter().any(|k| k.held)
    }

    pub fn mouse_down(&mut self, btn: MouseBtn) {
        self.mouse_held[btn.index()] = true;
        if btn == MouseBtn::Left {
            log::debug!(
                "Cursor position: x = {}, y = {}",
                self.mouse_position.x,
                self.mouse_position.y
            );
        }
    }

    pub fn mouse_up(&mut self, btn: MouseBtn) {
        self.mouse_held[btn.index()] = false;
    }

    pub fn is_mouse_held(&self, btn: MouseBtn) -> bool {
        self.mouse_held[btn.index()]
    }

    pub fn mouse_moved(&mut self, x: f32, y: f32) {
        self.mouse_position = Vec2::new(x, y);
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Cursor movement measured by the last `update()`.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    pub fn is_cursor_locked(&self) -> bool {
        self.cursor_locked
    }

    pub fn set_cursor_locked(&mut self, locked: bool) {
        self.cursor_locked = locked;
    }

    /// Called once per frame, after game logic has read this frame's input.
    ///
    /// Free cursor: delta is the previous position minus the current one.
    /// Locked cursor: delta is the viewport center minus the current position,
    /// since the platform warps the pointer back to the center every frame.
    pub fn update(&mut self, viewport: Viewport) {
        if self.cursor_locked {
            self.mouse_delta = viewport.center() - self.mouse_position;
        } else {
            self.mouse_delta = self.last_mouse_position - self.mouse_position;
            self.last_mouse_position = self.mouse_position;
        }

        for state in self.keys.iter_mut().filter(|k| !k.held) {
            state.press_pending = false;
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
