//! winit key and button codes to input-table codes.

use gt_core::input::{Key, MouseBtn};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Physical key to table code. Letters and digits use their ASCII code, so
/// the mapping does not depend on shift state or keyboard layout.
pub fn map_key(key_code: KeyCode) -> Option<Key> {
    if let Some(c) = printable(key_code) {
        return Some(Key::from_char(c));
    }
    let key = match key_code {
        KeyCode::ArrowLeft => Key::LEFT,
        KeyCode::ArrowRight => Key::RIGHT,
        KeyCode::ArrowUp => Key::UP,
        KeyCode::ArrowDown => Key::DOWN,
        KeyCode::Escape => Key::ESCAPE,
        KeyCode::Space => Key::SPACE,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::ENTER,
        KeyCode::Tab => Key::TAB,
        KeyCode::Backspace => Key::BACKSPACE,
        other => return function_number(other).and_then(Key::function),
    };
    Some(key)
}

pub fn map_mouse_button(button: MouseButton) -> Option<MouseBtn> {
    match button {
        MouseButton::Left => Some(MouseBtn::Left),
        MouseButton::Right => Some(MouseBtn::Right),
        MouseButton::Middle => Some(MouseBtn::Middle),
        _ => None,
    }
}

fn function_number(key_code: KeyCode) -> Option<u8> {
    const KEYS: [KeyCode; 12] = [
        KeyCode::F1,
        KeyCode::F2,
        KeyCode::F3,
        KeyCode::F4,
        KeyCode::F5,
        KeyCode::F6,
        KeyCode::F7,
        KeyCode::F8,
        KeyCode::F9,
        KeyCode::F10,
        KeyCode::F11,
        KeyCode::F12,
    ];
    KEYS.iter()
        .position(|&k| k == key_code)
        .map(|i| i as u8 + 1)
}

fn printable(key_code: KeyCode) -> Option<char> {
    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA,
        KeyCode::KeyB,
        KeyCode::KeyC,
        KeyCode::KeyD,
        KeyCode::KeyE,
        KeyCode::KeyF,
        KeyCode::KeyG,
        KeyCode::KeyH,
        KeyCode::KeyI,
        KeyCode::KeyJ,
        KeyCode::KeyK,
        KeyCode::KeyL,
        KeyCode::KeyM,
        KeyCode::KeyN,
        KeyCode::KeyO,
        KeyCode::KeyP,
        KeyCode::KeyQ,
        KeyCode::KeyR,
        KeyCode::KeyS,
        KeyCode::KeyT,
        KeyCode::KeyU,
        KeyCode::KeyV,
        KeyCode::KeyW,
        KeyCode::KeyX,
        KeyCode::KeyY,
        KeyCode::KeyZ,
    ];
    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0,
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];
    if let Some(i) = LETTERS.iter().position(|&k| k == key_code) {
        return Some((b'A' + i as u8) as char);
    }
    DIGITS
        .iter()
        .position(|&k| k == key_code)
        .map(|i| (b'0' + i as u8) as char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_map_to_upper_case_codes() {
        assert_eq!(map_key(KeyCode::KeyA), Some(Key::A));
        assert_eq!(map_key(KeyCode::KeyD), Some(Key::D));
        assert_eq!(map_key(KeyCode::KeyZ), Some(Key::from_char('z')));
    }

    #[test]
    fn digits_map_to_ascii() {
        assert_eq!(map_key(KeyCode::Digit0), Some(Key::from_code(u32::from(b'0'))));
        assert_eq!(map_key(KeyCode::Digit7), Some(Key::from_char('7')));
    }

    #[test]
    fn named_and_function_keys() {
        assert_eq!(map_key(KeyCode::Escape), Some(Key::ESCAPE));
        assert_eq!(map_key(KeyCode::ArrowLeft), Some(Key::LEFT));
        assert_eq!(map_key(KeyCode::F1), Some(Key::F1));
        assert_eq!(map_key(KeyCode::F12), Key::function(12));
    }

    #[test]
    fn unmapped_inputs_are_ignored() {
        assert_eq!(map_key(KeyCode::CapsLock), None);
        assert_eq!(map_mouse_button(MouseButton::Back), None);
        assert_eq!(map_mouse_button(MouseButton::Middle), Some(MouseBtn::Middle));
    }
}
