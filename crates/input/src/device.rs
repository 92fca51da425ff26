use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Keyboard keys the default bindings use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Space,
    LeftShift,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GamepadButton {
    South,
    East,
    LeftStickPress,
    RightStickPress,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stick {
    Left,
    Right,
}

/// Raw device state sampled once per frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceFrame {
    pub keys: BTreeSet<Key>,
    pub buttons: BTreeSet<GamepadButton>,
    /// Pointer movement since the previous frame.
    pub mouse_delta: Vec2,
    pub left_stick: Vec2,
    pub right_stick: Vec2,
}

impl DeviceFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.keys.insert(key);
        self
    }

    pub fn with_button(mut self, button: GamepadButton) -> Self {
        self.buttons.insert(button);
        self
    }

    pub fn with_mouse_delta(mut self, delta: Vec2) -> Self {
        self.mouse_delta = delta;
        self
    }

    pub fn with_stick(mut self, stick: Stick, value: Vec2) -> Self {
        match stick {
            Stick::Left => self.left_stick = value,
            Stick::Right => self.right_stick = value,
        }
        self
    }

    pub fn key(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn button(&self, button: GamepadButton) -> bool {
        self.buttons.contains(&button)
    }

    pub fn stick(&self, stick: Stick) -> Vec2 {
        match stick {
            Stick::Left => self.left_stick,
            Stick::Right => self.right_stick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_state() {
        let f = DeviceFrame::new()
            .with_key(Key::W)
            .with_button(GamepadButton::South)
            .with_stick(Stick::Right, Vec2::new(0.5, 0.0));
        assert!(f.key(Key::W));
        assert!(!f.key(Key::S));
        assert!(f.button(GamepadButton::South));
        assert_eq!(f.stick(Stick::Right), Vec2::new(0.5, 0.0));
        assert_eq!(f.stick(Stick::Left), Vec2::ZERO);
    }
}
