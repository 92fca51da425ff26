use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::device::{DeviceFrame, GamepadButton, Key, Stick};

/// Actions the controllers read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionName {
    /// 2D move vector; x = strafe, y = forward.
    Move,
    /// 2D look delta; x = yaw, y = pitch.
    Look,
    Jump,
    Sprint,
    /// Release pointer capture.
    UnlockCursor,
}

impl ActionName {
    pub const ALL: [ActionName; 5] = [
        ActionName::Move,
        ActionName::Look,
        ActionName::Jump,
        ActionName::Sprint,
        ActionName::UnlockCursor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Look => "look",
            Self::Jump => "jump",
            Self::Sprint => "sprint",
            Self::UnlockCursor => "unlock-cursor",
        }
    }
}

impl std::fmt::Display for ActionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionName {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| InputError::UnknownAction(s.to_string()))
    }
}

/// Errors from action map setup.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("action `{0}` has no bindings")]
    EmptyBindings(ActionName),
    #[error("unknown action `{0}`")]
    UnknownAction(String),
}

/// A single control an action listens to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Binding {
    Key(Key),
    Button(GamepadButton),
    /// Four keys forming a 2D vector.
    Composite {
        up: Key,
        down: Key,
        left: Key,
        right: Key,
    },
    Stick(Stick),
    MouseDelta,
}

impl Binding {
    fn axis(&self, frame: &DeviceFrame) -> Option<Vec2> {
        match *self {
            Binding::Composite {
                up,
                down,
                left,
                right,
            } => {
                let axis = |pos: Key, neg: Key| {
                    f32::from(u8::from(frame.key(pos))) - f32::from(u8::from(frame.key(neg)))
                };
                let v = Vec2::new(axis(right, left), axis(up, down));
                Some(v.clamp_length_max(1.0))
            }
            Binding::Stick(stick) => Some(frame.stick(stick).clamp_length_max(1.0)),
            Binding::MouseDelta => Some(frame.mouse_delta),
            Binding::Key(_) | Binding::Button(_) => None,
        }
    }

    fn pressed(&self, frame: &DeviceFrame) -> bool {
        match *self {
            Binding::Key(key) => frame.key(key),
            Binding::Button(button) => frame.button(button),
            _ => false,
        }
    }
}

/// Named set of action bindings. Fields left out of a document take the
/// player defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionMap {
    pub name: String,
    pub actions: BTreeMap<ActionName, Vec<Binding>>,
}

impl Default for ActionMap {
    fn default() -> Self {
        Self::player_default()
    }
}

impl ActionMap {
    /// Empty map; every action unbound.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: BTreeMap::new(),
        }
    }

    /// Keyboard/mouse plus gamepad bindings for a third-person player.
    pub fn player_default() -> Self {
        let wasd = Binding::Composite {
            up: Key::W,
            down: Key::S,
            left: Key::A,
            right: Key::D,
        };
        let arrows = Binding::Composite {
            up: Key::Up,
            down: Key::Down,
            left: Key::Left,
            right: Key::Right,
        };
        let stick_press = Binding::Button(GamepadButton::LeftStickPress);
        Self::empty("Player")
            .bind(ActionName::Move, wasd)
            .bind(ActionName::Move, arrows)
            .bind(ActionName::Move, Binding::Stick(Stick::Left))
            .bind(ActionName::Look, Binding::MouseDelta)
            .bind(ActionName::Look, Binding::Stick(Stick::Right))
            .bind(ActionName::Jump, Binding::Key(Key::Space))
            .bind(ActionName::Jump, Binding::Button(GamepadButton::South))
            .bind(ActionName::Sprint, Binding::Key(Key::LeftShift))
            .bind(ActionName::Sprint, stick_press)
            .bind(ActionName::UnlockCursor, Binding::Key(Key::Escape))
    }

    pub fn bind(mut self, action: ActionName, binding: Binding) -> Self {
        self.actions.entry(action).or_default().push(binding);
        self
    }

    /// Remove every binding for `action`. Returns whether it was bound.
    pub fn unbind(&mut self, action: ActionName) -> bool {
        self.actions.remove(&action).is_some()
    }

    pub fn find(&self, action: ActionName) -> Option<&[Binding]> {
        self.actions.get(&action).map(Vec::as_slice)
    }

    /// Every present action must carry at least one binding.
    pub fn validate(&self) -> Result<(), InputError> {
        match self.actions.iter().find(|(_, b)| b.is_empty()) {
            Some((action, _)) => Err(InputError::EmptyBindings(*action)),
            None => Ok(()),
        }
    }

    /// Axis value of `action`; the binding with the largest magnitude wins.
    pub fn read_axis(&self, action: ActionName, frame: &DeviceFrame) -> Option<Vec2> {
        let bindings = self.find(action)?;
        let strongest = bindings
            .iter()
            .filter_map(|b| b.axis(frame))
            .fold(Vec2::ZERO, |best, v| {
                if v.length_squared() > best.length_squared() {
                    v
                } else {
                    best
                }
            });
        Some(strongest)
    }

    /// Whether any button binding of `action` is held.
    pub fn read_button(&self, action: ActionName, frame: &DeviceFrame) -> Option<bool> {
        let bindings = self.find(action)?;
        Some(bindings.iter().any(|b| b.pressed(frame)))
    }
}
