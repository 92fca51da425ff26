use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::action::{ActionMap, ActionName};
use crate::device::DeviceFrame;

/// Locomotion's view of one frame of input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LocomotionInput {
    /// x = strafe right, y = forward; each in [-1, 1].
    pub move_axis: Vec2,
    pub sprint_held: bool,
    /// True only on the frame the jump button went down.
    pub jump_pressed: bool,
}

/// Everything the controllers read in one frame.
///
/// `None` means the corresponding actions are not bound; consumers skip their tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    pub locomotion: Option<LocomotionInput>,
    pub look: Option<Vec2>,
    pub unlock_pressed: bool,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self::idle()
    }
}

impl FrameInput {
    /// All actions bound, nothing pressed.
    pub fn idle() -> Self {
        Self {
            locomotion: Some(LocomotionInput::default()),
            look: Some(Vec2::ZERO),
            unlock_pressed: false,
        }
    }

    pub fn with_move(mut self, move_axis: Vec2) -> Self {
        self.locomotion_mut().move_axis = move_axis;
        self
    }

    pub fn with_sprint(mut self, held: bool) -> Self {
        self.locomotion_mut().sprint_held = held;
        self
    }

    pub fn with_jump(mut self, pressed: bool) -> Self {
        self.locomotion_mut().jump_pressed = pressed;
        self
    }

    pub fn with_look(mut self, look: Vec2) -> Self {
        self.look = Some(look);
        self
    }

    fn locomotion_mut(&mut self) -> &mut LocomotionInput {
        self.locomotion.get_or_insert_with(Default::default)
    }
}

/// Tracks last frame's button state to report rising edges.
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    previous: BTreeMap<ActionName, bool>,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `down` for `action`; true if it was up last frame.
    pub fn update(&mut self, action: ActionName, down: bool) -> bool {
        let was_down = self.previous.insert(action, down).unwrap_or(false);
        down && !was_down
    }

    pub fn reset(&mut self) {
        self.previous.clear();
    }
}

/// Turns device frames into [`FrameInput`] through an action map.
#[derive(Debug, Clone)]
pub struct InputReader {
    map: ActionMap,
    edges: EdgeDetector,
}

impl InputReader {
    pub fn new(map: ActionMap) -> Self {
        for action in ActionName::ALL {
            if map.find(action).is_none() {
                tracing::warn!(map = %map.name, %action, "action not bound");
            }
        }
        Self {
            map,
            edges: EdgeDetector::new(),
        }
    }

    pub fn map(&self) -> &ActionMap {
        &self.map
    }

    /// Sample one frame. Call exactly once per frame so edges stay correct.
    pub fn read(&mut self, frame: &DeviceFrame) -> FrameInput {
        let jump_down = self.map.read_button(ActionName::Jump, frame);
        let jump_pressed = jump_down.map(|down| self.edges.update(ActionName::Jump, down));
        let unlock_pressed = self
            .map
            .read_button(ActionName::UnlockCursor, frame)
            .map(|down| self.edges.update(ActionName::UnlockCursor, down))
            .unwrap_or(false);

        let locomotion = match (
            self.map.read_axis(ActionName::Move, frame),
            self.map.read_button(ActionName::Sprint, frame),
            jump_pressed,
        ) {
            (Some(move_axis), Some(sprint_held), Some(jump_pressed)) => Some(LocomotionInput {
                move_axis,
                sprint_held,
                jump_pressed,
            }),
            _ => None,
        };

        FrameInput {
            locomotion,
            look: self.map.read_axis(ActionName::Look, frame),
            unlock_pressed,
        }
    }
}
