//! Input events consumed by the editor.
//!
//! A UI shell translates its native events into these and feeds them to
//! [`crate::Canvas::handle_event`]. Positions are in screen pixels relative to
//! the canvas' top-left corner.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    /// Drives the active tool.
    Primary,
    /// Always pans.
    Secondary,
    Middle,
}

/// A single input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown {
        button: PointerButton,
        position: Point,
        shift: bool,
    },
    PointerMove {
        position: Point,
    },
    PointerUp,
    /// The pointer left the canvas; ends any drag like a release.
    PointerLeave,
    Wheel {
        delta_y: f64,
        position: Point,
    },
    /// A key press, named like DOM `KeyboardEvent.key`.
    KeyDown(String),
}

/// Keyboard commands the editor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Delete the selection.
    Delete,
    /// Drop the pending line and stop the current drag (no revert).
    Cancel,
    /// Toggle 15 degree rotation snapping.
    ToggleRotateSnap,
    /// Cycle lattice, lattice-with-midpoints, free.
    CycleSnapMode,
    /// Cycle move, rotate, scale.
    CycleTransformMode,
    /// Back to zoom 1 centred on the origin.
    ResetView,
}

impl KeyCommand {
    /// Look up the command bound to a key name.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Delete" | "Backspace" => Some(KeyCommand::Delete),
            "Escape" => Some(KeyCommand::Cancel),
            "r" | "R" => Some(KeyCommand::ToggleRotateSnap),
            "s" | "S" => Some(KeyCommand::CycleSnapMode),
            "t" | "T" => Some(KeyCommand::CycleTransformMode),
            "0" => Some(KeyCommand::ResetView),
            _ => None,
        }
    }
}
