//! Tool system for the editor.

use crate::presets::PresetKind;
use crate::shapes::DEFAULT_COLOR;
use crate::snap::ParseError;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available tools. The primary pointer button drives the current tool; the
/// secondary button always pans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ToolKind {
    /// Click two lattice points to draw a segment.
    #[default]
    Line,
    /// Click a shape to select it, drag to transform.
    Select,
    /// Click a segment to delete it.
    Erase,
    /// Drag to pan the view.
    Pan,
    /// Click or drag to place a preset shape.
    Preset(PresetKind),
}

impl ToolKind {
    /// Name used by the UI.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Line => "line",
            ToolKind::Select => "select",
            ToolKind::Erase => "erase",
            ToolKind::Pan => "pan",
            ToolKind::Preset(kind) => kind.as_str(),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(ToolKind::Line),
            "select" => Ok(ToolKind::Select),
            "erase" => Ok(ToolKind::Erase),
            "pan" => Ok(ToolKind::Pan),
            other => other
                .parse::<PresetKind>()
                .map(ToolKind::Preset)
                .map_err(|_| ParseError::new("tool", other)),
        }
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// The first endpoint of a line has been placed.
    LineStarted {
        /// Snapped world position of the first click.
        start: Point,
    },
}

/// Manages the current tool and its state.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    /// Colour given to new segments.
    pub current_color: String,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            state: ToolState::default(),
            current_color: DEFAULT_COLOR.to_string(),
        }
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool. Any half-finished interaction is dropped.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = ToolState::Idle;
    }

    /// Register a line-tool click at a (snapped) world point.
    ///
    /// The first click stores the start; the second returns the finished
    /// endpoints and resets. A second click on the start point finishes
    /// nothing.
    pub fn line_click(&mut self, point: Point) -> Option<(Point, Point)> {
        match self.state {
            ToolState::Idle => {
                self.state = ToolState::LineStarted { start: point };
                None
            }
            ToolState::LineStarted { start } => {
                self.state = ToolState::Idle;
                (start.distance(point) > f64::EPSILON).then_some((start, point))
            }
        }
    }

    /// Start of the line being drawn, if any.
    pub fn pending_line_start(&self) -> Option<Point> {
        match self.state {
            ToolState::LineStarted { start } => Some(start),
            ToolState::Idle => None,
        }
    }

    /// Rubber-band preview from the pending start to the cursor.
    pub fn preview_line(&self, cursor: Point) -> Option<(Point, Point)> {
        self.pending_line_start().map(|start| (start, cursor))
    }

    /// Cancel the current interaction.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
    }

    /// Check if a tool interaction is active.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, ToolState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_selection() {
        let mut tm = ToolManager::new();
        assert_eq!(tm.current_tool, ToolKind::Line);

        tm.set_tool(ToolKind::Select);
        assert_eq!(tm.current_tool, ToolKind::Select);
    }

    #[test]
    fn test_two_click_line() {
        let mut tm = ToolManager::new();
        assert!(tm.line_click(Point::new(0.0, 0.0)).is_none());
        assert!(tm.is_active());
        assert_eq!(tm.preview_line(Point::new(5.0, 5.0)), Some((Point::ZERO, Point::new(5.0, 5.0))));

        let line = tm.line_click(Point::new(40.0, 0.0));
        assert_eq!(line, Some((Point::new(0.0, 0.0), Point::new(40.0, 0.0))));
        assert!(!tm.is_active());
    }

    #[test]
    fn test_zero_length_line_is_dropped() {
        let mut tm = ToolManager::new();
        tm.line_click(Point::new(20.0, 0.0));
        assert!(tm.line_click(Point::new(20.0, 0.0)).is_none());
        assert!(!tm.is_active());
    }

    #[test]
    fn test_set_tool_cancels_pending_line() {
        let mut tm = ToolManager::new();
        tm.line_click(Point::new(0.0, 0.0));
        tm.set_tool(ToolKind::Erase);
        assert!(tm.pending_line_start().is_none());
    }

    #[test]
    fn test_cancel_interaction() {
        let mut tm = ToolManager::new();
        tm.line_click(Point::new(0.0, 0.0));
        tm.cancel();
        assert!(!tm.is_active());
    }

    #[test]
    fn test_tool_names() {
        assert_eq!("select".parse::<ToolKind>(), Ok(ToolKind::Select));
        assert_eq!("cube".parse::<ToolKind>(), Ok(ToolKind::Preset(PresetKind::Cube)));
        assert_eq!(ToolKind::Preset(PresetKind::Hexagon).name(), "hexagon");
        let err = "lasso".parse::<ToolKind>().unwrap_err();
        assert_eq!(err.kind, "tool");
    }
}
