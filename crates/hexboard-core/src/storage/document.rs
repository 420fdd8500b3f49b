//! Persisted document format.
//!
//! ```json
//! {"lines": [{"a": {"x": 0, "y": 0}, "b": {"x": 40, "y": 0}, "color": "#00ff55"}],
//!  "snapMode": "lattice"}
//! ```
//!
//! A bare array of lines without colours is also accepted as a legacy
//! document.

use crate::shapes::{DEFAULT_COLOR, Segment};
use crate::snap::SnapMode;
use crate::store::ShapeStore;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors from parsing a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Document has no \"lines\" array")]
    MissingLines,
    #[error("Invalid line {index}: {reason}")]
    InvalidLine { index: usize, reason: String },
    #[error("Unknown snap mode: {0:?}")]
    InvalidSnapMode(String),
}

/// One persisted segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub a: Point,
    pub b: Point,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl From<&Segment> for LineRecord {
    fn from(segment: &Segment) -> Self {
        Self {
            a: segment.a,
            b: segment.b,
            color: segment.color.clone(),
        }
    }
}

impl From<LineRecord> for Segment {
    fn from(record: LineRecord) -> Self {
        Segment::new(record.a, record.b, record.color)
    }
}

/// A saved drawing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub lines: Vec<LineRecord>,
    #[serde(rename = "snapMode", default, skip_serializing_if = "Option::is_none")]
    pub snap_mode: Option<SnapMode>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot a store's segments in draw order.
    pub fn from_store(store: &ShapeStore, snap_mode: Option<SnapMode>) -> Self {
        Self {
            lines: store.iter().map(LineRecord::from).collect(),
            snap_mode,
        }
    }

    /// Fresh segments for every line, in order.
    pub fn segments(&self) -> Vec<Segment> {
        self.lines.iter().cloned().map(Segment::from).collect()
    }

    /// Parse and validate a document.
    ///
    /// Checks the shape of the input before deserializing so the error can
    /// name the offending line.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(json)?;
        let (lines, snap_mode) = match value {
            Value::Array(lines) => (lines, None),
            Value::Object(mut map) => {
                let lines = match map.remove("lines") {
                    Some(Value::Array(lines)) => lines,
                    _ => return Err(DocumentError::MissingLines),
                };
                let snap_mode = match map.remove("snapMode") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(name)) => Some(
                        name.parse::<SnapMode>()
                            .map_err(|_| DocumentError::InvalidSnapMode(name))?,
                    ),
                    Some(other) => return Err(DocumentError::InvalidSnapMode(other.to_string())),
                };
                (lines, snap_mode)
            }
            _ => return Err(DocumentError::MissingLines),
        };

        let lines = lines
            .into_iter()
            .enumerate()
            .map(|(index, line)| {
                let record: LineRecord = serde_json::from_value(line).map_err(|e| DocumentError::InvalidLine {
                    index,
                    reason: e.to_string(),
                })?;
                let finite = [record.a, record.b].iter().all(|p| p.x.is_finite() && p.y.is_finite());
                if !finite {
                    return Err(DocumentError::InvalidLine {
                        index,
                        reason: "non-finite coordinate".to_string(),
                    });
                }
                Ok(record)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { lines, snap_mode })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
