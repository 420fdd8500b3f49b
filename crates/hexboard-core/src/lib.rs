//! Hexboard Core Library
//!
//! Geometry, snapping and editing logic for a line-segment editor drawn over
//! a hexagonal bubble grid. Platform-agnostic: a UI shell feeds
//! [`InputEvent`]s into a [`Canvas`] and renders what it exposes.

pub mod camera;
pub mod canvas;
pub mod config;
pub mod export;
pub mod grouping;
pub mod input;
pub mod presets;
pub mod selection;
pub mod shapes;
pub mod snap;
pub mod storage;
pub mod store;
pub mod tools;

pub use camera::Camera;
pub use canvas::{Canvas, DragSession, PresetSession};
pub use config::{ConfigError, EditorConfig};
pub use export::{SvgOptions, to_svg};
pub use grouping::{connected_shape, segments_touch};
pub use input::{InputEvent, KeyCommand, PointerButton};
pub use presets::{PresetGenerator, PresetKind};
pub use selection::{TransformMode, TransformOptions, TransformSession};
pub use shapes::{Segment, SegmentId, point_to_segment_dist};
pub use snap::{HexLattice, ParseError, SnapMode, SnapResult, SnapTargetKind, snap_angle};
pub use storage::{Document, DocumentError, FileStorage, MemoryStorage, Storage, StorageError};
pub use store::ShapeStore;
pub use tools::{ToolKind, ToolManager, ToolState};
