//! Editor state and event handling.
//!
//! [`Canvas`] owns everything the editor knows: view, lattice, segments,
//! selection and the active drag. All mutation goes through its methods so
//! the selection never refers to a segment that has been removed.

use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::export::{SvgOptions, to_svg};
use crate::grouping::connected_shape;
use crate::input::{InputEvent, KeyCommand, PointerButton};
use crate::presets::{PresetGenerator, PresetKind};
use crate::selection::{TransformMode, TransformOptions, TransformSession};
use crate::shapes::{Segment, SegmentId};
use crate::snap::{HexLattice, ParseError, SnapMode};
use crate::storage::{Document, DocumentError};
use crate::store::ShapeStore;
use crate::tools::{ToolKind, ToolManager};
use kurbo::{Point, Vec2};

/// Screen padding used when fitting the view to the drawing.
const FIT_PADDING: f64 = 50.0;
/// Preset scale for a click without a drag.
pub const DEFAULT_PRESET_SCALE: f64 = 1.0;
/// Smallest preset scale a drag can produce.
pub const MIN_PRESET_SCALE: f64 = 0.25;

/// A preset being placed: pointer down fixes the centre, dragging sets the
/// scale, release commits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetSession {
    pub kind: PresetKind,
    /// Snapped world centre.
    pub center: Point,
    pub scale: f64,
}

impl PresetSession {
    pub fn new(kind: PresetKind, center: Point) -> Self {
        Self {
            kind,
            center,
            scale: DEFAULT_PRESET_SCALE,
        }
    }

    /// Scale so the drag distance equals `base_radius * scale`.
    pub fn drag_to(&mut self, world: Point, base_radius: f64) {
        let radius = if base_radius > 0.0 { base_radius } else { 1.0 };
        self.scale = (self.center.distance(world) / radius).max(MIN_PRESET_SCALE);
    }
}

/// What the held pointer button is doing.
#[derive(Debug, Clone)]
pub enum DragSession {
    /// Panning; the offset is recomputed from the drag start on every move.
    Pan { start_screen: Point, start_offset: Vec2 },
    Transform(TransformSession),
    Preset(PresetSession),
}

/// The editor.
#[derive(Debug, Clone)]
pub struct Canvas {
    config: EditorConfig,
    camera: Camera,
    lattice: HexLattice,
    presets: PresetGenerator,
    /// Current tool, pending line start and colour.
    tool_manager: ToolManager,
    snap_mode: SnapMode,
    rotate_snap: bool,
    transform_mode: TransformMode,
    store: ShapeStore,
    selection: Vec<SegmentId>,
    session: Option<DragSession>,
    /// Snapped world position of the pointer.
    cursor: Option<Point>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create an empty editor with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let mut tool_manager = ToolManager::new();
        tool_manager.current_color = config.default_color.clone();
        Self {
            camera: Camera::with_zoom_range(config.zoom_min, config.zoom_max),
            lattice: config.lattice(),
            presets: config.preset_generator(),
            tool_manager,
            snap_mode: config.snap_mode,
            rotate_snap: false,
            transform_mode: TransformMode::default(),
            store: ShapeStore::new(),
            selection: Vec::new(),
            session: None,
            cursor: None,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lattice(&self) -> &HexLattice {
        &self.lattice
    }

    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    /// Selected segment ids. Every id is present in the store.
    pub fn selection(&self) -> &[SegmentId] {
        &self.selection
    }

    pub fn is_selected(&self, id: SegmentId) -> bool {
        self.selection.contains(&id)
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Snapped world position of the pointer, for the cursor dot.
    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    pub fn snap_mode(&self) -> SnapMode {
        self.snap_mode
    }

    pub fn rotate_snap(&self) -> bool {
        self.rotate_snap
    }

    pub fn transform_mode(&self) -> TransformMode {
        self.transform_mode
    }

    pub fn current_tool(&self) -> ToolKind {
        self.tool_manager.current_tool
    }

    /// Snapped start of the line being drawn, if the first click happened.
    pub fn pending_line_start(&self) -> Option<Point> {
        self.tool_manager.pending_line_start()
    }

    pub fn current_color(&self) -> &str {
        &self.tool_manager.current_color
    }

    // --- Setters ---

    /// Set the current tool. A pending line is dropped.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool_manager.set_tool(tool);
    }

    pub fn set_tool_by_name(&mut self, name: &str) -> Result<(), ParseError> {
        let tool = name.parse()?;
        self.set_tool(tool);
        Ok(())
    }

    pub fn set_transform_mode(&mut self, mode: TransformMode) {
        self.transform_mode = mode;
    }

    pub fn set_transform_mode_by_name(&mut self, name: &str) -> Result<(), ParseError> {
        self.transform_mode = name.parse()?;
        Ok(())
    }

    pub fn set_snap_mode(&mut self, mode: SnapMode) {
        self.snap_mode = mode;
    }

    pub fn set_snap_mode_by_name(&mut self, name: &str) -> Result<(), ParseError> {
        self.snap_mode = name.parse()?;
        Ok(())
    }

    pub fn cycle_snap_mode(&mut self) -> SnapMode {
        self.snap_mode = self.snap_mode.next();
        self.snap_mode
    }

    pub fn set_rotate_snap(&mut self, enabled: bool) {
        self.rotate_snap = enabled;
    }

    pub fn toggle_rotate_snap(&mut self) -> bool {
        self.rotate_snap = !self.rotate_snap;
        self.rotate_snap
    }

    /// Colour for segments created from now on.
    pub fn set_color(&mut self, color: impl Into<String>) {
        self.tool_manager.current_color = color.into();
    }

    // --- View ---

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.camera.set_viewport_size(width, height);
    }

    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        self.camera.zoom_at(screen, factor);
    }

    pub fn reset_view(&mut self) {
        self.camera.reset();
    }

    /// Fit the view to show all segments.
    pub fn fit_to_content(&mut self) {
        if let Some(bounds) = self.store.bounds() {
            self.camera.fit_to_bounds(bounds, FIT_PADDING);
        }
    }

    /// Snap a world point with the current snap mode.
    pub fn snap_point(&self, world: Point) -> Point {
        self.lattice.snap(world, self.snap_mode).point
    }

    /// Hit tolerance in world units at the current zoom.
    pub fn hit_tolerance(&self) -> f64 {
        self.camera.world_tolerance(self.config.hit_tolerance_px)
    }

    pub fn transform_options(&self) -> TransformOptions {
        self.config.transform_options(self.snap_mode, self.rotate_snap)
    }

    // --- Shapes ---

    /// Add a segment in the current colour.
    pub fn add_segment(&mut self, a: Point, b: Point) -> SegmentId {
        let segment = Segment::new(a, b, self.tool_manager.current_color.clone());
        self.store.insert(segment)
    }

    /// Remove a segment by id.
    pub fn remove_segment(&mut self, id: SegmentId) -> Option<Segment> {
        let removed = self.store.remove(id);
        self.prune_selection();
        removed
    }

    /// Remove the segment at a draw-order position.
    pub fn remove_at(&mut self, index: usize) -> Option<Segment> {
        let removed = self.store.remove_at(index);
        self.prune_selection();
        removed
    }

    /// Remove every segment and drop the selection and any drag.
    pub fn clear(&mut self) {
        self.store.clear();
        self.selection.clear();
        self.session = None;
        self.tool_manager.cancel();
    }

    /// Place a preset, snapping its vertices with the current snap mode.
    ///
    /// Edges that collapse or repeat once snapped are not stored, so a small
    /// preset may add fewer segments than its kind normally has.
    pub fn place_preset(&mut self, kind: PresetKind, center: Point, scale: f64) -> Vec<SegmentId> {
        let segments = self.preset_segments(kind, center, scale);
        log::debug!("Placing {} at {:?} (scale {:.2})", kind, center, scale);
        self.store.extend(segments)
    }

    fn preset_segments(&self, kind: PresetKind, center: Point, scale: f64) -> Vec<Segment> {
        let lattice = self.lattice;
        let mode = self.snap_mode;
        self.presets
            .generate(kind, center, scale, &self.tool_manager.current_color, |p| {
                lattice.snap(p, mode).point
            })
    }

    /// Erase the segment under a world point.
    pub fn erase_at(&mut self, world: Point) -> Option<Segment> {
        let hit = self.store.hit_test(world, self.hit_tolerance())?;
        self.remove_segment(hit)
    }

    // --- Selection ---

    /// Select the shape under a world point.
    ///
    /// With `additive` the shape joins the selection. Without it, clicking a
    /// segment that is already selected keeps the whole selection, and
    /// clicking empty space clears it. Returns whether anything was hit.
    pub fn select_at(&mut self, world: Point, additive: bool) -> bool {
        let Some(hit) = self.store.hit_test(world, self.hit_tolerance()) else {
            if !additive {
                self.selection.clear();
            }
            return false;
        };

        if additive {
            for id in connected_shape(&self.store, hit) {
                if !self.selection.contains(&id) {
                    self.selection.push(id);
                }
            }
        } else if !self.selection.contains(&hit) {
            self.selection = connected_shape(&self.store, hit);
        }
        true
    }

    /// Replace the selection. Unknown ids are ignored.
    pub fn select(&mut self, ids: &[SegmentId]) {
        self.selection.clear();
        for &id in ids {
            if self.store.contains(id) && !self.selection.contains(&id) {
                self.selection.push(id);
            }
        }
    }

    pub fn select_all(&mut self) {
        self.selection = self.store.ids().to_vec();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Delete the selected segments, returning how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let removed = self
            .selection
            .drain(..)
            .filter_map(|id| self.store.remove(id))
            .count();
        if removed > 0 {
            log::debug!("Deleted {} segments", removed);
        }
        removed
    }

    fn prune_selection(&mut self) {
        let store = &self.store;
        self.selection.retain(|&id| store.contains(id));
    }

    // --- Events ---

    /// Dispatch a single input event.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { button, position, shift } => self.pointer_down(button, position, shift),
            InputEvent::PointerMove { position } => self.pointer_move(position),
            InputEvent::PointerUp | InputEvent::PointerLeave => self.pointer_up(),
            InputEvent::Wheel { delta_y, position } => self.wheel(delta_y, position),
            InputEvent::KeyDown(key) => self.key_down(&key),
        }
    }

    /// Pointer pressed at a screen position.
    pub fn pointer_down(&mut self, button: PointerButton, screen: Point, shift: bool) {
        let world = self.camera.screen_to_world(screen);
        self.cursor = Some(self.snap_point(world));

        if button != PointerButton::Primary {
            self.begin_pan(screen);
            return;
        }

        match self.tool_manager.current_tool {
            ToolKind::Line => {
                let point = self.snap_point(world);
                if let Some((a, b)) = self.tool_manager.line_click(point) {
                    self.add_segment(a, b);
                }
            }
            ToolKind::Select => {
                if self.select_at(world, shift) {
                    self.begin_transform(world);
                }
            }
            ToolKind::Erase => {
                self.erase_at(world);
            }
            ToolKind::Pan => self.begin_pan(screen),
            ToolKind::Preset(kind) => {
                let center = self.snap_point(world);
                self.session = Some(DragSession::Preset(PresetSession::new(kind, center)));
            }
        }
    }

    /// Pointer moved to a screen position.
    pub fn pointer_move(&mut self, screen: Point) {
        let world = self.camera.screen_to_world(screen);
        let options = self.transform_options();
        let base_radius = self.presets.base_radius;

        match &mut self.session {
            Some(DragSession::Pan { start_screen, start_offset }) => {
                self.camera.pan_to(*start_offset + (screen - *start_screen));
            }
            Some(DragSession::Transform(session)) => session.update(&mut self.store, world, &options),
            Some(DragSession::Preset(session)) => session.drag_to(world, base_radius),
            None => {}
        }

        let world = self.camera.screen_to_world(screen);
        self.cursor = Some(self.snap_point(world));
    }

    /// Pointer released or left the canvas: commit a preset, end any drag.
    pub fn pointer_up(&mut self) {
        match self.session.take() {
            Some(DragSession::Preset(session)) => {
                self.place_preset(session.kind, session.center, session.scale);
            }
            Some(DragSession::Transform(session)) => {
                log::debug!("{} session ended, delta {:?}", session.mode, session.delta());
            }
            Some(DragSession::Pan { .. }) | None => {}
        }
    }

    pub fn wheel(&mut self, delta_y: f64, screen: Point) {
        let factor = Camera::wheel_factor(delta_y, self.config.wheel_sensitivity);
        self.camera.zoom_at(screen, factor);
    }

    pub fn key_down(&mut self, key: &str) {
        let Some(command) = KeyCommand::from_key(key) else {
            return;
        };
        match command {
            KeyCommand::Delete => {
                self.delete_selected();
            }
            KeyCommand::Cancel => self.cancel(),
            KeyCommand::ToggleRotateSnap => {
                self.toggle_rotate_snap();
            }
            KeyCommand::CycleSnapMode => {
                self.cycle_snap_mode();
            }
            KeyCommand::CycleTransformMode => self.transform_mode = self.transform_mode.next(),
            KeyCommand::ResetView => self.camera.reset(),
        }
    }

    /// Drop the pending line and stop the current drag. A transform keeps
    /// whatever it last applied.
    pub fn cancel(&mut self) {
        self.tool_manager.cancel();
        self.session = None;
    }

    fn begin_pan(&mut self, screen: Point) {
        self.session = Some(DragSession::Pan {
            start_screen: screen,
            start_offset: self.camera.offset,
        });
    }

    fn begin_transform(&mut self, world: Point) {
        self.session = TransformSession::begin(&self.store, &self.selection, self.transform_mode, world)
            .map(DragSession::Transform);
    }

    /// Segments to draw on top of the store: the rubber-band line and the
    /// preset being placed.
    pub fn preview_segments(&self) -> Vec<Segment> {
        let color = &self.tool_manager.current_color;
        let mut preview = Vec::new();
        if let Some((start, end)) = self.cursor.and_then(|cursor| self.tool_manager.preview_line(cursor)) {
            preview.push(Segment::new(start, end, color.as_str()));
        }
        if let Some(DragSession::Preset(session)) = &self.session {
            preview.extend(self.preset_segments(session.kind, session.center, session.scale));
        }
        preview
    }

    // --- Persistence ---

    /// Replace the drawing with a JSON document.
    ///
    /// On error nothing changes. Returns the number of segments loaded.
    pub fn load_document(&mut self, json: &str) -> Result<usize, DocumentError> {
        let document = Document::from_json(json).inspect_err(|e| log::warn!("Rejected document: {}", e))?;
        Ok(self.apply_document(document))
    }

    /// Replace the drawing with an already-validated document.
    pub fn apply_document(&mut self, document: Document) -> usize {
        let count = self.store.replace_all(document.segments()).len();
        if let Some(mode) = document.snap_mode {
            self.snap_mode = mode;
        }
        self.selection.clear();
        self.session = None;
        self.tool_manager.cancel();
        log::info!("Loaded document with {} lines", count);
        count
    }

    pub fn to_document(&self) -> Document {
        Document::from_store(&self.store, Some(self.snap_mode))
    }

    /// Render the current view as SVG.
    pub fn export_svg(&self, options: &SvgOptions) -> String {
        to_svg(&self.store, &self.camera, options)
    }
}
