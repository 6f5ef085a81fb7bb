//! Drawing canvas.
//!
//! Only the active drawer accepts pointer input. A stroke runs
//! `Idle -> Drawing -> Idle`; when it ends, the whole canvas is exported as a
//! single [`Snapshot`], which is the only thing ever sent over the wire.
//! Everyone else replaces their canvas wholesale with the snapshots they
//! receive.
//!
//! Shape tools save the raster when the stroke starts and, on every move,
//! restore it before drawing the shape from the start point to the pointer.
//! That keeps preview frames from piling up on the canvas.

mod raster;

pub use raster::{Paint, Raster, decode_snapshot};

use kurbo::Point;
use thiserror::Error;

use crate::input::PointerEvent;
use crate::model::Snapshot;
use crate::tools::{BrushSettings, ToolKind};

/// Default canvas size in pixels.
pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// Canvas errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    #[error("Invalid colour: {0}")]
    InvalidColor(String),
    #[error("Failed to encode snapshot: {0}")]
    Encode(String),
    #[error("Failed to decode snapshot: {0}")]
    Decode(String),
}

/// State of the stroke in progress.
#[derive(Debug, Clone, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    Drawing {
        /// Where the pointer went down.
        start: Point,
        /// Last pointer position seen.
        last: Point,
        /// Raster as it was when the stroke began.
        saved: Raster,
    },
}

/// A raster canvas driven by pointer input.
#[derive(Debug, Clone)]
pub struct DrawingCanvas {
    raster: Raster,
    brush: BrushSettings,
    state: StrokeState,
    is_drawer: bool,
}

impl Default for DrawingCanvas {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT, false)
    }
}

impl DrawingCanvas {
    pub fn new(width: u32, height: u32, is_drawer: bool) -> Self {
        Self {
            raster: Raster::new(width, height),
            brush: BrushSettings::default(),
            state: StrokeState::Idle,
            is_drawer,
        }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    pub fn brush_mut(&mut self) -> &mut BrushSettings {
        &mut self.brush
    }

    pub fn is_drawer(&self) -> bool {
        self.is_drawer
    }

    /// Change role. Losing the drawer role abandons any stroke in progress.
    pub fn set_drawer(&mut self, is_drawer: bool) {
        if !is_drawer {
            if let StrokeState::Drawing { saved, .. } = std::mem::take(&mut self.state) {
                self.raster = saved;
            }
        }
        self.is_drawer = is_drawer;
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }

    /// Begin a stroke. Returns false when input is not accepted.
    pub fn pointer_down(&mut self, position: Point) -> bool {
        if !self.is_drawer || self.is_drawing() {
            return false;
        }
        self.state = StrokeState::Drawing {
            start: position,
            last: position,
            saved: self.raster.clone(),
        };
        true
    }

    /// Extend the stroke. Returns false when no stroke is in progress.
    pub fn pointer_move(&mut self, position: Point) -> bool {
        let StrokeState::Drawing { start, last, saved } = &mut self.state else {
            return false;
        };
        let width = self.brush.size() as f64;
        let paint = Paint::Color(self.brush.color());

        match self.brush.tool {
            ToolKind::Brush => self.raster.stroke_segment(*last, position, width, paint),
            ToolKind::Eraser => self.raster.stroke_segment(*last, position, width, Paint::Erase),
            ToolKind::Rectangle => {
                self.raster.clone_from(saved);
                self.raster.stroke_rect(*start, position, width, paint);
            }
            ToolKind::Circle => {
                self.raster.clone_from(saved);
                let radius = (position - *start).hypot();
                self.raster.stroke_circle(*start, radius, width, paint);
            }
            ToolKind::Line => {
                self.raster.clone_from(saved);
                self.raster.stroke_segment(*start, position, width, paint);
            }
        }
        *last = position;
        true
    }

    /// Finish the stroke and export the canvas.
    ///
    /// Returns `Ok(None)` when no stroke was in progress.
    pub fn pointer_up(&mut self) -> Result<Option<Snapshot>, CanvasError> {
        if !self.is_drawing() {
            return Ok(None);
        }
        self.state = StrokeState::Idle;
        let snapshot = self.export()?;
        log::debug!("Stroke finished, snapshot {} bytes", snapshot.as_str().len());
        Ok(Some(snapshot))
    }

    /// Leaving the canvas finishes the stroke like a pointer-up.
    pub fn pointer_leave(&mut self) -> Result<Option<Snapshot>, CanvasError> {
        self.pointer_up()
    }

    /// Dispatch a canvas-local pointer event. Returns the snapshot to send,
    /// if the event finished a stroke.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Result<Option<Snapshot>, CanvasError> {
        match event {
            PointerEvent::Down { position } => {
                self.pointer_down(position);
                Ok(None)
            }
            PointerEvent::Move { position } => {
                self.pointer_move(position);
                Ok(None)
            }
            PointerEvent::Up { position } => {
                self.pointer_move(position);
                self.pointer_up()
            }
            PointerEvent::Leave => self.pointer_leave(),
        }
    }

    /// Encode the whole canvas.
    pub fn export(&self) -> Result<Snapshot, CanvasError> {
        self.raster.to_snapshot()
    }

    /// Wipe the canvas and return the blank snapshot to broadcast.
    pub fn clear(&mut self) -> Result<Snapshot, CanvasError> {
        self.state = StrokeState::Idle;
        self.raster.clear();
        self.export()
    }

    /// Replace the canvas with a snapshot from the server.
    ///
    /// The drawer's own canvas is authoritative, so this returns `Ok(false)`
    /// and leaves it untouched.
    pub fn apply_remote(&mut self, snapshot: &Snapshot) -> Result<bool, CanvasError> {
        if self.is_drawer {
            return Ok(false);
        }
        let image = decode_snapshot(snapshot)?;
        self.raster.clear();
        self.raster.draw_image(&image);
        Ok(true)
    }

    /// Resize, keeping whatever fits of the current contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.raster.width() && height == self.raster.height() {
            return;
        }
        let mut resized = Raster::new(width, height);
        resized.draw_image(self.raster.pixels());
        self.raster = resized;
        self.state = StrokeState::Idle;
    }
}
