//! Pointer input for the drawing canvas.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Pointer event in client (window) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    /// Pointer left the canvas element.
    Leave,
}

impl PointerEvent {
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position } => Some(*position),
            PointerEvent::Leave => None,
        }
    }

    /// Translate into canvas-local coordinates given the canvas' top-left
    /// corner in client space.
    pub fn to_canvas(self, origin: Point) -> Self {
        let offset = Vec2::new(origin.x, origin.y);
        match self {
            PointerEvent::Down { position } => PointerEvent::Down { position: position - offset },
            PointerEvent::Move { position } => PointerEvent::Move { position: position - offset },
            PointerEvent::Up { position } => PointerEvent::Up { position: position - offset },
            PointerEvent::Leave => PointerEvent::Leave,
        }
    }
}
