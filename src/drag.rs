use crate::geometry::{OverlayPosition, Point};

pub const PRIMARY_BUTTON: u16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        pointer_start: Point,
        origin: OverlayPosition,
    },
}

/// Pointer-driven move of one overlay. Move and release events reach every
/// controller on the page, so everything except `press` is a no-op unless
/// this controller started the drag.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Start dragging from `current`. Only the primary button starts a drag.
    pub fn press(&mut self, button: u16, pointer: Point, current: OverlayPosition) -> bool {
        if button != PRIMARY_BUTTON || self.is_dragging() {
            return false;
        }
        self.state = DragState::Dragging {
            pointer_start: pointer,
            origin: current,
        };
        true
    }

    /// Position that follows the pointer 1:1 from the drag origin.
    pub fn drag_to(&self, pointer: Point) -> Option<OverlayPosition> {
        let DragState::Dragging {
            pointer_start,
            origin,
        } = self.state
        else {
            return None;
        };
        Some(OverlayPosition {
            top: origin.top + (pointer.y - pointer_start.y),
            left: origin.left + (pointer.x - pointer_start.x),
        })
    }

    /// Returns `true` if a drag was in progress.
    pub fn release(&mut self) -> bool {
        std::mem::take(&mut self.state) != DragState::Idle
    }
}
