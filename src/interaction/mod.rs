use serde::{Deserialize, Serialize};

use crate::core::types::Point;

/// Normalized pointer event kinds fed in by the host's rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
}

/// Backend-agnostic pointer event shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub point: Point,
}

impl PointerEvent {
    #[must_use]
    pub fn down(x: f64, y: f64) -> Self {
        Self {
            kind: PointerEventKind::Down,
            point: Point::new(x, y),
        }
    }

    #[must_use]
    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            kind: PointerEventKind::Move,
            point: Point::new(x, y),
        }
    }

    #[must_use]
    pub fn up(x: f64, y: f64) -> Self {
        Self {
            kind: PointerEventKind::Up,
            point: Point::new(x, y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GesturePhase {
    Idle,
    Down,
    Dragging,
}

/// Semantic action produced by a gesture transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureAction {
    DragStart { origin: Point },
    DragMove { delta: Point, total: Point },
    DragEnd { point: Point },
    Click { point: Point },
}

/// Explicit per-sprite gesture state machine: `Idle → Down → Dragging → Idle`.
///
/// Pointer sequences are short-lived transitions on this state, never a
/// blocking loop; the owning root routes global move/up events to the node
/// that captured the pointer on down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureState {
    phase: GesturePhase,
    down: Point,
    last: Point,
    drag_threshold: f64,
}

impl GestureState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: GesturePhase::Idle,
            down: Point::ZERO,
            last: Point::ZERO,
            drag_threshold: 3.0,
        }
    }

    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn set_drag_threshold(&mut self, threshold: f64) {
        self.drag_threshold = threshold.max(0.0);
    }

    pub fn on_event(&mut self, event: PointerEvent) -> Option<GestureAction> {
        match (self.phase, event.kind) {
            (_, PointerEventKind::Down) => {
                self.phase = GesturePhase::Down;
                self.down = event.point;
                self.last = event.point;
                None
            }
            (GesturePhase::Down, PointerEventKind::Move) => {
                let total_x = event.point.x - self.down.x;
                let total_y = event.point.y - self.down.y;
                self.last = event.point;
                if total_x.hypot(total_y) >= self.drag_threshold {
                    self.phase = GesturePhase::Dragging;
                    return Some(GestureAction::DragStart { origin: self.down });
                }
                None
            }
            (GesturePhase::Dragging, PointerEventKind::Move) => {
                let delta = Point::new(event.point.x - self.last.x, event.point.y - self.last.y);
                let total = Point::new(event.point.x - self.down.x, event.point.y - self.down.y);
                self.last = event.point;
                Some(GestureAction::DragMove { delta, total })
            }
            (GesturePhase::Down, PointerEventKind::Up) => {
                self.phase = GesturePhase::Idle;
                Some(GestureAction::Click { point: event.point })
            }
            (GesturePhase::Dragging, PointerEventKind::Up) => {
                self.phase = GesturePhase::Idle;
                Some(GestureAction::DragEnd { point: event.point })
            }
            (GesturePhase::Idle, _) => None,
        }
    }
}

impl Default for GestureState {
    fn default() -> Self {
        Self::new()
    }
}
