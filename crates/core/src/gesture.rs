//! Pointer gesture tracking and swipe classification.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_SWIPE_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerId(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_from(self, origin: Point) -> Offset {
        Offset {
            dx: self.x - origin.x,
            dy: self.y - origin.y,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Skip to the next card.
    Advance,
    /// "Drink" penalty, then advance.
    Mark,
    /// Snap back, no deck change.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classification {
    pub outcome: Outcome,
    pub direction: Option<SwipeDirection>,
}

impl Classification {
    pub const CANCEL: Classification = Classification {
        outcome: Outcome::Cancel,
        direction: None,
    };

    fn swipe(outcome: Outcome, direction: SwipeDirection) -> Self {
        Self {
            outcome,
            direction: Some(direction),
        }
    }
}

/// Classifies a released drag. Horizontal wins ties between `|dx|` and `|dy|`,
/// and the threshold must be strictly exceeded.
pub fn classify(offset: Offset, threshold: f64) -> Classification {
    let Offset { dx, dy } = offset;
    if dx.abs() >= dy.abs() {
        if dx > threshold {
            Classification::swipe(Outcome::Advance, SwipeDirection::Right)
        } else if dx < -threshold {
            Classification::swipe(Outcome::Mark, SwipeDirection::Left)
        } else {
            Classification::CANCEL
        }
    } else if dy < -threshold {
        Classification::swipe(Outcome::Advance, SwipeDirection::Up)
    } else if dy > threshold {
        Classification::swipe(Outcome::Mark, SwipeDirection::Down)
    } else {
        Classification::CANCEL
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("pointer target is detached")]
    Detached,
    #[error("pointer {0:?} is not active")]
    InactivePointer(PointerId),
    #[error("capture failed: {0}")]
    Other(String),
}

/// Routes a pointer's events to the card for the length of a drag.
pub trait PointerCapture {
    fn capture(&mut self, pointer: PointerId) -> Result<(), CaptureError>;
    fn release(&mut self, pointer: PointerId) -> Result<(), CaptureError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn capture(&mut self, _pointer: PointerId) -> Result<(), CaptureError> {
        Ok(())
    }

    fn release(&mut self, _pointer: PointerId) -> Result<(), CaptureError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSession {
    pub pointer: PointerId,
    pub origin: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePhase {
    Idle,
    Dragging(GestureSession),
    Releasing(Classification),
}

#[derive(Debug, Clone)]
pub struct GestureMachine {
    phase: GesturePhase,
    offset: Offset,
    pending_move: Option<Point>,
    threshold: f64,
}

impl Default for GestureMachine {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

impl GestureMachine {
    pub fn new(threshold: f64) -> Self {
        Self {
            phase: GesturePhase::Idle,
            offset: Offset::ZERO,
            pending_move: None,
            threshold,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, GesturePhase::Dragging(_))
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, GesturePhase::Releasing(_))
    }

    pub fn has_pending_move(&self) -> bool {
        self.pending_move.is_some()
    }

    /// Starts a drag. Returns false when a drag or release is already in progress.
    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        point: Point,
        capture: &mut dyn PointerCapture,
    ) -> bool {
        if self.phase != GesturePhase::Idle {
            return false;
        }
        if let Err(err) = capture.capture(pointer) {
            debug!(?pointer, %err, "pointer capture failed");
        }
        self.phase = GesturePhase::Dragging(GestureSession {
            pointer,
            origin: point,
        });
        self.offset = Offset::ZERO;
        self.pending_move = None;
        true
    }

    /// Stores the latest point for the next frame. Returns true when accepted.
    pub fn pointer_move(&mut self, pointer: PointerId, point: Point) -> bool {
        match self.phase {
            GesturePhase::Dragging(session) if session.pointer == pointer => {
                self.pending_move = Some(point);
                true
            }
            _ => false,
        }
    }

    /// Applies the coalesced move, if any. Returns true when the offset changed.
    pub fn flush_frame(&mut self) -> bool {
        let GesturePhase::Dragging(session) = self.phase else {
            self.pending_move = None;
            return false;
        };
        match self.pending_move.take() {
            Some(point) => {
                self.offset = point.offset_from(session.origin);
                true
            }
            None => false,
        }
    }

    pub fn pointer_up(
        &mut self,
        pointer: PointerId,
        capture: &mut dyn PointerCapture,
    ) -> Option<Classification> {
        self.finish(pointer, capture)
    }

    pub fn pointer_cancel(
        &mut self,
        pointer: PointerId,
        capture: &mut dyn PointerCapture,
    ) -> Option<Classification> {
        self.finish(pointer, capture)
    }

    /// Moves the card to its animation target while releasing.
    pub fn fling_to(&mut self, offset: Offset) {
        if self.is_animating() {
            self.offset = offset;
        }
    }

    /// Ends the release animation and returns to idle.
    pub fn settle(&mut self) {
        if self.is_animating() {
            self.phase = GesturePhase::Idle;
            self.offset = Offset::ZERO;
        }
    }

    /// Drops any session, releasing capture still held by a drag.
    pub fn teardown(&mut self, capture: &mut dyn PointerCapture) {
        if let GesturePhase::Dragging(session) = self.phase {
            release(capture, session.pointer);
        }
        self.phase = GesturePhase::Idle;
        self.offset = Offset::ZERO;
        self.pending_move = None;
    }

    fn finish(
        &mut self,
        pointer: PointerId,
        capture: &mut dyn PointerCapture,
    ) -> Option<Classification> {
        let GesturePhase::Dragging(session) = self.phase else {
            return None;
        };
        if session.pointer != pointer {
            return None;
        }
        self.flush_frame();
        release(capture, session.pointer);
        let classification = classify(self.offset, self.threshold);
        self.phase = GesturePhase::Releasing(classification);
        Some(classification)
    }
}

fn release(capture: &mut dyn PointerCapture, pointer: PointerId) {
    if let Err(err) = capture.release(pointer) {
        debug!(?pointer, %err, "pointer release failed");
    }
}
