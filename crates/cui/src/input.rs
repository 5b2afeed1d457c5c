use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use sipdeck_core::{CaptureError, Point, PointerCapture, PointerId};
use std::cell::Cell;
use std::rc::Rc;

/// Pointer units per terminal column and row.
pub const CELL_WIDTH: f64 = 8.0;
pub const CELL_HEIGHT: f64 = 16.0;

pub const MOUSE_POINTER: PointerId = PointerId(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    ToggleHelp,
    ToggleFilters,
    MoveUp,
    MoveDown,
    ToggleCategory,
    Dismiss,
    EditRoster,
}

pub fn map_key(key: KeyEvent) -> InputAction {
    match key.code {
        KeyCode::Esc => InputAction::Dismiss,
        KeyCode::Up | KeyCode::Char('k') => InputAction::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => InputAction::MoveDown,
        KeyCode::Enter | KeyCode::Char(' ') => InputAction::ToggleCategory,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => InputAction::Quit,
        KeyCode::Char('q') => InputAction::Quit,
        KeyCode::Char('?') => InputAction::ToggleHelp,
        KeyCode::Char('f') => InputAction::ToggleFilters,
        KeyCode::Char('p') => InputAction::EditRoster,
        _ => InputAction::None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down { column: u16, row: u16, point: Point },
    Move(Point),
    Up(Point),
}

pub fn cell_to_point(column: u16, row: u16) -> Point {
    Point::new(f64::from(column) * CELL_WIDTH, f64::from(row) * CELL_HEIGHT)
}

/// Left-button mouse events as pointer input; everything else is ignored.
pub fn map_mouse(event: MouseEvent) -> Option<PointerInput> {
    let point = cell_to_point(event.column, event.row);
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(PointerInput::Down {
            column: event.column,
            row: event.row,
            point,
        }),
        MouseEventKind::Drag(MouseButton::Left) => Some(PointerInput::Move(point)),
        MouseEventKind::Up(MouseButton::Left) => Some(PointerInput::Up(point)),
        _ => None,
    }
}

/// Terminal mouse capture. The terminal reports every mouse event, so
/// capture only records which pointer owns the drag.
#[derive(Debug, Clone, Default)]
pub struct MouseCapture {
    held: Rc<Cell<Option<PointerId>>>,
}

impl PointerCapture for MouseCapture {
    fn capture(&mut self, pointer: PointerId) -> Result<(), CaptureError> {
        match self.held.get() {
            Some(other) if other != pointer => {
                Err(CaptureError::Other(format!("{other:?} already captured")))
            }
            _ => {
                self.held.set(Some(pointer));
                Ok(())
            }
        }
    }

    fn release(&mut self, pointer: PointerId) -> Result<(), CaptureError> {
        if self.held.get() != Some(pointer) {
            return Err(CaptureError::InactivePointer(pointer));
        }
        self.held.set(None);
        Ok(())
    }
}
