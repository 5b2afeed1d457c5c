use crate::app::App;
use crate::input::InputAction;
use std::time::Duration;

pub fn dispatch(app: &mut App, action: InputAction, now: Duration) {
    match action {
        InputAction::None => {}
        InputAction::Quit => app.should_quit = true,
        InputAction::ToggleHelp => app.show_help = !app.show_help,
        InputAction::ToggleFilters => app.toggle_filters(),
        InputAction::MoveUp => app.move_filter_cursor(false),
        InputAction::MoveDown => app.move_filter_cursor(true),
        InputAction::ToggleCategory => app.toggle_focused_category(),
        InputAction::Dismiss => app.dismiss(now),
        InputAction::EditRoster => app.edit_roster(),
    }
}
