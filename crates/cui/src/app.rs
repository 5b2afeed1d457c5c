use crate::input::{map_mouse, MouseCapture, PointerInput, CELL_HEIGHT, CELL_WIDTH, MOUSE_POINTER};
use crate::persistence::FileStorage;
use crate::view;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::layout::Rect;
use sipdeck_core::{
    CategoryId, DeckConfig, DeckController, Event, Outcome, PreferenceStore, RngState, Roster,
    Viewport, ROSTER_KEY,
};
use sipdeck_data::{embedded_cards, load_cards, CardLoadReport};
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

const MAX_EVENT_LOG: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Roster,
    Play,
}

pub struct App {
    pub screen: Screen,
    pub seed: u64,
    pub controller: DeckController,
    pub prefs: PreferenceStore<FileStorage>,
    pub roster: Roster,
    pub roster_cursor: usize,
    pub show_filters: bool,
    pub filter_cursor: usize,
    pub show_help: bool,
    pub event_log: VecDeque<String>,
    pub status_line: String,
    pub should_quit: bool,
    pub area: Rect,
}

fn load_card_source(path: Option<&Path>) -> Result<CardLoadReport> {
    match path {
        Some(path) => load_cards(path),
        None => embedded_cards(),
    }
}

impl App {
    pub fn bootstrap(
        config: DeckConfig,
        seed: Option<u64>,
        cards: Option<&Path>,
        storage: FileStorage,
    ) -> Self {
        let rng = seed.map_or_else(RngState::from_entropy, RngState::from_seed);
        let seed = rng.seed();
        let mut controller = DeckController::new(config, rng);
        controller.set_pointer_target(Box::new(MouseCapture::default()));

        let mut app = Self {
            screen: Screen::Roster,
            seed,
            controller,
            prefs: PreferenceStore::new(storage),
            roster: Roster::default(),
            roster_cursor: 0,
            show_filters: false,
            filter_cursor: 0,
            show_help: false,
            event_log: VecDeque::new(),
            status_line: "ready".to_string(),
            should_quit: false,
            area: Rect::default(),
        };

        if let Some(filters) = app.prefs.load_filters() {
            app.controller.replace_filters(filters);
        }
        match load_card_source(cards) {
            Ok(report) => {
                info!(cards = report.cards.len(), seed, "cards loaded");
                for warning in &report.warnings {
                    app.push_event_line(format!("warning: {warning}"));
                }
                app.controller.set_cards(report.cards);
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "failed to load cards");
                app.push_status(format!("card load failed: {err:#}"));
            }
        }
        if let Some(names) = app.prefs.load_roster() {
            app.roster = Roster::from_stored(names);
        }

        app.flush_events();
        app
    }

    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.area = Rect::new(0, 0, width, height);
        let stage = view::play_layout(self.area).stage;
        self.controller.set_viewport(Viewport {
            width: f64::from(stage.width) * CELL_WIDTH,
            height: f64::from(stage.height) * CELL_HEIGHT,
        });
    }

    pub fn on_tick(&mut self, now: Duration) {
        self.controller.frame(now);
        self.controller.tick(now);
        self.flush_events();
    }

    pub fn shutdown(&mut self) {
        self.controller.teardown();
        self.flush_events();
    }

    /// Consumes keys while the roster screen is shown.
    pub fn handle_roster_key(&mut self, key: KeyEvent) -> bool {
        if self.screen != Screen::Roster {
            return false;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('n') if ctrl => {
                self.roster_cursor = self.roster.add_player();
                self.save_roster();
            }
            KeyCode::Char('d') if ctrl => {
                if self.roster.remove_player(self.roster_cursor) {
                    self.roster_cursor = self.roster_cursor.min(self.roster.len() - 1);
                    self.save_roster();
                } else {
                    self.push_status("at least two players are needed");
                }
            }
            KeyCode::Char('x') if ctrl => self.start_without_players(),
            KeyCode::Enter => self.start_game(),
            KeyCode::Up => move_index(&mut self.roster_cursor, self.roster.len(), false),
            KeyCode::Down | KeyCode::Tab => {
                move_index(&mut self.roster_cursor, self.roster.len(), true)
            }
            KeyCode::Backspace => {
                if let Some(name) = self.roster.name_mut(self.roster_cursor) {
                    if name.pop().is_some() {
                        self.save_roster();
                    }
                }
            }
            KeyCode::Char(ch) => {
                if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) {
                    if let Some(name) = self.roster.name_mut(self.roster_cursor) {
                        name.push(ch);
                        self.save_roster();
                    }
                }
            }
            _ => {}
        }
        true
    }

    pub fn start_game(&mut self) {
        if !self.roster.can_start() {
            self.push_status("enter at least two player names");
            return;
        }
        self.save_roster();
        let players = self.roster.filled_count();
        self.controller.set_player_limit(u32::try_from(players).ok());
        self.screen = Screen::Play;
        self.push_status(format!("{players} players ready"));
        self.flush_events();
    }

    pub fn start_without_players(&mut self) {
        self.prefs.clear(ROSTER_KEY);
        self.roster = Roster::default();
        self.roster_cursor = 0;
        self.controller.set_player_limit(None);
        self.screen = Screen::Play;
        self.push_status("playing without a roster");
        self.flush_events();
    }

    /// Leaves the play screen. A drag or release in flight is dropped, not resolved.
    pub fn edit_roster(&mut self) {
        if !self.controller.is_idle() {
            self.controller.teardown();
        }
        self.show_filters = false;
        self.screen = Screen::Roster;
        self.flush_events();
    }

    pub fn toggle_filters(&mut self) {
        self.show_filters = !self.show_filters;
    }

    pub fn move_filter_cursor(&mut self, down: bool) {
        if self.show_filters {
            let len = self.controller.categories().entries().len();
            move_index(&mut self.filter_cursor, len, down);
        }
    }

    pub fn toggle_focused_category(&mut self) {
        if !self.show_filters {
            return;
        }
        let Some(category) = self
            .controller
            .categories()
            .entries()
            .get(self.filter_cursor)
        else {
            return;
        };
        let selected = self.controller.toggle_category(category.id);
        if !self.prefs.save_filters(self.controller.filters()) {
            self.push_status("filters could not be saved");
        } else {
            let state = if selected { "on" } else { "off" };
            self.push_status(format!("{} {state}", category.name));
        }
        self.flush_events();
    }

    /// Esc closes the topmost overlay, then falls through to the feedback overlay.
    pub fn dismiss(&mut self, now: Duration) {
        if self.show_help {
            self.show_help = false;
        } else if self.show_filters {
            self.show_filters = false;
        } else if self.controller.dismiss_feedback(now) {
            self.flush_events();
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent, now: Duration) {
        if self.screen != Screen::Play {
            return;
        }
        let Some(input) = map_mouse(event) else {
            return;
        };
        match input {
            PointerInput::Down { column, row, point } => {
                if self.show_filters || self.show_help {
                    return;
                }
                // A press during a drag means the previous release never arrived.
                self.controller.abort_gesture();
                let card = view::card_rect(view::play_layout(self.area).stage);
                if contains(card, column, row) {
                    self.controller.pointer_down(MOUSE_POINTER, point, now);
                }
            }
            PointerInput::Move(point) => {
                if self.controller.is_dragging() {
                    self.controller.pointer_move(MOUSE_POINTER, point);
                }
            }
            PointerInput::Up(point) => {
                if self.controller.is_dragging() {
                    self.controller.pointer_move(MOUSE_POINTER, point);
                    self.controller.pointer_up(MOUSE_POINTER, now);
                }
            }
        }
        self.flush_events();
    }

    pub fn is_filter_selected(&self, id: CategoryId) -> bool {
        self.controller.filters().is_selected(id)
    }

    pub fn push_status(&mut self, value: impl Into<String>) {
        self.status_line = value.into();
    }

    fn save_roster(&mut self) {
        if !self.prefs.save_roster(self.roster.names()) {
            self.push_status("roster could not be saved");
        }
    }

    fn flush_events(&mut self) {
        let drained: Vec<_> = self.controller.drain_events().collect();
        for event in drained {
            self.push_event_line(format_event(&event));
        }
    }

    fn push_event_line(&mut self, line: String) {
        if self.event_log.len() >= MAX_EVENT_LOG {
            let _ = self.event_log.pop_front();
        }
        self.event_log.push_back(line);
    }
}

fn move_index(value: &mut usize, len: usize, down: bool) {
    if len == 0 {
        *value = 0;
        return;
    }
    if down {
        *value = (*value + 1) % len;
    } else if *value == 0 {
        *value = len - 1;
    } else {
        *value -= 1;
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Advance => "advance",
        Outcome::Mark => "drink",
        Outcome::Cancel => "cancel",
    }
}

fn format_event(event: &Event) -> String {
    match event {
        Event::DeckRebuilt { cards } => format!("deck shuffled: {cards} cards"),
        Event::FilterChanged { category, selected } => {
            let state = if *selected { "on" } else { "off" };
            format!("filter {category} {state}")
        }
        Event::GestureStarted => "drag".to_string(),
        Event::GestureAborted => "drag dropped".to_string(),
        Event::GestureResolved {
            outcome,
            direction,
            dx,
            dy,
        } => match direction {
            Some(direction) => format!(
                "swipe {direction:?} -> {} ({dx:.0}, {dy:.0})",
                outcome_label(*outcome)
            ),
            None => format!("released -> {} ({dx:.0}, {dy:.0})", outcome_label(*outcome)),
        },
        Event::SwipeOnEmptyDeck { outcome } => {
            format!("no card to {}", outcome_label(*outcome))
        }
        Event::CardAdvanced { card_id, position } => match (card_id, position) {
            (Some(id), Some(position)) => format!("next card #{} {id}", position + 1),
            _ => "next card: none".to_string(),
        },
        Event::FeedbackShown => "DRINK!".to_string(),
        Event::FeedbackCleared { dismissed } => {
            if *dismissed {
                "drink dismissed".to_string()
            } else {
                "drink done".to_string()
            }
        }
        Event::TornDown { cancelled_timers } => {
            format!("stopped ({cancelled_timers} timers cancelled)")
        }
    }
}
