use crate::app::{App, Screen};
use crate::input::{CELL_HEIGHT, CELL_WIDTH};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Line, Modifier, Span, Style, Stylize};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use sipdeck_core::{Card, Category, Offset, MIN_PLAYERS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayLayout {
    pub header: Rect,
    pub stage: Rect,
    pub events: Rect,
}

pub fn play_layout(area: Rect) -> PlayLayout {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(7),
        ])
        .split(area);
    PlayLayout {
        header: root[0],
        stage: root[1],
        events: root[2],
    }
}

/// Resting position of the card inside the stage.
pub fn card_rect(stage: Rect) -> Rect {
    centered_rect(50, 70, stage)
}

/// Moves `rect` by a pointer offset and clips it to `bounds`.
pub fn offset_rect(rect: Rect, offset: Offset, bounds: Rect) -> Rect {
    let x = i32::from(rect.x) + (offset.dx / CELL_WIDTH).round() as i32;
    let y = i32::from(rect.y) + (offset.dy / CELL_HEIGHT).round() as i32;
    let left = x.max(i32::from(bounds.x));
    let top = y.max(i32::from(bounds.y));
    let right = (x + i32::from(rect.width)).min(i32::from(bounds.right()));
    let bottom = (y + i32::from(rect.height)).min(i32::from(bounds.bottom()));
    if right <= left || bottom <= top {
        return Rect::default();
    }
    Rect::new(
        left as u16,
        top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    )
}

pub fn draw(frame: &mut Frame, app: &App) {
    match app.screen {
        Screen::Roster => draw_roster(frame, app),
        Screen::Play => draw_play(frame, app),
    }
    if app.show_help {
        draw_help_popup(frame, app);
    }
}

fn draw_roster(frame: &mut Frame, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(7),
        ])
        .split(frame.area());

    let title = Paragraph::new(vec![
        Line::from("SipDeck | Who is playing?".bold()),
        Line::from(format!("Status: {}", app.status_line)),
    ]);
    frame.render_widget(title, root[0]);

    let items: Vec<ListItem<'_>> = app
        .roster
        .names()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let shown = if name.is_empty() {
                "(empty)".dark_gray()
            } else {
                Span::raw(name.as_str())
            };
            let cursor = if idx == app.roster_cursor { "_" } else { "" };
            ListItem::new(Line::from(vec![
                Span::raw(format!("Player {}: ", idx + 1)),
                shown,
                Span::raw(cursor),
            ]))
        })
        .collect();
    let ready = app.roster.filled_count();
    let list = List::new(items)
        .block(pane_block(format!("Players {ready}/{MIN_PLAYERS}+")))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    let mut state = ListState::default();
    state.select(Some(app.roster_cursor.min(app.roster.len().saturating_sub(1))));
    frame.render_stateful_widget(list, root[1], &mut state);

    let start_hint = if app.roster.can_start() {
        "Enter start".green()
    } else {
        "Enter start (needs two names)".dark_gray()
    };
    let hints = Line::from(vec![
        start_hint,
        Span::raw(" | Ctrl+N add | Ctrl+D remove | Ctrl+X play without players | Ctrl+C quit"),
    ]);
    frame.render_widget(Paragraph::new(hints).block(pane_block("Keys")), root[2]);
    draw_events(frame, root[3], app);
}

fn draw_play(frame: &mut Frame, app: &App) {
    let layout = play_layout(frame.area());
    let snapshot = app.controller.snapshot();

    draw_header(frame, layout.header, app);

    let stage_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(stage_block, layout.stage);

    match snapshot.active_card {
        Some(card) => {
            let rest = card_rect(layout.stage);
            let area = offset_rect(rest, snapshot.live_offset, layout.stage);
            if area.width > 2 && area.height > 2 {
                draw_card(frame, area, card, snapshot.active_category);
            }
        }
        None => draw_empty(frame, layout.stage, empty_hint(app)),
    }

    if snapshot.show_feedback {
        draw_feedback(frame, layout.stage, snapshot.active_category);
    }
    if app.show_filters {
        draw_filters(frame, layout.stage, app);
    }
    draw_events(frame, layout.events, app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let snapshot = app.controller.snapshot();
    let position = match snapshot.position {
        Some(position) => format!("{}/{}", position + 1, snapshot.deck_len),
        None => "-".to_string(),
    };
    let players = app.roster.filled_count();
    let players = if players == 0 {
        "no roster".to_string()
    } else {
        format!("{players} players")
    };
    let mut pills = vec![Span::raw("Categories: ")];
    for category in app.controller.categories().entries() {
        let style = if app.is_filter_selected(category.id) {
            Style::default()
                .fg(Color::Black)
                .bg(category_color(category))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        pills.push(Span::styled(format!(" {} ", category.name), style));
        pills.push(Span::raw(" "));
    }
    let lines = vec![
        Line::from(format!("SipDeck | Card {position} | {players} | Seed {}", app.seed).bold()),
        Line::from(pills),
        Line::from(format!("Status: {}", app.status_line)),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn draw_card(frame: &mut Frame, area: Rect, card: &Card, category: &Category) {
    let color = category_color(category);
    frame.render_widget(Clear, area);
    let filled = usize::from(card.spicyness.level());
    let heat = format!(
        "{}{}",
        "*".repeat(filled),
        ".".repeat(usize::from(sipdeck_core::Spicyness::MAX).saturating_sub(filled))
    );
    let mut lines = vec![
        Line::from(Span::styled(
            card.title.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(card.description.clone()),
        Line::from(""),
        Line::from(format!("Spicyness {heat}")),
    ];
    if let Some(players) = card.requires_players {
        lines.push(Line::from(format!("Needs {players}+ players")));
    }
    if !card.tags.is_empty() {
        let tags: Vec<&str> = card.tags.iter().map(String::as_str).collect();
        lines.push(Line::from(format!("#{}", tags.join(" #")).dark_gray()));
    }
    let block = Block::default()
        .title(category.name)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

pub fn empty_hint(app: &App) -> &'static str {
    let deck = app.controller.deck();
    if deck.cards().is_empty() {
        "No card data was loaded. Check the status line."
    } else if deck.filters().none_selected() {
        "Enable some categories to load cards into the deck."
    } else {
        "None of the enabled categories has playable cards."
    }
}

fn draw_empty(frame: &mut Frame, stage: Rect, hint: &str) {
    let area = centered_rect(60, 30, stage);
    let lines = vec![Line::from("No cards".bold()), Line::from(hint)];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_feedback(frame: &mut Frame, stage: Rect, category: &Category) {
    let area = centered_rect(40, 30, stage);
    frame.render_widget(Clear, area);
    let color = category_color(category);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "DRINK",
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Esc to continue".dark_gray()),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_filters(frame: &mut Frame, stage: Rect, app: &App) {
    let entries = app.controller.categories().entries();
    let height = (entries.len() as u16 + 2).min(stage.height);
    let width = 24.min(stage.width);
    let area = Rect::new(
        stage.right().saturating_sub(width + 1),
        stage.y + 1,
        width,
        height,
    );
    frame.render_widget(Clear, area);
    let items: Vec<ListItem<'_>> = entries
        .iter()
        .map(|category| {
            let mark = if app.is_filter_selected(category.id) {
                "[x]"
            } else {
                "[ ]"
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{mark} ")),
                Span::styled(category.name, Style::default().fg(category_color(category))),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title("Categories")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.filter_cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_events(frame: &mut Frame, area: Rect, app: &App) {
    let capacity = area.height.saturating_sub(2) as usize;
    let start = app.event_log.len().saturating_sub(capacity);
    let lines: Vec<Line<'_>> = app
        .event_log
        .iter()
        .skip(start)
        .map(|line| Line::from(line.clone()))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(pane_block("Events")), area);
}

fn draw_help_popup(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, area);
    let lines = match app.screen {
        Screen::Roster => vec![
            Line::from("type to edit the focused name | up/down/tab move"),
            Line::from("Ctrl+N add player | Ctrl+D remove player"),
            Line::from("Enter start (two names needed)"),
            Line::from("Ctrl+X start without players | Ctrl+C quit"),
        ],
        Screen::Play => vec![
            Line::from("drag the card with the left mouse button"),
            Line::from("right or up: next card | left or down: drink"),
            Line::from("f categories | up/down/jk move | enter/space toggle"),
            Line::from("esc close overlay | p players | ? help | q quit"),
        ],
    };
    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn category_color(category: &Category) -> Color {
    match category.rgb() {
        Some((r, g, b)) => Color::Rgb(r, g, b),
        None => Color::Gray,
    }
}

fn pane_block<'a>(title: impl Into<Line<'a>>) -> Block<'a> {
    Block::default().title(title).borders(Borders::ALL)
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
