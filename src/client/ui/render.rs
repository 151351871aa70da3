//! Main client UI renderer.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::client::state::{ClientApp, ClientState};

use super::{auth, dashboard, generate, history, quiz, results, review};

const TITLE: &str = "QUIZGEN";

/// Render the client UI based on current state.
pub fn render(frame: &mut Frame, app: &ClientApp) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    let [body, footer] = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    match &app.state {
        ClientState::Connecting => render_connecting(frame, body, app),
        ClientState::Auth(form) => auth::render(frame, body, app, form),
        ClientState::Dashboard(state) => dashboard::render(frame, body, app, state),
        ClientState::Quiz(run) => quiz::render(frame, body, run),
        ClientState::Results(outcome) => results::render(frame, body, outcome),
        ClientState::History(view) => history::render(frame, body, view),
        ClientState::Generate(form) => generate::render(frame, body, form),
        ClientState::Review(state) => review::render(frame, body, state),
        ClientState::Disconnected { message } => render_disconnected(frame, body, message),
    }

    if let Some(flash) = &app.flash {
        let widget = Paragraph::new(flash.as_str())
            .alignment(Alignment::Center)
            .fg(Color::Yellow);
        frame.render_widget(widget, footer);
    }
}

/// Bordered panel with a cyan title.
pub(super) fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title)
        .title_style(Style::default().fg(Color::Cyan))
        .padding(Padding::horizontal(1))
}

pub(super) fn title_line() -> Line<'static> {
    Line::from(Span::styled(TITLE, Style::default().fg(Color::Cyan).bold()))
}

pub(super) fn controls(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);

    frame.render_widget(widget, area);
}

pub(super) fn grade_color(percentage: u32) -> Color {
    match percentage {
        90.. => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

pub(super) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let truncated: String = text.chars().take(max).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

fn render_connecting(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(7),
        Constraint::Percentage(40),
    ])
    .split(area);

    let content = vec![
        Line::from(""),
        title_line(),
        Line::from(""),
        Line::from(Span::styled(
            format!("Connecting to {}...", app.server_addr()),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}

fn render_disconnected(frame: &mut Frame, area: Rect, message: &str) {
    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(9),
        Constraint::Percentage(40),
    ])
    .split(area);

    let content = vec![
        Line::from(""),
        title_line(),
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Red).bold())),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Press [Q] to exit",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}
