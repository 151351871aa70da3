//! Login and registration screen.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::client::forms::{AuthForm, AuthMode};
use crate::client::state::ClientApp;

use super::render::{controls, title_line};

pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp, form: &AuthForm) {
    let height = form.fields.len() as u16 * 2 + 8;
    let chunks = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Length(height),
        Constraint::Min(0),
        Constraint::Length(2),
    ])
    .split(area);

    let heading = match form.mode {
        AuthMode::Login => "Log in",
        AuthMode::Register => "Create an account",
    };

    let mut content = vec![
        Line::from(""),
        title_line(),
        Line::from(""),
        Line::from(Span::styled(
            format!("Connected to {}", app.server_addr()),
            Style::default().fg(Color::Green),
        )),
        Line::from(Span::styled(heading, Style::default().fg(Color::White).bold())),
        Line::from(""),
    ];

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        let cursor = if focused { "_" } else { "" };

        content.push(Line::from(vec![
            Span::styled(format!("{:>12}: ", field.label), Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{:<24}", format!("{}{}", field.display(), cursor)), style),
        ]));
        content.push(Line::from(""));
    }

    if form.busy {
        content.push(Line::from(Span::styled("Please wait...", Style::default().fg(Color::Yellow))));
    } else if let Some(err) = &form.error {
        content.push(Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))));
    }

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);

    controls(
        frame,
        chunks[3],
        "Tab next field  ·  ←/→ switch login/register  ·  Enter submit  ·  Esc quit",
    );
}
