//! Quiz screen for the client.

use std::time::Instant;

use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};

use crate::client::quiz_run::{QuizRun, format_remaining};
use crate::mcq::OPTION_COUNT;

use super::render::{controls, panel};

/// Render the quiz screen.
pub fn render(frame: &mut Frame, area: Rect, run: &QuizRun) {
    let Some(question) = run.current() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(3), // Progress and timer
        Constraint::Length(7), // Question text
        Constraint::Min(8),    // Options
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_progress(frame, chunks[0], run);

    let text = Paragraph::new(question.question.as_str())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White))
        .block(panel(""));
    frame.render_widget(text, chunks[1]);

    render_options(frame, chunks[2], &question.options, run.cursor, run.answers[run.index]);

    let hints = if run.is_last() {
        "j/k select  ·  Enter answer  ·  ←/→ move  ·  s submit quiz  ·  Esc abandon"
    } else {
        "j/k select  ·  Enter answer and continue  ·  ←/→ move  ·  s submit quiz  ·  Esc abandon"
    };
    controls(frame, chunks[3], hints);
}

fn render_progress(frame: &mut Frame, area: Rect, run: &QuizRun) {
    let now = Instant::now();
    let timer_style = if run.is_warning(now) {
        Style::default().fg(Color::Red).bold()
    } else {
        Style::default().fg(Color::Green)
    };

    let content = vec![
        Line::from(Span::styled(run.quiz_name.as_str(), Style::default().fg(Color::Cyan).bold())),
        Line::from(vec![
            Span::styled(
                format!("Question {} of {}", run.index + 1, run.questions.len()),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("  ·  {} answered  ·  ", run.answered()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(format_remaining(run.remaining(now)), timer_style),
        ]),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    options: &[String; OPTION_COUNT],
    cursor: usize,
    chosen: Option<usize>,
) {
    let option_labels = ['A', 'B', 'C', 'D'];

    let lines: Vec<Line> = options
        .iter()
        .enumerate()
        .map(|(i, opt)| {
            let is_cursor = i == cursor;
            let prefix = if is_cursor { "> " } else { "  " };
            let marker = if chosen == Some(i) { " *" } else { "" };

            let style = if is_cursor {
                Style::default().fg(Color::Yellow).bold()
            } else if chosen == Some(i) {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(format!("{}) ", option_labels[i]), style),
                Span::styled(opt.clone(), style),
                Span::styled(marker, Style::default().fg(Color::Green)),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(panel(" Options "));

    frame.render_widget(widget, area);
}
