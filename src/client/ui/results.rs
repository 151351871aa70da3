//! Results screen: score and per-question breakdown.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::analytics::percentage;
use crate::client::state::{Back, QuizOutcome};
use crate::models::AnswerRecord;

use super::render::{controls, grade_color, panel, truncate};

const QUESTION_PREVIEW_LENGTH: usize = 60;

/// Render the results screen.
pub fn render(frame: &mut Frame, area: Rect, outcome: &QuizOutcome) {
    let chunks = Layout::vertical([
        Constraint::Length(7), // Score summary
        Constraint::Min(8),    // Answers breakdown
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[0], outcome);
    render_answers(frame, chunks[1], &outcome.result.answers, outcome.scroll);

    let hints = match outcome.back {
        Back::Dashboard => "j/k scroll  ·  Enter back to quizzes",
        Back::History => "j/k scroll  ·  Enter back to history",
    };
    controls(frame, chunks[2], hints);
}

fn render_score_summary(frame: &mut Frame, area: Rect, outcome: &QuizOutcome) {
    let result = &outcome.result;
    let pct = percentage(result.score, result.total);

    let status = if outcome.time_up {
        Span::styled("Time's up! Your answers were submitted.", Style::default().fg(Color::Red))
    } else if outcome.saved {
        Span::styled("Saved to history", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled("Saving...", Style::default().fg(Color::Yellow))
    };

    let content = vec![
        Line::from(Span::styled("RESULTS", Style::default().fg(Color::Cyan).bold())),
        Line::from(Span::styled(
            format!("{}  ·  {}  ·  {}", result.quiz_name, result.topic, result.difficulty),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} / {}  ({}%)", result.score, result.total, pct),
            Style::default().fg(grade_color(pct)).bold(),
        )),
        Line::from(status),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, area);
}

fn render_answers(frame: &mut Frame, area: Rect, answers: &[AnswerRecord], scroll: usize) {
    let mut lines: Vec<Line> = Vec::new();

    for (index, answer) in answers.iter().enumerate() {
        let (symbol, color) = if answer.is_correct {
            ("+", Color::Green)
        } else {
            ("-", Color::Red)
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
            Span::styled(format!("{:2}. ", index + 1), Style::default().fg(Color::DarkGray)),
            Span::styled(
                truncate(&answer.question, QUESTION_PREVIEW_LENGTH),
                Style::default().fg(Color::Gray),
            ),
        ]));
        if !answer.is_correct {
            lines.push(Line::from(vec![
                Span::styled("       yours: ", Style::default().fg(Color::DarkGray)),
                Span::styled(answer.selected.clone(), Style::default().fg(Color::Red)),
                Span::styled("  correct: ", Style::default().fg(Color::DarkGray)),
                Span::styled(answer.correct.clone(), Style::default().fg(Color::Green)),
            ]));
        }
    }

    let widget = Paragraph::new(lines)
        .block(panel(" Your Answers "))
        .scroll((scroll as u16, 0));

    frame.render_widget(widget, area);
}
