//! Accept or reject generated questions before saving.

use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};

use crate::client::forms::Review;
use crate::models::QuestionStatus;

use super::dashboard::difficulty_style;
use super::render::{controls, panel, truncate};

pub fn render(frame: &mut Frame, area: Rect, review: &Review) {
    let chunks = Layout::vertical([
        Constraint::Length(3),      // Header
        Constraint::Percentage(45), // Question list
        Constraint::Min(8),         // Selected question
        Constraint::Length(2),      // Controls
    ])
    .margin(1)
    .split(area);

    let action = if review.editing.is_some() { "EDIT QUIZ" } else { "REVIEW QUESTIONS" };
    let status = if review.busy {
        Span::styled("Saving...", Style::default().fg(Color::Yellow))
    } else if let Some(err) = &review.error {
        Span::styled(err.as_str(), Style::default().fg(Color::Red))
    } else {
        Span::styled(
            format!("{} of {} accepted", review.accepted(), review.questions.len()),
            Style::default().fg(Color::DarkGray),
        )
    };
    let header = vec![
        Line::from(Span::styled(action, Style::default().fg(Color::Cyan).bold())),
        Line::from(vec![
            Span::styled(format!("{}  ·  {}  ·  ", review.name, review.topic), Style::default().fg(Color::White)),
            Span::styled(review.difficulty.as_str(), difficulty_style(review.difficulty)),
        ]),
        Line::from(status),
    ];
    frame.render_widget(Paragraph::new(header).alignment(Alignment::Center), chunks[0]);

    let lines: Vec<Line> = review
        .questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let (mark, color) = match question.status {
                QuestionStatus::Accepted => ("[+]", Color::Green),
                QuestionStatus::Rejected => ("[-]", Color::Red),
                QuestionStatus::Pending => ("[ ]", Color::DarkGray),
            };
            let is_selected = i == review.selected;
            let style = if is_selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(if is_selected { "> " } else { "  " }, style),
                Span::styled(format!("{} ", mark), Style::default().fg(color)),
                Span::styled(format!("{:2}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(truncate(&question.question, 70), style),
            ])
        })
        .collect();

    let visible = chunks[1].height.saturating_sub(2) as usize;
    let scroll = review.selected.saturating_sub(visible.saturating_sub(1));
    frame.render_widget(
        Paragraph::new(lines)
            .block(panel(" Questions "))
            .scroll((scroll as u16, 0)),
        chunks[1],
    );

    if let Some(question) = review.questions.get(review.selected) {
        let mut detail = vec![
            Line::from(Span::styled(question.question.as_str(), Style::default().fg(Color::White))),
            Line::from(""),
        ];
        for (label, option) in ['A', 'B', 'C', 'D'].iter().zip(&question.options) {
            let style = if *option == question.correct_answer {
                Style::default().fg(Color::Green).bold()
            } else {
                Style::default().fg(Color::Gray)
            };
            detail.push(Line::from(Span::styled(format!("{}) {}", label, option), style)));
        }

        frame.render_widget(
            Paragraph::new(detail)
                .wrap(Wrap { trim: true })
                .block(panel(" Question ")),
            chunks[2],
        );
    }

    controls(
        frame,
        chunks[3],
        "j/k select  ·  a accept  ·  r reject  ·  A accept all  ·  s save  ·  Esc discard",
    );
}
