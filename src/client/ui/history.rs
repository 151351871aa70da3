//! Test history with analytics.

use chrono::Utc;
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Sparkline};

use crate::analytics::{self, HistoryStats, percentage};
use crate::client::state::HistoryView;

use super::render::{controls, grade_color, panel, truncate};

const BAR_WIDTH: usize = 15;

pub fn render(frame: &mut Frame, area: Rect, view: &HistoryView) {
    let chunks = Layout::vertical([
        Constraint::Length(4), // Summary
        Constraint::Min(8),    // Results and topics
        Constraint::Length(5), // Activity
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    let today = Utc::now().date_naive();
    let stats = analytics::summarize(&view.results, today);

    render_summary(frame, chunks[0], &stats);

    let [list, side] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(chunks[1]);
    render_results(frame, list, view);
    render_topics(frame, side, &stats);

    let [activity, trend] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(chunks[2]);
    let counts: Vec<u64> = analytics::daily_activity(&view.results, today)
        .iter()
        .map(|day| day.count as u64)
        .collect();
    // Only the most recent days fit; keep the right edge at today.
    let width = activity.width.saturating_sub(4) as usize;
    let recent = counts[counts.len().saturating_sub(width)..].to_vec();
    let sparkline = Sparkline::default()
        .block(panel(" Activity "))
        .style(Style::default().fg(Color::Green))
        .data(recent);
    frame.render_widget(sparkline, activity);

    let scores: Vec<u64> = analytics::progress(&view.results)
        .iter()
        .map(|point| u64::from(point.score))
        .collect();
    let trend_widget = Sparkline::default()
        .block(panel(" Progress "))
        .style(Style::default().fg(Color::Cyan))
        .max(100)
        .data(scores);
    frame.render_widget(trend_widget, trend);

    controls(frame, chunks[3], "j/k select  ·  Enter details  ·  d delete  ·  r refresh  ·  Esc back");
}

fn render_summary(frame: &mut Frame, area: Rect, stats: &HistoryStats) {
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White).bold();

    let content = vec![
        Line::from(Span::styled("HISTORY", Style::default().fg(Color::Cyan).bold())),
        Line::from(vec![
            Span::styled("Tests ", label),
            Span::styled(stats.total.to_string(), value),
            Span::styled("  ·  Average ", label),
            Span::styled(format!("{}%", stats.average), Style::default().fg(grade_color(stats.average)).bold()),
            Span::styled("  ·  Best ", label),
            Span::styled(format!("{}%", stats.best), value),
            Span::styled("  ·  Mock/Regular ", label),
            Span::styled(format!("{}/{}", stats.mock, stats.regular), value),
        ]),
        Line::from(vec![
            Span::styled("Streak ", label),
            Span::styled(format!("{} days", stats.streak), value),
            Span::styled("  ·  Active days ", label),
            Span::styled(stats.active_days.to_string(), value),
            Span::styled("  ·  Most in a day ", label),
            Span::styled(stats.max_per_day.to_string(), value),
        ]),
    ];

    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), area);
}

fn render_results(frame: &mut Frame, area: Rect, view: &HistoryView) {
    let lines: Vec<Line> = if view.loading && view.results.is_empty() {
        vec![Line::from(Span::styled("Loading...", Style::default().fg(Color::Yellow)))]
    } else if view.results.is_empty() {
        vec![Line::from(Span::styled(
            "No tests taken yet",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        view.results
            .iter()
            .enumerate()
            .map(|(i, result)| {
                let is_selected = i == view.selected;
                let prefix = if is_selected { "> " } else { "  " };
                let style = if is_selected {
                    Style::default().fg(Color::Yellow).bold()
                } else {
                    Style::default().fg(Color::White)
                };
                let pct = percentage(result.score, result.total);

                Line::from(vec![
                    Span::styled(prefix, style),
                    Span::styled(
                        format!("{} ", result.date.format("%Y-%m-%d")),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(format!("{:<30}", truncate(&result.quiz_name, 26)), style),
                    Span::styled(
                        format!("{:>3}/{:<3} {:>3}%", result.score, result.total, pct),
                        Style::default().fg(grade_color(pct)),
                    ),
                ])
            })
            .collect()
    };

    let visible = area.height.saturating_sub(2) as usize;
    let scroll = view.selected.saturating_sub(visible.saturating_sub(1));
    let widget = Paragraph::new(lines)
        .block(panel(" Results "))
        .scroll((scroll as u16, 0));
    frame.render_widget(widget, area);
}

fn render_topics(frame: &mut Frame, area: Rect, stats: &HistoryStats) {
    let lines: Vec<Line> = stats
        .topics
        .iter()
        .map(|topic| {
            let filled = (topic.average as usize * BAR_WIDTH / 100).min(BAR_WIDTH);
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));

            Line::from(vec![
                Span::styled(format!("{:<14}", truncate(&topic.topic, 11)), Style::default().fg(Color::White)),
                Span::styled(bar, Style::default().fg(grade_color(topic.average))),
                Span::styled(
                    format!(" {:>3}% ({})", topic.average, topic.count),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(panel(" Topics ")), area);
}
