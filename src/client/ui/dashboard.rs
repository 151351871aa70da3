//! Quiz catalogue: public quizzes and the user's own.

use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Tabs};

use crate::client::state::{ClientApp, Dashboard, DashboardTab};
use crate::models::{Creator, Difficulty};

use super::render::{controls, panel, truncate};

const NAME_WIDTH: usize = 32;

pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp, dashboard: &Dashboard) {
    let chunks = Layout::vertical([
        Constraint::Length(2), // Greeting
        Constraint::Length(1), // Tabs
        Constraint::Min(6),    // List
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    let name = app.session.as_ref().map(|s| s.name.as_str()).unwrap_or("");
    let greeting = Paragraph::new(Line::from(vec![
        Span::styled("Welcome, ", Style::default().fg(Color::White)),
        Span::styled(name, Style::default().fg(Color::Green).bold()),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(greeting, chunks[0]);

    let selected_tab = match dashboard.tab {
        DashboardTab::Public => 0,
        DashboardTab::Mine => 1,
    };
    let tabs = Tabs::new(vec![
        format!("Public ({})", dashboard.public.len()),
        format!("My quizzes ({})", dashboard.mine.len()),
    ])
    .select(selected_tab)
    .style(Style::default().fg(Color::DarkGray))
    .highlight_style(Style::default().fg(Color::Yellow).bold());
    frame.render_widget(tabs, chunks[1]);

    let rows: Vec<(&str, &str, Difficulty, u32, Option<&Creator>)> = match dashboard.tab {
        DashboardTab::Public => dashboard
            .public
            .iter()
            .map(|q| (q.name.as_str(), q.topic.as_str(), q.difficulty, q.question_count, q.created_by.as_ref()))
            .collect(),
        DashboardTab::Mine => dashboard
            .mine
            .iter()
            .map(|q| (q.name.as_str(), q.topic.as_str(), q.difficulty, q.question_count, q.created_by.as_ref()))
            .collect(),
    };

    let lines: Vec<Line> = if dashboard.loading && rows.is_empty() {
        vec![Line::from(Span::styled("Loading...", Style::default().fg(Color::Yellow)))]
    } else if rows.is_empty() {
        vec![Line::from(Span::styled(
            "No quizzes yet. Press [n] to create one.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        rows.iter()
            .enumerate()
            .map(|(i, (name, topic, difficulty, count, creator))| {
                let is_selected = i == dashboard.selected;
                let prefix = if is_selected { "> " } else { "  " };
                let style = if is_selected {
                    Style::default().fg(Color::Yellow).bold()
                } else {
                    Style::default().fg(Color::White)
                };
                let author = creator.map(|c| format!("by {}", c.username)).unwrap_or_default();

                Line::from(vec![
                    Span::styled(prefix, style),
                    Span::styled(format!("{:<34}", truncate(name, NAME_WIDTH)), style),
                    Span::styled(format!("{:<20}", truncate(topic, 16)), Style::default().fg(Color::Gray)),
                    Span::styled(format!("{:<8}", difficulty.as_str()), difficulty_style(*difficulty)),
                    Span::styled(format!("{:>3} Qs  ", count), Style::default().fg(Color::DarkGray)),
                    Span::styled(author, Style::default().fg(Color::DarkGray)),
                ])
            })
            .collect()
    };

    let visible = chunks[2].height.saturating_sub(2) as usize;
    let scroll = dashboard.selected.saturating_sub(visible.saturating_sub(1));
    let widget = Paragraph::new(lines)
        .block(panel(" Quizzes "))
        .scroll((scroll as u16, 0));
    frame.render_widget(widget, chunks[2]);

    let hints = match dashboard.tab {
        DashboardTab::Public => "Enter take  ·  n new quiz  ·  m mock test  ·  h history  ·  Tab switch  ·  l logout  ·  q quit",
        DashboardTab::Mine => "Enter take  ·  e edit  ·  x delete  ·  n new  ·  m mock  ·  h history  ·  Tab switch  ·  q quit",
    };
    controls(frame, chunks[3], hints);
}

pub(super) fn difficulty_style(difficulty: Difficulty) -> Style {
    match difficulty {
        Difficulty::Easy => Style::default().fg(Color::Green),
        Difficulty::Medium => Style::default().fg(Color::Yellow),
        Difficulty::Hard => Style::default().fg(Color::Red),
    }
}
