//! Question generation form.

use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};

use crate::client::forms::{GenerateField, GenerateForm, Purpose, Source};

use super::render::{controls, panel};

pub fn render(frame: &mut Frame, area: Rect, form: &GenerateForm) {
    let chunks = Layout::vertical([
        Constraint::Length(2), // Title
        Constraint::Min(10),   // Fields
        Constraint::Length(3), // Status
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    let title = match form.purpose {
        Purpose::Create => "CREATE A QUIZ",
        Purpose::Mock => "MOCK TEST",
    };
    frame.render_widget(
        Paragraph::new(Span::styled(title, Style::default().fg(Color::Cyan).bold()))
            .alignment(Alignment::Center),
        chunks[0],
    );

    let focused = form.focused();
    let lines: Vec<Line> = form
        .fields()
        .into_iter()
        .flat_map(|field| [field_line(form, field, field == focused), Line::from("")])
        .collect();
    frame.render_widget(Paragraph::new(lines).block(panel(" Settings ")), chunks[1]);

    let status = if form.busy {
        let waiting = match (form.source, &form.pdf) {
            (Source::Pdf, None) => "Uploading PDF and finding topics...",
            _ => "Generating questions...",
        };
        Line::from(Span::styled(waiting, Style::default().fg(Color::Yellow)))
    } else if let Some(err) = &form.error {
        Line::from(Span::styled(err.as_str(), Style::default().fg(Color::Red)))
    } else {
        Line::from("")
    };
    frame.render_widget(
        Paragraph::new(status)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        chunks[2],
    );

    let hints = match (form.source, &form.pdf) {
        (Source::Pdf, None) => "Tab next  ·  ←/→ change  ·  Enter upload PDF  ·  Esc back",
        _ => "Tab next  ·  ←/→ change  ·  Enter generate  ·  Esc back",
    };
    controls(frame, chunks[3], hints);
}

fn field_line(form: &GenerateForm, field: GenerateField, focused: bool) -> Line<'static> {
    let (label, value, choice) = match field {
        GenerateField::Source => (
            "Source",
            match form.source {
                Source::Topic => "Topic".to_string(),
                Source::Pdf => "PDF document".to_string(),
            },
            true,
        ),
        GenerateField::Name => (form.name.label, form.name.value.clone(), false),
        GenerateField::Input => (form.input.label, form.input.value.clone(), false),
        GenerateField::Difficulty => ("Difficulty", form.difficulty.to_string(), true),
        GenerateField::Count => (form.count.label, form.count.value.clone(), false),
        GenerateField::Wikipedia => (
            "Wikipedia",
            (if form.wikipedia { "use article intro" } else { "off" }).to_string(),
            true,
        ),
        GenerateField::PdfTopic => {
            let value = form
                .pdf
                .as_ref()
                .and_then(|pdf| {
                    pdf.topic()
                        .map(|t| format!("{} ({}/{})", t.title, pdf.selected + 1, pdf.topics.len()))
                })
                .unwrap_or_default();
            ("PDF topic", value, true)
        }
    };

    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let value = match (focused, choice) {
        (true, true) => format!("< {} >", value),
        (true, false) => format!("{}_", value),
        (false, _) => value,
    };

    Line::from(vec![
        Span::styled(format!("{:>12}: ", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, style),
    ])
}
