use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::config::Rules;
use crate::models::Mode;
use crate::session::Session;

pub fn render(frame: &mut Frame, area: Rect, session: &Session, rules: &Rules) {
    let chunks = Layout::vertical([
        Constraint::Length(8),
        Constraint::Fill(1),
        Constraint::Length(2),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_title(frame, chunks[0], rules);

    let columns = Layout::horizontal([Constraint::Length(24), Constraint::Fill(1)]).split(chunks[1]);
    render_modes(frame, columns[0], session.mode);
    render_mode_details(frame, columns[1], session.mode);

    if !session.status.is_empty() {
        let status = Paragraph::new(session.status.as_str())
            .alignment(Alignment::Center)
            .fg(Color::Red);
        frame.render_widget(status, chunks[2]);
    }

    let controls = Paragraph::new("j/k choose mode  ·  enter start  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(controls, chunks[3]);
}

fn render_title(frame: &mut Frame, area: Rect, rules: &Rules) {
    let content = vec![
        Line::from(Span::styled(
            "SNAPQUIZ",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Memorize a randomly selected image and answer questions about what you saw.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            format!(
                "Each image is visible for {} seconds. After that, the quiz begins.",
                rules.reveal_seconds
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .padding(Padding::vertical(1)),
        );
    frame.render_widget(widget, area);
}

fn render_modes(frame: &mut Frame, area: Rect, selected: Mode) {
    let lines: Vec<Line> = Mode::ALL
        .iter()
        .map(|mode| {
            let is_selected = *mode == selected;
            let style = if is_selected {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if is_selected { ">" } else { " " };
            Line::from(vec![
                Span::styled(format!(" {} ", marker), style),
                Span::styled(mode.label(), style),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Game Mode ")
            .title_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(widget, area);
}

fn render_mode_details(frame: &mut Frame, area: Rect, mode: Mode) {
    let mut lines = vec![
        Line::from(Span::styled(mode.label(), Style::default().fg(Color::White).bold())),
        Line::from(""),
        Line::from(Span::styled(mode.description(), Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(Span::styled("Rules:", Style::default().fg(Color::Cyan))),
    ];
    lines.extend(
        mode.rules()
            .iter()
            .map(|rule| Line::from(Span::styled(format!("  · {}", rule), Style::default().fg(Color::Gray)))),
    );

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}
