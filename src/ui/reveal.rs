use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

use crate::config::Rules;
use crate::session::Session;

pub fn render(frame: &mut Frame, area: Rect, session: &Session, rules: &Rules) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .margin(2)
    .split(area);

    let progress = format!(
        "Image {}/{}",
        session.current_image_index + 1,
        session.images.len()
    );
    frame.render_widget(
        Paragraph::new(progress)
            .alignment(Alignment::Right)
            .fg(Color::DarkGray),
        chunks[0],
    );

    let image = session.current_image().unwrap_or("Image not available");
    let content = vec![
        Line::from(Span::styled(
            "Memorize this image!",
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(image, Style::default().fg(Color::Yellow))),
    ];
    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(widget, chunks[1]);

    let ratio = if rules.reveal_seconds > 0 {
        f64::from(session.reveal_seconds_remaining) / f64::from(rules.reveal_seconds)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{} seconds left", session.reveal_seconds_remaining));
    frame.render_widget(gauge, chunks[2]);

    frame.render_widget(
        Paragraph::new("esc back  ·  q quit")
            .alignment(Alignment::Center)
            .fg(Color::DarkGray),
        chunks[3],
    );
}
