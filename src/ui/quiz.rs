use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};

use crate::models::NUM_CHOICES;
use crate::session::Session;

const OPTION_LABELS: [char; NUM_CHOICES] = ['A', 'B', 'C', 'D'];

pub fn render(frame: &mut Frame, area: Rect, session: &Session, selected: usize) {
    let Some(question) = session.current_question() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(2)
    .split(area);

    render_progress(frame, chunks[0], session);

    let prompt = Paragraph::new(question.prompt.as_str())
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(prompt, chunks[1]);

    render_options(
        frame,
        chunks[2],
        &question.choices,
        selected,
        session.answer_for(question.id),
    );
    render_controls(frame, chunks[3], session);
}

fn render_progress(frame: &mut Frame, area: Rect, session: &Session) {
    let mut spans = Vec::new();
    if let Some(remaining) = session.answer_seconds_remaining {
        let color = if remaining <= 5 { Color::Red } else { Color::Yellow };
        spans.push(Span::styled(
            format!("Time remaining: {}s    ", remaining),
            Style::default().fg(color).bold(),
        ));
    }
    spans.push(Span::styled(
        format!(
            "{}/{}",
            session.current_question_index + 1,
            session.quiz.len()
        ),
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Right),
        area,
    );
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    choices: &[String; NUM_CHOICES],
    selected: usize,
    answered: Option<&str>,
) {
    let mut lines: Vec<Line> = Vec::with_capacity(choices.len() * 2);

    for (index, choice) in choices.iter().enumerate() {
        let is_selected = index == selected;
        let is_answer = answered == Some(choice.as_str());
        let style = match (is_answer, is_selected) {
            (true, _) => Style::default().fg(Color::Green).bold(),
            (false, true) => Style::default().fg(Color::Cyan).bold(),
            (false, false) => Style::default().fg(Color::Gray),
        };
        let marker = if is_selected { ">" } else { " " };
        let check = if is_answer { " ✓" } else { "" };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", OPTION_LABELS[index]), style),
            Span::styled(choice.as_str(), style),
            Span::styled(check, style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_controls(frame: &mut Frame, area: Rect, session: &Session) {
    let next = if session.is_last_question() {
        "n submit"
    } else {
        "n next"
    };
    let text = format!("j/k navigate  ·  enter answer  ·  p previous  ·  {}  ·  q quit", next);
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
