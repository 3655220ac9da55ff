mod loading;
mod quiz;
mod reveal;
mod score;
mod welcome;

use ratatui::{prelude::*, widgets::Block};

use crate::app::App;
use crate::backend::QuizBackend;
use crate::session::{Phase, SessionStore};

pub fn render<S: SessionStore, B: QuizBackend>(frame: &mut Frame, app: &App<S, B>) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    let session = app.session();
    match session.phase {
        Phase::Idle => welcome::render(frame, area, session, app.rules()),
        Phase::Loading => loading::render(frame, area, session),
        Phase::Revealing => reveal::render(frame, area, session, app.rules()),
        Phase::Answering => quiz::render(frame, area, session, app.selected_option()),
        Phase::Scored => score::render(frame, area, session, app.results_scroll()),
    }
}
