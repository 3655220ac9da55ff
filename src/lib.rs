//! # snapquiz
//!
//! A timed picture quiz for the terminal. Each round fetches one or more
//! images together with generated multiple-choice questions about them,
//! shows the images for a while, then asks the questions.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use snapquiz::backend::DeckBackend;
//! use snapquiz::config::Rules;
//! use snapquiz::models::Mode;
//! use snapquiz::session::JsonFileStore;
//!
//! #[tokio::main]
//! async fn main() -> snapquiz::Result<()> {
//!     let backend = DeckBackend::from_json("deck.json")?;
//!     let store = JsonFileStore::new("snapquiz-session.json");
//!
//!     snapquiz::play(store, backend, Rules::default(), Mode::Basic).await
//! }
//! ```

mod app;
pub mod backend;
pub mod config;
pub mod data;
mod error;
pub mod models;
pub mod protocol;
pub mod server;
pub mod session;
pub mod terminal;
mod ticker;
mod ui;

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use log::info;

pub use app::App;
pub use error::{Error, Result};
pub use ticker::Ticker;

use backend::QuizBackend;
use config::Rules;
use models::Mode;
use session::{Event as SessionEvent, Phase, SessionStore};
use terminal::TerminalGuard;

/// Runs the game in the terminal until the player quits.
///
/// The session is restored from `store` when a snapshot exists, otherwise a
/// fresh one starts in `mode`.
pub async fn play<S, B>(store: S, backend: B, rules: Rules, mode: Mode) -> Result<()>
where
    S: SessionStore,
    B: QuizBackend,
{
    let mut app = App::new(store, backend, rules, mode);
    info!("Starting in {:?}", app.session().phase);

    let mut guard = TerminalGuard::enter()?;
    run_event_loop(&mut guard, &mut app).await
}

async fn run_event_loop<S, B>(guard: &mut TerminalGuard, app: &mut App<S, B>) -> Result<()>
where
    S: SessionStore,
    B: QuizBackend,
{
    while !app.should_quit {
        app.pump();
        guard.terminal().draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_input(app, key.code);
            }
        } else {
            tokio::task::yield_now().await;
        }
    }

    Ok(())
}

fn handle_input<S: SessionStore, B: QuizBackend>(app: &mut App<S, B>, key: KeyCode) {
    if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q')) {
        app.should_quit = true;
        return;
    }

    match app.session().phase {
        Phase::Idle => handle_welcome_input(app, key),
        Phase::Loading | Phase::Revealing => {
            if key == KeyCode::Esc {
                app.dispatch(SessionEvent::Restart);
            }
        }
        Phase::Answering => handle_quiz_input(app, key),
        Phase::Scored => handle_score_input(app, key),
    }
}

fn handle_welcome_input<S: SessionStore, B: QuizBackend>(app: &mut App<S, B>, key: KeyCode) {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_mode(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_mode(),
        KeyCode::Enter => app.dispatch(SessionEvent::Start),
        _ => {}
    }
}

fn handle_quiz_input<S: SessionStore, B: QuizBackend>(app: &mut App<S, B>, key: KeyCode) {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Enter | KeyCode::Char(' ') => app.choose_selected(),
        KeyCode::Char(c @ '1'..='4') => app.choose_index(c as usize - '1' as usize),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => {
            app.dispatch(SessionEvent::Next)
        }
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => {
            app.dispatch(SessionEvent::Previous)
        }
        KeyCode::Esc => app.dispatch(SessionEvent::Restart),
        _ => {}
    }
}

fn handle_score_input<S: SessionStore, B: QuizBackend>(app: &mut App<S, B>, key: KeyCode) {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_results_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_results_up(),
        KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => {
            app.dispatch(SessionEvent::Restart)
        }
        _ => {}
    }
}
