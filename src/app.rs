//! Drives a [`Machine`]: runs fetches and countdowns for its effects and
//! keeps the selection cursors the views need.

use std::sync::Arc;

use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backend::QuizBackend;
use crate::config::Rules;
use crate::models::{Mode, NUM_CHOICES};
use crate::session::{Effect, Event, Machine, Phase, Session, SessionStore};
use crate::ticker::Ticker;

pub struct App<S, B> {
    machine: Machine<S>,
    backend: Arc<B>,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    ticker: Ticker,
    fetch: Option<JoinHandle<()>>,
    selected_option: usize,
    results_scroll: usize,
    pub should_quit: bool,
}

impl<S: SessionStore, B: QuizBackend> App<S, B> {
    /// Loads the stored session (or a fresh one in `mode`) and resumes it.
    /// A stored session keeps its own mode.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(store: S, backend: B, rules: Rules, mode: Mode) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut app = Self {
            machine: Machine::new(store, rules, mode),
            backend: Arc::new(backend),
            tx,
            rx,
            ticker: Ticker::new(),
            fetch: None,
            selected_option: 0,
            results_scroll: 0,
            should_quit: false,
        };
        app.dispatch(Event::Resume);
        app
    }

    pub fn session(&self) -> &Session {
        self.machine.session()
    }

    pub fn rules(&self) -> &Rules {
        self.machine.rules()
    }

    pub fn store(&self) -> &S {
        self.machine.store()
    }

    pub fn selected_option(&self) -> usize {
        self.selected_option
    }

    pub fn results_scroll(&self) -> usize {
        self.results_scroll
    }

    /// Whether a countdown task is currently ticking.
    pub fn countdown_running(&self) -> bool {
        self.ticker.running().is_some()
    }

    /// Applies `event` to the session and carries out the resulting effects.
    pub fn dispatch(&mut self, event: Event) {
        let phase_before = self.session().phase;
        let effects = self.machine.dispatch(event);
        for effect in effects {
            self.run_effect(effect);
        }

        if self.session().phase != phase_before {
            debug!("Phase {:?} -> {:?}", phase_before, self.session().phase);
            self.results_scroll = 0;
        }
        self.sync_cursor();
    }

    /// Dispatches every event that has already arrived from background tasks.
    pub fn pump(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.dispatch(event);
        }
    }

    /// Waits for the next background event and dispatches it.
    pub async fn step(&mut self) {
        if let Some(event) = self.rx.recv().await {
            self.dispatch(event);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Fetch {
                mode,
                attempt,
                delay,
            } => self.spawn_fetch(mode, attempt, delay),
            Effect::StartCountdown(countdown) => {
                self.ticker
                    .start(countdown, self.machine.rules().time_unit, self.tx.clone());
            }
            Effect::StopCountdown => self.ticker.stop(),
            Effect::Persist | Effect::ClearPersisted => {}
        }
    }

    fn spawn_fetch(&mut self, mode: Mode, attempt: u32, delay: std::time::Duration) {
        if let Some(previous) = self.fetch.take() {
            previous.abort();
        }

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        self.fetch = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let event = match backend.generate(mode).await {
                Ok(bundle) => Event::Fetched { attempt, bundle },
                Err(e) => Event::FetchFailed {
                    attempt,
                    reason: e.to_string(),
                },
            };
            let _ = tx.send(event);
        }));
    }

    /// Points the cursor at the recorded answer of the current question.
    fn sync_cursor(&mut self) {
        let session = self.machine.session();
        self.selected_option = session
            .current_question()
            .and_then(|q| {
                session
                    .answer_for(q.id)
                    .and_then(|answer| q.choice_index(answer))
            })
            .unwrap_or(0);
    }

    pub fn select_next_option(&mut self) {
        self.selected_option = (self.selected_option + 1) % NUM_CHOICES;
    }

    pub fn select_previous_option(&mut self) {
        self.selected_option = (self.selected_option + NUM_CHOICES - 1) % NUM_CHOICES;
    }

    /// Records the highlighted choice as the answer to the current question.
    pub fn choose_selected(&mut self) {
        let choice = self
            .session()
            .current_question()
            .map(|q| q.choices[self.selected_option].clone());
        if let Some(choice) = choice {
            self.dispatch(Event::Choose(choice));
        }
    }

    /// Highlights and records choice `index`.
    pub fn choose_index(&mut self, index: usize) {
        if index < NUM_CHOICES {
            self.selected_option = index;
            self.choose_selected();
        }
    }

    pub fn select_next_mode(&mut self) {
        let mode = self.session().mode.next();
        self.dispatch(Event::SelectMode(mode));
    }

    pub fn select_previous_mode(&mut self) {
        let mode = self.session().mode.previous();
        self.dispatch(Event::SelectMode(mode));
    }

    pub fn scroll_results_down(&mut self) {
        if self.session().phase == Phase::Scored
            && self.results_scroll + 1 < self.session().quiz.len()
        {
            self.results_scroll += 1;
        }
    }

    pub fn scroll_results_up(&mut self) {
        self.results_scroll = self.results_scroll.saturating_sub(1);
    }
}

impl<S, B> Drop for App<S, B> {
    fn drop(&mut self) {
        if let Some(fetch) = self.fetch.take() {
            fetch.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::time::Duration;

    use super::*;
    use crate::backend::{BackendError, DeckBackend};
    use crate::config::RetryPolicy;
    use crate::data::DeckEntry;
    use crate::models::QuizBundle;
    use crate::session::MemoryStore;

    fn rules() -> Rules {
        Rules {
            reveal_seconds: 2,
            answer_seconds: 50,
            time_unit: Duration::from_millis(5),
            retry: RetryPolicy::immediate(),
        }
    }

    fn deck() -> DeckBackend {
        DeckBackend::new(vec![DeckEntry {
            image_url: "https://img/cat.jpg".to_string(),
            description: "a cat".to_string(),
            quiz: "What animal is shown? - A cat - A dog - A bird - A fish\n\
                   What color is it? - Orange - Blue - Green - Purple"
                .to_string(),
        }])
    }

    async fn run_until<S: SessionStore, B: QuizBackend>(app: &mut App<S, B>, phase: Phase) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while app.session().phase != phase {
                app.step().await;
            }
        })
        .await
        .expect("phase not reached in time");
    }

    /// Fails a fixed number of times before delegating to a deck.
    struct Flaky {
        failures: std::sync::atomic::AtomicU32,
        deck: DeckBackend,
    }

    impl QuizBackend for Flaky {
        fn generate(
            &self,
            mode: Mode,
        ) -> impl Future<Output = Result<QuizBundle, BackendError>> + Send {
            async move {
                let left = self.failures.load(std::sync::atomic::Ordering::SeqCst);
                if left > 0 {
                    self.failures
                        .store(left - 1, std::sync::atomic::Ordering::SeqCst);
                    return Err(BackendError::Closed);
                }
                self.deck.generate(mode).await
            }
        }
    }

    #[tokio::test]
    async fn test_full_game() {
        let mut app = App::new(MemoryStore::new(), deck(), rules(), Mode::Basic);
        assert_eq!(app.session().phase, Phase::Idle);

        app.dispatch(Event::Start);
        run_until(&mut app, Phase::Revealing).await;
        assert!(app.countdown_running());

        run_until(&mut app, Phase::Answering).await;
        assert!(!app.countdown_running());

        let correct = app.session().quiz[0].correct_answer.clone();
        let index = app.session().quiz[0].choice_index(&correct).unwrap();
        app.choose_index(index);
        assert_eq!(app.selected_option(), index);

        app.dispatch(Event::Next);
        assert_eq!(app.selected_option(), 0);
        app.dispatch(Event::Previous);
        assert_eq!(app.selected_option(), index);

        app.dispatch(Event::Next);
        app.dispatch(Event::Next);
        assert_eq!(app.session().phase, Phase::Scored);
        assert_eq!(app.session().score, Some(1));
        assert!(app.store().raw().is_some());

        app.dispatch(Event::Restart);
        assert_eq!(app.session().phase, Phase::Idle);
        assert!(app.store().raw().is_none());
    }

    #[tokio::test]
    async fn test_timed_mode_times_out() {
        let rules = Rules {
            answer_seconds: 3,
            ..rules()
        };
        let mut app = App::new(MemoryStore::new(), deck(), rules, Mode::Timed);
        app.dispatch(Event::Start);
        run_until(&mut app, Phase::Answering).await;
        assert!(app.countdown_running());

        app.choose_index(0);
        run_until(&mut app, Phase::Scored).await;
        assert!(!app.countdown_running());
        assert_eq!(app.session().answer_seconds_remaining, Some(0));
        assert_eq!(app.session().answered_count(), 1);
    }

    #[tokio::test]
    async fn test_early_submit_stops_answer_countdown() {
        let mut app = App::new(MemoryStore::new(), deck(), rules(), Mode::Timed);
        app.dispatch(Event::Start);
        run_until(&mut app, Phase::Answering).await;

        app.dispatch(Event::Next);
        app.dispatch(Event::Next);
        assert_eq!(app.session().phase, Phase::Scored);
        assert!(!app.countdown_running());
    }

    #[tokio::test]
    async fn test_retries_until_quiz_arrives() {
        let flaky = Flaky {
            failures: std::sync::atomic::AtomicU32::new(3),
            deck: deck(),
        };
        let mut app = App::new(MemoryStore::new(), flaky, rules(), Mode::Basic);
        app.dispatch(Event::Start);
        run_until(&mut app, Phase::Revealing).await;
        assert_eq!(app.session().attempt, 4);
    }

    #[tokio::test]
    async fn test_stored_mode_survives_restart_of_the_game() {
        let mut app = App::new(MemoryStore::new(), deck(), rules(), Mode::Basic);
        app.select_next_mode();
        assert_eq!(app.session().mode, Mode::TwoImage);
        let snapshot = app.store().clone();
        drop(app);

        let restored = App::new(snapshot, deck(), rules(), Mode::Basic);
        assert_eq!(restored.session().phase, Phase::Idle);
        assert_eq!(restored.session().mode, Mode::TwoImage);

        let fresh = App::new(MemoryStore::new(), deck(), rules(), Mode::Timed);
        assert_eq!(fresh.session().mode, Mode::Timed);
    }

    #[tokio::test]
    async fn test_resumes_from_snapshot() {
        let mut app = App::new(MemoryStore::new(), deck(), rules(), Mode::Basic);
        app.dispatch(Event::Start);
        run_until(&mut app, Phase::Answering).await;
        app.choose_index(2);
        let snapshot = app.store().clone();
        let before = app.session().clone();
        drop(app);

        let restored = App::new(snapshot, deck(), rules(), Mode::Timed);
        assert_eq!(restored.session().phase, Phase::Answering);
        assert_eq!(restored.session().mode, Mode::Basic);
        assert_eq!(restored.session().quiz, before.quiz);
        assert_eq!(restored.session().answers, before.answers);
        assert_eq!(restored.selected_option(), 2);
    }
}
