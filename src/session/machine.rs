//! Session state machine.
//!
//! [`transition`] is the pure core: it takes the session and an event and
//! returns the next session plus the side effects the driver has to carry
//! out (fetching, countdowns, persistence). [`Machine`] owns the session and
//! the snapshot store and performs the persistence effects itself.

use std::time::Duration;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Rules;
use crate::data::parse_quiz_with;
use crate::models::{Mode, QuizBundle};

use super::score::score;
use super::state::{Countdown, Phase, Session};
use super::store::SessionStore;

/// Something that happened to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Player picked a mode on the start screen.
    SelectMode(Mode),
    /// Player asked to start a game.
    Start,
    /// A quiz source answered fetch `attempt`.
    Fetched { attempt: u32, bundle: QuizBundle },
    /// Fetch `attempt` failed before producing a bundle.
    FetchFailed { attempt: u32, reason: String },
    /// One second of the given countdown elapsed.
    Tick(Countdown),
    /// Player chose an answer for the current question.
    Choose(String),
    Next,
    Previous,
    /// Back to the start screen, discarding the session.
    Restart,
    /// Session was just loaded from a snapshot.
    Resume,
}

/// Work the driver must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Request images and quiz text, waiting `delay` first.
    Fetch {
        mode: Mode,
        attempt: u32,
        delay: Duration,
    },
    /// Replace any running countdown with this one.
    StartCountdown(Countdown),
    StopCountdown,
    /// Save the session snapshot.
    Persist,
    /// Remove the session snapshot.
    ClearPersisted,
}

/// Applies `event` to `session`.
///
/// `rng` shuffles the choices of a freshly received quiz. Events that make no
/// sense in the current phase (stale ticks, late fetch results, input while
/// loading) leave the session untouched and produce no effects.
pub fn transition<R: Rng + ?Sized>(
    mut session: Session,
    event: Event,
    rules: &Rules,
    rng: &mut R,
) -> (Session, Vec<Effect>) {
    let before = session.clone();
    let mut effects = apply(&mut session, event, rules, rng);
    if session != before && !effects.contains(&Effect::ClearPersisted) {
        effects.push(Effect::Persist);
    }
    (session, effects)
}

fn apply<R: Rng + ?Sized>(
    session: &mut Session,
    event: Event,
    rules: &Rules,
    rng: &mut R,
) -> Vec<Effect> {
    match event {
        Event::SelectMode(mode) => select_mode(session, mode),
        Event::Start => start(session, rules),
        Event::Fetched { attempt, bundle } => {
            if !awaiting(session, attempt) {
                return Vec::new();
            }
            receive(session, bundle, rules, rng)
        }
        Event::FetchFailed { attempt, reason } => {
            if !awaiting(session, attempt) {
                return Vec::new();
            }
            retry(session, &reason, rules)
        }
        Event::Tick(Countdown::Reveal) => reveal_tick(session, rules),
        Event::Tick(Countdown::Answer) => answer_tick(session),
        Event::Choose(choice) => choose(session, choice),
        Event::Next => next(session),
        Event::Previous => previous(session),
        Event::Restart => {
            info!("Restarting session");
            reset(session)
        }
        Event::Resume => resume(session, rules),
    }
}

fn select_mode(session: &mut Session, mode: Mode) -> Vec<Effect> {
    if session.phase == Phase::Idle {
        session.mode = mode;
    } else {
        debug!("Ignoring mode change during {:?}", session.phase);
    }
    Vec::new()
}

fn start(session: &mut Session, rules: &Rules) -> Vec<Effect> {
    if session.phase != Phase::Idle {
        debug!("Ignoring start during {:?}", session.phase);
        return Vec::new();
    }

    session.reset();
    session.phase = Phase::Loading;
    session.attempt = 1;
    session.status = "Generating your quiz...".to_string();
    info!("Starting {} session", session.mode);

    vec![Effect::Fetch {
        mode: session.mode,
        attempt: 1,
        delay: rules.retry.delay_for(1),
    }]
}

fn awaiting(session: &Session, attempt: u32) -> bool {
    let fresh = session.phase == Phase::Loading && session.attempt == attempt;
    if !fresh {
        debug!("Ignoring stale result of fetch attempt {}", attempt);
    }
    fresh
}

fn receive<R: Rng + ?Sized>(
    session: &mut Session,
    bundle: QuizBundle,
    rules: &Rules,
    rng: &mut R,
) -> Vec<Effect> {
    let expected = session.mode.image_count();
    if bundle.images.len() != expected {
        let reason = format!("expected {} images, received {}", expected, bundle.images.len());
        return retry(session, &reason, rules);
    }
    if bundle.images.iter().any(|url| url.trim().is_empty()) {
        return retry(session, "received an empty image reference", rules);
    }

    let parsed = parse_quiz_with(&bundle.raw_quiz, rng);
    if parsed.questions.is_empty() {
        return retry(session, "no valid questions in generated quiz", rules);
    }

    info!(
        "Quiz ready: {} questions ({} lines skipped)",
        parsed.questions.len(),
        parsed.rejected.len()
    );
    session.images = bundle.images;
    session.quiz = parsed.questions;
    session.status.clear();
    begin_reveal(session, rules)
}

fn retry(session: &mut Session, reason: &str, rules: &Rules) -> Vec<Effect> {
    let next = session.attempt + 1;

    if !rules.retry.allows(next) {
        let attempts = session.attempt;
        warn!("Giving up after {} fetch attempts: {}", attempts, reason);
        session.reset();
        session.status =
            format!("Could not generate a quiz after {attempts} attempts. Press Enter to try again.");
        return vec![Effect::StopCountdown, Effect::ClearPersisted];
    }

    warn!("Fetch attempt {} failed: {}", session.attempt, reason);
    session.attempt = next;
    session.status = format!("Quiz generation failed, retrying (attempt {next})...");
    vec![Effect::Fetch {
        mode: session.mode,
        attempt: next,
        delay: rules.retry.delay_for(next),
    }]
}

fn begin_reveal(session: &mut Session, rules: &Rules) -> Vec<Effect> {
    session.phase = Phase::Revealing;
    session.current_image_index = 0;

    if rules.reveal_seconds == 0 {
        return begin_answering(session, rules);
    }
    session.reveal_seconds_remaining = rules.reveal_seconds;
    vec![Effect::StartCountdown(Countdown::Reveal)]
}

fn reveal_tick(session: &mut Session, rules: &Rules) -> Vec<Effect> {
    if session.phase != Phase::Revealing {
        debug!("Ignoring reveal tick during {:?}", session.phase);
        return Vec::new();
    }

    session.reveal_seconds_remaining = session.reveal_seconds_remaining.saturating_sub(1);
    if session.reveal_seconds_remaining > 0 {
        return Vec::new();
    }
    reveal_elapsed(session, rules)
}

fn reveal_elapsed(session: &mut Session, rules: &Rules) -> Vec<Effect> {
    if session.current_image_index + 1 < session.images.len() {
        session.current_image_index += 1;
        session.reveal_seconds_remaining = rules.reveal_seconds;
        return Vec::new();
    }
    begin_answering(session, rules)
}

fn begin_answering(session: &mut Session, rules: &Rules) -> Vec<Effect> {
    if session.quiz.is_empty() {
        warn!("No quiz to answer, returning to start");
        return reset(session);
    }

    session.phase = Phase::Answering;
    session.current_question_index = 0;
    session.score = None;
    session.answer_seconds_remaining = session.mode.is_timed().then_some(rules.answer_seconds);

    let mut effects = vec![Effect::StopCountdown];
    match session.answer_seconds_remaining {
        Some(0) => effects.extend(complete(session)),
        Some(_) => effects.push(Effect::StartCountdown(Countdown::Answer)),
        None => {}
    }
    effects
}

fn answer_tick(session: &mut Session) -> Vec<Effect> {
    if session.phase != Phase::Answering {
        debug!("Ignoring answer tick during {:?}", session.phase);
        return Vec::new();
    }
    let Some(remaining) = session.answer_seconds_remaining else {
        return Vec::new();
    };

    let remaining = remaining.saturating_sub(1);
    session.answer_seconds_remaining = Some(remaining);
    if remaining > 0 {
        return Vec::new();
    }

    info!("Answer time is up");
    complete(session)
}

fn choose(session: &mut Session, choice: String) -> Vec<Effect> {
    if session.phase != Phase::Answering {
        return Vec::new();
    }
    let Some(question) = session.current_question() else {
        return Vec::new();
    };
    if !question.has_choice(&choice) {
        warn!("Ignoring {:?}: not a choice of question {}", choice, question.id);
        return Vec::new();
    }

    let id = question.id;
    session.answers.insert(id, choice);
    Vec::new()
}

fn next(session: &mut Session) -> Vec<Effect> {
    if session.phase != Phase::Answering {
        return Vec::new();
    }
    if session.is_last_question() {
        return complete(session);
    }
    session.current_question_index += 1;
    Vec::new()
}

fn previous(session: &mut Session) -> Vec<Effect> {
    if session.phase == Phase::Answering && session.current_question_index > 0 {
        session.current_question_index -= 1;
    }
    Vec::new()
}

/// Scores the session. Runs at most once per session: whichever of "player
/// finished" and "time is up" arrives second finds the score already set.
fn complete(session: &mut Session) -> Vec<Effect> {
    if session.phase != Phase::Answering || session.score.is_some() {
        debug!("Session already completed");
        return Vec::new();
    }

    let total = score(&session.quiz, &session.answers);
    session.score = Some(total);
    session.phase = Phase::Scored;
    info!("Session scored {}/{}", total, session.quiz.len());
    vec![Effect::StopCountdown]
}

fn reset(session: &mut Session) -> Vec<Effect> {
    session.reset();
    vec![Effect::StopCountdown, Effect::ClearPersisted]
}

fn resume(session: &mut Session, rules: &Rules) -> Vec<Effect> {
    if let Err(reason) = repair(session) {
        warn!("Discarding restored session: {}", reason);
        return reset(session);
    }

    let effects = match session.phase {
        Phase::Idle => {
            if session.attempt != 0 || !session.quiz.is_empty() {
                session.reset();
            }
            Vec::new()
        }
        Phase::Loading => {
            session.attempt = session.attempt.max(1);
            session.status = "Resuming quiz generation...".to_string();
            vec![Effect::Fetch {
                mode: session.mode,
                attempt: session.attempt,
                delay: Duration::ZERO,
            }]
        }
        Phase::Revealing => {
            if session.quiz.is_empty() || session.current_image_index >= session.images.len() {
                warn!("Restored reveal has nothing to show, returning to start");
                return reset(session);
            }
            if session.reveal_seconds_remaining > 0 {
                return vec![Effect::StartCountdown(Countdown::Reveal)];
            }
            let mut effects = reveal_elapsed(session, rules);
            if session.phase == Phase::Revealing {
                effects.push(Effect::StartCountdown(Countdown::Reveal));
            }
            effects
        }
        Phase::Answering => {
            if session.quiz.is_empty() {
                warn!("Restored answering phase has no quiz, returning to start");
                return reset(session);
            }
            session.current_question_index = session.current_question_index.min(session.quiz.len() - 1);
            session.answer_seconds_remaining = if session.mode.is_timed() {
                Some(session.answer_seconds_remaining.unwrap_or(rules.answer_seconds))
            } else {
                None
            };
            match session.answer_seconds_remaining {
                Some(0) => complete(session),
                Some(_) => vec![Effect::StartCountdown(Countdown::Answer)],
                None => Vec::new(),
            }
        }
        Phase::Scored => {
            if session.quiz.is_empty() {
                warn!("Restored score has no quiz, returning to start");
                return reset(session);
            }
            session.score = Some(score(&session.quiz, &session.answers));
            Vec::new()
        }
    };

    if let Err(reason) = session.check_invariants() {
        warn!("Restored session is inconsistent ({}), returning to start", reason);
        return reset(session);
    }
    effects
}

/// Fixes what a restored snapshot may get wrong without losing progress:
/// answers for unknown questions and a score outside the scored phase.
fn repair(session: &mut Session) -> Result<(), &'static str> {
    session.check_questions()?;

    let count = session.quiz.len();
    session.answers.retain(|id, _| *id < count);
    if session.phase != Phase::Scored {
        session.score = None;
    }
    Ok(())
}

/// Owns the session and its snapshot store.
///
/// Every mutation is written through to the store; restart clears it. Store
/// failures are logged and otherwise ignored.
pub struct Machine<S> {
    session: Session,
    rules: Rules,
    store: S,
    rng: StdRng,
}

impl<S: SessionStore> Machine<S> {
    /// Loads the stored snapshot, or starts fresh in `mode` if there is none.
    ///
    /// Dispatch [`Event::Resume`] afterwards to restart fetches and countdowns
    /// of a restored session.
    pub fn new(mut store: S, rules: Rules, mode: Mode) -> Self {
        let session = match store.load() {
            Ok(Some(session)) => {
                info!("Restored {:?} session from snapshot", session.phase);
                session
            }
            Ok(None) => Session::new(mode),
            Err(e) => {
                warn!("Discarding unreadable session snapshot: {}", e);
                if let Err(e) = store.clear() {
                    warn!("Could not remove session snapshot: {}", e);
                }
                Session::new(mode)
            }
        };

        Self {
            session,
            rules,
            store,
            rng: StdRng::from_entropy(),
        }
    }

    /// Uses `rng` for choice shuffling instead of an entropy-seeded one.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Applies `event` and returns the effects left for the driver.
    pub fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        let session = std::mem::take(&mut self.session);
        let (session, effects) = transition(session, event, &self.rules, &mut self.rng);
        self.session = session;

        effects
            .into_iter()
            .filter(|effect| !self.persist(effect))
            .collect()
    }

    /// Handles persistence effects; returns false for any other effect.
    fn persist(&mut self, effect: &Effect) -> bool {
        let result = match effect {
            Effect::Persist => self.store.save(&self.session),
            Effect::ClearPersisted => self.store.clear(),
            _ => return false,
        };
        if let Err(e) = result {
            warn!("Session snapshot not updated: {}", e);
        }
        true
    }
}
