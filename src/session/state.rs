//! The session record and its phases.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Mode, Question};

/// Phase of a play-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the player to start.
    #[default]
    Idle,
    /// Waiting for images and quiz text.
    Loading,
    /// Images are on screen.
    Revealing,
    /// Player is answering questions.
    Answering,
    /// Final score is known.
    Scored,
}

/// Which countdown a tick belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// Per-image reveal window.
    Reveal,
    /// Answering time limit in timed mode.
    Answer,
}

/// Everything about one play-through, from mode selection to score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub phase: Phase,
    pub mode: Mode,
    pub images: Vec<String>,
    /// Questions in presentation order; `quiz[i].id == i`.
    pub quiz: Vec<Question>,
    /// Chosen answer per question id. Unanswered questions are absent.
    pub answers: BTreeMap<usize, String>,
    /// Set exactly once, when the session is scored.
    pub score: Option<usize>,
    pub current_question_index: usize,
    pub current_image_index: usize,
    pub reveal_seconds_remaining: u32,
    /// Only set in timed mode once answering has begun.
    pub answer_seconds_remaining: Option<u32>,
    /// Fetch attempt currently in flight (1-based, 0 before the first).
    pub attempt: u32,
    /// Progress message for the player. Not persisted.
    #[serde(skip)]
    pub status: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

impl Session {
    pub fn new(mode: Mode) -> Self {
        Self {
            phase: Phase::Idle,
            mode,
            images: Vec::new(),
            quiz: Vec::new(),
            answers: BTreeMap::new(),
            score: None,
            current_question_index: 0,
            current_image_index: 0,
            reveal_seconds_remaining: 0,
            answer_seconds_remaining: None,
            attempt: 0,
            status: String::new(),
        }
    }

    /// Discards everything but the selected mode.
    pub fn reset(&mut self) {
        *self = Self::new(self.mode);
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.get(self.current_question_index)
    }

    pub fn current_image(&self) -> Option<&str> {
        self.images.get(self.current_image_index).map(String::as_str)
    }

    pub fn answer_for(&self, question_id: usize) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    pub fn is_last_question(&self) -> bool {
        self.current_question_index + 1 >= self.quiz.len()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Countdown that should be running in the current phase, if any.
    pub fn active_countdown(&self) -> Option<Countdown> {
        match self.phase {
            Phase::Revealing => Some(Countdown::Reveal),
            Phase::Answering if self.answer_seconds_remaining.is_some() => Some(Countdown::Answer),
            _ => None,
        }
    }

    /// Checks that question ids run from 0 and every correct answer is
    /// one of its choices.
    pub fn check_questions(&self) -> Result<(), &'static str> {
        if self.quiz.iter().enumerate().any(|(i, q)| q.id != i) {
            return Err("question ids are not contiguous from 0");
        }
        if self.quiz.iter().any(|q| !q.has_choice(&q.correct_answer)) {
            return Err("correct answer missing from choices");
        }
        Ok(())
    }

    /// Checks the structural invariants of the record.
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        self.check_questions()?;
        if self.answers.len() > self.quiz.len() {
            return Err("more answers than questions");
        }
        if self.score.is_some() != (self.phase == Phase::Scored) {
            return Err("score must be set exactly when scored");
        }
        match self.phase {
            Phase::Revealing if self.current_image_index >= self.images.len() => {
                Err("image index out of range")
            }
            Phase::Revealing if self.quiz.is_empty() => Err("revealing without a quiz"),
            Phase::Answering if self.current_question_index >= self.quiz.len() => {
                Err("question index out of range")
            }
            Phase::Scored if self.quiz.is_empty() => Err("scored without a quiz"),
            _ => Ok(()),
        }
    }
}
