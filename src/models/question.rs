use serde::{Deserialize, Serialize};

/// Number of answer choices every question carries.
pub const NUM_CHOICES: usize = 4;

/// A single multiple-choice question.
///
/// `choices` is shuffled once when the question is parsed and never
/// reordered afterwards, so the options stay put between redraws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: usize,
    pub prompt: String,
    pub choices: [String; NUM_CHOICES],
    pub correct_answer: String,
}

impl Question {
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }

    pub fn has_choice(&self, choice: &str) -> bool {
        self.choices.iter().any(|c| c == choice)
    }

    /// Index of `choice` in the presented order.
    pub fn choice_index(&self, choice: &str) -> Option<usize> {
        self.choices.iter().position(|c| c == choice)
    }
}
