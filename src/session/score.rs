//! Scoring and result review.

use std::collections::BTreeMap;

use crate::models::Question;

/// Counts questions whose recorded answer equals the correct answer.
///
/// Unanswered questions never match; answers keyed by ids that are not in
/// `quiz` are ignored.
pub fn score(quiz: &[Question], answers: &BTreeMap<usize, String>) -> usize {
    quiz.iter()
        .filter(|q| answers.get(&q.id).is_some_and(|a| q.is_correct(a)))
        .count()
}

/// One line of the results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub prompt: String,
    pub correct_answer: String,
    pub your_answer: Option<String>,
    pub is_correct: bool,
}

pub fn review(quiz: &[Question], answers: &BTreeMap<usize, String>) -> Vec<QuestionReview> {
    quiz.iter()
        .map(|q| {
            let your_answer = answers.get(&q.id).cloned();
            QuestionReview {
                prompt: q.prompt.clone(),
                correct_answer: q.correct_answer.clone(),
                is_correct: your_answer.as_deref().is_some_and(|a| q.is_correct(a)),
                your_answer,
            }
        })
        .collect()
}
