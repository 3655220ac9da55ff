//! Parser for generated quiz text.
//!
//! The quiz generator answers with one question per line:
//!
//! ```text
//! What object is in the upper right corner? - A bird - A lamp - A tree - A cloud
//! ```
//!
//! The first choice is the correct one. Choices are shuffled as each line is
//! accepted.

use log::warn;
use rand::Rng;

use crate::models::{NUM_CHOICES, Question};

use super::shuffle::shuffle_choices;

/// Prefix the generator uses to report that it could not build a quiz.
pub const ERROR_SENTINEL: &str = "ERROR";

/// Separator between the prompt and the choices on a line.
pub const DELIMITER: &str = " - ";

const SEGMENTS_PER_LINE: usize = 1 + NUM_CHOICES;

/// A line that was dropped while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// 1-based line number in the raw text.
    pub line_number: usize,
    pub segments: usize,
    pub text: String,
}

/// Result of parsing a quiz blob.
#[derive(Debug, Clone, Default)]
pub struct ParsedQuiz {
    pub questions: Vec<Question>,
    pub rejected: Vec<RejectedLine>,
}

/// Parses `raw` with the thread-local RNG for choice shuffling.
pub fn parse_quiz(raw: &str) -> Vec<Question> {
    parse_quiz_with(raw, &mut rand::thread_rng()).questions
}

/// Parses `raw`, shuffling choices with `rng`.
///
/// Never fails: malformed lines are skipped with a warning and reported in
/// [`ParsedQuiz::rejected`]. Question ids count accepted lines only.
pub fn parse_quiz_with<R: Rng + ?Sized>(raw: &str, rng: &mut R) -> ParsedQuiz {
    let mut parsed = ParsedQuiz::default();

    if raw.trim().is_empty() {
        return parsed;
    }
    if raw.trim_start().starts_with(ERROR_SENTINEL) {
        warn!("Quiz source reported an error: {}", first_line(raw));
        return parsed;
    }

    for (index, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let segments: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
        if segments.len() != SEGMENTS_PER_LINE {
            warn!(
                "Skipping quiz line {}: expected {} segments, found {}",
                index + 1,
                SEGMENTS_PER_LINE,
                segments.len()
            );
            parsed.rejected.push(RejectedLine {
                line_number: index + 1,
                segments: segments.len(),
                text: line.to_string(),
            });
            continue;
        }

        let choices: [String; NUM_CHOICES] =
            std::array::from_fn(|i| segments[i + 1].to_string());
        parsed.questions.push(Question {
            id: parsed.questions.len(),
            prompt: segments[0].to_string(),
            correct_answer: choices[0].clone(),
            choices: shuffle_choices(&choices, rng),
        });
    }

    parsed
}

fn first_line(raw: &str) -> &str {
    raw.trim_start().lines().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn parse(raw: &str) -> ParsedQuiz {
        parse_quiz_with(raw, &mut StdRng::seed_from_u64(9))
    }

    fn sorted(choices: &[String]) -> Vec<&str> {
        let mut v: Vec<&str> = choices.iter().map(String::as_str).collect();
        v.sort();
        v
    }

    #[test]
    fn test_single_line() {
        let parsed = parse("Q1 - A - B - C - D");
        assert_eq!(parsed.questions.len(), 1);

        let q = &parsed.questions[0];
        assert_eq!(q.id, 0);
        assert_eq!(q.prompt, "Q1");
        assert_eq!(q.correct_answer, "A");
        assert_eq!(sorted(&q.choices), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let parsed = parse("malformed line\nQ1 - A - B - C - D");
        assert_eq!(parsed.questions.len(), 1);
        assert_eq!(parsed.questions[0].id, 0);
        assert_eq!(parsed.rejected.len(), 1);
        assert_eq!(parsed.rejected[0].line_number, 1);
        assert_eq!(parsed.rejected[0].segments, 1);
    }

    #[test]
    fn test_error_sentinel_yields_nothing() {
        let parsed = parse("ERROR: upstream failure");
        assert!(parsed.questions.is_empty());
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(parse("").questions.is_empty());
        assert!(parse("   \n\n  \t\n").questions.is_empty());
    }

    #[test]
    fn test_ids_are_contiguous_over_valid_lines() {
        let raw = "Q0 - a - b - c - d\n\
                   too - few - parts\n\
                   \n\
                   Q1 - a - b - c - d\n\
                   Q? - a - b - c - d - e\n\
                   Q2 - a - b - c - d";
        let parsed = parse(raw);
        let ids: Vec<usize> = parsed.questions.iter().map(|q| q.id).collect();
        let prompts: Vec<&str> = parsed.questions.iter().map(|q| q.prompt.as_str()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(prompts, vec!["Q0", "Q1", "Q2"]);
        assert_eq!(parsed.rejected.len(), 2);
    }

    #[test]
    fn test_segments_are_trimmed() {
        let parsed = parse("  What is it?   -   A bird  - A lamp -  A tree -A cloud - x");
        // "-A cloud" is not a delimiter, so this is 5 segments
        assert_eq!(parsed.questions.len(), 1);
        let q = &parsed.questions[0];
        assert_eq!(q.prompt, "What is it?");
        assert_eq!(q.correct_answer, "A bird");
        assert!(q.has_choice("A tree -A cloud"));
    }

    #[test]
    fn test_windows_line_endings() {
        let parsed = parse("Q0 - a - b - c - d\r\nQ1 - e - f - g - h\r\n");
        assert_eq!(parsed.questions.len(), 2);
        assert_eq!(parsed.questions[1].correct_answer, "e");
    }

    #[test]
    fn test_duplicate_choices_are_accepted() {
        let parsed = parse("Q - same - same - other - same");
        let q = &parsed.questions[0];
        assert_eq!(q.correct_answer, "same");
        assert_eq!(sorted(&q.choices), vec!["other", "same", "same", "same"]);
    }

    #[test]
    fn test_correct_answer_is_always_a_choice() {
        let raw = (0..50)
            .map(|i| format!("Q{i} - right{i} - w1 - w2 - w3"))
            .collect::<Vec<_>>()
            .join("\n");
        for q in parse(&raw).questions {
            assert!(q.has_choice(&q.correct_answer));
        }
    }

    #[test]
    fn test_output_never_exceeds_non_blank_lines() {
        let inputs = [
            "",
            "x",
            "a - b\n\n c - d - e - f - g",
            "ERROR",
            " - - - - ",
            "Q - A - B - C - D\nQ - A - B - C - D\n\n",
        ];
        for raw in inputs {
            let non_blank = raw.lines().filter(|l| !l.trim().is_empty()).count();
            assert!(parse(raw).questions.len() <= non_blank, "input: {raw:?}");
        }
    }
}
