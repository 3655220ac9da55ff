mod deck;
mod parser;
mod shuffle;

pub use deck::{DeckEntry, DeckError, load_deck_from_json};
pub use parser::{DELIMITER, ERROR_SENTINEL, ParsedQuiz, RejectedLine, parse_quiz, parse_quiz_with};
pub use shuffle::shuffle_choices;
