use serde::{Deserialize, Serialize};

/// What a quiz source hands back: the images to reveal and the raw quiz text
/// generated for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizBundle {
    pub images: Vec<String>,
    pub raw_quiz: String,
}
