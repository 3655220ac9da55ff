mod bundle;
mod mode;
mod question;

pub use bundle::QuizBundle;
pub use mode::Mode;
pub use question::{NUM_CHOICES, Question};
