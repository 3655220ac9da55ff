//! Quiz session: record, state machine, scoring and persistence.

mod machine;
mod score;
mod state;
mod store;

pub use machine::{Effect, Event, Machine, transition};
pub use score::{QuestionReview, review, score};
pub use state::{Countdown, Phase, Session};
pub use store::{JsonFileStore, MemoryStore, SessionStore, StoreError};
