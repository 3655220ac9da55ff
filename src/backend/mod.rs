//! Sources of images and generated quiz text.

mod deck;
mod remote;

use std::future::Future;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::models::{Mode, QuizBundle};

pub use deck::DeckBackend;
pub use remote::RemoteBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("could not reach quiz service: {0}")]
    Connection(#[from] tungstenite::Error),
    #[error("quiz service did not answer within {0:?}")]
    Timeout(std::time::Duration),
    #[error("quiz service closed the connection")]
    Closed,
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unexpected reply from quiz service")]
    UnexpectedReply,
    #[error("quiz service error: {0}")]
    Service(String),
    #[error("could not fetch enough valid images ({available} of {needed})")]
    NotEnoughImages { needed: usize, available: usize },
}

/// Produces images and quiz text for a mode.
pub trait QuizBackend: Send + Sync + 'static {
    fn generate(&self, mode: Mode) -> impl Future<Output = Result<QuizBundle, BackendError>> + Send;
}
