use thiserror::Error;

use crate::data::DeckError;

/// Error type for setting up and running the game or the quiz service.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to load deck: {0}")]
    Deck(#[from] DeckError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
