//! Offline image/quiz deck loaded from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One image with the quiz text generated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    /// Raw quiz lines in the generator's `prompt - correct - wrong...` format.
    pub quiz: String,
}

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("{0} must contain at least one entry")]
    Empty(String),
}

/// Loads a deck from a JSON array of [`DeckEntry`].
pub fn load_deck_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<DeckEntry>, DeckError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let json = fs::read_to_string(path).map_err(|source| DeckError::Read {
        path: display.clone(),
        source,
    })?;

    let entries: Vec<DeckEntry> = serde_json::from_str(&json).map_err(|source| DeckError::Parse {
        path: display.clone(),
        source,
    })?;

    if entries.is_empty() {
        return Err(DeckError::Empty(display));
    }

    log::info!("Loaded {} deck entries from {}", entries.len(), display);
    Ok(entries)
}
