use std::future::Future;
use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::data::{DeckEntry, DeckError, load_deck_from_json};
use crate::models::{Mode, QuizBundle};

use super::{BackendError, QuizBackend};

/// Serves quizzes from a fixed deck of pre-generated entries.
#[derive(Debug, Clone)]
pub struct DeckBackend {
    entries: Vec<DeckEntry>,
}

impl DeckBackend {
    pub fn new(entries: Vec<DeckEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self, DeckError> {
        Ok(Self::new(load_deck_from_json(path)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Picks distinct entries for every image the mode needs and joins their
    /// quiz text.
    pub fn pick<R: Rng + ?Sized>(&self, mode: Mode, rng: &mut R) -> Result<QuizBundle, BackendError> {
        let needed = mode.image_count();
        if self.entries.len() < needed {
            return Err(BackendError::NotEnoughImages {
                needed,
                available: self.entries.len(),
            });
        }

        let chosen: Vec<&DeckEntry> = self.entries.choose_multiple(rng, needed).collect();
        log::debug!(
            "Picked {:?} for {}",
            chosen.iter().map(|e| e.description.as_str()).collect::<Vec<_>>(),
            mode
        );

        Ok(QuizBundle {
            images: chosen.iter().map(|e| e.image_url.clone()).collect(),
            raw_quiz: chosen
                .iter()
                .map(|e| e.quiz.trim())
                .collect::<Vec<_>>()
                .join("\n"),
        })
    }
}

impl QuizBackend for DeckBackend {
    fn generate(&self, mode: Mode) -> impl Future<Output = Result<QuizBundle, BackendError>> + Send {
        async move { self.pick(mode, &mut rand::thread_rng()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn deck(n: usize) -> DeckBackend {
        DeckBackend::new(
            (0..n)
                .map(|i| DeckEntry {
                    image_url: format!("https://img/{i}.jpg"),
                    description: format!("image {i}"),
                    quiz: format!("Q{i} - right - w1 - w2 - w3\n"),
                })
                .collect(),
        )
    }

    #[test]
    fn test_pick_returns_distinct_images_per_mode() {
        let mut rng = StdRng::seed_from_u64(11);
        let deck = deck(5);
        for mode in Mode::ALL {
            let bundle = deck.pick(mode, &mut rng).unwrap();
            assert_eq!(bundle.images.len(), mode.image_count());

            let mut unique = bundle.images.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), bundle.images.len());
            assert_eq!(bundle.raw_quiz.lines().count(), mode.image_count());
        }
    }

    #[test]
    fn test_small_deck_cannot_serve_four_images() {
        let mut rng = StdRng::seed_from_u64(11);
        let err = deck(3).pick(Mode::FourImage, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            BackendError::NotEnoughImages {
                needed: 4,
                available: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_generate_uses_deck() {
        let bundle = deck(1).generate(Mode::Basic).await.unwrap();
        assert_eq!(bundle.images, vec!["https://img/0.jpg".to_string()]);
        assert_eq!(bundle.raw_quiz, "Q0 - right - w1 - w2 - w3");
    }
}
