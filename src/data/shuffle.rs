use rand::Rng;
use rand::seq::SliceRandom;

use crate::models::NUM_CHOICES;

/// Returns a uniformly random permutation of `choices`.
///
/// The input is left untouched; the shuffled copy is what gets stored on the
/// question.
pub fn shuffle_choices<R: Rng + ?Sized>(
    choices: &[String; NUM_CHOICES],
    rng: &mut R,
) -> [String; NUM_CHOICES] {
    let mut shuffled = choices.clone();
    shuffled.shuffle(rng);
    shuffled
}
