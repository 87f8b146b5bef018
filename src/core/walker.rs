/// Random walks over a trained chain.

use rand::Rng;

use crate::core::chain::{ChainError, MarkovChain};
use crate::schema::token::{State, Token};

/// Upper bound on walk length before a walk is abandoned.
pub const DEFAULT_MAX_WALK_LENGTH: usize = 10_000;

/// A single lazy walk from a start state to the END sentinel.
///
/// Yields one word per step. The iterator is fused: after END, or after the
/// first error, it only returns `None`. A finished walk cannot be restarted;
/// start a new one with [`Walk::new`].
pub struct Walk<'a, R: Rng + ?Sized> {
    chain: &'a MarkovChain,
    rng: &'a mut R,
    state: State,
    emitted: usize,
    max_length: Option<usize>,
    done: bool,
}

impl<'a, R: Rng + ?Sized> Walk<'a, R> {
    /// Start a walk at `init_state`, or at the all-BEGIN state when `None`.
    pub fn new(
        chain: &'a MarkovChain,
        init_state: Option<&State>,
        rng: &'a mut R,
    ) -> Result<Self, ChainError> {
        let state = match init_state {
            Some(state) if state.len() != chain.state_size() => {
                return Err(ChainError::StateSizeMismatch {
                    expected: chain.state_size(),
                    found: state.len(),
                });
            }
            Some(state) => state.clone(),
            None => chain.begin_state(),
        };

        Ok(Self {
            chain,
            rng,
            state,
            emitted: 0,
            max_length: Some(DEFAULT_MAX_WALK_LENGTH),
            done: false,
        })
    }

    /// Override the length cap. `None` walks until END no matter how long.
    pub fn with_max_length(mut self, max_length: Option<usize>) -> Self {
        self.max_length = max_length;
        self
    }
}

impl<R: Rng + ?Sized> Iterator for Walk<'_, R> {
    type Item = Result<String, ChainError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let next = match self.chain.next_token(&self.state, &mut *self.rng) {
            Ok(token) => token,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        let word = match next {
            Token::End => {
                self.done = true;
                return None;
            }
            Token::Word(ref w) => w.clone(),
            Token::Begin => {
                self.done = true;
                return Some(Err(ChainError::InvalidModel(format!(
                    "BEGIN follows state {}",
                    self.state
                ))));
            }
        };

        if let Some(max) = self.max_length {
            if self.emitted >= max {
                self.done = true;
                return Some(Err(ChainError::WalkTooLong(max)));
            }
        }

        self.emitted += 1;
        self.state = self.state.advance(next);
        Some(Ok(word))
    }
}

/// Collect one full walk into a word list.
pub fn walk<R: Rng + ?Sized>(
    chain: &MarkovChain,
    init_state: Option<&State>,
    max_length: Option<usize>,
    rng: &mut R,
) -> Result<Vec<String>, ChainError> {
    Walk::new(chain, init_state, rng)?
        .with_max_length(max_length)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::corpus::Corpus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn chain(sentences: &[&str], state_size: usize) -> MarkovChain {
        let corpus: Corpus = sentences
            .iter()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .collect();
        MarkovChain::build(&corpus, state_size).unwrap()
    }

    #[test]
    fn walk_reproduces_single_sentence() {
        let chain = chain(&["the only sentence here"], 2);
        let mut rng = StdRng::seed_from_u64(42);
        let words = walk(&chain, None, None, &mut rng).unwrap();
        assert_eq!(words, vec!["the", "only", "sentence", "here"]);
    }

    #[test]
    fn walk_starts_with_the_and_ends_on_mat_or_rug() {
        let chain = chain(&["the cat sat on the mat", "the dog sat on the rug"], 2);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let words = walk(&chain, None, Some(100), &mut rng).unwrap();
            assert_eq!(words[0], "the");
            let last = words.last().unwrap();
            assert!(last == "mat" || last == "rug", "ended on {last}");
            assert_eq!(words[words.len() - 2], "the");
            assert_eq!(words[words.len() - 3], "on");
        }
    }

    #[test]
    fn walk_from_custom_state() {
        let chain = chain(&["the cat sat on the mat"], 2);
        let mut rng = StdRng::seed_from_u64(1);
        let state = State::from_words(&["sat", "on"]);
        let words = walk(&chain, Some(&state), None, &mut rng).unwrap();
        assert_eq!(words, vec!["the", "mat"]);
    }

    #[test]
    fn walk_rejects_wrong_state_width() {
        let chain = chain(&["a b c"], 2);
        let mut rng = StdRng::seed_from_u64(1);
        let state = State::from_words(&["a"]);
        let result = walk(&chain, Some(&state), None, &mut rng);
        assert!(matches!(
            result,
            Err(ChainError::StateSizeMismatch { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn walk_from_unknown_state_errors() {
        let chain = chain(&["a b c"], 1);
        let mut rng = StdRng::seed_from_u64(1);
        let state = State::from_words(&["zzz"]);
        let result = walk(&chain, Some(&state), None, &mut rng);
        assert!(matches!(result, Err(ChainError::UnknownState(_))));
    }

    #[test]
    fn walk_too_long_is_reported() {
        let chain = chain(&["one two three four five six"], 1);
        let mut rng = StdRng::seed_from_u64(1);
        let result = walk(&chain, None, Some(3), &mut rng);
        assert!(matches!(result, Err(ChainError::WalkTooLong(3))));
    }

    #[test]
    fn walk_at_cap_length_succeeds() {
        let chain = chain(&["one two three"], 1);
        let mut rng = StdRng::seed_from_u64(1);
        let words = walk(&chain, None, Some(3), &mut rng).unwrap();
        assert_eq!(words.len(), 3);
    }

    #[test]
    fn walk_is_fused_after_end() {
        let chain = chain(&["just two"], 1);
        let mut rng = StdRng::seed_from_u64(1);
        let mut it = Walk::new(&chain, None, &mut rng).unwrap();
        assert_eq!(it.next().unwrap().unwrap(), "just");
        assert_eq!(it.next().unwrap().unwrap(), "two");
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }
}
