/// Markov chain transition table — training, sampling, and serialization.

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::schema::corpus::Corpus;
use crate::schema::token::{State, Token};

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("unknown state: {0}")]
    UnknownState(State),
    #[error("corpus contains no usable sentences")]
    EmptyCorpus,
    #[error("state size must be at least 1")]
    InvalidStateSize,
    #[error("state has {found} tokens but the model uses {expected}")]
    StateSizeMismatch { expected: usize, found: usize },
    #[error("walk exceeded {0} tokens without reaching a sentence end")]
    WalkTooLong(usize),
    #[error("invalid serialized model: {0}")]
    InvalidModel(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    RonEncode(#[from] ron::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Next-token counts observed after one state.
pub type FollowDistribution = BTreeMap<Token, u32>;

/// Persisted form of a chain: `(state, [(token, count)])` pairs sorted by state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedChain {
    pub state_size: usize,
    pub entries: Vec<(State, Vec<(Token, u32)>)>,
}

/// A finite-order Markov chain over words with BEGIN/END sentinels.
///
/// The table is only written by [`MarkovChain::build`]; afterwards it is
/// read-only and can be shared freely between generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SerializedChain", try_from = "SerializedChain")]
pub struct MarkovChain {
    state_size: usize,
    model: FxHashMap<State, FollowDistribution>,
}

impl MarkovChain {
    /// Train a chain on `corpus` with windows of `state_size` tokens.
    ///
    /// Each run is padded as `[BEGIN; state_size] + words + [END]` and
    /// contributes `len + 1` observations.
    pub fn build(corpus: &Corpus, state_size: usize) -> Result<Self, ChainError> {
        if state_size == 0 {
            return Err(ChainError::InvalidStateSize);
        }
        if corpus.runs().iter().all(Vec::is_empty) {
            return Err(ChainError::EmptyCorpus);
        }

        let mut model: FxHashMap<State, FollowDistribution> = FxHashMap::default();

        for run in corpus.runs() {
            let mut padded = vec![Token::Begin; state_size];
            padded.extend(run.iter().map(|w| Token::word(w.as_str())));
            padded.push(Token::End);

            for window in padded.windows(state_size + 1) {
                let state = State::from_tokens(window[..state_size].to_vec());
                let follow = window[state_size].clone();
                *model.entry(state).or_default().entry(follow).or_insert(0) += 1;
            }
        }

        tracing::debug!(
            runs = corpus.len(),
            states = model.len(),
            state_size,
            "built markov chain"
        );

        Ok(Self { state_size, model })
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    /// Number of distinct states.
    pub fn len(&self) -> usize {
        self.model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }

    /// Number of distinct (state, next token) pairs.
    pub fn transition_count(&self) -> usize {
        self.model.values().map(BTreeMap::len).sum()
    }

    pub fn contains_state(&self, state: &State) -> bool {
        self.model.contains_key(state)
    }

    pub fn follow_distribution(&self, state: &State) -> Option<&FollowDistribution> {
        self.model.get(state)
    }

    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.model.keys()
    }

    /// The all-BEGIN state sized for this chain.
    pub fn begin_state(&self) -> State {
        State::begin(self.state_size)
    }

    /// Pick the next token after `state`, weighted by occurrence count.
    ///
    /// A token seen ten times is ten times as likely as one seen once.
    pub fn next_token<R: Rng + ?Sized>(
        &self,
        state: &State,
        rng: &mut R,
    ) -> Result<Token, ChainError> {
        let dist = self
            .model
            .get(state)
            .ok_or_else(|| ChainError::UnknownState(state.clone()))?;

        let weights: Vec<u32> = dist.values().copied().collect();
        let index =
            WeightedIndex::new(&weights).map_err(|e| ChainError::InvalidModel(e.to_string()))?;
        let pick = index.sample(rng);

        dist.keys()
            .nth(pick)
            .cloned()
            .ok_or_else(|| ChainError::UnknownState(state.clone()))
    }

    /// Convert to the ordered `(state, distribution)` list form.
    pub fn to_serialized(&self) -> SerializedChain {
        let mut entries: Vec<(State, Vec<(Token, u32)>)> = self
            .model
            .iter()
            .map(|(state, dist)| {
                let follows = dist.iter().map(|(t, c)| (t.clone(), *c)).collect();
                (state.clone(), follows)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        SerializedChain {
            state_size: self.state_size,
            entries,
        }
    }

    /// Rebuild a chain from its serialized form, validating every entry.
    pub fn from_serialized(serialized: SerializedChain) -> Result<Self, ChainError> {
        let state_size = serialized.state_size;
        if state_size == 0 {
            return Err(ChainError::InvalidStateSize);
        }

        if serialized.entries.is_empty() {
            return Err(ChainError::InvalidModel("table has no states".to_string()));
        }

        let mut model: FxHashMap<State, FollowDistribution> = FxHashMap::default();
        for (state, follows) in serialized.entries {
            if state.len() != state_size {
                return Err(ChainError::InvalidModel(format!(
                    "state {} has {} tokens, expected {}",
                    state,
                    state.len(),
                    state_size
                )));
            }
            // BEGIN padding only leads a state; END never appears in one.
            let mut after_padding = state.tokens().iter().skip_while(|t| **t == Token::Begin);
            if after_padding.any(Token::is_sentinel) {
                return Err(ChainError::InvalidModel(format!(
                    "state {} has a misplaced sentinel",
                    state
                )));
            }
            if follows.is_empty() {
                return Err(ChainError::InvalidModel(format!(
                    "state {} has no follow tokens",
                    state
                )));
            }

            let mut dist = FollowDistribution::new();
            for (token, count) in follows {
                if token == Token::Begin {
                    return Err(ChainError::InvalidModel(format!(
                        "BEGIN cannot follow {}",
                        state
                    )));
                }
                if count == 0 {
                    return Err(ChainError::InvalidModel(format!(
                        "zero count for {} after {}",
                        token, state
                    )));
                }
                if dist.insert(token.clone(), count).is_some() {
                    return Err(ChainError::InvalidModel(format!(
                        "duplicate follow token {} after {}",
                        token, state
                    )));
                }
            }

            if model.contains_key(&state) {
                return Err(ChainError::InvalidModel(format!("duplicate state {}", state)));
            }
            model.insert(state, dist);
        }

        if !model.contains_key(&State::begin(state_size)) {
            return Err(ChainError::InvalidModel(
                "table has no all-BEGIN state".to_string(),
            ));
        }

        Ok(Self { state_size, model })
    }

    pub fn to_json(&self) -> Result<String, ChainError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ChainError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Words that can start a sentence, i.e. tokens following the all-BEGIN state.
    pub fn sentence_starts(&self) -> FxHashSet<&str> {
        self.model
            .get(&self.begin_state())
            .map(|dist| dist.keys().filter_map(Token::as_word).collect())
            .unwrap_or_default()
    }
}

impl From<MarkovChain> for SerializedChain {
    fn from(chain: MarkovChain) -> Self {
        chain.to_serialized()
    }
}

impl TryFrom<SerializedChain> for MarkovChain {
    type Error = ChainError;

    fn try_from(serialized: SerializedChain) -> Result<Self, Self::Error> {
        Self::from_serialized(serialized)
    }
}

/// Save a chain to a RON file.
pub fn save_chain(chain: &MarkovChain, path: &Path) -> Result<(), ChainError> {
    let serialized = ron::ser::to_string_pretty(chain, ron::ser::PrettyConfig::default())?;
    std::fs::write(path, serialized)?;
    Ok(())
}

/// Load a chain from a RON file.
pub fn load_chain(path: &Path) -> Result<MarkovChain, ChainError> {
    let contents = std::fs::read_to_string(path)?;
    let chain: MarkovChain = ron::from_str(&contents)?;
    Ok(chain)
}
