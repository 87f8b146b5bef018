/// Sentence generation: chain walks filtered for length and novelty.
///
/// A [`TextModel`] owns a trained chain and, optionally, the corpus it was
/// trained on. Whether novelty checking is possible is an explicit variant of
/// [`NoveltyCheck`], decided when the model is built.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::chain::{ChainError, MarkovChain};
use crate::core::config::{ConfigError, GenerationConfig};
use crate::core::novelty;
use crate::core::tokenizer::{generate_corpus, CorpusInput};
use crate::core::walker;
use crate::schema::corpus::Corpus;
use crate::schema::token::State;

/// State size used when none is configured.
pub const DEFAULT_STATE_SIZE: usize = 2;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("no input: provide text, lines, parsed sentences, or a prebuilt chain")]
    NoInput,
    #[error("chain uses state size {chain} but the model expects {model}")]
    StateSizeMismatch { model: usize, chain: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    RonEncode(#[from] ron::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Whether generated sentences can be checked against the source text.
#[derive(Debug, Clone, PartialEq)]
pub enum NoveltyCheck {
    /// The source corpus was retained; `rejoined` is derived from `corpus`.
    WithNoveltyCheck { corpus: Corpus, rejoined: String },
    /// Only the transition table is available.
    WithoutNoveltyCheck,
}

impl NoveltyCheck {
    fn retain(corpus: Corpus) -> Self {
        let rejoined = corpus.rejoined();
        Self::WithNoveltyCheck { corpus, rejoined }
    }
}

/// Serializable form of a whole model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub state_size: usize,
    pub chain: MarkovChain,
    /// Present only when the source corpus was retained.
    pub parsed_sentences: Option<Corpus>,
}

/// A trained text model that produces novel sentences.
#[derive(Debug, Clone)]
pub struct TextModel {
    state_size: usize,
    chain: MarkovChain,
    novelty: NoveltyCheck,
}

/// Builder for constructing a `TextModel`.
pub struct TextModelBuilder<'a> {
    state_size: Option<usize>,
    input: Option<CorpusInput<'a>>,
    parsed_sentences: Option<Corpus>,
    chain: Option<MarkovChain>,
    retain_original: bool,
}

impl TextModel {
    pub fn builder<'a>() -> TextModelBuilder<'a> {
        TextModelBuilder {
            state_size: None,
            input: None,
            parsed_sentences: None,
            chain: None,
            retain_original: true,
        }
    }

    /// Train on a block of text, keeping it for novelty checks.
    pub fn from_text(text: &str, state_size: usize) -> Result<Self, GeneratorError> {
        Self::builder().text(text).state_size(state_size).build()
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    pub fn chain(&self) -> &MarkovChain {
        &self.chain
    }

    pub fn novelty(&self) -> &NoveltyCheck {
        &self.novelty
    }

    pub fn rejoined_text(&self) -> Option<&str> {
        match &self.novelty {
            NoveltyCheck::WithNoveltyCheck { rejoined, .. } => Some(rejoined),
            NoveltyCheck::WithoutNoveltyCheck => None,
        }
    }

    pub fn parsed_sentences(&self) -> Option<&Corpus> {
        match &self.novelty {
            NoveltyCheck::WithNoveltyCheck { corpus, .. } => Some(corpus),
            NoveltyCheck::WithoutNoveltyCheck => None,
        }
    }

    /// Generate one sentence, or `Ok(None)` if every try was rejected.
    ///
    /// With `init_state`, the walk starts there and the state's words (minus
    /// leading BEGIN padding) become the start of the sentence. Candidates
    /// longer than `max_words`, or too close to the source text, use up a
    /// try. An `init_state` the chain has never seen is an error.
    pub fn make_sentence<R: Rng + ?Sized>(
        &self,
        init_state: Option<&State>,
        config: &GenerationConfig,
        rng: &mut R,
    ) -> Result<Option<String>, GeneratorError> {
        let prefix = init_state.map(State::word_prefix).unwrap_or_default();
        self.generate(init_state, &prefix, config, rng)
    }

    /// Retry loop shared by the public entry points. `prefix` is prepended to
    /// every walk and counts toward the length and novelty checks.
    fn generate<R: Rng + ?Sized>(
        &self,
        init_state: Option<&State>,
        prefix: &[String],
        config: &GenerationConfig,
        rng: &mut R,
    ) -> Result<Option<String>, GeneratorError> {
        config.validate()?;

        for attempt in 0..config.tries {
            let walked = match walker::walk(&self.chain, init_state, config.max_walk_length, rng) {
                Ok(words) => words,
                Err(ChainError::WalkTooLong(max)) => {
                    tracing::debug!(attempt, max, "walk too long, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let mut words = prefix.to_vec();
            words.extend(walked);

            if let Some(max_words) = config.max_words {
                if words.len() > max_words {
                    tracing::trace!(attempt, len = words.len(), max_words, "too many words");
                    continue;
                }
            }

            match &self.novelty {
                NoveltyCheck::WithNoveltyCheck { rejoined, .. } if config.test_output => {
                    if novelty::accept(
                        &words,
                        config.max_overlap_ratio,
                        config.max_overlap_total,
                        rejoined,
                    ) {
                        return Ok(Some(words.join(" ")));
                    }
                    tracing::trace!(attempt, "rejected as too close to source");
                }
                _ => return Ok(Some(words.join(" "))),
            }
        }

        tracing::debug!(tries = config.tries, "no acceptable sentence");
        Ok(None)
    }

    /// Generate a sentence starting with `start`, padded with BEGIN if shorter
    /// than the state size.
    ///
    /// A start longer than the state size is kept whole in the output, but
    /// only its last `state_size` words seed the walk. `max_words` and the
    /// novelty check apply to the full sentence, leading words included.
    pub fn make_sentence_with_start<S: AsRef<str>, R: Rng + ?Sized>(
        &self,
        start: &[S],
        config: &GenerationConfig,
        rng: &mut R,
    ) -> Result<Option<String>, GeneratorError> {
        let state = State::with_prefix(start, self.state_size);
        let prefix: Vec<String> = start.iter().map(|w| w.as_ref().to_string()).collect();
        self.generate(Some(&state), &prefix, config, rng)
    }

    /// Generate a sentence whose length in characters is within
    /// `[min_chars, max_chars]`, calling [`Self::make_sentence`] up to
    /// `config.tries` times.
    pub fn make_short_sentence<R: Rng + ?Sized>(
        &self,
        max_chars: usize,
        min_chars: usize,
        config: &GenerationConfig,
        rng: &mut R,
    ) -> Result<Option<String>, GeneratorError> {
        for _ in 0..config.tries {
            if let Some(sentence) = self.make_sentence(None, config, rng)? {
                let len = sentence.chars().count();
                if !sentence.is_empty() && (min_chars..=max_chars).contains(&len) {
                    return Ok(Some(sentence));
                }
            }
        }
        Ok(None)
    }

    pub fn to_snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            state_size: self.state_size,
            chain: self.chain.clone(),
            parsed_sentences: self.parsed_sentences().cloned(),
        }
    }

    /// Rebuild a model from a snapshot without retraining.
    pub fn from_snapshot(snapshot: ModelSnapshot) -> Result<Self, GeneratorError> {
        let mut builder = Self::builder()
            .state_size(snapshot.state_size)
            .chain(snapshot.chain);
        if let Some(sentences) = snapshot.parsed_sentences {
            builder = builder.parsed_sentences(sentences);
        }
        builder.build()
    }

    pub fn to_json(&self) -> Result<String, GeneratorError> {
        Ok(serde_json::to_string(&self.to_snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Self, GeneratorError> {
        let snapshot: ModelSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }
}

impl<'a> TextModelBuilder<'a> {
    pub fn state_size(mut self, state_size: usize) -> Self {
        self.state_size = Some(state_size);
        self
    }

    /// Train on one block of text.
    pub fn text(mut self, text: &'a str) -> Self {
        self.input = Some(CorpusInput::Text(text));
        self
    }

    /// Train on independent lines of text.
    pub fn lines(mut self, lines: impl Into<CorpusInput<'a>>) -> Self {
        self.input = Some(lines.into());
        self
    }

    /// Train on an already tokenized corpus. Takes precedence over raw text.
    pub fn parsed_sentences(mut self, corpus: Corpus) -> Self {
        self.parsed_sentences = Some(corpus);
        self
    }

    /// Reuse a trained chain instead of building one.
    pub fn chain(mut self, chain: MarkovChain) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Keep the source corpus for novelty checks (default: true).
    pub fn retain_original(mut self, retain: bool) -> Self {
        self.retain_original = retain;
        self
    }

    pub fn build(self) -> Result<TextModel, GeneratorError> {
        let corpus = match (self.parsed_sentences, self.input) {
            (Some(corpus), _) => Some(corpus),
            (None, Some(input)) => Some(generate_corpus(input)),
            (None, None) => None,
        };

        let chain = match self.chain {
            Some(chain) => {
                if let Some(model) = self.state_size {
                    if model != chain.state_size() {
                        return Err(GeneratorError::StateSizeMismatch {
                            model,
                            chain: chain.state_size(),
                        });
                    }
                }
                chain
            }
            None => {
                let corpus = corpus.as_ref().ok_or(GeneratorError::NoInput)?;
                MarkovChain::build(corpus, self.state_size.unwrap_or(DEFAULT_STATE_SIZE))?
            }
        };

        let novelty = match corpus {
            Some(corpus) if self.retain_original => NoveltyCheck::retain(corpus),
            _ => NoveltyCheck::WithoutNoveltyCheck,
        };

        tracing::debug!(
            state_size = chain.state_size(),
            states = chain.len(),
            novelty_check = matches!(novelty, NoveltyCheck::WithNoveltyCheck { .. }),
            "text model ready"
        );

        Ok(TextModel {
            state_size: chain.state_size(),
            chain,
            novelty,
        })
    }
}

/// Save a model snapshot to a RON file.
pub fn save_model(model: &TextModel, path: &Path) -> Result<(), GeneratorError> {
    let serialized =
        ron::ser::to_string_pretty(&model.to_snapshot(), ron::ser::PrettyConfig::default())?;
    std::fs::write(path, serialized)?;
    Ok(())
}

/// Load a model snapshot from a RON file.
pub fn load_model(path: &Path) -> Result<TextModel, GeneratorError> {
    let contents = std::fs::read_to_string(path)?;
    let snapshot: ModelSnapshot = ron::from_str(&contents)?;
    TextModel::from_snapshot(snapshot)
}
