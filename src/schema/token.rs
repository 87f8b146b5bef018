/// Chain tokens and fixed-width chain states.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single position in a padded run: a corpus word or a boundary sentinel.
///
/// Sentinels are variants rather than reserved strings, so no corpus word can
/// ever be mistaken for a sentence boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Token {
    /// Padding before the first word of every run.
    Begin,
    /// Terminal marker after the last word of every run.
    End,
    Word(String),
}

impl Token {
    pub fn word(word: impl Into<String>) -> Self {
        Self::Word(word.into())
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Begin | Self::End)
    }

    pub fn as_word(&self) -> Option<&str> {
        match self {
            Self::Word(w) => Some(w),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Begin => f.write_str("<BEGIN>"),
            Self::End => f.write_str("<END>"),
            Self::Word(w) => f.write_str(w),
        }
    }
}

/// The window of preceding tokens used to look up the next-token distribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct State(Vec<Token>);

impl State {
    /// The all-BEGIN state every walk starts from by default.
    pub fn begin(size: usize) -> Self {
        Self(vec![Token::Begin; size])
    }

    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }

    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Self {
        Self(words.iter().map(|w| Token::word(w.as_ref())).collect())
    }

    /// Build a state of width `size` ending in `words`, left-padded with BEGIN.
    ///
    /// If more than `size` words are given, only the last `size` are kept.
    pub fn with_prefix<S: AsRef<str>>(words: &[S], size: usize) -> Self {
        let skip = words.len().saturating_sub(size);
        let mut tokens = vec![Token::Begin; size.saturating_sub(words.len())];
        tokens.extend(words[skip..].iter().map(|w| Token::word(w.as_ref())));
        Self(tokens)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    /// Slide the window: drop the oldest token and append `next`.
    pub fn advance(&self, next: Token) -> Self {
        let mut tokens = Vec::with_capacity(self.0.len());
        tokens.extend(self.0.iter().skip(1).cloned());
        tokens.push(next);
        Self(tokens)
    }

    /// The literal words of this state after any leading BEGIN padding.
    pub fn word_prefix(&self) -> Vec<String> {
        self.0
            .iter()
            .skip_while(|t| **t == Token::Begin)
            .filter_map(|t| t.as_word().map(str::to_owned))
            .collect()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, tok) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", tok)?;
        }
        f.write_str(")")
    }
}
