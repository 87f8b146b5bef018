//! Markov Text — novel sentence generation from an observed corpus.
//!
//! Trains a finite-order word-level Markov chain on raw text and walks it to
//! produce new sentences, rejecting output that copies long runs of the
//! source verbatim or falls outside requested length bounds.

pub mod core;
pub mod schema;

pub use crate::core::chain::{ChainError, MarkovChain};
pub use crate::core::config::GenerationConfig;
pub use crate::core::generator::{GeneratorError, NoveltyCheck, TextModel};
pub use crate::schema::corpus::Corpus;
pub use crate::schema::token::{State, Token};
