pub mod chain;
pub mod config;
pub mod generator;
pub mod novelty;
pub mod tokenizer;
pub mod walker;
