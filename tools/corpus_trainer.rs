/// Corpus Trainer — builds a text model from a corpus and saves it as RON.
///
/// Usage: corpus_trainer --input <file.txt> --output <model.ron> [--state-size <n>]
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use markov_text::core::generator::{save_model, TextModel, DEFAULT_STATE_SIZE};

#[derive(Parser, Debug)]
#[command(name = "corpus_trainer", about = "Train a Markov text model from a corpus")]
struct Args {
    /// Plain-text corpus, one or more sentences per line.
    #[arg(long)]
    input: PathBuf,

    /// Where to write the RON model snapshot.
    #[arg(long)]
    output: PathBuf,

    /// Words per chain state.
    #[arg(long, default_value_t = DEFAULT_STATE_SIZE)]
    state_size: usize,

    /// Store only the transition table; generated sentences will not be
    /// checked against the source text.
    #[arg(long)]
    discard_original: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading corpus '{}'", args.input.display()))?;

    println!(
        "Training state-size {} model from '{}'...",
        args.state_size,
        args.input.display()
    );
    let model = TextModel::builder()
        .text(&text)
        .state_size(args.state_size)
        .retain_original(!args.discard_original)
        .build()
        .context("building model")?;

    println!(
        "Model trained: {} states, {} transitions, {} distinct sentence starts",
        model.chain().len(),
        model.chain().transition_count(),
        model.chain().sentence_starts().len()
    );
    if let Some(corpus) = model.parsed_sentences() {
        println!(
            "Retained {} sentences ({} words) for novelty checks",
            corpus.len(),
            corpus.word_count()
        );
    }

    save_model(&model, &args.output)
        .with_context(|| format!("saving model to '{}'", args.output.display()))?;

    println!("Model saved to '{}'", args.output.display());
    Ok(())
}
