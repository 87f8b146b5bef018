/// Sentence Generator — prints short sentences from a corpus or a saved model.
///
/// Usage: sentence_generator (--corpus <file.txt> | --model <model.ron>) [--count <n>]
use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use markov_text::core::config::GenerationConfig;
use markov_text::core::generator::{load_model, TextModel};

#[derive(Parser, Debug)]
#[command(name = "sentence_generator", about = "Generate sentences from a Markov text model")]
struct Args {
    /// Train on this plain-text corpus before generating.
    #[arg(long, conflicts_with = "model")]
    corpus: Option<PathBuf>,

    /// Load a model saved by corpus_trainer.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Words per chain state when training from --corpus.
    #[arg(long, default_value_t = 3)]
    state_size: usize,

    /// Number of sentences to print.
    #[arg(long, default_value_t = 200)]
    count: usize,

    #[arg(long, default_value_t = 230)]
    max_chars: usize,

    #[arg(long, default_value_t = 70)]
    min_chars: usize,

    /// Generation settings in RON; unspecified fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides `tries` from the config.
    #[arg(long)]
    tries: Option<u32>,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let model = match (&args.corpus, &args.model) {
        (Some(path), None) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading corpus '{}'", path.display()))?;
            TextModel::from_text(&text, args.state_size).context("building model")?
        }
        (None, Some(path)) => {
            load_model(path).with_context(|| format!("loading model '{}'", path.display()))?
        }
        _ => bail!("exactly one of --corpus or --model is required"),
    };

    let mut config = match &args.config {
        Some(path) => GenerationConfig::load_from_ron(path)
            .with_context(|| format!("loading config '{}'", path.display()))?,
        None => GenerationConfig::default(),
    };
    if let Some(tries) = args.tries {
        config.tries = tries;
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut misses = 0usize;

    for _ in 0..args.count {
        match model.make_short_sentence(args.max_chars, args.min_chars, &config, &mut rng)? {
            Some(sentence) => println!("{}", sentence),
            None => misses += 1,
        }
    }

    if misses > 0 {
        tracing::info!(misses, "some rounds produced no sentence");
        eprintln!(
            "{} of {} rounds produced no acceptable sentence",
            misses, args.count
        );
    }
    Ok(())
}
