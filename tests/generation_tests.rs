/// End-to-end generation tests — corpus text in, sentences out.

use markov_text::core::chain::{load_chain, save_chain};
use markov_text::core::generator::{load_model, save_model};
use markov_text::core::novelty;
use markov_text::core::tokenizer::{generate_corpus, split_words};
use markov_text::{Corpus, GenerationConfig, MarkovChain, State, TextModel, Token};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn fixture_text() -> String {
    std::fs::read_to_string("tests/fixtures/corpus.txt").unwrap()
}

fn corpus(sentences: &[&str]) -> Corpus {
    sentences.iter().map(|s| split_words(s)).collect()
}

#[test]
fn cat_and_dog_chain_has_expected_states() {
    let chain =
        MarkovChain::build(&corpus(&["the cat sat on the mat", "the dog sat on the rug"]), 2)
            .unwrap();

    let begin = chain.follow_distribution(&State::begin(2)).unwrap();
    assert_eq!(begin.get(&Token::word("the")), Some(&2));
    assert_eq!(begin.len(), 1);

    let sat_on = chain
        .follow_distribution(&State::from_words(&["sat", "on"]))
        .unwrap();
    assert_eq!(sat_on.get(&Token::word("the")), Some(&2));

    for last in ["mat", "rug"] {
        let end = chain
            .follow_distribution(&State::from_words(&["the", last]))
            .unwrap();
        assert_eq!(end.get(&Token::End), Some(&1));
    }
}

#[test]
fn cat_and_dog_sentences_start_and_end_correctly() {
    let model = TextModel::builder()
        .parsed_sentences(corpus(&["the cat sat on the mat", "the dog sat on the rug"]))
        .retain_original(false)
        .build()
        .unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    let config = GenerationConfig::default();

    for _ in 0..40 {
        let sentence = model.make_sentence(None, &config, &mut rng).unwrap().unwrap();
        assert!(sentence.starts_with("the "));
        assert!(
            sentence.ends_with("on the mat") || sentence.ends_with("on the rug"),
            "unexpected ending: {sentence}"
        );
    }
}

#[test]
fn fixture_model_produces_novel_sentences() {
    let text = fixture_text();
    let model = TextModel::from_text(&text, 2).unwrap();
    let rejoined = model.rejoined_text().unwrap();
    let config = GenerationConfig::default();
    let mut rng = StdRng::seed_from_u64(42);

    let mut produced = 0;
    for _ in 0..100 {
        if let Some(sentence) = model.make_sentence(None, &config, &mut rng).unwrap() {
            produced += 1;
            let words = split_words(&sentence);
            assert!(novelty::accept(
                &words,
                config.max_overlap_ratio,
                config.max_overlap_total,
                rejoined
            ));
            assert!(!sentence.contains("<BEGIN>") && !sentence.contains("<END>"));
            assert_eq!(sentence.trim(), sentence);
            assert!(!sentence.contains("  "));
        }
    }
    assert!(produced > 0, "expected at least one novel sentence");
}

#[test]
fn same_seed_same_sentences() {
    let text = fixture_text();
    let model = TextModel::from_text(&text, 2).unwrap();
    let config = GenerationConfig::default();

    let run = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..10)
            .map(|_| model.make_sentence(None, &config, &mut rng).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(run(5), run(5));
}

#[test]
fn lines_and_text_build_the_same_chain() {
    let text = fixture_text();
    let lines: Vec<String> = text.lines().map(str::to_string).collect();

    let from_text = TextModel::builder().text(&text).build().unwrap();
    let from_lines = TextModel::builder().lines(lines.as_slice()).build().unwrap();
    assert_eq!(from_text.chain(), from_lines.chain());
}

#[test]
fn reordered_corpus_builds_identical_chain() {
    let text = fixture_text();
    let corpus = generate_corpus(text.as_str());
    let mut runs = corpus.runs().to_vec();
    runs.reverse();

    let forward = MarkovChain::build(&corpus, 3).unwrap();
    let backward = MarkovChain::build(&Corpus::new(runs), 3).unwrap();
    assert_eq!(forward, backward);
}

#[test]
fn short_sentence_never_fits_fifty_char_corpus() {
    let sentence = "The quick brown fox jumps over the lazy dog today.";
    assert_eq!(sentence.chars().count(), 50);

    let model = TextModel::from_text(sentence, 2).unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let unchecked = GenerationConfig::default().without_novelty_check();
    assert_eq!(model.make_short_sentence(20, 5, &unchecked, &mut rng).unwrap(), None);
    assert_eq!(
        model
            .make_short_sentence(20, 5, &GenerationConfig::default(), &mut rng)
            .unwrap(),
        None
    );
}

#[test]
fn short_sentences_stay_within_bounds() {
    let text = fixture_text();
    let model = TextModel::from_text(&text, 2).unwrap();
    let config = GenerationConfig::default().with_tries(20);
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..30 {
        if let Some(sentence) = model.make_short_sentence(60, 20, &config, &mut rng).unwrap() {
            let len = sentence.chars().count();
            assert!((20..=60).contains(&len), "length {len}: {sentence}");
        }
    }
}

#[test]
fn chain_file_round_trip_keeps_counts() {
    let text = fixture_text();
    let chain = MarkovChain::build(&generate_corpus(text.as_str()), 2).unwrap();
    let path = std::path::PathBuf::from("target/test_fixture_chain.ron");

    save_chain(&chain, &path).unwrap();
    let loaded = load_chain(&path).unwrap();
    assert_eq!(loaded, chain);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn chain_only_model_generates_without_corpus() {
    let text = fixture_text();
    let chain = MarkovChain::build(&generate_corpus(text.as_str()), 2).unwrap();
    let json = chain.to_json().unwrap();

    let model = TextModel::builder()
        .chain(MarkovChain::from_json(&json).unwrap())
        .build()
        .unwrap();
    assert!(model.rejoined_text().is_none());

    let mut rng = StdRng::seed_from_u64(3);
    let sentence = model
        .make_sentence(None, &GenerationConfig::default(), &mut rng)
        .unwrap();
    assert!(sentence.is_some());
}

#[test]
fn model_file_round_trip_restores_novelty_reference() {
    let text = fixture_text();
    let model = TextModel::from_text(&text, 3).unwrap();
    let path = std::path::PathBuf::from("target/test_fixture_model.ron");

    save_model(&model, &path).unwrap();
    let loaded = load_model(&path).unwrap();
    assert_eq!(loaded.state_size(), 3);
    assert_eq!(loaded.chain(), model.chain());
    assert_eq!(loaded.rejoined_text(), model.rejoined_text());

    let _ = std::fs::remove_file(&path);
}
