/// Corpus tokenization — sentence splitting, word splitting, and filtering.

use regex::Regex;
use std::sync::LazyLock;

use crate::schema::corpus::Corpus;

/// A word ending in sentence punctuation, optional closing quotes or
/// brackets, then whitespace. Whether the next character allows a split is
/// checked separately.
static POTENTIAL_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w.'’&\]\)]+[.?!])([‘’“”'"\)\]]*)(\s+)"#).expect("valid sentence-end pattern")
});

/// Quote artifacts and bracket characters that make a sentence unusable.
static REJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(^')|('$)|\s'|'\s|["()\[\]]"#).expect("valid reject pattern")
});

/// Capitalized abbreviations (compared lowercased, without the final period).
const ABBR_CAPPED: &[&str] = &[
    // states
    "ala", "ariz", "ark", "calif", "colo", "conn", "del", "fla", "ga", "ill", "ind", "kan",
    "ky", "la", "md", "mass", "mich", "minn", "miss", "mo", "mont", "neb", "nev", "okla",
    "ore", "pa", "tenn", "vt", "va", "wash", "wis", "wyo", "u.s",
    // titles
    "mr", "ms", "mrs", "msr", "dr", "gov", "pres", "sen", "sens", "rep", "reps", "prof", "gen",
    "messrs", "col", "sr", "jf", "sgt", "mgr", "fr", "rev", "jr", "snr", "atty", "supt",
    // streets
    "ave", "blvd", "st", "rd", "hwy",
    // months
    "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

const ABBR_LOWERCASE: &[&str] = &["etc", "v", "vs", "viz", "al", "pct"];

/// Dotted acronyms that never end a sentence on their own.
const EXCEPTIONS: &[&str] = &["U.S.", "U.N.", "E.U.", "F.B.I.", "C.I.A."];

/// Raw text handed to the tokenizer by an upstream producer.
#[derive(Debug, Clone)]
pub enum CorpusInput<'a> {
    /// One (possibly multi-line) block of text.
    Text(&'a str),
    /// Independent lines, split separately and concatenated in order.
    Lines(Vec<&'a str>),
}

impl<'a> From<&'a str> for CorpusInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for CorpusInput<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a [String]> for CorpusInput<'a> {
    fn from(lines: &'a [String]) -> Self {
        Self::Lines(lines.iter().map(String::as_str).collect())
    }
}

impl<'a> From<&'a [&'a str]> for CorpusInput<'a> {
    fn from(lines: &'a [&'a str]) -> Self {
        Self::Lines(lines.to_vec())
    }
}

/// Split a block of text into trimmed sentences.
///
/// A sentence ends at a word ending in `.`, `?` or `!` (plus any closing
/// quotes or brackets) when the following text does not start with a
/// lowercase letter or a dash, unless the word is a known abbreviation.
/// The result may contain empty strings; [`is_acceptable_sentence`] drops them.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut ends = Vec::new();

    for caps in POTENTIAL_END.captures_iter(text) {
        let (Some(word), Some(closers), Some(space)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };

        let continues_lowercase = text[space.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || matches!(c, '-' | '–' | '—'));
        if continues_lowercase {
            continue;
        }

        if is_sentence_ender(word.as_str()) {
            ends.push(closers.end());
        }
    }

    let mut sentences = Vec::with_capacity(ends.len() + 1);
    let mut start = 0;
    for end in ends {
        sentences.push(text[start..end].trim().to_string());
        start = end;
    }
    sentences.push(text[start..].trim().to_string());
    sentences
}

/// Split every line independently and concatenate the results in order.
pub fn split_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .flat_map(|line| split_sentences(line.as_ref()))
        .collect()
}

/// Split a sentence into words on runs of whitespace.
pub fn split_words(sentence: &str) -> Vec<String> {
    sentence.split_whitespace().map(str::to_string).collect()
}

/// Reject sentences with stray quotes, brackets, or no content.
///
/// The check runs on an ASCII transliteration, so curly quotes are caught
/// the same way as straight ones.
pub fn is_acceptable_sentence(sentence: &str) -> bool {
    if sentence.trim().is_empty() {
        return false;
    }
    let normalized = normalize(sentence);
    !REJECT.is_match(&normalized)
}

/// Transliterate to ASCII. Already-ASCII input is returned unchanged.
pub fn normalize(text: &str) -> String {
    deunicode::deunicode(text)
}

/// Split, filter, and word-split raw input into a training corpus.
pub fn generate_corpus<'a>(input: impl Into<CorpusInput<'a>>) -> Corpus {
    let sentences = match input.into() {
        CorpusInput::Text(text) => split_sentences(text),
        CorpusInput::Lines(lines) => split_lines(lines.as_slice()),
    };

    sentences
        .iter()
        .filter(|s| is_acceptable_sentence(s))
        .map(|s| split_words(s))
        .collect()
}

fn is_abbreviation(dotted_word: &str) -> bool {
    let clipped = match dotted_word.strip_suffix('.') {
        Some(c) if !c.is_empty() => c,
        _ => return false,
    };
    let starts_upper = clipped.chars().next().is_some_and(|c| c.is_ascii_uppercase());
    if starts_upper {
        let lower = clipped.to_lowercase();
        // single-letter initials
        (lower.len() == 1 && lower.chars().all(|c| c.is_ascii_lowercase()))
            || ABBR_CAPPED.contains(&lower.as_str())
    } else {
        ABBR_LOWERCASE.contains(&clipped)
    }
}

fn is_sentence_ender(word: &str) -> bool {
    if EXCEPTIONS.contains(&word) {
        return false;
    }
    if word.ends_with('?') || word.ends_with('!') {
        return true;
    }
    if word.chars().filter(char::is_ascii_uppercase).count() > 1 {
        return true;
    }
    word.ends_with('.') && !is_abbreviation(word)
}
