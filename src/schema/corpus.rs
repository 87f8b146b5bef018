use serde::{Deserialize, Serialize};

/// One accepted sentence, already split into words.
pub type Run = Vec<String>;

/// Ordered sentences-of-words a chain is trained on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    runs: Vec<Run>,
}

impl Corpus {
    pub fn new(runs: Vec<Run>) -> Self {
        Self { runs }
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Total number of words across all runs.
    pub fn word_count(&self) -> usize {
        self.runs.iter().map(Vec::len).sum()
    }

    /// Rejoin every run into one reference string for novelty checks.
    ///
    /// Words are joined with single spaces, and so are the runs themselves.
    pub fn rejoined(&self) -> String {
        self.runs
            .iter()
            .map(|run| run.join(" "))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<Vec<Run>> for Corpus {
    fn from(runs: Vec<Run>) -> Self {
        Self::new(runs)
    }
}

impl FromIterator<Run> for Corpus {
    fn from_iter<I: IntoIterator<Item = Run>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Run {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn rejoined_joins_runs_with_spaces() {
        let corpus: Corpus = vec![words("the cat sat."), words("a dog ran.")].into();
        assert_eq!(corpus.rejoined(), "the cat sat. a dog ran.");
        assert_eq!(corpus.word_count(), 6);
    }

    #[test]
    fn rejoined_is_stable_for_same_corpus() {
        let corpus: Corpus = vec![words("one two"), words("three")].into();
        assert_eq!(corpus.rejoined(), corpus.clone().rejoined());
    }

    #[test]
    fn empty_corpus_rejoins_to_empty_string() {
        assert_eq!(Corpus::default().rejoined(), "");
    }
}
