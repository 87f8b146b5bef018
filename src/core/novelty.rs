/// Novelty check — rejects output that copies long runs from the source text.

/// Decide whether `words` is novel enough relative to `rejoined_text`.
///
/// The longest tolerated verbatim overlap is the smaller of
/// `round(max_overlap_ratio * len)` and `max_overlap_total` words. Any run of
/// one word more than that, found literally in the source, rejects the
/// candidate. Runs near the end of the candidate may be shorter than the
/// window and are checked as-is.
pub fn accept(
    words: &[String],
    max_overlap_ratio: f64,
    max_overlap_total: usize,
    rejoined_text: &str,
) -> bool {
    let overlap_max = overlap_limit(words.len(), max_overlap_ratio, max_overlap_total);
    let window = overlap_max + 1;
    let gram_count = words.len().saturating_sub(overlap_max).max(1);

    for start in 0..gram_count {
        let end = (start + window).min(words.len());
        let gram = words[start.min(end)..end].join(" ");
        if rejoined_text.contains(&gram) {
            tracing::trace!(gram = %gram, "candidate overlaps source text");
            return false;
        }
    }

    true
}

/// Longest verbatim word run tolerated for a candidate of `len` words.
///
/// Rounds half to even, so a ratio landing exactly on `.5` goes to the
/// nearest even count.
pub fn overlap_limit(len: usize, max_overlap_ratio: f64, max_overlap_total: usize) -> usize {
    let by_ratio = (max_overlap_ratio * len as f64).round_ties_even().max(0.0) as usize;
    max_overlap_total.min(by_ratio)
}
