//! Approximate substring search.
//!
//! Status strings carry every imaginable misspelling of "published"
//! ("publishd", "pubslished", "piblished", ...). Instead of enumerating them,
//! a pattern matches when some substring of the text is within a bounded
//! Levenshtein distance of it.

/// Smallest edit distance between `pattern` and any substring of `text`.
///
/// Insertions, deletions, and substitutions each cost one. Comparison is by
/// Unicode scalar value; callers lower-case both sides for case-insensitive
/// matching.
pub(crate) fn substring_distance(pattern: &[char], text: &[char]) -> usize {
    if pattern.is_empty() {
        return 0;
    }

    // column[i] = distance of pattern[..i] to the best substring ending at
    // the current text position; row 0 is free so a match can start anywhere
    let mut column: Vec<usize> = (0..=pattern.len()).collect();
    let mut best = pattern.len();

    for &t in text {
        let mut diagonal = column[0];
        column[0] = 0;
        for (i, &p) in pattern.iter().enumerate() {
            let substitution = diagonal + usize::from(p != t);
            let deletion = column[i + 1] + 1;
            let insertion = column[i] + 1;
            diagonal = column[i + 1];
            column[i + 1] = substitution.min(deletion).min(insertion);
        }
        best = best.min(column[pattern.len()]);
    }

    best
}

/// Case-insensitive check that `text` contains `pattern` with at most
/// `max_edits` errors.
pub fn fuzzy_contains(text: &str, pattern: &str, max_edits: usize) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    substring_distance(&pattern, &text) <= max_edits
}
