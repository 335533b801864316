//! Detection of superseded discussion papers.
//!
//! When a paper is re-issued under a new number, one of the two status lines
//! points at the other ("Revised version: IZA DP No. 4711", "Published as:
//! IZA DP No. 1200"). Whichever side carries the reference, the older number
//! is the one that gets replaced, so both directions collapse into a single
//! map from superseded paper to its successor.

use crate::regex::Regex;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;
use tracing::debug;

/// In-series cross-references such as "IZA DP No. 1234" or "DP 1234".
static SERIES_REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:IZA\s*DP(?:\s*No\.?|#)?|IZA\s*Discussion\s*Paper\s*No\.?|DP\s*No\.?|DP\s+)\s*([0-9]{3,5})",
    )
    .unwrap()
});

/// Other institutions whose working-paper series are also abbreviated "DP".
/// A reference directly preceded by one of these (and one whitespace
/// character) belongs to that series, not ours.
pub(crate) const FOREIGN_SERIES: &[&str] = &[
    "International Institute for Labour Studies",
    "ILO Employment",
    "OECD Education",
    "European Central Bank",
    "NBER",
    "Cedefop",
    "IFS",
    "European Investment Bank",
];

/// Map from superseded DP number to the DP number that replaces it.
pub type SupersedeMap = BTreeMap<u32, u32>;

/// Extract the first in-series DP number a status string refers to.
///
/// Candidates preceded by a [`FOREIGN_SERIES`] name are skipped and the scan
/// resumes one character later.
pub fn extract_series_reference(text: &str) -> Option<u32> {
    let mut start = 0;
    while let Some(captures) = SERIES_REFERENCE_REGEX.captures_at(text, start) {
        let whole = captures.get(0)?;
        if !follows_foreign_series(&text[..whole.start()]) {
            return captures.get(1).and_then(|number| number.as_str().parse().ok());
        }
        start = whole.start()
            + text[whole.start()..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
    }
    None
}

/// Whether `prefix` ends with a foreign series name plus one whitespace char.
fn follows_foreign_series(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next_back() {
        Some(last) if last.is_whitespace() => {
            let before = chars.as_str();
            FOREIGN_SERIES.iter().any(|series| before.ends_with(series))
        }
        _ => false,
    }
}

/// Combine per-paper references into superseding links.
///
/// `references` yields `(dp_number, referenced_number)` for the papers whose
/// status is neither published nor forthcoming. A reference to an older
/// number marks that older paper as superseded by the referring one; a
/// reference to a newer number marks the referring paper itself. A paper's
/// own forward reference wins over links inverted onto it, and among several
/// inverted links the earliest successor wins. A forward reference is kept
/// even when the newer number is not in `known`; references to unknown older
/// numbers or to the paper itself are ignored.
///
/// Every link in the result points from a smaller to a strictly larger
/// number, so the links never form a cycle.
pub fn link_superseded<I>(references: I, known: &HashSet<u32>) -> SupersedeMap
where
    I: IntoIterator<Item = (u32, Option<u32>)>,
{
    let mut links = SupersedeMap::new();
    let mut inverted = SupersedeMap::new();

    for (dp_number, reference) in references {
        let Some(reference) = reference else {
            continue;
        };
        match reference.cmp(&dp_number) {
            Ordering::Less if !known.contains(&reference) => {
                debug!(dp_number, reference, "reference to unknown older DP ignored");
            }
            Ordering::Less => {
                inverted
                    .entry(reference)
                    .and_modify(|successor| *successor = (*successor).min(dp_number))
                    .or_insert(dp_number);
            }
            Ordering::Greater => {
                links.insert(dp_number, reference);
            }
            Ordering::Equal => {
                debug!(dp_number, "self reference ignored");
            }
        }
    }

    for (superseded, successor) in inverted {
        links.entry(superseded).or_insert(successor);
    }
    links
}
