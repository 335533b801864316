//! Publication status classification.
//!
//! The status line of a DP page is free text ("Published in: ...",
//! "forthcoming in ...", "Revised version published as IZA DP No. 1234").
//! Classification is driven by [`STATUS_RULES`], evaluated in order; the
//! first rule that accepts the text decides the category and anything left
//! over is [`StatusKind::Other`].

use crate::clean::fuzzy::fuzzy_contains;
use crate::clean::supersede::extract_series_reference;
use crate::{PublicationStatus, StatusKind};

/// Default number of edits tolerated when matching a status pattern.
pub const DEFAULT_MAX_EDITS: usize = 3;

/// One classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRule {
    /// Category assigned when the rule accepts the text
    pub kind: StatusKind,
    /// Accept when any of these matches, within `max_edits` errors
    pub patterns: &'static [&'static str],
    /// Reject when any of these occurs verbatim (case-insensitive)
    pub exclude: &'static [&'static str],
    /// Reject when the text points at another paper of the series
    pub exclude_series_reference: bool,
    /// Edit distance tolerated for `patterns`
    pub max_edits: usize,
}

impl StatusRule {
    /// Whether this rule accepts `text`.
    pub fn accepts(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        if self
            .exclude
            .iter()
            .any(|excluded| lowered.contains(&excluded.to_lowercase()))
        {
            return false;
        }
        if self.exclude_series_reference && extract_series_reference(text).is_some() {
            return false;
        }
        self.patterns
            .iter()
            .any(|pattern| fuzzy_contains(text, pattern, self.max_edits))
    }
}

/// Classification rules in evaluation order.
///
/// A status that cites another DP of the series ("Published as: IZA DP No.
/// 1200") describes a re-issue, not a journal publication, so it falls
/// through to [`StatusKind::Other`] where superseding links are detected.
pub const STATUS_RULES: &[StatusRule] = &[
    StatusRule {
        kind: StatusKind::Forthcoming,
        patterns: &["forthcoming"],
        exclude: &[],
        exclude_series_reference: false,
        max_edits: DEFAULT_MAX_EDITS,
    },
    StatusRule {
        kind: StatusKind::Published,
        patterns: &["published", "publication"],
        exclude: &["forthcoming"],
        exclude_series_reference: true,
        max_edits: DEFAULT_MAX_EDITS,
    },
];

/// Classifies raw status strings with a rule table.
#[derive(Debug, Clone)]
pub struct StatusClassifier {
    rules: Vec<StatusRule>,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusClassifier {
    /// Creates a classifier with [`STATUS_RULES`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: STATUS_RULES.to_vec(),
        }
    }

    /// Sets the edit tolerance of every rule.
    #[must_use]
    pub fn with_max_edits(mut self, max_edits: usize) -> Self {
        for rule in &mut self.rules {
            rule.max_edits = max_edits;
        }
        self
    }

    /// The rules in evaluation order.
    pub fn rules(&self) -> &[StatusRule] {
        &self.rules
    }

    /// Category of a non-null status string.
    pub fn kind_of(&self, text: &str) -> StatusKind {
        self.rules
            .iter()
            .find(|rule| rule.accepts(text))
            .map_or(StatusKind::Other, |rule| rule.kind)
    }

    /// Classify a possibly missing status string, keeping its text.
    pub fn classify(&self, raw: Option<&str>) -> Option<PublicationStatus> {
        raw.map(|text| PublicationStatus {
            kind: self.kind_of(text),
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Forthcoming in the Journal of Labor Economics", StatusKind::Forthcoming)]
    #[case("forthcomming in: Economics Letters", StatusKind::Forthcoming)]
    #[case("Published in: Labour Economics, 2010, 17 (1), 1-12", StatusKind::Published)]
    #[case("publishd in: Journal of Human Resources", StatusKind::Published)]
    #[case("pubslished in: Applied Economics", StatusKind::Published)]
    #[case("Publication: Oxford Economic Papers", StatusKind::Published)]
    #[case("Published in: Economica; forthcoming in print", StatusKind::Forthcoming)]
    #[case("Published as: IZA DP No. 1200", StatusKind::Other)]
    #[case("Revised version: IZA DP No. 4711", StatusKind::Other)]
    #[case("Published in: NBER DP No. 123", StatusKind::Published)]
    #[case("mimeo", StatusKind::Other)]
    fn test_kind_of(#[case] text: &str, #[case] expected: StatusKind) {
        assert_eq!(StatusClassifier::new().kind_of(text), expected);
    }

    #[test]
    fn test_classify_keeps_text_and_missing_stays_missing() {
        let classifier = StatusClassifier::new();
        assert_eq!(classifier.classify(None), None);
        assert_eq!(
            classifier.classify(Some("Forthcoming in: Kyklos")),
            Some(PublicationStatus {
                kind: StatusKind::Forthcoming,
                text: "Forthcoming in: Kyklos".to_string(),
            })
        );
    }

    #[test]
    fn test_partition_is_exclusive() {
        let classifier = StatusClassifier::new();
        let text = "Published in: Economica; forthcoming in print";
        let accepting: Vec<_> = classifier
            .rules()
            .iter()
            .filter(|rule| rule.accepts(text))
            .map(|rule| rule.kind)
            .collect();
        // only the forthcoming rule accepts, the published rule excludes it
        assert_eq!(accepting, vec![StatusKind::Forthcoming]);
    }

    #[test]
    fn test_with_max_edits() {
        let strict = StatusClassifier::new().with_max_edits(0);
        assert_eq!(strict.kind_of("publishd in: Kyklos"), StatusKind::Other);
        assert!(strict.rules().iter().all(|rule| rule.max_edits == 0));

        let default = StatusClassifier::new();
        assert_eq!(default.kind_of("publishd in: Kyklos"), StatusKind::Published);
    }
}
