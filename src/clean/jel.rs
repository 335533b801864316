//! JEL code canonicalisation.
//!
//! Scraped code lists mix casing, confuse `1` with `I`, zero-pad, abbreviate
//! general categories to two characters, and carry free-text noise. The
//! canonical form is one uppercase letter followed by exactly two digits,
//! e.g. `J31`, with the list sorted by letter and then by number.

use crate::clean::overrides::manual_jel_codes;
use crate::regex::Regex;
use crate::utils::title_case;
use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::LazyLock;

/// Tokens that survive cleaning: a letter and one or two digits.
static PROPER_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][0-9]{1,2}$").unwrap());

/// A canonical JEL code: one uppercase ASCII letter and two ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JelCode(CompactString);

impl JelCode {
    /// Parse an already canonical code.
    ///
    /// Returns `None` unless `code` is exactly a letter followed by two digits.
    pub fn parse(code: &str) -> Option<Self> {
        let bytes = code.as_bytes();
        let canonical = bytes.len() == 3
            && bytes[0].is_ascii_uppercase()
            && bytes[1].is_ascii_digit()
            && bytes[2].is_ascii_digit();
        canonical.then(|| JelCode(CompactString::new(code)))
    }

    /// The code as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The category letter, e.g. `'J'` for `J31`.
    pub fn letter(&self) -> char {
        self.0.chars().next().unwrap_or_default()
    }

    /// The numeric part, e.g. `31` for `J31`.
    pub fn number(&self) -> u8 {
        self.as_str()[1..].parse().unwrap_or_default()
    }
}

impl std::fmt::Display for JelCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for JelCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = CompactString::deserialize(deserializer)?;
        JelCode::parse(&code).ok_or_else(|| {
            serde::de::Error::custom(format!("\"{}\" is not a canonical JEL code", code))
        })
    }
}

/// Canonicalise the scraped code list of one paper.
///
/// Papers with a hand-curated correction use that list instead of the
/// scraped one; both go through the same rules afterwards. Unrepairable
/// tokens are dropped, so the result may be empty.
pub fn canonicalize_jel_codes<S: AsRef<str>>(dp_number: u32, scraped: &[S]) -> Vec<JelCode> {
    match manual_jel_codes(dp_number) {
        Some(corrected) => canonicalize_tokens(corrected),
        None => canonicalize_tokens(scraped),
    }
}

/// Apply the pattern rules to a token list.
pub fn canonicalize_tokens<S: AsRef<str>>(tokens: &[S]) -> Vec<JelCode> {
    let mut codes: Vec<JelCode> = tokens
        .iter()
        .map(|token| title_case(token.as_ref()))
        .map(|token| replace_leading_one(&token))
        .map(|token| drop_leading_zero(&token).to_string())
        .filter(|token| PROPER_CODE_REGEX.is_match(token))
        .filter_map(|token| JelCode::parse(&pad_general_category(token)))
        .collect();

    codes.sort_by_key(|code| (code.letter(), code.number()));
    codes
}

/// `1` in first position is a misread `I`.
fn replace_leading_one(token: &str) -> String {
    match token.strip_prefix('1') {
        Some(rest) => format!("I{}", rest),
        None => token.to_string(),
    }
}

fn drop_leading_zero(token: &str) -> &str {
    token.strip_prefix('0').unwrap_or(token)
}

/// General categories are written with a trailing zero: `J3` is `J30`.
fn pad_general_category(mut token: String) -> String {
    if token.len() == 2 {
        token.push('0');
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn codes(list: &[JelCode]) -> Vec<&str> {
        list.iter().map(JelCode::as_str).collect()
    }

    #[test]
    fn test_mixed_noise() {
        let cleaned = canonicalize_tokens(&["j31", "1a2", "05", "B3"]);
        assert_eq!(codes(&cleaned), vec!["B30", "J31"]);
    }

    #[rstest]
    #[case(&["J31"], &["J31"])]
    #[case(&["j31"], &["J31"])]
    #[case(&["131"], &["I31"])]
    #[case(&["1"], &[])]
    #[case(&["0J31"], &["J31"])]
    #[case(&["J3"], &["J30"])]
    #[case(&["J"], &[])]
    #[case(&["J312"], &[])]
    #[case(&["JO8"], &[])]
    #[case(&["JEL: J31"], &[])]
    #[case(&[" J31"], &[])]
    #[case(&["00J31"], &[])]
    fn test_single_tokens(#[case] input: &[&str], #[case] expected: &[&str]) {
        assert_eq!(codes(&canonicalize_tokens(input)), expected.to_vec());
    }

    #[test]
    fn test_sorted_by_letter_then_number() {
        let cleaned = canonicalize_tokens(&["J8", "J31", "D86", "J24", "D6", "A20"]);
        assert_eq!(
            codes(&cleaned),
            vec!["A20", "D60", "D86", "J24", "J31", "J80"]
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        let cleaned = canonicalize_tokens(&["J31", "j31"]);
        assert_eq!(codes(&cleaned), vec!["J31", "J31"]);
    }

    #[test]
    fn test_output_is_canonical_and_idempotent() {
        let noisy = [
            "j31", "1a2", "05", "B3", "o15", "012", "I1", "Z", "q5", "131", "0b1", "h75", "C",
            "k00", "JO8", "e24",
        ];
        let once = canonicalize_tokens(&noisy);
        for code in &once {
            let bytes = code.as_str().as_bytes();
            assert_eq!(bytes.len(), 3);
            assert!(bytes[0].is_ascii_uppercase());
            assert!(bytes[1].is_ascii_digit() && bytes[2].is_ascii_digit());
        }

        let twice = canonicalize_tokens(&codes(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_manual_override_replaces_scraped_codes() {
        // DP 9577 was scraped with unusable codes
        let cleaned = canonicalize_jel_codes(9577, &["garbage"]);
        assert_eq!(codes(&cleaned), vec!["D86", "J31"]);

        // Override entries still go through the pattern rules
        let cleaned = canonicalize_jel_codes(16746, &Vec::<String>::new());
        assert_eq!(codes(&cleaned), vec!["J23", "O31", "O47"]);
    }

    #[test]
    fn test_no_override_uses_scraped_codes() {
        let cleaned = canonicalize_jel_codes(1, &["j31"]);
        assert_eq!(codes(&cleaned), vec!["J31"]);
    }

    #[test]
    fn test_jel_code_parse_and_parts() {
        let code = JelCode::parse("J31").unwrap();
        assert_eq!(code.letter(), 'J');
        assert_eq!(code.number(), 31);
        assert_eq!(code.to_string(), "J31");

        assert!(JelCode::parse("J3").is_none());
        assert!(JelCode::parse("j31").is_none());
        assert!(JelCode::parse("J3a").is_none());
    }

    #[test]
    fn test_jel_code_serde() {
        let code: JelCode = serde_json::from_str("\"E24\"").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"E24\"");
        assert!(serde_json::from_str::<JelCode>("\"E2\"").is_err());
    }
}
