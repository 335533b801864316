//! Regex backend selection.
//!
//! The full `regex` crate is used by default; building with
//! `--no-default-features --features lite` swaps in `regex-lite`.

#[cfg(feature = "regex")]
pub(crate) use ::regex::Regex;

#[cfg(all(feature = "lite", not(feature = "regex")))]
pub(crate) use ::regex_lite::Regex;

#[cfg(not(any(feature = "regex", feature = "lite")))]
compile_error!("either the `regex` or the `lite` feature must be enabled");
