use crate::error::{ValueError, fields};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// English month names in calendar order, as printed on the DP pages.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Map a full English month name to its number (1-12).
///
/// Only the twelve full names are accepted; abbreviations and other
/// spellings are rejected so that a scraper change surfaces as an error
/// instead of a silently shifted date.
pub fn parse_month_name(month_str: &str) -> Option<u32> {
    let month_str = month_str.trim();
    MONTH_NAMES
        .iter()
        .position(|&name| name == month_str)
        .map(|i| i as u32 + 1)
}

/// Build the first day of the publication month from the raw year and month
/// name strings.
///
/// # Errors
///
/// Returns a [`ValueError`] naming the offending field when either value is
/// missing, the month name is not one of [`MONTH_NAMES`], or the year is not
/// an integer.
pub fn publication_year_month(
    year: Option<&str>,
    month: Option<&str>,
) -> Result<NaiveDate, ValueError> {
    let month_str = month.ok_or(ValueError::MissingValue {
        field: fields::PUBLICATION_DATE_MONTH,
    })?;
    let year_str = year.ok_or(ValueError::MissingValue {
        field: fields::PUBLICATION_DATE_YEAR,
    })?;

    let month = parse_month_name(month_str).ok_or_else(|| ValueError::BadValue {
        field: fields::PUBLICATION_DATE_MONTH,
        value: month_str.to_string(),
        reason: "not an English month name".to_string(),
    })?;
    let year = year_str
        .trim()
        .parse::<i32>()
        .map_err(|e| ValueError::BadValue {
            field: fields::PUBLICATION_DATE_YEAR,
            value: year_str.to_string(),
            reason: e.to_string(),
        })?;

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| ValueError::BadValue {
        field: fields::PUBLICATION_DATE_YEAR,
        value: year_str.to_string(),
        reason: "year out of range".to_string(),
    })
}

/// Title-case a token the way the scraped data was normalised historically:
/// a cased character is upper-cased when it follows an uncased one (or starts
/// the token) and lower-cased when it follows a cased one.
///
/// Digits are uncased, so `"1a2"` becomes `"1A2"` and `"JO8"` becomes `"Jo8"`.
pub fn title_case(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut previous_cased = false;
    for c in token.chars() {
        let cased = c.is_lowercase() || c.is_uppercase();
        if cased && previous_cased {
            out.extend(c.to_lowercase());
        } else if cased {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        previous_cased = cased;
    }
    out
}

/// Join list cells for CSV export.
pub(crate) fn join_list<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Deserialize a list that the scraper may have written as `null`.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
