//! Descriptive aggregates of the analysis table.
//!
//! These are the tables the plots of the corpus are drawn from: monthly
//! averages with a trailing rolling mean, code and author frequencies, and
//! the yearly shares of the most used codes. Every function is pure and
//! returns rows in a deterministic order.

use crate::config::MetricsConfig;
use crate::{AnalysisRecord, JelCode};
use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::info;

/// Averages of one publication month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub month: NaiveDate,
    pub papers: usize,
    pub papers_smoothed: Option<f64>,
    pub mean_jel_codes: f64,
    pub mean_jel_codes_smoothed: Option<f64>,
    pub mean_authors: f64,
    pub mean_authors_smoothed: Option<f64>,
    pub mean_new_authors: f64,
    pub mean_new_authors_smoothed: Option<f64>,
    pub mean_returning_authors: f64,
    pub mean_returning_authors_smoothed: Option<f64>,
}

/// How often a JEL code is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeFrequency {
    pub code: JelCode,
    pub count: usize,
}

/// How many papers an author wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorFrequency {
    pub author: String,
    pub count: usize,
}

/// Share of a month's papers carrying one code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeShare {
    pub month: NaiveDate,
    pub papers: usize,
    pub papers_with_code: usize,
    pub share: f64,
    pub share_smoothed: Option<f64>,
}

/// Use of one code in one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyCodeShare {
    pub year: i32,
    pub code: JelCode,
    pub count: usize,
    pub share: f64,
    /// Whether the code is among the most used of that year
    pub is_common: bool,
}

/// Number of papers carrying both codes of a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodePair {
    pub first: JelCode,
    pub second: JelCode,
    pub papers: usize,
}

/// All aggregate tables of one analysis table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsReport {
    pub monthly: Vec<MonthlyTrend>,
    pub codes: Vec<CodeFrequency>,
    pub authors: Vec<AuthorFrequency>,
    pub yearly_shares: Vec<YearlyCodeShare>,
    pub co_occurrence: Vec<CodePair>,
}

/// Compute every aggregate table with the given settings.
pub fn summarize(records: &[AnalysisRecord], config: &MetricsConfig) -> MetricsReport {
    let report = MetricsReport {
        monthly: monthly_trends(records, config.rolling_window),
        codes: code_frequencies(records, config.min_code_count),
        authors: author_frequencies(records, config.min_author_count),
        yearly_shares: yearly_code_shares(records, config.top_codes),
        co_occurrence: code_co_occurrence(records),
    };
    info!(
        months = report.monthly.len(),
        codes = report.codes.len(),
        authors = report.authors.len(),
        yearly_shares = report.yearly_shares.len(),
        code_pairs = report.co_occurrence.len(),
        "computed descriptive metrics"
    );
    report
}

/// Trailing mean over `window` values, `None` until the window is full.
///
/// A window of zero is treated as one.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            (i + 1 >= window)
                .then(|| values[i + 1 - window..=i].iter().sum::<f64>() / window as f64)
        })
        .collect()
}

fn mean(values: impl Iterator<Item = usize>) -> f64 {
    let (sum, n) = values.fold((0, 0), |(sum, n), value| (sum + value, n + 1));
    if n == 0 { 0.0 } else { sum as f64 / n as f64 }
}

fn by_month(records: &[AnalysisRecord]) -> BTreeMap<NaiveDate, Vec<&AnalysisRecord>> {
    let mut months: BTreeMap<NaiveDate, Vec<&AnalysisRecord>> = BTreeMap::new();
    for record in records {
        months
            .entry(record.paper.publication_year_month)
            .or_default()
            .push(record);
    }
    months
}

/// Per-month paper count and means, in month order.
///
/// Only months with at least one paper appear; the rolling mean runs over
/// those rows.
pub fn monthly_trends(records: &[AnalysisRecord], window: usize) -> Vec<MonthlyTrend> {
    let months = by_month(records);

    let papers: Vec<f64> = months.values().map(|rows| rows.len() as f64).collect();
    let codes: Vec<f64> = months
        .values()
        .map(|rows| mean(rows.iter().map(|r| r.jel_codes_count)))
        .collect();
    let authors: Vec<f64> = months
        .values()
        .map(|rows| mean(rows.iter().map(|r| r.authors_count)))
        .collect();
    let new: Vec<f64> = months
        .values()
        .map(|rows| mean(rows.iter().map(|r| r.authors_new)))
        .collect();
    let returning: Vec<f64> = months
        .values()
        .map(|rows| mean(rows.iter().map(|r| r.authors_returning)))
        .collect();

    let papers_smoothed = rolling_mean(&papers, window);
    let codes_smoothed = rolling_mean(&codes, window);
    let authors_smoothed = rolling_mean(&authors, window);
    let new_smoothed = rolling_mean(&new, window);
    let returning_smoothed = rolling_mean(&returning, window);

    months
        .iter()
        .enumerate()
        .map(|(i, (month, rows))| MonthlyTrend {
            month: *month,
            papers: rows.len(),
            papers_smoothed: papers_smoothed[i],
            mean_jel_codes: codes[i],
            mean_jel_codes_smoothed: codes_smoothed[i],
            mean_authors: authors[i],
            mean_authors_smoothed: authors_smoothed[i],
            mean_new_authors: new[i],
            mean_new_authors_smoothed: new_smoothed[i],
            mean_returning_authors: returning[i],
            mean_returning_authors_smoothed: returning_smoothed[i],
        })
        .collect()
}

/// Sort counted items by count descending, then by key ascending.
fn ranked<K: Ord>(counts: HashMap<K, usize>) -> Vec<(K, usize)> {
    counts
        .into_iter()
        .sorted_by(|(a_key, a_count), (b_key, b_count)| {
            b_count.cmp(a_count).then_with(|| a_key.cmp(b_key))
        })
        .collect()
}

/// Occurrences of every code with more than `min_count` uses.
pub fn code_frequencies(records: &[AnalysisRecord], min_count: usize) -> Vec<CodeFrequency> {
    let counts = records
        .iter()
        .flat_map(|record| record.paper.jel_codes.iter().cloned())
        .counts();

    ranked(counts)
        .into_iter()
        .filter(|&(_, count)| count > min_count)
        .map(|(code, count)| CodeFrequency { code, count })
        .collect()
}

/// Papers per author for authors with more than `min_count` papers.
pub fn author_frequencies(records: &[AnalysisRecord], min_count: usize) -> Vec<AuthorFrequency> {
    let counts = records
        .iter()
        .flat_map(|record| record.paper.author_names.iter().unique())
        .filter(|name| !name.is_empty())
        .map(String::as_str)
        .counts();

    ranked(counts)
        .into_iter()
        .filter(|&(_, count)| count > min_count)
        .map(|(author, count)| AuthorFrequency {
            author: author.to_string(),
            count,
        })
        .collect()
}

/// The `n` most used codes, most used first.
pub fn most_common_codes(records: &[AnalysisRecord], n: usize) -> Vec<JelCode> {
    code_frequencies(records, 0)
        .into_iter()
        .take(n)
        .map(|frequency| frequency.code)
        .collect()
}

/// Monthly share of papers carrying `code`.
pub fn code_share_by_month(
    records: &[AnalysisRecord],
    code: &JelCode,
    window: usize,
) -> Vec<CodeShare> {
    let months = by_month(records);
    let shares: Vec<(NaiveDate, usize, usize)> = months
        .iter()
        .map(|(month, rows)| {
            let with_code = rows
                .iter()
                .filter(|r| r.paper.jel_codes.contains(code))
                .count();
            (*month, rows.len(), with_code)
        })
        .collect();

    let raw: Vec<f64> = shares
        .iter()
        .map(|&(_, papers, with_code)| with_code as f64 / papers as f64)
        .collect();
    let smoothed = rolling_mean(&raw, window);

    shares
        .into_iter()
        .zip(raw)
        .zip(smoothed)
        .map(|(((month, papers, papers_with_code), share), share_smoothed)| CodeShare {
            month,
            papers,
            papers_with_code,
            share,
            share_smoothed,
        })
        .collect()
}

/// Yearly use of every code that is among the `n` most used in some year.
///
/// One row per year and selected code, including years where the code was
/// not used. Ties at the cut-off are broken by code order.
pub fn yearly_code_shares(records: &[AnalysisRecord], n: usize) -> Vec<YearlyCodeShare> {
    let mut papers_per_year: BTreeMap<i32, usize> = BTreeMap::new();
    let mut counts: BTreeMap<i32, HashMap<JelCode, usize>> = BTreeMap::new();
    for record in records {
        let year = record.paper.publication_year_month.year();
        *papers_per_year.entry(year).or_default() += 1;
        let year_counts = counts.entry(year).or_default();
        for code in record.paper.jel_codes.iter().unique() {
            *year_counts.entry(code.clone()).or_default() += 1;
        }
    }

    let common: BTreeMap<i32, BTreeSet<JelCode>> = counts
        .iter()
        .map(|(&year, year_counts)| {
            let top = ranked(year_counts.clone())
                .into_iter()
                .take(n)
                .map(|(code, _)| code)
                .collect();
            (year, top)
        })
        .collect();
    let selected: BTreeSet<&JelCode> = common.values().flatten().collect();

    papers_per_year
        .iter()
        .flat_map(|(&year, &papers)| {
            let counts = &counts[&year];
            let common = &common[&year];
            selected.iter().map(move |&code| {
                let count = counts.get(code).copied().unwrap_or(0);
                YearlyCodeShare {
                    year,
                    code: code.clone(),
                    count,
                    share: count as f64 / papers as f64,
                    is_common: common.contains(code),
                }
            })
        })
        .collect()
}

/// Undirected co-occurrence of codes on the same paper.
///
/// Pairs are ordered `first < second`, listed by descending paper count and
/// then by the pair. A code is never paired with itself.
pub fn code_co_occurrence(records: &[AnalysisRecord]) -> Vec<CodePair> {
    let counts = records
        .iter()
        .flat_map(|record| {
            record
                .paper
                .jel_codes
                .iter()
                .unique()
                .sorted()
                .tuple_combinations::<(_, _)>()
                .collect_vec()
        })
        .map(|(first, second)| (first.clone(), second.clone()))
        .counts();

    ranked(counts)
        .into_iter()
        .map(|((first, second), papers)| CodePair {
            first,
            second,
            papers,
        })
        .collect()
}
