//! Reading the document-topic matrix.
//!
//! The topic model writes one CSV row per paper: `dp_number`, `title`,
//! `publication_year_month`, then one `top_NNN` weight column per topic. An
//! empty weight cell means the topic was not estimated for that paper.

use crate::error::{TopicsError, ValueError, fields};
use crate::topics::{DocumentTopics, TopicMatrix};
use chrono::{Datelike, NaiveDate};
use csv::{ReaderBuilder, StringRecord};

const TOPIC_PREFIX: &str = "top_";

/// Column positions resolved from the header row.
struct Columns {
    dp_number: usize,
    title: usize,
    publication_year_month: usize,
    /// (column index, topic number)
    topics: Vec<(usize, usize)>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, TopicsError> {
        let find = |field: &'static str| {
            headers
                .iter()
                .position(|header| header == field)
                .ok_or_else(|| TopicsError::without_position(ValueError::MissingValue { field }))
        };

        let mut topics = Vec::new();
        for (index, header) in headers.iter().enumerate() {
            let Some(suffix) = header.strip_prefix(TOPIC_PREFIX) else {
                continue;
            };
            let number = suffix.parse::<usize>().map_err(|e| {
                TopicsError::at_line(
                    1,
                    ValueError::Syntax(format!("Bad topic column \"{}\": {}", header, e)),
                )
            })?;
            topics.push((index, number));
        }

        if topics.is_empty() {
            return Err(TopicsError::at_line(
                1,
                ValueError::Syntax("No topic columns found".to_string()),
            ));
        }

        Ok(Self {
            dp_number: find(fields::DP_NUMBER)?,
            title: find(fields::TITLE)?,
            publication_year_month: find(fields::PUBLICATION_YEAR_MONTH)?,
            topics,
        })
    }
}

/// Parse a document-topic matrix from CSV text.
pub fn parse_document_topics<S: AsRef<str>>(csv_text: S) -> Result<TopicMatrix, TopicsError> {
    let text = csv_text.as_ref();
    if text.trim().is_empty() {
        return Ok(TopicMatrix::default());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = Columns::from_headers(&headers)?;

    let mut documents = Vec::new();
    let mut line_number = 2;
    for result in reader.records() {
        let record = result?;
        let line = record
            .position()
            .map_or(line_number, |position| position.line() as usize);
        documents.push(parse_row(&record, &columns).map_err(|e| TopicsError::at_line(line, e))?);
        line_number += 1;
    }

    Ok(TopicMatrix {
        topics: columns.topics.iter().map(|&(_, number)| number).collect(),
        documents,
    })
}

fn parse_row(record: &StringRecord, columns: &Columns) -> Result<DocumentTopics, ValueError> {
    let cell = |index: usize| record.get(index).unwrap_or_default();

    let dp_number = required(cell(columns.dp_number), fields::DP_NUMBER)?;
    let dp_number = dp_number
        .parse::<u32>()
        .map_err(|e| ValueError::BadValue {
            field: fields::DP_NUMBER,
            value: dp_number.to_string(),
            reason: e.to_string(),
        })?;

    let month = required(
        cell(columns.publication_year_month),
        fields::PUBLICATION_YEAR_MONTH,
    )?;

    let weights = columns
        .topics
        .iter()
        .map(|&(index, _)| parse_weight(cell(index)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DocumentTopics {
        dp_number,
        title: cell(columns.title).to_string(),
        publication_year_month: parse_year_month(month)?,
        weights,
    })
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValueError> {
    if value.is_empty() {
        Err(ValueError::MissingValue { field })
    } else {
        Ok(value)
    }
}

/// Accepts `2005-03-01`, `2005-03-01 00:00:00`, and `2005-03`, mapping any
/// day to the first of its month.
fn parse_year_month(value: &str) -> Result<NaiveDate, ValueError> {
    let date = value
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .or_else(|| NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").ok())
        .and_then(|date| date.with_day(1));

    date.ok_or_else(|| ValueError::BadValue {
        field: fields::PUBLICATION_YEAR_MONTH,
        value: value.to_string(),
        reason: "expected YYYY-MM or YYYY-MM-DD".to_string(),
    })
}

fn parse_weight(value: &str) -> Result<Option<f64>, ValueError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .map(Some)
        .map_err(|e| ValueError::BadValue {
            field: fields::TOPIC_WEIGHT,
            value: value.to_string(),
            reason: e.to_string(),
        })
}
