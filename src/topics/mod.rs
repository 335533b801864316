//! Topic trends over time.
//!
//! The topic model itself runs outside this crate and hands over a
//! document-topic matrix (see [`parse_document_topics`]). This module melts
//! it into one observation per paper and topic, fits a linear time trend per
//! topic, and picks the topics rising and falling fastest.
//!
//! # Example
//!
//! ```
//! use jelcorpus::topics::{parse_document_topics, topic_slopes, trending_topics};
//!
//! let input = "\
//! dp_number,title,publication_year_month,top_000,top_001
//! 1,a,2005-01-01,0.1,0.9
//! 2,b,2006-01-01,0.5,0.5
//! 3,c,2007-01-01,0.9,0.1
//! ";
//! let matrix = parse_document_topics(input).unwrap();
//! let slopes = topic_slopes(&matrix.melt());
//! let trending = trending_topics(&slopes, 1);
//!
//! assert_eq!(trending.upward[0].topic_number, 0);
//! assert_eq!(trending.downward[0].topic_number, 1);
//! ```

mod parse;

pub use parse::parse_document_topics;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Topic weights of one paper.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTopics {
    pub dp_number: u32,
    pub title: String,
    pub publication_year_month: NaiveDate,
    /// Weights parallel to [`TopicMatrix::topics`], `None` when missing
    pub weights: Vec<Option<f64>>,
}

/// The document-topic matrix produced by the topic model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicMatrix {
    /// Topic numbers in column order
    pub topics: Vec<usize>,
    pub documents: Vec<DocumentTopics>,
}

/// One (paper, topic) cell of the matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicObservation {
    pub dp_number: u32,
    pub title: String,
    pub publication_year_month: NaiveDate,
    pub topic_number: usize,
    pub weight: Option<f64>,
}

impl TopicMatrix {
    /// One observation per paper and topic, paper-major.
    pub fn melt(&self) -> Vec<TopicObservation> {
        self.documents
            .iter()
            .flat_map(|document| {
                self.topics
                    .iter()
                    .zip(&document.weights)
                    .map(|(&topic_number, &weight)| TopicObservation {
                        dp_number: document.dp_number,
                        title: document.title.clone(),
                        publication_year_month: document.publication_year_month,
                        topic_number,
                        weight,
                    })
            })
            .collect()
    }
}

/// Linear time trend of one topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSlope {
    pub topic_number: usize,
    /// Change in weight per day
    pub slope: f64,
    /// Non-missing observations the trend was fitted on
    pub observations: usize,
}

/// Direction of a trending topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Upward,
    Downward,
}

/// The fastest rising and falling topics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendingTopics {
    /// Steepest positive slopes first
    pub upward: Vec<TopicSlope>,
    /// The last entries of the slope ranking, in ranking order
    pub downward: Vec<TopicSlope>,
}

impl TrendingTopics {
    /// Direction of a topic, upward winning when it is in both lists.
    pub fn trend_of(&self, topic_number: usize) -> Option<Trend> {
        let contains = |slopes: &[TopicSlope]| slopes.iter().any(|s| s.topic_number == topic_number);
        if contains(&self.upward) {
            Some(Trend::Upward)
        } else if contains(&self.downward) {
            Some(Trend::Downward)
        } else {
            None
        }
    }
}

/// An observation of a trending topic, tagged with its direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendObservation {
    pub dp_number: u32,
    pub publication_year_month: NaiveDate,
    pub topic_number: usize,
    pub weight: Option<f64>,
    pub trend: Trend,
}

/// Day ordinal of a date, 0001-01-01 being day 1.
fn ordinal(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

/// Least-squares slope of `y` against `x`, `None` when `x` does not vary.
fn ols_slope(points: &[(f64, f64)]) -> Option<f64> {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|&(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|&(_, y)| y).sum::<f64>() / n;

    let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), &(x, y)| {
        let dx = x - mean_x;
        (sxy + dx * (y - mean_y), sxx + dx * dx)
    });
    (sxx > 0.0).then(|| sxy / sxx)
}

/// Fit a linear trend of weight over time for every topic.
///
/// Missing weights are ignored. Topics with fewer than two observations or
/// observed in a single month only are left out. The result is sorted by
/// slope, steepest rise first; equal slopes keep topic order.
pub fn topic_slopes(observations: &[TopicObservation]) -> Vec<TopicSlope> {
    let mut points: BTreeMap<usize, Vec<(f64, f64)>> = BTreeMap::new();
    for observation in observations {
        let entry = points.entry(observation.topic_number).or_default();
        if let Some(weight) = observation.weight {
            entry.push((ordinal(observation.publication_year_month), weight));
        }
    }

    let mut slopes: Vec<TopicSlope> = points
        .into_iter()
        .filter_map(|(topic_number, points)| {
            if points.len() < 2 {
                debug!(topic_number, observations = points.len(), "too few observations for a trend");
                return None;
            }
            let slope = ols_slope(&points)?;
            Some(TopicSlope {
                topic_number,
                slope,
                observations: points.len(),
            })
        })
        .collect();

    slopes.sort_by(|a, b| b.slope.total_cmp(&a.slope));
    info!(topics = slopes.len(), "fitted topic trends");
    slopes
}

/// Pick the `n` first and `n` last topics of a slope ranking.
pub fn trending_topics(slopes: &[TopicSlope], n: usize) -> TrendingTopics {
    let upward = slopes.iter().take(n).cloned().collect();
    let downward = slopes[slopes.len().saturating_sub(n)..].to_vec();
    TrendingTopics { upward, downward }
}

/// Observations of the trending topics, tagged with their direction.
pub fn trend_observations(
    observations: &[TopicObservation],
    trending: &TrendingTopics,
) -> Vec<TrendObservation> {
    observations
        .iter()
        .filter_map(|observation| {
            trending
                .trend_of(observation.topic_number)
                .map(|trend| TrendObservation {
                    dp_number: observation.dp_number,
                    publication_year_month: observation.publication_year_month,
                    topic_number: observation.topic_number,
                    weight: observation.weight,
                    trend,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn observation(topic_number: usize, year: i32, weight: Option<f64>) -> TopicObservation {
        TopicObservation {
            dp_number: 1,
            title: String::new(),
            publication_year_month: date(year, 1),
            topic_number,
            weight,
        }
    }

    fn slope(topic_number: usize, slope: f64) -> TopicSlope {
        TopicSlope {
            topic_number,
            slope,
            observations: 2,
        }
    }

    #[test]
    fn test_melt() {
        let matrix = TopicMatrix {
            topics: vec![0, 7],
            documents: vec![DocumentTopics {
                dp_number: 12,
                title: "t".to_string(),
                publication_year_month: date(2005, 3),
                weights: vec![Some(0.2), None],
            }],
        };
        let melted = matrix.melt();

        assert_eq!(melted.len(), 2);
        assert_eq!(melted[1].topic_number, 7);
        assert_eq!(melted[1].weight, None);
        assert_eq!(melted[0].dp_number, 12);
    }

    #[test]
    fn test_ordinal_matches_proleptic_calendar() {
        assert_eq!(ordinal(NaiveDate::from_ymd_opt(1, 1, 1).unwrap()), 1.0);
        assert_eq!(ordinal(date(2000, 1)), 730120.0);
    }

    #[test]
    fn test_ols_slope() {
        assert_eq!(ols_slope(&[(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]), Some(2.0));
        assert_eq!(ols_slope(&[(4.0, 1.0), (4.0, 3.0)]), None);
    }

    #[test]
    fn test_topic_slopes_skip_and_sort() {
        let observations = vec![
            observation(0, 2000, Some(0.1)),
            observation(0, 2010, Some(0.9)),
            observation(1, 2000, Some(0.9)),
            observation(1, 2010, Some(0.1)),
            observation(2, 2000, Some(0.5)),
            observation(2, 2010, None),
            observation(3, 2005, Some(0.1)),
            observation(3, 2005, Some(0.3)),
        ];
        let slopes = topic_slopes(&observations);
        let topics: Vec<usize> = slopes.iter().map(|s| s.topic_number).collect();

        assert_eq!(topics, vec![0, 1]);
        assert!(slopes[0].slope > 0.0);
        assert!(slopes[1].slope < 0.0);
        assert_eq!(slopes[0].observations, 2);
    }

    #[test]
    fn test_trending_topics() {
        let slopes = vec![slope(4, 3.0), slope(2, 1.0), slope(9, -1.0), slope(5, -2.0)];
        let trending = trending_topics(&slopes, 1);

        assert_eq!(trending.upward, vec![slope(4, 3.0)]);
        assert_eq!(trending.downward, vec![slope(5, -2.0)]);
        assert_eq!(trending.trend_of(4), Some(Trend::Upward));
        assert_eq!(trending.trend_of(5), Some(Trend::Downward));
        assert_eq!(trending.trend_of(2), None);

        let everything = trending_topics(&slopes, 10);
        assert_eq!(everything.upward.len(), 4);
        assert_eq!(everything.downward.len(), 4);
        assert_eq!(everything.trend_of(5), Some(Trend::Upward));
    }

    #[test]
    fn test_trend_observations() {
        let observations = vec![
            observation(4, 2000, Some(0.1)),
            observation(2, 2000, Some(0.1)),
            observation(5, 2000, None),
        ];
        let trending = trending_topics(&[slope(4, 3.0), slope(2, 1.0), slope(5, -2.0)], 1);
        let tagged = trend_observations(&observations, &trending);

        let summary: Vec<(usize, Trend)> = tagged
            .iter()
            .map(|t| (t.topic_number, t.trend))
            .collect();
        assert_eq!(summary, vec![(4, Trend::Upward), (5, Trend::Downward)]);
    }
}
