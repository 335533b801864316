//! Stage drivers working on the files of a [`PipelineConfig`].
//!
//! Each stage reads the table of the previous stage from the build directory
//! and writes its own. [`run`] executes all of them in order; nothing is
//! cached, every run recomputes every table.

use crate::clean::{CleanReport, Cleaner};
use crate::config::{
    AUTHOR_FREQUENCIES_FILE, CODE_CO_OCCURRENCE_FILE, CODE_FREQUENCIES_FILE, MONTHLY_TRENDS_FILE,
    PipelineConfig, TOPIC_SLOPES_FILE, TOPIC_TRENDS_FILE, YEARLY_CODE_SHARES_FILE,
};
use crate::error::PipelineError;
use crate::merge::{MergedTable, Merger};
use crate::metrics::{MetricsReport, summarize};
use crate::prepare::AnalysisPreparer;
use crate::source::JsonDirSource;
use crate::table::{read_json, write_analysis_csv, write_cleaned_csv, write_csv, write_json};
use crate::topics::{
    TrendingTopics, parse_document_topics, topic_slopes, trend_observations, trending_topics,
};
use crate::{AnalysisRecord, CleanedRecord, MergedRow, RecordSource};
use std::fs;
use std::path::Path;
use tracing::info;

/// Row counts of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub raw: usize,
    pub merged: usize,
    pub cleaned: usize,
    pub analysis: usize,
    pub superseded: usize,
    pub trending_topics: usize,
}

/// Load raw records and write the merged table.
pub fn merge_stage(config: &PipelineConfig) -> Result<(usize, MergedTable), PipelineError> {
    let records = JsonDirSource::new(&config.raw_dir).load()?;
    let raw = records.len();
    let merged = Merger::new().merge(records);
    write_json(&config.merged_path(), &merged.to_rows())?;
    Ok((raw, merged))
}

/// Clean the merged table and write the cleaned table.
pub fn clean_stage(config: &PipelineConfig) -> Result<CleanReport, PipelineError> {
    let rows: Vec<MergedRow> = read_json(&config.merged_path())?;
    let merged = MergedTable::from_rows(rows);
    let report = Cleaner::with_config(config.cleaner.clone()).clean(&merged)?;
    write_json(&config.cleaned_path(), &report.records)?;
    write_cleaned_csv(&config.cleaned_csv_path(), &report.records)?;
    Ok(report)
}

/// Prepare and write the analysis table.
pub fn prepare_stage(config: &PipelineConfig) -> Result<Vec<AnalysisRecord>, PipelineError> {
    let cleaned: Vec<CleanedRecord> = read_json(&config.cleaned_path())?;
    let analysis = AnalysisPreparer::new().prepare(&cleaned);
    write_json(&config.analysis_path(), &analysis)?;
    write_analysis_csv(&config.analysis_csv_path(), &analysis)?;
    Ok(analysis)
}

/// Compute and write the descriptive metrics tables.
pub fn metrics_stage(config: &PipelineConfig) -> Result<MetricsReport, PipelineError> {
    let analysis: Vec<AnalysisRecord> = read_json(&config.analysis_path())?;
    let report = summarize(&analysis, &config.metrics);
    write_csv(&config.build_path(MONTHLY_TRENDS_FILE), &report.monthly)?;
    write_csv(&config.build_path(CODE_FREQUENCIES_FILE), &report.codes)?;
    write_csv(&config.build_path(AUTHOR_FREQUENCIES_FILE), &report.authors)?;
    write_csv(&config.build_path(YEARLY_CODE_SHARES_FILE), &report.yearly_shares)?;
    write_csv(&config.build_path(CODE_CO_OCCURRENCE_FILE), &report.co_occurrence)?;
    Ok(report)
}

/// Fit topic trends on a document-topic matrix and write the slope ranking
/// and the observations of the trending topics.
pub fn topics_stage(
    config: &PipelineConfig,
    matrix_path: &Path,
) -> Result<TrendingTopics, PipelineError> {
    let content =
        fs::read_to_string(matrix_path).map_err(|e| PipelineError::io(matrix_path, e))?;
    let observations = parse_document_topics(content)?.melt();
    let slopes = topic_slopes(&observations);
    let trending = trending_topics(&slopes, config.trending_topics);

    write_csv(&config.build_path(TOPIC_SLOPES_FILE), &slopes)?;
    write_csv(
        &config.build_path(TOPIC_TRENDS_FILE),
        trend_observations(&observations, &trending),
    )?;
    Ok(trending)
}

/// Run every stage in order.
pub fn run(config: &PipelineConfig) -> Result<PipelineSummary, PipelineError> {
    let (raw, merged) = merge_stage(config)?;
    let report = clean_stage(config)?;
    let analysis = prepare_stage(config)?;
    metrics_stage(config)?;

    let trending_count = match &config.topics_path {
        Some(path) => {
            let trending = topics_stage(config, path)?;
            trending.upward.len() + trending.downward.len()
        }
        None => 0,
    };

    let summary = PipelineSummary {
        raw,
        merged: merged.len(),
        cleaned: report.records.len(),
        analysis: analysis.len(),
        superseded: report.superseded_dropped,
        trending_topics: trending_count,
    };
    info!(
        raw = summary.raw,
        merged = summary.merged,
        cleaned = summary.cleaned,
        analysis = summary.analysis,
        build_dir = %config.build_dir.display(),
        "pipeline finished"
    );
    Ok(summary)
}
