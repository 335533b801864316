//! jelcorpus - discussion-paper metadata pipeline
//!
//! ## Usage
//!
//! ```bash
//! jelcorpus run --raw-dir data/raw --build-dir build
//! jelcorpus clean --build-dir build --drop-invalid-dates
//! jelcorpus topics --build-dir build --matrix build/documents_topics.csv
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use jelcorpus::PipelineConfig;
use jelcorpus::clean::InvalidDatePolicy;
use jelcorpus::pipeline;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Merge, clean, and prepare discussion-paper metadata for JEL code analysis
#[derive(Parser)]
#[command(name = "jelcorpus")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Dirs {
    /// Directory of per-paper raw record JSON files
    #[arg(long, default_value = "data/raw")]
    raw_dir: PathBuf,

    /// Directory receiving every stage table
    #[arg(long, default_value = "build")]
    build_dir: PathBuf,
}

#[derive(Args)]
struct CleanOptions {
    /// Edit distance tolerated when classifying publication status
    #[arg(long, default_value_t = 3)]
    max_edits: usize,

    /// Drop rows with an unknown month or year instead of failing
    #[arg(long)]
    drop_invalid_dates: bool,
}

#[derive(Args)]
struct MetricsOptions {
    /// Months in the trailing rolling mean
    #[arg(long, default_value_t = 6)]
    rolling_window: usize,

    /// Keep codes used more often than this
    #[arg(long, default_value_t = 10)]
    min_code_count: usize,

    /// Keep authors with more papers than this
    #[arg(long, default_value_t = 5)]
    min_author_count: usize,

    /// Codes per year counted as common
    #[arg(long, default_value_t = 3)]
    top_codes: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge raw records into the merged table
    Merge {
        #[command(flatten)]
        dirs: Dirs,
    },

    /// Clean the merged table
    Clean {
        #[command(flatten)]
        dirs: Dirs,
        #[command(flatten)]
        options: CleanOptions,
    },

    /// Prepare the analysis table from the cleaned table
    Prepare {
        #[command(flatten)]
        dirs: Dirs,
    },

    /// Compute descriptive metrics of the analysis table
    Metrics {
        #[command(flatten)]
        dirs: Dirs,
        #[command(flatten)]
        options: MetricsOptions,
    },

    /// Fit topic trends on a document-topic matrix
    Topics {
        #[command(flatten)]
        dirs: Dirs,

        /// Document-topic matrix CSV written by the topic model
        #[arg(long)]
        matrix: PathBuf,

        /// Topics reported in each direction
        #[arg(long, default_value_t = 5)]
        trending: usize,
    },

    /// Run every stage in order
    Run {
        #[command(flatten)]
        dirs: Dirs,
        #[command(flatten)]
        clean: CleanOptions,
        #[command(flatten)]
        metrics: MetricsOptions,

        /// Document-topic matrix CSV, enables the topics stage
        #[arg(long)]
        matrix: Option<PathBuf>,

        /// Topics reported in each direction
        #[arg(long, default_value_t = 5)]
        trending: usize,
    },
}

fn pipeline_config(dirs: Dirs) -> PipelineConfig {
    PipelineConfig::new(dirs.raw_dir, dirs.build_dir)
}

fn apply_clean_options(config: &mut PipelineConfig, options: &CleanOptions) {
    let policy = if options.drop_invalid_dates {
        InvalidDatePolicy::Drop
    } else {
        InvalidDatePolicy::Fail
    };
    config
        .cleaner
        .set_max_edits(options.max_edits)
        .set_invalid_date_policy(policy);
}

fn apply_metrics_options(config: &mut PipelineConfig, options: &MetricsOptions) {
    config
        .metrics
        .set_rolling_window(options.rolling_window)
        .set_min_code_count(options.min_code_count)
        .set_min_author_count(options.min_author_count)
        .set_top_codes(options.top_codes);
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    match cli.command {
        Commands::Merge { dirs } => {
            let config = pipeline_config(dirs);
            let (raw, merged) = pipeline::merge_stage(&config).context("merge stage failed")?;
            info!(raw, merged = merged.len(), "merge done");
        }
        Commands::Clean { dirs, options } => {
            let mut config = pipeline_config(dirs);
            apply_clean_options(&mut config, &options);
            let report = pipeline::clean_stage(&config).context("clean stage failed")?;
            info!(
                retained = report.records.len(),
                superseded = report.superseded_dropped,
                "clean done"
            );
        }
        Commands::Prepare { dirs } => {
            let config = pipeline_config(dirs);
            let analysis = pipeline::prepare_stage(&config).context("prepare stage failed")?;
            info!(rows = analysis.len(), "prepare done");
        }
        Commands::Metrics { dirs, options } => {
            let mut config = pipeline_config(dirs);
            apply_metrics_options(&mut config, &options);
            pipeline::metrics_stage(&config).context("metrics stage failed")?;
        }
        Commands::Topics {
            dirs,
            matrix,
            trending,
        } => {
            let mut config = pipeline_config(dirs);
            config.trending_topics = trending;
            let trending = pipeline::topics_stage(&config, &matrix)
                .with_context(|| format!("topics stage failed for {}", matrix.display()))?;
            for slope in trending.upward.iter().chain(&trending.downward) {
                info!(topic = slope.topic_number, slope = slope.slope, "trending topic");
            }
        }
        Commands::Run {
            dirs,
            clean,
            metrics,
            matrix,
            trending,
        } => {
            let mut config = pipeline_config(dirs);
            apply_clean_options(&mut config, &clean);
            apply_metrics_options(&mut config, &metrics);
            config.trending_topics = trending;
            if let Some(matrix) = matrix {
                config.set_topics_path(matrix);
            }
            let summary = pipeline::run(&config).context("pipeline failed")?;
            println!(
                "{} raw, {} merged, {} cleaned, {} in analysis window",
                summary.raw, summary.merged, summary.cleaned, summary.analysis
            );
        }
    }

    Ok(())
}
