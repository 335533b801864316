use jelcorpus::pipeline;
use jelcorpus::{AnalysisRecord, CleanedRecord, PipelineConfig, PipelineError};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_record(dir: &Path, name: &str, record: serde_json::Value) {
    fs::write(dir.join(name), record.to_string()).unwrap();
}

fn paper(dp_number: u32, year: &str, month: &str, authors: &[&str], codes: &[&str]) -> serde_json::Value {
    json!({
        "dp_number": dp_number,
        "title": format!("Paper {}", dp_number),
        "author_names": authors,
        "author_urls": null,
        "published": null,
        "publication_date_month": month,
        "publication_date_year": year,
        "abstract": "Abstract text",
        "keywords": ["labour"],
        "jel_codes": codes,
        "file_url": format!("https://example.org/{}.pdf", dp_number),
    })
}

fn corpus(raw_dir: &Path) {
    fs::create_dir_all(raw_dir).unwrap();
    write_record(raw_dir, "100.json", paper(100, "1999", "December", &["A"], &["D86"]));
    write_record(raw_dir, "1200.json", paper(1200, "2004", "March", &["C"], &["J31"]));

    let mut revised = paper(1500, "2005", "May", &["A", "B"], &["j31", "1a2", "05", "B3"]);
    revised["published"] = json!("Published as: IZA DP No. 1200");
    write_record(raw_dir, "1500.json", revised);
    write_record(raw_dir, "1500_dup.json", paper(1500, "2005", "May", &["Z"], &["Q10"]));

    let mut forthcoming = paper(1600, "2006", "January", &["A"], &["J3"]);
    forthcoming["published"] = json!("Forthcoming in the Journal of Labor Economics");
    write_record(raw_dir, "1600.json", forthcoming);

    let mut no_file = paper(1700, "2006", "February", &["D"], &["J31"]);
    no_file["file_url"] = json!(null);
    write_record(raw_dir, "1700.json", no_file);

    write_record(raw_dir, "1800.json", paper(1800, "2006", "March", &["E"], &["none"]));
}

#[test]
fn test_full_run() {
    let dir = TempDir::new().unwrap();
    let raw_dir = dir.path().join("raw");
    let build_dir = dir.path().join("build");
    corpus(&raw_dir);

    let matrix = dir.path().join("documents_topics.csv");
    fs::write(
        &matrix,
        "dp_number,title,publication_year_month,top_000,top_001\n\
         1500,Paper 1500,2005-05-01,0.2,0.8\n\
         1600,Paper 1600,2006-01-01,0.6,0.4\n",
    )
    .unwrap();

    let mut config = PipelineConfig::new(&raw_dir, &build_dir);
    config.set_topics_path(&matrix);
    config.trending_topics = 1;
    let summary = pipeline::run(&config).unwrap();

    assert_eq!(summary.raw, 7);
    assert_eq!(summary.merged, 6);
    assert_eq!(summary.cleaned, 3);
    assert_eq!(summary.analysis, 2);
    assert_eq!(summary.superseded, 1);
    assert_eq!(summary.trending_topics, 2);

    let cleaned: Vec<CleanedRecord> =
        serde_json::from_str(&fs::read_to_string(config.cleaned_path()).unwrap()).unwrap();
    let numbers: Vec<u32> = cleaned.iter().map(|r| r.dp_number).collect();
    assert_eq!(numbers, vec![100, 1500, 1600]);
    assert_eq!(cleaned[1].author_names, vec!["A", "B"]);
    let codes: Vec<&str> = cleaned[1].jel_codes.iter().map(|c| c.as_str()).collect();
    assert_eq!(codes, vec!["B30", "J31"]);

    let analysis: Vec<AnalysisRecord> =
        serde_json::from_str(&fs::read_to_string(config.analysis_path()).unwrap()).unwrap();
    let counts: Vec<(u32, usize, usize, usize)> = analysis
        .iter()
        .map(|r| (r.paper.dp_number, r.row_index, r.authors_new, r.authors_returning))
        .collect();
    assert_eq!(counts, vec![(1500, 0, 1, 1), (1600, 1, 0, 1)]);

    for file in [
        "merged.json",
        "cleaned.csv",
        "analysis.csv",
        "monthly_trends.csv",
        "code_frequencies.csv",
        "author_frequencies.csv",
        "yearly_code_shares.csv",
        "code_co_occurrence.csv",
        "topic_slopes.csv",
        "topic_trends.csv",
    ] {
        assert!(build_dir.join(file).exists(), "{file} missing");
    }

    let analysis_csv = fs::read_to_string(config.analysis_csv_path()).unwrap();
    assert!(analysis_csv.contains("B30; J31"));
}

#[test]
fn test_invalid_month_aborts_clean_stage() {
    let dir = TempDir::new().unwrap();
    let raw_dir = dir.path().join("raw");
    fs::create_dir_all(&raw_dir).unwrap();
    write_record(&raw_dir, "10.json", paper(10, "2005", "Sept", &["A"], &["J31"]));

    let config = PipelineConfig::new(&raw_dir, dir.path().join("build"));
    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Clean(ref e) if e.dp_number() == 10));
}

#[test]
fn test_missing_raw_directory() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::new(dir.path().join("absent"), dir.path().join("build"));
    assert!(matches!(
        pipeline::run(&config),
        Err(PipelineError::Load(_))
    ));
}
