use review_charts::aggregate::{aggregate_quarters, sum_by_category, top_n_with_other};
use review_charts::config::ChartConfig;
use review_charts::fetch::BasicClient;
use review_charts::ingest::{
    CategoryTotal, QuarterAggregate, RawRecord, RejectReason, ReviewSchema, ingest_reviews,
};
use review_charts::loader::Loader;
use review_charts::publish::FileSink;
use review_charts::series::{ChartKind, ChartSeries, ChartSpec, run_chart};
use std::fs;
use std::path::PathBuf;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn loader() -> Loader<BasicClient> {
    Loader::new(BasicClient::new()).with_base_dir(fixtures())
}

fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_scenario_a_mixed_vote_encodings() {
    let schema = ReviewSchema {
        date_column: "date".to_string(),
        vote_column: "vote".to_string(),
        ..ReviewSchema::boolean_coded()
    };
    let rows = vec![
        RawRecord::from_pairs([("date", "2022-07-15"), ("vote", "TRUE")]),
        RawRecord::from_pairs([("date", "2022-08-01"), ("vote", "1")]),
        RawRecord::from_pairs([("date", "2022-10-01"), ("vote", "false")]),
    ];

    let (records, _) = ingest_reviews(&rows, &schema);
    let aggregates = aggregate_quarters(&records);

    assert_eq!(
        aggregates,
        vec![
            QuarterAggregate {
                quarter_start: date(2022, 7, 1),
                positive_count: 2,
                negative_count: 0,
            },
            QuarterAggregate {
                quarter_start: date(2022, 10, 1),
                positive_count: 0,
                negative_count: 1,
            },
        ]
    );
}

#[test]
fn test_scenario_c_playtime_top_one() {
    let rows = vec![
        RawRecord::from_pairs([("lang", "en"), ("playtime", "100")]),
        RawRecord::from_pairs([("lang", "en"), ("playtime", "50")]),
        RawRecord::from_pairs([("lang", "fr"), ("playtime", "30")]),
    ];

    let (totals, _) = sum_by_category(&rows, "lang", "playtime");
    assert_eq!(totals, vec![CategoryTotal::new("en", 150.0), CategoryTotal::new("fr", 30.0)]);

    let top = top_n_with_other(totals, 1);
    assert_eq!(top, vec![CategoryTotal::new("en", 150.0), CategoryTotal::new("Other", 30.0)]);
}

#[tokio::test]
async fn test_boolean_fixture_drops_empty_date() {
    let rows = loader().load("reviews_boolean.csv").await.unwrap();
    assert_eq!(rows.len(), 5);

    let (records, report) = ingest_reviews(&rows, &ReviewSchema::boolean_coded());
    let aggregates = aggregate_quarters(&records);
    let counted: u64 = aggregates.iter().map(QuarterAggregate::total).sum();

    assert_eq!(counted, 4);
    assert_eq!(report.rejected_for(RejectReason::MissingDate), 1);
    assert_eq!(aggregates[1].negative_count, 2);
}

#[tokio::test]
async fn test_label_fixture_pipeline() {
    let rows = loader().load("reviews_label.csv").await.unwrap();
    let (records, report) = ingest_reviews(&rows, &ReviewSchema::label_coded());

    assert_eq!(report.rows_read, 9);
    assert_eq!(report.accepted, 6);
    assert_eq!(report.rejected_for(RejectReason::MissingDate), 1);
    assert_eq!(report.rejected_for(RejectReason::MissingVote), 1);
    assert_eq!(report.rejected_for(RejectReason::InvalidDate), 1);

    let aggregates = aggregate_quarters(&records);
    let starts: Vec<_> = aggregates.iter().map(|a| a.quarter_start).collect();
    assert_eq!(starts, vec![date(2022, 7, 1), date(2022, 10, 1), date(2023, 7, 1)]);
    assert_eq!(aggregates[0].positive_count, 3);
    assert_eq!(aggregates[1].negative_count, 2);
    assert_eq!(aggregates[1].positive_count, 0);
}

#[tokio::test]
async fn test_run_chart_writes_files() {
    let out = std::env::temp_dir().join("review_charts_it_run_chart");
    let _ = fs::remove_dir_all(&out);
    let sink = FileSink::new(&out);

    let spec = ChartSpec {
        name: "playtime".to_string(),
        source: "playtime.csv".to_string(),
        kind: ChartKind::CategorySum {
            category_column: "language".to_string(),
            value_column: "playtime_at_review".to_string(),
            top_n: Some(2),
        },
    };

    let run = run_chart(&loader(), &spec, &sink).await.unwrap();

    assert!(run.load_error.is_none());
    assert_eq!(
        run.series,
        ChartSeries::Categories(vec![
            CategoryTotal::new("english", 150.0),
            CategoryTotal::new("schinese", 80.0),
            CategoryTotal::new("Other", 35.0),
        ])
    );
    assert_eq!(run.report.rejected_for(RejectReason::MissingCategory), 1);
    assert!(out.join("playtime.json").exists());
    assert!(out.join("playtime.csv").exists());

    fs::remove_dir_all(&out).unwrap();
}

#[tokio::test]
async fn test_run_chart_load_failure_yields_empty_series() {
    let out = std::env::temp_dir().join("review_charts_it_load_failure");
    let _ = fs::remove_dir_all(&out);
    let sink = FileSink::new(&out);

    let spec = ChartSpec {
        name: "missing".to_string(),
        source: "no_such_file.csv".to_string(),
        kind: ChartKind::Quarterly {
            schema: ReviewSchema::label_coded(),
            chronological: false,
        },
    };

    let run = run_chart(&loader(), &spec, &sink).await.unwrap();

    assert_eq!(run.series, ChartSeries::Quarterly(Vec::new()));
    assert!(run.load_error.is_some());
    assert!(out.join("missing.error.json").exists());
    assert!(!out.join("missing.json").exists());

    fs::remove_dir_all(&out).unwrap();
}

#[tokio::test]
async fn test_players_fixture_filtered_by_year() {
    let spec = ChartSpec {
        name: "players".to_string(),
        source: "steamcharts.csv".to_string(),
        kind: ChartKind::Players {
            label_column: "Month".to_string(),
            value_column: "Avg. Players".to_string(),
            year: Some(2024),
        },
    };
    let rows = loader().load(&spec.source).await.unwrap();
    let (series, _) = review_charts::series::assemble(&spec.kind, &rows);

    let ChartSeries::Players(points) = series else {
        panic!("expected player series");
    };
    let labels: Vec<_> = points.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["February 2024", "January 2024"]);
    assert_eq!(points[0].players, 33010.7);
}

#[tokio::test]
async fn test_language_map_from_fixture() {
    let rows = loader().load("reviews_label.csv").await.unwrap();
    let kind = ChartKind::LanguageMap {
        category_column: "language".to_string(),
    };
    let (series, report) = review_charts::series::assemble(&kind, &rows);

    let ChartSeries::LanguageMap(points) = series else {
        panic!("expected language map series");
    };
    assert_eq!(points[0].language, "english");
    assert_eq!(points[0].count, 4);
    assert_eq!(points.len(), 5);
    assert_eq!(report.rejected_for(RejectReason::MissingCategory), 1);
}

#[test]
fn test_builtin_config_names_are_unique() {
    let config = ChartConfig::builtin();
    let json = serde_json::to_string(&config).unwrap();
    assert!(ChartConfig::from_json(&json).is_ok());
    assert_eq!(config.charts.len(), 4);
}

#[tokio::test]
async fn test_run_chart_malformed_csv_is_parse_failure() {
    let dir = std::env::temp_dir().join("review_charts_it_parse_failure");
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("bad.csv"), b"timestamp,rating\n\xff\xfe,positive\n").unwrap();

    let out = dir.join("out");
    let sink = FileSink::new(&out);
    let spec = ChartSpec {
        name: "bad".to_string(),
        source: "bad.csv".to_string(),
        kind: ChartKind::Quarterly {
            schema: ReviewSchema::label_coded(),
            chronological: false,
        },
    };

    let run = run_chart(&Loader::new(BasicClient::new()).with_base_dir(&dir), &spec, &sink)
        .await
        .unwrap();

    assert_eq!(run.series, ChartSeries::Quarterly(Vec::new()));
    assert_eq!(run.load_error.as_deref(), Some("failed to parse 'bad.csv' as CSV"));
    let diag = fs::read_to_string(out.join("bad.error.json")).unwrap();
    assert!(diag.contains("parse_error"));

    fs::remove_dir_all(&dir).unwrap();
}
