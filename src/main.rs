//! CLI entry point for the review chart data builder.
//!
//! Each subcommand loads one dataset, validates and aggregates it, and writes
//! the resulting series for the chart front end. `build` runs a whole chart
//! configuration at once.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use review_charts::config::{ChartConfig, DATA_DIR_ENV};
use review_charts::fetch::BasicClient;
use review_charts::ingest::{ReviewSchema, VotePolicy};
use review_charts::loader::Loader;
use review_charts::publish::{FanOut, FileSink, LogSink, PathSink, S3Sink, SeriesSink};
use review_charts::series::{ChartKind, ChartRun, ChartSpec, run_chart};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Instrument;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "review_charts")]
#[command(about = "Build chart data series from Steam review datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// `true`, `TRUE` or `1` is a positive vote
    Boolean,
    /// A text label (see --positive-label) is a positive vote
    Label,
}

#[derive(Subcommand)]
enum Commands {
    /// Positive and negative reviews per calendar quarter
    Quarterly {
        /// Path or URL of the review CSV
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// How the vote column is encoded
        #[arg(short, long, value_enum, default_value_t = PolicyArg::Label)]
        policy: PolicyArg,

        /// Column holding the review date (defaults depend on --policy)
        #[arg(long)]
        date_column: Option<String>,

        /// Column holding the vote indicator (defaults depend on --policy)
        #[arg(long)]
        vote_column: Option<String>,

        /// Label treated as a positive vote with --policy label
        #[arg(long, default_value = "positive")]
        positive_label: String,

        /// Sort quarters oldest first instead of first-seen order
        #[arg(long, default_value_t = false)]
        chronological: bool,

        /// File to write the series to (.json or .csv); logs it when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Total playtime per language, top N plus "Other"
    Playtime {
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        #[arg(long, default_value = "language")]
        category_column: String,

        #[arg(long, default_value = "playtime_at_review")]
        value_column: String,

        /// Number of languages kept before folding the rest into "Other" (0 keeps all)
        #[arg(short = 'n', long, default_value_t = 3)]
        top_n: usize,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Review count per language, optionally as world map points
    Languages {
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        #[arg(long, default_value = "language")]
        column: String,

        /// Emit map points (language, count, longitude, latitude)
        #[arg(long, default_value_t = false)]
        map: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Average players per month from a SteamCharts export
    Players {
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Only keep months of this year
        #[arg(short, long)]
        year: Option<i32>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build every chart of a configuration file concurrently
    Build {
        /// Chart configuration JSON; the built-in site charts when omitted
        #[arg(short, long)]
        config: Option<String>,

        /// Directory to write <chart>.json and <chart>.csv into
        #[arg(short = 'd', long, default_value = "charts")]
        output_dir: String,

        /// Maximum number of charts loading at once
        #[arg(short = 'j', long, default_value_t = 4)]
        concurrency: usize,

        /// Optional: S3 bucket to upload chart JSON to as well
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Key prefix for uploaded chart JSON
        #[arg(long, default_value = "charts")]
        s3_prefix: String,

        /// Optional: gzip chart JSON before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/review_charts.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("review_charts.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let loader = match std::env::var(DATA_DIR_ENV) {
        Ok(dir) => Loader::new(BasicClient::new()).with_base_dir(dir),
        Err(_) => Loader::new(BasicClient::new()),
    };

    match cli.command {
        Commands::Quarterly {
            source,
            policy,
            date_column,
            vote_column,
            positive_label,
            chronological,
            output,
        } => {
            let mut schema = match policy {
                PolicyArg::Boolean => ReviewSchema::boolean_coded(),
                PolicyArg::Label => ReviewSchema {
                    policy: VotePolicy::Label {
                        positive: positive_label,
                    },
                    ..ReviewSchema::label_coded()
                },
            };
            if let Some(col) = date_column {
                schema.date_column = col;
            }
            if let Some(col) = vote_column {
                schema.vote_column = col;
            }

            let spec = ChartSpec {
                name: "quarterly".to_string(),
                source,
                kind: ChartKind::Quarterly {
                    schema,
                    chronological,
                },
            };
            run_single(&loader, spec, output).await?;
        }
        Commands::Playtime {
            source,
            category_column,
            value_column,
            top_n,
            output,
        } => {
            let spec = ChartSpec {
                name: "playtime".to_string(),
                source,
                kind: ChartKind::CategorySum {
                    category_column,
                    value_column,
                    top_n: (top_n > 0).then_some(top_n),
                },
            };
            run_single(&loader, spec, output).await?;
        }
        Commands::Languages {
            source,
            column,
            map,
            output,
        } => {
            let kind = if map {
                ChartKind::LanguageMap {
                    category_column: column,
                }
            } else {
                ChartKind::CategoryCount {
                    category_column: column,
                }
            };
            let spec = ChartSpec {
                name: "languages".to_string(),
                source,
                kind,
            };
            run_single(&loader, spec, output).await?;
        }
        Commands::Players {
            source,
            year,
            output,
        } => {
            let spec = ChartSpec {
                name: "players".to_string(),
                source,
                kind: ChartKind::Players {
                    label_column: "Month".to_string(),
                    value_column: "Avg. Players".to_string(),
                    year,
                },
            };
            run_single(&loader, spec, output).await?;
        }
        Commands::Build {
            config,
            output_dir,
            concurrency,
            s3_bucket,
            s3_prefix,
            gzip,
        } => {
            let config = match config {
                Some(path) => ChartConfig::load(&path)?,
                None => ChartConfig::builtin(),
            };
            build_all(loader, config, &output_dir, concurrency, s3_bucket, &s3_prefix, gzip).await?;
        }
    }

    Ok(())
}

/// Runs one chart, writing to `output` when given and logging the series otherwise.
async fn run_single(loader: &Loader<BasicClient>, spec: ChartSpec, output: Option<PathBuf>) -> Result<()> {
    let sink: Box<dyn SeriesSink> = match output {
        Some(path) => Box::new(PathSink::new(path)),
        None => Box::new(LogSink),
    };
    let run = run_chart(loader, &spec, sink.as_ref()).await?;
    log_run(&run);
    Ok(())
}

fn log_run(run: &ChartRun) {
    match &run.load_error {
        Some(err) => warn!(chart = %run.chart, error = %err, "Chart produced no data"),
        None => info!(
            chart = %run.chart,
            points = run.series.len(),
            accepted = run.report.accepted,
            rejected = run.report.rejected_total(),
            "Chart complete"
        ),
    }
}

/// Builds every chart in `config`, each in its own task with its own rows.
#[tracing::instrument(skip(loader, config, s3_bucket, s3_prefix, gzip), fields(charts = config.charts.len()))]
async fn build_all(
    loader: Loader<BasicClient>,
    config: ChartConfig,
    output_dir: &str,
    concurrency: usize,
    s3_bucket: Option<String>,
    s3_prefix: &str,
    gzip: bool,
) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;

    let mut sinks: Vec<Box<dyn SeriesSink>> = vec![Box::new(FileSink::new(output_dir))];
    if let Some(bucket) = s3_bucket {
        info!(bucket = %bucket, prefix = s3_prefix, gzip, "S3 upload enabled");
        sinks.push(Box::new(S3Sink::from_env(bucket, gzip).await.with_prefix(s3_prefix)));
    }
    let sink: Arc<dyn SeriesSink> = Arc::new(FanOut(sinks));
    let loader = Arc::new(loader);
    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrency.max(1)));

    let mut tasks = vec![];

    for spec in config.charts {
        let sem = semaphore.clone();
        let loader = loader.clone();
        let sink = sink.clone();

        let chart_span = tracing::info_span!("build_chart", chart = %spec.name);

        let task = tokio::spawn(
            async move {
                let _permit = sem.acquire_owned().await?;
                run_chart(loader.as_ref(), &spec, sink.as_ref()).await
            }
            .instrument(chart_span),
        );
        tasks.push(task);
    }

    let mut failed = 0usize;
    let mut empty = 0usize;
    for task in tasks {
        match task.await {
            Ok(Ok(run)) => {
                if run.load_error.is_some() {
                    empty += 1;
                }
                log_run(&run);
            }
            Ok(Err(e)) => {
                failed += 1;
                error!(error = %e, "Failed to publish chart");
            }
            Err(e) => {
                failed += 1;
                error!(error = %e, "Chart task panicked");
            }
        }
    }

    info!(output_dir, failed, empty, "Finished building charts");
    Ok(())
}
