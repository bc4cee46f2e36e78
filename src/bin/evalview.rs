//! evalview - inspect the predictions of an ML run.
//!
//! Renders confusion matrices, class distributions and metrics from local
//! prediction files, evaluation arrays, or runs fetched from the catalog.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use evalview::api::{HttpRunSource, MatrixSource, NameCache, RunAnalyzer, RunEnvelope};
use evalview::config::Config;
use evalview::eval::{class_distribution, ConfusionMatrix, PredictionFile};
use evalview::output::{PngEncoder, TerminalTable};
use evalview::plots::ConfusionHeatmap;

/// evalview: confusion matrices and class distributions for ML runs
#[derive(Parser, Debug)]
#[command(name = "evalview")]
#[command(author = "PAIML Team")]
#[command(version)]
#[command(about = "Confusion matrices and class distributions for ML runs", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    plain: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Confusion matrix and metrics from a predictions file
    Matrix {
        /// ARFF predictions file
        file: PathBuf,

        /// Also write a PNG heatmap
        #[arg(long)]
        png: Option<PathBuf>,
    },

    /// Per-class correct/incorrect counts from a predictions file
    Distribution {
        /// ARFF predictions file
        file: PathBuf,
    },

    /// Confusion matrix from a run JSON or a bare `array_data` object
    Array {
        /// JSON file
        file: PathBuf,

        /// Also write a PNG heatmap
        #[arg(long)]
        png: Option<PathBuf>,
    },

    /// Search request for a result page, clamped to the index window
    Page {
        /// 1-based page number
        page: u64,

        /// Hits per page
        #[arg(long, default_value = "20")]
        size: u64,

        /// Total hit count reported by the index
        #[arg(long)]
        total: Option<u64>,
    },

    /// Fetch a run from the catalog and analyze it
    Run {
        /// Run id
        run_id: u64,

        /// Also write a PNG heatmap
        #[arg(long)]
        png: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = evalview::logging::init(cli.verbose) {
        eprintln!("warning: logging disabled: {err}");
    }

    let config_path = cli.config.clone().or_else(Config::default_path).unwrap_or_default();
    let mut config = Config::load_or_default(&config_path).with_env();
    if cli.plain {
        config.render.ansi = false;
    }

    let table = TerminalTable::new().ansi(config.render.ansi).cell_width(config.render.cell_width);

    match cli.command {
        Command::Matrix { file, png } => {
            let predictions = PredictionFile::parse(&read_text(&file)?);
            let matrix = ConfusionMatrix::from_predictions(&predictions.records);
            show_matrix(&table, &matrix);
            write_png(&matrix, png.as_deref(), &config)?;
        }
        Command::Distribution { file } => {
            let predictions = PredictionFile::parse(&read_text(&file)?);
            print!("{}", table.render_distribution(&class_distribution(&predictions.records)));
        }
        Command::Array { file, png } => {
            let array = read_array_data(&file)?;
            let matrix = ConfusionMatrix::from_array_data(&array);
            show_matrix(&table, &matrix);
            write_png(&matrix, png.as_deref(), &config)?;
        }
        Command::Page { page, size, total } => {
            let window = config.search.result_window();
            match window.page(page, size) {
                Some(request) => println!("from={} size={}", request.from, request.size),
                None => println!("page {page} is beyond the result window of {}", window.max_window()),
            }
            if let Some(total) = total {
                println!(
                    "last page {} of {} reachable hits{}",
                    window.last_page(total, size),
                    window.reachable_total(total),
                    if window.is_truncated(total) { " (truncated)" } else { "" }
                );
            }
        }
        Command::Run { run_id, png } => {
            let source = HttpRunSource::new(config.api.clone());
            let mut analyzer = RunAnalyzer::new(source, NameCache::new(config.cache.capacity));
            let ticket = analyzer.begin(run_id);
            let analysis = analyzer
                .analyze_latest(&ticket)
                .with_context(|| format!("failed to analyze run {run_id}"))?
                .context("request was superseded")?;

            let flow = match (analysis.run.flow_name.clone(), analysis.run.flow_id) {
                (Some(name), _) => Some(name),
                (None, Some(flow_id)) => analyzer.flow_name(flow_id).unwrap_or_else(|err| {
                    tracing::warn!(%err, flow_id, "flow name unavailable");
                    None
                }),
                (None, None) => None,
            };
            println!("run {run_id}{}", flow.map(|f| format!(" ({f})")).unwrap_or_default());

            let origin = match analysis.source {
                MatrixSource::Predictions => "predictions file",
                MatrixSource::EvaluationArray => "confusion_matrix evaluation",
                MatrixSource::None => "none",
            };
            println!("matrix source: {origin}\n");

            show_matrix(&table, &analysis.matrix);
            if !analysis.distribution.is_empty() {
                println!();
                print!("{}", table.render_distribution(&analysis.distribution));
            }
            write_png(&analysis.matrix, png.as_deref(), &config)?;
        }
    }

    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Accept `{"run": {...}}`, a bare run description, or a bare `array_data` object.
fn read_array_data(path: &Path) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(&read_text(path)?)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let run = match &value {
        Value::Object(map) if map.contains_key("run") => {
            Some(serde_json::from_value::<RunEnvelope>(value.clone())?.run)
        }
        Value::Object(map) if map.contains_key("run_id") => Some(serde_json::from_value(value.clone())?),
        _ => None,
    };

    match (run, value) {
        (Some(run), _) => Ok(run.confusion_array().cloned().unwrap_or_default()),
        (None, Value::Object(map)) => Ok(map),
        (None, _) => anyhow::bail!("{} does not contain a JSON object", path.display()),
    }
}

fn show_matrix(table: &TerminalTable, matrix: &ConfusionMatrix) {
    print!("{}", table.render_matrix(matrix));
    if !matrix.is_empty() {
        println!();
        print!("{}", table.render_metrics(&matrix.metrics()));
    }
}

fn write_png(matrix: &ConfusionMatrix, path: Option<&Path>, config: &Config) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let heatmap = ConfusionHeatmap::new(matrix)
        .cell_size(config.render.cell_pixels)
        .build()
        .context("nothing to render")?;
    let fb = heatmap.to_framebuffer()?;
    PngEncoder::write_to_file(&fb, path).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote heatmap");
    Ok(())
}
