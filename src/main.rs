use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, warn};

use social_monitor::constants::{COMMENT_TEXT, DATE_UTC, DEFAULT_WINDOW, SENTIMENT, THEMES};
use social_monitor::pipeline::status::{artifact_status, report_preview};
use social_monitor::pipeline::{
    classify_comments, export_report, generate_candidates, normalize_exports, Normalizer, PipelineOrchestrator,
    Stage,
};
use social_monitor::{logging, metrics, Config, PipelinePaths, Result};

#[derive(Parser)]
#[command(name = "social_monitor")]
#[command(about = "Classify social-media comment exports into a monitoring report")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (defaults to $SOCIAL_MONITOR_CONFIG, then ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Write a Prometheus metrics snapshot to this file when the command finishes
    #[arg(long, global = true)]
    metrics_out: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate search queries from the keyword list
    Find {
        /// Lookback window such as 21d, 3w or 48h
        #[arg(long, default_value = DEFAULT_WINDOW)]
        window: String,
        /// Output CSV path
        #[arg(long)]
        out: PathBuf,
    },
    /// Normalize CSV exports from a directory
    ParseExports {
        /// Directory containing CSV exports
        #[arg(long = "in-dir", alias = "in_dir")]
        in_dir: PathBuf,
        /// Normalized CSV output path
        #[arg(long)]
        out: PathBuf,
    },
    /// Classify normalized comments with the configured rules
    Classify {
        /// Normalized CSV input path
        #[arg(long = "in")]
        input: PathBuf,
        /// Classified CSV output path
        #[arg(long)]
        out: PathBuf,
    },
    /// Copy the classified CSV to its final destination
    Export {
        #[arg(long = "in")]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Run every stage against the configured data directory
    Run {
        #[arg(long, default_value = DEFAULT_WINDOW)]
        window: String,
    },
    /// Show which artifacts exist and preview the final report
    Status {
        /// Print artifact status as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Commands that can run without a config file fall back to defaults when it is absent
fn config_or_default(config: Result<Config>, path: &Path) -> Result<Config> {
    match config {
        Ok(config) => Ok(config),
        Err(_) if !path.exists() => {
            warn!("No config at {}, using defaults", path.display());
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

fn print_status(paths: &PipelinePaths, json: bool) -> Result<()> {
    let status = artifact_status(paths);
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    for card in &status {
        match (card.exists, card.modified) {
            (true, Some(modified)) => println!(
                "✅ {:<13} {} ({} rows, modified {})",
                card.label,
                card.path.display(),
                card.rows.map(|r| r.to_string()).unwrap_or_else(|| "?".to_string()),
                modified.format("%Y-%m-%d %H:%M:%S")
            ),
            (true, None) => println!("✅ {:<13} {}", card.label, card.path.display()),
            (false, _) => println!("⏳ {:<13} {} (missing)", card.label, card.path.display()),
        }
    }

    if let Some(preview) = report_preview(paths, 25) {
        let columns = [DATE_UTC, SENTIMENT, THEMES, COMMENT_TEXT];
        println!("\n📄 Final report preview ({} rows)", preview.len());
        println!("{}", columns.join("\t"));
        for i in 0..preview.len() {
            let cells: Vec<String> = columns
                .iter()
                .map(|c| preview.get(i, c).unwrap_or("").chars().take(60).collect())
                .collect();
            println!("{}", cells.join("\t"));
        }
    }
    Ok(())
}

fn dispatch(command: Commands, config: Result<Config>, config_path: &Path) -> Result<()> {
    match command {
        Commands::Find { window, out } => {
            let config = config?;
            let output = generate_candidates(&config.keywords_file, &out, &window)?;
            println!("Wrote candidate queries -> {}", output.path.display());
        }
        Commands::ParseExports { in_dir, out } => {
            let config = config_or_default(config, config_path)?;
            let normalizer = Normalizer::new(&config.default_platform).with_alias_overrides(&config.aliases);
            let output = normalize_exports(&in_dir, &out, &normalizer)?;
            println!("Normalized -> {}", output.path.display());
        }
        Commands::Classify { input, out } => {
            let config = config?;
            let output = classify_comments(&input, &out, &config.rules)?;
            println!("Classified -> {}", output.path.display());
        }
        Commands::Export { input, out } => {
            let output = export_report(&input, &out)?;
            println!("Exported -> {}", output.path.display());
        }
        Commands::Run { window } => {
            let config = config?;
            let orchestrator = PipelineOrchestrator::from_config(config).with_window(window);
            let mut on_step = |stage: Stage, path: &Path| {
                println!("{} ready -> {}", stage.artifact_label(), path.display());
            };
            let result = orchestrator.run(Some(&mut on_step))?;
            println!(
                "✅ Pipeline complete -> {} ({} ms)",
                result.report.display(),
                result.duration().num_milliseconds()
            );
        }
        Commands::Status { json } => {
            let config = config_or_default(config, config_path)?;
            print_status(&PipelinePaths::from_root(&config.paths.data_dir), json)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config_path = Config::resolve_path(cli.config.as_deref());

    // Logging first, so warnings raised while loading the config are recorded
    let _log_guard = logging::init_logging(&Config::log_dir_hint(&config_path));
    let config = Config::load(&config_path);

    if cli.metrics_out.is_some() {
        metrics::init_metrics();
    }

    let outcome = dispatch(cli.command, config, &config_path);
    finish(outcome, cli.metrics_out.as_deref())
}

/// Flush the metrics snapshot, then map the command outcome to the process exit code
fn finish(outcome: Result<()>, metrics_out: Option<&Path>) -> ExitCode {
    if let Some(path) = metrics_out {
        let written = metrics::render_to_file(path).with_context(|| format!("writing metrics to {}", path.display()));
        if let Err(e) = written {
            warn!("{:#}", e);
        }
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("❌ {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use social_monitor::MonitorError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_metrics_write_failure_keeps_pipeline_exit_code() {
        metrics::init_metrics();
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "").unwrap();
        let metrics_out = blocker.join("monitor.prom");

        let empty = Err(MonitorError::EmptyInput { dir: dir.path().join("raw") });
        assert_eq!(finish(empty, Some(metrics_out.as_path())), ExitCode::from(3));

        let missing = Err(MonitorError::MissingInput { path: dir.path().join("kw.txt") });
        assert_eq!(finish(missing, Some(metrics_out.as_path())), ExitCode::from(2));
        assert!(!metrics_out.exists());
    }

    #[test]
    fn test_metrics_written_after_success() {
        metrics::init_metrics();
        let dir = tempdir().unwrap();
        let metrics_out = dir.path().join("out/monitor.prom");

        assert_eq!(finish(Ok(()), Some(metrics_out.as_path())), ExitCode::SUCCESS);
        assert!(metrics_out.is_file());
    }
}
