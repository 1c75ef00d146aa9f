use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, info_span};
use uuid::Uuid;

use super::normalize::Normalizer;
use super::stages::{classify_comments, export_report, generate_candidates, normalize_exports, StageOutput};
use super::Stage;
use crate::config::{Config, PipelinePaths};
use crate::constants::DEFAULT_WINDOW;
use crate::error::{MonitorError, Result};

/// Outcome of one completed stage within a run
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub output: PathBuf,
    pub rows: Option<usize>,
    pub duration_ms: u128,
}

/// Result of executing the full pipeline
#[derive(Debug, Clone, Serialize)]
pub struct PipelineExecutionResult {
    pub run_id: Uuid,
    pub stages: Vec<StageReport>,
    pub report: PathBuf,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl PipelineExecutionResult {
    pub fn duration(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }
}

/// Runs the four stages in order against one artifact layout
pub struct PipelineOrchestrator {
    config: Config,
    paths: PipelinePaths,
    normalizer: Normalizer,
    window: String,
}

impl PipelineOrchestrator {
    pub fn new(config: Config, paths: PipelinePaths) -> Self {
        let normalizer = Normalizer::new(&config.default_platform).with_alias_overrides(&config.aliases);
        Self {
            config,
            paths,
            normalizer,
            window: DEFAULT_WINDOW.to_string(),
        }
    }

    /// Use the artifact layout under the configured data directory
    pub fn from_config(config: Config) -> Self {
        let paths = PipelinePaths::from_root(&config.paths.data_dir);
        Self::new(config, paths)
    }

    pub fn with_window(mut self, window: impl Into<String>) -> Self {
        self.window = window.into();
        self
    }

    pub fn paths(&self) -> &PipelinePaths {
        &self.paths
    }

    /// Run a single stage independently against the configured paths
    pub fn run_step(&self, stage: Stage) -> Result<StageOutput> {
        let paths = &self.paths;
        match stage {
            Stage::Candidates => generate_candidates(&self.config.keywords_file, &paths.candidates, &self.window),
            Stage::Normalize => normalize_exports(&paths.raw_dir, &paths.normalized, &self.normalizer),
            Stage::Classify => classify_comments(&paths.normalized, &paths.classified, &self.config.rules),
            Stage::Export => export_report(&paths.classified, &paths.report),
        }
    }

    /// Run every stage in order, stopping at the first failure.
    ///
    /// `on_step` is called with the stage and its output path after each stage
    /// completes. A failure is returned as [`MonitorError::Stage`] naming the stage.
    pub fn run(&self, mut on_step: Option<&mut dyn FnMut(Stage, &Path)>) -> Result<PipelineExecutionResult> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", run_id = %run_id);
        let _enter = span.enter();

        let started_at = Utc::now();
        info!("🚀 Starting pipeline run, data under {}", self.paths.raw_dir.display());

        let mut stages = Vec::with_capacity(Stage::ALL.len());
        for (index, stage) in Stage::ALL.into_iter().enumerate() {
            info!("🔄 Executing step {}/{}: {}", index + 1, Stage::ALL.len(), stage);
            let t_stage = Instant::now();

            let output = self.run_step(stage).map_err(|e| {
                error!("❌ Stopping pipeline, step '{}' failed: {}", stage, e);
                MonitorError::Stage {
                    stage,
                    source: Box::new(e),
                }
            })?;

            if let Some(callback) = on_step.as_mut() {
                callback(stage, &output.path);
            }
            stages.push(StageReport {
                stage,
                output: output.path,
                rows: output.rows,
                duration_ms: t_stage.elapsed().as_millis(),
            });
        }

        let completed_at = Utc::now();
        info!(
            "🎉 Pipeline completed in {} ms -> {}",
            (completed_at - started_at).num_milliseconds(),
            self.paths.report.display()
        );

        Ok(PipelineExecutionResult {
            run_id,
            stages,
            report: self.paths.report.clone(),
            started_at,
            completed_at,
        })
    }
}
