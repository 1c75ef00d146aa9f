//! The four pipeline stages. Each one takes explicit input and output paths,
//! reports the artifact it wrote, and overwrites that artifact on re-run.

use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument};

use super::normalize::Normalizer;
use super::schema::enforce_schema;
use super::Stage;
use crate::classify::{Classifier, RuleSet};
use crate::constants::{COMMENT_TEXT, CONFIDENCE, NOTES, QUERY, SENTIMENT, THEMES};
use crate::error::{MonitorError, Result};
use crate::metrics::StageMetrics;
use crate::table::{ensure_parent, read_csv_dir, Table};
use crate::window::parse_window;

/// What a stage wrote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutput {
    pub path: PathBuf,
    /// Data rows in the artifact; `None` when the stage does not parse it
    pub rows: Option<usize>,
}

impl StageOutput {
    fn table(path: &Path, table: &Table) -> Self {
        Self {
            path: path.to_path_buf(),
            rows: Some(table.len()),
        }
    }
}

/// Record timing and row counts for one stage invocation
fn observed<T>(stage: Stage, rows: impl Fn(&T) -> usize, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let started = Instant::now();
    match f() {
        Ok(value) => {
            StageMetrics::record_stage_success(stage.name(), rows(&value), started.elapsed().as_secs_f64());
            Ok(value)
        }
        Err(e) => {
            StageMetrics::record_stage_failure(stage.name());
            Err(e)
        }
    }
}

/// Read the keyword list (one query per line, blanks dropped) into a `query` table
pub fn candidates_table(keywords_path: &Path) -> Result<Table> {
    if !keywords_path.is_file() {
        return Err(MonitorError::MissingInput { path: keywords_path.to_path_buf() });
    }
    let content = fs::read_to_string(keywords_path).map_err(|e| MonitorError::read_file(keywords_path, e))?;

    let mut table = Table::new([QUERY]);
    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        table.push_row(vec![line.to_string()]);
    }
    Ok(table)
}

/// Stage 1: write the search-query candidates table
#[instrument(skip_all, fields(keywords = %keywords_path.display()))]
pub fn generate_candidates(keywords_path: &Path, out_path: &Path, window: &str) -> Result<StageOutput> {
    let table = observed(Stage::Candidates, Table::len, || {
        let window = parse_window(window, Utc::now());
        debug!("Lookback window {} .. {}", window.start.to_rfc3339(), window.end.to_rfc3339());

        let table = candidates_table(keywords_path)?;
        table.write_csv(out_path)?;
        Ok(table)
    })?;

    info!("Wrote {} candidate queries -> {}", table.len(), out_path.display());
    Ok(StageOutput::table(out_path, &table))
}

/// Read every export in `in_dir` and normalize it. Zero source rows is an error.
pub fn normalize_dir(in_dir: &Path, normalizer: &Normalizer) -> Result<Table> {
    let combined = read_csv_dir(in_dir)?;
    if combined.is_empty() {
        return Err(MonitorError::EmptyInput { dir: in_dir.to_path_buf() });
    }
    Ok(normalizer.normalize(&combined))
}

/// Stage 2: normalize raw exports into the eight-column table
#[instrument(skip_all, fields(in_dir = %in_dir.display()))]
pub fn normalize_exports(in_dir: &Path, out_path: &Path, normalizer: &Normalizer) -> Result<StageOutput> {
    let table = observed(Stage::Normalize, Table::len, || {
        let table = normalize_dir(in_dir, normalizer)?;
        table.write_csv(out_path)?;
        Ok(table)
    })?;

    info!("Normalized {} rows -> {}", table.len(), out_path.display());
    Ok(StageOutput::table(out_path, &table))
}

/// Score, tag and schema-enforce every row of a normalized table
pub fn classify_table(normalized: &Table, rules: &RuleSet) -> Table {
    let classifier = Classifier::new(rules);
    let text_idx = normalized.column_index(COMMENT_TEXT);

    let mut sentiments = Vec::with_capacity(normalized.len());
    let mut themes = Vec::with_capacity(normalized.len());
    let mut confidences = Vec::with_capacity(normalized.len());
    let mut notes = Vec::with_capacity(normalized.len());

    for row in normalized.rows() {
        let text = text_idx.map(|i| row[i].as_str()).unwrap_or("");
        let classification = classifier.classify(text);
        StageMetrics::record_sentiment(classification.sentiment.as_str());
        StageMetrics::record_relevance(classification.relevance.as_str());

        sentiments.push(classification.sentiment.to_string());
        themes.push(classification.themes_field());
        confidences.push(classification.confidence_field());
        notes.push(classification.notes);
    }

    let mut classified = normalized.clone();
    classified.set_column(SENTIMENT, sentiments);
    classified.set_column(THEMES, themes);
    classified.set_column(CONFIDENCE, confidences);
    classified.set_column(NOTES, notes);
    enforce_schema(&classified)
}

/// Stage 3: classify the normalized artifact with one rule set
#[instrument(skip_all, fields(input = %in_path.display()))]
pub fn classify_comments(in_path: &Path, out_path: &Path, rules: &RuleSet) -> Result<StageOutput> {
    let table = observed(Stage::Classify, Table::len, || {
        let normalized = Table::read_csv(in_path)?;
        let classified = classify_table(&normalized, rules);
        classified.write_csv(out_path)?;
        Ok(classified)
    })?;

    info!("Classified {} rows -> {}", table.len(), out_path.display());
    Ok(StageOutput::table(out_path, &table))
}

fn sha256_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| MonitorError::read_file(path, e))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Stage 4: copy the classified artifact byte-for-byte to the report location
#[instrument(skip_all, fields(input = %in_path.display()))]
pub fn export_report(in_path: &Path, out_path: &Path) -> Result<StageOutput> {
    let digest = observed(Stage::Export, |_: &String| 0, || {
        if !in_path.is_file() {
            return Err(MonitorError::MissingInput { path: in_path.to_path_buf() });
        }
        let source_digest = sha256_file(in_path)?;

        let same_file = match (in_path.canonicalize(), out_path.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if !same_file {
            ensure_parent(out_path)?;
            fs::copy(in_path, out_path).map_err(|e| MonitorError::write_file(out_path, e))?;
        }

        if sha256_file(out_path)? != source_digest {
            return Err(MonitorError::Checksum { path: out_path.to_path_buf() });
        }
        Ok(source_digest)
    })?;

    info!("Exported -> {} (sha256 {})", out_path.display(), digest);
    Ok(StageOutput {
        path: out_path.to_path_buf(),
        rows: None,
    })
}
