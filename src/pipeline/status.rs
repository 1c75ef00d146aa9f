use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::PipelinePaths;
use crate::table::Table;

/// Presence of one stage artifact on disk
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactStatus {
    pub label: &'static str,
    pub path: PathBuf,
    pub exists: bool,
    pub modified: Option<DateTime<Local>>,
    /// Data rows, when the file exists and parses
    pub rows: Option<usize>,
}

fn inspect(label: &'static str, path: &Path) -> ArtifactStatus {
    let modified = path
        .metadata()
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Local>::from);
    let rows = if path.is_file() {
        match Table::read_csv(path) {
            Ok(table) => Some(table.len()),
            Err(e) => {
                debug!("Could not read {} for status: {}", path.display(), e);
                None
            }
        }
    } else {
        None
    };

    ArtifactStatus {
        label,
        path: path.to_path_buf(),
        exists: path.is_file(),
        modified,
        rows,
    }
}

/// One entry per artifact, in pipeline order
pub fn artifact_status(paths: &PipelinePaths) -> Vec<ArtifactStatus> {
    [
        ("Candidates", &paths.candidates),
        ("Normalized", &paths.normalized),
        ("Classified", &paths.classified),
        ("Final Report", &paths.report),
    ]
    .into_iter()
    .map(|(label, path)| inspect(label, path))
    .collect()
}

/// First `limit` rows of the final report, if it can be read
pub fn report_preview(paths: &PipelinePaths, limit: usize) -> Option<Table> {
    if !paths.report.is_file() {
        return None;
    }
    Table::read_csv(&paths.report).ok().map(|t| t.head(limit))
}
