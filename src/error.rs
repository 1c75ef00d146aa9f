use std::path::PathBuf;
use thiserror::Error;

use crate::constants::{EXIT_EMPTY_INPUT, EXIT_FAILURE, EXIT_MISSING_INPUT};
use crate::pipeline::Stage;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing input: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("No CSV rows found in {}", dir.display())]
    EmptyInput { dir: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: Box<MonitorError>,
    },

    #[error("Failed to write {}: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: Box<MonitorError>,
    },

    #[error("Export verification failed for {}: digest mismatch", path.display())]
    Checksum { path: PathBuf },

    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<MonitorError>,
    },
}

impl MonitorError {
    pub fn read_file(path: impl Into<PathBuf>, source: impl Into<MonitorError>) -> Self {
        MonitorError::ReadFile {
            path: path.into(),
            source: Box::new(source.into()),
        }
    }

    pub fn write_file(path: impl Into<PathBuf>, source: impl Into<MonitorError>) -> Self {
        MonitorError::WriteFile {
            path: path.into(),
            source: Box::new(source.into()),
        }
    }

    /// Strip any stage wrapper and return the underlying condition
    pub fn root(&self) -> &MonitorError {
        match self {
            MonitorError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// The stage that failed, when the error came out of the orchestrator
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            MonitorError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Process exit code so batch callers can tell missing from empty input
    pub fn exit_code(&self) -> i32 {
        match self.root() {
            MonitorError::MissingInput { .. } => EXIT_MISSING_INPUT,
            MonitorError::EmptyInput { .. } => EXIT_EMPTY_INPUT,
            _ => EXIT_FAILURE,
        }
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_see_through_stage_wrapper() {
        let empty = MonitorError::Stage {
            stage: Stage::Normalize,
            source: Box::new(MonitorError::EmptyInput { dir: PathBuf::from("data/raw") }),
        };
        assert_eq!(empty.exit_code(), EXIT_EMPTY_INPUT);
        assert_eq!(empty.failed_stage(), Some(Stage::Normalize));

        let missing = MonitorError::MissingInput { path: PathBuf::from("keywords.txt") };
        assert_eq!(missing.exit_code(), EXIT_MISSING_INPUT);
        assert_eq!(missing.failed_stage(), None);

        assert_eq!(MonitorError::Config("bad".into()).exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn test_messages_name_the_path() {
        let err = MonitorError::MissingInput { path: PathBuf::from("config/keywords.txt") };
        assert!(err.to_string().contains("config/keywords.txt"));

        let err = MonitorError::EmptyInput { dir: PathBuf::from("data/raw") };
        assert!(err.to_string().contains("data/raw"));
    }
}
