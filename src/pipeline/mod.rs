//! Staged pipeline: candidates -> normalize -> classify -> export.
//!
//! Every stage reads the previous stage's artifact and writes a new one; no
//! stage modifies another's output in place.

pub mod normalize;
pub mod orchestrator;
pub mod schema;
pub mod stages;
pub mod status;

pub use normalize::Normalizer;
pub use orchestrator::{PipelineExecutionResult, PipelineOrchestrator, StageReport};
pub use schema::enforce_schema;
pub use stages::{classify_comments, export_report, generate_candidates, normalize_exports, StageOutput};

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Candidates,
    Normalize,
    Classify,
    Export,
}

impl Stage {
    /// Execution order of a full run
    pub const ALL: [Stage; 4] = [Stage::Candidates, Stage::Normalize, Stage::Classify, Stage::Export];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Candidates => "candidates",
            Stage::Normalize => "normalize",
            Stage::Classify => "classify",
            Stage::Export => "export",
        }
    }

    /// Human-facing label of the artifact the stage produces
    pub fn artifact_label(self) -> &'static str {
        match self {
            Stage::Candidates => "Candidates",
            Stage::Normalize => "Normalized",
            Stage::Classify => "Classified",
            Stage::Export => "Exported",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
