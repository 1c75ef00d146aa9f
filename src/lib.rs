pub mod classify;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod table;
pub mod window;

#[cfg(test)]
mod test_support;

pub use config::{Config, PipelinePaths};
pub use error::{MonitorError, Result};
pub use pipeline::{PipelineOrchestrator, Stage};
pub use table::Table;
