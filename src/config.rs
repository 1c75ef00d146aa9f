use serde::de::{Deserializer, IgnoredAny};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::classify::RuleSet;
use crate::constants::{
    CANDIDATES_FILE, CLASSIFIED_FILE, CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH, DEFAULT_PLATFORM,
    NORMALIZED_FILE, RAW_DIR, REPORT_FILE, WORK_DIR,
};
use crate::error::{MonitorError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// One search query per line, consumed by the candidates stage
    #[serde(default = "default_keywords_file")]
    pub keywords_file: PathBuf,
    /// Platform written for rows whose export has no platform column
    #[serde(default = "default_platform")]
    pub default_platform: String,
    #[serde(default, deserialize_with = "lenient_rules")]
    pub rules: RuleSet,
    #[serde(default)]
    pub paths: PathsConfig,
    /// Per-field alias overrides for the normalizer, keyed by normalized column name
    #[serde(default)]
    pub aliases: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_keywords_file() -> PathBuf {
    PathBuf::from("config/keywords.txt")
}

fn default_platform() -> String {
    DEFAULT_PLATFORM.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_dir: default_log_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keywords_file: default_keywords_file(),
            default_platform: default_platform(),
            rules: RuleSet::default(),
            paths: PathsConfig::default(),
            aliases: HashMap::new(),
        }
    }
}

impl Config {
    /// Pick the config path: explicit argument, then environment, then `config.toml`
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(v) if !v.trim().is_empty() => PathBuf::from(v),
            _ => PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MonitorError::Config(format!(
                "Config file '{}' is missing. Copy config.example.toml to {}",
                path.display(),
                path.display()
            )));
        }
        let content = fs::read_to_string(path)
            .map_err(|e| MonitorError::Config(format!("Failed to read config file '{}': {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| MonitorError::Config(format!("Failed to parse config file '{}': {}", path.display(), e)))
    }

    /// Log directory named by the config at `path`, or the default.
    ///
    /// Only `[paths]` is read, so logging can be installed before the full
    /// load reports anything. Unreadable or invalid files yield the default.
    pub fn log_dir_hint(path: &Path) -> PathBuf {
        #[derive(Deserialize)]
        struct LogDirOnly {
            #[serde(default)]
            paths: PathsConfig,
        }

        fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str::<LogDirOnly>(&content).ok())
            .map(|c| c.paths.log_dir)
            .unwrap_or_else(default_log_dir)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

/// Artifact locations for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    pub raw_dir: PathBuf,
    pub work_dir: PathBuf,
    pub candidates: PathBuf,
    pub normalized: PathBuf,
    pub classified: PathBuf,
    pub report: PathBuf,
}

impl PipelinePaths {
    pub fn from_root(root: &Path) -> Self {
        let work_dir = root.join(WORK_DIR);
        Self {
            raw_dir: root.join(RAW_DIR),
            candidates: work_dir.join(CANDIDATES_FILE),
            normalized: work_dir.join(NORMALIZED_FILE),
            classified: work_dir.join(CLASSIFIED_FILE),
            report: root.join(REPORT_FILE),
            work_dir,
        }
    }
}

/// A malformed `[rules]` table degrades to an empty rule set instead of failing the load
fn lenient_rules<'de, D>(deserializer: D) -> std::result::Result<RuleSet, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeRules {
        Rules(RuleSet),
        Other(IgnoredAny),
    }

    Ok(match MaybeRules::deserialize(deserializer)? {
        MaybeRules::Rules(rules) => rules,
        MaybeRules::Other(_) => {
            warn!("Ignoring malformed [rules] section; using empty term lists");
            RuleSet::default()
        }
    })
}
