use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Env var naming the YAML config file.
pub const CONFIG_ENV: &str = "JUDICIAL_ASSETS_CONFIG";
/// Env var overriding the configured source table.
pub const SOURCE_ENV: &str = "JUDICIAL_ASSETS_SOURCE";
pub const DEFAULT_CONFIG_PATH: &str = "config/judicial_assets.yaml";

/// Business constants the pipeline reads. Defaults match the source sheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Status value (compared case-insensitively) marking an active token.
    pub active_status: String,
    /// Scenario label used when the scenario cell is missing.
    pub default_scenario_label: String,
    /// Average month length used by months-since-closing.
    pub days_per_month: f64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            active_status: "ativa".to_string(),
            default_scenario_label: "Sem Cenário".to_string(),
            days_per_month: 30.44,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// CSV or Parquet extract to load.
    pub source: PathBuf,
    /// Where to write the dashboard JSON; stdout when unset.
    pub output: Option<PathBuf>,
    pub pipeline: PipelineOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("data/judicial_assets_sample.csv"),
            output: None,
            pipeline: PipelineOptions::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        let config: AppConfig =
            serde_yaml::from_str(&contents).with_context(|| format!("parsing config {:?}", path))?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            info!(path = %path.display(), "loading config");
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Resolve the config the binary runs with: file from `JUDICIAL_ASSETS_CONFIG`
    /// (or the default path), then `JUDICIAL_ASSETS_SOURCE`, then the CLI source.
    pub fn from_env(cli_source: Option<String>) -> Result<Self> {
        let path = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_or_default(path)?;
        if let Ok(source) = env::var(SOURCE_ENV) {
            config.source = PathBuf::from(source);
        }
        if let Some(source) = cli_source {
            config.source = PathBuf::from(source);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn partial_yaml_keeps_defaults() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "source: data/base.csv")?;
        writeln!(file, "pipeline:")?;
        writeln!(file, "  active_status: Active")?;

        let config = AppConfig::load(file.path())?;
        assert_eq!(config.source, PathBuf::from("data/base.csv"));
        assert_eq!(config.output, None);
        assert_eq!(config.pipeline.active_status, "Active");
        assert_eq!(config.pipeline.default_scenario_label, "Sem Cenário");
        assert_eq!(config.pipeline.days_per_month, 30.44);
        Ok(())
    }

    #[test]
    fn missing_file_falls_back_to_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = AppConfig::load_or_default(dir.path().join("nope.yaml"))?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[test]
    fn malformed_yaml_is_an_error() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "pipeline: [not, a, map]")?;
        assert!(AppConfig::load(file.path()).is_err());
        Ok(())
    }
}
