use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::acwr::AcwrConfig;
use crate::benchmarks::{self, BenchmarkSet};
use crate::error::{CalculationError, SquadLoadError};
use crate::export::{parse_columns, ExportError};
use crate::fixtures::FixtureConfig;
use crate::import::ImportOptions;
use crate::logging::LogConfig;
use crate::models::CanonicalField;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Logging output
    #[serde(default)]
    pub logging: LogConfig,

    /// Which benchmark table zones are classified against
    #[serde(default)]
    pub benchmarks: BenchmarkSettings,

    /// ACWR windows and thresholds
    #[serde(default)]
    pub acwr: AcwrConfig,

    /// Header handling for vendor exports
    #[serde(default)]
    pub import: ImportOptions,

    /// Re-export defaults
    #[serde(default)]
    pub export: ExportSettings,

    /// Synthetic data parameters
    #[serde(default)]
    pub fixtures: FixtureConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSettings {
    /// Set name, optionally versioned ("field-hockey" or "field-hockey@v1")
    pub set: String,
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        BenchmarkSettings {
            set: "field-hockey".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Canonical headers written by `export` when no column list is given
    pub columns: Vec<String>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            columns: CanonicalField::ALL
                .iter()
                .map(|f| f.header().to_string())
                .collect(),
        }
    }
}

impl ExportSettings {
    pub fn columns(&self) -> std::result::Result<Vec<CanonicalField>, ExportError> {
        parse_columns(&self.columns.join(","))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            logging: LogConfig::default(),
            benchmarks: BenchmarkSettings::default(),
            acwr: AcwrConfig::default(),
            import: ImportOptions::default(),
            export: ExportSettings::default(),
            fixtures: FixtureConfig::default(),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".squadload")
            .join("config.toml")
    }

    /// Load from an explicit path, or from the default path when it exists.
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_path = Self::default_config_path();
                if default_path.exists() {
                    Self::load_from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Benchmark table named by the configuration
    pub fn benchmark_set(&self) -> std::result::Result<BenchmarkSet, CalculationError> {
        benchmarks::by_name(&self.benchmarks.set)
    }

    /// Check every section for values the calculators would reject
    pub fn validate(&self) -> crate::error::Result<()> {
        self.acwr.validate()?;
        self.benchmark_set()?;
        self.export.columns()?;

        if self.fixtures.athletes == 0 || self.fixtures.weeks == 0 {
            return Err(SquadLoadError::Configuration(format!(
                "fixtures need at least one athlete and one week (athletes={}, weeks={})",
                self.fixtures.athletes, self.fixtures.weeks
            )));
        }

        Ok(())
    }
}
