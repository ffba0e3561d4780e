use crate::config::{DEFAULT_CACHE_TTL_SECS, MAX_CACHE_TTL_SECS};
use crate::domain::ports::ConfigProvider;
use crate::quality::cross_reference::{DEFAULT_CLINICAL_SIMILARITY, DEFAULT_MAPPING_CONFIDENCE};
use crate::quality::duplicates::{DEFAULT_CONTENT_THRESHOLD, DEFAULT_TITLE_THRESHOLD};
use crate::utils::error::{QualityError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

const DEFAULT_CACHE_MAX_ENTRIES: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub report: ReportConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Api,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: SourceType,
    pub endpoint: Option<String>,
    pub path: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub cache_ttl_seconds: Option<u64>,
    pub cache_max_entries: Option<usize>,
    #[serde(default)]
    pub fallback_to_sample: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_title")]
    pub title: f64,
    #[serde(default = "default_content")]
    pub content: f64,
    #[serde(default = "default_mapping_confidence")]
    pub mapping_confidence: f64,
    #[serde(default = "default_clinical_similarity")]
    pub clinical_similarity: f64,
}

fn default_title() -> f64 {
    DEFAULT_TITLE_THRESHOLD
}

fn default_content() -> f64 {
    DEFAULT_CONTENT_THRESHOLD
}

fn default_mapping_confidence() -> f64 {
    DEFAULT_MAPPING_CONFIDENCE
}

fn default_clinical_similarity() -> f64 {
    DEFAULT_CLINICAL_SIMILARITY
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE_THRESHOLD,
            content: DEFAULT_CONTENT_THRESHOLD,
            mapping_confidence: DEFAULT_MAPPING_CONFIDENCE,
            clinical_similarity: DEFAULT_CLINICAL_SIMILARITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    #[serde(default)]
    pub zip: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(QualityError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| QualityError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        match self.source.r#type {
            SourceType::Api => {
                let endpoint =
                    validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
                validation::validate_endpoint("source.endpoint", endpoint)?;
            }
            SourceType::File => {
                let path = validation::validate_required_field("source.path", &self.source.path)?;
                validation::validate_input_file("source.path", path)?;
            }
        }

        if let Some(ttl) = self.source.cache_ttl_seconds {
            validation::validate_range("source.cache_ttl_seconds", ttl, 1, MAX_CACHE_TTL_SECS)?;
        }
        if let Some(max_entries) = self.source.cache_max_entries {
            validation::validate_range("source.cache_max_entries", max_entries, 1, 10_000)?;
        }

        validation::validate_threshold("thresholds.title", self.thresholds.title)?;
        validation::validate_threshold("thresholds.content", self.thresholds.content)?;
        validation::validate_threshold(
            "thresholds.mapping_confidence",
            self.thresholds.mapping_confidence,
        )?;
        validation::validate_threshold(
            "thresholds.clinical_similarity",
            self.thresholds.clinical_similarity,
        )?;

        validation::validate_path("output.path", &self.output.path)?;

        Ok(())
    }

    pub fn cache_ttl_seconds(&self) -> u64 {
        self.source.cache_ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS)
    }

    pub fn cache_max_entries(&self) -> usize {
        self.source
            .cache_max_entries
            .unwrap_or(DEFAULT_CACHE_MAX_ENTRIES)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_format(&self) -> LogFormat {
        self.monitoring
            .as_ref()
            .map(|m| m.log_format)
            .unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn title_threshold(&self) -> f64 {
        self.thresholds.title
    }

    fn content_threshold(&self) -> f64 {
        self.thresholds.content
    }

    fn mapping_confidence(&self) -> f64 {
        self.thresholds.mapping_confidence
    }

    fn clinical_similarity(&self) -> f64 {
        self.thresholds.clinical_similarity
    }

    fn zip_output(&self) -> bool {
        self.output.zip
    }

    fn fallback_to_sample(&self) -> bool {
        self.source.fallback_to_sample
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
