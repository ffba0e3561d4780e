pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::quality::cross_reference::{DEFAULT_CLINICAL_SIMILARITY, DEFAULT_MAPPING_CONFIDENCE};
#[cfg(feature = "cli")]
use crate::quality::duplicates::{DEFAULT_CONTENT_THRESHOLD, DEFAULT_TITLE_THRESHOLD};
#[cfg(feature = "cli")]
use crate::utils::error::{QualityError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const MAX_CACHE_TTL_SECS: u64 = 86_400;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "helix-quality")]
#[command(about = "Data quality checks for medical-device regulatory records")]
pub struct CliConfig {
    /// JSON snapshot to analyze instead of calling the API
    #[arg(long, conflicts_with = "api_endpoint")]
    pub input: Option<String>,

    /// Base URL serving /regulatory-updates and /legal-cases
    #[arg(long)]
    pub api_endpoint: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value_t = DEFAULT_TITLE_THRESHOLD)]
    pub title_threshold: f64,

    #[arg(long, default_value_t = DEFAULT_CONTENT_THRESHOLD)]
    pub content_threshold: f64,

    #[arg(long, default_value_t = DEFAULT_MAPPING_CONFIDENCE)]
    pub mapping_confidence: f64,

    /// Minimum device-name similarity linking a clinical study to an approval
    #[arg(long, default_value_t = DEFAULT_CLINICAL_SIMILARITY)]
    pub clinical_similarity: f64,

    #[arg(long, help = "Bundle all outputs into quality_report.zip")]
    pub zip: bool,

    #[arg(long, help = "Analyze built-in sample records when the source fails")]
    pub fallback_to_sample: bool,

    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn title_threshold(&self) -> f64 {
        self.title_threshold
    }

    fn content_threshold(&self) -> f64 {
        self.content_threshold
    }

    fn mapping_confidence(&self) -> f64 {
        self.mapping_confidence
    }

    fn clinical_similarity(&self) -> f64 {
        self.clinical_similarity
    }

    fn zip_output(&self) -> bool {
        self.zip
    }

    fn fallback_to_sample(&self) -> bool {
        self.fallback_to_sample
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        match (&self.input, &self.api_endpoint) {
            (Some(input), _) => validation::validate_input_file("input", input)?,
            (None, Some(endpoint)) => validation::validate_endpoint("api_endpoint", endpoint)?,
            (None, None) => {
                return Err(QualityError::MissingConfigError {
                    field: "--input or --api-endpoint".to_string(),
                })
            }
        }

        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_threshold("title_threshold", self.title_threshold)?;
        validation::validate_threshold("content_threshold", self.content_threshold)?;
        validation::validate_threshold("mapping_confidence", self.mapping_confidence)?;
        validation::validate_threshold("clinical_similarity", self.clinical_similarity)?;
        validation::validate_range("cache_ttl_secs", self.cache_ttl_secs, 1, MAX_CACHE_TTL_SECS)?;

        Ok(())
    }
}
