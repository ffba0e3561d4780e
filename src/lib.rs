pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod quality;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use adapters::{FileRecordSource, HttpRecordSource};
pub use core::{etl::EtlEngine, pipeline::QualityPipeline};
pub use domain::model::{DataOrigin, QualityLevel, QualityReport, Record, RecordKind};
pub use quality::QualityEngine;
pub use utils::error::{FetchError, QualityError, Result};
