use thiserror::Error;

/// Failure while pulling records from an upstream collaborator.
///
/// Kept separate from [`QualityError`] so callers can tell "the source answered
/// with nothing" apart from "the source could not be reached".
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered with status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Could not decode records from {origin}: {message}")]
    Decode { origin: String, message: String },

    #[error("Could not read records from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum QualityError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Record fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl QualityError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            QualityError::ConfigError { .. }
            | QualityError::ConfigValidationError { .. }
            | QualityError::MissingConfigError { .. }
            | QualityError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            QualityError::ApiError(_) | QualityError::Fetch(_) => ErrorCategory::Network,
            QualityError::CsvError(_)
            | QualityError::SerializationError(_)
            | QualityError::ProcessingError { .. } => ErrorCategory::Data,
            QualityError::ZipError(_) | QualityError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            QualityError::Fetch(FetchError::Io { .. }) => {
                "Check that the input file exists and is readable"
            }
            QualityError::Fetch(FetchError::Decode { .. }) => {
                "Make sure the input is a JSON array of record objects"
            }
            QualityError::ApiError(_) | QualityError::Fetch(_) => {
                "Check the API endpoint and network connectivity, or enable --fallback-to-sample"
            }
            QualityError::MissingConfigError { .. } => "Provide the missing configuration value",
            QualityError::InvalidConfigValueError { .. }
            | QualityError::ConfigValidationError { .. }
            | QualityError::ConfigError { .. } => "Review the configuration file or CLI flags",
            QualityError::CsvError(_)
            | QualityError::SerializationError(_)
            | QualityError::ProcessingError { .. } => "Inspect the input records for malformed data",
            QualityError::ZipError(_) | QualityError::IoError(_) => {
                "Check the output path permissions and free disk space"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not fetch records: {}", self),
            ErrorCategory::Data => format!("Could not process records: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, QualityError>;
