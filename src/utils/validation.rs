use crate::utils::error::{QualityError, Result};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_endpoint(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.trim().is_empty() {
        return Err(QualityError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    let url = Url::parse(url_str).map_err(|e| QualityError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: url_str.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(QualityError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Unsupported URL scheme: {}", scheme),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(QualityError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(QualityError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Record input files are JSON arrays; anything else is rejected up front.
pub fn validate_input_file(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;

    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(()),
        Some(ext) => Err(QualityError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: format!("Unsupported input extension: {}. Expected: json", ext),
        }),
        None => Err(QualityError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Input file has no extension".to_string(),
        }),
    }
}

/// Similarity thresholds and confidences live in `[0, 1]`.
pub fn validate_threshold(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(QualityError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a finite number".to_string(),
        });
    }
    validate_range(field_name, value, 0.0, 1.0)
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| QualityError::MissingConfigError {
            field: field_name.to_string(),
        })
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(QualityError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_endpoint() {
        assert!(validate_endpoint("source.endpoint", "https://api.fda.gov/device").is_ok());
        assert!(validate_endpoint("source.endpoint", "http://localhost:8080").is_ok());
        assert!(validate_endpoint("source.endpoint", "").is_err());
        assert!(validate_endpoint("source.endpoint", "not a url").is_err());
        assert!(validate_endpoint("source.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_input_file() {
        assert!(validate_input_file("input", "records.json").is_ok());
        assert!(validate_input_file("input", "data/UPDATES.JSON").is_ok());
        assert!(validate_input_file("input", "records.csv").is_err());
        assert!(validate_input_file("input", "records").is_err());
        assert!(validate_input_file("input", "").is_err());
    }

    #[test]
    fn test_validate_threshold() {
        assert!(validate_threshold("thresholds.title", 0.85).is_ok());
        assert!(validate_threshold("thresholds.title", 0.0).is_ok());
        assert!(validate_threshold("thresholds.title", 1.0).is_ok());
        assert!(validate_threshold("thresholds.title", 1.2).is_err());
        assert!(validate_threshold("thresholds.title", -0.1).is_err());
        assert!(validate_threshold("thresholds.title", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("x".to_string());
        let missing: Option<String> = None;
        assert!(validate_required_field("output.path", &present).is_ok());
        assert!(matches!(
            validate_required_field("output.path", &missing),
            Err(QualityError::MissingConfigError { .. })
        ));
    }
}
