use crate::types::Violation;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub enum ReportError {
    NotFound(String),
    Io(String, std::io::Error),
    Parse(String, serde_json::Error),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::NotFound(path) => write!(f, "{} not found", path),
            ReportError::Io(path, e) => write!(f, "Failed to read {}: {}", path, e),
            ReportError::Parse(path, e) => write!(f, "Failed to parse {}: {}", path, e),
        }
    }
}

impl std::error::Error for ReportError {}

#[derive(Deserialize, Default)]
struct Summary {
    #[serde(default)]
    violations: Vec<Violation>,
}

#[derive(Deserialize, Default)]
struct Report {
    #[serde(default)]
    summary: Option<Summary>,
    #[serde(default)]
    violations: Vec<Violation>,
}

/// Load violations from a dependency-cruiser JSON report file
pub fn load_violations(path: &str) -> Result<Vec<Violation>, ReportError> {
    if !Path::new(path).exists() {
        return Err(ReportError::NotFound(path.to_string()));
    }
    let content =
        std::fs::read_to_string(path).map_err(|e| ReportError::Io(path.to_string(), e))?;
    let violations =
        parse_violations(&content).map_err(|e| ReportError::Parse(path.to_string(), e))?;
    debug!("Loaded {} violations from {}", violations.len(), path);
    Ok(violations)
}

/// Extract violations, preferring a non-empty `summary.violations` over top-level `violations`
pub fn parse_violations(content: &str) -> Result<Vec<Violation>, serde_json::Error> {
    let report: Report = serde_json::from_str(content)?;
    match report.summary {
        Some(summary) if !summary.violations.is_empty() => Ok(summary.violations),
        _ => Ok(report.violations),
    }
}
