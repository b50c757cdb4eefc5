use serde::{Deserialize, Serialize};
use std::fmt;

/// Violation severity as reported by dependency-cruiser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Parse a dependency-cruiser severity string.
    /// Only `error` is treated as an error; `warn`, `info`, `ignore` and anything else are warnings.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("error") {
            Self::Error
        } else {
            Self::Warning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a dependency edge.
///
/// dependency-cruiser emits plain module paths in `summary.violations`, while
/// other report shapes carry `{ resolved, source }` objects.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Endpoint {
    Path(String),
    Module {
        #[serde(default)]
        resolved: Option<String>,
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        line: Option<u32>,
    },
    Other(serde_json::Value),
}

impl Endpoint {
    /// Candidate paths in lookup order: resolved, source, then the plain string
    pub fn candidates(&self) -> Vec<&str> {
        match self {
            Self::Path(path) => vec![path.as_str()],
            Self::Module {
                resolved, source, ..
            } => {
                resolved.iter().chain(source.iter()).map(String::as_str).collect()
            }
            Self::Other(_) => vec![],
        }
    }

    /// Human-readable label used in comment bodies
    pub fn label(&self) -> String {
        match self {
            Self::Path(path) => path.clone(),
            Self::Module {
                resolved, source, ..
            } => resolved
                .as_deref()
                .or(source.as_deref())
                .unwrap_or("?")
                .to_string(),
            Self::Other(value) if value.is_null() => "?".to_string(),
            Self::Other(value) => value.to_string(),
        }
    }

    /// Source line carried by structured endpoints
    pub fn line(&self) -> Option<u32> {
        match self {
            Self::Module { line, .. } => *line,
            _ => None,
        }
    }
}

#[derive(Deserialize, Default)]
struct RawRule {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    comment: Option<String>,
}

#[derive(Deserialize)]
struct RawViolation {
    #[serde(default, alias = "module")]
    from: Option<Endpoint>,
    #[serde(default)]
    to: Option<Endpoint>,
    #[serde(default)]
    rule: Option<RawRule>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    line: Option<u32>,
}

const DEFAULT_RULE_NAME: &str = "depcruise";
const DEFAULT_SEVERITY: &str = "warn";

/// A dependency rule violation from the dependency-cruiser report
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawViolation")]
pub struct Violation {
    pub severity: Severity,
    pub rule_name: String,
    pub comment: Option<String>,
    pub from: Endpoint,
    pub to: Endpoint,
    /// Line in the importing module, when the report carries one
    pub line: Option<u32>,
}

impl From<RawViolation> for Violation {
    fn from(raw: RawViolation) -> Self {
        let rule = raw.rule.unwrap_or_default();
        let severity = rule
            .severity
            .or(raw.severity)
            .unwrap_or_else(|| DEFAULT_SEVERITY.to_string());
        let rule_name = rule
            .name
            .or(raw.name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_RULE_NAME.to_string());
        let from = raw.from.unwrap_or(Endpoint::Other(serde_json::Value::Null));
        Self {
            severity: Severity::parse(&severity),
            rule_name,
            comment: raw.comment.or(rule.comment).filter(|c| !c.trim().is_empty()),
            line: raw.line.or_else(|| from.line()).filter(|&l| l > 0),
            from,
            to: raw.to.unwrap_or(Endpoint::Other(serde_json::Value::Null)),
        }
    }
}

/// A file touched by the pull request, as returned by `GET /pulls/{n}/files`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    #[serde(default)]
    pub previous_filename: Option<String>,
    #[serde(default)]
    pub patch: Option<String>,
}

/// A line-anchored review comment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewComment {
    pub path: String,
    pub line: u32,
    pub body: String,
}
