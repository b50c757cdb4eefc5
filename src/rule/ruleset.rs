use super::layer::Layer;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug)]
pub enum RulesetError {
    Io(String, std::io::Error),
    Parse(String, toml::de::Error),
    Invalid(String),
    Serialize(serde_json::Error),
}

impl fmt::Display for RulesetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulesetError::Io(path, e) => write!(f, "Failed to read {}: {}", path, e),
            RulesetError::Parse(path, e) => write!(f, "Failed to parse {}: {}", path, e),
            RulesetError::Invalid(msg) => write!(f, "Invalid ruleset: {}", msg),
            RulesetError::Serialize(e) => write!(f, "Failed to serialize ruleset: {}", e),
        }
    }
}

impl std::error::Error for RulesetError {}

/// dependency-cruiser rule severity
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    Error,
    Warn,
    Info,
    Ignore,
}

/// Module path condition (regular expressions, as dependency-cruiser expects)
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PathCondition {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_not: Option<String>,
}

impl PathCondition {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            path_not: None,
        }
    }
}

/// A forbidden dependency between two sets of modules
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ForbiddenRule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub severity: RuleSeverity,
    pub from: PathCondition,
    pub to: PathCondition,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DoNotFollow {
    pub path: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EnhancedResolveOptions {
    pub extensions: Vec<String>,
}

/// Engine options emitted next to the rules
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CruiseOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_not_follow: Option<DoNotFollow>,
    #[serde(default)]
    pub ts_pre_compilation_deps: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_resolve_options: Option<EnhancedResolveOptions>,
}

impl Default for CruiseOptions {
    fn default() -> Self {
        Self {
            do_not_follow: Some(DoNotFollow {
                path: "node_modules".into(),
            }),
            ts_pre_compilation_deps: true,
            enhanced_resolve_options: Some(EnhancedResolveOptions {
                extensions: [".ts", ".tsx", ".js", ".jsx", ".json"]
                    .iter()
                    .map(|e| e.to_string())
                    .collect(),
            }),
        }
    }
}

/// A dependency-cruiser configuration
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Ruleset {
    #[serde(default)]
    pub forbidden: Vec<ForbiddenRule>,
    #[serde(default)]
    pub options: CruiseOptions,
}

pub const BARREL_RULE_NAME: &str = "no-layer-barrel-imports";

impl Ruleset {
    /// Layered component architecture: no layer may import a higher one,
    /// and nothing may import a layer's index barrel.
    pub fn layered(components_root: &str) -> Self {
        let trimmed = components_root.trim_matches('/');
        let root = regex::escape(trimmed);
        let source_root = regex::escape(trimmed.split('/').next().unwrap_or_default());
        let mut forbidden: Vec<ForbiddenRule> = Layer::ALL
            .iter()
            .filter(|layer| !layer.above().is_empty())
            .map(|layer| {
                let above = layer.above();
                ForbiddenRule {
                    name: format!("no-up-from-{}", layer.dir_name().to_lowercase()),
                    comment: Some(format!(
                        "{} must not depend on {}",
                        layer,
                        join_names(above, " or ")
                    )),
                    severity: RuleSeverity::Error,
                    from: PathCondition::new(format!("^{}/{}", root, layer)),
                    to: PathCondition::new(format!("^{}/({})", root, join_names(above, "|"))),
                }
            })
            .collect();

        forbidden.push(ForbiddenRule {
            name: BARREL_RULE_NAME.into(),
            comment: Some("Import components directly instead of through a layer's index file".into()),
            severity: RuleSeverity::Warn,
            from: PathCondition::new(format!("^{}", source_root)),
            to: PathCondition::new(format!(
                "^{}/({})/index\\.(ts|tsx)$",
                root,
                join_names(Layer::ALL, "|")
            )),
        });

        Self {
            forbidden,
            options: CruiseOptions::default(),
        }
    }

    /// Load a ruleset from a TOML file
    pub fn load(path: &str) -> Result<Self, RulesetError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| RulesetError::Io(path.to_string(), e))?;
        toml::from_str(&content).map_err(|e| RulesetError::Parse(path.to_string(), e))
    }

    /// Reject empty or duplicate rule names and empty path conditions
    pub fn validate(&self) -> Result<(), RulesetError> {
        let mut names = HashSet::new();
        for rule in &self.forbidden {
            if rule.name.trim().is_empty() {
                return Err(RulesetError::Invalid("rule with empty name".into()));
            }
            if !names.insert(rule.name.as_str()) {
                return Err(RulesetError::Invalid(format!(
                    "duplicate rule name '{}'",
                    rule.name
                )));
            }
            if rule.from.path.is_empty() || rule.to.path.is_empty() {
                return Err(RulesetError::Invalid(format!(
                    "rule '{}' has an empty path condition",
                    rule.name
                )));
            }
        }
        Ok(())
    }

    /// Render as dependency-cruiser JSON configuration
    pub fn to_json(&self) -> Result<String, RulesetError> {
        serde_json::to_string_pretty(self).map_err(RulesetError::Serialize)
    }
}

fn join_names(layers: &[Layer], sep: &str) -> String {
    layers
        .iter()
        .map(|l| l.dir_name())
        .collect::<Vec<_>>()
        .join(sep)
}
