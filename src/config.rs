use crate::cli::FilterArgs;
use crate::types::Severity;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::warn;

pub const DEFAULT_MAX_ANNOS: usize = 40;
pub const DEFAULT_SUMMARY_LIMIT: usize = 30;

/// Environment variables checked for the GitHub token, first non-empty wins
pub const TOKEN_ENV_VARS: [&str; 3] = ["GITHUB_TOKEN", "GH_TOKEN", "INPUT_GITHUB_TOKEN"];

/// How line comments are posted to the pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CommentMode {
    /// One review containing every comment
    #[default]
    Review,
    /// One review comment request per violation
    Individual,
}

/// Settings for a single annotation run
#[derive(Debug, Clone)]
pub struct AnnotateConfig {
    pub root_prefix: String,
    pub max_annos: usize,
    pub include_warn: bool,
    pub include_error: bool,
    pub exclude: Vec<String>,
    pub comment_mode: CommentMode,
    pub summary_limit: usize,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            root_prefix: String::new(),
            max_annos: DEFAULT_MAX_ANNOS,
            include_warn: true,
            include_error: true,
            exclude: vec![],
            comment_mode: CommentMode::default(),
            summary_limit: DEFAULT_SUMMARY_LIMIT,
        }
    }
}

impl AnnotateConfig {
    pub fn from_filter_args(args: &FilterArgs) -> Self {
        Self {
            root_prefix: args.root_prefix.clone(),
            max_annos: args.max_annos,
            include_warn: args.include_warn,
            include_error: args.include_error,
            exclude: args.exclude.clone(),
            ..Self::default()
        }
    }

    /// Whether violations of this severity are annotated
    pub fn includes(&self, severity: Severity) -> bool {
        match severity {
            Severity::Error => self.include_error,
            Severity::Warning => self.include_warn,
        }
    }

    /// Build the exclude matcher, skipping invalid patterns
    pub fn exclude_globset(&self) -> GlobSet {
        let mut builder = GlobSetBuilder::new();
        for pattern in self.exclude.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => warn!("Invalid exclude pattern '{}': {}", pattern, e),
            }
        }
        builder.build().unwrap_or_else(|e| {
            warn!("Failed to build exclude globset: {}", e);
            GlobSet::empty()
        })
    }
}

/// Parse MAX_ANNOS, falling back to the default for unparsable values
pub fn parse_max_annos(raw: &str) -> Result<usize, String> {
    Ok(raw.trim().parse().unwrap_or(DEFAULT_MAX_ANNOS))
}

/// Parse INCLUDE_WARN / INCLUDE_ERROR: anything but "false" enables
pub fn parse_include_flag(raw: &str) -> Result<bool, String> {
    Ok(raw.trim() != "false")
}

/// Resolve the GitHub token from the CLI value, then GH_TOKEN and INPUT_GITHUB_TOKEN
/// as reported by `lookup`
pub fn resolve_token(
    cli_token: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    cli_token
        .map(str::to_string)
        .into_iter()
        .chain(TOKEN_ENV_VARS.iter().skip(1).filter_map(|&name| lookup(name)))
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnnotateConfig::default();
        assert_eq!(config.root_prefix, "");
        assert_eq!(config.max_annos, 40);
        assert!(config.include_warn);
        assert!(config.include_error);
        assert_eq!(config.comment_mode, CommentMode::Review);
    }

    #[test]
    fn test_parse_include_flag() {
        assert_eq!(parse_include_flag("false"), Ok(false));
        assert_eq!(parse_include_flag("true"), Ok(true));
        assert_eq!(parse_include_flag("0"), Ok(true));
    }

    #[test]
    fn test_parse_max_annos() {
        assert_eq!(parse_max_annos("10"), Ok(10));
        assert_eq!(parse_max_annos("lots"), Ok(DEFAULT_MAX_ANNOS));
    }

    #[test]
    fn test_includes() {
        let config = AnnotateConfig {
            include_warn: false,
            ..AnnotateConfig::default()
        };
        assert!(config.includes(Severity::Error));
        assert!(!config.includes(Severity::Warning));
    }

    #[test]
    fn test_resolve_token_order() {
        let env = |name: &str| match name {
            "GH_TOKEN" => Some("".to_string()),
            "INPUT_GITHUB_TOKEN" => Some("input".to_string()),
            _ => None,
        };
        assert_eq!(resolve_token(Some("cli"), env), Some("cli".into()));
        assert_eq!(resolve_token(None, env), Some("input".into()));
        assert_eq!(resolve_token(Some(" "), |_| None), None);
    }

    #[test]
    fn test_exclude_globset_skips_invalid() {
        let config = AnnotateConfig {
            exclude: vec!["**/__tests__/**".into(), "a[".into(), "".into()],
            ..AnnotateConfig::default()
        };
        let globset = config.exclude_globset();
        assert!(globset.is_match("src/components/__tests__/a.ts"));
        assert!(!globset.is_match("src/components/a.ts"));
    }
}
