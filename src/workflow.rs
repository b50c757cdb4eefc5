use crate::annotate::mapper;
use crate::cli::WorkflowArgs;
use crate::config::AnnotateConfig;
use crate::report::{self, ReportError};
use crate::rule::ruleset::BARREL_RULE_NAME;
use crate::types::{Severity, Violation};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_LINE: u32 = 1;

/// Rule-specific annotation behavior
struct RuleHandler {
    rule: &'static str,
    /// Severity the annotation is always raised with
    severity: Option<Severity>,
    /// Skip violations whose importing module is a test file
    skip_tests: bool,
    /// Message used when the violation carries no comment
    default_message: fn(&Violation) -> String,
}

const RULE_HANDLERS: &[RuleHandler] = &[
    RuleHandler {
        rule: BARREL_RULE_NAME,
        severity: None,
        skip_tests: true,
        default_message: |_| "Importing a layer's index.ts is not allowed".to_string(),
    },
    RuleHandler {
        rule: "no-up-from-atoms",
        severity: Some(Severity::Error),
        skip_tests: false,
        default_message: |v| {
            format!("Atoms must not depend on upper layers: -> {}", v.to.label())
        },
    },
];

fn handler_for(rule: &str) -> Option<&'static RuleHandler> {
    RULE_HANDLERS.iter().find(|h| h.rule == rule)
}

/// Resolve a report path against the working directory.
///
/// Absolute paths inside `cwd` become repository-relative; other absolute
/// paths keep only their file name.
pub fn repo_relative(path: &str, cwd: &Path) -> Option<String> {
    let unified = path.trim().replace('\\', "/");
    let absolute = Path::new(&unified);
    if !absolute.is_absolute() {
        return mapper::normalize_path(&unified);
    }
    let relative = match absolute.strip_prefix(cwd) {
        Ok(rel) if !cwd.as_os_str().is_empty() => rel.to_string_lossy().into_owned(),
        _ => absolute.file_name()?.to_string_lossy().into_owned(),
    };
    mapper::normalize_path(&relative)
}

/// A GitHub Actions `::error` / `::warning` workflow command
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub severity: Severity,
    pub file: String,
    pub line: u32,
    pub title: String,
    pub message: String,
}

impl Annotation {
    /// Build an annotation for a violation.
    ///
    /// Returns None when the violation carries no usable source path or its
    /// rule skips the importing module.
    pub fn from_violation(violation: &Violation, root_prefix: &str, cwd: &Path) -> Option<Self> {
        let file = violation
            .from
            .candidates()
            .into_iter()
            .find_map(|path| repo_relative(path, cwd))?;
        let file = mapper::with_prefix(root_prefix, &file);
        let handler = handler_for(&violation.rule_name);

        if handler.is_some_and(|h| h.skip_tests) && file.contains("/__tests__/") {
            debug!("Skipping {} in test file {}", violation.rule_name, file);
            return None;
        }

        let message = violation.comment.clone().unwrap_or_else(|| match handler {
            Some(h) => (h.default_message)(violation),
            None => violation.to.label(),
        });
        Some(Self {
            severity: handler
                .and_then(|h| h.severity)
                .unwrap_or(violation.severity),
            file,
            line: violation.line.unwrap_or(DEFAULT_LINE),
            title: violation.rule_name.clone(),
            message,
        })
    }

    /// Render as a workflow command line
    pub fn command(&self) -> String {
        format!(
            "::{} file={},line={},title={}::{}",
            self.severity,
            escape_property(&self.file),
            self.line,
            escape_property(&self.title),
            escape_data(&self.message)
        )
    }
}

/// Escape workflow command message data
pub fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

/// Escape workflow command property values
pub fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

/// Select annotations for the report, honoring filters and the annotation cap
pub fn collect_annotations(
    violations: &[Violation],
    config: &AnnotateConfig,
    require_exists: bool,
    cwd: &Path,
) -> Vec<Annotation> {
    mapper::filter_violations(violations, config)
        .into_iter()
        .filter_map(|v| Annotation::from_violation(v, &config.root_prefix, cwd))
        .filter(|a| {
            let keep = !require_exists || Path::new(&a.file).exists();
            if !keep {
                debug!("Skipping {}: file not found", a.file);
            }
            keep
        })
        .take(config.max_annos)
        .collect()
}

/// Print workflow commands for the report to stdout
pub fn run_workflow(args: &WorkflowArgs) -> anyhow::Result<()> {
    let violations = match report::load_violations(&args.filter.report) {
        Ok(v) => v,
        Err(ReportError::NotFound(path)) => {
            info!("{} not found", path);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    if violations.is_empty() {
        info!("No dependency-cruiser violations");
        return Ok(());
    }

    let config = AnnotateConfig::from_filter_args(&args.filter);
    let cwd = std::env::current_dir().unwrap_or_default();
    let annotations = collect_annotations(&violations, &config, args.require_exists, &cwd);

    let mut stdout = std::io::stdout().lock();
    for annotation in &annotations {
        writeln!(stdout, "{}", annotation.command())?;
    }
    writeln!(
        stdout,
        "dependency-cruiser: annotated {}/{} issues",
        annotations.len(),
        violations.len()
    )?;
    Ok(())
}
