use crate::config::AnnotateConfig;
use crate::types::{ChangedFile, Violation};
use std::collections::HashMap;
use tracing::trace;

/// Normalize a report path to a repository-relative form.
/// Converts backslashes and strips a leading `./` or `/`.
pub fn normalize_path(path: &str) -> Option<String> {
    let unified = path.trim().replace('\\', "/");
    let stripped = unified
        .strip_prefix("./")
        .or_else(|| unified.strip_prefix('/'))
        .unwrap_or(unified.as_str());
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

/// Join the monorepo prefix onto a normalized path, unless it is already prefixed
pub fn with_prefix(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() || path.starts_with(&format!("{}/", prefix)) {
        path.to_string()
    } else {
        format!("{}/{}", prefix, path)
    }
}

/// Candidate paths of a violation in lookup order:
/// from.resolved, from.source, from, to.resolved, to.source, to
pub fn candidate_paths(violation: &Violation) -> Vec<String> {
    violation
        .from
        .candidates()
        .into_iter()
        .chain(violation.to.candidates())
        .filter_map(normalize_path)
        .collect()
}

/// Changed files indexed by current and previous (pre-rename) path
pub struct ChangedFiles<'a> {
    by_path: HashMap<&'a str, &'a ChangedFile>,
}

impl<'a> ChangedFiles<'a> {
    pub fn new(files: &'a [ChangedFile]) -> Self {
        let mut by_path = HashMap::new();
        for file in files {
            if let Some(previous) = &file.previous_filename {
                by_path.entry(previous.as_str()).or_insert(file);
            }
        }
        // Current names take precedence over stale rename sources
        for file in files {
            by_path.insert(file.filename.as_str(), file);
        }
        Self { by_path }
    }

    pub fn get(&self, path: &str) -> Option<&'a ChangedFile> {
        self.by_path.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

/// A violation located in a changed file
#[derive(Debug, Clone)]
pub struct MappedViolation<'a> {
    pub violation: &'a Violation,
    pub file: &'a ChangedFile,
}

/// Violations split by whether they touch a changed file
#[derive(Debug, Default)]
pub struct Mapping<'a> {
    pub mapped: Vec<MappedViolation<'a>>,
    pub unmapped: Vec<&'a Violation>,
}

/// Find the changed file a violation touches, trying each candidate with the prefix first
pub fn locate<'a>(
    violation: &Violation,
    changed: &ChangedFiles<'a>,
    root_prefix: &str,
) -> Option<&'a ChangedFile> {
    candidate_paths(violation).iter().find_map(|candidate| {
        let prefixed = with_prefix(root_prefix, candidate);
        changed
            .get(&prefixed)
            .or_else(|| changed.get(candidate))
    })
}

/// Keep violations whose severity is enabled and whose source is not excluded
pub fn filter_violations<'a>(
    violations: &'a [Violation],
    config: &AnnotateConfig,
) -> Vec<&'a Violation> {
    let exclude = config.exclude_globset();
    violations
        .iter()
        .filter(|v| config.includes(v.severity))
        .filter(|v| {
            let excluded = v
                .from
                .candidates()
                .into_iter()
                .filter_map(normalize_path)
                .any(|p| exclude.is_match(&p));
            if excluded {
                trace!("Excluded violation of '{}' from {}", v.rule_name, v.from.label());
            }
            !excluded
        })
        .collect()
}

/// Split violations into mapped and unmapped, preserving report order
pub fn map_violations<'a>(
    violations: &[&'a Violation],
    changed: &ChangedFiles<'a>,
    root_prefix: &str,
) -> Mapping<'a> {
    let mut mapping = Mapping::default();
    for &violation in violations {
        match locate(violation, changed, root_prefix) {
            Some(file) => mapping.mapped.push(MappedViolation { violation, file }),
            None => mapping.unmapped.push(violation),
        }
    }
    mapping
}
