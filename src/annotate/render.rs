use super::mapper::MappedViolation;
use crate::types::Violation;

const TOOL_NAME: &str = "dependency-cruiser";

/// Body of a line comment for one violation
pub fn comment_body(violation: &Violation) -> String {
    let mut body = format!(
        "**{}** {}: `{}`\n\n",
        TOOL_NAME, violation.severity, violation.rule_name
    );
    if let Some(comment) = &violation.comment {
        body.push_str(comment.trim());
        body.push_str("\n\n");
    }
    body.push_str(&format!(
        "`{}` → `{}`",
        violation.from.label(),
        violation.to.label()
    ));
    body
}

/// Body of the review wrapping the line comments
pub fn review_body(posted: usize, omitted: usize, max_annos: usize) -> String {
    let mut body = format!(
        "{} found {} violation(s) in files changed by this pull request.",
        TOOL_NAME, posted
    );
    if omitted > 0 {
        body.push_str(&format!(
            "\n\n{} more violation(s) not shown (limit: {}).",
            omitted, max_annos
        ));
    }
    body
}

/// One bullet per violation, truncated to `limit` entries
pub fn violation_list(violations: &[&Violation], limit: usize) -> String {
    let mut lines: Vec<String> = violations
        .iter()
        .take(limit)
        .map(|v| {
            format!(
                "- **{}** `{}`: `{}` → `{}`",
                v.severity,
                v.rule_name,
                v.from.label(),
                v.to.label()
            )
        })
        .collect();
    if violations.len() > limit {
        lines.push(format!("- …and {} more", violations.len() - limit));
    }
    lines.join("\n")
}

/// Issue comment listing violations that do not touch changed files
pub fn unmapped_summary(unmapped: &[&Violation], limit: usize) -> String {
    format!(
        "### {}: {} violation(s) outside changed files\n\n\
        These violations could not be anchored to a file changed in this pull request:\n\n{}",
        TOOL_NAME,
        unmapped.len(),
        violation_list(unmapped, limit)
    )
}

/// Issue comment posted when the line comments could not be created
pub fn review_failure(error: &str, mapped: &[MappedViolation<'_>], limit: usize) -> String {
    let violations: Vec<&Violation> = mapped.iter().map(|m| m.violation).collect();
    format!(
        "### {}: failed to post review comments\n\n\
        {}\n\n\
        Violations in changed files:\n\n{}",
        TOOL_NAME,
        error.trim(),
        violation_list(&violations, limit)
    )
}
