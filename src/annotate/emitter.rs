use super::mapper::{Mapping, MappedViolation};
use super::render;
use crate::config::{AnnotateConfig, CommentMode};
use crate::diff;
use crate::event::PullRequestContext;
use crate::github::PullRequestApi;
use crate::types::ReviewComment;
use tracing::{debug, error, info, warn};

/// Line used when a changed file has no added line to anchor on
const FALLBACK_LINE: u32 = 1;

/// Counts describing what one annotation run did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnnotateSummary {
    pub mapped: usize,
    pub unmapped: usize,
    pub posted: usize,
    pub failed: usize,
    pub omitted: usize,
}

/// Build line comments for at most `max` mapped violations
pub fn build_comments(mapped: &[MappedViolation<'_>], max: usize) -> Vec<ReviewComment> {
    mapped
        .iter()
        .take(max)
        .map(|m| ReviewComment {
            path: m.file.filename.clone(),
            line: diff::first_added_line(m.file.patch.as_deref()).unwrap_or(FALLBACK_LINE),
            body: render::comment_body(m.violation),
        })
        .collect()
}

/// Post review comments for mapped violations and a summary for unmapped ones.
///
/// Failures are logged and reported through fallback issue comments, never returned.
pub async fn emit<A: PullRequestApi>(
    api: &A,
    pr: &PullRequestContext,
    mapping: &Mapping<'_>,
    config: &AnnotateConfig,
) -> AnnotateSummary {
    let mut summary = AnnotateSummary {
        mapped: mapping.mapped.len(),
        unmapped: mapping.unmapped.len(),
        ..AnnotateSummary::default()
    };

    let comments = build_comments(&mapping.mapped, config.max_annos);
    summary.omitted = mapping.mapped.len() - comments.len();
    if summary.omitted > 0 {
        warn!(
            "{} mapped violation(s) exceed the limit of {} and are not annotated",
            summary.omitted, config.max_annos
        );
    }

    if comments.is_empty() {
        info!("No review comments to post");
    } else {
        match config.comment_mode {
            CommentMode::Review => {
                post_review(api, pr, mapping, config, &comments, &mut summary).await
            }
            CommentMode::Individual => {
                post_individual(api, pr, &comments, &mut summary).await
            }
        }
    }

    if !mapping.unmapped.is_empty() {
        let body = render::unmapped_summary(&mapping.unmapped, config.summary_limit);
        match api.create_issue_comment(pr, &body).await {
            Ok(()) => info!(
                "Posted summary of {} unmapped violation(s)",
                mapping.unmapped.len()
            ),
            Err(e) => error!("Failed to post unmapped violation summary: {}", e),
        }
    }

    summary
}

async fn post_review<A: PullRequestApi>(
    api: &A,
    pr: &PullRequestContext,
    mapping: &Mapping<'_>,
    config: &AnnotateConfig,
    comments: &[ReviewComment],
    summary: &mut AnnotateSummary,
) {
    let body = render::review_body(comments.len(), summary.omitted, config.max_annos);
    debug!("Creating review with {} comments", comments.len());
    match api.create_review(pr, &body, comments).await {
        Ok(()) => {
            summary.posted = comments.len();
            info!("Posted review with {} comment(s)", comments.len());
        }
        Err(e) => {
            summary.failed = comments.len();
            error!("Failed to create review: {}", e);
            let fallback = render::review_failure(
                &e.to_string(),
                &mapping.mapped[..comments.len()],
                config.summary_limit,
            );
            if let Err(e) = api.create_issue_comment(pr, &fallback).await {
                error!("Failed to post review failure comment: {}", e);
            }
        }
    }
}

async fn post_individual<A: PullRequestApi>(
    api: &A,
    pr: &PullRequestContext,
    comments: &[ReviewComment],
    summary: &mut AnnotateSummary,
) {
    for comment in comments {
        match api.create_review_comment(pr, comment).await {
            Ok(()) => summary.posted += 1,
            Err(e) => {
                summary.failed += 1;
                warn!(
                    "Failed to comment on {}:{}: {}",
                    comment.path, comment.line, e
                );
            }
        }
    }
    info!(
        "Posted {} review comment(s), {} failed",
        summary.posted, summary.failed
    );
}
