pub mod emitter;
pub mod mapper;
pub mod render;

use crate::cli::ReviewArgs;
use crate::config::{self, AnnotateConfig};
use crate::event::PullRequestContext;
use crate::github::{GitHubClient, PullRequestApi};
use crate::report::{self, ReportError};
use crate::types::{ChangedFile, Violation};
use emitter::AnnotateSummary;
use mapper::ChangedFiles;
use tracing::{debug, info, trace, warn};

/// Run the review annotation flow for the current pull request.
///
/// Missing token, pull request context or report file mean there is nothing
/// to do and return `Ok(None)`. Remaining errors are for the caller to log.
pub async fn run_review(args: &ReviewArgs) -> anyhow::Result<Option<AnnotateSummary>> {
    run_review_with(args, |name| std::env::var(name).ok()).await
}

/// [`run_review`] with token fallbacks read through `env`
pub async fn run_review_with(
    args: &ReviewArgs,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Option<AnnotateSummary>> {
    let Some(token) = config::resolve_token(args.token.as_deref(), env) else {
        info!("No GitHub token found, skipping annotations");
        return Ok(None);
    };

    let violations = match report::load_violations(&args.filter.report) {
        Ok(v) => v,
        Err(ReportError::NotFound(path)) => {
            info!("{} not found, skipping annotations", path);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let pr = match PullRequestContext::load(
        args.repository.as_deref(),
        args.event_path.as_deref(),
    ) {
        Ok(pr) => pr,
        Err(e) => {
            info!("No pull request context ({}), skipping annotations", e);
            return Ok(None);
        }
    };
    debug!("Resolved pull request: {:?}", pr);

    let config = AnnotateConfig {
        comment_mode: args.comment_mode,
        summary_limit: args.summary_limit,
        ..AnnotateConfig::from_filter_args(&args.filter)
    };
    let client = GitHubClient::new(&args.api_url, token);
    let summary = annotate_pull_request(&client, &pr, &violations, &config).await;
    Ok(Some(summary))
}

/// Map report violations onto the pull request's changed files and post annotations
pub async fn annotate_pull_request<A: PullRequestApi>(
    api: &A,
    pr: &PullRequestContext,
    violations: &[Violation],
    config: &AnnotateConfig,
) -> AnnotateSummary {
    let selected = mapper::filter_violations(violations, config);
    info!(
        "{} of {} violation(s) selected for annotation",
        selected.len(),
        violations.len()
    );
    if selected.is_empty() {
        info!("No dependency-cruiser violations");
        return AnnotateSummary::default();
    }

    // Without the file list every violation goes to the summary comment
    let files: Vec<ChangedFile> = match api.list_files(pr).await {
        Ok(files) => files,
        Err(e) => {
            warn!("Failed to list pull request files: {}", e);
            vec![]
        }
    };
    let changed = ChangedFiles::new(&files);
    info!("Pull request changes {} file(s)", files.len());
    trace!("Indexed {} changed path(s)", changed.len());

    let mapping = mapper::map_violations(&selected, &changed, &config.root_prefix);
    info!(
        "{} violation(s) in changed files, {} unmapped",
        mapping.mapped.len(),
        mapping.unmapped.len()
    );

    emitter::emit(api, pr, &mapping, config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::config::CommentMode;
    use crate::github::fake::FakeApi;
    use crate::report::parse_violations;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn review_args(report: &str) -> ReviewArgs {
        let cli = Cli::try_parse_from([
            "depcruise-annotate",
            "review",
            "--report",
            report,
            "--repository",
            "octo/app",
            "--token",
            "t",
        ])
        .unwrap();
        let Commands::Review(mut args) = cli.command else {
            panic!("expected review command");
        };
        args.event_path = None;
        args
    }

    fn report_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn context() -> PullRequestContext {
        PullRequestContext {
            owner: "octo".into(),
            repo: "app".into(),
            number: 9,
            head_sha: Some("deadbeef".into()),
        }
    }

    fn changed(filename: &str, patch: Option<&str>) -> ChangedFile {
        ChangedFile {
            filename: filename.into(),
            previous_filename: None,
            patch: patch.map(Into::into),
        }
    }

    const REPORT: &str = r#"{
        "summary": {
            "violations": [
                {
                    "from": "src/components/Atoms/Button/Button.tsx",
                    "to": "src/components/Organisms/Header/Header.tsx",
                    "rule": { "severity": "error", "name": "no-up-from-atoms" }
                },
                {
                    "from": "src/components/Molecules/Card/Card.tsx",
                    "to": "src/components/Pages/Home/Home.tsx",
                    "rule": { "severity": "error", "name": "no-up-from-molecules" }
                },
                {
                    "from": "src/App.tsx",
                    "to": "src/components/Atoms/index.ts",
                    "rule": { "severity": "warn", "name": "no-layer-barrel-imports" }
                }
            ]
        }
    }"#;

    fn api_for_report() -> FakeApi {
        FakeApi {
            files: vec![
                changed(
                    "src/components/Atoms/Button/Button.tsx",
                    Some("@@ -1,3 +1,4 @@\n import React from 'react';\n+import { Header } from '../../Organisms/Header/Header';\n"),
                ),
                changed("src/components/Molecules/Card/Card.tsx", None),
                changed("README.md", Some("@@ -1 +1 @@\n-a\n+b\n")),
            ],
            ..FakeApi::default()
        }
    }

    #[tokio::test]
    async fn test_two_mapped_one_unmapped() {
        let violations = parse_violations(REPORT).unwrap();
        let api = api_for_report();

        let summary =
            annotate_pull_request(&api, &context(), &violations, &AnnotateConfig::default()).await;

        assert_eq!(
            summary,
            AnnotateSummary {
                mapped: 2,
                unmapped: 1,
                posted: 2,
                failed: 0,
                omitted: 0,
            }
        );
        let reviews = api.reviews.borrow();
        assert_eq!(reviews.len(), 1);
        let comments = &reviews[0].1;
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].path, "src/components/Atoms/Button/Button.tsx");
        assert_eq!(comments[0].line, 2);
        assert_eq!(comments[1].path, "src/components/Molecules/Card/Card.tsx");
        assert_eq!(comments[1].line, 1);

        let issues = api.issue_comments.borrow();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("1 violation(s) outside changed files"));
        assert!(issues[0].contains("no-layer-barrel-imports"));
        assert!(!issues[0].contains("no-up-from-atoms"));
    }

    #[tokio::test]
    async fn test_nothing_mapped_posts_no_review() {
        let violations = parse_violations(REPORT).unwrap();
        let api = FakeApi {
            files: vec![changed("README.md", None)],
            ..FakeApi::default()
        };

        let summary =
            annotate_pull_request(&api, &context(), &violations, &AnnotateConfig::default()).await;

        assert_eq!(summary.mapped, 0);
        assert_eq!(summary.unmapped, 3);
        assert!(api.reviews.borrow().is_empty());
        assert_eq!(api.issue_comments.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_review_failure_posts_fallback() {
        let violations = parse_violations(REPORT).unwrap();
        let api = FakeApi {
            fail_review: true,
            ..api_for_report()
        };

        let summary =
            annotate_pull_request(&api, &context(), &violations, &AnnotateConfig::default()).await;

        assert_eq!(summary.posted, 0);
        assert_eq!(summary.failed, 2);
        let issues = api.issue_comments.borrow();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].contains("failed to post review comments"));
        assert!(issues[0].contains("422"));
        assert!(issues[1].contains("outside changed files"));
    }

    #[tokio::test]
    async fn test_comment_cap() {
        let violations = parse_violations(REPORT).unwrap();
        let api = api_for_report();
        let config = AnnotateConfig {
            max_annos: 1,
            ..AnnotateConfig::default()
        };

        let summary = annotate_pull_request(&api, &context(), &violations, &config).await;

        assert_eq!(summary.posted, 1);
        assert_eq!(summary.omitted, 1);
        let reviews = api.reviews.borrow();
        assert_eq!(reviews[0].1.len(), 1);
        assert!(reviews[0].0.contains("1 more violation(s) not shown"));
    }

    #[tokio::test]
    async fn test_individual_comments() {
        let violations = parse_violations(REPORT).unwrap();
        let api = FakeApi {
            fail_comment_paths: vec!["src/components/Molecules/Card/Card.tsx".into()],
            ..api_for_report()
        };
        let config = AnnotateConfig {
            comment_mode: CommentMode::Individual,
            ..AnnotateConfig::default()
        };

        let summary = annotate_pull_request(&api, &context(), &violations, &config).await;

        assert_eq!(summary.posted, 1);
        assert_eq!(summary.failed, 1);
        assert!(api.reviews.borrow().is_empty());
        assert_eq!(api.review_comments.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_list_files_failure_reports_everything_unmapped() {
        let violations = parse_violations(REPORT).unwrap();
        let api = FakeApi {
            fail_list_files: true,
            ..api_for_report()
        };

        let summary =
            annotate_pull_request(&api, &context(), &violations, &AnnotateConfig::default()).await;

        assert_eq!(summary.unmapped, 3);
        assert!(api.reviews.borrow().is_empty());
        assert_eq!(api.issue_comments.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_severity_filter_skips_everything() {
        let violations = parse_violations(REPORT).unwrap();
        let api = api_for_report();
        let config = AnnotateConfig {
            include_warn: false,
            include_error: false,
            ..AnnotateConfig::default()
        };

        let summary = annotate_pull_request(&api, &context(), &violations, &config).await;

        assert_eq!(summary, AnnotateSummary::default());
        assert!(api.issue_comments.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_run_review_without_token() {
        let file = report_file(REPORT);
        let mut args = review_args(file.path().to_str().unwrap());
        args.token = None;

        let result = run_review_with(&args, |_| None).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_run_review_missing_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depcruise.json");
        let args = review_args(path.to_str().unwrap());

        let result = run_review_with(&args, |_| None).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_run_review_without_event_path() {
        let file = report_file(REPORT);
        let args = review_args(file.path().to_str().unwrap());

        let result = run_review_with(&args, |_| None).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_run_review_malformed_report() {
        let file = report_file("{ \"summary\": ");
        let args = review_args(file.path().to_str().unwrap());

        assert!(run_review_with(&args, |_| None).await.is_err());
    }

    #[tokio::test]
    async fn test_run_review_token_from_env_lookup() {
        let file = report_file("not json");
        let mut args = review_args(file.path().to_str().unwrap());
        args.token = None;

        // The report is only read once a token is found
        let result =
            run_review_with(&args, |name| (name == "GH_TOKEN").then(|| "gh".to_string())).await;
        assert!(result.is_err());
    }
}
