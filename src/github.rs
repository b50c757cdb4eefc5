use crate::event::PullRequestContext;
use crate::types::{ChangedFile, ReviewComment};
use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("depcruise-annotate/", env!("CARGO_PKG_VERSION"));
const FILES_PER_PAGE: usize = 100;
// GitHub lists at most 3000 files per pull request
const MAX_FILE_PAGES: usize = 30;

#[derive(Debug)]
pub enum GitHubError {
    Request(reqwest::Error),
    Status { status: u16, body: String },
}

impl fmt::Display for GitHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitHubError::Request(e) => write!(f, "GitHub request failed: {}", e),
            GitHubError::Status { status, body } => {
                write!(f, "GitHub API returned {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for GitHubError {}

impl From<reqwest::Error> for GitHubError {
    fn from(e: reqwest::Error) -> Self {
        GitHubError::Request(e)
    }
}

/// Side of the diff a review comment is anchored to
pub const SIDE_RIGHT: &str = "RIGHT";
/// Review event that leaves comments without approving or requesting changes
pub const REVIEW_EVENT_COMMENT: &str = "COMMENT";

#[derive(Serialize, Debug)]
struct DraftComment<'a> {
    path: &'a str,
    line: u32,
    side: &'static str,
    body: &'a str,
}

impl<'a> From<&'a ReviewComment> for DraftComment<'a> {
    fn from(c: &'a ReviewComment) -> Self {
        Self {
            path: &c.path,
            line: c.line,
            side: SIDE_RIGHT,
            body: &c.body,
        }
    }
}

#[derive(Serialize, Debug)]
struct CreateReviewRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    commit_id: Option<&'a str>,
    body: &'a str,
    event: &'static str,
    comments: Vec<DraftComment<'a>>,
}

#[derive(Serialize, Debug)]
struct CreateReviewCommentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    commit_id: Option<&'a str>,
    #[serde(flatten)]
    comment: DraftComment<'a>,
}

#[derive(Serialize, Debug)]
struct CreateIssueCommentRequest<'a> {
    body: &'a str,
}

/// The pull request endpoints the annotator talks to
#[allow(async_fn_in_trait)]
pub trait PullRequestApi {
    /// `GET /repos/{owner}/{repo}/pulls/{n}/files`, all pages
    async fn list_files(&self, pr: &PullRequestContext) -> Result<Vec<ChangedFile>, GitHubError>;

    /// `POST /repos/{owner}/{repo}/pulls/{n}/reviews`
    async fn create_review(
        &self,
        pr: &PullRequestContext,
        body: &str,
        comments: &[ReviewComment],
    ) -> Result<(), GitHubError>;

    /// `POST /repos/{owner}/{repo}/pulls/{n}/comments`
    async fn create_review_comment(
        &self,
        pr: &PullRequestContext,
        comment: &ReviewComment,
    ) -> Result<(), GitHubError>;

    /// `POST /repos/{owner}/{repo}/issues/{n}/comments`
    async fn create_issue_comment(
        &self,
        pr: &PullRequestContext,
        body: &str,
    ) -> Result<(), GitHubError>;
}

/// GitHub REST client
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn repo_url(&self, pr: &PullRequestContext) -> String {
        format!("{}/repos/{}/{}", self.api_url, pr.owner, pr.repo)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        trace!("{} {}", method, url);
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT)
    }

    async fn post<T: Serialize>(&self, url: &str, payload: &T) -> Result<(), GitHubError> {
        let response = self
            .request(reqwest::Method::POST, url)
            .json(payload)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }
}

/// Turn a non-success response into `GitHubError::Status`
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GitHubError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GitHubError::Status {
        status: status.as_u16(),
        body,
    })
}

impl PullRequestApi for GitHubClient {
    async fn list_files(&self, pr: &PullRequestContext) -> Result<Vec<ChangedFile>, GitHubError> {
        let mut files = Vec::new();
        for page in 1..=MAX_FILE_PAGES {
            let url = format!(
                "{}/pulls/{}/files?per_page={}&page={}",
                self.repo_url(pr),
                pr.number,
                FILES_PER_PAGE,
                page
            );
            let response = self.request(reqwest::Method::GET, &url).send().await?;
            let batch: Vec<ChangedFile> = check_status(response).await?.json().await?;
            debug!("Fetched page {} with {} files", page, batch.len());
            let last_page = batch.len() < FILES_PER_PAGE;
            files.extend(batch);
            if last_page {
                break;
            }
        }
        Ok(files)
    }

    async fn create_review(
        &self,
        pr: &PullRequestContext,
        body: &str,
        comments: &[ReviewComment],
    ) -> Result<(), GitHubError> {
        let url = format!("{}/pulls/{}/reviews", self.repo_url(pr), pr.number);
        let payload = CreateReviewRequest {
            commit_id: pr.head_sha.as_deref(),
            body,
            event: REVIEW_EVENT_COMMENT,
            comments: comments.iter().map(DraftComment::from).collect(),
        };
        self.post(&url, &payload).await
    }

    async fn create_review_comment(
        &self,
        pr: &PullRequestContext,
        comment: &ReviewComment,
    ) -> Result<(), GitHubError> {
        let url = format!("{}/pulls/{}/comments", self.repo_url(pr), pr.number);
        let payload = CreateReviewCommentRequest {
            commit_id: pr.head_sha.as_deref(),
            comment: DraftComment::from(comment),
        };
        self.post(&url, &payload).await
    }

    async fn create_issue_comment(
        &self,
        pr: &PullRequestContext,
        body: &str,
    ) -> Result<(), GitHubError> {
        let url = format!("{}/issues/{}/comments", self.repo_url(pr), pr.number);
        self.post(&url, &CreateIssueCommentRequest { body }).await
    }
}
