use serde::Deserialize;
use std::fmt;

#[derive(Debug)]
pub enum EventError {
    MissingRepository,
    MissingEventPath,
    Io(String, std::io::Error),
    Parse(String, serde_json::Error),
    NotPullRequest,
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::MissingRepository => write!(f, "GITHUB_REPOSITORY is not set to owner/repo"),
            EventError::MissingEventPath => write!(f, "GITHUB_EVENT_PATH is not set"),
            EventError::Io(path, e) => write!(f, "Failed to read event file {}: {}", path, e),
            EventError::Parse(path, e) => write!(f, "Failed to parse event file {}: {}", path, e),
            EventError::NotPullRequest => write!(f, "Event payload has no pull request"),
        }
    }
}

impl std::error::Error for EventError {}

/// Repository and pull request targeted by this run
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestContext {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub head_sha: Option<String>,
}

#[derive(Deserialize)]
struct Event {
    #[serde(default)]
    number: Option<u64>,
    #[serde(default)]
    pull_request: Option<PullRequest>,
}

#[derive(Deserialize)]
struct PullRequest {
    number: u64,
    #[serde(default)]
    head: Option<Head>,
}

#[derive(Deserialize)]
struct Head {
    sha: String,
}

impl PullRequestContext {
    /// Build the context from `owner/repo` and the event payload file
    pub fn load(repository: Option<&str>, event_path: Option<&str>) -> Result<Self, EventError> {
        let (owner, repo) = repository
            .and_then(split_repository)
            .ok_or(EventError::MissingRepository)?;
        let path = event_path
            .filter(|p| !p.is_empty())
            .ok_or(EventError::MissingEventPath)?;
        let content =
            std::fs::read_to_string(path).map_err(|e| EventError::Io(path.to_string(), e))?;
        let (number, head_sha) = parse_event(&content)
            .map_err(|e| EventError::Parse(path.to_string(), e))?
            .ok_or(EventError::NotPullRequest)?;
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            head_sha,
        })
    }
}

fn split_repository(repository: &str) -> Option<(&str, &str)> {
    let (owner, repo) = repository.trim().split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner, repo))
}

/// Extract the pull request number and head sha from an event payload
fn parse_event(content: &str) -> Result<Option<(u64, Option<String>)>, serde_json::Error> {
    let event: Event = serde_json::from_str(content)?;
    Ok(match event.pull_request {
        Some(pr) => Some((pr.number, pr.head.map(|h| h.sha))),
        None => event.number.map(|n| (n, None)),
    })
}
