//! Webhook payload models
//!
//! Typed, stripped-down views of GitHub webhook payloads. Only the fields
//! the pipeline reads are declared; everything else in the delivery is
//! ignored during deserialization.

use serde::Deserialize;

/// Event type taken from the `X-GitHub-Event` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    PullRequest,
    Push,
    Issues,
    Other(String),
}

impl EventKind {
    pub fn from_header(value: &str) -> Self {
        match value {
            "pull_request" => Self::PullRequest,
            "push" => Self::Push,
            "issues" => Self::Issues,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PullRequest => "pull_request",
            Self::Push => "push",
            Self::Issues => "issues",
            Self::Other(s) => s,
        }
    }
}

/// Deserialized webhook body. All fields are optional because GitHub sends
/// different shapes per event type.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub action: Option<String>,
    pub repository: Option<RepositoryInfo>,
    pub pull_request: Option<PullRequestInfo>,
    pub sender: Option<Sender>,
    /// Push events only
    #[serde(rename = "ref")]
    pub push_ref: Option<String>,
    /// Push events only
    #[serde(default)]
    pub commits: Vec<CommitRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryInfo {
    pub full_name: String,
    pub name: String,
    pub owner: Owner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestInfo {
    pub number: u64,
    pub title: Option<String>,
    pub head: Option<GitRefInfo>,
    pub base: Option<GitRefInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitRefInfo {
    #[serde(rename = "ref")]
    pub branch: String,
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sender {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitRef {
    pub id: String,
}

/// One webhook delivery, flattened for the pipeline.
///
/// Ephemeral: created on receipt, dropped after processing. Nothing here is
/// persisted beyond log records.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub kind: EventKind,
    pub delivery_id: Option<String>,
    pub action: Option<String>,
    pub repo_full_name: Option<String>,
    pub repo_name: Option<String>,
    pub repo_owner: Option<String>,
    pub pr_number: Option<u64>,
    pub head_ref: Option<String>,
    pub head_sha: Option<String>,
    pub sender: Option<String>,
}

impl WebhookEvent {
    pub fn new(event_type: &str, delivery_id: Option<String>, payload: &WebhookPayload) -> Self {
        let repo = payload.repository.as_ref();
        let pr = payload.pull_request.as_ref();
        let head = pr.and_then(|p| p.head.as_ref());

        Self {
            kind: EventKind::from_header(event_type),
            delivery_id,
            action: payload.action.clone(),
            repo_full_name: repo.map(|r| r.full_name.clone()),
            repo_name: repo.map(|r| r.name.clone()),
            repo_owner: repo.map(|r| r.owner.login.clone()),
            pr_number: pr.map(|p| p.number),
            head_ref: head.map(|h| h.branch.clone()),
            head_sha: head.map(|h| h.sha.clone()),
            sender: payload.sender.as_ref().map(|s| s.login.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PR_PAYLOAD: &str = r#"{
        "action": "opened",
        "repository": {
            "full_name": "octo/widgets",
            "name": "widgets",
            "owner": {"login": "octo"}
        },
        "pull_request": {
            "number": 7,
            "title": "Add search endpoint",
            "head": {"ref": "feature/search", "sha": "abc123"},
            "base": {"ref": "main", "sha": "def456"}
        },
        "sender": {"login": "octocat"}
    }"#;

    #[test]
    fn flattens_pull_request_payload() {
        let payload: WebhookPayload = serde_json::from_str(PR_PAYLOAD).unwrap();
        let event = WebhookEvent::new("pull_request", Some("d-1".into()), &payload);

        assert_eq!(event.kind, EventKind::PullRequest);
        assert_eq!(event.action.as_deref(), Some("opened"));
        assert_eq!(event.repo_full_name.as_deref(), Some("octo/widgets"));
        assert_eq!(event.repo_owner.as_deref(), Some("octo"));
        assert_eq!(event.pr_number, Some(7));
        assert_eq!(event.head_ref.as_deref(), Some("feature/search"));
        assert_eq!(event.head_sha.as_deref(), Some("abc123"));
        assert_eq!(event.sender.as_deref(), Some("octocat"));
    }

    #[test]
    fn tolerates_minimal_push_payload() {
        let payload: WebhookPayload =
            serde_json::from_str(r#"{"ref": "refs/heads/main", "commits": [{"id": "abc"}]}"#)
                .unwrap();
        let event = WebhookEvent::new("push", None, &payload);

        assert_eq!(event.kind, EventKind::Push);
        assert!(event.pr_number.is_none());
        assert_eq!(payload.commits.len(), 1);
    }

    #[test]
    fn unknown_event_types_are_preserved() {
        let kind = EventKind::from_header("workflow_run");
        assert_eq!(kind, EventKind::Other("workflow_run".to_string()));
        assert_eq!(kind.as_str(), "workflow_run");
    }
}
