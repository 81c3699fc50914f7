use serde::{Deserialize, Serialize};

use crate::repositories::Repository;

/// Body of `POST /compose`. Built once per invocation and never mutated;
/// field names are the service's wire names.
#[derive(Debug, Clone, Serialize)]
pub struct ComposeRequest {
    pub name: String,
    pub version: String,
    pub release: String,
    pub distribution: String,
    pub koji: Koji,
    pub image_requests: Vec<ImageRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Koji {
    pub server: String,
    pub task_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageRequest {
    pub architecture: String,
    pub image_type: String,
    pub repositories: Vec<Repository>,
}

/// The slice of the `POST /compose` response we rely on.
#[derive(Debug, Deserialize)]
pub struct ComposeCreated {
    pub id: String,
}

/// The slice of the `GET /compose/{id}` response we rely on.
#[derive(Debug, Deserialize)]
pub struct ComposeStatusBody {
    pub status: String,
}

/// Compose job state as reported by the service. Only `Pending` and
/// `Running` warrant another poll; everything else is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeStatus {
    Pending,
    Running,
    Success,
    Failure,
    /// Anything outside the known enumeration, carried verbatim. Treated
    /// as a protocol violation, not a transient condition.
    Unrecognized(String),
}

impl ComposeStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => ComposeStatus::Pending,
            "running" => ComposeStatus::Running,
            "success" => ComposeStatus::Success,
            "failure" => ComposeStatus::Failure,
            other => ComposeStatus::Unrecognized(other.to_string()),
        }
    }

    pub fn is_still_working(&self) -> bool {
        matches!(self, ComposeStatus::Pending | ComposeStatus::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::ComposeStatus;

    #[test]
    fn known_statuses_parse() {
        assert_eq!(ComposeStatus::parse("pending"), ComposeStatus::Pending);
        assert_eq!(ComposeStatus::parse("running"), ComposeStatus::Running);
        assert_eq!(ComposeStatus::parse("success"), ComposeStatus::Success);
        assert_eq!(ComposeStatus::parse("failure"), ComposeStatus::Failure);
    }

    #[test]
    fn unknown_status_is_kept_verbatim() {
        let status = ComposeStatus::parse("paused");
        assert_eq!(status, ComposeStatus::Unrecognized("paused".to_string()));
        assert!(!status.is_still_working());
    }

    #[test]
    fn only_pending_and_running_keep_polling() {
        assert!(ComposeStatus::parse("pending").is_still_working());
        assert!(ComposeStatus::parse("running").is_still_working());
        assert!(!ComposeStatus::parse("success").is_still_working());
        assert!(!ComposeStatus::parse("failure").is_still_working());
    }
}
