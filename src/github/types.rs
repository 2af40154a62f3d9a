use crate::blog::PostMetadata;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubConfig {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Repository path of the blog content, e.g. `content/blog`.
    pub content_path: String,
    /// Deployment environment whose status the editor monitors.
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_environment() -> String {
    "github-pages".to_string()
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            branch: "main".to_string(),
            content_path: "content/blog".to_string(),
            environment: default_environment(),
            api_base: default_api_base(),
        }
    }
}

/// A post as fetched from the contents API, together with the version token
/// (sha) needed to write it back.
#[derive(Debug, Clone)]
pub struct RemotePost {
    pub metadata: PostMetadata,
    pub body: String,
    pub sha: String,
    /// Creation date recovered by scanning the raw frontmatter text, kept
    /// separately from the structured decode so it can be preserved verbatim
    /// on save.
    pub original_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct ContentsResponse {
    pub content: String,
    pub sha: String,
}

#[derive(Debug, Serialize)]
pub struct CommitRequest {
    pub message: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    pub branch: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<String>,
}

/// Most recent CI run on the publishing branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    /// `queued`, `in_progress` or `completed`.
    pub status: String,
    /// Set once the run completes: `success`, `failure`, `cancelled`, ...
    pub conclusion: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub html_url: String,
    pub head_sha: String,
}

impl WorkflowRun {
    /// Collapses status and conclusion into the label the editor shows.
    pub fn display_status(&self) -> &'static str {
        let effective = if self.status == "completed" {
            self.conclusion.as_deref().unwrap_or("")
        } else {
            self.status.as_str()
        };
        match effective {
            "success" => "Live",
            "failure" => "Failed",
            "in_progress" => "Building",
            "queued" => "Queued",
            _ => "Pending",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WorkflowRunsResponse {
    pub workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Deserialize)]
pub struct DeploymentRef {
    pub id: u64,
}

/// Latest reported status of the monitored deployment environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
