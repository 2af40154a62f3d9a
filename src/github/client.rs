//! Client for the GitHub contents API, writing the same frontmatter format as
//! the local repository so that remote edits stay byte-compatible with
//! locally authored files.

use super::{
    error::GithubError,
    types::{
        ApiErrorBody, CommitRequest, ContentsResponse, DeploymentRef, DeploymentStatus,
        GithubConfig, RemotePost, WorkflowRun, WorkflowRunsResponse,
    },
};
use crate::blog::{PostMetadata, frontmatter};
use base64::{Engine, engine::general_purpose};
use chrono::{NaiveDate, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use tracing::{info, warn};

pub struct GithubClient {
    http: reqwest::Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn get_config(&self) -> &GithubConfig {
        &self.config
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.config.api_base, self.config.owner, self.config.repo, suffix
        )
    }

    fn contents_url(&self, slug: &str) -> String {
        self.repo_url(&format!(
            "contents/{}/{}.md",
            self.config.content_path,
            urlencoding::encode(slug)
        ))
    }

    fn authed(&self, request: reqwest::RequestBuilder, token: &str) -> reqwest::RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(ACCEPT, "application/vnd.github.v3+json")
            .header(USER_AGENT, "nikki")
    }

    /// Fetches and decodes the remote post, returning its current sha as the
    /// version token for a later save.
    pub async fn fetch_post(&self, slug: &str, token: &str) -> Result<RemotePost, GithubError> {
        let response = self
            .authed(
                self.http
                    .get(self.contents_url(slug))
                    .query(&[("ref", self.config.branch.as_str())]),
                token,
            )
            .send()
            .await?;

        let response = check_status(response, slug).await?;
        let file: ContentsResponse = response.json().await?;

        let text = decode_transport_content(&file.content)?;
        let (metadata, body) = frontmatter::decode(&text)?;

        // Scan the raw text rather than trusting the structured decode, so the
        // stored creation date survives even if the block gains fields a newer
        // decoder would reshape.
        let original_date = scan_frontmatter_date(&text).unwrap_or(metadata.date);

        Ok(RemotePost {
            metadata,
            body,
            sha: file.sha,
            original_date,
        })
    }

    /// Commits the post. `metadata.date` must carry the creation date taken
    /// from the fetch step; `updated_date` is stamped here. A stale sha is
    /// surfaced as `GithubError::Conflict` and never retried.
    pub async fn save_post(
        &self,
        slug: &str,
        metadata: &PostMetadata,
        body: &str,
        sha: Option<String>,
        token: &str,
    ) -> Result<(), GithubError> {
        let metadata = PostMetadata {
            updated_date: Some(Utc::now().date_naive()),
            ..metadata.clone()
        };

        let text = frontmatter::encode(&metadata, body);
        let request = CommitRequest {
            message: format!("Update blog post: {}", metadata.title),
            content: general_purpose::STANDARD.encode(text.as_bytes()),
            sha,
            branch: self.config.branch.clone(),
        };

        let response = self
            .authed(self.http.put(self.contents_url(slug)).json(&request), token)
            .send()
            .await?;

        check_status(response, slug).await?;
        info!("Committed post '{}' to {}/{}", slug, self.config.owner, self.config.repo);
        Ok(())
    }

    /// Most recent CI run on the publishing branch, if any.
    pub async fn fetch_latest_workflow_run(
        &self,
        token: &str,
    ) -> Result<Option<WorkflowRun>, GithubError> {
        let response = self
            .authed(
                self.http
                    .get(self.repo_url("actions/runs"))
                    .query(&[("per_page", "1"), ("branch", self.config.branch.as_str())]),
                token,
            )
            .send()
            .await?;

        let response = check_status(response, "workflow runs").await?;
        let runs: WorkflowRunsResponse = response.json().await?;
        Ok(runs.workflow_runs.into_iter().next())
    }

    /// Latest status of the configured deployment environment. Two lookups:
    /// the newest deployment, then its newest status. No deployment, or a
    /// deployment without a status yet, is `Ok(None)`.
    pub async fn fetch_latest_deployment(
        &self,
        token: &str,
    ) -> Result<Option<DeploymentStatus>, GithubError> {
        let response = self
            .authed(
                self.http.get(self.repo_url("deployments")).query(&[
                    ("per_page", "1"),
                    ("environment", self.config.environment.as_str()),
                ]),
                token,
            )
            .send()
            .await?;

        let response = check_status(response, "deployments").await?;
        let deployments: Vec<DeploymentRef> = response.json().await?;
        let Some(deployment) = deployments.into_iter().next() else {
            return Ok(None);
        };

        let response = self
            .authed(
                self.http
                    .get(self.repo_url(&format!("deployments/{}/statuses", deployment.id))),
                token,
            )
            .send()
            .await?;
        if !response.status().is_success() {
            warn!(
                "Status lookup for deployment {} returned {}",
                deployment.id,
                response.status()
            );
            return Ok(None);
        }

        let statuses: Vec<DeploymentStatus> = response.json().await?;
        Ok(statuses.into_iter().next())
    }
}

async fn check_status(
    response: reqwest::Response,
    subject: &str,
) -> Result<reqwest::Response, GithubError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ApiErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });
    warn!("GitHub API returned {} for '{}': {}", status, subject, message);

    Err(match status.as_u16() {
        401 => GithubError::BadCredentials,
        403 => GithubError::InsufficientScope,
        404 => GithubError::NotFound(subject.to_string()),
        // The contents API reports a sha mismatch as 409 or 422 depending on
        // the endpoint version.
        409 | 422 => GithubError::Conflict,
        code => GithubError::Api {
            status: code,
            message,
        },
    })
}

/// The API transports file content as base64 broken by newlines. Strip the
/// whitespace, decode, and require valid UTF-8 so multi-byte characters
/// round-trip exactly.
fn decode_transport_content(content: &str) -> Result<String, GithubError> {
    let stripped: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(stripped)
        .map_err(|e| GithubError::InvalidContent(format!("base64 decode failed: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| GithubError::InvalidContent(format!("content is not valid UTF-8: {}", e)))
}

/// Pulls the `date` field out of the raw frontmatter block.
fn scan_frontmatter_date(text: &str) -> Option<NaiveDate> {
    let mut lines = text.lines();
    if lines.next()? != "---" {
        return None;
    }
    for line in lines {
        let line = line.trim();
        if line == "---" {
            break;
        }
        if let Some(value) = line.strip_prefix("date:") {
            let value = value.trim().trim_matches('"');
            return NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .or_else(|| {
                    value
                        .get(..10)
                        .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
                });
        }
    }
    None
}
