use super::{
    error::GithubError,
    types::{DeploymentStatus, WorkflowRun},
};
use crate::{AppState, auth::bearer_token, blog::PostMetadata};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct RemotePostResponse {
    title: String,
    excerpt: String,
    content: String,
    tags: Vec<String>,
    published: bool,
    date: String,
    updated_date: Option<String>,
    sha: String,
}

pub async fn fetch_remote_post_handler(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Json<RemotePostResponse>, GithubError> {
    let token = bearer_token(&headers).ok_or(GithubError::BadCredentials)?;
    let remote = app_state.github.fetch_post(&slug, &token).await?;

    Ok(Json(RemotePostResponse {
        title: remote.metadata.title,
        excerpt: remote.metadata.excerpt,
        content: remote.body,
        tags: remote.metadata.tags,
        published: remote.metadata.published,
        date: remote.original_date.format("%Y-%m-%d").to_string(),
        updated_date: remote
            .metadata
            .updated_date
            .map(|date| date.format("%Y-%m-%d").to_string()),
        sha: remote.sha,
    }))
}

#[derive(Deserialize)]
pub struct SaveRemotePostRequest {
    title: String,
    excerpt: String,
    content: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "default_published")]
    published: bool,
    /// Creation date and version token from a prior fetch. When absent the
    /// handler fetches them itself before writing.
    date: Option<NaiveDate>,
    sha: Option<String>,
}

fn default_published() -> bool {
    true
}

#[derive(Serialize)]
pub struct SaveRemotePostResponse {
    success: bool,
    slug: String,
}

pub async fn save_remote_post_handler(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<SaveRemotePostRequest>,
) -> Result<Json<SaveRemotePostResponse>, GithubError> {
    let token = bearer_token(&headers).ok_or(GithubError::BadCredentials)?;

    // Read-modify-write: recover the creation date and version token before
    // committing, unless the editor already did the fetch and passed them in.
    let (date, sha) = match (payload.date, payload.sha.clone()) {
        (Some(date), sha) => (date, sha),
        (None, _) => match app_state.github.fetch_post(&slug, &token).await {
            Ok(remote) => (remote.original_date, Some(remote.sha)),
            // A missing remote file means this save creates it.
            Err(GithubError::NotFound(_)) => (Utc::now().date_naive(), None),
            Err(e) => return Err(e),
        },
    };

    let metadata = PostMetadata {
        title: payload.title,
        date,
        updated_date: None,
        excerpt: payload.excerpt,
        tags: payload.tags,
        published: payload.published,
    };

    app_state
        .github
        .save_post(&slug, &metadata, &payload.content, sha, &token)
        .await?;

    Ok(Json(SaveRemotePostResponse {
        success: true,
        slug,
    }))
}

#[derive(Serialize)]
pub struct DeploymentStatusResponse {
    status: &'static str,
    workflow_run: Option<WorkflowRun>,
    deployment: Option<DeploymentStatus>,
}

/// Publish-state check for the editor: the newest CI run on the publishing
/// branch plus the newest status of the deployment environment.
pub async fn deployment_status_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DeploymentStatusResponse>, GithubError> {
    let token = bearer_token(&headers).ok_or(GithubError::BadCredentials)?;

    let workflow_run = app_state.github.fetch_latest_workflow_run(&token).await?;
    let deployment = app_state.github.fetch_latest_deployment(&token).await?;

    let status = workflow_run
        .as_ref()
        .map(WorkflowRun::display_status)
        .unwrap_or("Unknown");

    Ok(Json(DeploymentStatusResponse {
        status,
        workflow_run,
        deployment,
    }))
}
