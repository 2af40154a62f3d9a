use crate::blog::BlogError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub token was rejected. Check the token and try again")]
    BadCredentials,

    #[error("Access denied. The token does not have write access to the repository")]
    InsufficientScope,

    #[error("Remote file not found: {0}")]
    NotFound(String),

    #[error("The file may have been modified by someone else")]
    Conflict,

    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid remote content: {0}")]
    InvalidContent(String),

    #[error(transparent)]
    Frontmatter(#[from] BlogError),
}

impl IntoResponse for GithubError {
    fn into_response(self) -> Response {
        let status = match &self {
            GithubError::BadCredentials => StatusCode::UNAUTHORIZED,
            GithubError::InsufficientScope => StatusCode::FORBIDDEN,
            GithubError::NotFound(_) => StatusCode::NOT_FOUND,
            GithubError::Conflict => StatusCode::CONFLICT,
            GithubError::Transport(_) | GithubError::Api { .. } => StatusCode::BAD_GATEWAY,
            GithubError::InvalidContent(_) | GithubError::Frontmatter(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = self.to_string();
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
