use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Missing metadata field: {0}")]
    MissingMetadata(String),

    #[error("Invalid post format: {0}")]
    InvalidFormat(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("A post with slug '{0}' already exists")]
    SlugTaken(String),
}
