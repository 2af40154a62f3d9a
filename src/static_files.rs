use axum::{
    body::Body,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::{
    path::{Component, Path, PathBuf},
    time::UNIX_EPOCH,
};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

#[derive(Clone)]
pub struct StaticFileHandler {
    pub static_dir: PathBuf,
}

impl StaticFileHandler {
    pub fn new(static_dir: PathBuf) -> Self {
        Self { static_dir }
    }

    pub async fn serve(&self, path: &str) -> Response {
        let relative = Path::new(path.trim_start_matches('/'));

        // Only plain path segments may appear; `..`, roots and prefixes would
        // escape the static directory.
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)))
        {
            error!("Path traversal attempt: {:?}", relative);
            return (StatusCode::FORBIDDEN, "Forbidden").into_response();
        }

        let file_path = self.static_dir.join(relative);

        debug!("Attempting to serve static file: {:?}", file_path);

        let metadata = match tokio::fs::metadata(&file_path).await {
            Ok(m) if m.is_file() => m,
            _ => {
                debug!("Static file not found: {:?}", file_path);
                return (StatusCode::NOT_FOUND, "File not found").into_response();
            }
        };

        let file = match File::open(&file_path).await {
            Ok(file) => file,
            Err(e) => {
                debug!("Failed to open file {:?}: {}", file_path, e);
                return (StatusCode::NOT_FOUND, "File not found").into_response();
            }
        };

        let content_type = mime_guess::from_path(&file_path)
            .first_or_octet_stream()
            .to_string();

        let cache_control = if content_type.starts_with("image/") {
            "public, max-age=31536000"
        } else if content_type.starts_with("text/css")
            || content_type.starts_with("application/javascript")
        {
            "public, max-age=300, must-revalidate"
        } else {
            "public, max-age=3600"
        };

        let stream = ReaderStream::new(file);
        let body = Body::from_stream(stream);

        let mut response = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CACHE_CONTROL, cache_control);

        if let Ok(modified) = metadata.modified()
            && let Ok(duration) = modified.duration_since(UNIX_EPOCH)
        {
            response = response.header(header::LAST_MODIFIED, httpdate::fmt_http_date(modified));

            let etag = format!("\"{}-{}\"", duration.as_secs(), metadata.len());
            response = response.header(header::ETAG, etag);
        }

        match response.body(body) {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to build static file response: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
