use crate::Config;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Failed to create content directory: {0}")]
    ContentDirectoryCreationFailed(#[from] std::io::Error),

    #[error("Templates directory does not exist: {0}")]
    TemplatesDirectoryMissing(String),

    #[error("Static files directory does not exist")]
    StaticDirectoryMissing,
}

pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    // Content directory is created rather than required; a fresh install has
    // no posts yet and listings degrade to empty.
    let content_dir = Path::new(&config.blog.content_directory);
    if !content_dir.exists() {
        info!(
            "Blog content directory does not exist, creating: {:?}",
            content_dir
        );
        if let Err(e) = tokio::fs::create_dir_all(content_dir).await {
            error!("Failed to create content directory: {}", e);
            errors.push(StartupCheckError::ContentDirectoryCreationFailed(e));
        }
    } else {
        info!("Blog content directory exists: {:?}", content_dir);
    }

    for language in &config.blog.languages {
        let partition = content_dir.join(language);
        if !partition.exists() {
            warn!(
                "Language partition '{}' has no content directory: {:?}",
                language, partition
            );
        }
    }

    let templates_dir = Path::new(&config.templates.directory);
    if !templates_dir.exists() {
        error!("Templates directory does not exist: {:?}", templates_dir);
        errors.push(StartupCheckError::TemplatesDirectoryMissing(
            templates_dir.display().to_string(),
        ));
    } else {
        info!("Templates directory exists: {:?}", templates_dir);
    }

    let static_dir = Path::new(&config.static_files.directory);
    if !static_dir.exists() {
        warn!("Static files directory does not exist: {:?}", static_dir);
        errors.push(StartupCheckError::StaticDirectoryMissing);
    } else {
        info!("Static files directory exists: {:?}", static_dir);
    }

    if config.github.owner.is_empty() || config.github.repo.is_empty() {
        warn!("GitHub editor is not configured (owner/repo unset); remote editing is disabled");
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}
