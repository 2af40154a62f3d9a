use super::{error::BlogError, frontmatter, markdown, types::*};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// CRUD over the on-disk content store. One Markdown file per slug, optionally
/// partitioned into a language subdirectory.
pub struct BlogRepository {
    config: BlogConfig,
}

impl BlogRepository {
    pub fn new(config: BlogConfig) -> Self {
        Self { config }
    }

    pub fn get_config(&self) -> &BlogConfig {
        &self.config
    }

    fn partition_directory(&self, language: Option<&str>) -> PathBuf {
        match language {
            Some(lang) => self.config.content_directory.join(lang),
            None => self.config.content_directory.clone(),
        }
    }

    fn post_path(&self, slug: &str, language: Option<&str>) -> PathBuf {
        self.partition_directory(language).join(format!("{slug}.md"))
    }

    /// Published posts in the partition, newest first. A missing partition
    /// directory is an empty listing, and a file that fails to read or parse
    /// is logged and skipped rather than failing the whole scan.
    pub async fn list(&self, language: Option<&str>) -> Vec<Post> {
        let dir = self.partition_directory(language);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(_) => {
                debug!("Partition directory {:?} does not exist", dir);
                return Vec::new();
            }
        };

        let mut posts = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "md") {
                continue;
            }
            match self.load_post(&path).await {
                Ok(post) => {
                    debug!("Loaded post: {}", post.slug);
                    posts.push(post);
                }
                Err(e) => {
                    error!("Failed to load post {:?}: {}", path, e);
                }
            }
        }

        posts.retain(|post| post.published);
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        posts
    }

    /// Unlike `list`, drafts are returned here so they stay editable.
    pub async fn get_by_slug(
        &self,
        slug: &str,
        language: Option<&str>,
    ) -> Result<Option<Post>, BlogError> {
        let path = self.post_path(slug, language);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }
        Ok(Some(self.load_post(&path).await?))
    }

    /// Writes a new post file, creating the partition directory if needed.
    /// Returns the slug actually used, which can differ from the requested
    /// one under `SlugPolicy::Suffix`.
    pub async fn create(
        &self,
        slug: &str,
        metadata: &PostMetadata,
        body: &str,
        language: Option<&str>,
    ) -> Result<String, BlogError> {
        let dir = self.partition_directory(language);
        tokio::fs::create_dir_all(&dir).await?;

        let slug = self.resolve_slug(slug, language).await?;
        let path = self.post_path(&slug, language);
        tokio::fs::write(&path, frontmatter::encode(metadata, body)).await?;
        info!("Created post {:?}", path);
        Ok(slug)
    }

    /// Read-modify-write: the stored creation date always wins over whatever
    /// the caller put in `metadata.date`, and `updated_date` is stamped to the
    /// current date. Not transactional; a concurrent writer between the read
    /// and the write is last-writer-wins.
    pub async fn update(
        &self,
        slug: &str,
        metadata: &PostMetadata,
        body: &str,
        language: Option<&str>,
    ) -> Result<(), BlogError> {
        let existing = self
            .get_by_slug(slug, language)
            .await?
            .ok_or_else(|| BlogError::PostNotFound(slug.to_string()))?;

        let metadata = PostMetadata {
            date: existing.date,
            updated_date: Some(Utc::now().date_naive()),
            ..metadata.clone()
        };

        let path = self.post_path(slug, language);
        tokio::fs::write(&path, frontmatter::encode(&metadata, body)).await?;
        info!("Updated post {:?}", path);
        Ok(())
    }

    async fn resolve_slug(
        &self,
        slug: &str,
        language: Option<&str>,
    ) -> Result<String, BlogError> {
        let exists = tokio::fs::try_exists(self.post_path(slug, language))
            .await
            .unwrap_or(false);

        match self.config.slug_policy {
            SlugPolicy::Overwrite => Ok(slug.to_string()),
            SlugPolicy::Reject if exists => Err(BlogError::SlugTaken(slug.to_string())),
            SlugPolicy::Reject => Ok(slug.to_string()),
            SlugPolicy::Suffix => {
                if !exists {
                    return Ok(slug.to_string());
                }
                let mut n = 2;
                loop {
                    let candidate = format!("{slug}-{n}");
                    let taken = tokio::fs::try_exists(self.post_path(&candidate, language))
                        .await
                        .unwrap_or(false);
                    if !taken {
                        return Ok(candidate);
                    }
                    n += 1;
                }
            }
        }
    }

    async fn load_post(&self, path: &Path) -> Result<Post, BlogError> {
        let text = tokio::fs::read_to_string(path).await?;
        let (metadata, body) = frontmatter::decode(&text)?;

        let slug = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| BlogError::InvalidFormat(format!("invalid file name: {:?}", path)))?
            .to_string();

        let html_content = markdown::render(&body);

        Ok(Post {
            slug,
            path: path.to_path_buf(),
            title: metadata.title,
            date: metadata.date,
            updated_date: metadata.updated_date,
            excerpt: metadata.excerpt,
            content: body,
            html_content,
            tags: metadata.tags,
            published: metadata.published,
        })
    }

    /// Slug derivation used at creation time: lowercase, strip everything but
    /// alphanumerics, whitespace and hyphens, then join words with hyphens.
    pub fn slug_from_title(title: &str) -> String {
        title
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }
}
