use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub slug: String,
    pub path: PathBuf,
    pub title: String,
    pub date: NaiveDate,
    pub updated_date: Option<NaiveDate>,
    pub excerpt: String,
    pub content: String,
    pub html_content: String,
    pub tags: Vec<String>,
    pub published: bool,
}

impl Post {
    /// Whether the "updated on" line should appear under the post. A same-day
    /// edit sets `updated_date` but shows nothing.
    pub fn was_updated(&self) -> bool {
        self.updated_date.is_some_and(|updated| updated != self.date)
    }

    pub fn metadata(&self) -> PostMetadata {
        PostMetadata {
            title: self.title.clone(),
            date: self.date,
            updated_date: self.updated_date,
            excerpt: self.excerpt.clone(),
            tags: self.tags.clone(),
            published: self.published,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetadata {
    pub title: String,
    pub date: NaiveDate,
    pub updated_date: Option<NaiveDate>,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub published: bool,
}

/// What `create` does when a file for the slug already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugPolicy {
    /// Replace the existing file silently.
    #[default]
    Overwrite,
    /// Fail with `BlogError::SlugTaken`.
    Reject,
    /// Append `-2`, `-3`, ... until a free slug is found.
    Suffix,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    pub content_directory: PathBuf,
    pub url_prefix: String,
    pub index_template: String,
    pub post_template: String,
    /// Additional language partitions, each a subdirectory of the content
    /// directory (e.g. `["pt"]`). The default partition is the root.
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub slug_policy: SlugPolicy,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            content_directory: PathBuf::from("content/blog"),
            url_prefix: String::from("/blog"),
            index_template: String::from("blog_index.html.liquid"),
            post_template: String::from("blog_post.html.liquid"),
            languages: Vec::new(),
            slug_policy: SlugPolicy::Overwrite,
        }
    }
}
