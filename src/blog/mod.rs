pub mod error;
pub mod frontmatter;
pub mod handlers;
pub mod markdown;
pub mod repository;
pub mod types;

pub use error::BlogError;
pub use repository::BlogRepository;
pub use types::{BlogConfig, Post, PostMetadata, SlugPolicy};

mod tests;
