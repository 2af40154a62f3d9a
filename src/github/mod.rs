pub mod client;
pub mod error;
pub mod handlers;
pub mod types;

pub use client::GithubClient;
pub use error::GithubError;
pub use types::{DeploymentStatus, GithubConfig, RemotePost, WorkflowRun};
