use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod auth;
pub mod blog;
pub mod github;
pub mod startup_checks;
pub mod static_files;
pub mod templating;

pub use blog::{BlogConfig, SlugPolicy};
pub use github::GithubConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub templates: TemplateConfig,
    pub static_files: StaticConfig,
    #[serde(default)]
    pub blog: BlogConfig,
    #[serde(default)]
    pub github: GithubConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
    /// Shared passphrase for the admin editing surface.
    pub admin_password: String,
    /// Secret used to sign admin session cookies.
    pub session_secret: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplateConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticConfig {
    pub directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            app: AppConfig {
                name: "Nikki".to_string(),
                log_level: "info".to_string(),
                admin_password: "change-me-in-production".to_string(),
                session_secret: "change-me-in-production".to_string(),
            },
            templates: TemplateConfig {
                directory: PathBuf::from("templates"),
            },
            static_files: StaticConfig {
                directory: PathBuf::from("static"),
            },
            blog: BlogConfig::default(),
            github: GithubConfig::default(),
        }
    }
}

use axum::{
    Router,
    extract::{Path, State},
    response::IntoResponse,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub template_engine: Arc<templating::TemplateEngine>,
    pub static_handler: static_files::StaticFileHandler,
    pub blog: Arc<blog::BlogRepository>,
    pub github: Arc<github::GithubClient>,
    pub config: Config,
}

async fn static_file_handler(
    State(app_state): State<AppState>,
    Path(path): Path<String>,
) -> impl IntoResponse {
    app_state.static_handler.serve(&path).await
}

pub async fn create_app(config: Config) -> Router {
    let template_engine = Arc::new(templating::TemplateEngine::new(
        config.templates.directory.clone(),
    ));

    let static_handler =
        static_files::StaticFileHandler::new(config.static_files.directory.clone());

    let blog = Arc::new(blog::BlogRepository::new(config.blog.clone()));
    let github = Arc::new(github::GithubClient::new(config.github.clone()));

    let app_state = AppState {
        template_engine,
        static_handler,
        blog,
        github,
        config: config.clone(),
    };

    Router::new()
        .route("/", axum::routing::get(templating::page_handler))
        .route(
            "/blog",
            axum::routing::get(blog::handlers::blog_index_handler),
        )
        .route(
            "/blog/{slug}",
            axum::routing::get(blog::handlers::post_detail_handler),
        )
        .route(
            "/{lang}/blog",
            axum::routing::get(blog::handlers::localized_blog_index_handler),
        )
        .route(
            "/{lang}/blog/{slug}",
            axum::routing::get(blog::handlers::localized_post_detail_handler),
        )
        .route(
            "/api/posts",
            axum::routing::get(blog::handlers::list_posts_handler)
                .post(blog::handlers::create_post_handler),
        )
        .route(
            "/api/posts/{slug}",
            axum::routing::put(blog::handlers::update_post_handler),
        )
        .route(
            "/api/auth/login",
            axum::routing::post(auth::handlers::login_handler),
        )
        .route(
            "/api/auth/verify",
            axum::routing::get(auth::handlers::verify_handler),
        )
        .route(
            "/api/auth/logout",
            axum::routing::post(auth::handlers::logout_handler),
        )
        .route(
            "/api/github/posts/{slug}",
            axum::routing::get(github::handlers::fetch_remote_post_handler)
                .put(github::handlers::save_remote_post_handler),
        )
        .route(
            "/api/github/deployment-status",
            axum::routing::get(github::handlers::deployment_status_handler),
        )
        .route("/static/{*path}", axum::routing::get(static_file_handler))
        .fallback(templating::page_handler)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let method = request.method();
                    let uri = request.uri();
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::info_span!(
                        "http_request",
                        method = %method,
                        uri = %uri,
                        matched_path,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            target: "access_log",
                            status = %response.status(),
                            latency_ms = %latency.as_millis(),
                            "response"
                        );
                    },
                ),
        )
        .with_state(app_state)
}
