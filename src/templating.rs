use crate::AppState;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse},
};
use std::{collections::HashMap, path::PathBuf, sync::Arc, time::SystemTime};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Liquid template engine with an mtime-based cache. Every page is rendered
/// with `_header.html.liquid` and `_footer.html.liquid` available as
/// `header`/`footer` globals.
pub struct TemplateEngine {
    template_dir: PathBuf,
    cache: Arc<RwLock<HashMap<String, CachedTemplate>>>,
}

struct CachedTemplate {
    content: String,
    modified: SystemTime,
}

impl TemplateEngine {
    pub fn new(template_dir: PathBuf) -> Self {
        Self {
            template_dir,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn load_template(&self, path: &str) -> Result<String, String> {
        let template_path = self.template_dir.join(path);

        let metadata = tokio::fs::metadata(&template_path)
            .await
            .map_err(|e| format!("Failed to get metadata for {}: {}", path, e))?;

        let modified = metadata
            .modified()
            .map_err(|e| format!("Failed to get modified time: {}", e))?;

        let mut cache = self.cache.write().await;

        if let Some(cached) = cache.get(path)
            && cached.modified >= modified
        {
            debug!("Using cached template for {}", path);
            return Ok(cached.content.clone());
        }

        info!("Loading template: {}", path);

        let content = tokio::fs::read_to_string(&template_path)
            .await
            .map_err(|e| format!("Failed to read template {}: {}", path, e))?;

        cache.insert(
            path.to_string(),
            CachedTemplate {
                content: content.clone(),
                modified,
            },
        );

        Ok(content)
    }

    pub async fn render_template(
        &self,
        template_name: &str,
        globals: liquid::Object,
    ) -> Result<String, String> {
        let header_content = self
            .load_template("_header.html.liquid")
            .await
            .unwrap_or_else(|e| {
                error!("Failed to load header: {}", e);
                String::new()
            });

        let footer_content = self
            .load_template("_footer.html.liquid")
            .await
            .unwrap_or_else(|e| {
                error!("Failed to load footer: {}", e);
                String::new()
            });

        let template_content = self.load_template(template_name).await?;

        let parser = liquid::ParserBuilder::with_stdlib()
            .build()
            .map_err(|e| format!("Failed to create parser: {}", e))?;

        let template = parser
            .parse(&template_content)
            .map_err(|e| format!("Failed to parse template: {}", e))?;

        let mut full_globals = globals;
        full_globals.insert(
            "header".into(),
            liquid::model::Value::Scalar(header_content.into()),
        );
        full_globals.insert(
            "footer".into(),
            liquid::model::Value::Scalar(footer_content.into()),
        );

        template
            .render(&full_globals)
            .map_err(|e| format!("Failed to render template: {}", e))
    }

    /// Renders a plain site page ("/about" -> "about.html.liquid"). A page
    /// with no template file is a 404; a template that fails to render is a
    /// 500.
    pub async fn render(&self, path: &str) -> Result<Html<String>, StatusCode> {
        let template_path = if path.is_empty() || path == "/" {
            "index.html.liquid".to_string()
        } else {
            format!("{}.html.liquid", path.trim_start_matches('/'))
        };

        if tokio::fs::metadata(self.template_dir.join(&template_path))
            .await
            .is_err()
        {
            debug!("No template for page: {}", template_path);
            return Err(StatusCode::NOT_FOUND);
        }

        match self
            .render_template(&template_path, liquid::object!({}))
            .await
        {
            Ok(html) => Ok(Html(html)),
            Err(e) => {
                error!("Template rendering error: {}", e);
                Err(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// Serves site pages; also installed as the router fallback, so the path
/// comes from the request URI rather than a matched route parameter.
pub async fn page_handler(State(app_state): State<AppState>, uri: Uri) -> impl IntoResponse {
    app_state.template_engine.render(uri.path()).await
}
