use super::{BlogError, BlogRepository, PostMetadata};
use crate::{
    AppState,
    auth::{Authenticator, TokenAuthenticator, bearer_token},
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

#[derive(Deserialize)]
pub struct LanguageQuery {
    language: Option<String>,
}

pub async fn blog_index_handler(State(app_state): State<AppState>) -> Response {
    render_index(&app_state, None).await
}

pub async fn localized_blog_index_handler(
    State(app_state): State<AppState>,
    Path(lang): Path<String>,
) -> Response {
    let Some(lang) = known_language(&app_state, &lang) else {
        return (StatusCode::NOT_FOUND, "Page not found").into_response();
    };
    render_index(&app_state, Some(&lang)).await
}

pub async fn post_detail_handler(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    render_detail(&app_state, &slug, None).await
}

pub async fn localized_post_detail_handler(
    State(app_state): State<AppState>,
    Path((lang, slug)): Path<(String, String)>,
) -> Response {
    let Some(lang) = known_language(&app_state, &lang) else {
        return (StatusCode::NOT_FOUND, "Page not found").into_response();
    };
    render_detail(&app_state, &slug, Some(&lang)).await
}

fn known_language(app_state: &AppState, lang: &str) -> Option<String> {
    app_state
        .blog
        .get_config()
        .languages
        .iter()
        .find(|known| known.as_str() == lang)
        .cloned()
}

async fn render_index(app_state: &AppState, language: Option<&str>) -> Response {
    let posts_raw = app_state.blog.list(language).await;
    let config = app_state.blog.get_config();

    let url_prefix = match language {
        Some(lang) => format!("/{}{}", lang, config.url_prefix),
        None => config.url_prefix.clone(),
    };

    let posts: Vec<_> = posts_raw
        .iter()
        .map(|post| {
            liquid::object!({
                "slug": post.slug,
                "title": post.title,
                "excerpt": post.excerpt,
                "tags": post.tags,
                "url": format!("{}/{}", url_prefix, post.slug),
                "date": post.date.format("%Y-%m-%d").to_string(),
                "date_formatted": post.date.format("%B %-d, %Y").to_string(),
            })
        })
        .collect();

    let globals = liquid::object!({
        "posts": posts,
        "url_prefix": url_prefix,
        "language": language.unwrap_or(""),
        "page_title": "Blog",
        "meta_description": "Blog posts",
    });

    match app_state
        .template_engine
        .render_template(&config.index_template, globals)
        .await
    {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template rendering error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

async fn render_detail(app_state: &AppState, slug: &str, language: Option<&str>) -> Response {
    let post = match app_state.blog.get_by_slug(slug, language).await {
        Ok(Some(post)) => post,
        Ok(None) => {
            return (StatusCode::NOT_FOUND, "Post not found").into_response();
        }
        Err(e) => {
            error!("Failed to load post {}: {}", slug, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load post").into_response();
        }
    };

    let config = app_state.blog.get_config();

    let updated_formatted = post
        .updated_date
        .map(|date| date.format("%B %-d, %Y").to_string())
        .unwrap_or_default();

    let globals = liquid::object!({
        "post": {
            "slug": post.slug,
            "title": post.title,
            "excerpt": post.excerpt,
            "tags": post.tags,
            "date": post.date.format("%Y-%m-%d").to_string(),
            "date_formatted": post.date.format("%B %-d, %Y").to_string(),
            "updated_date_formatted": updated_formatted,
            "was_updated": post.was_updated(),
            "content": post.content,
            "html_content": post.html_content,
        },
        "language": language.unwrap_or(""),
        "page_title": post.title,
        "meta_description": post.excerpt,
    });

    match app_state
        .template_engine
        .render_template(&config.post_template, globals)
        .await
    {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template rendering error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

#[derive(Serialize)]
pub struct PostListEntry {
    slug: String,
    title: String,
    date: String,
    updated_date: Option<String>,
    excerpt: String,
    tags: Vec<String>,
}

pub async fn list_posts_handler(
    State(app_state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> Json<Vec<PostListEntry>> {
    let posts = app_state.blog.list(query.language.as_deref()).await;
    let entries = posts
        .into_iter()
        .map(|post| PostListEntry {
            slug: post.slug,
            title: post.title,
            date: post.date.format("%Y-%m-%d").to_string(),
            updated_date: post
                .updated_date
                .map(|date| date.format("%Y-%m-%d").to_string()),
            excerpt: post.excerpt,
            tags: post.tags,
        })
        .collect();
    Json(entries)
}

#[derive(Deserialize)]
pub struct PostPayload {
    title: Option<String>,
    excerpt: Option<String>,
    content: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    published: Option<bool>,
    language: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct SlugResponse {
    success: bool,
    slug: String,
}

fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

fn check_bearer(app_state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let authenticator = TokenAuthenticator::new(&app_state.config.app.admin_password);
    match bearer_token(headers) {
        Some(token) if authenticator.authenticate(&token) => Ok(()),
        Some(_) => {
            warn!("Admin API request with invalid credential");
            Err(json_error(StatusCode::UNAUTHORIZED, "Unauthorized"))
        }
        None => Err(json_error(StatusCode::UNAUTHORIZED, "Unauthorized")),
    }
}

/// Pulls the required fields out of the payload, or a 400 naming what is
/// missing.
fn validate_payload(payload: &PostPayload) -> Result<(String, String, String), Response> {
    let mut missing = Vec::new();
    if payload.title.as_deref().is_none_or(str::is_empty) {
        missing.push("title");
    }
    if payload.excerpt.as_deref().is_none_or(str::is_empty) {
        missing.push("excerpt");
    }
    if payload.content.as_deref().is_none_or(str::is_empty) {
        missing.push("content");
    }
    if !missing.is_empty() {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            format!("Missing required fields: {}", missing.join(", ")),
        ));
    }
    Ok((
        payload.title.clone().unwrap_or_default(),
        payload.excerpt.clone().unwrap_or_default(),
        payload.content.clone().unwrap_or_default(),
    ))
}

pub async fn create_post_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PostPayload>,
) -> Response {
    if let Err(response) = check_bearer(&app_state, &headers) {
        return response;
    }

    let (title, excerpt, content) = match validate_payload(&payload) {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    let slug = BlogRepository::slug_from_title(&title);
    if slug.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "Title produces an empty slug");
    }

    let metadata = PostMetadata {
        title,
        date: Utc::now().date_naive(),
        updated_date: None,
        excerpt,
        tags: payload.tags.clone(),
        published: payload.published.unwrap_or(true),
    };

    match app_state
        .blog
        .create(&slug, &metadata, &content, payload.language.as_deref())
        .await
    {
        Ok(slug) => (
            StatusCode::CREATED,
            Json(SlugResponse {
                success: true,
                slug,
            }),
        )
            .into_response(),
        Err(BlogError::SlugTaken(slug)) => json_error(
            StatusCode::CONFLICT,
            format!("A post with slug '{}' already exists", slug),
        ),
        Err(e) => {
            error!("Failed to create post: {}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create post")
        }
    }
}

pub async fn update_post_handler(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<PostPayload>,
) -> Response {
    if let Err(response) = check_bearer(&app_state, &headers) {
        return response;
    }

    let (title, excerpt, content) = match validate_payload(&payload) {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    // The repository re-reads the stored post and keeps its creation date, so
    // the date passed here is a placeholder.
    let metadata = PostMetadata {
        title,
        date: Utc::now().date_naive(),
        updated_date: None,
        excerpt,
        tags: payload.tags.clone(),
        published: payload.published.unwrap_or(true),
    };

    match app_state
        .blog
        .update(&slug, &metadata, &content, payload.language.as_deref())
        .await
    {
        Ok(()) => Json(SlugResponse {
            success: true,
            slug,
        })
        .into_response(),
        Err(BlogError::PostNotFound(slug)) => {
            json_error(StatusCode::NOT_FOUND, format!("Post not found: {}", slug))
        }
        Err(e) => {
            error!("Failed to update post {}: {}", slug, e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update post")
        }
    }
}
