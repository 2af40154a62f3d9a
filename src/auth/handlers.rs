use super::{Authenticator, SESSION_COOKIE, SessionAuthenticator, TokenAuthenticator, get_cookie_value};
use crate::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    success: bool,
    message: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    authorized: bool,
}

pub async fn login_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Response {
    info!("Login attempt received");
    let config = &app_state.config.app;

    let authenticator = TokenAuthenticator::new(&config.admin_password);
    if !authenticator.authenticate(&payload.password) {
        warn!("Login failed - invalid password");
        return (
            StatusCode::UNAUTHORIZED,
            Json(AuthResponse {
                success: false,
                message: "Invalid password".to_string(),
            }),
        )
            .into_response();
    }

    let sessions = SessionAuthenticator::new(&config.session_secret);
    match sessions.issue_session() {
        Ok(signed_value) => {
            info!("Login successful");
            let cookie = format!(
                "{}={}; Path=/; Max-Age=86400; HttpOnly; SameSite=Lax",
                SESSION_COOKIE, signed_value
            );

            let mut headers = HeaderMap::new();
            headers.insert(SET_COOKIE, cookie.parse().unwrap());

            (
                headers,
                Json(AuthResponse {
                    success: true,
                    message: "Login successful".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn verify_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Json<VerifyResponse> {
    let sessions = SessionAuthenticator::new(&app_state.config.app.session_secret);
    let authorized = get_cookie_value(&headers, SESSION_COOKIE)
        .map(|signed_value| sessions.authenticate(&signed_value))
        .unwrap_or(false);

    Json(VerifyResponse { authorized })
}

pub async fn logout_handler() -> Response {
    let cookie = format!(
        "{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax",
        SESSION_COOKIE
    );
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie.parse().unwrap());

    (
        headers,
        Json(AuthResponse {
            success: true,
            message: "Logged out".to_string(),
        }),
    )
        .into_response()
}
