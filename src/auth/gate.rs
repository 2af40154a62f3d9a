//! The admin gate, in two shapes: browser requests carry an HMAC-signed
//! session cookie with an embedded expiry, API clients present the shared
//! admin password as a bearer credential.

use super::error::AuthError;
use axum::http::HeaderMap;
use base64::{Engine, engine::general_purpose};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "admin_session";

const SESSION_TTL_SECONDS: i64 = 86_400;

pub trait Authenticator {
    fn authenticate(&self, credential: &str) -> bool;
}

/// Compares a presented bearer credential against the configured admin
/// password. Both sides are hashed so the comparison never touches the
/// plaintext password.
pub struct TokenAuthenticator {
    password_digest: [u8; 32],
}

impl TokenAuthenticator {
    pub fn new(password: &str) -> Self {
        Self {
            password_digest: Sha256::digest(password.as_bytes()).into(),
        }
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(&self, credential: &str) -> bool {
        let presented: [u8; 32] = Sha256::digest(credential.as_bytes()).into();
        presented == self.password_digest
    }
}

/// Verifies the signed session value stored in the browser cookie. The value
/// is the session's expiry timestamp, signed with the server secret.
pub struct SessionAuthenticator {
    secret: String,
}

impl SessionAuthenticator {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
        }
    }

    /// Issues a signed session value valid for 24 hours.
    pub fn issue_session(&self) -> Result<String, AuthError> {
        let expires_at = Utc::now().timestamp() + SESSION_TTL_SECONDS;
        sign_value(&self.secret, &expires_at.to_string())
    }
}

impl Authenticator for SessionAuthenticator {
    fn authenticate(&self, credential: &str) -> bool {
        if !verify_signed_value(&self.secret, credential) {
            return false;
        }
        let Some((expires_at, _)) = credential.split_once(':') else {
            return false;
        };
        expires_at
            .parse::<i64>()
            .map(|t| t > Utc::now().timestamp())
            .unwrap_or(false)
    }
}

pub fn sign_value(secret: &str, value: &str) -> Result<String, AuthError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| AuthError::InvalidSecret)?;
    mac.update(value.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature);
    Ok(format!("{}:{}", value, signature_b64))
}

pub fn verify_signed_value(secret: &str, signed_value: &str) -> bool {
    if let Some((value, signature_b64)) = signed_value.split_once(':')
        && let Ok(signature) = general_purpose::URL_SAFE_NO_PAD.decode(signature_b64)
        && let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes())
    {
        mac.update(value.as_bytes());
        return mac.verify_slice(&signature).is_ok();
    }
    false
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get("cookie")?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|cookie| {
            let cookie = cookie.trim();
            let (key, value) = cookie.split_once('=')?;
            if key.trim() == name {
                Some(value.trim().to_string())
            } else {
                None
            }
        })
}
