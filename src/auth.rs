use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

pub const AUTH_COOKIE_NAME: &str = "token";
pub const TOKEN_TTL_DAYS: i64 = 30;
pub const MIN_SECRET_LENGTH: usize = 32;

const DEV_SECRET: &str = "dev-secret-key-change-in-production";

type HmacSha256 = Hmac<Sha256>;

/// Identity carried by a verified token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub username: String,
    pub is_guest: bool,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("password hashing failed")]
    Hash,
}

fn secret() -> String {
    std::env::var("JWT_SECRET")
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEV_SECRET.to_string())
}

pub fn is_strong_enough_secret(value: &str) -> bool {
    value.len() >= MIN_SECRET_LENGTH
}

pub fn sign_token(user_id: &str, username: &str, is_guest: bool) -> Result<String, AuthError> {
    let issued_at = Utc::now();
    let expires_at = issued_at + Duration::days(TOKEN_TTL_DAYS);

    let claims = Claims {
        user_id: user_id.to_string(),
        username: username.to_string(),
        is_guest,
        iat: issued_at.timestamp(),
        exp: expires_at.timestamp(),
    };

    let header_json = serde_json::json!({
        "alg": "HS256",
        "typ": "JWT",
    });

    let header_b64 = URL_SAFE_NO_PAD
        .encode(serde_json::to_vec(&header_json).map_err(|_| AuthError::InvalidToken)?);
    let payload_b64 =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).map_err(|_| AuthError::InvalidToken)?);
    let signing_input = format!("{header_b64}.{payload_b64}");

    let mut mac =
        HmacSha256::new_from_slice(secret().as_bytes()).map_err(|_| AuthError::InvalidToken)?;
    mac.update(signing_input.as_bytes());
    let sig_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{sig_b64}"))
}

pub fn verify_token(token: &str) -> Result<Claims, AuthError> {
    let mut parts = token.split('.');
    let header_b64 = parts.next().ok_or(AuthError::InvalidToken)?;
    let payload_b64 = parts.next().ok_or(AuthError::InvalidToken)?;
    let sig_b64 = parts.next().ok_or(AuthError::InvalidToken)?;
    if parts.next().is_some() {
        return Err(AuthError::InvalidToken);
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64.as_bytes())
        .map_err(|_| AuthError::InvalidToken)?;
    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64.as_bytes())
        .map_err(|_| AuthError::InvalidToken)?;
    let sig_bytes = URL_SAFE_NO_PAD
        .decode(sig_b64.as_bytes())
        .map_err(|_| AuthError::InvalidToken)?;

    let header_json: serde_json::Value =
        serde_json::from_slice(&header_bytes).map_err(|_| AuthError::InvalidToken)?;
    if header_json.get("alg").and_then(|value| value.as_str()) != Some("HS256") {
        return Err(AuthError::InvalidToken);
    }

    let mut mac =
        HmacSha256::new_from_slice(secret().as_bytes()).map_err(|_| AuthError::InvalidToken)?;
    mac.update(format!("{header_b64}.{payload_b64}").as_bytes());
    mac.verify_slice(&sig_bytes)
        .map_err(|_| AuthError::InvalidToken)?;

    let claims: Claims =
        serde_json::from_slice(&payload_bytes).map_err(|_| AuthError::InvalidToken)?;

    if Utc::now().timestamp() >= claims.exp {
        return Err(AuthError::InvalidToken);
    }

    Ok(claims)
}

pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = get_cookie(headers, AUTH_COOKIE_NAME) {
        return Some(token);
    }

    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;

    auth_header
        .strip_prefix("Bearer ")
        .map(|value| value.to_string())
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|_| AuthError::Hash)
}

pub fn check_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

pub fn validate_username(username: &str) -> Result<(), String> {
    let valid_chars = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if username.len() < 3 || username.len() > 30 || !valid_chars {
        return Err(
            "username must be 3-30 characters and contain only letters, numbers, _ or -"
                .to_string(),
        );
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("password must be at least 8 characters".to_string());
    }
    Ok(())
}

fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in raw.split(';') {
        let trimmed = part.trim();
        let (key, value) = trimmed.split_once('=')?;
        if key == name {
            return Some(value.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify_roundtrip() {
        let token = sign_token("user-1", "alice", false).unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.username, "alice");
        assert!(!claims.is_guest);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = sign_token("user-1", "alice", false).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(verify_token(&tampered).is_err());
    }

    #[test]
    fn test_extract_token_prefers_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "other=1; token=abc".parse().expect("header value"),
        );
        headers.insert(
            header::AUTHORIZATION,
            "Bearer xyz".parse().expect("header value"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("bad name").is_err());
    }
}
