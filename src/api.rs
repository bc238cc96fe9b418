use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Json},
};
use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const ADMIN_COOKIE: &str = "admin_session";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    success: bool,
    message: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    authorized: bool,
}

pub fn create_signed_cookie(secret: &str, value: &str) -> Result<String, String> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| "Invalid secret key")?;
    mac.update(value.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature);
    Ok(format!("{}:{}", value, signature_b64))
}

pub fn verify_signed_cookie(secret: &str, signed_value: &str) -> bool {
    if let Some((value, signature_b64)) = signed_value.split_once(':')
        && let Ok(signature) = general_purpose::URL_SAFE_NO_PAD.decode(signature_b64)
        && let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes())
    {
        mac.update(value.as_bytes());
        return mac.verify_slice(&signature).is_ok();
    }
    false
}

pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get("cookie")?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim().to_string())
        })
}

/// Issues a session value that expires `ttl_seconds` from now. The signed
/// payload is the expiry as a unix timestamp.
pub fn create_admin_session(secret: &str, ttl_seconds: i64) -> Result<String, String> {
    let expires_at = chrono::Utc::now().timestamp() + ttl_seconds;
    create_signed_cookie(secret, &expires_at.to_string())
}

fn session_is_valid(secret: &str, signed_value: &str) -> bool {
    if !verify_signed_cookie(secret, signed_value) {
        return false;
    }
    signed_value
        .split_once(':')
        .and_then(|(expires_at, _)| expires_at.parse::<i64>().ok())
        .is_some_and(|expires_at| expires_at > chrono::Utc::now().timestamp())
}

pub fn is_admin(headers: &HeaderMap, secret: &str) -> bool {
    get_cookie_value(headers, ADMIN_COOKIE)
        .map(|signed_value| session_is_valid(secret, &signed_value))
        .unwrap_or(false)
}

fn session_cookie(value: &str, max_age: i64) -> Result<HeaderValue, StatusCode> {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        ADMIN_COOKIE, value, max_age
    )
    .parse()
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// POST /api/login
pub async fn login_handler(
    State(app_state): State<crate::AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let app_config = &app_state.config.app;
    tracing::info!("Admin login attempt for '{}'", payload.username);

    if payload.username != app_config.admin_username
        || payload.password != app_config.admin_password
    {
        tracing::warn!("Admin login failed - invalid credentials");
        let response = LoginResponse {
            success: false,
            message: "Invalid credentials".to_string(),
        };
        return Ok((StatusCode::UNAUTHORIZED, HeaderMap::new(), Json(response)));
    }

    let ttl_seconds = i64::try_from(app_config.session_ttl_hours.saturating_mul(3600))
        .unwrap_or(i64::MAX / 2);
    let signed_value =
        create_admin_session(&app_config.session_secret, ttl_seconds).map_err(|e| {
            tracing::error!("Failed to sign admin session: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, session_cookie(&signed_value, ttl_seconds)?);

    tracing::info!("Admin login successful");
    let response = LoginResponse {
        success: true,
        message: "Login successful".to_string(),
    };
    Ok((StatusCode::OK, headers, Json(response)))
}

/// POST /api/logout
pub async fn logout_handler() -> Result<impl IntoResponse, StatusCode> {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, session_cookie("", 0)?);

    let response = LoginResponse {
        success: true,
        message: "Logged out".to_string(),
    };
    Ok((headers, Json(response)))
}

/// GET /api/verify
pub async fn verify_handler(
    State(app_state): State<crate::AppState>,
    headers: HeaderMap,
) -> Json<VerifyResponse> {
    let authorized = is_admin(&headers, &app_state.config.app.session_secret);
    Json(VerifyResponse { authorized })
}
