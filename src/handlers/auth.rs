use axum::{
    extract::{Extension, State},
    http::HeaderMap,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::{generate_session_token, hash_token, verify_password};
use crate::db::{AppState, queries};
use crate::error::{AppError, Result, msg};
use crate::extractors::Json;
use crate::middleware::{AuthContext, extract_bearer_token};
use crate::models::User;
use crate::response::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Opaque bearer token. Shown once; only its digest is stored.
    pub token: String,
    pub expires_at: i64,
    pub user: User,
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>> {
    let conn = state.db.get()?;

    let (user, password_hash) = queries::get_user_auth_by_email(&conn, input.email.trim())?
        .ok_or_else(|| AppError::Unauthorized(msg::INVALID_CREDENTIALS.into()))?;

    if !verify_password(&input.password, &password_hash)? {
        return Err(AppError::Unauthorized(msg::INVALID_CREDENTIALS.into()));
    }
    if !user.active {
        return Err(AppError::Forbidden(msg::USER_INACTIVE.into()));
    }

    // Logins are the natural write moment for the sessions table, so stale
    // rows are swept here as well as at startup.
    let purged = queries::purge_expired_sessions(&conn, Utc::now().timestamp())?;
    if purged > 0 {
        tracing::debug!(purged, "removed expired sessions");
    }

    let token = generate_session_token();
    let session = queries::create_session(
        &conn,
        &user.id,
        &hash_token(&token),
        state.session_ttl_secs,
    )?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(ApiResponse::new(
        LoginResponse {
            token,
            expires_at: session.expires_at,
            user,
        },
        "Login successful",
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
) -> Result<ApiResponse<serde_json::Value>> {
    // The middleware already validated the token, so it is present.
    if let Some(token) = extract_bearer_token(&headers) {
        let conn = state.db.get()?;
        queries::delete_session(&conn, &hash_token(token))?;
    }

    tracing::info!(user_id = %ctx.user.id, "user logged out");

    Ok(ApiResponse::new(serde_json::json!({}), "Logged out"))
}

pub async fn me(Extension(ctx): Extension<AuthContext>) -> ApiResponse<User> {
    ApiResponse::ok(ctx.user)
}
