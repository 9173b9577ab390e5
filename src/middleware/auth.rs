use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::auth::hash_token;
use crate::db::{AppState, queries};
use crate::error::{AppError, msg};
use crate::models::User;

/// Authenticated caller, inserted into request extensions by `require_auth`.
///
/// Handlers take this explicitly and call the `require_*` checks for
/// anything beyond read access, so every permission decision is visible at
/// the call site.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
}

impl AuthContext {
    /// Full-access check (user management, client/product writes).
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.user.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(msg::INSUFFICIENT_PERMISSIONS.into()))
        }
    }

    /// Check for editing validity periods (STAC and PROYECTO).
    pub fn require_vigencia_editor(&self) -> Result<(), AppError> {
        if self.user.role.can_edit_vigencias() {
            Ok(())
        } else {
            Err(AppError::Forbidden(msg::INSUFFICIENT_PERMISSIONS.into()))
        }
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let token = extract_bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized(msg::AUTH_REQUIRED.into()))?;
    let conn = state.db.get()?;

    let user = queries::get_session_user(&conn, &hash_token(token), Utc::now().timestamp())?
        .ok_or_else(|| AppError::Unauthorized(msg::AUTH_REQUIRED.into()))?;

    if !user.active {
        return Err(AppError::Forbidden(msg::USER_INACTIVE.into()));
    }

    Ok(user)
}

/// Authenticate the bearer token and insert an `AuthContext` for handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state, request.headers())?;
    request.extensions_mut().insert(AuthContext { user });
    Ok(next.run(request).await)
}
