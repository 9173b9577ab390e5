//! User management. Every operation here is STAC-only.

use axum::extract::{Extension, State};

use crate::auth::hash_password;
use crate::db::{AppState, queries};
use crate::error::{AppError, OptionExt, Result, msg};
use crate::extractors::{Json, Path};
use crate::middleware::AuthContext;
use crate::models::{CreateUser, UpdateUser, User};
use crate::response::ApiResponse;

pub async fn list_users(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<ApiResponse<Vec<User>>> {
    ctx.require_admin()?;
    let conn = state.db.get()?;
    Ok(ApiResponse::ok(queries::list_users(&conn)?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<ApiResponse<User>> {
    ctx.require_admin()?;
    let conn = state.db.get()?;
    let user = queries::get_user_by_id(&conn, &id)?.or_not_found(msg::USER_NOT_FOUND)?;
    Ok(ApiResponse::ok(user))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<CreateUser>,
) -> Result<ApiResponse<User>> {
    ctx.require_admin()?;
    input.validate()?;

    let conn = state.db.get()?;
    if queries::get_user_by_email(&conn, input.email.trim())?.is_some() {
        return Err(AppError::Conflict(msg::EMAIL_TAKEN.into()));
    }

    let password_hash = hash_password(&input.password)?;
    let user = queries::create_user(&conn, &input, &password_hash)?;

    tracing::info!(user_id = %user.id, role = %user.role, "user created");

    Ok(ApiResponse::new(user, "User created"))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(input): Json<UpdateUser>,
) -> Result<ApiResponse<User>> {
    ctx.require_admin()?;
    if input.is_empty() {
        return Err(AppError::BadRequest(msg::NO_FIELDS_TO_UPDATE.into()));
    }
    input.validate()?;

    let conn = state.db.get()?;
    let existing = queries::get_user_by_id(&conn, &id)?.or_not_found(msg::USER_NOT_FOUND)?;

    if let Some(ref email) = input.email {
        if let Some(holder) = queries::get_user_by_email(&conn, email.trim())? {
            if holder.id != existing.id {
                return Err(AppError::Conflict(msg::EMAIL_TAKEN.into()));
            }
        }
    }

    let password_hash = match input.password {
        Some(ref password) => Some(hash_password(password)?),
        None => None,
    };

    let user = queries::update_user(&conn, &id, &input, password_hash)?
        .or_not_found(msg::USER_NOT_FOUND)?;
    Ok(ApiResponse::new(user, "User updated"))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>> {
    ctx.require_admin()?;
    if id == ctx.user.id {
        return Err(AppError::BadRequest(msg::CANNOT_DELETE_SELF.into()));
    }

    let conn = state.db.get()?;
    if !queries::delete_user(&conn, &id)? {
        return Err(AppError::NotFound(msg::USER_NOT_FOUND.into()));
    }

    tracing::info!(user_id = %id, deleted_by = %ctx.user.id, "user deleted");

    Ok(ApiResponse::new(serde_json::json!({}), "User deleted"))
}

/// Flip a user's active flag. Deactivated users keep their sessions in the
/// table but the auth middleware rejects them.
pub async fn toggle_active(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<ApiResponse<User>> {
    ctx.require_admin()?;
    let conn = state.db.get()?;
    let user = queries::toggle_user_active(&conn, &id)?.or_not_found(msg::USER_NOT_FOUND)?;
    Ok(ApiResponse::new(user, "User updated"))
}
