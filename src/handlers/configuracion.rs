//! Alert-configuration endpoints. STAC-only, like the rest of system
//! administration. The service stores and serves these settings; actual
//! delivery of notifications lives elsewhere.

use axum::extract::{Extension, State};

use crate::db::{AppState, queries};
use crate::error::{OptionExt, Result, msg};
use crate::extractors::Json;
use crate::middleware::AuthContext;
use crate::models::{AlertConfig, PutAlertConfig};
use crate::response::ApiResponse;

pub async fn get_alert_config(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<ApiResponse<AlertConfig>> {
    ctx.require_admin()?;
    let conn = state.db.get()?;
    let config =
        queries::get_alert_config(&conn)?.or_not_found(msg::ALERT_CONFIG_NOT_FOUND)?;
    Ok(ApiResponse::ok(config))
}

pub async fn update_alert_config(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<PutAlertConfig>,
) -> Result<ApiResponse<AlertConfig>> {
    ctx.require_admin()?;
    input.validate()?;

    let conn = state.db.get()?;
    let config = queries::upsert_alert_config(&conn, &input, &ctx.user.id)?;

    tracing::info!(user_id = %ctx.user.id, "alert configuration updated");

    Ok(ApiResponse::new(config, "Alert configuration updated"))
}
