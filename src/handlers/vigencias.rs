//! Validity-period endpoints.
//!
//! List and detail responses are annotated with the traffic-light
//! classification computed at request time; the color is never stored.

use axum::extract::{Extension, State};
use chrono::Utc;
use serde::Deserialize;

use crate::db::queries::VigenciaFilter;
use crate::db::{AppState, queries};
use crate::error::{AppError, OptionExt, Result, msg};
use crate::extractors::{Json, Path, Query};
use crate::middleware::AuthContext;
use crate::models::{
    ClassifiedVigencia, CreateVigencia, UpdateVigencia, Vigencia, VigenciaStatus,
};
use crate::pagination::{Page, PageParams};
use crate::response::ApiResponse;

#[derive(Debug, Default, Deserialize)]
pub struct VigenciaListQuery {
    pub status: Option<VigenciaStatus>,
    pub client_id: Option<String>,
    pub product_id: Option<String>,
}

pub async fn list_vigencias(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(filter): Query<VigenciaListQuery>,
) -> Result<ApiResponse<Page<ClassifiedVigencia>>> {
    let conn = state.db.get()?;

    let filter = VigenciaFilter {
        status: filter.status,
        client_id: filter.client_id,
        product_id: filter.product_id,
    };
    let (details, total) =
        queries::list_vigencia_details(&conn, &filter, page.limit(), page.offset())?;

    let now = Utc::now().timestamp();
    let items = details
        .into_iter()
        .map(|detail| ClassifiedVigencia::new(detail, now))
        .collect::<Result<Vec<_>>>()?;

    Ok(ApiResponse::ok(Page::new(&page, items, total)))
}

pub async fn get_vigencia(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<ClassifiedVigencia>> {
    let conn = state.db.get()?;
    let detail =
        queries::get_vigencia_detail_by_id(&conn, &id)?.or_not_found(msg::VIGENCIA_NOT_FOUND)?;
    Ok(ApiResponse::ok(ClassifiedVigencia::new(
        detail,
        Utc::now().timestamp(),
    )?))
}

pub async fn create_vigencia(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<CreateVigencia>,
) -> Result<ApiResponse<Vigencia>> {
    ctx.require_vigencia_editor()?;
    let thresholds = input.validate()?;

    let conn = state.db.get()?;
    queries::get_link_by_id(&conn, &input.client_product_id)?.or_not_found(msg::LINK_NOT_FOUND)?;

    let vigencia = queries::create_vigencia(&conn, &input, thresholds, &ctx.user.id)?;

    tracing::info!(vigencia_id = %vigencia.id, "vigencia created");

    Ok(ApiResponse::new(vigencia, "Vigencia created"))
}

pub async fn update_vigencia(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(input): Json<UpdateVigencia>,
) -> Result<ApiResponse<Vigencia>> {
    ctx.require_vigencia_editor()?;
    if input.is_empty() {
        return Err(AppError::BadRequest(msg::NO_FIELDS_TO_UPDATE.into()));
    }

    let conn = state.db.get()?;
    let existing =
        queries::get_vigencia_by_id(&conn, &id)?.or_not_found(msg::VIGENCIA_NOT_FOUND)?;

    // Revalidate the merged record before any write happens.
    input.validate_against(&existing)?;

    let vigencia = queries::update_vigencia(&conn, &id, &input, &ctx.user.id)?
        .or_not_found(msg::VIGENCIA_NOT_FOUND)?;
    Ok(ApiResponse::new(vigencia, "Vigencia updated"))
}

pub async fn delete_vigencia(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>> {
    ctx.require_vigencia_editor()?;

    let conn = state.db.get()?;
    if !queries::delete_vigencia(&conn, &id)? {
        return Err(AppError::NotFound(msg::VIGENCIA_NOT_FOUND.into()));
    }

    tracing::info!(vigencia_id = %id, deleted_by = %ctx.user.id, "vigencia deleted");

    Ok(ApiResponse::new(serde_json::json!({}), "Vigencia deleted"))
}
