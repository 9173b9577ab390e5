use axum::extract::{Extension, State};

use crate::db::{AppState, queries};
use crate::error::{AppError, OptionExt, Result, msg};
use crate::extractors::{Json, Path};
use crate::middleware::AuthContext;
use crate::models::{CreateProduct, Product, UpdateProduct};
use crate::response::ApiResponse;

pub async fn list_products(State(state): State<AppState>) -> Result<ApiResponse<Vec<Product>>> {
    let conn = state.db.get()?;
    Ok(ApiResponse::ok(queries::list_products(&conn)?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Product>> {
    let conn = state.db.get()?;
    let product = queries::get_product_by_id(&conn, &id)?.or_not_found(msg::PRODUCT_NOT_FOUND)?;
    Ok(ApiResponse::ok(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<CreateProduct>,
) -> Result<ApiResponse<Product>> {
    ctx.require_admin()?;
    input.validate()?;

    let conn = state.db.get()?;
    if queries::get_product_by_name(&conn, &input.name)?.is_some() {
        return Err(AppError::Conflict(msg::PRODUCT_NAME_TAKEN.into()));
    }

    let product = queries::create_product(&conn, &input)?;

    tracing::info!(product_id = %product.id, name = %product.name, "product created");

    Ok(ApiResponse::new(product, "Product created"))
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProduct>,
) -> Result<ApiResponse<Product>> {
    ctx.require_admin()?;
    if input.is_empty() {
        return Err(AppError::BadRequest(msg::NO_FIELDS_TO_UPDATE.into()));
    }
    input.validate()?;

    let conn = state.db.get()?;
    if let Some(ref name) = input.name {
        if let Some(holder) = queries::get_product_by_name(&conn, name)? {
            if holder.id != id {
                return Err(AppError::Conflict(msg::PRODUCT_NAME_TAKEN.into()));
            }
        }
    }

    let product =
        queries::update_product(&conn, &id, &input)?.or_not_found(msg::PRODUCT_NOT_FOUND)?;
    Ok(ApiResponse::new(product, "Product updated"))
}

/// Delete a product. Refused while any client still holds a link to it, so
/// vigencia history is never cascaded away by a catalog cleanup.
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>> {
    ctx.require_admin()?;

    let conn = state.db.get()?;
    queries::get_product_by_id(&conn, &id)?.or_not_found(msg::PRODUCT_NOT_FOUND)?;

    if queries::count_links_for_product(&conn, &id)? > 0 {
        return Err(AppError::Conflict(msg::PRODUCT_IN_USE.into()));
    }

    queries::delete_product(&conn, &id)?;

    tracing::info!(product_id = %id, "product deleted");

    Ok(ApiResponse::new(serde_json::json!({}), "Product deleted"))
}
