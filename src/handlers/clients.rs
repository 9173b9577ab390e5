//! Client CRUD plus the client-product link sub-resource.
//!
//! Reads are open to every authenticated role; writes are STAC-only.

use axum::extract::{Extension, State};
use serde::Deserialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, OptionExt, Result, msg};
use crate::extractors::{Json, Path, Query};
use crate::middleware::AuthContext;
use crate::models::{
    Client, ClientProduct, ClientProductWithProduct, ClientWithCreator, CreateClient,
    CreateClientProduct, UpdateClient,
};
use crate::pagination::{Page, PageParams};
use crate::response::ApiResponse;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Substring match against client name and email.
    pub search: Option<String>,
}

pub async fn list_clients(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(search): Query<SearchQuery>,
) -> Result<ApiResponse<Page<ClientWithCreator>>> {
    let conn = state.db.get()?;
    let (clients, total) = queries::list_clients_paginated(
        &conn,
        search.search.as_deref(),
        page.limit(),
        page.offset(),
    )?;
    Ok(ApiResponse::ok(Page::new(&page, clients, total)))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Client>> {
    let conn = state.db.get()?;
    let client = queries::get_client_by_id(&conn, &id)?.or_not_found(msg::CLIENT_NOT_FOUND)?;
    Ok(ApiResponse::ok(client))
}

pub async fn create_client(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<CreateClient>,
) -> Result<ApiResponse<Client>> {
    ctx.require_admin()?;
    input.validate()?;

    let conn = state.db.get()?;
    let client = queries::create_client(&conn, &input, Some(&ctx.user.id))?;

    tracing::info!(client_id = %client.id, "client created");

    Ok(ApiResponse::new(client, "Client created"))
}

pub async fn update_client(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(input): Json<UpdateClient>,
) -> Result<ApiResponse<Client>> {
    ctx.require_admin()?;
    if input.is_empty() {
        return Err(AppError::BadRequest(msg::NO_FIELDS_TO_UPDATE.into()));
    }
    input.validate()?;

    let conn = state.db.get()?;
    let client =
        queries::update_client(&conn, &id, &input)?.or_not_found(msg::CLIENT_NOT_FOUND)?;
    Ok(ApiResponse::new(client, "Client updated"))
}

pub async fn delete_client(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>> {
    ctx.require_admin()?;

    let conn = state.db.get()?;
    if !queries::delete_client(&conn, &id)? {
        return Err(AppError::NotFound(msg::CLIENT_NOT_FOUND.into()));
    }

    tracing::info!(client_id = %id, "client deleted");

    Ok(ApiResponse::new(serde_json::json!({}), "Client deleted"))
}

// ============ Client-product links ============

pub async fn list_client_products(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<ClientProductWithProduct>>> {
    let conn = state.db.get()?;
    queries::get_client_by_id(&conn, &id)?.or_not_found(msg::CLIENT_NOT_FOUND)?;
    Ok(ApiResponse::ok(queries::list_products_for_client(
        &conn, &id,
    )?))
}

pub async fn link_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(input): Json<CreateClientProduct>,
) -> Result<ApiResponse<ClientProduct>> {
    ctx.require_admin()?;

    let conn = state.db.get()?;
    queries::get_client_by_id(&conn, &id)?.or_not_found(msg::CLIENT_NOT_FOUND)?;
    queries::get_product_by_id(&conn, &input.product_id)?.or_not_found(msg::PRODUCT_NOT_FOUND)?;

    if queries::get_link(&conn, &id, &input.product_id)?.is_some() {
        return Err(AppError::Conflict(msg::LINK_ALREADY_EXISTS.into()));
    }

    let link = queries::create_client_product(&conn, &id, &input)?;
    Ok(ApiResponse::new(link, "Product linked to client"))
}

#[derive(Debug, Deserialize)]
pub struct LinkPath {
    pub client_id: String,
    pub product_id: String,
}

pub async fn unlink_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(path): Path<LinkPath>,
) -> Result<ApiResponse<serde_json::Value>> {
    ctx.require_admin()?;

    let conn = state.db.get()?;
    if !queries::delete_link(&conn, &path.client_id, &path.product_id)? {
        return Err(AppError::NotFound(msg::LINK_NOT_FOUND.into()));
    }

    Ok(ApiResponse::new(
        serde_json::json!({}),
        "Product unlinked from client",
    ))
}
