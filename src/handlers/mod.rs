pub mod auth;
pub mod clients;
pub mod configuracion;
pub mod dashboard;
pub mod products;
pub mod users;
pub mod vigencias;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post, put},
};

use crate::db::AppState;
use crate::middleware::require_auth;
use crate::response::ApiResponse;

async fn health() -> ApiResponse<serde_json::Value> {
    ApiResponse::ok(serde_json::json!({ "status": "up" }))
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // Users (handlers enforce STAC)
        .route("/api/usuarios", get(users::list_users))
        .route("/api/usuarios", post(users::create_user))
        .route("/api/usuarios/{id}", get(users::get_user))
        .route("/api/usuarios/{id}", put(users::update_user))
        .route("/api/usuarios/{id}", delete(users::delete_user))
        .route("/api/usuarios/{id}/toggle", patch(users::toggle_active))
        // Clients and their product links
        .route("/api/clientes", get(clients::list_clients))
        .route("/api/clientes", post(clients::create_client))
        .route("/api/clientes/{id}", get(clients::get_client))
        .route("/api/clientes/{id}", put(clients::update_client))
        .route("/api/clientes/{id}", delete(clients::delete_client))
        .route(
            "/api/clientes/{id}/productos",
            get(clients::list_client_products),
        )
        .route("/api/clientes/{id}/productos", post(clients::link_product))
        .route(
            "/api/clientes/{client_id}/productos/{product_id}",
            delete(clients::unlink_product),
        )
        // Product catalog
        .route("/api/productos", get(products::list_products))
        .route("/api/productos", post(products::create_product))
        .route("/api/productos/{id}", get(products::get_product))
        .route("/api/productos/{id}", put(products::update_product))
        .route("/api/productos/{id}", delete(products::delete_product))
        // Vigencias
        .route("/api/vigencias", get(vigencias::list_vigencias))
        .route("/api/vigencias", post(vigencias::create_vigencia))
        .route("/api/vigencias/{id}", get(vigencias::get_vigencia))
        .route("/api/vigencias/{id}", put(vigencias::update_vigencia))
        .route("/api/vigencias/{id}", delete(vigencias::delete_vigencia))
        // Dashboard
        .route("/api/dashboard/stats", get(dashboard::stats))
        .route("/api/dashboard/proximas", get(dashboard::upcoming))
        // Alert configuration (handlers enforce STAC)
        .route(
            "/api/configuracion/alertas",
            get(configuracion::get_alert_config),
        )
        .route(
            "/api/configuracion/alertas",
            put(configuracion::update_alert_config),
        )
        .layer(middleware::from_fn_with_state(state, require_auth))
        // Public endpoints
        .route("/api/auth/login", post(auth::login))
        .route("/health", get(health))
}
