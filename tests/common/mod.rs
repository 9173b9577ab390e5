//! Test utilities and fixtures for Vigencias integration tests

#![allow(dead_code)]

use axum::{Router, body::Body, http::Request};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use serde_json::Value;

pub use vigencias::auth::{generate_session_token, hash_password, hash_token};
pub use vigencias::db::{AppState, init_db, queries};
pub use vigencias::handlers;
pub use vigencias::models::*;
pub use vigencias::semaforo::Thresholds;

pub const DAY: i64 = 86_400;

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Get the current timestamp
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Get a future timestamp (days from now)
pub fn future_timestamp(days: i64) -> i64 {
    now() + days * DAY
}

/// Get a past timestamp (days ago)
pub fn past_timestamp(days: i64) -> i64 {
    now() - days * DAY
}

/// Create a test user. All fixture users share the same password.
pub fn create_test_user(conn: &Connection, email: &str, role: Role) -> User {
    let input = CreateUser {
        email: email.to_string(),
        password: "password123".to_string(),
        name: format!("Test User {}", email),
        role,
    };
    let password_hash = hash_password("password123").expect("Failed to hash test password");
    queries::create_user(conn, &input, &password_hash).expect("Failed to create test user")
}

/// Create a test user together with a live session token.
pub fn create_test_user_with_token(conn: &Connection, email: &str, role: Role) -> (User, String) {
    let user = create_test_user(conn, email, role);
    let token = issue_token(conn, &user.id);
    (user, token)
}

/// Issue a session token for an existing user, bypassing the login endpoint.
pub fn issue_token(conn: &Connection, user_id: &str) -> String {
    let token = generate_session_token();
    queries::create_session(conn, user_id, &hash_token(&token), 3600)
        .expect("Failed to create test session");
    token
}

pub fn create_test_client(conn: &Connection, name: &str) -> Client {
    let input = CreateClient {
        name: name.to_string(),
        email: Some(format!(
            "contact@{}.test",
            name.to_lowercase().replace(' ', "-")
        )),
        phone: None,
        address: None,
        primary_contact: None,
        description: None,
        system_information_url: None,
    };
    queries::create_client(conn, &input, None).expect("Failed to create test client")
}

pub fn create_test_product(conn: &Connection, name: &str) -> Product {
    let input = CreateProduct {
        name: name.to_string(),
        description: Some("Test product".to_string()),
        product_type: Some("saas".to_string()),
    };
    queries::create_product(conn, &input).expect("Failed to create test product")
}

pub fn create_test_link(conn: &Connection, client_id: &str, product_id: &str) -> ClientProduct {
    let input = CreateClientProduct {
        product_id: product_id.to_string(),
        license_quantity: Some(5),
        acquired_at: None,
        notes: None,
    };
    queries::create_client_product(conn, client_id, &input).expect("Failed to create test link")
}

/// Create a test vigencia with default thresholds, created by `user_id`.
pub fn create_test_vigencia(
    conn: &Connection,
    link_id: &str,
    expires_at: i64,
    user_id: &str,
) -> Vigencia {
    let input = CreateVigencia {
        client_product_id: link_id.to_string(),
        starts_at: expires_at - 365 * DAY,
        expires_at,
        period: Some("annual".to_string()),
        threshold_green: None,
        threshold_yellow: None,
        threshold_red: None,
        status: None,
        notifications_enabled: None,
        notes: None,
    };
    queries::create_vigencia(conn, &input, Thresholds::default(), user_id)
        .expect("Failed to create test vigencia")
}

/// Create an AppState backed by an in-memory database
pub fn create_test_app_state() -> AppState {
    let manager = SqliteConnectionManager::memory()
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    let pool = Pool::builder().max_size(4).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }

    AppState {
        db: pool,
        session_ttl_secs: 3600,
    }
}

/// Build the full application router over an in-memory database.
pub fn test_app() -> (Router, AppState) {
    let state = create_test_app_state();
    let app = handlers::router(state.clone()).with_state(state.clone());
    (app, state)
}

/// Build a request with optional bearer token and JSON body.
pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
