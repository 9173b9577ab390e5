//! Alert-configuration endpoint tests.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::*;

fn full_config() -> serde_json::Value {
    json!({
        "email_enabled": true,
        "email_recipients": ["ops@example.com", "pm@example.com"],
        "teams_enabled": false,
        "frequency_critical": "daily",
        "frequency_warning": "weekly",
        "frequency_upcoming": "monthly",
    })
}

#[tokio::test]
async fn test_get_before_first_save_is_not_found() {
    let (app, state) = test_app();
    let token = {
        let conn = state.db.get().unwrap();
        let (_, token) = create_test_user_with_token(&conn, "admin@test.com", Role::Stac);
        token
    };

    let response = app
        .oneshot(request("GET", "/api/configuracion/alertas", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Alert configuration not found");
}

#[tokio::test]
async fn test_put_then_get_roundtrip() {
    let (app, state) = test_app();
    let (admin, token) = {
        let conn = state.db.get().unwrap();
        create_test_user_with_token(&conn, "admin@test.com", Role::Stac)
    };

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/configuracion/alertas",
            Some(&token),
            Some(full_config()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["updated_by"], admin.id);

    let response = app
        .oneshot(request("GET", "/api/configuracion/alertas", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let data = &body["data"];

    assert_eq!(data["email_enabled"], true);
    assert_eq!(
        data["email_recipients"],
        json!(["ops@example.com", "pm@example.com"])
    );
    assert_eq!(data["teams_enabled"], false);
    assert_eq!(data["teams_webhook_url"], serde_json::Value::Null);
    assert_eq!(data["frequency_critical"], "daily");
    assert_eq!(data["frequency_warning"], "weekly");
    assert_eq!(data["frequency_upcoming"], "monthly");
    assert!(data["updated_at"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_put_replaces_previous_settings() {
    let (app, state) = test_app();
    let token = {
        let conn = state.db.get().unwrap();
        let (_, token) = create_test_user_with_token(&conn, "admin@test.com", Role::Stac);
        token
    };

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/configuracion/alertas",
            Some(&token),
            Some(full_config()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A second save fully replaces the row, it never merges.
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/configuracion/alertas",
            Some(&token),
            Some(json!({
                "email_enabled": false,
                "email_recipients": [],
                "teams_enabled": true,
                "teams_webhook_url": "https://example.webhook.office.com/hook",
                "frequency_critical": "weekly",
                "frequency_warning": "weekly",
                "frequency_upcoming": "monthly",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", "/api/configuracion/alertas", Some(&token), None))
        .await
        .unwrap();
    let body = body_json(response).await;
    let data = &body["data"];
    assert_eq!(data["email_enabled"], false);
    assert_eq!(data["email_recipients"], json!([]));
    assert_eq!(data["teams_enabled"], true);
    assert_eq!(
        data["teams_webhook_url"],
        "https://example.webhook.office.com/hook"
    );
    assert_eq!(data["frequency_critical"], "weekly");
}

#[tokio::test]
async fn test_requires_admin_role() {
    let (app, state) = test_app();
    let token = {
        let conn = state.db.get().unwrap();
        let (_, token) = create_test_user_with_token(&conn, "pm@test.com", Role::Proyecto);
        token
    };

    let response = app
        .clone()
        .oneshot(request("GET", "/api/configuracion/alertas", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(request(
            "PUT",
            "/api/configuracion/alertas",
            Some(&token),
            Some(full_config()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_rejects_invalid_recipient() {
    let (app, state) = test_app();
    let token = {
        let conn = state.db.get().unwrap();
        let (_, token) = create_test_user_with_token(&conn, "admin@test.com", Role::Stac);
        token
    };

    let mut config = full_config();
    config["email_recipients"] = json!(["ops@example.com", "not-an-email"]);

    let response = app
        .oneshot(request(
            "PUT",
            "/api/configuracion/alertas",
            Some(&token),
            Some(config),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_teams_needs_webhook() {
    let (app, state) = test_app();
    let token = {
        let conn = state.db.get().unwrap();
        let (_, token) = create_test_user_with_token(&conn, "admin@test.com", Role::Stac);
        token
    };

    let mut config = full_config();
    config["teams_enabled"] = json!(true);

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/configuracion/alertas",
            Some(&token),
            Some(config.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    config["teams_webhook_url"] = json!("https://example.webhook.office.com/hook");
    let response = app
        .oneshot(request(
            "PUT",
            "/api/configuracion/alertas",
            Some(&token),
            Some(config),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
