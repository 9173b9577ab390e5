//! Dashboard aggregation tests.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::*;

/// Seed a fixed spread of active vigencias:
/// expired (-5d), critical (10d), warning (25d), ok (60d), far (200d),
/// plus one inactive record that must never be counted.
fn seed_spread(state: &AppState) -> String {
    let conn = state.db.get().unwrap();
    let (admin, token) = create_test_user_with_token(&conn, "admin@test.com", Role::Stac);
    let client = create_test_client(&conn, "Acme");
    let product = create_test_product(&conn, "Suite");
    let link = create_test_link(&conn, &client.id, &product.id);

    for days in [-5, 10, 25, 60, 200] {
        create_test_vigencia(&conn, &link.id, now() + days * DAY, &admin.id);
    }

    let inactive = create_test_vigencia(&conn, &link.id, future_timestamp(3), &admin.id);
    queries::update_vigencia(
        &conn,
        &inactive.id,
        &UpdateVigencia {
            status: Some(VigenciaStatus::Inactive),
            ..Default::default()
        },
        &admin.id,
    )
    .unwrap();

    token
}

#[tokio::test]
async fn test_stats_counts_by_color() {
    let (app, state) = test_app();
    let token = seed_spread(&state);

    let response = app
        .oneshot(request("GET", "/api/dashboard/stats", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let data = &body["data"];

    assert_eq!(data["total_clients"], 1);
    assert_eq!(data["total_products"], 1);
    // Active records only; the inactive one is invisible.
    assert_eq!(data["total_vigencias"], 5);

    assert_eq!(data["by_color"]["expired"], 1);
    assert_eq!(data["by_color"]["critical"], 1);
    assert_eq!(data["by_color"]["warning"], 1);
    assert_eq!(data["by_color"]["ok"], 1);
    assert_eq!(data["by_color"]["far"], 1);

    // 10 and 25 days fall inside the 30-day window; -5 does not.
    assert_eq!(data["expiring_soon"], 2);
}

#[tokio::test]
async fn test_stats_empty_database() {
    let (app, state) = test_app();
    let token = {
        let conn = state.db.get().unwrap();
        let (_, token) = create_test_user_with_token(&conn, "admin@test.com", Role::Stac);
        token
    };

    let response = app
        .oneshot(request("GET", "/api/dashboard/stats", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_vigencias"], 0);
    assert_eq!(body["data"]["expiring_soon"], 0);
    assert_eq!(body["data"]["by_color"]["expired"], 0);
}

#[tokio::test]
async fn test_upcoming_lists_most_urgent_first() {
    let (app, state) = test_app();
    let token = seed_spread(&state);

    let response = app
        .oneshot(request(
            "GET",
            "/api/dashboard/proximas",
            Some(&token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let items = body["data"].as_array().unwrap();

    // Only records at or under their warning threshold (30 days), the
    // expired one included, most urgent first.
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["days_remaining"], -5);
    assert_eq!(items[0]["color"], "EXPIRED");
    assert_eq!(items[1]["days_remaining"], 10);
    assert_eq!(items[2]["days_remaining"], 25);
}

#[tokio::test]
async fn test_upcoming_respects_limit() {
    let (app, state) = test_app();
    let token = seed_spread(&state);

    let response = app
        .oneshot(request(
            "GET",
            "/api/dashboard/proximas?limit=1",
            Some(&token),
            None,
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["days_remaining"], -5);
}

#[tokio::test]
async fn test_upcoming_honors_per_record_thresholds() {
    let (app, state) = test_app();
    let (token, link_id) = {
        let conn = state.db.get().unwrap();
        let (_, token) = create_test_user_with_token(&conn, "admin@test.com", Role::Stac);
        let client = create_test_client(&conn, "Acme");
        let product = create_test_product(&conn, "Suite");
        let link = create_test_link(&conn, &client.id, &product.id);
        (token, link.id)
    };

    // 45 days out is quiet under default thresholds but urgent for a
    // record with a 60-day yellow threshold.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/vigencias",
            Some(&token),
            Some(json!({
                "client_product_id": link_id,
                "starts_at": now(),
                "expires_at": future_timestamp(45),
                "threshold_green": 120,
                "threshold_yellow": 60,
                "threshold_red": 15,
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request(
            "GET",
            "/api/dashboard/proximas",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["days_remaining"], 45);
    assert_eq!(items[0]["color"], "WARNING");
}
