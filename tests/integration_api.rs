//! API Integration Tests
//!
//! These tests drive the real router against a Postgres database and are
//! ignored by default. Run them with a schema-loaded database:
//!     DATABASE_URL=... cargo test -- --ignored

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    middleware, Router,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::util::ServiceExt;

use colony_ledger::api::{self, routes::AppState};
use colony_ledger::PriceDefaults;

mod common;

fn test_app(pool: PgPool) -> Router {
    let state = AppState {
        pool: pool.clone(),
        price_defaults: PriceDefaults::default(),
        credit_overdue_secs: 600,
        privateer_fee_fallback: dec!(50),
    };

    let protected = api::create_router().layer(middleware::from_fn_with_state(
        pool,
        api::middleware::session_middleware,
    ));

    Router::new()
        .route("/login", axum::routing::post(api::routes::login))
        .merge(protected)
        .with_state(state)
}

async fn login(app: &Router, table: &str) -> String {
    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"username": "tester", "table": table}).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "login failed");

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    json["session_id"].as_str().unwrap().to_string()
}

async fn post_json(app: &Router, session: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("X-Session-Id", session)
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn get_json(app: &Router, session: &str, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .header("X-Session-Id", session)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

#[tokio::test]
#[ignore = "requires a running Postgres with the schema applied"]
async fn test_goods_sale_e2e() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool);
    let session = login(&app, "britain").await;

    // First sale of a fresh good: price starts at the default ceiling of 100
    let (status, body) = post_json(
        &app,
        &session,
        "/britain/sale",
        json!({"good": "test-cloth", "player_id": "4217", "quantity": 10, "payment": "1200.00"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "sale failed: {body}");
    assert_eq!(body["total"], json!("1000"));
    assert_eq!(body["change"], json!("200.00"));

    // Ten cumulative sales with n_for_drop=10 drop the price by 1
    let (status, body) = get_json(&app, &session, "/britain/prices/test-cloth").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], json!("99"));
    assert_eq!(body["sales_count"], json!(10));
}

#[tokio::test]
#[ignore = "requires a running Postgres with the schema applied"]
async fn test_goods_sale_insufficient_funds_no_mutation() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool);
    let session = login(&app, "britain").await;

    let (status, body) = post_json(
        &app,
        &session,
        "/britain/sale",
        json!({"good": "test-rum", "player_id": "4217", "quantity": 5, "payment": "10.00"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], json!("insufficient_funds"));

    // The rejected sale must not have moved the price or the counter
    let (_, body) = get_json(&app, &session, "/britain/prices/test-rum").await;
    assert_eq!(body["price"], json!("100"));
    assert_eq!(body["sales_count"], json!(0));
}

#[tokio::test]
#[ignore = "requires a running Postgres with the schema applied"]
async fn test_credit_lifecycle_e2e() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool);
    let session = login(&app, "britain").await;

    // Issue 300 over 3 installments: monthly payment is 150
    let (status, body) = post_json(
        &app,
        &session,
        "/britain/credits",
        json!({"player_id": "7105", "amount": "300", "term_months": 3}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "issue failed: {body}");
    assert_eq!(body["monthly_payment"], json!("150.0"));

    // A second credit for the same debtor is rejected
    let (status, _) = post_json(
        &app,
        &session,
        "/britain/credits",
        json!({"player_id": "7105", "amount": "100", "term_months": 2}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // 249 covers two installments (extra 99 = monthly * 0.66)
    let (status, body) = post_json(
        &app,
        &session,
        "/britain/credits/payment",
        json!({"player_id": "7105", "amount": "249"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["remaining_payments"], json!(1));
    assert_eq!(body["closed"], json!(false));

    // Final installment closes and deletes the credit
    let (status, body) = post_json(
        &app,
        &session,
        "/britain/credits/payment",
        json!({"player_id": "7105", "amount": "150"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["closed"], json!(true));

    let (_, credits) = get_json(&app, &session, "/britain/credits").await;
    assert_eq!(credits.as_array().unwrap().len(), 0);
}

#[tokio::test]
#[ignore = "requires a running Postgres with the schema applied"]
async fn test_privateer_lifecycle_e2e() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool);
    let session = login(&app, "britain").await;

    let (status, _) = post_json(
        &app,
        &session,
        "/britain/privateers/license",
        json!({"player_id": "3042", "ship": "frigate"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Complaints can go negative via retraction
    let (_, body) = post_json(
        &app,
        &session,
        "/britain/privateers/complaint",
        json!({"player_id": "3042", "delta": -2}),
    )
    .await;
    assert_eq!(body["complaints"], json!(-2));

    // Dismissal removes the privateer from the active list
    let (status, _) = post_json(
        &app,
        &session,
        "/britain/privateers/dismiss",
        json!({"player_id": "3042"}),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = get_json(&app, &session, "/britain/privateers").await;
    assert_eq!(list.as_array().unwrap().len(), 0);

    // Re-issuance reactivates the same record with the new ship
    let (status, body) = post_json(
        &app,
        &session,
        "/britain/privateers/license",
        json!({"player_id": "3042", "ship": "steam_frigate"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ship"], json!("steam_frigate"));
    assert_eq!(body["complaints"], json!(-2));
}

#[tokio::test]
#[ignore = "requires a running Postgres with the schema applied"]
async fn test_action_log_chain_verifies() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool);
    let session = login(&app, "island").await;

    for i in 0..5 {
        let (status, _) = post_json(
            &app,
            &session,
            "/island/deal",
            json!({
                "player_a": format!("{i}"),
                "player_b": format!("{}", i + 1),
                "description": "trade agreement"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = get_json(&app, &session, "/log/verify").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_valid"], json!(true));
    assert_eq!(body["entries_checked"], json!(5));
}

#[tokio::test]
#[ignore = "requires a running Postgres with the schema applied"]
async fn test_session_required() {
    let pool = common::setup_test_db().await;
    let app = test_app(pool);

    let req = Request::builder()
        .method("GET")
        .uri("/britain/credits")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
