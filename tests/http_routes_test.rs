// ==========================================
// HTTP 路由集成测试
// ==========================================
// 测试目标: 状态码映射、错误响应体、编辑锁、CSV 响应头
// 工具: tower::ServiceExt::oneshot
// ==========================================

mod test_helpers;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use daily_report::app::{build_router, http_routes::EDIT_PASSWORD_HEADER};
use daily_report::config::AppConfig;
use daily_report::logging;
use serde_json::Value;
use test_helpers::{record, test_state, test_state_with_config, MockSource};
use tower::ServiceExt;

fn router() -> Router {
    let (_storage, state) = test_state(Arc::new(MockSource::new()));
    build_router(state)
}

fn locked_router() -> Router {
    let config = AppConfig {
        edit_password: Some("secret".to_string()),
        ..AppConfig::default()
    };
    let (_storage, state) = test_state_with_config(Arc::new(MockSource::new()), config);
    build_router(state)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_and_plan_data() {
    logging::init_test();
    let app = router();

    let response = app.clone().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["cache"]["state"], "cold");

    let response = app.oneshot(get("/api/plan-data")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, serde_json::json!({}));
}

#[tokio::test]
async fn test_missing_field_is_bad_request() {
    let app = router();

    let response = app
        .oneshot(post_json("/api/plan-edit", r#"{"month":"202511","quantity":5}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("itemCode"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = router();
    let response = app
        .oneshot(post_json("/api/comments", "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["success"], false);
}

#[tokio::test]
async fn test_out_of_range_fiscal_year_is_bad_request() {
    let app = router();

    let response = app
        .clone()
        .oneshot(get("/api/production?fiscalYear=2147483647"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("fiscalYear"));

    let response = app
        .oneshot(get("/api/production?year=99999&month=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_plan_edit_then_list() {
    let app = router();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/plan-edit",
            r#"{"itemCode":"I1","month":"202511","quantity":"12.5"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["success"], true);

    let response = app.oneshot(get("/api/plan-data")).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["I1_202511"]["quantity"], 12.5);
}

#[tokio::test]
async fn test_edit_lock_rejects_wrong_password() {
    let app = locked_router();

    let missing = app
        .clone()
        .oneshot(post_json(
            "/api/comments",
            r#"{"itemCode":"I1","yearMonth":"202511","comment":"x"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::FORBIDDEN);

    let mut wrong = post_json("/api/clear-cache", "{}");
    wrong
        .headers_mut()
        .insert(EDIT_PASSWORD_HEADER, "nope".parse().unwrap());
    let response = app.clone().oneshot(wrong).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["success"], false);

    let mut right = post_json(
        "/api/comments",
        r#"{"itemCode":"I1","yearMonth":"202511","comment":"x"}"#,
    );
    right
        .headers_mut()
        .insert(EDIT_PASSWORD_HEADER, "secret".parse().unwrap());
    let response = app.clone().oneshot(right).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 读接口不受编辑锁影响
    let response = app.oneshot(get("/api/comments")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["I1_202511"], "x");
}

#[tokio::test]
async fn test_delete_missing_holiday_is_not_found() {
    let app = router();

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/holidays/2025-12-25")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["success"], false);
}

#[tokio::test]
async fn test_invalid_query_params_are_rejected() {
    let app = router();

    let response = app
        .clone()
        .oneshot(get("/api/production?startDate=2025-11-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(get("/api/production?year=2025&month=11&week=60"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_production_and_csv_export() {
    let source = Arc::new(MockSource::with_rows(vec![record("20251103", "313", "I1", 500.0)]));
    let (_storage, state) = test_state(source);
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(get("/api/production?year=2025&month=11&detailed=true"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["origin"], "source");
    assert_eq!(body["data"][0]["item"], "I1");

    let response = app
        .oneshot(get("/api/export-csv?year=2025&month=11"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("production_202511.csv"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("YEAR_MONTH,COMP_DAY,LINE"));
}
