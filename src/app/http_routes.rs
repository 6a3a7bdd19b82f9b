// ==========================================
// 工厂日报系统 - HTTP 路由
// ==========================================
// 职责: axum 路由表 + 请求追踪中间件
// 写接口: 配置编辑口令时校验 X-Edit-Password
// ==========================================

mod calendar;
mod comment;
mod common;
mod plan;
mod production;

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::Router;
use tracing::Instrument;
use uuid::Uuid;

use crate::app::state::AppState;

pub use common::EDIT_PASSWORD_HEADER;

/// 请求体上限（计划导入可能较大）
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// 构建路由
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ==========================================
        // 实绩 / 缓存
        // ==========================================
        .route("/api/health", get(production::health))
        .route("/api/production", get(production::get_production))
        .route("/api/pivot", get(production::get_pivot))
        .route("/api/cache-status", get(production::cache_status))
        .route("/api/refresh-cache", post(production::refresh_cache))
        .route("/api/clear-cache", post(production::clear_cache))
        .route("/api/export-csv", get(production::export_csv))
        // ==========================================
        // 注释 / 计划
        // ==========================================
        .route("/api/comments", get(comment::list_comments).post(comment::save_comment))
        .route("/api/est-qty", post(plan::set_override))
        .route("/api/plan-data", get(plan::list_plans))
        .route("/api/plan-edit", post(plan::edit_plan))
        .route("/api/plan-import", post(plan::import_plans))
        .route("/api/plan-clear", post(plan::clear_plans))
        // ==========================================
        // 日历
        // ==========================================
        .route("/api/work-days", get(calendar::get_work_days))
        .route("/api/work-days/validate", get(calendar::validate_work_days))
        .route("/api/work-days/:month", delete(calendar::delete_work_day))
        .route("/api/workday-edit", post(calendar::edit_work_day))
        .route("/api/workdays-bulk", post(calendar::bulk_work_days))
        .route(
            "/api/working-days",
            get(calendar::get_working_days).post(calendar::replace_working_days),
        )
        .route(
            "/api/holidays",
            get(calendar::list_holidays).post(calendar::add_holiday),
        )
        .route("/api/holidays/:date", delete(calendar::delete_holiday))
        .layer(middleware::from_fn(request_tracing))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// 每个请求一个 span，结束时记录状态码与耗时
async fn request_tracing(request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().to_string();
    let route = request.uri().path().to_string();
    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %method,
        route = %route,
    );

    let started = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;
    span.in_scope(|| {
        tracing::debug!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "请求完成"
        );
    });
    response
}
