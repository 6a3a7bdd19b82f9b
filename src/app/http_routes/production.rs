use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Json, Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

use crate::api::error::ApiResult;
use crate::api::{
    HealthResponse, PivotParams, ProductionParams, ProductionResponse, RefreshResponse,
};
use crate::app::state::AppState;
use crate::engine::{CacheStatus, PivotTable};

use super::common::{query, require_edit, success, today};

// ==========================================
// 实绩查询 / 缓存管理
// ==========================================

pub(super) async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(state.production_api.health())
}

pub(super) async fn get_production(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ProductionParams>, QueryRejection>,
) -> ApiResult<Json<ProductionResponse>> {
    let params = query(params)?;
    let response = state.production_api.get_production(&params, today()).await?;
    Ok(Json(response))
}

pub(super) async fn get_pivot(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PivotParams>, QueryRejection>,
) -> ApiResult<Json<PivotTable>> {
    let params = query(params)?;
    let table = state.production_api.get_pivot(&params, today()).await?;
    Ok(Json(table))
}

pub(super) async fn cache_status(State(state): State<Arc<AppState>>) -> Json<CacheStatus> {
    Json(state.production_api.cache_status())
}

pub(super) async fn refresh_cache(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    Json(state.production_api.refresh_cache().await)
}

pub(super) async fn clear_cache(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    require_edit(&state, &headers)?;
    let status = state.production_api.clear_cache();
    Ok(success(json!({
        "message": crate::i18n::t("cache.cleared"),
        "status": status,
    })))
}

/// CSV 下载（附件）
pub(super) async fn export_csv(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ProductionParams>, QueryRejection>,
) -> ApiResult<Response> {
    let params = query(params)?;
    let export = state.production_api.export_csv(&params, today()).await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        export.file_name
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response())
}
