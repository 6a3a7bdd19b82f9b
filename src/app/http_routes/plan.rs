use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::HeaderMap;
use serde_json::{json, Value};

use crate::api::error::ApiResult;
use crate::api::{ImportSummary, OverrideRequest, PlanEditRequest, PlanImportRequest};
use crate::app::state::AppState;
use crate::domain::PlanEntry;

use super::common::{body, require_edit, success};

// ==========================================
// 计划 / 人工覆写
// ==========================================

pub(super) async fn list_plans(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BTreeMap<String, PlanEntry>>> {
    Ok(Json(state.plan_api.list_plans()?))
}

pub(super) async fn edit_plan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<PlanEditRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    require_edit(&state, &headers)?;
    let entry = state.plan_api.edit_plan(&body(payload)?)?;
    Ok(success(json!({ "plan": entry })))
}

pub(super) async fn set_override(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<OverrideRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    require_edit(&state, &headers)?;
    let value = state.plan_api.set_override(&body(payload)?)?;
    Ok(success(json!({ "override": value })))
}

pub(super) async fn import_plans(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<PlanImportRequest>, JsonRejection>,
) -> ApiResult<Json<ImportSummary>> {
    require_edit(&state, &headers)?;
    Ok(Json(state.plan_api.import(&body(payload)?)?))
}

pub(super) async fn clear_plans(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    require_edit(&state, &headers)?;
    state.plan_api.clear_plans()?;
    Ok(success(json!({})))
}
