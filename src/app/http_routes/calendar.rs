use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::HeaderMap;
use serde_json::{json, Value};

use crate::api::error::ApiResult;
use crate::api::{
    BulkSummary, HolidayRequest, WorkDayEditRequest, WorkDaysBulkRequest, WorkingDaysRequest,
};
use crate::app::state::AppState;
use crate::domain::{HolidayEntry, WorkDayCounts};
use crate::engine::WorkDayValidationReport;

use super::common::{body, require_edit, success};

// ==========================================
// 月工作天数
// ==========================================

pub(super) async fn get_work_days(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<WorkDayCounts>> {
    Ok(Json(state.calendar_api.get_work_days()?))
}

pub(super) async fn edit_work_day(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<WorkDayEditRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    require_edit(&state, &headers)?;
    state.calendar_api.edit_work_day(&body(payload)?)?;
    Ok(success(json!({})))
}

pub(super) async fn bulk_work_days(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<WorkDaysBulkRequest>, JsonRejection>,
) -> ApiResult<Json<BulkSummary>> {
    require_edit(&state, &headers)?;
    Ok(Json(state.calendar_api.bulk_work_days(&body(payload)?)?))
}

pub(super) async fn delete_work_day(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(month): Path<String>,
) -> ApiResult<Json<Value>> {
    require_edit(&state, &headers)?;
    state.calendar_api.delete_work_day(&month)?;
    Ok(success(json!({})))
}

pub(super) async fn validate_work_days(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<WorkDayValidationReport>> {
    Ok(Json(state.calendar_api.validate()?))
}

// ==========================================
// 工作日日历
// ==========================================

pub(super) async fn get_working_days(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.calendar_api.get_working_days()?))
}

pub(super) async fn replace_working_days(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<WorkingDaysRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    require_edit(&state, &headers)?;
    let count = state.calendar_api.replace_working_days(&body(payload)?)?;
    Ok(success(json!({ "count": count })))
}

// ==========================================
// 假日
// ==========================================

pub(super) async fn list_holidays(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<HolidayEntry>>> {
    Ok(Json(state.calendar_api.list_holidays()?))
}

pub(super) async fn add_holiday(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<HolidayRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    require_edit(&state, &headers)?;
    let entry = state.calendar_api.add_holiday(&body(payload)?)?;
    Ok(success(json!({ "holiday": entry })))
}

pub(super) async fn delete_holiday(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(date): Path<String>,
) -> ApiResult<Json<Value>> {
    require_edit(&state, &headers)?;
    state.calendar_api.delete_holiday(&date)?;
    Ok(success(json!({})))
}
