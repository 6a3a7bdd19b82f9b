use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{Local, NaiveDate};
use serde_json::{json, Value};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::check_edit_password;
use crate::app::state::AppState;

// ==========================================
// 公共工具：错误映射、编辑锁、请求解析
// ==========================================

/// 编辑口令请求头
pub const EDIT_PASSWORD_HEADER: &str = "x-edit-password";

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::StorageError(_) | ApiError::InternalError(_) | ApiError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// 错误响应 {"success": false, "error": "..."}
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_client_error() {
            tracing::warn!("请求被拒绝 ({}): {}", status.as_u16(), self);
        } else {
            tracing::error!("请求处理失败: {}", self);
        }
        (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
    }
}

/// 写接口的编辑锁校验
pub(super) fn require_edit(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let provided = headers
        .get(EDIT_PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok());
    check_edit_password(state.config.edit_password.as_deref(), provided)
}

/// 请求体解析失败按输入错误返回
pub(super) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::InvalidInput(rejection.body_text()))
}

pub(super) fn query<T>(params: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::InvalidInput(rejection.body_text()))
}

/// 成功响应，附加字段合并到 {"success": true}
pub(super) fn success(extra: Value) -> Json<Value> {
    let mut body = json!({ "success": true });
    if let (Some(target), Value::Object(fields)) = (body.as_object_mut(), extra) {
        target.extend(fields);
    }
    Json(body)
}

pub(super) fn today() -> NaiveDate {
    Local::now().date_naive()
}
