use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::HeaderMap;
use serde_json::{json, Value};

use crate::api::error::ApiResult;
use crate::api::CommentRequest;
use crate::app::state::AppState;

use super::common::{body, require_edit, success};

pub(super) async fn list_comments(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BTreeMap<String, String>>> {
    Ok(Json(state.comment_api.get_comments()?))
}

pub(super) async fn save_comment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    require_edit(&state, &headers)?;
    state.comment_api.save_comment(&body(payload)?)?;
    Ok(success(json!({})))
}
