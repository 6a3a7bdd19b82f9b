// ==========================================
// 工厂日报系统 - 注释 API
// ==========================================
// 每个 品目×年月 一条自由文本；后写覆盖
// ==========================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::api::validator::{require_field, validate_year_month};
use crate::repository::SideStores;

/// POST /api/comments
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub item_code: Option<String>,
    pub year_month: Option<String>,
    pub comment: Option<String>,
}

pub struct CommentApi {
    stores: Arc<SideStores>,
}

impl CommentApi {
    pub fn new(stores: Arc<SideStores>) -> Self {
        Self { stores }
    }

    pub fn get_comments(&self) -> ApiResult<BTreeMap<String, String>> {
        Ok(self.stores.comments.get_comments()?)
    }

    pub fn save_comment(&self, request: &CommentRequest) -> ApiResult<()> {
        let item = require_field("itemCode", request.item_code.as_deref())?;
        let year_month = require_field("yearMonth", request.year_month.as_deref())?;
        validate_year_month(&year_month)?;

        let text = request.comment.as_deref().unwrap_or_default();
        self.stores.comments.save_comment(&item, &year_month, text)?;
        tracing::debug!("注释已保存: {}_{}", item, year_month);
        Ok(())
    }
}
