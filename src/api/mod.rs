// ==========================================
// 工厂日报系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供 HTTP 路由调用
// 约定: 参数校验在本层完成，错误统一为 ApiError
// ==========================================

pub mod error;
pub mod validator;
pub mod production_api;
pub mod plan_api;
pub mod calendar_api;
pub mod comment_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use production_api::{
    CsvExport, HealthResponse, PivotParams, ProductionApi, ProductionParams, ProductionResponse,
    RefreshResponse,
};
pub use plan_api::{ImportSummary, OverrideRequest, PlanApi, PlanEditRequest, PlanImportRequest};
pub use calendar_api::{
    BulkSummary, CalendarApi, HolidayRequest, WorkDayEditRequest, WorkDaysBulkRequest,
    WorkingDaysRequest,
};
pub use comment_api::{CommentApi, CommentRequest};
pub use validator::NumberInput;
