// ==========================================
// 工厂日报系统 - 应用层
// ==========================================
// 职责: HTTP 集成（axum），连接浏览器页面与后端
// ==========================================

pub mod http_routes;
pub mod state;

// 重导出
pub use http_routes::build_router;
pub use state::AppState;
