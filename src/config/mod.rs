// ==========================================
// 工厂日报系统 - 配置层
// ==========================================
// 职责: 应用配置加载（JSON 文件 + 环境变量覆写）
// ==========================================

pub mod app_config;

pub use app_config::{default_data_dir, AppConfig, ConfigError, ConfigResult};
