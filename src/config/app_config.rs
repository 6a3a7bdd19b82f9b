// ==========================================
// 工厂日报系统 - 应用配置
// ==========================================
// 来源优先级: 环境变量 > 配置文件 (JSON) > 默认值
// 环境变量:
// - DAILY_REPORT_CONFIG: 配置文件路径
// - DAILY_REPORT_DATA_DIR: 数据目录
// - PORT: 监听端口
// ==========================================

use crate::domain::calendar::is_valid_year_month;
use crate::engine::enrichment::{DEFAULT_KG_LINE, DEFAULT_PRIMARY_LINE, DEFAULT_WORK_DAYS};
use crate::source::SourceSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_CONFIG_PATH: &str = "DAILY_REPORT_CONFIG";
pub const ENV_DATA_DIR: &str = "DAILY_REPORT_DATA_DIR";
pub const ENV_PORT: &str = "PORT";

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    Read { path: String, message: String },

    #[error("配置文件格式错误 ({path}): {message}")]
    Parse { path: String, message: String },

    #[error("配置值无效 ({key}): {message}")]
    Invalid { key: String, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// AppConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP 监听端口
    pub port: u16,
    /// 侧存储与快照所在目录
    pub data_dir: PathBuf,
    /// 生产表镜像（SQLite）路径；缺省为 data_dir/production_mirror.db
    pub source_db_path: Option<PathBuf>,
    /// 产线白名单
    pub line_codes: Vec<String>,
    /// 单次查询行数上限（0 = 不限制）
    pub row_limit: usize,
    /// 报表月份窗口 YYYYMM
    pub start_month: Option<String>,
    pub end_month: Option<String>,
    pub refresh_interval_secs: u64,
    pub source_timeout_secs: u64,
    /// 以 kg 计量的产线
    pub kg_line_code: String,
    /// 透视表置顶产线
    pub primary_line_code: String,
    /// 月工作天数缺省值
    pub default_work_days: u32,
    /// 编辑口令（None = 不启用编辑锁）
    pub edit_password: Option<String>,
    /// 界面/校验消息语言
    pub locale: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: default_data_dir(),
            source_db_path: None,
            line_codes: vec!["312".to_string(), "313".to_string()],
            row_limit: 100_000,
            start_month: None,
            end_month: None,
            refresh_interval_secs: 10,
            source_timeout_secs: 60,
            kg_line_code: DEFAULT_KG_LINE.to_string(),
            primary_line_code: DEFAULT_PRIMARY_LINE.to_string(),
            default_work_days: DEFAULT_WORK_DAYS,
            edit_password: None,
            locale: "en".to_string(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件读取（缺失字段取默认值）
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 按进程环境装配: 配置文件（若指定）+ 环境变量覆写 + 校验
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = match std::env::var(ENV_CONFIG_PATH) {
            Ok(path) if !path.trim().is_empty() => {
                tracing::info!("读取配置文件: {}", path.trim());
                Self::load(Path::new(path.trim()))?
            }
            _ => Self::default(),
        };
        config.apply_env_overrides_from(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 应用环境变量覆写（lookup 便于测试注入）
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(ENV_PORT).filter(|v| !v.trim().is_empty()) {
            self.port = port.trim().parse().map_err(|_| ConfigError::Invalid {
                key: ENV_PORT.to_string(),
                message: format!("不是有效端口: {}", port),
            })?;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir.trim());
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for (key, value) in [("start_month", &self.start_month), ("end_month", &self.end_month)] {
            if let Some(ym) = value {
                if !is_valid_year_month(ym) {
                    return Err(ConfigError::Invalid {
                        key: key.to_string(),
                        message: format!("期望 YYYYMM，实际 {}", ym),
                    });
                }
            }
        }
        if let (Some(start), Some(end)) = (&self.start_month, &self.end_month) {
            if start > end {
                return Err(ConfigError::Invalid {
                    key: "start_month".to_string(),
                    message: format!("{} 晚于 {}", start, end),
                });
            }
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "refresh_interval_secs".to_string(),
                message: "必须大于 0".to_string(),
            });
        }
        for (key, value) in [
            ("kg_line_code", &self.kg_line_code),
            ("primary_line_code", &self.primary_line_code),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: key.to_string(),
                    message: "不能为空".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn source_db_path(&self) -> PathBuf {
        self.source_db_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("production_mirror.db"))
    }

    pub fn source_settings(&self) -> SourceSettings {
        SourceSettings {
            line_codes: self.line_codes.clone(),
            row_limit: self.row_limit,
            start_month: self.start_month.clone(),
            end_month: self.end_month.clone(),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs.max(1))
    }

    /// 是否启用编辑锁
    pub fn edit_locked(&self) -> bool {
        self.edit_password
            .as_deref()
            .map_or(false, |p| !p.is_empty())
    }
}

/// 默认数据目录: 用户数据目录下的 daily-report；取不到时使用当前目录下的 data
pub fn default_data_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => {
            #[cfg(debug_assertions)]
            {
                dir.join("daily-report-dev")
            }

            #[cfg(not(debug_assertions))]
            {
                dir.join("daily-report")
            }
        }
        None => PathBuf::from("./data"),
    }
}
