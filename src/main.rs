// ==========================================
// 工厂日报系统 - 服务主入口
// ==========================================
// 技术栈: axum + tokio + JSON 文档存储 + SQLite 镜像
// 系统定位: 计划/实绩对比看板
// ==========================================

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use daily_report::app::{build_router, AppState};
use daily_report::config::AppConfig;
use daily_report::engine::spawn_refresh_loop;
use daily_report::{i18n, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    if std::env::var("DAILY_REPORT_LOG_JSON").map_or(false, |v| v == "1") {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("==================================================");
    tracing::info!("{}", daily_report::APP_NAME);
    tracing::info!("系统版本: {}", daily_report::VERSION);
    tracing::info!("==================================================");

    let config = AppConfig::from_env().context("配置加载失败")?;
    i18n::set_locale(&config.locale);
    if config.edit_locked() {
        tracing::info!("编辑锁已启用");
    }

    // 创建AppState
    let state = AppState::new(config.clone())
        .map_err(anyhow::Error::msg)
        .context("无法初始化AppState")?;
    let state = Arc::new(state);

    // 快照预热，后台循环第一次 tick 触发全量加载
    let loaded = state.reconciler.load_snapshot();
    tracing::info!("快照预热: {} 条", loaded);
    let refresher = spawn_refresh_loop(state.reconciler.clone(), config.refresh_interval());

    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("端口绑定失败: {}", addr))?;
    tracing::info!("服务已启动: http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("等待退出信号失败: {}", e);
            }
            tracing::info!("收到退出信号，停止服务");
        })
        .await
        .context("HTTP 服务异常退出")?;

    refresher.abort();
    Ok(())
}
