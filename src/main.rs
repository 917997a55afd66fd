use anyhow::{Context, Result};
use std::sync::Arc;

use nepalmap::utils::config::{config_path, load_config};
use nepalmap::{init_logger, MapServer, MapService};

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("加载配置失败")?;
    init_logger(&config.log).context("初始化日志系统失败")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path().map(|p| p.display().to_string()).unwrap_or_default(),
        "应用启动"
    );

    let service = MapService::new(config.clone()).context("创建地图服务失败")?;
    let server = MapServer::new(config.server.clone(), Arc::new(service));
    let addr = server.start().await?;

    println!("地图已启动: http://{addr}");

    wait_for_shutdown().await?;

    tracing::info!("收到退出信号");
    server.stop().await?;
    Ok(())
}

/// 等待 Ctrl+C；期间每收到一次 SIGHUP 就重新读取配置中的日志级别
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup()).context("注册 SIGHUP 失败")?;
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                return result.context("等待退出信号失败");
            }
            _ = hangup.recv() => reload_log_level(),
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("等待退出信号失败")
}

#[cfg(unix)]
fn reload_log_level() {
    use nepalmap::update_log_level;

    let level = match load_config() {
        Ok(config) => config.log.level,
        Err(e) => {
            tracing::warn!(error = %e, "重新加载配置失败，保持当前日志级别");
            return;
        }
    };
    if let Err(e) = update_log_level(level) {
        tracing::warn!(error = %e, "更新日志级别失败");
    }
}
