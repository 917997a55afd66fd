use crate::models::config::{LogConfig, LogFormat, LogLevel, LogOutput};
use std::sync::OnceLock;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    reload::{self, Handle},
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// 全局日志级别 reload handle
static LOG_LEVEL_HANDLE: OnceLock<Handle<EnvFilter, Registry>> = OnceLock::new();

/// 初始化日志系统
///
/// 支持基于配置的日志输出，包括：
/// - 日志级别（trace/debug/info/warn/error）
/// - 输出格式（JSON/纯文本）
/// - 输出目标（控制台/文件/both）
///
/// 日志级别可以通过 `update_log_level` 热更新，其余配置需要重启服务后生效。
pub fn init_logger(config: &LogConfig) -> anyhow::Result<()> {
    let filter = create_env_filter(&config.level);
    let (filter_layer, reload_handle) = reload::Layer::new(filter);

    if LOG_LEVEL_HANDLE.set(reload_handle).is_err() {
        anyhow::bail!("日志系统已初始化，不能重复初始化");
    }

    match (&config.output, &config.format) {
        (LogOutput::Console, LogFormat::Text) => {
            Registry::default()
                .with(filter_layer)
                .with(create_console_text_layer())
                .init();
        }
        (LogOutput::Console, LogFormat::Json) => {
            Registry::default()
                .with(filter_layer)
                .with(create_console_json_layer())
                .init();
        }
        (LogOutput::File, LogFormat::Text) => {
            let file_layer = create_file_layer(config.file_path.as_deref(), false)?;
            Registry::default()
                .with(filter_layer)
                .with(file_layer)
                .init();
        }
        (LogOutput::File, LogFormat::Json) => {
            let file_layer = create_file_layer(config.file_path.as_deref(), true)?;
            Registry::default()
                .with(filter_layer)
                .with(file_layer)
                .init();
        }
        (LogOutput::Both, LogFormat::Text) => {
            let file_layer = create_file_layer(config.file_path.as_deref(), false)?;
            Registry::default()
                .with(filter_layer)
                .with(create_console_text_layer())
                .with(file_layer)
                .init();
        }
        (LogOutput::Both, LogFormat::Json) => {
            let file_layer = create_file_layer(config.file_path.as_deref(), true)?;
            Registry::default()
                .with(filter_layer)
                .with(create_console_json_layer())
                .with(file_layer)
                .init();
        }
    }

    tracing::info!(
        level = config.level.as_str(),
        format = ?config.format,
        output = ?config.output,
        file_path = ?config.file_path,
        "日志系统初始化完成"
    );

    Ok(())
}

/// 创建环境过滤器
///
/// `RUST_LOG` 优先；否则应用代码使用配置级别，hyper 只输出 WARN 以上。
fn create_env_filter(level: &LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

fn default_directives(level: &LogLevel) -> String {
    format!("nepalmap={},hyper=warn,tokio=warn", level.as_str())
}

fn create_console_text_layer<S>() -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(cfg!(debug_assertions))
        .with_thread_ids(false)
        .with_ansi(true)
        .with_span_events(if cfg!(debug_assertions) {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .boxed()
}

fn create_console_json_layer<S>() -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .json()
        .with_writer(std::io::stdout)
        .with_target(cfg!(debug_assertions))
        .with_thread_ids(false)
        .boxed()
}

/// 创建按天滚动的文件输出层
fn create_file_layer<S>(
    file_path: Option<&str>,
    json: bool,
) -> anyhow::Result<Box<dyn Layer<S> + Send + Sync + 'static>>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let log_dir = get_log_dir(file_path)?;
    let file_appender = rolling::daily(log_dir, "nepalmap");
    let (non_blocking, guard) = non_blocking(file_appender);

    // guard 被 drop 后后台写线程会退出，进程生命周期内保留
    Box::leak(Box::new(guard));

    let layer = if json {
        fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(non_blocking)
            .with_target(cfg!(debug_assertions))
            .with_thread_ids(false)
            .with_ansi(false)
            .boxed()
    };
    Ok(layer)
}

/// 获取日志目录，默认 `~/.nepalmap/logs`
fn get_log_dir(file_path: Option<&str>) -> anyhow::Result<std::path::PathBuf> {
    let dir = match file_path {
        Some(path) => std::path::PathBuf::from(path),
        None => dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("无法获取用户主目录"))?
            .join(".nepalmap")
            .join("logs"),
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// 动态更新日志级别（热重载）
pub fn update_log_level(new_level: LogLevel) -> anyhow::Result<()> {
    let handle = LOG_LEVEL_HANDLE
        .get()
        .ok_or_else(|| anyhow::anyhow!("日志系统未初始化"))?;

    handle
        .reload(create_env_filter(&new_level))
        .map_err(|e| anyhow::anyhow!("重载日志级别失败: {}", e))?;

    tracing::info!(new_level = new_level.as_str(), "日志级别已动态更新");
    Ok(())
}
