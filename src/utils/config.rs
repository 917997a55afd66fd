use crate::core::{AppError, AppResult};
use crate::models::config::AppConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// 指定配置文件路径的环境变量
pub const CONFIG_ENV: &str = "NEPALMAP_CONFIG";

/// 配置目录 (~/.nepalmap)
pub fn config_dir() -> AppResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| AppError::Config {
        reason: "无法获取用户主目录".to_string(),
    })?;
    Ok(home_dir.join(".nepalmap"))
}

/// 配置文件路径：优先使用 `NEPALMAP_CONFIG`，否则为 `~/.nepalmap/config.toml`
pub fn config_path() -> AppResult<PathBuf> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(config_dir()?.join("config.toml")),
    }
}

/// 读取配置（文件不存在时返回默认配置）
pub fn load_config() -> AppResult<AppConfig> {
    load_config_from(&config_path()?)
}

/// 从指定路径读取配置
pub fn load_config_from(path: &Path) -> AppResult<AppConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "配置文件不存在，使用默认配置");
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| AppError::Config {
        reason: format!("读取配置失败 {}: {e}", path.display()),
    })?;
    let config: AppConfig = toml::from_str(&content).map_err(|e| AppError::Config {
        reason: format!("解析配置失败 {}: {e}", path.display()),
    })?;

    tracing::debug!(path = %path.display(), "已加载配置文件");
    Ok(config)
}
