//! 应用配置数据模型
//!
//! 对应 `~/.nepalmap/config.toml`，所有字段都有默认值，缺失的段落使用默认配置。

use super::tile::{Basemap, TileSource};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 顶层配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub map: MapConfig,
    pub cache: CacheConfig,
    pub log: LogConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

/// 地图与数据配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub title: String,
    /// 边界 GeoJSON 所在目录
    pub data_dir: PathBuf,
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    /// 地图高度（像素）
    pub height: u32,
    pub default_basemap: Basemap,
    /// 额外瓦片源，`[[map.tile_layers]]`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tile_layers: Vec<TileSource>,
}

impl Default for MapConfig {
    fn default() -> Self {
        // 加德满都
        Self {
            title: "Full-Screen Web Map Application with XYZ Tiles".to_string(),
            data_dir: PathBuf::from("data"),
            center_lat: 27.7172,
            center_lon: 85.3240,
            zoom: 10,
            height: 800,
            default_basemap: Basemap::OpenStreetMap,
            tile_layers: Vec::new(),
        }
    }
}

/// 图层缓存配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub layer_capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            layer_capacity: 5,
            ttl_secs: None,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// 日志输出目标
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Console,
    File,
    Both,
}

/// 日志配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// 日志目录，未设置时使用 `~/.nepalmap/logs`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TileRole;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.map.zoom, 10);
        assert_eq!(config.map.height, 800);
        assert_eq!(config.map.data_dir, PathBuf::from("data"));
        assert_eq!(config.map.default_basemap, Basemap::OpenStreetMap);
        assert!(config.map.tile_layers.is_empty());
        assert_eq!(config.cache.layer_capacity, 5);
        assert_eq!(config.cache.ttl(), None);
        assert_eq!(config.log.level, LogLevel::Info);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [map]
            default_basemap = "google_satellite"

            [cache]
            ttl_secs = 600

            [log]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.map.default_basemap, Basemap::GoogleSatellite);
        assert_eq!(config.map.center_lat, 27.7172);
        assert_eq!(config.cache.layer_capacity, 5);
        assert_eq!(config.cache.ttl(), Some(Duration::from_secs(600)));
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.output, LogOutput::Console);
    }

    #[test]
    fn test_tile_layers_table_array() {
        let config: AppConfig = toml::from_str(
            r#"
            [[map.tile_layers]]
            name = "Hillshade"
            url = "https://tiles.example/hillshade/{z}/{x}/{y}.png"
            attribution = "© Example"
            shown = true

            [[map.tile_layers]]
            name = "Esri Imagery"
            url = "https://server.example/tile/{z}/{y}/{x}"
            role = "base"
            "#,
        )
        .unwrap();

        let layers = &config.map.tile_layers;
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].name, "Hillshade");
        assert_eq!(layers[0].role, TileRole::Overlay);
        assert!(layers[0].shown);
        assert_eq!(layers[1].role, TileRole::Base);
        assert!(!layers[1].shown);
        assert_eq!(config.map.zoom, 10);
    }

    #[test]
    fn test_unknown_basemap_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[map]\ndefault_basemap = \"bing\"");
        assert!(result.is_err());
    }
}
