//! 底图与瓦片源注册
//!
//! 默认底图加上按名称注册的额外瓦片源。底图之间互斥（单选），叠加层可独立开关。

use crate::core::{AppError, AppResult};
use crate::models::{Basemap, TileRole, TileSource};

/// 瓦片源注册表
#[derive(Debug, Clone)]
pub struct TileRegistry {
    default_basemap: Basemap,
    sources: Vec<TileSource>,
}

impl TileRegistry {
    /// 只包含默认底图的注册表
    pub fn new(default_basemap: Basemap) -> Self {
        let mut registry = Self {
            default_basemap,
            sources: Vec::new(),
        };
        registry.add_basemap(default_basemap);
        registry
    }

    /// 注册全部内置底图，默认底图排在第一位
    pub fn with_builtin(default_basemap: Basemap) -> Self {
        let mut registry = Self::new(default_basemap);
        for basemap in Basemap::ALL {
            registry.add_basemap(basemap);
        }
        registry
    }

    /// 注册内置底图，已注册的同名底图会被忽略
    pub fn add_basemap(&mut self, basemap: Basemap) {
        if self.get(basemap.display_name()).is_some() {
            return;
        }
        self.sources.push(TileSource {
            url: basemap.url_template().to_string(),
            name: basemap.display_name().to_string(),
            attribution: basemap.attribution().to_string(),
            shown: basemap == self.default_basemap,
            role: TileRole::Base,
        });
    }

    /// 注册额外瓦片源
    ///
    /// URL 模板必须包含 `{x}`、`{y}`、`{z}`，名称不能与已有瓦片源重复。
    pub fn add_tile_layer(&mut self, source: TileSource) -> AppResult<()> {
        if !source.has_placeholders() {
            return Err(AppError::Config {
                reason: format!("瓦片源 {} 的 URL 模板缺少 {{x}}/{{y}}/{{z}} 占位符", source.name),
            });
        }
        if self.get(&source.name).is_some() {
            return Err(AppError::Config {
                reason: format!("瓦片源名称重复: {}", source.name),
            });
        }
        tracing::debug!(name = %source.name, role = ?source.role, "注册瓦片源");
        self.sources.push(source);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TileSource> {
        self.sources.iter().find(|s| s.name == name)
    }

    pub fn sources(&self) -> &[TileSource] {
        &self.sources
    }

    pub fn base_layers(&self) -> impl Iterator<Item = &TileSource> {
        self.sources.iter().filter(|s| s.role == TileRole::Base)
    }

    pub fn overlays(&self) -> impl Iterator<Item = &TileSource> {
        self.sources.iter().filter(|s| s.role == TileRole::Overlay)
    }

    pub fn default_basemap(&self) -> Basemap {
        self.default_basemap
    }

    /// 当前生效的底图名称
    pub fn active_base_name(&self) -> &'static str {
        self.default_basemap.display_name()
    }
}
