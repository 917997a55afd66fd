//! 瓦片源数据模型

use serde::{Deserialize, Serialize};

/// 内置底图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basemap {
    #[default]
    #[serde(rename = "openstreetmap")]
    OpenStreetMap,
    GoogleMaps,
    GoogleSatellite,
}

impl Basemap {
    pub const ALL: [Basemap; 3] = [
        Basemap::OpenStreetMap,
        Basemap::GoogleMaps,
        Basemap::GoogleSatellite,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Basemap::OpenStreetMap => "OpenStreetMap",
            Basemap::GoogleMaps => "Google Maps",
            Basemap::GoogleSatellite => "Google Satellite",
        }
    }

    pub fn url_template(self) -> &'static str {
        match self {
            Basemap::OpenStreetMap => "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            Basemap::GoogleMaps => "https://mt1.google.com/vt/lyrs=r&x={x}&y={y}&z={z}",
            Basemap::GoogleSatellite => "https://mt1.google.com/vt/lyrs=s&x={x}&y={y}&z={z}",
        }
    }

    pub fn attribution(self) -> &'static str {
        match self {
            Basemap::OpenStreetMap => "© OpenStreetMap contributors",
            Basemap::GoogleMaps | Basemap::GoogleSatellite => "© Google",
        }
    }
}

/// 瓦片图层在图层控件中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileRole {
    /// 底图，同一时间只有一个生效（单选）
    Base,
    /// 叠加层，可独立开关（复选）
    #[default]
    Overlay,
}

/// 瓦片源描述
///
/// 也用于配置文件中的 `[[map.tile_layers]]`，省略 `role` 时为叠加层。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSource {
    /// 包含 `{x}`、`{y}`、`{z}` 占位符的 URL 模板
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub attribution: String,
    #[serde(default)]
    pub shown: bool,
    #[serde(default)]
    pub role: TileRole,
}

impl TileSource {
    /// 模板是否包含全部三个占位符
    pub fn has_placeholders(&self) -> bool {
        ["{x}", "{y}", "{z}"].iter().all(|p| self.url.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_required() {
        let mut source = TileSource {
            url: "https://mt1.google.com/vt/lyrs=s&x={x}&y={y}&z={z}".to_string(),
            name: "Google Satellite".to_string(),
            attribution: "© Google".to_string(),
            shown: false,
            role: TileRole::Overlay,
        };
        assert!(source.has_placeholders());

        source.url = "https://tiles.example/{z}/{x}.png".to_string();
        assert!(!source.has_placeholders());
    }

    #[test]
    fn test_source_defaults_to_hidden_overlay() {
        let source: TileSource =
            serde_json::from_str(r#"{"url": "https://a/{z}/{x}/{y}.png", "name": "Hillshade"}"#)
                .unwrap();
        assert_eq!(source.role, TileRole::Overlay);
        assert!(!source.shown);
        assert!(source.attribution.is_empty());
    }
}
