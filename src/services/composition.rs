//! 地图组合
//!
//! 把底图、瓦片源和带样式的矢量图层汇总为一个 `MapView`，由前端页面据此构建
//! Leaflet 图层控件：底图为单选，叠加层与矢量图层为复选。

use serde::Serialize;

use crate::core::{AppError, AppResult};
use crate::models::{LayerDescriptor, LayerKind, MapConfig, StyleDescriptor};
use crate::services::tiles::TileRegistry;

/// 瓦片图层视图
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayerView {
    pub name: String,
    pub url: String,
    pub attribution: String,
    pub active: bool,
}

/// 矢量图层视图
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorLayerView {
    pub kind: LayerKind,
    pub slug: &'static str,
    pub name: String,
    pub style: StyleDescriptor,
    pub shown: bool,
    /// GeoJSON 数据地址，前端按当前过滤条件追加查询参数
    pub data_url: String,
}

/// 组合后的地图
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub title: String,
    pub center: [f64; 2],
    pub zoom: u8,
    pub height: u32,
    pub base_layers: Vec<TileLayerView>,
    pub overlays: Vec<TileLayerView>,
    pub vector_layers: Vec<VectorLayerView>,
}

impl MapView {
    pub fn active_base(&self) -> Option<&TileLayerView> {
        self.base_layers.iter().find(|b| b.active)
    }
}

pub struct MapComposition;

impl MapComposition {
    /// 组合地图
    ///
    /// 只有配置的默认底图被标记为生效；注册表中没有任何底图时视为配置错误。
    pub fn compose(
        map: &MapConfig,
        tiles: &TileRegistry,
        layers: &[LayerDescriptor],
    ) -> AppResult<MapView> {
        let active_name = tiles.active_base_name();

        let base_layers: Vec<TileLayerView> = tiles
            .base_layers()
            .map(|source| TileLayerView {
                name: source.name.clone(),
                url: source.url.clone(),
                attribution: source.attribution.clone(),
                active: source.name == active_name,
            })
            .collect();

        if !base_layers.iter().any(|b| b.active) {
            return Err(AppError::Config {
                reason: format!("默认底图 {active_name} 未注册"),
            });
        }

        let overlays = tiles
            .overlays()
            .map(|source| TileLayerView {
                name: source.name.clone(),
                url: source.url.clone(),
                attribution: source.attribution.clone(),
                active: source.shown,
            })
            .collect();

        let vector_layers = layers
            .iter()
            .map(|layer| VectorLayerView {
                kind: layer.kind,
                slug: layer.kind.slug(),
                name: layer.name.clone(),
                style: layer.style.clone(),
                shown: layer.kind.shown_by_default(),
                data_url: format!("/api/layers/{}/features", layer.kind.slug()),
            })
            .collect();

        Ok(MapView {
            title: map.title.clone(),
            center: [map.center_lat, map.center_lon],
            zoom: map.zoom,
            height: map.height,
            base_layers,
            overlays,
            vector_layers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Basemap, TileRole, TileSource};
    use crate::services::style::StyleResolver;
    use std::path::PathBuf;

    fn layers() -> Vec<LayerDescriptor> {
        LayerKind::ALL
            .into_iter()
            .map(|kind| LayerDescriptor {
                kind,
                name: kind.display_name().to_string(),
                source: PathBuf::from("data").join(kind.file_name()),
                style: StyleResolver::style_for(kind),
            })
            .collect()
    }

    #[test]
    fn test_exactly_one_active_base() {
        let map = MapConfig::default();
        let tiles = TileRegistry::with_builtin(Basemap::OpenStreetMap);
        let view = MapComposition::compose(&map, &tiles, &layers()).unwrap();

        assert_eq!(view.base_layers.len(), 3);
        assert_eq!(view.base_layers.iter().filter(|b| b.active).count(), 1);
        assert_eq!(view.active_base().unwrap().name, "OpenStreetMap");
        assert_eq!(view.center, [27.7172, 85.3240]);
        assert_eq!(view.zoom, 10);
    }

    #[test]
    fn test_vector_layers_carry_style_and_visibility() {
        let map = MapConfig::default();
        let tiles = TileRegistry::with_builtin(Basemap::OpenStreetMap);
        let view = MapComposition::compose(&map, &tiles, &layers()).unwrap();

        assert_eq!(view.vector_layers.len(), 5);
        let ward = view
            .vector_layers
            .iter()
            .find(|l| l.kind == LayerKind::Ward)
            .unwrap();
        assert!(!ward.shown);
        assert_eq!(ward.data_url, "/api/layers/ward/features");
        assert_eq!(ward.style, StyleResolver::style_for(LayerKind::Ward));

        let province = &view.vector_layers[1];
        assert!(province.shown);
    }

    #[test]
    fn test_overlays_listed_separately() {
        let map = MapConfig::default();
        let mut tiles = TileRegistry::with_builtin(Basemap::GoogleMaps);
        tiles
            .add_tile_layer(TileSource {
                url: "https://tiles.example/hillshade/{z}/{x}/{y}.png".to_string(),
                name: "Hillshade".to_string(),
                attribution: "example".to_string(),
                shown: true,
                role: TileRole::Overlay,
            })
            .unwrap();

        let view = MapComposition::compose(&map, &tiles, &[]).unwrap();
        assert_eq!(view.overlays.len(), 1);
        assert!(view.overlays[0].active);
        assert_eq!(view.active_base().unwrap().name, "Google Maps");
    }

    #[test]
    fn test_serializes_for_frontend() {
        let map = MapConfig::default();
        let tiles = TileRegistry::new(Basemap::OpenStreetMap);
        let view = MapComposition::compose(&map, &tiles, &layers()).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["vector_layers"][0]["slug"], "national");
        assert_eq!(json["vector_layers"][1]["style"]["dash_array"][0], 10.0);
    }
}
