// 地图服务
//
// 汇总配置、图层加载器、瓦片注册表和图层描述，对外提供页面渲染、要素查询和 KML 导出。
// 除注入的几何表缓存外不保存任何跨请求状态。

use geojson::FeatureCollection;
use std::sync::Arc;

use crate::core::{AppError, AppResult};
use crate::data::{FilterSelection, GeometryTable, LayerLoader, TableCache};
use crate::models::{AppConfig, LayerDescriptor, LayerKind};
use crate::services::composition::{MapComposition, MapView};
use crate::services::export::{self, KmlExport};
use crate::services::filter::{FilterController, LayerEvent};
use crate::services::page::{layer_url, ExportLink, LayerPanel, RenderOutput, RenderRequest};
use crate::services::style::StyleResolver;
use crate::services::tiles::TileRegistry;

pub struct MapService {
    config: AppConfig,
    loader: LayerLoader,
    tiles: TileRegistry,
    layers: Vec<LayerDescriptor>,
}

impl MapService {
    /// 根据配置创建服务，图层描述在此静态生成
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let cache = TableCache::new(config.cache.layer_capacity, config.cache.ttl());
        let mut tiles = TileRegistry::with_builtin(config.map.default_basemap);
        for source in &config.map.tile_layers {
            tiles.add_tile_layer(source.clone())?;
        }

        let layers = LayerKind::ALL
            .into_iter()
            .map(|kind| {
                let name = kind.display_name();
                Ok(LayerDescriptor {
                    kind,
                    name: name.to_string(),
                    source: config.map.data_dir.join(kind.file_name()),
                    style: StyleResolver::resolve(name)?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        tracing::info!(
            data_dir = %config.map.data_dir.display(),
            layers = layers.len(),
            cache_capacity = cache.capacity(),
            basemap = tiles.active_base_name(),
            tile_layers = config.map.tile_layers.len(),
            "地图服务已创建"
        );

        Ok(Self {
            config,
            loader: LayerLoader::new(cache),
            tiles,
            layers,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn loader(&self) -> &LayerLoader {
        &self.loader
    }

    pub fn tiles(&self) -> &TileRegistry {
        &self.tiles
    }

    pub fn layers(&self) -> &[LayerDescriptor] {
        &self.layers
    }

    pub fn layer(&self, kind: LayerKind) -> AppResult<&LayerDescriptor> {
        self.layers
            .iter()
            .find(|l| l.kind == kind)
            .ok_or_else(|| AppError::UnknownLayer {
                name: kind.display_name().to_string(),
            })
    }

    /// 按 URL 标识查找图层
    pub fn layer_by_slug(&self, slug: &str) -> AppResult<&LayerDescriptor> {
        let kind = LayerKind::from_slug(slug).ok_or_else(|| AppError::UnknownLayer {
            name: slug.to_string(),
        })?;
        self.layer(kind)
    }

    /// 加载图层的几何表（经过缓存）
    pub fn table(&self, kind: LayerKind) -> AppResult<Arc<GeometryTable>> {
        let layer = self.layer(kind)?;
        Ok(self.loader.load(layer.source())?)
    }

    /// 组合地图
    pub fn map_view(&self) -> AppResult<MapView> {
        MapComposition::compose(&self.config.map, &self.tiles, &self.layers)
    }

    /// 处理一次页面交互：归约事件并重新渲染所有图层面板
    pub fn render(&self, request: RenderRequest) -> AppResult<RenderOutput> {
        let mut state = request.state.unwrap_or_default().normalized();

        if let Some(page_event) = request.event {
            let current = state.layer(page_event.layer);
            let needs_table =
                current.is_visible() || matches!(page_event.event, LayerEvent::Show);
            let table = if needs_table {
                Some(self.table(page_event.layer)?)
            } else {
                None
            };

            tracing::debug!(layer = ?page_event.layer, event = ?page_event.event, "页面事件");
            let next = FilterController::step(current, &page_event.event, table.as_deref());
            state.layers.insert(page_event.layer, next);
        }

        let mut panels = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let layer_state = state.layer(layer.kind);
            if !layer_state.is_visible() {
                panels.push(LayerPanel::hidden(layer));
                continue;
            }

            let table = self.loader.load(layer.source())?;
            let resolved = FilterController::resolve_selection(layer_state, &table);
            let view = table.view(resolved.active_filter());

            let export = (!view.is_empty()).then(|| ExportLink {
                file_name: export::export_file_name(&layer.name),
                url: layer_url(layer.kind, "export", resolved.active_filter()),
            });

            panels.push(LayerPanel {
                kind: layer.kind,
                slug: layer.kind.slug(),
                name: layer.name.clone(),
                visible: true,
                style: layer.style.clone(),
                attributes: table.columns().to_vec(),
                values: resolved
                    .attribute
                    .as_deref()
                    .map(|attr| table.distinct_values(attr))
                    .unwrap_or_default(),
                selected_attribute: resolved.attribute.clone(),
                selected_value: resolved.value.clone(),
                filter: resolved.active_filter().cloned(),
                feature_count: view.len(),
                total_count: table.len(),
                export,
            });

            state.layers.insert(layer.kind, resolved);
        }

        Ok(RenderOutput {
            state,
            layers: panels,
        })
    }

    /// 图层（可选过滤后）的 GeoJSON
    pub fn features(
        &self,
        kind: LayerKind,
        filter: Option<&FilterSelection>,
    ) -> AppResult<FeatureCollection> {
        let table = self.table(kind)?;
        let collection = table.view(filter).to_feature_collection();
        Ok(collection)
    }

    /// 导出图层（可选过滤后）为 KML，视图为空时返回 `None`
    pub fn export(
        &self,
        kind: LayerKind,
        filter: Option<&FilterSelection>,
    ) -> AppResult<Option<KmlExport>> {
        let layer = self.layer(kind)?;
        let table = self.loader.load(layer.source())?;
        let view = table.view(filter);
        export::export_view(&layer.name, &view)
    }
}
