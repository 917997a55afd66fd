// 服务层模块
//
// - style: 图层样式解析
// - tiles: 底图与瓦片源注册
// - filter: 图层过滤状态机
// - export: KML 导出
// - composition: 地图组合
// - page: 页面状态与渲染输出
// - map_service: 汇总以上能力的地图服务

pub mod composition;
pub mod export;
pub mod filter;
pub mod map_service;
pub mod page;
pub mod style;
pub mod tiles;

pub use composition::{MapComposition, MapView, TileLayerView, VectorLayerView};
pub use export::{export_file_name, KmlExport, KML_MIME};
pub use filter::{FilterController, LayerEvent, LayerState, LayerStatus};
pub use map_service::MapService;
pub use page::{ExportLink, LayerPanel, PageEvent, PageState, RenderOutput, RenderRequest};
pub use style::{normalize_layer_name, StyleResolver};
pub use tiles::TileRegistry;
