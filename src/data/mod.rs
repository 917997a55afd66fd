//! 图层数据模块
//!
//! # 模块组织
//!
//! - `error`: 数据层错误类型
//! - `table`: 几何表、过滤条件与过滤视图
//! - `cache`: LRU 缓存与按路径的几何表缓存
//! - `loader`: 静态图层加载器

pub mod cache;
pub mod error;
pub mod loader;
pub mod table;

pub use cache::TableCache;
pub use error::{DataError, Result};
pub use loader::LayerLoader;
pub use table::{FeatureRecord, FilterSelection, FilteredView, GeometryTable};
