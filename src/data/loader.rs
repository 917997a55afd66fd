//! 静态图层加载器
//!
//! 从固定路径读取 GeoJSON 边界文件并解析为几何表。已缓存的路径不会重复读取或解析；
//! 文件不可读或格式错误时直接返回错误，不做部分恢复。

use crate::data::cache::{FileFingerprint, TableCache};
use crate::data::table::GeometryTable;
use crate::data::{DataError, Result};
use geojson::GeoJson;
use std::fs;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 图层加载器
///
/// 缓存由调用方注入，多个加载器可以共享同一个 `TableCache`。
#[derive(Debug)]
pub struct LayerLoader {
    cache: TableCache,
    load_count: AtomicUsize,
}

impl LayerLoader {
    pub fn new(cache: TableCache) -> Self {
        Self {
            cache,
            load_count: AtomicUsize::new(0),
        }
    }

    /// 加载几何表
    ///
    /// 命中缓存时返回缓存中的同一个 `Arc`；未命中时读取并解析文件后写入缓存。
    pub fn load(&self, path: &Path) -> Result<Arc<GeometryTable>> {
        if let Some(table) = self.cache.get(path) {
            tracing::trace!(path = %path.display(), "几何表缓存命中");
            return Ok(table);
        }

        let fingerprint = FileFingerprint::of(path).map_err(|e| DataError::io(path, e))?;
        let table = Arc::new(parse_file(path)?);
        self.load_count.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            path = %path.display(),
            features = table.len(),
            columns = table.columns().len(),
            "几何表已加载"
        );

        self.cache
            .insert(path.to_path_buf(), Arc::clone(&table), fingerprint);
        Ok(table)
    }

    /// 实际解析文件的次数（缓存命中不计数）
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::Relaxed)
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }
}

fn parse_file(path: &Path) -> Result<GeometryTable> {
    let file = fs::File::open(path).map_err(|e| DataError::io(path, e))?;
    let geojson = GeoJson::from_reader(BufReader::new(file))
        .map_err(|e| DataError::geojson(path, geojson::Error::MalformedJson(e)))?;
    Ok(GeometryTable::from_geojson(path, geojson))
}
