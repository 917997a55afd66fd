//! 几何表缓存
//!
//! 按文件路径缓存已解析的几何表，支持：
//! - LRU 容量限制（默认 5 个文件）
//! - 文件指纹校验（修改时间 + 文件大小），文件变更后自动失效
//! - 线程安全访问
//!
//! 命中时返回同一个 `Arc<GeometryTable>`，调用方可以用 `Arc::ptr_eq` 确认没有重复解析。

use super::LruCache;
use crate::data::table::GeometryTable;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime};

/// 文件指纹，只依赖元数据，不读取文件内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileFingerprint {
    /// 读取文件当前指纹
    pub fn of(path: &Path) -> std::io::Result<Self> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

#[derive(Debug)]
struct CachedTable {
    table: Arc<GeometryTable>,
    fingerprint: FileFingerprint,
}

/// 几何表缓存
#[derive(Debug, Clone)]
pub struct TableCache {
    cache: Arc<RwLock<LruCache<PathBuf, CachedTable>>>,
}

impl TableCache {
    /// 创建新的几何表缓存
    ///
    /// - `capacity`: 最多缓存的文件数
    /// - `ttl`: 条目生存时间，`None` 表示只按容量淘汰
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(LruCache::new(capacity, ttl))),
        }
    }

    /// 获取缓存的几何表
    ///
    /// # 返回
    ///
    /// - `Some(table)`: 命中且文件未变更
    /// - `None`: 未命中、已过期，或文件已变更/删除（此时条目被移除）
    pub fn get(&self, path: &Path) -> Option<Arc<GeometryTable>> {
        let key = path.to_path_buf();
        let (table, stored) = {
            let mut cache = self.cache.write().ok()?;
            let entry = cache.get(&key)?;
            (Arc::clone(&entry.table), entry.fingerprint)
        };

        match FileFingerprint::of(path) {
            Ok(current) if current == stored => Some(table),
            _ => {
                self.invalidate(path);
                None
            }
        }
    }

    /// 插入缓存
    pub fn insert(&self, path: PathBuf, table: Arc<GeometryTable>, fingerprint: FileFingerprint) {
        if let Ok(mut cache) = self.cache.write() {
            if let Some((evicted, _)) = cache.insert(path, CachedTable { table, fingerprint }) {
                tracing::debug!(path = %evicted.display(), "几何表缓存淘汰");
            }
        }
    }

    /// 使指定路径的缓存失效
    pub fn invalidate(&self, path: &Path) {
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(&path.to_path_buf());
        }
    }

    /// 清空所有缓存
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// 是否缓存了指定路径（不刷新 LRU 位置）
    pub fn contains(&self, path: &Path) -> bool {
        self.cache
            .read()
            .map(|c| c.peek(&path.to_path_buf()).is_some())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.cache.read().map(|c| c.capacity()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_table(dir: &TempDir, name: &str, body: &str) -> (PathBuf, Arc<GeometryTable>) {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        let table = Arc::new(GeometryTable::from_records(&path, Vec::new()));
        (path, table)
    }

    #[test]
    fn test_hit_returns_same_arc() {
        let cache = TableCache::new(5, None);
        let dir = TempDir::new().unwrap();
        let (path, table) = write_table(&dir, "Province.geojson", "{}");

        cache.insert(path.clone(), Arc::clone(&table), FileFingerprint::of(&path).unwrap());

        let hit = cache.get(&path).unwrap();
        assert!(Arc::ptr_eq(&hit, &table));
    }

    #[test]
    fn test_cache_miss() {
        let cache = TableCache::new(5, None);
        let dir = TempDir::new().unwrap();
        assert!(cache.get(&dir.path().join("Ward.geojson")).is_none());
    }

    #[test]
    fn test_file_change_detection() {
        let cache = TableCache::new(5, None);
        let dir = TempDir::new().unwrap();
        let (path, table) = write_table(&dir, "District.geojson", "{}");
        cache.insert(path.clone(), table, FileFingerprint::of(&path).unwrap());
        assert!(cache.get(&path).is_some());

        // 长度变化即可改变指纹
        fs::write(&path, "{\"changed\": true}").unwrap();

        assert!(cache.get(&path).is_none());
        assert!(!cache.contains(&path));
    }

    #[test]
    fn test_deleted_file_invalidation() {
        let cache = TableCache::new(5, None);
        let dir = TempDir::new().unwrap();
        let (path, table) = write_table(&dir, "Ward.geojson", "{}");
        cache.insert(path.clone(), table, FileFingerprint::of(&path).unwrap());

        fs::remove_file(&path).unwrap();

        assert!(cache.get(&path).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_limit() {
        let cache = TableCache::new(3, None);
        let dir = TempDir::new().unwrap();

        let mut paths = Vec::new();
        for i in 0..4 {
            let (path, table) = write_table(&dir, &format!("layer{i}.geojson"), "{}");
            cache.insert(path.clone(), table, FileFingerprint::of(&path).unwrap());
            paths.push(path);
        }

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.capacity(), 3);
        assert!(!cache.contains(&paths[0]));
        assert!(cache.contains(&paths[3]));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = TableCache::new(5, None);
        let dir = TempDir::new().unwrap();
        let (a, ta) = write_table(&dir, "a.geojson", "{}");
        let (b, tb) = write_table(&dir, "b.geojson", "{}");
        cache.insert(a.clone(), ta, FileFingerprint::of(&a).unwrap());
        cache.insert(b.clone(), tb, FileFingerprint::of(&b).unwrap());

        cache.invalidate(&a);
        assert!(!cache.contains(&a));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
