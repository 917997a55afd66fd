//! 缓存层实现
//!
//! - `lru`: 通用 LRU 缓存（容量限制 + 可选 TTL）
//! - `table_cache`: 按路径缓存几何表（文件指纹校验）

pub mod lru;
pub mod table_cache;

pub use lru::LruCache;
pub use table_cache::{FileFingerprint, TableCache};
