//! 通用 LRU 缓存实现
//!
//! 提供基于 LRU (Least Recently Used) 淘汰策略的缓存，支持：
//! - 容量限制：超过容量自动淘汰最久未使用的项
//! - 可选 TTL：未设置 TTL 时条目只会因容量被淘汰

use linked_hash_map::LinkedHashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// 缓存条目，包含值和插入时间
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| self.inserted_at.elapsed() > ttl)
    }
}

/// LRU 缓存
///
/// 使用 `LinkedHashMap` 维护访问顺序：链表头部是最久未使用的项，
/// 每次命中都会把条目移到尾部。
#[derive(Debug)]
pub struct LruCache<K: Eq + Hash, V> {
    cache: LinkedHashMap<K, CacheEntry<V>>,
    capacity: usize,
    ttl: Option<Duration>,
}

impl<K: Eq + Hash, V> LruCache<K, V> {
    /// 创建新的 LRU 缓存
    ///
    /// - `capacity`: 最大条目数，0 会被当作 1
    /// - `ttl`: 条目生存时间，`None` 表示永不过期
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            cache: LinkedHashMap::new(),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// 获取缓存值
    ///
    /// 命中且未过期时返回 `Some(&V)` 并刷新 LRU 位置；过期条目会被删除。
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let expired = self.cache.get(key)?.is_expired(self.ttl);
        if expired {
            self.cache.remove(key);
            return None;
        }

        self.cache.get_refresh(key).map(|entry| &entry.value)
    }

    /// 查看缓存值，不刷新 LRU 位置
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.cache
            .get(key)
            .filter(|entry| !entry.is_expired(self.ttl))
            .map(|entry| &entry.value)
    }

    /// 插入缓存值
    ///
    /// 键已存在时覆盖旧值；超过容量时淘汰最久未使用的项，返回被淘汰的键值。
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.cache.contains_key(&key) {
            self.cache.remove(&key);
        }

        let evicted = if self.cache.len() >= self.capacity {
            self.cache.pop_front().map(|(k, entry)| (k, entry.value))
        } else {
            None
        };

        self.cache.insert(key, CacheEntry::new(value));
        evicted
    }

    /// 删除指定键，返回被删除的值
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.cache.remove(key).map(|entry| entry.value)
    }

    /// 清空所有缓存
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
