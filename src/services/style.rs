// 图层样式解析
//
// 样式表以 LayerKind 为键，每种边界粒度一个固定样式。按名称查找时先做规范化
// （小写、去掉所有空白），再与图层显示名精确匹配。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::{AppError, AppResult};
use crate::models::{LayerKind, StyleDescriptor};

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// 规范化图层名：小写并去掉所有空白
pub fn normalize_layer_name(name: &str) -> String {
    WHITESPACE_RE
        .replace_all(&name.to_lowercase(), "")
        .into_owned()
}

/// 样式解析器
pub struct StyleResolver;

impl StyleResolver {
    /// 固定样式表
    pub fn style_for(kind: LayerKind) -> StyleDescriptor {
        match kind {
            LayerKind::National => StyleDescriptor::new("#000000", 3.0, &[]),
            LayerKind::Province => StyleDescriptor::new("#e31a1c", 2.5, &[10.0, 5.0]),
            LayerKind::District => StyleDescriptor::new("#1f78b4", 2.0, &[6.0, 4.0]),
            LayerKind::LocalLevel => StyleDescriptor::new("#33a02c", 1.5, &[4.0, 4.0]),
            LayerKind::Ward => StyleDescriptor::new("#6a3d9a", 1.0, &[2.0, 3.0]),
        }
    }

    /// 按名称查找图层类型
    ///
    /// "Nepal" 是国界图层在旧页面中的名称，作为别名保留。
    pub fn kind_for_name(name: &str) -> Option<LayerKind> {
        let normalized = normalize_layer_name(name);
        if normalized == "nepal" {
            return Some(LayerKind::National);
        }
        LayerKind::ALL
            .into_iter()
            .find(|kind| normalize_layer_name(kind.display_name()) == normalized)
    }

    /// 按名称解析样式，名称不在样式表中视为配置缺陷
    pub fn resolve(name: &str) -> AppResult<StyleDescriptor> {
        Self::kind_for_name(name)
            .map(Self::style_for)
            .ok_or_else(|| AppError::UnknownStyle {
                name: name.to_string(),
            })
    }
}
