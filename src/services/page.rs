//! 页面状态与渲染输出
//!
//! 页面没有服务端会话：客户端在每次请求中带上完整的 `PageState` 和一个
//! `PageEvent`，服务端归约出新状态并返回不可变的 `RenderOutput`。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::data::FilterSelection;
use crate::models::{LayerDescriptor, LayerKind, StyleDescriptor};
use crate::services::filter::{LayerEvent, LayerState};

/// 全部图层的页面状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    #[serde(default)]
    pub layers: BTreeMap<LayerKind, LayerState>,
}

impl PageState {
    /// 首次打开页面时的状态
    pub fn initial() -> Self {
        Self {
            layers: LayerKind::ALL
                .into_iter()
                .map(|kind| (kind, LayerState::initial(kind.shown_by_default())))
                .collect(),
        }
    }

    /// 补全缺失的图层（按初始状态）
    pub fn normalized(mut self) -> Self {
        for kind in LayerKind::ALL {
            self.layers
                .entry(kind)
                .or_insert_with(|| LayerState::initial(kind.shown_by_default()));
        }
        self
    }

    pub fn layer(&self, kind: LayerKind) -> LayerState {
        self.layers
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| LayerState::initial(kind.shown_by_default()))
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::initial()
    }
}

/// 作用于某个图层的用户操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEvent {
    pub layer: LayerKind,
    pub event: LayerEvent,
}

/// `POST /api/render` 请求体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub state: Option<PageState>,
    #[serde(default)]
    pub event: Option<PageEvent>,
}

/// 导出下载链接
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportLink {
    pub file_name: String,
    pub url: String,
}

/// 侧边栏中单个图层的面板
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerPanel {
    pub kind: LayerKind,
    pub slug: &'static str,
    pub name: String,
    pub visible: bool,
    pub style: StyleDescriptor,
    pub attributes: Vec<String>,
    pub selected_attribute: Option<String>,
    pub values: Vec<Value>,
    pub selected_value: Option<Value>,
    pub filter: Option<FilterSelection>,
    pub feature_count: usize,
    pub total_count: usize,
    /// 视图为空时为 `None`，页面不显示下载按钮
    pub export: Option<ExportLink>,
}

impl LayerPanel {
    /// 隐藏图层的面板，不读取数据
    pub fn hidden(layer: &LayerDescriptor) -> Self {
        Self {
            kind: layer.kind,
            slug: layer.kind.slug(),
            name: layer.name.clone(),
            visible: false,
            style: layer.style.clone(),
            attributes: Vec::new(),
            selected_attribute: None,
            values: Vec::new(),
            selected_value: None,
            filter: None,
            feature_count: 0,
            total_count: 0,
            export: None,
        }
    }
}

/// 一次请求的渲染结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOutput {
    pub state: PageState,
    pub layers: Vec<LayerPanel>,
}

impl RenderOutput {
    pub fn panel(&self, kind: LayerKind) -> Option<&LayerPanel> {
        self.layers.iter().find(|p| p.kind == kind)
    }
}

/// 带过滤条件的图层地址
///
/// `value` 以 JSON 文本编码以保留类型，例如
/// `/api/layers/province/export?attribute=NAME&value=%22Province+2%22`
pub fn layer_url(kind: LayerKind, action: &str, filter: Option<&FilterSelection>) -> String {
    let base = format!("/api/layers/{}/{action}", kind.slug());
    match filter {
        Some(filter) => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("attribute", &filter.attribute)
                .append_pair("value", &filter.value.to_string())
                .finish();
            format!("{base}?{query}")
        }
        None => base,
    }
}
