//! 图层过滤状态机
//!
//! 每个图层的状态：`Hidden → Unfiltered ⇄ Filtered`，取消勾选可从任一可见状态回到
//! `Hidden`。隐藏图层会丢弃过滤条件，重新显示时回到完整几何表。
//!
//! 属性/取值选择器只描述侧边栏当前选中项；过滤条件只在显式 `ApplyFilter`
//! 时更新，`ClearFilter` 恢复为完整几何表。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::{FilterSelection, GeometryTable};

/// 图层可见性与过滤状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LayerStatus {
    Hidden,
    Unfiltered,
    Filtered { filter: FilterSelection },
}

impl LayerStatus {
    pub fn is_visible(&self) -> bool {
        !matches!(self, LayerStatus::Hidden)
    }

    pub fn active_filter(&self) -> Option<&FilterSelection> {
        match self {
            LayerStatus::Filtered { filter } => Some(filter),
            _ => None,
        }
    }
}

/// 单个图层的页面状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerState {
    #[serde(flatten)]
    pub status: LayerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl LayerState {
    pub fn hidden() -> Self {
        Self {
            status: LayerStatus::Hidden,
            attribute: None,
            value: None,
        }
    }

    pub fn visible() -> Self {
        Self {
            status: LayerStatus::Unfiltered,
            attribute: None,
            value: None,
        }
    }

    pub fn initial(shown: bool) -> Self {
        if shown {
            Self::visible()
        } else {
            Self::hidden()
        }
    }

    pub fn is_visible(&self) -> bool {
        self.status.is_visible()
    }

    pub fn active_filter(&self) -> Option<&FilterSelection> {
        self.status.active_filter()
    }
}

/// 侧边栏上的单个用户操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerEvent {
    Show,
    Hide,
    SelectAttribute { attribute: String },
    SelectValue { value: Value },
    ApplyFilter,
    ClearFilter,
}

/// 过滤控制器
pub struct FilterController;

impl FilterController {
    /// 补全选择器默认值
    ///
    /// 属性默认取表中第一列；取值默认取该列第一个出现的值。
    /// 选中的属性不在表中时回到默认列，选中的值（按类型和取值比较）不在该列中时回到默认值。
    pub fn resolve_selection(mut state: LayerState, table: &GeometryTable) -> LayerState {
        if !state.is_visible() {
            return state;
        }

        let attribute = match state.attribute.take() {
            Some(attr) if table.has_column(&attr) => Some(attr),
            _ => table.columns().first().cloned(),
        };

        let value = attribute.as_deref().and_then(|attr| {
            let values = table.distinct_values(attr);
            match state.value.take() {
                Some(v) if values.contains(&v) => Some(v),
                _ => values.into_iter().next(),
            }
        });

        state.attribute = attribute;
        state.value = value;
        state
    }

    /// 应用一个事件，返回新状态
    ///
    /// `table` 只在图层可见时需要；隐藏图层不会读取数据。
    pub fn step(
        state: LayerState,
        event: &LayerEvent,
        table: Option<&GeometryTable>,
    ) -> LayerState {
        let state = match table {
            Some(table) => Self::resolve_selection(state, table),
            None => state,
        };

        let next = match (state.status.clone(), event) {
            (LayerStatus::Hidden, LayerEvent::Show) => LayerState::visible(),
            (LayerStatus::Hidden, _) => state,
            (_, LayerEvent::Hide) => LayerState::hidden(),
            (_, LayerEvent::Show) => state,
            (_, LayerEvent::SelectAttribute { attribute }) => LayerState {
                attribute: Some(attribute.clone()),
                value: None,
                ..state
            },
            (_, LayerEvent::SelectValue { value }) => LayerState {
                value: Some(value.clone()),
                ..state
            },
            (_, LayerEvent::ApplyFilter) => {
                let filter = state
                    .attribute
                    .clone()
                    .zip(state.value.clone())
                    .map(|(attribute, value)| FilterSelection::new(attribute, value));
                match filter {
                    Some(filter) => LayerState {
                        status: LayerStatus::Filtered { filter },
                        ..state
                    },
                    // 没有可用的属性列，保持原状态
                    None => state,
                }
            }
            (_, LayerEvent::ClearFilter) => LayerState {
                status: LayerStatus::Unfiltered,
                ..state
            },
        };

        match table {
            Some(table) => Self::resolve_selection(next, table),
            None => next,
        }
    }
}
