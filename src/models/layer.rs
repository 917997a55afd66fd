//! 边界图层数据模型

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 边界粒度，每种粒度对应一个固定的数据文件和样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    National,
    Province,
    District,
    LocalLevel,
    Ward,
}

impl LayerKind {
    /// 按绘制顺序排列的全部图层
    pub const ALL: [LayerKind; 5] = [
        LayerKind::National,
        LayerKind::Province,
        LayerKind::District,
        LayerKind::LocalLevel,
        LayerKind::Ward,
    ];

    /// 图层显示名称
    pub fn display_name(self) -> &'static str {
        match self {
            LayerKind::National => "International Boundary",
            LayerKind::Province => "Province",
            LayerKind::District => "District",
            LayerKind::LocalLevel => "Local Level",
            LayerKind::Ward => "Ward",
        }
    }

    /// 数据目录下的文件名
    pub fn file_name(self) -> &'static str {
        match self {
            LayerKind::National => "InternationalBoundary.geojson",
            LayerKind::Province => "Province.geojson",
            LayerKind::District => "District.geojson",
            LayerKind::LocalLevel => "LocalLevel.geojson",
            LayerKind::Ward => "Ward.geojson",
        }
    }

    /// 页面首次打开时是否显示
    pub fn shown_by_default(self) -> bool {
        matches!(self, LayerKind::National | LayerKind::Province)
    }

    /// URL 路径中使用的标识
    pub fn slug(self) -> &'static str {
        match self {
            LayerKind::National => "national",
            LayerKind::Province => "province",
            LayerKind::District => "district",
            LayerKind::LocalLevel => "local_level",
            LayerKind::Ward => "ward",
        }
    }

    pub fn from_slug(slug: &str) -> Option<LayerKind> {
        LayerKind::ALL.into_iter().find(|k| k.slug() == slug)
    }
}

/// 样式描述：描边颜色、线宽、虚线模式，填充始终透明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDescriptor {
    pub color: String,
    pub weight: f64,
    /// 空表示实线
    pub dash_array: Vec<f64>,
    pub fill_opacity: f64,
}

impl StyleDescriptor {
    pub fn new(color: &str, weight: f64, dash_array: &[f64]) -> Self {
        Self {
            color: color.to_string(),
            weight,
            dash_array: dash_array.to_vec(),
            fill_opacity: 0.0,
        }
    }

    pub fn is_solid(&self) -> bool {
        self.dash_array.is_empty()
    }
}

/// 图层描述：名称、数据路径与样式，启动时静态生成
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerDescriptor {
    pub kind: LayerKind,
    pub name: String,
    pub source: PathBuf,
    pub style: StyleDescriptor,
}

impl LayerDescriptor {
    pub fn source(&self) -> &Path {
        &self.source
    }
}
