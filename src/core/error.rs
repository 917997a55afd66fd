//! 应用层错误类型
//!
//! 服务层与 HTTP 层共用的错误定义，数据层错误通过 `#[from]` 自动转换。

use crate::data::DataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Data(#[from] DataError),

    /// 图层名没有对应样式，属于配置缺陷
    #[error("未找到图层样式: {name}")]
    UnknownStyle { name: String },

    #[error("未知图层: {name}")]
    UnknownLayer { name: String },

    #[error("KML 导出失败: {reason}")]
    Export { reason: String },

    #[error("配置错误: {reason}")]
    Config { reason: String },

    #[error("请求无效: {reason}")]
    BadRequest { reason: String },
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    /// 对外暴露的错误码
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Data(_) => "LAYER_LOAD_FAILED",
            AppError::UnknownStyle { .. } => "UNKNOWN_STYLE",
            AppError::UnknownLayer { .. } => "UNKNOWN_LAYER",
            AppError::Export { .. } => "EXPORT_FAILED",
            AppError::Config { .. } => "CONFIGURATION_ERROR",
            AppError::BadRequest { .. } => "BAD_REQUEST",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_is_transparent() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = DataError::io("Ward.geojson", io_err).into();
        assert_eq!(err.to_string(), "文件 I/O 错误: Ward.geojson: missing");
        assert_eq!(err.code(), "LAYER_LOAD_FAILED");
    }

    #[test]
    fn test_unknown_style_display() {
        let err = AppError::UnknownStyle {
            name: "Country".to_string(),
        };
        assert!(err.to_string().contains("Country"));
        assert_eq!(err.code(), "UNKNOWN_STYLE");
    }
}
