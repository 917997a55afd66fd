//! 响应模板
//!
//! 统一的 JSON 错误格式：`{"error": "<错误码>", "message": "<说明>"}`。

use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::body::{empty, full, BoxBody};
use crate::core::AppError;

pub const JSON_MIME: &str = "application/json";
pub const GEOJSON_MIME: &str = "application/geo+json";
pub const HTML_MIME: &str = "text/html; charset=utf-8";
pub const TEXT_MIME: &str = "text/plain; charset=utf-8";

/// 带状态码与 Content-Type 的响应
pub fn with_body(status: StatusCode, content_type: &'static str, body: BoxBody) -> Response<BoxBody> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// 204，无响应体也无 Content-Type
pub fn no_content() -> Response<BoxBody> {
    let mut response = Response::new(empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}

/// 序列化为 JSON 响应
pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Response<BoxBody> {
    json_with_type(status, JSON_MIME, value)
}

pub fn json_with_type<T: Serialize>(
    status: StatusCode,
    content_type: &'static str,
    value: &T,
) -> Response<BoxBody> {
    match serde_json::to_vec(value) {
        Ok(bytes) => with_body(status, content_type, full(bytes)),
        Err(e) => internal_error(&format!("响应序列化失败: {e}")),
    }
}

fn error_body(status: StatusCode, code: &str, message: &str) -> Response<BoxBody> {
    let body = serde_json::json!({
        "error": code,
        "message": message,
    });
    with_body(status, JSON_MIME, full(body.to_string()))
}

/// 未知路由
pub fn not_found(path: &str) -> Response<BoxBody> {
    error_body(StatusCode::NOT_FOUND, "NOT_FOUND", &format!("未找到路由: {path}"))
}

/// 路由存在但方法不匹配
pub fn method_not_allowed(method: &str, path: &str) -> Response<BoxBody> {
    error_body(
        StatusCode::METHOD_NOT_ALLOWED,
        "METHOD_NOT_ALLOWED",
        &format!("{path} 不支持 {method} 请求"),
    )
}

/// 内部错误
pub fn internal_error(message: &str) -> Response<BoxBody> {
    error_body(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
}

/// 错误对应的 HTTP 状态码
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::UnknownLayer { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 服务层错误
pub fn app_error(err: &AppError) -> Response<BoxBody> {
    let status = status_for(err);
    if status.is_server_error() {
        tracing::error!(code = err.code(), error = %err, "请求处理失败");
    } else {
        tracing::debug!(code = err.code(), error = %err, "请求被拒绝");
    }
    error_body(status, err.code(), &err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataError;
    use http_body_util::BodyExt;

    async fn body_json(response: Response<BoxBody>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        let bad = AppError::BadRequest {
            reason: "x".to_string(),
        };
        let unknown = AppError::UnknownLayer {
            name: "country".to_string(),
        };
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let data: AppError = DataError::io("Ward.geojson", io_err).into();

        assert_eq!(status_for(&bad), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&unknown), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&data), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = app_error(&AppError::UnknownLayer {
            name: "country".to_string(),
        });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], JSON_MIME);

        let json = body_json(response).await;
        assert_eq!(json["error"], "UNKNOWN_LAYER");
        assert!(json["message"].as_str().unwrap().contains("country"));
    }

    #[tokio::test]
    async fn test_no_content_has_no_headers() {
        let response = no_content();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().is_empty());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_message_is_json_escaped() {
        let json = body_json(not_found("/a\"b")).await;
        assert_eq!(json["message"], "未找到路由: /a\"b");
    }
}
