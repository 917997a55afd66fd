// 请求路由
//
// 路由表：
// - GET  /                              页面
// - GET  /healthz                       健康检查
// - GET  /api/map                       地图组合
// - POST /api/render                    页面状态归约与渲染
// - GET  /api/layers/{slug}/features    图层 GeoJSON（可带 attribute/value 过滤）
// - GET  /api/layers/{slug}/export      KML 下载，视图为空时返回 204

use bytes::Bytes;
use hyper::header::{HeaderValue, CONTENT_DISPOSITION};
use hyper::{Method, Response, StatusCode};

use super::body::{full, BoxBody};
use super::responses::{self, GEOJSON_MIME, HTML_MIME, TEXT_MIME};
use crate::core::{AppError, AppResult};
use crate::data::FilterSelection;
use crate::services::export::KML_MIME;
use crate::services::{KmlExport, MapService, RenderRequest};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// 路由一个已读取完请求体的请求
pub fn route(
    service: &MapService,
    method: &Method,
    path: &str,
    query: Option<&str>,
    body: Bytes,
) -> Response<BoxBody> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    let result = match (method, segments.as_slice()) {
        (&Method::GET, [""]) => Ok(responses::with_body(
            StatusCode::OK,
            HTML_MIME,
            full(INDEX_HTML),
        )),
        (&Method::GET, ["healthz"]) => Ok(responses::with_body(StatusCode::OK, TEXT_MIME, full("ok"))),
        (&Method::GET, ["api", "map"]) => service
            .map_view()
            .map(|view| responses::json(StatusCode::OK, &view)),
        (&Method::POST, ["api", "render"]) => render(service, &body),
        (&Method::GET, ["api", "layers", slug, "features"]) => features(service, slug, query),
        (&Method::GET, ["api", "layers", slug, "export"]) => export(service, slug, query),
        (_, [""] | ["healthz"] | ["api", "map"] | ["api", "render"])
        | (_, ["api", "layers", _, "features" | "export"]) => {
            return responses::method_not_allowed(method.as_str(), path)
        }
        _ => return responses::not_found(path),
    };

    result.unwrap_or_else(|e| responses::app_error(&e))
}

fn render(service: &MapService, body: &Bytes) -> AppResult<Response<BoxBody>> {
    let request = if body.is_empty() {
        RenderRequest::default()
    } else {
        serde_json::from_slice::<RenderRequest>(body).map_err(|e| AppError::BadRequest {
            reason: format!("无法解析渲染请求: {e}"),
        })?
    };

    let output = service.render(request)?;
    Ok(responses::json(StatusCode::OK, &output))
}

fn features(service: &MapService, slug: &str, query: Option<&str>) -> AppResult<Response<BoxBody>> {
    let layer = service.layer_by_slug(slug)?;
    let filter = parse_filter(query)?;
    let collection = service.features(layer.kind, filter.as_ref())?;
    Ok(responses::json_with_type(StatusCode::OK, GEOJSON_MIME, &collection))
}

fn export(service: &MapService, slug: &str, query: Option<&str>) -> AppResult<Response<BoxBody>> {
    let layer = service.layer_by_slug(slug)?;
    let filter = parse_filter(query)?;

    match service.export(layer.kind, filter.as_ref())? {
        Some(kml) => attachment(kml),
        None => {
            tracing::debug!(layer = %layer.name, "视图为空，不生成导出文件");
            Ok(responses::no_content())
        }
    }
}

fn attachment(kml: KmlExport) -> AppResult<Response<BoxBody>> {
    // ASCII 回退文件名，完整名称放在 filename* 中
    let fallback: String = kml
        .file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let disposition = format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(&kml.file_name)
    );
    let disposition = HeaderValue::from_str(&disposition).map_err(|e| AppError::Export {
        reason: format!("无效的文件名 {}: {e}", kml.file_name),
    })?;

    tracing::info!(
        file = %kml.file_name,
        features = kml.feature_count,
        bytes = kml.bytes.len(),
        "导出 KML"
    );

    let mut response = responses::with_body(StatusCode::OK, KML_MIME, full(kml.bytes));
    response.headers_mut().insert(CONTENT_DISPOSITION, disposition);
    Ok(response)
}

/// 解析 `attribute=..&value=..`，两者必须同时出现或同时缺省
///
/// `value` 按 JSON 文本解析（`2` 为数字，`"2"` 为字符串）；不是合法 JSON 时按普通字符串处理。
fn parse_filter(query: Option<&str>) -> AppResult<Option<FilterSelection>> {
    let mut attribute = None;
    let mut value = None;

    if let Some(query) = query {
        for (key, val) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "attribute" => attribute = Some(val.into_owned()),
                "value" => value = Some(val.into_owned()),
                _ => {}
            }
        }
    }

    match (attribute, value) {
        (Some(attribute), Some(value)) => {
            let value = serde_json::from_str::<serde_json::Value>(&value)
                .unwrap_or(serde_json::Value::String(value));
            Ok(Some(FilterSelection::new(attribute, value)))
        }
        (None, None) => Ok(None),
        _ => Err(AppError::BadRequest {
            reason: "attribute 与 value 必须同时提供".to_string(),
        }),
    }
}
