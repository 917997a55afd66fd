//! KML 导出
//!
//! 将过滤视图转换为 KML 2.2 文档：每条记录一个 `Placemark`，属性写入
//! `ExtendedData`，几何体按类型映射为 Point / LineString / Polygon / MultiGeometry。
//! GeoJSON 坐标已是经纬度（WGS84），与 KML 坐标顺序一致，无需重投影。

use geojson::{Geometry, Value as GeoValue};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::core::{AppError, AppResult};
use crate::data::table::{display_value, FeatureRecord};
use crate::data::FilteredView;

pub const KML_MIME: &str = "application/vnd.google-earth.kml+xml";
const KML_NS: &str = "http://www.opengis.net/kml/2.2";

/// 一次导出的结果
#[derive(Debug, Clone)]
pub struct KmlExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub feature_count: usize,
}

/// 导出文件名：`{layer_name}_filtered.kml`
pub fn export_file_name(layer_name: &str) -> String {
    format!("{layer_name}_filtered.kml")
}

/// 导出过滤视图
///
/// 视图为空时返回 `Ok(None)`，不生成任何文件。
pub fn export_view(layer_name: &str, view: &FilteredView<'_>) -> AppResult<Option<KmlExport>> {
    if view.is_empty() {
        return Ok(None);
    }

    let bytes = write_kml(layer_name, view)?;
    tracing::debug!(
        layer = layer_name,
        features = view.len(),
        bytes = bytes.len(),
        "KML 导出完成"
    );

    Ok(Some(KmlExport {
        file_name: export_file_name(layer_name),
        bytes,
        feature_count: view.len(),
    }))
}

/// 生成 KML 文档字节
pub fn write_kml(layer_name: &str, view: &FilteredView<'_>) -> AppResult<Vec<u8>> {
    let mut kml = KmlWriter::new();

    kml.declaration()?;
    kml.start_with("kml", &[("xmlns", KML_NS)])?;
    kml.start("Document")?;
    kml.text_element("name", layer_name)?;
    kml.text_element("description", &describe(view))?;

    for record in view.records() {
        kml.placemark(record, view.table().columns())?;
    }

    kml.end("Document")?;
    kml.end("kml")?;
    Ok(kml.into_inner())
}

fn describe(view: &FilteredView<'_>) -> String {
    let exported_at = chrono::Utc::now().to_rfc3339();
    match view.filter() {
        Some(filter) => format!(
            "{} features where {} = {} (exported {exported_at})",
            view.len(),
            filter.attribute,
            display_value(&filter.value)
        ),
        None => format!("{} features (exported {exported_at})", view.len()),
    }
}

fn export_error(e: impl std::fmt::Display) -> AppError {
    AppError::Export {
        reason: e.to_string(),
    }
}

/// quick-xml 写入器的薄封装
struct KmlWriter {
    writer: Writer<Vec<u8>>,
}

impl KmlWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn into_inner(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    fn declaration(&mut self) -> AppResult<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(export_error)
    }

    fn start(&mut self, tag: &str) -> AppResult<()> {
        self.start_with(tag, &[])
    }

    fn start_with(&mut self, tag: &str, attrs: &[(&str, &str)]) -> AppResult<()> {
        let mut start = BytesStart::new(tag);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        self.writer
            .write_event(Event::Start(start))
            .map_err(export_error)
    }

    fn end(&mut self, tag: &str) -> AppResult<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(export_error)
    }

    fn text_element(&mut self, tag: &str, text: &str) -> AppResult<()> {
        self.start(tag)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(export_error)?;
        self.end(tag)
    }

    fn placemark(&mut self, record: &FeatureRecord, columns: &[String]) -> AppResult<()> {
        self.start("Placemark")?;

        // 第一列作为要素名称
        if let Some(name) = columns.first().and_then(|c| record.attributes.get(c)) {
            self.text_element("name", &display_value(name))?;
        }

        if !record.attributes.is_empty() {
            self.start("ExtendedData")?;
            for (key, value) in &record.attributes {
                self.start_with("Data", &[("name", key.as_str())])?;
                self.text_element("value", &display_value(value))?;
                self.end("Data")?;
            }
            self.end("ExtendedData")?;
        }

        if let Some(geometry) = &record.geometry {
            self.geometry(geometry)?;
        }

        self.end("Placemark")
    }

    fn geometry(&mut self, geometry: &Geometry) -> AppResult<()> {
        match &geometry.value {
            GeoValue::Point(position) => self.point(position),
            GeoValue::MultiPoint(points) => {
                self.start("MultiGeometry")?;
                for position in points {
                    self.point(position)?;
                }
                self.end("MultiGeometry")
            }
            GeoValue::LineString(line) => self.line_string(line),
            GeoValue::MultiLineString(lines) => {
                self.start("MultiGeometry")?;
                for line in lines {
                    self.line_string(line)?;
                }
                self.end("MultiGeometry")
            }
            GeoValue::Polygon(rings) => self.polygon(rings),
            GeoValue::MultiPolygon(polygons) => {
                self.start("MultiGeometry")?;
                for rings in polygons {
                    self.polygon(rings)?;
                }
                self.end("MultiGeometry")
            }
            GeoValue::GeometryCollection(geometries) => {
                self.start("MultiGeometry")?;
                for inner in geometries {
                    self.geometry(inner)?;
                }
                self.end("MultiGeometry")
            }
        }
    }

    fn point(&mut self, position: &[f64]) -> AppResult<()> {
        self.start("Point")?;
        self.text_element("coordinates", &format_position(position))?;
        self.end("Point")
    }

    fn line_string(&mut self, line: &[Vec<f64>]) -> AppResult<()> {
        self.start("LineString")?;
        self.text_element("coordinates", &format_positions(line))?;
        self.end("LineString")
    }

    fn polygon(&mut self, rings: &[Vec<Vec<f64>>]) -> AppResult<()> {
        let Some((outer, inner)) = rings.split_first() else {
            return Err(AppError::Export {
                reason: "多边形没有外环".to_string(),
            });
        };

        self.start("Polygon")?;
        self.ring("outerBoundaryIs", outer)?;
        for hole in inner {
            self.ring("innerBoundaryIs", hole)?;
        }
        self.end("Polygon")
    }

    fn ring(&mut self, boundary: &str, ring: &[Vec<f64>]) -> AppResult<()> {
        self.start(boundary)?;
        self.start("LinearRing")?;
        self.text_element("coordinates", &format_positions(ring))?;
        self.end("LinearRing")?;
        self.end(boundary)
    }
}

/// `lon,lat[,alt]`
fn format_position(position: &[f64]) -> String {
    position
        .iter()
        .take(3)
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn format_positions(positions: &[Vec<f64>]) -> String {
    positions
        .iter()
        .map(|p| format_position(p))
        .collect::<Vec<_>>()
        .join(" ")
}
