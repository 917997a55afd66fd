//! 几何表（Geometry Table）与过滤视图
//!
//! 一个 GeoJSON 文件加载后得到一张只读的几何表：按文件顺序排列的要素记录，
//! 每条记录包含几何体和属性映射。过滤视图只借用表中的记录，不复制数据。

use geojson::{Feature, FeatureCollection, GeoJson, Geometry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 属性映射（列名 -> 值），保持文件中的列顺序
pub type Attributes = Map<String, Value>;

/// 单条要素记录
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub geometry: Option<Geometry>,
    pub attributes: Attributes,
}

impl FeatureRecord {
    fn from_feature(feature: Feature) -> Self {
        Self {
            geometry: feature.geometry,
            attributes: feature.properties.unwrap_or_default(),
        }
    }

    /// 判断该记录的属性是否等于目标值（类型与取值都相同）
    pub fn matches(&self, attribute: &str, target: &Value) -> bool {
        self.attributes.get(attribute) == Some(target)
    }

    fn to_feature(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: self.geometry.clone(),
            id: None,
            properties: Some(self.attributes.clone()),
            foreign_members: None,
        }
    }
}

/// 属性值的文本形式（KML 与日志中使用）
///
/// 字符串按原样显示，其余类型使用 JSON 文本（`1`、`true`、`null`）。
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 过滤条件：一个属性等于一个目标值
///
/// 目标值保留 JSON 类型，字符串 `"1"` 与数字 `1` 是不同的取值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub attribute: String,
    pub value: Value,
}

impl FilterSelection {
    pub fn new(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// 只读几何表
#[derive(Debug)]
pub struct GeometryTable {
    source: PathBuf,
    records: Vec<FeatureRecord>,
    columns: Vec<String>,
}

impl GeometryTable {
    /// 从解析后的 GeoJSON 构建几何表
    ///
    /// 接受 FeatureCollection、单个 Feature 或裸几何体。
    pub fn from_geojson(source: impl Into<PathBuf>, geojson: GeoJson) -> Self {
        let features = match geojson {
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(geometry) => vec![Feature::from(geometry)],
        };

        Self::from_records(
            source,
            features.into_iter().map(FeatureRecord::from_feature).collect(),
        )
    }

    /// 直接从记录构建几何表，列名按首次出现的顺序收集
    pub fn from_records(source: impl Into<PathBuf>, records: Vec<FeatureRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.attributes.keys() {
                if seen.insert(key.as_str()) {
                    columns.push(key.clone());
                }
            }
        }

        Self {
            source: source.into(),
            records,
            columns,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    /// 属性列名（表顺序）
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, attribute: &str) -> bool {
        self.columns.iter().any(|c| c == attribute)
    }

    /// 指定列的去重取值，按首次出现的顺序
    ///
    /// 以 JSON 文本去重，不同类型的同形取值（`"1"` 与 `1`）分别保留。
    pub fn distinct_values(&self, attribute: &str) -> Vec<Value> {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for record in &self.records {
            if let Some(value) = record.attributes.get(attribute) {
                if seen.insert(value.to_string()) {
                    values.push(value.clone());
                }
            }
        }
        values
    }

    /// 完整视图（未过滤）
    pub fn full_view(&self) -> FilteredView<'_> {
        FilteredView {
            table: self,
            records: self.records.iter().collect(),
            filter: None,
        }
    }

    /// 按属性相等过滤
    pub fn filter(&self, selection: &FilterSelection) -> FilteredView<'_> {
        FilteredView {
            table: self,
            records: self
                .records
                .iter()
                .filter(|r| r.matches(&selection.attribute, &selection.value))
                .collect(),
            filter: Some(selection.clone()),
        }
    }

    /// 根据可选过滤条件生成视图
    pub fn view(&self, selection: Option<&FilterSelection>) -> FilteredView<'_> {
        match selection {
            Some(selection) => self.filter(selection),
            None => self.full_view(),
        }
    }
}

/// 过滤视图：几何表中满足过滤条件的记录子集
#[derive(Debug)]
pub struct FilteredView<'a> {
    table: &'a GeometryTable,
    records: Vec<&'a FeatureRecord>,
    filter: Option<FilterSelection>,
}

impl<'a> FilteredView<'a> {
    pub fn table(&self) -> &'a GeometryTable {
        self.table
    }

    pub fn records(&self) -> &[&'a FeatureRecord] {
        &self.records
    }

    pub fn filter(&self) -> Option<&FilterSelection> {
        self.filter.as_ref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 转换为 GeoJSON FeatureCollection（供地图渲染）
    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.records.iter().map(|r| r.to_feature()).collect(),
            foreign_members: None,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn province_table() -> GeometryTable {
        let geojson: GeoJson = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"NAME": "Province 1", "CODE": 1},
                    "geometry": {"type": "Polygon", "coordinates": [[[87.0, 27.0], [88.0, 27.0], [88.0, 28.0], [87.0, 27.0]]]}
                },
                {
                    "type": "Feature",
                    "properties": {"NAME": "Province 2", "CODE": 2},
                    "geometry": {"type": "Polygon", "coordinates": [[[85.0, 26.5], [86.0, 26.5], [86.0, 27.0], [85.0, 26.5]]]}
                },
                {
                    "type": "Feature",
                    "properties": {"NAME": "Province 3", "CODE": 3},
                    "geometry": {"type": "Polygon", "coordinates": [[[84.0, 27.5], [85.5, 27.5], [85.5, 28.5], [84.0, 27.5]]]}
                }
            ]
        })
        .to_string()
        .parse()
        .unwrap();
        GeometryTable::from_geojson("Province.geojson", geojson)
    }

    #[test]
    fn test_columns_follow_table_order() {
        let table = province_table();
        assert_eq!(table.columns(), &["NAME".to_string(), "CODE".to_string()]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_columns_collect_late_keys() {
        let mut a = Attributes::new();
        a.insert("A".into(), json!(1));
        let mut b = Attributes::new();
        b.insert("B".into(), json!(2));
        b.insert("A".into(), json!(3));
        let table = GeometryTable::from_records(
            "x.geojson",
            vec![
                FeatureRecord { geometry: None, attributes: a },
                FeatureRecord { geometry: None, attributes: b },
            ],
        );
        assert_eq!(table.columns(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_distinct_values_first_seen_order() {
        let mut records = Vec::new();
        for name in ["Bagmati", "Koshi", "Bagmati", "Gandaki", "Koshi"] {
            let mut attrs = Attributes::new();
            attrs.insert("PROVINCE".into(), json!(name));
            records.push(FeatureRecord { geometry: None, attributes: attrs });
        }
        let table = GeometryTable::from_records("d.geojson", records);
        assert_eq!(
            table.distinct_values("PROVINCE"),
            vec![json!("Bagmati"), json!("Koshi"), json!("Gandaki")]
        );
        // 重复调用结果稳定
        assert_eq!(table.distinct_values("PROVINCE"), table.distinct_values("PROVINCE"));
    }

    #[test]
    fn test_filter_matches_naive_scan() {
        let table = province_table();
        for value in table.distinct_values("NAME") {
            let selection = FilterSelection::new("NAME", value.clone());
            let view = table.filter(&selection);

            let expected: Vec<&FeatureRecord> = table
                .records()
                .iter()
                .filter(|r| r.attributes.get("NAME") == Some(&value))
                .collect();
            assert_eq!(view.records(), expected.as_slice());
        }
    }

    #[test]
    fn test_filter_on_numeric_column() {
        let table = province_table();
        let view = table.filter(&FilterSelection::new("CODE", 2));
        assert_eq!(view.len(), 1);
        assert_eq!(view.records()[0].attributes["NAME"], json!("Province 2"));

        // 字符串 "2" 不等于数字 2
        assert!(table.filter(&FilterSelection::new("CODE", "2")).is_empty());
    }

    #[test]
    fn test_values_differing_only_in_type_stay_distinct() {
        let records = [json!("1"), json!(1), json!("1")]
            .into_iter()
            .map(|code| {
                let mut attrs = Attributes::new();
                attrs.insert("CODE".into(), code);
                FeatureRecord { geometry: None, attributes: attrs }
            })
            .collect();
        let table = GeometryTable::from_records("mixed.geojson", records);

        assert_eq!(table.distinct_values("CODE"), vec![json!("1"), json!(1)]);
        assert_eq!(table.filter(&FilterSelection::new("CODE", "1")).len(), 2);
        assert_eq!(table.filter(&FilterSelection::new("CODE", 1)).len(), 1);
    }

    #[test]
    fn test_distinct_values_on_large_table() {
        let records = (0..20_000)
            .map(|i| {
                let mut attrs = Attributes::new();
                attrs.insert("WARD".into(), json!(i % 9));
                attrs.insert(format!("EXTRA_{}", i % 3), json!(i));
                FeatureRecord { geometry: None, attributes: attrs }
            })
            .collect();
        let table = GeometryTable::from_records("ward.geojson", records);

        let values = table.distinct_values("WARD");
        assert_eq!(values.len(), 9);
        assert_eq!(values[0], json!(0));
        assert_eq!(table.columns(), &["WARD", "EXTRA_0", "EXTRA_1", "EXTRA_2"]);
    }

    #[test]
    fn test_filter_no_match_is_empty() {
        let table = province_table();
        let view = table.filter(&FilterSelection::new("NAME", "Province 9"));
        assert!(view.is_empty());

        let view = table.filter(&FilterSelection::new("MISSING", "x"));
        assert!(view.is_empty());
    }

    #[test]
    fn test_full_view_and_feature_collection() {
        let table = province_table();
        let view = table.view(None);
        assert_eq!(view.len(), 3);
        assert!(view.filter().is_none());

        let fc = view.to_feature_collection();
        assert_eq!(fc.features.len(), 3);
        assert_eq!(
            fc.features[1].properties.as_ref().unwrap()["NAME"],
            json!("Province 2")
        );
    }

    #[test]
    fn test_bare_geometry_has_no_columns() {
        let geojson: GeoJson = r#"{"type": "Point", "coordinates": [85.3, 27.7]}"#
            .parse()
            .unwrap();
        let table = GeometryTable::from_geojson("p.geojson", geojson);
        assert_eq!(table.len(), 1);
        assert!(table.columns().is_empty());
    }
}
