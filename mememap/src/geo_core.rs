use anyhow::{Context, Result};
use geo::{BoundingRect, Geometry, GeometryCollection, Rect};
use geojson::{Feature, FeatureCollection, GeoJson};
use serde_json::{Map, Value};
use std::path::Path;

use crate::collect::global_variables::LEGEND_LABEL;
use crate::commons::error::MemeMapError;

/// Attribute columns tried, in order, when deriving a display name
pub const DISPLAY_NAME_COLUMNS: [&str; 3] = ["NAME_0", "COUNTRY", "name"];

/// Bounding box structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64, // min longitude
    pub min_y: f64, // min latitude
    pub max_x: f64, // max longitude
    pub max_y: f64, // max latitude
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Corners scaled componentwise by (0.995, 0.995, 1.005, 1.005)
    /// The overlay raster is pinned to these corners.
    pub fn expanded(&self) -> Self {
        BoundingBox::new(
            self.min_x * 0.995,
            self.min_y * 0.995,
            self.max_x * 1.005,
            self.max_y * 1.005,
        )
    }

    /// Smallest box containing both
    pub fn union(&self, other: &BoundingBox) -> Self {
        BoundingBox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

/// One administrative unit: a geometry plus its attribute columns
#[derive(Debug, Clone, PartialEq)]
pub struct AdminRecord {
    pub geometry: Geometry<f64>,
    /// Region name (`NAME_<level>`, `name` or `NAME_0`, whichever exists first)
    pub name: String,
    /// Categorical label driving the legend
    pub fill: String,
    pub properties: Map<String, Value>,
}

impl AdminRecord {
    pub fn new(geometry: Geometry<f64>, properties: Map<String, Value>, level: u8) -> Self {
        let level_column = format!("NAME_{}", level);
        let name = [level_column.as_str(), "name", "NAME_0"]
            .iter()
            .find_map(|column| property_str(&properties, column))
            .unwrap_or_default();

        AdminRecord {
            geometry,
            name,
            fill: LEGEND_LABEL.to_string(),
            properties,
        }
    }
}

/// Administrative shape: every boundary source ends up in this form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminShape {
    pub records: Vec<AdminRecord>,
}

impl AdminShape {
    pub fn new(records: Vec<AdminRecord>) -> Self {
        AdminShape { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bounding box over all records, `None` when there is nothing to bound
    pub fn bbox(&self) -> Option<BoundingBox> {
        let collection: GeometryCollection<f64> = self
            .records
            .iter()
            .map(|record| record.geometry.clone())
            .collect();
        collection.bounding_rect().map(BoundingBox::from)
    }

    /// Tag every record with the same categorical label
    pub fn tag_fill(&mut self, label: &str) {
        for record in &mut self.records {
            record.fill = label.to_string();
        }
    }

    /// Unique values of a column, in first-seen order
    pub fn unique_values(&self, column: &str) -> Vec<String> {
        let mut values: Vec<String> = Vec::new();
        for record in &self.records {
            if let Some(value) = property_str(&record.properties, column) {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
        values
    }

    /// Display name taken from the first attribute column that has values
    pub fn derive_display_name(&self) -> Option<String> {
        DISPLAY_NAME_COLUMNS
            .iter()
            .find_map(|column| self.unique_values(column).into_iter().next())
    }

    /// Parse a GeoJSON document (Feature, FeatureCollection or bare Geometry)
    pub fn from_geojson_str(content: &str, level: u8) -> Result<Self> {
        let geojson: GeoJson = content
            .parse()
            .context("Failed to parse GeoJSON boundary data")?;
        Self::from_geojson(geojson, level)
    }

    /// Read a GeoJSON file from disk
    pub fn from_geojson_file(path: &Path, level: u8) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read GeoJSON file: {:?}", path))?;
        Self::from_geojson_str(&content, level)
    }

    pub fn from_geojson(geojson: GeoJson, level: u8) -> Result<Self> {
        match geojson {
            GeoJson::FeatureCollection(collection) => Self::from_features(collection, level),
            GeoJson::Feature(feature) => Self::from_features(
                FeatureCollection {
                    bbox: None,
                    features: vec![feature],
                    foreign_members: None,
                },
                level,
            ),
            GeoJson::Geometry(geometry) => {
                let geometry: Geometry<f64> = geometry
                    .try_into()
                    .map_err(|e| MemeMapError::UnsupportedGeoJson(format!("{}", e)))?;
                Ok(AdminShape::new(vec![AdminRecord::new(
                    geometry,
                    Map::new(),
                    level,
                )]))
            }
        }
    }

    fn from_features(collection: FeatureCollection, level: u8) -> Result<Self> {
        let records = collection
            .features
            .into_iter()
            .enumerate()
            .map(|(idx, feature)| feature_to_record(idx, feature, level))
            .collect::<Result<Vec<_>>>()?;
        Ok(AdminShape::new(records))
    }
}

fn feature_to_record(idx: usize, feature: Feature, level: u8) -> Result<AdminRecord> {
    let geometry = feature.geometry.ok_or(MemeMapError::MissingGeometry(idx))?;
    let geometry: Geometry<f64> = geometry
        .try_into()
        .map_err(|e| MemeMapError::UnsupportedGeoJson(format!("feature {}: {}", idx, e)))?;
    Ok(AdminRecord::new(
        geometry,
        feature.properties.unwrap_or_default(),
        level,
    ))
}

fn property_str(properties: &Map<String, Value>, column: &str) -> Option<String> {
    match properties.get(column)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl From<GeometryCollection<f64>> for AdminShape {
    fn from(collection: GeometryCollection<f64>) -> Self {
        collection.0.into_iter().collect()
    }
}

impl FromIterator<Geometry<f64>> for AdminShape {
    fn from_iter<I: IntoIterator<Item = Geometry<f64>>>(iter: I) -> Self {
        AdminShape::new(
            iter.into_iter()
                .map(|geometry| AdminRecord::new(geometry, Map::new(), 0))
                .collect(),
        )
    }
}

impl TryFrom<GeoJson> for AdminShape {
    type Error = anyhow::Error;

    fn try_from(geojson: GeoJson) -> Result<Self> {
        AdminShape::from_geojson(geojson, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature",
             "properties": {"NAME_0": "Sweden", "NAME_1": "Skane"},
             "geometry": {"type": "Polygon", "coordinates": [[[12.0, 55.0], [14.0, 55.0], [14.0, 56.0], [12.0, 55.0]]]}},
            {"type": "Feature",
             "properties": {"NAME_0": "Sweden", "NAME_1": "Norrbotten"},
             "geometry": {"type": "Polygon", "coordinates": [[[18.0, 65.0], [24.0, 65.0], [24.0, 69.0], [18.0, 65.0]]]}}
        ]
    }"#;

    #[test]
    fn test_bounding_box() {
        let bbox: BoundingBox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(bbox.min_x, 0.0);
        assert_eq!(bbox.max_x, 1.0);
    }

    #[test]
    fn test_expanded_is_exact_componentwise_scale() {
        let bbox = BoundingBox::new(-124.7, 24.5, -66.9, 49.4);
        let expanded = bbox.expanded();
        assert_eq!(expanded.min_x, -124.7 * 0.995);
        assert_eq!(expanded.min_y, 24.5 * 0.995);
        assert_eq!(expanded.max_x, -66.9 * 1.005);
        assert_eq!(expanded.max_y, 49.4 * 1.005);
    }

    #[test]
    fn test_parse_feature_collection() {
        let shape = AdminShape::from_geojson_str(SAMPLE, 1).unwrap();
        assert_eq!(shape.len(), 2);
        assert_eq!(shape.records[0].name, "Skane");
        assert_eq!(shape.records[1].fill, LEGEND_LABEL);

        let bbox = shape.bbox().unwrap();
        assert_eq!(bbox, BoundingBox::new(12.0, 55.0, 24.0, 69.0));
    }

    #[test]
    fn test_display_name_uses_first_unique_value() {
        let shape = AdminShape::from_geojson_str(SAMPLE, 1).unwrap();
        assert_eq!(shape.unique_values("NAME_0"), vec!["Sweden".to_string()]);
        assert_eq!(shape.derive_display_name().as_deref(), Some("Sweden"));
    }

    #[test]
    fn test_record_name_falls_back_to_name_column() {
        let mut properties = Map::new();
        properties.insert("name".to_string(), Value::from("Gotland"));
        let record = AdminRecord::new(
            Geometry::Polygon(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)]),
            properties,
            2,
        );
        assert_eq!(record.name, "Gotland");
    }

    #[test]
    fn test_feature_without_geometry_is_an_error() {
        let content = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {}, "geometry": null}
        ]}"#;
        let err = AdminShape::from_geojson_str(content, 1).unwrap_err();
        assert!(err.to_string().contains("no geometry"));
    }

    #[test]
    fn test_from_geometry_collection() {
        let collection = GeometryCollection::new_from(vec![Geometry::Polygon(
            polygon![(x: 1.0, y: 2.0), (x: 3.0, y: 2.0), (x: 3.0, y: 4.0)],
        )]);
        let mut shape = AdminShape::from(collection);
        shape.tag_fill("Other");
        assert_eq!(shape.len(), 1);
        assert_eq!(shape.records[0].fill, "Other");
        assert_eq!(shape.bbox(), Some(BoundingBox::new(1.0, 2.0, 3.0, 4.0)));
        assert_eq!(shape.derive_display_name(), None);
    }

    #[test]
    fn test_empty_shape_has_no_bbox() {
        assert!(AdminShape::default().bbox().is_none());
    }
}
