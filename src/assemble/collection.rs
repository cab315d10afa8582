//! Feature construction, aggregation and structural validation.

use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};

use crate::error::{Error, Result};
use crate::models::{Geometry, OsmType, Tags};

const DEFAULT_NAME: &str = "Unknown";

/// Wrap an assembled geometry with the element's tags and identity.
///
/// The geometry is duplicated under the `geometry` property so consumers that
/// only read properties (tabular previews) still see it.
pub fn build_feature(osm_type: OsmType, osm_id: i64, tags: &Tags, geometry: &Geometry) -> Feature {
    let gj_geometry = geojson::Geometry::from(geometry);

    let mut properties = JsonObject::new();
    for (key, value) in tags {
        properties.insert(key.clone(), JsonValue::String(value.clone()));
    }
    properties.insert(
        "name".to_string(),
        JsonValue::String(
            tags.get("name")
                .cloned()
                .unwrap_or_else(|| DEFAULT_NAME.to_string()),
        ),
    );
    properties.insert("osm_id".to_string(), JsonValue::from(osm_id));
    properties.insert(
        "osm_type".to_string(),
        JsonValue::String(osm_type.to_string()),
    );
    properties.insert(
        "geometry".to_string(),
        serde_json::to_value(&gj_geometry).unwrap_or(JsonValue::Null),
    );

    Feature {
        bbox: None,
        geometry: Some(gj_geometry),
        id: Some(geojson::feature::Id::String(format!("{}/{}", osm_type, osm_id))),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Ordered aggregation of features
#[derive(Debug, Default)]
pub struct FeatureCollectionBuilder {
    features: Vec<Feature>,
}

impl FeatureCollectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn build(self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.features,
            foreign_members: None,
        }
    }
}

/// Check that every feature carries a well-formed geometry.
///
/// Fails on the first bad feature; the collection is rejected as a whole.
pub fn validate_collection(collection: &FeatureCollection) -> Result<()> {
    for (index, feature) in collection.features.iter().enumerate() {
        validate_feature(feature).map_err(|reason| Error::Validation { index, reason })?;
    }
    Ok(())
}

fn validate_feature(feature: &Feature) -> std::result::Result<(), String> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| "missing geometry".to_string())?;

    geo_types::Geometry::<f64>::try_from(geometry.value.clone()).map_err(|e| e.to_string())?;

    match &geometry.value {
        geojson::Value::LineString(line) => check_positions(line, 2),
        geojson::Value::Polygon(rings) => rings.iter().try_for_each(|r| check_ring(r)),
        geojson::Value::MultiPolygon(polygons) => polygons
            .iter()
            .flatten()
            .try_for_each(|r| check_ring(r)),
        _ => Err("unexpected geometry type".to_string()),
    }
}

fn check_positions(positions: &[geojson::Position], min: usize) -> std::result::Result<(), String> {
    if positions.len() < min {
        return Err(format!(
            "{} positions, at least {} required",
            positions.len(),
            min
        ));
    }
    if positions
        .iter()
        .any(|p| p.len() < 2 || p.iter().any(|v| !v.is_finite()))
    {
        return Err("non-finite or incomplete position".to_string());
    }
    Ok(())
}

fn check_ring(ring: &[geojson::Position]) -> std::result::Result<(), String> {
    check_positions(ring, 4)?;
    if ring.first() != ring.last() {
        return Err("polygon ring is not closed".to_string());
    }
    Ok(())
}
