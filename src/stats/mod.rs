//! Derived statistics over a feature collection.
//!
//! Areas and lengths are always measured after projecting to an equal-area
//! plane; nothing is summed in raw degrees.

mod projection;

use std::collections::BTreeMap;

use geo::{Area, Euclidean, Length};
use hashbrown::HashMap;
use geojson::{FeatureCollection, JsonObject};
use serde::Serialize;
use tracing::debug;

pub use projection::{project, to_cea, EARTH_RADIUS_M};

use crate::models::GeometryKind;

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

/// Summary shown alongside a generated map
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total_features: usize,
    pub geometry_types: BTreeMap<GeometryKind, usize>,
    pub area_km2: f64,
    pub length_km: f64,
    /// Street length per area, when the collection has any area
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density_km_per_km2: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub street_types: Vec<CategoryCount>,
    pub top_names: Vec<CategoryCount>,
}

struct Row {
    geometry: geo::Geometry<f64>,
    properties: JsonObject,
}

/// Read-only view of a collection as a table of (geometry, properties) rows
pub struct StatisticsCalculator {
    rows: Vec<Row>,
}

impl StatisticsCalculator {
    pub fn from_collection(collection: &FeatureCollection) -> Self {
        let mut skipped = 0;
        let rows = collection
            .features
            .iter()
            .filter_map(|feature| {
                let geometry = feature
                    .geometry
                    .as_ref()
                    .and_then(|g| geo::Geometry::<f64>::try_from(g.value.clone()).ok());
                match geometry {
                    Some(geometry) => Some(Row {
                        geometry,
                        properties: feature.properties.clone().unwrap_or_default(),
                    }),
                    None => {
                        skipped += 1;
                        None
                    }
                }
            })
            .collect();

        if skipped > 0 {
            debug!("Skipped {} features without usable geometry", skipped);
        }
        Self { rows }
    }

    pub fn feature_count(&self) -> usize {
        self.rows.len()
    }

    pub fn geometry_type_counts(&self) -> BTreeMap<GeometryKind, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(kind_of(&row.geometry)).or_insert(0) += 1;
        }
        counts
    }

    /// Total polygon area in km²
    pub fn area_km2(&self) -> f64 {
        self.rows
            .iter()
            .map(|row| project(&row.geometry).unsigned_area())
            .sum::<f64>()
            / 1e6
    }

    /// Total line length in km
    pub fn length_km(&self) -> f64 {
        self.rows
            .iter()
            .map(|row| line_length(&project(&row.geometry)))
            .sum::<f64>()
            / 1000.0
    }

    /// Most frequent values of a string property, ties broken alphabetically
    pub fn top_values(&self, key: &str, n: usize) -> Vec<CategoryCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for row in &self.rows {
            if let Some(value) = row.properties.get(key).and_then(|v| v.as_str()) {
                *counts.entry(value).or_insert(0) += 1;
            }
        }

        let mut sorted: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(value, count)| CategoryCount {
                value: value.to_string(),
                count,
            })
            .collect();
        sorted.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
        sorted.truncate(n);
        sorted
    }

    pub fn summary(&self, top_n: usize) -> Statistics {
        let area_km2 = self.area_km2();
        let length_km = self.length_km();
        let density_km_per_km2 = (area_km2 > 0.0).then(|| length_km / area_km2);

        Statistics {
            total_features: self.feature_count(),
            geometry_types: self.geometry_type_counts(),
            area_km2,
            length_km,
            density_km_per_km2,
            street_types: self.top_values("highway", usize::MAX),
            top_names: self.top_values("name", top_n),
        }
    }
}

impl Statistics {
    /// Street density against an externally known area, e.g. the place boundary
    pub fn density_against(&self, area_km2: f64) -> Option<f64> {
        (area_km2 > 0.0).then(|| self.length_km / area_km2)
    }
}

fn kind_of(geometry: &geo::Geometry<f64>) -> GeometryKind {
    match geometry {
        geo::Geometry::Point(_) => GeometryKind::Point,
        geo::Geometry::Line(_) | geo::Geometry::LineString(_) => GeometryKind::LineString,
        geo::Geometry::Polygon(_) | geo::Geometry::Rect(_) | geo::Geometry::Triangle(_) => {
            GeometryKind::Polygon
        }
        geo::Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
        geo::Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
        geo::Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
        geo::Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
    }
}

/// Planar length of the linear parts of a geometry
fn line_length(geometry: &geo::Geometry<f64>) -> f64 {
    match geometry {
        geo::Geometry::Line(line) => Euclidean.length(line),
        geo::Geometry::LineString(line) => Euclidean.length(line),
        geo::Geometry::MultiLineString(lines) => Euclidean.length(lines),
        geo::Geometry::GeometryCollection(collection) => collection.iter().map(line_length).sum(),
        _ => 0.0,
    }
}
