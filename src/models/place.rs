//! Place descriptors produced by the lookup step.

use serde::{Deserialize, Serialize};

/// Type of OSM object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsmType {
    Node,
    Way,
    Relation,
}

impl std::fmt::Display for OsmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsmType::Node => write!(f, "node"),
            OsmType::Way => write!(f, "way"),
            OsmType::Relation => write!(f, "relation"),
        }
    }
}

impl std::str::FromStr for OsmType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "node" => Ok(OsmType::Node),
            "way" => Ok(OsmType::Way),
            "relation" => Ok(OsmType::Relation),
            other => Err(format!("unknown OSM type: {}", other)),
        }
    }
}

/// Feature-type hint passed to the place lookup service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceKind {
    #[default]
    City,
    County,
    State,
    Country,
}

impl PlaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceKind::City => "city",
            PlaceKind::County => "county",
            PlaceKind::State => "state",
            PlaceKind::Country => "country",
        }
    }
}

impl std::fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlaceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "city" => Ok(PlaceKind::City),
            "county" => Ok(PlaceKind::County),
            "state" => Ok(PlaceKind::State),
            "country" => Ok(PlaceKind::Country),
            other => Err(format!("unknown place kind: {}", other)),
        }
    }
}

/// Bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Split into `rows × cols` equally sized cells, row-major from the south-west corner.
    pub fn grid(&self, rows: usize, cols: usize) -> Vec<BoundingBox> {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let width = (self.max_lon - self.min_lon) / cols as f64;
        let height = (self.max_lat - self.min_lat) / rows as f64;

        let mut cells = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                let min_lon = self.min_lon + j as f64 * width;
                let min_lat = self.min_lat + i as f64 * height;
                cells.push(BoundingBox::new(
                    min_lon,
                    min_lat,
                    min_lon + width,
                    min_lat + height,
                ));
            }
        }
        cells
    }
}

/// A validated place, as returned by the lookup service.
///
/// Read-only once created; the generate step only consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDescriptor {
    pub osm_id: i64,
    pub osm_type: OsmType,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl PlaceDescriptor {
    pub fn new(osm_id: i64, osm_type: OsmType, display_name: impl Into<String>) -> Self {
        Self {
            osm_id,
            osm_type,
            display_name: display_name.into(),
            bbox: None,
        }
    }

    /// Unique source identifier: "{osm_type}/{osm_id}"
    pub fn source_id(&self) -> String {
        format!("{}/{}", self.osm_type, self.osm_id)
    }
}
