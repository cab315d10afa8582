//! Overpass QL query construction.

use serde::{Deserialize, Serialize};

use crate::config::OverpassConfig;
use crate::models::{BoundingBox, OsmType, PlaceDescriptor};

/// What to fetch for a place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Full geometry of the place element itself
    Boundary,
    /// Highway ways inside the place area
    Streets,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Boundary => "boundary",
            Mode::Streets => "streets",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boundary" => Ok(Mode::Boundary),
            "streets" => Ok(Mode::Streets),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

/// Builds query strings for a place. Holds only configuration, never mutated.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    area_id_offset: i64,
    excluded_highways: Vec<String>,
    exclude_area_yes: bool,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::from_config(&OverpassConfig::default())
    }
}

impl QueryBuilder {
    pub fn from_config(config: &OverpassConfig) -> Self {
        Self {
            area_id_offset: config.area_id_offset,
            excluded_highways: config.excluded_highways.clone(),
            exclude_area_yes: config.exclude_area_yes,
        }
    }

    pub fn build(&self, place: &PlaceDescriptor, mode: Mode) -> String {
        match mode {
            Mode::Boundary => self.boundary(place),
            Mode::Streets => self.streets(place, None),
        }
    }

    /// The element itself plus everything it references, with full geometry.
    pub fn boundary(&self, place: &PlaceDescriptor) -> String {
        format!(
            "[out:json];{}({});(._;>;);out geom;",
            place.osm_type, place.osm_id
        )
    }

    /// Overpass area id for a place. Relations are shifted by the area offset.
    pub fn area_id(&self, place: &PlaceDescriptor) -> i64 {
        match place.osm_type {
            OsmType::Relation => place.osm_id.saturating_add(self.area_id_offset),
            OsmType::Way | OsmType::Node => place.osm_id,
        }
    }

    /// Highway ways inside the place area, optionally restricted to one grid cell.
    pub fn streets(&self, place: &PlaceDescriptor, cell: Option<&BoundingBox>) -> String {
        let mut selector = String::from("way['highway']");

        if !self.excluded_highways.is_empty() {
            selector.push_str(&format!(
                "['highway'!~'{}']",
                self.excluded_highways.join("|")
            ));
        }
        if self.exclude_area_yes {
            selector.push_str("['area'!~'yes']");
        }
        selector.push_str("(area.searchArea)");

        if let Some(cell) = cell {
            // Overpass bbox order is south, west, north, east
            selector.push_str(&format!(
                "({},{},{},{})",
                cell.min_lat, cell.min_lon, cell.max_lat, cell.max_lon
            ));
        }

        format!(
            "[out:json];area({})->.searchArea;({};);out geom;",
            self.area_id(place),
            selector
        )
    }

    /// One streets query per grid cell of the place bounding box.
    ///
    /// Falls back to a single whole-area query when the place has no bounding
    /// box or the grid is 1×1.
    pub fn streets_fan_out(&self, place: &PlaceDescriptor, rows: usize, cols: usize) -> Vec<String> {
        match place.bbox {
            Some(bbox) if rows.saturating_mul(cols) > 1 => bbox
                .grid(rows, cols)
                .iter()
                .map(|cell| self.streets(place, Some(cell)))
                .collect(),
            _ => vec![self.streets(place, None)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn testville() -> PlaceDescriptor {
        PlaceDescriptor::new(123, OsmType::Relation, "Testville")
    }

    #[test]
    fn test_relation_area_offset() {
        let builder = QueryBuilder::default();
        assert_eq!(builder.area_id(&testville()), 3_600_000_123);

        let query = builder.build(&testville(), Mode::Streets);
        assert!(query.contains("3600000123"), "query was: {}", query);
    }

    #[test]
    fn test_way_area_unchanged() {
        let builder = QueryBuilder::default();
        let place = PlaceDescriptor::new(555, OsmType::Way, "Some Park");
        assert_eq!(builder.area_id(&place), 555);
        assert!(builder.build(&place, Mode::Streets).contains("area(555)"));
    }

    #[test]
    fn test_boundary_query() {
        let query = QueryBuilder::default().build(&testville(), Mode::Boundary);
        assert_eq!(query, "[out:json];relation(123);(._;>;);out geom;");
    }

    #[test]
    fn test_streets_filters() {
        let query = QueryBuilder::default().build(&testville(), Mode::Streets);
        assert_eq!(
            query,
            "[out:json];area(3600000123)->.searchArea;\
             (way['highway']['highway'!~'path|footway|cycleway|bridleway|steps|platform|construction']\
             ['area'!~'yes'](area.searchArea););out geom;"
        );
    }

    #[test]
    fn test_streets_without_filters() {
        let config = OverpassConfig {
            excluded_highways: vec![],
            exclude_area_yes: false,
            ..OverpassConfig::default()
        };
        let query = QueryBuilder::from_config(&config).build(&testville(), Mode::Streets);
        assert!(query.contains("(way['highway'](area.searchArea);)"));
    }

    #[test]
    fn test_fan_out_uses_grid_cells() {
        let mut place = testville();
        place.bbox = Some(BoundingBox::new(10.0, 50.0, 12.0, 51.0));
        let queries = QueryBuilder::default().streets_fan_out(&place, 1, 2);

        assert_eq!(queries.len(), 2);
        assert!(queries[0].contains("(area.searchArea)(50,10,51,11)"));
        assert!(queries[1].contains("(area.searchArea)(50,11,51,12)"));
    }

    #[test]
    fn test_fan_out_without_bbox_is_single_query() {
        let queries = QueryBuilder::default().streets_fan_out(&testville(), 4, 4);
        assert_eq!(queries, vec![QueryBuilder::default().build(&testville(), Mode::Streets)]);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("Streets".parse::<Mode>(), Ok(Mode::Streets));
        assert!("roads".parse::<Mode>().is_err());
    }

    #[test]
    fn test_area_id_saturates() {
        let config = OverpassConfig {
            area_id_offset: i64::MAX,
            ..OverpassConfig::default()
        };
        let builder = QueryBuilder::from_config(&config);
        assert_eq!(builder.area_id(&testville()), i64::MAX);
    }

    #[test]
    fn test_fan_out_single_cell_has_no_bbox_filter() {
        let mut place = testville();
        place.bbox = Some(BoundingBox::new(10.0, 50.0, 12.0, 51.0));
        let queries = QueryBuilder::default().streets_fan_out(&place, 1, 1);
        assert_eq!(queries, vec![QueryBuilder::default().streets(&place, None)]);
    }
}
