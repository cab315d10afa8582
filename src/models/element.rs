//! Raw elements as returned by an Overpass `[out:json]` query with `out geom`.

use geo::Coord;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::OsmType;

/// Tag key → value mapping, sorted for deterministic output
pub type Tags = BTreeMap<String, String>;

/// Top-level Overpass response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<RawElement>,
}

/// One vertex of an element geometry
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl From<LatLon> for Coord<f64> {
    fn from(p: LatLon) -> Self {
        Coord { x: p.lon, y: p.lat }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawElement {
    Node(Node),
    Way(Way),
    Relation(Relation),
    /// Anything else the API may emit (e.g. `area`); never assembled
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Way {
    pub id: i64,
    #[serde(default)]
    pub geometry: Vec<LatLon>,
    #[serde(default)]
    pub tags: Tags,
}

impl Way {
    /// Vertices as (lon, lat) coordinates in input order
    pub fn coords(&self) -> Vec<Coord<f64>> {
        self.geometry.iter().copied().map(Coord::from).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Relation {
    pub id: i64,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(rename = "type")]
    pub member_type: OsmType,
    #[serde(rename = "ref")]
    pub reference: i64,
    #[serde(default)]
    pub role: String,
    /// Inline member geometry, present for way members under `out geom`
    #[serde(default)]
    pub geometry: Vec<LatLon>,
}

impl Member {
    pub fn is_outer_way(&self) -> bool {
        self.member_type == OsmType::Way && self.role == "outer"
    }
}

impl RawElement {
    pub fn id(&self) -> Option<i64> {
        match self {
            RawElement::Node(n) => Some(n.id),
            RawElement::Way(w) => Some(w.id),
            RawElement::Relation(r) => Some(r.id),
            RawElement::Other => None,
        }
    }

    pub fn osm_type(&self) -> Option<OsmType> {
        match self {
            RawElement::Node(_) => Some(OsmType::Node),
            RawElement::Way(_) => Some(OsmType::Way),
            RawElement::Relation(_) => Some(OsmType::Relation),
            RawElement::Other => None,
        }
    }

    pub fn tags(&self) -> Option<&Tags> {
        match self {
            RawElement::Node(n) => Some(&n.tags),
            RawElement::Way(w) => Some(&w.tags),
            RawElement::Relation(r) => Some(&r.tags),
            RawElement::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_elements() {
        let body = r#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 1.5, "lon": 2.5},
                {"type": "way", "id": 10, "nodes": [1, 2],
                 "geometry": [{"lat": 0.0, "lon": 0.0}, {"lat": 1.0, "lon": 2.0}],
                 "tags": {"highway": "residential", "name": "Main Street"}},
                {"type": "relation", "id": 100,
                 "members": [{"type": "way", "ref": 10, "role": "outer"},
                             {"type": "node", "ref": 1, "role": "admin_centre", "lat": 1.5, "lon": 2.5}],
                 "tags": {"boundary": "administrative"}},
                {"type": "area", "id": 3600000100}
            ]
        }"#;

        let response: OverpassResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.elements.len(), 4);

        match &response.elements[1] {
            RawElement::Way(way) => {
                assert_eq!(way.id, 10);
                assert_eq!(way.coords()[1], Coord { x: 2.0, y: 1.0 });
                assert_eq!(way.tags.get("name").map(String::as_str), Some("Main Street"));
            }
            other => panic!("expected way, got {:?}", other),
        }

        match &response.elements[2] {
            RawElement::Relation(rel) => {
                assert_eq!(rel.members.len(), 2);
                assert!(rel.members[0].is_outer_way());
                assert!(!rel.members[1].is_outer_way());
            }
            other => panic!("expected relation, got {:?}", other),
        }

        assert!(matches!(response.elements[3], RawElement::Other));
        assert_eq!(response.elements[3].id(), None);
    }

    #[test]
    fn test_way_without_tags_or_geometry() {
        let way: RawElement = serde_json::from_str(r#"{"type": "way", "id": 7}"#).unwrap();
        assert_eq!(way.osm_type(), Some(OsmType::Way));
        assert!(way.tags().unwrap().is_empty());
    }
}
