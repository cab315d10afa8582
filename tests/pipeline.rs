//! Offline pipeline tests: raw Overpass JSON → assembled GeoJSON → session → statistics.
//!
//! These drive the same path as the generate command without touching the network.

use chrono::Utc;
use placeshape::assemble::osm_to_geojson;
use placeshape::overpass::{merge_responses, parse_response, QueryBuilder};
use placeshape::stats::{StatisticsCalculator, DEFAULT_TOP_N};
use placeshape::{GeneratedMap, Mode, OsmType, PlaceDescriptor, Session};

/// An admin boundary split into three open outer ways plus a detached island,
/// with an inner member that must be ignored.
const BOUNDARY_RESPONSE: &str = r#"{
    "version": 0.6,
    "generator": "Overpass API",
    "elements": [
        {"type": "relation", "id": 123,
         "members": [
            {"type": "way", "ref": 11, "role": "outer"},
            {"type": "way", "ref": 12, "role": "outer"},
            {"type": "way", "ref": 13, "role": "outer"},
            {"type": "way", "ref": 14, "role": "outer"},
            {"type": "way", "ref": 15, "role": "inner"},
            {"type": "node", "ref": 1, "role": "admin_centre"}
         ],
         "tags": {"name": "Testville", "boundary": "administrative", "admin_level": "8"}},
        {"type": "way", "id": 11, "geometry": [
            {"lat": 0.0, "lon": 0.0}, {"lat": 0.0, "lon": 1.0}, {"lat": 1.0, "lon": 1.0}]},
        {"type": "way", "id": 12, "geometry": [
            {"lat": 1.0, "lon": 1.0}, {"lat": 1.0, "lon": 0.0}]},
        {"type": "way", "id": 13, "geometry": [
            {"lat": 0.0, "lon": 0.0}, {"lat": 1.0, "lon": 0.0}]},
        {"type": "way", "id": 14, "geometry": [
            {"lat": 5.0, "lon": 5.0}, {"lat": 5.0, "lon": 6.0}, {"lat": 6.0, "lon": 6.0},
            {"lat": 6.0, "lon": 5.0}, {"lat": 5.0, "lon": 5.0}]},
        {"type": "way", "id": 15, "geometry": [
            {"lat": 0.2, "lon": 0.2}, {"lat": 0.2, "lon": 0.4}, {"lat": 0.4, "lon": 0.4},
            {"lat": 0.4, "lon": 0.2}, {"lat": 0.2, "lon": 0.2}]},
        {"type": "node", "id": 1, "lat": 0.5, "lon": 0.5}
    ]
}"#;

const STREETS_CELL_A: &str = r#"{"elements": [
    {"type": "way", "id": 1, "tags": {"highway": "residential", "name": "Main Street"},
     "geometry": [{"lat": 0.1, "lon": 0.0}, {"lat": 0.1, "lon": 0.5}]},
    {"type": "way", "id": 2, "tags": {"highway": "primary", "junction": "roundabout"},
     "geometry": [{"lat": 0.3, "lon": 0.3}, {"lat": 0.3, "lon": 0.31}, {"lat": 0.31, "lon": 0.31},
                  {"lat": 0.31, "lon": 0.3}, {"lat": 0.3, "lon": 0.3}]}
]}"#;

const STREETS_CELL_B: &str = r#"{"elements": [
    {"type": "way", "id": 1, "tags": {"highway": "residential", "name": "Main Street"},
     "geometry": [{"lat": 0.1, "lon": 0.0}, {"lat": 0.1, "lon": 0.5}]},
    {"type": "way", "id": 3, "tags": {"highway": "residential", "name": "Main Street"},
     "geometry": [{"lat": 0.1, "lon": 0.5}, {"lat": 0.1, "lon": 1.0}]}
]}"#;

fn testville() -> PlaceDescriptor {
    PlaceDescriptor::new(123, OsmType::Relation, "Testville")
}

fn feature_types(map: &GeneratedMap) -> Vec<(String, &'static str)> {
    map.collection
        .features
        .iter()
        .map(|f| {
            let id = match &f.id {
                Some(geojson::feature::Id::String(s)) => s.clone(),
                other => panic!("unexpected id {:?}", other),
            };
            let kind = match &f.geometry.as_ref().unwrap().value {
                geojson::Value::LineString(_) => "LineString",
                geojson::Value::Polygon(_) => "Polygon",
                geojson::Value::MultiPolygon(_) => "MultiPolygon",
                _ => "other",
            };
            (id, kind)
        })
        .collect()
}

fn generated(place: PlaceDescriptor, mode: Mode, body: &str) -> GeneratedMap {
    let response = parse_response(body).unwrap();
    let assembly = osm_to_geojson(&response.elements, mode).unwrap();
    GeneratedMap {
        place,
        mode,
        collection: assembly.collection,
        warnings: assembly.warnings,
        generated_at: Utc::now(),
    }
}

#[test]
fn test_boundary_relation_pipeline() {
    let map = generated(testville(), Mode::Boundary, BOUNDARY_RESPONSE);
    let types = feature_types(&map);

    // Relation first (input order), then each way on its own
    assert_eq!(types[0], ("relation/123".to_string(), "MultiPolygon"));
    assert_eq!(types[1], ("way/11".to_string(), "LineString"));
    assert_eq!(types[4], ("way/14".to_string(), "Polygon"));
    assert_eq!(types.len(), 6);
    assert!(map.warnings.is_empty());

    let relation = &map.collection.features[0];
    assert_eq!(relation.property("name").unwrap(), "Testville");
    assert_eq!(relation.property("osm_type").unwrap(), "relation");
    assert_eq!(
        relation.property("geometry").unwrap()["type"],
        "MultiPolygon"
    );
    match &relation.geometry.as_ref().unwrap().value {
        geojson::Value::MultiPolygon(polygons) => {
            assert_eq!(polygons.len(), 2);
            // Holes are not modelled
            assert!(polygons.iter().all(|p| p.len() == 1));
        }
        other => panic!("expected multipolygon, got {:?}", other),
    }
}

#[test]
fn test_boundary_statistics_reprojected() {
    let map = generated(testville(), Mode::Boundary, BOUNDARY_RESPONSE);
    let calc = StatisticsCalculator::from_collection(&map.collection);
    let stats = calc.summary(DEFAULT_TOP_N);

    // Relation (two ~1° squares) plus the closed island way and inner way as polygons
    assert!(stats.area_km2 > 20_000.0, "area was {}", stats.area_km2);
    assert!(stats.length_km > 0.0);
    assert_eq!(stats.total_features, 6);
}

#[test]
fn test_streets_fan_out_pipeline() {
    let cells = vec![
        parse_response(STREETS_CELL_A).unwrap(),
        parse_response(STREETS_CELL_B).unwrap(),
    ];
    let merged = merge_responses(cells);
    let assembly = osm_to_geojson(&merged.elements, Mode::Streets).unwrap();

    let kinds: Vec<_> = assembly
        .collection
        .features
        .iter()
        .map(|f| f.geometry.as_ref().unwrap().value.clone())
        .collect();
    assert_eq!(kinds.len(), 3);
    assert!(kinds
        .iter()
        .all(|v| matches!(v, geojson::Value::LineString(_))));

    let stats = StatisticsCalculator::from_collection(&assembly.collection).summary(DEFAULT_TOP_N);
    assert_eq!(stats.street_types[0].value, "residential");
    assert_eq!(stats.street_types[0].count, 2);
    assert_eq!(stats.top_names[0].value, "Main Street");
    assert!(stats.density_km_per_km2.is_none());
}

#[test]
fn test_session_holds_latest_result() {
    let place = testville();
    let session = Session::new()
        .with_place(place.clone())
        .with_result(generated(place.clone(), Mode::Boundary, BOUNDARY_RESPONSE))
        .with_result(generated(place, Mode::Streets, STREETS_CELL_A));

    let current = session.current.unwrap();
    assert_eq!(current.mode, Mode::Streets);
    assert_eq!(current.download_name(), "Testville_streets.geojson");

    let text = current.to_geojson_string().unwrap();
    let parsed: geojson::GeoJson = text.parse().unwrap();
    assert!(matches!(parsed, geojson::GeoJson::FeatureCollection(_)));
}

#[test]
fn test_streets_query_for_testville() {
    let query = QueryBuilder::default().build(&testville(), Mode::Streets);
    assert!(query.contains("3600000123"));
}
