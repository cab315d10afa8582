//! Element → geometry conversion.

use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon, Validation};
use tracing::{debug, warn};

use super::index::ElementIndex;
use super::rings::build_rings;
use crate::error::{AssemblyWarning, ElementRef};
use crate::models::{Geometry, OsmType, RawElement, Relation, Way};
use crate::overpass::Mode;

/// `Ok(None)`: element kind is not assembled in this mode.
/// `Err`: element was dropped.
pub type AssemblyResult = std::result::Result<Option<Geometry>, AssemblyWarning>;

/// Converts raw elements of one response into geometries
pub struct GeometryAssembler<'a> {
    index: &'a ElementIndex<'a>,
    mode: Mode,
}

impl<'a> GeometryAssembler<'a> {
    pub fn new(index: &'a ElementIndex<'a>, mode: Mode) -> Self {
        Self { index, mode }
    }

    pub fn assemble(&self, element: &RawElement) -> AssemblyResult {
        let result = match element {
            RawElement::Way(way) => way_geometry(way, self.mode)
                .map(Some)
                .map_err(|reason| warning(OsmType::Way, way.id, reason)),
            RawElement::Relation(rel) if self.mode == Mode::Boundary => self
                .relation_geometry(rel)
                .map(Some)
                .map_err(|reason| warning(OsmType::Relation, rel.id, reason)),
            RawElement::Relation(_) | RawElement::Node(_) | RawElement::Other => Ok(None),
        };

        if let Err(w) = &result {
            warn!("{}", w);
        }
        result
    }

    fn relation_geometry(&self, rel: &Relation) -> Result<Geometry, String> {
        let mut unresolved = 0;
        let segments: Vec<Vec<Coord<f64>>> = rel
            .members
            .iter()
            .filter(|m| m.is_outer_way())
            .filter_map(|m| match self.index.get(m.reference) {
                Some(way) => Some(way.coords()),
                None if !m.geometry.is_empty() => {
                    Some(m.geometry.iter().copied().map(Coord::from).collect())
                }
                None => {
                    unresolved += 1;
                    None
                }
            })
            .collect();

        let ring_set = build_rings(segments);
        if unresolved > 0 || ring_set.dropped > 0 {
            debug!(
                "relation/{}: {} outer members unresolved, {} dropped",
                rel.id, unresolved, ring_set.dropped
            );
        }

        let mut rings = ring_set.rings;
        match rings.len() {
            0 => Err("no valid outer rings".to_string()),
            1 => Ok(Geometry::Polygon(Polygon::new(rings.remove(0), vec![]))),
            _ => union_rings(rings),
        }
    }
}

fn warning(osm_type: OsmType, osm_id: i64, reason: String) -> AssemblyWarning {
    AssemblyWarning {
        element: ElementRef { osm_type, osm_id },
        reason,
    }
}

/// Classify a single way.
///
/// Closed ways of at least four vertices are polygons, except in streets mode
/// where every way stays a line (a roundabout is still a street).
pub fn way_geometry(way: &Way, mode: Mode) -> Result<Geometry, String> {
    let coords = way.coords();
    if coords.len() < 2 {
        return Err(format!("fewer than 2 coordinates ({})", coords.len()));
    }

    let closed = coords.len() >= 4 && coords.first() == coords.last();
    match mode {
        Mode::Boundary if closed => Ok(Geometry::Polygon(Polygon::new(
            LineString::new(coords),
            vec![],
        ))),
        Mode::Boundary | Mode::Streets => Ok(Geometry::LineString(LineString::new(coords))),
    }
}

/// Union outer rings and keep one exterior ring per disjoint component.
fn union_rings(rings: Vec<LineString<f64>>) -> Result<Geometry, String> {
    let unioned = rings
        .into_iter()
        .map(|ring| MultiPolygon::new(vec![Polygon::new(ring, vec![])]))
        .fold(MultiPolygon::new(vec![]), |acc, next| acc.union(&next));

    let repaired = repair(unioned)?;

    let mut exteriors: Vec<Polygon<f64>> = repaired
        .0
        .into_iter()
        .map(|p| Polygon::new(p.exterior().clone(), vec![]))
        .collect();

    match exteriors.len() {
        0 => Err("union produced an empty geometry".to_string()),
        1 => Ok(Geometry::Polygon(exteriors.remove(0))),
        _ => Ok(Geometry::MultiPolygon(MultiPolygon::new(exteriors))),
    }
}

/// Drop collapsed components and re-node the result until it validates.
fn repair(multi: MultiPolygon<f64>) -> Result<MultiPolygon<f64>, String> {
    let cleaned = MultiPolygon::new(
        multi
            .0
            .into_iter()
            .filter(|p| p.exterior().0.len() >= 4)
            .collect(),
    );
    if cleaned.is_valid() {
        return Ok(cleaned);
    }

    // A self-union re-runs the overlay, which splits overlaps and self-intersections
    let renoded = cleaned.union(&MultiPolygon::new(vec![]));
    if renoded.is_valid() {
        Ok(renoded)
    } else {
        Err("union result could not be made valid".to_string())
    }
}
