//! Overpass response → GeoJSON feature collection.
//!
//! Ways become lines or polygons depending on closure; boundary relations
//! become the union of their outer rings. Inner (hole) members are ignored.

mod collection;
mod geometry;
mod index;
mod rings;

use geojson::FeatureCollection;
use tracing::info;

pub use collection::{build_feature, validate_collection, FeatureCollectionBuilder};
pub use geometry::{way_geometry, AssemblyResult, GeometryAssembler};
pub use index::ElementIndex;
pub use rings::{build_rings, RingSet};

use crate::error::{AssemblyWarning, Result};
use crate::models::RawElement;
use crate::overpass::Mode;

/// A validated collection plus the elements dropped on the way
#[derive(Debug)]
pub struct Assembly {
    pub collection: FeatureCollection,
    pub warnings: Vec<AssemblyWarning>,
}

/// Assemble every element in input order and validate the result.
///
/// Individual elements that fail are dropped with a warning; a collection that
/// fails validation is rejected outright.
pub fn osm_to_geojson(elements: &[RawElement], mode: Mode) -> Result<Assembly> {
    let index = ElementIndex::build(elements);
    let assembler = GeometryAssembler::new(&index, mode);

    let mut builder = FeatureCollectionBuilder::new();
    let mut warnings = Vec::new();

    for element in elements {
        match assembler.assemble(element) {
            Ok(Some(geometry)) => {
                if let (Some(osm_type), Some(osm_id), Some(tags)) =
                    (element.osm_type(), element.id(), element.tags())
                {
                    builder.push(build_feature(osm_type, osm_id, tags, &geometry));
                }
            }
            Ok(None) => {}
            Err(warning) => warnings.push(warning),
        }
    }

    info!(
        "Assembled {} features from {} elements ({} ways indexed, {} dropped)",
        builder.len(),
        elements.len(),
        index.len(),
        warnings.len()
    );

    let collection = builder.build();
    validate_collection(&collection)?;

    Ok(Assembly {
        collection,
        warnings,
    })
}
