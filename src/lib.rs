//! Placeshape - turn a named place into GeoJSON.
//!
//! Looks a place up, fetches its boundary or street network from Overpass,
//! assembles the raw elements into GeoJSON features and derives statistics.

pub mod assemble;
pub mod config;
pub mod error;
pub mod generator;
pub mod models;
pub mod nominatim;
pub mod overpass;
pub mod session;
pub mod stats;

pub use config::Config;
pub use error::{AssemblyWarning, ElementRef, Error, Result};
pub use generator::Generator;
pub use models::{Geometry, OsmType, PlaceDescriptor, PlaceKind};
pub use overpass::Mode;
pub use session::{GeneratedMap, Session};
