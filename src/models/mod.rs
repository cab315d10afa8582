//! Core data models: place descriptors, raw Overpass elements and assembled geometry.

pub mod element;
pub mod geometry;
pub mod place;

pub use element::{LatLon, Member, Node, OverpassResponse, RawElement, Relation, Tags, Way};
pub use geometry::{Geometry, GeometryKind};
pub use place::{BoundingBox, OsmType, PlaceDescriptor, PlaceKind};
