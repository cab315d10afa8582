//! Cylindrical equal-area projection (`+proj=cea`, standard parallel 0)

use geo::{Coord, MapCoords};

/// WGS84 semi-major axis in metres
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Project a (lon, lat) coordinate in degrees to metres.
///
/// x = R·λ, y = R·sin φ. Areas are preserved; lengths are exact only along
/// the equator.
pub fn to_cea(c: Coord<f64>) -> Coord<f64> {
    Coord {
        x: EARTH_RADIUS_M * c.x.to_radians(),
        y: EARTH_RADIUS_M * c.y.to_radians().sin(),
    }
}

pub fn project(geometry: &geo::Geometry<f64>) -> geo::Geometry<f64> {
    geometry.map_coords(to_cea)
}
