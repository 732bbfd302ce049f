//! Web-Mercator projection between WGS84 degrees and planar radians.
//!
//! Planar `x` spans `[-π, π]` and planar `y` grows northwards. Tile indices follow the usual
//! slippy-map (TMS/XYZ) layout with the origin in the north-west corner.

use std::f64::consts::{FRAC_PI_4, PI};

/// Tile edge length in pixels.
pub const TILE_SIZE: u32 = 256;

/// Highest zoom level the map overlay will request.
pub const MAX_ZOOM: u32 = 19;

/// Mean earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub fn lon_to_x(lon: f64) -> f64 {
    lon.to_radians()
}

pub fn lat_to_y(lat: f64) -> f64 {
    (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln()
}

pub fn x_to_lon(x: f64) -> f64 {
    x.to_degrees()
}

pub fn y_to_lat(y: f64) -> f64 {
    (2.0 * y.exp().atan() - PI / 2.0).to_degrees()
}

fn tiles_per_axis(zoom: u32) -> f64 {
    f64::from(1u32 << zoom.min(31))
}

/// Tile column containing planar `x` at `zoom`.
pub fn x_to_tile_x(x: f64, zoom: u32) -> i64 {
    (tiles_per_axis(zoom) * (x + PI) / (2.0 * PI)).floor() as i64
}

/// Tile row containing planar `y` at `zoom`.
pub fn y_to_tile_y(y: f64, zoom: u32) -> i64 {
    (tiles_per_axis(zoom) * (PI - y) / (2.0 * PI)).floor() as i64
}

/// Planar `x` of the west edge of tile column `tile_x`.
pub fn tile_x_to_x(tile_x: i64, zoom: u32) -> f64 {
    tile_x as f64 * 2.0 * PI / tiles_per_axis(zoom) - PI
}

/// Planar `y` of the north edge of tile row `tile_y`.
pub fn tile_y_to_y(tile_y: i64, zoom: u32) -> f64 {
    PI - tile_y as f64 * 2.0 * PI / tiles_per_axis(zoom)
}

pub fn lon_to_tile_x(lon: f64, zoom: u32) -> i64 {
    x_to_tile_x(lon_to_x(lon), zoom)
}

pub fn lat_to_tile_y(lat: f64, zoom: u32) -> i64 {
    y_to_tile_y(lat_to_y(lat), zoom)
}

/// Great-circle distance in meters.
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

#[cfg(test)]
#[path = "../../tests/unit/geo/projection.rs"]
mod tests;
