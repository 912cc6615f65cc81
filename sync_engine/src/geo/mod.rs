//! Coordinate transformation into WGS84 latitude/longitude.
//!
//! Upstream records arrive either already geographic or projected in
//! Lambert-93 (EPSG:2154). Everything rendered on the map goes through
//! [`transform`], which never clamps: an invalid position is an error and
//! the facility carrying it is dropped by the caller.

mod lambert;

#[cfg(test)]
mod tests;

pub use lambert::{project_lambert93, unproject_lambert93};

use serde::Serialize;
use thiserror::Error;

pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Coordinate reference system a raw position is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceCrs {
    /// Geographic WGS84; `x` is longitude, `y` is latitude.
    Wgs84,
    /// RGF93 / Lambert-93; `x` is easting, `y` is northing, in meters.
    Lambert93,
}

/// A validated WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPosition {
    latitude: f64,
    longitude: f64,
}

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NonFinite {
                x: longitude,
                y: latitude,
            });
        }
        if !(MIN_LAT..=MAX_LAT).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(MIN_LON..=MAX_LON).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("non-finite coordinate (x: {x}, y: {y})")]
    NonFinite { x: f64, y: f64 },
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// Converts a raw coordinate pair in `crs` to a validated WGS84 position.
///
/// Pure function of its inputs and the fixed Lambert-93 parameter set.
pub fn transform(x: f64, y: f64, crs: SourceCrs) -> Result<GeoPosition, CoordinateError> {
    if !x.is_finite() || !y.is_finite() {
        return Err(CoordinateError::NonFinite { x, y });
    }

    match crs {
        SourceCrs::Wgs84 => GeoPosition::new(y, x),
        SourceCrs::Lambert93 => {
            let (latitude, longitude) = unproject_lambert93(x, y);
            GeoPosition::new(latitude, longitude)
        }
    }
}
