//! Great-circle distance and distance units

use geo::Point;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6371000.0;

/// Meters in one statute mile
pub const METERS_PER_MILE: f64 = 1609.344;

/// Meters in one kilometer
pub const METERS_PER_KILOMETER: f64 = 1000.0;

/// Unit used for distances, and therefore for velocity (unit/s) and acceleration (unit/s²)
///
/// The multiplier tables were calibrated against miles, but every score is a ratio
/// between a value and its running average, so any unit yields the same hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometers,
    Meters,
}

impl DistanceUnit {
    /// How many meters one unit represents
    #[inline(always)]
    pub fn meters(self) -> f64 {
        match self {
            DistanceUnit::Miles => METERS_PER_MILE,
            DistanceUnit::Kilometers => METERS_PER_KILOMETER,
            DistanceUnit::Meters => 1.0,
        }
    }

    /// Convert a length in meters into this unit
    #[inline(always)]
    pub fn from_meters(self, meters: f64) -> f64 {
        meters / self.meters()
    }

    /// Convert a length in this unit into meters
    #[inline(always)]
    pub fn to_meters(self, value: f64) -> f64 {
        value * self.meters()
    }
}

/// Build a point from WGS84 degrees (x = longitude, y = latitude)
#[inline(always)]
pub fn wgs84_point(lat: f64, lon: f64) -> Point<f64> {
    Point::new(lon, lat)
}

/// Haversine distance between two WGS84 points in meters
///
/// Coincident points give exactly 0 and antipodal points half the circumference.
/// The haversine term is clamped to [0, 1] so rounding can never produce NaN.
#[inline]
pub fn haversine_meters(p1: Point<f64>, p2: Point<f64>) -> f64 {
    let lat1 = p1.y().to_radians();
    let lat2 = p2.y().to_radians();
    let delta_lat = (p2.y() - p1.y()).to_radians();
    let delta_lon = (p2.x() - p1.x()).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Great-circle distance between two WGS84 points in the given unit
#[inline]
pub fn distance(p1: Point<f64>, p2: Point<f64>, unit: DistanceUnit) -> f64 {
    unit.from_meters(haversine_meters(p1, p2))
}
