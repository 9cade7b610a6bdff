//! Route samples and input validation
//!
//! This module provides the `Sample` record consumed by the engine, fail-early
//! validation of a whole sequence, and conversion from parsed GPX data.

use crate::{HazardError, Result, utils};
use geo::Point;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One raw geolocated, timestamped route point
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
    /// Altitude in meters
    pub altitude: f64,
    /// Timestamp in seconds, non-decreasing along the route
    pub time: f64,
    /// 0-based position in the sequence
    pub index: usize,
}

impl Sample {
    pub fn new(index: usize, latitude: f64, longitude: f64, altitude: f64, time: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
            time,
            index,
        }
    }

    /// Position as a `geo` point (x = longitude, y = latitude)
    #[inline]
    pub fn point(&self) -> Point<f64> {
        utils::wgs84_point(self.latitude, self.longitude)
    }
}

/// Build an indexed sample sequence from `(latitude, longitude, altitude, time)` tuples
pub fn index_samples<I>(points: I) -> Vec<Sample>
where
    I: IntoIterator<Item = (f64, f64, f64, f64)>,
{
    points
        .into_iter()
        .enumerate()
        .map(|(index, (lat, lon, alt, time))| Sample::new(index, lat, lon, alt, time))
        .collect()
}

/// Check a sample sequence against the input contract before any computation
///
/// Fails on the first offending sample with an error naming its index and field.
pub fn validate(samples: &[Sample]) -> Result<()> {
    if samples.is_empty() {
        return Err(HazardError::EmptyInput);
    }

    let mut prev_time: Option<f64> = None;
    for (position, sample) in samples.iter().enumerate() {
        if sample.index != position {
            return Err(HazardError::InvalidSample {
                index: position,
                field: "index",
                value: sample.index as f64,
            });
        }
        check_field(position, "latitude", sample.latitude, -90.0, 90.0)?;
        check_field(position, "longitude", sample.longitude, -180.0, 180.0)?;
        check_field(position, "altitude", sample.altitude, f64::MIN, f64::MAX)?;
        check_field(position, "time", sample.time, f64::MIN, f64::MAX)?;

        if let Some(previous) = prev_time {
            if sample.time < previous {
                return Err(HazardError::NonMonotonicTime {
                    index: position,
                    previous,
                    current: sample.time,
                });
            }
        }
        prev_time = Some(sample.time);
    }

    Ok(())
}

#[inline]
fn check_field(index: usize, field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(HazardError::InvalidSample {
            index,
            field,
            value,
        });
    }
    Ok(())
}

/// Flatten every track and segment of a GPX document into an indexed sample sequence
///
/// Documents without track points fall back to their planned routes (`<rte>`).
/// Time is measured in seconds from the first timestamp. When any point lacks a
/// timestamp the whole route falls back to synthetic times `index + 1`, and
/// missing elevations are read as 0.
pub fn samples_from_gpx(gpx: &gpx::Gpx) -> Result<Vec<Sample>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("sample::samples_from_gpx");

    let mut waypoints: Vec<&gpx::Waypoint> = gpx
        .tracks
        .iter()
        .flat_map(|track| track.segments.iter())
        .flat_map(|segment| segment.points.iter())
        .collect();
    if waypoints.is_empty() {
        waypoints = gpx.routes.iter().flat_map(|route| route.points.iter()).collect();
        if !waypoints.is_empty() {
            tracing::debug!("GPX has no tracks, reading {} route points", waypoints.len());
        }
    }

    if waypoints.is_empty() {
        return Err(HazardError::EmptyInput);
    }

    let timestamps: Option<Vec<time::OffsetDateTime>> = waypoints
        .iter()
        .map(|waypoint| waypoint.time.clone().map(time::OffsetDateTime::from))
        .collect();
    if timestamps.is_none() {
        tracing::warn!(
            "GPX route has points without timestamps, using synthetic 1 s spacing for {} points",
            waypoints.len()
        );
    }

    let missing_elevation = waypoints.iter().filter(|w| w.elevation.is_none()).count();
    if missing_elevation > 0 {
        tracing::warn!(
            "{} of {} GPX points have no elevation, treating them as 0 m",
            missing_elevation,
            waypoints.len()
        );
    }

    let samples = waypoints
        .iter()
        .enumerate()
        .map(|(index, waypoint)| {
            let seconds = match &timestamps {
                Some(times) => (times[index] - times[0]).as_seconds_f64(),
                None => (index + 1) as f64,
            };
            Sample::new(
                index,
                waypoint.point().y(),
                waypoint.point().x(),
                waypoint.elevation.unwrap_or(0.0),
                seconds,
            )
        })
        .collect();

    Ok(samples)
}
