//! Finite-difference kinematics and trailing running averages

use crate::Sample;
use crate::utils::{self, DistanceUnit};
use rayon::prelude::*;

/// Distance from the previous sample, 0 for the first one
///
/// Each entry only depends on two neighbouring samples, so the pass runs in parallel.
pub fn distances_from_prev(samples: &[Sample], unit: DistanceUnit) -> Vec<f64> {
    #[cfg(feature = "profiling")]
    profiling::scope!("kinematics::distances_from_prev");

    (0..samples.len())
        .into_par_iter()
        .map(|i| {
            if i == 0 {
                0.0
            } else {
                utils::distance(samples[i - 1].point(), samples[i].point(), unit)
            }
        })
        .collect()
}

/// Rate of change `delta / elapsed`, 0 when no time has elapsed
#[inline(always)]
pub fn rate(delta: f64, elapsed: f64) -> f64 {
    if elapsed == 0.0 { 0.0 } else { delta / elapsed }
}

/// Seconds between sample `i - 1` and sample `i`
#[inline(always)]
fn elapsed(samples: &[Sample], i: usize) -> f64 {
    samples[i].time - samples[i - 1].time
}

/// Velocity in distance units per second, 0 for the first sample
pub fn velocities(samples: &[Sample], distances: &[f64]) -> Vec<f64> {
    (0..samples.len())
        .map(|i| {
            if i == 0 {
                0.0
            } else {
                rate(distances[i], elapsed(samples, i))
            }
        })
        .collect()
}

/// Acceleration in distance units per second squared, 0 for the first sample
pub fn accelerations(samples: &[Sample], velocities: &[f64]) -> Vec<f64> {
    (0..samples.len())
        .map(|i| {
            if i == 0 {
                0.0
            } else {
                rate(velocities[i] - velocities[i - 1], elapsed(samples, i))
            }
        })
        .collect()
}

/// Simple moving average over the trailing `window` values, current one included
///
/// Indices with less than `window` values of history average whatever is available,
/// so every index gets a defined value. A window of 0 is treated as 1.
pub fn running_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);

    (0..values.len())
        .map(|i| {
            let history = if i + 1 < window {
                &values[..=i]
            } else {
                &values[i + 1 - window..=i]
            };
            history.iter().sum::<f64>() / history.len() as f64
        })
        .collect()
}
