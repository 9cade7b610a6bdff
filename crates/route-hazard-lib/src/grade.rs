//! Windowed road grade from altitude and travelled distance

use crate::Sample;
use crate::utils::DistanceUnit;

/// Cumulative distance travelled up to and including each sample
pub fn cumulative_distances(distances: &[f64]) -> Vec<f64> {
    distances
        .iter()
        .scan(0.0, |total, &d| {
            *total += d;
            Some(*total)
        })
        .collect()
}

/// Grade in percent over the trailing `window` samples
///
/// `grade[i]` compares sample `i` against sample `i - window`. The first `window`
/// samples and any stretch with no horizontal distance get a grade of 0.
/// Altitudes are meters, so the run is converted from `unit` to meters first.
pub fn grades(samples: &[Sample], distances: &[f64], window: usize, unit: DistanceUnit) -> Vec<f64> {
    let window = window.max(1);
    let cumulative = cumulative_distances(distances);

    (0..samples.len())
        .map(|i| {
            if i < window {
                return 0.0;
            }
            let run = unit.to_meters(cumulative[i] - cumulative[i - window]);
            if run == 0.0 {
                return 0.0;
            }
            100.0 * (samples[i].altitude - samples[i - window].altitude) / run
        })
        .collect()
}
