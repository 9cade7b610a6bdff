//! Turn-radius estimation from three consecutive samples

use crate::Sample;
use crate::utils::{self, DistanceUnit};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of leading samples whose turn radius is always 0
pub const WARM_UP_SAMPLES: usize = 4;

/// Heron radicands below this fraction of `s⁴` are treated as a flat triangle
const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// How a triangle of three consecutive samples is turned into a radius
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CurvatureModel {
    /// `2A / s3`: the height of the triangle over its long side.
    /// Only used as a relative severity signal by the scorer.
    #[default]
    Heuristic,
    /// `s1·s2·s3 / (4A)`: the circumscribed circle radius
    Circumradius,
}

/// Triangle area from its three side lengths (Heron's formula)
///
/// Returns 0 for degenerate triangles, including the slightly negative or
/// vanishing radicands that floating-point error produces for collinear points.
pub fn heron_area(a: f64, b: f64, c: f64) -> f64 {
    let s = (a + b + c) / 2.0;
    let radicand = s * (s - a) * (s - b) * (s - c);
    if radicand <= DEGENERATE_TOLERANCE * s.powi(4) {
        return 0.0;
    }
    radicand.sqrt()
}

/// Radius for a triangle with sides `s1 = |p0 p1|`, `s2 = |p1 p2|`, `s3 = |p0 p2|`
pub fn triangle_radius(s1: f64, s2: f64, s3: f64, model: CurvatureModel) -> f64 {
    let area = heron_area(s1, s2, s3);
    match model {
        CurvatureModel::Heuristic => {
            if s3 > 0.0 {
                2.0 * area / s3
            } else {
                0.0
            }
        }
        CurvatureModel::Circumradius => {
            if area > 0.0 {
                s1 * s2 * s3 / (4.0 * area)
            } else {
                0.0
            }
        }
    }
}

/// Turn radius at every sample, from the sample and its two predecessors
///
/// The first [`WARM_UP_SAMPLES`] entries are always 0.
pub fn turn_radii(samples: &[Sample], unit: DistanceUnit, model: CurvatureModel) -> Vec<f64> {
    (0..samples.len())
        .map(|i| {
            if i < WARM_UP_SAMPLES {
                return 0.0;
            }
            let p0 = samples[i - 2].point();
            let p1 = samples[i - 1].point();
            let p2 = samples[i].point();
            triangle_radius(
                utils::distance(p0, p1, unit),
                utils::distance(p1, p2, unit),
                utils::distance(p0, p2, unit),
                model,
            )
        })
        .collect()
}
