//! Multiplier tables and the composite hazard score
//!
//! Each factor (velocity, acceleration, grade, curvature) is bucketed by how far
//! the current value deviates from its baseline, in steps of 10 % of their
//! midpoint, and the bucket picks a multiplier from a fixed table. The hazard
//! of a sample is the product of the four multipliers.

/// Grade multipliers, one per 10 % deviation bucket
pub const GRADE_MULTI: [f64; 16] = [
    1.1, 1.2, 1.3, 1.4, 1.5, 1.5, 1.6, 1.6, 1.7, 1.7, 1.8, 1.8, 1.8, 1.9, 1.9, 2.0,
];

/// Curve multipliers (same calibration as grade)
pub const CURVE_MULTI: [f64; 16] = GRADE_MULTI;

/// Velocity multipliers: `1 + i·0.1` for `i` in `1..=10`
pub const VELOCITY_MULTI: [f64; 10] = [1.1, 1.2, 1.3, 1.4, 1.5, 1.6, 1.7, 1.8, 1.9, 2.0];

/// Acceleration multipliers
pub const ACC_MULTI: [f64; 10] = [1.1, 1.3, 1.4, 1.6, 1.7, 1.8, 1.8, 1.9, 1.9, 2.0];

/// Severity bucket of `a` relative to `b`, saturated to `0..n`
///
/// The bucket is `|⌊10·|a − b| / ((a + b) / 2)⌋|`. A zero midpoint means no
/// measurable deviation and maps to 0; a non-finite ratio maps to the last bucket.
pub fn bucket(a: f64, b: f64, n: usize) -> usize {
    let last = n.saturating_sub(1);
    let midpoint = (a + b) / 2.0;
    if midpoint == 0.0 {
        return 0;
    }

    let level = (10.0 * (a - b).abs() / midpoint).floor().abs();
    if level.is_nan() || level >= last as f64 {
        return last;
    }
    level as usize
}

/// Multiplier from `table` when `value` exceeds `baseline`, 1 otherwise
#[inline]
pub fn multiplier(table: &[f64], value: f64, baseline: f64) -> f64 {
    if value > baseline {
        table[bucket(value, baseline, table.len())]
    } else {
        1.0
    }
}

/// Inputs to the hazard score of one sample
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HazardFactors {
    pub velocity: f64,
    pub running_avg_velocity: f64,
    pub acceleration: f64,
    pub running_avg_acceleration: f64,
    pub grade: f64,
    pub running_avg_grade: f64,
    pub turn_radius: f64,
}

impl HazardFactors {
    pub fn velocity_multiplier(&self) -> f64 {
        multiplier(&VELOCITY_MULTI, self.velocity, self.running_avg_velocity)
    }

    pub fn acceleration_multiplier(&self) -> f64 {
        multiplier(
            &ACC_MULTI,
            self.acceleration,
            self.running_avg_acceleration,
        )
    }

    pub fn grade_multiplier(&self) -> f64 {
        multiplier(&GRADE_MULTI, self.grade, self.running_avg_grade)
    }

    /// Curvature is compared against a fixed baseline of 0, so any turn at all
    /// lands in the last bucket.
    pub fn curve_multiplier(&self) -> f64 {
        multiplier(&CURVE_MULTI, self.turn_radius, 0.0)
    }

    /// Product of the four factor multipliers
    pub fn hazard(&self) -> f64 {
        self.velocity_multiplier()
            * self.acceleration_multiplier()
            * self.grade_multiplier()
            * self.curve_multiplier()
    }
}
