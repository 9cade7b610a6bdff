//! HazardProfile - Top-level pipeline from raw samples to hazard scores
//!
//! This module wires kinematics, grade, curvature and scoring together into one
//! derived sample per input sample, and exposes the minimal and full projections.

use crate::curvature::{self, CurvatureModel};
use crate::scoring::HazardFactors;
use crate::utils::DistanceUnit;
use crate::{HazardError, Result, Sample, grade, kinematics, sample};

use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for hazard computation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Number of trailing samples in running averages and in the grade window.
    /// Default: 3
    pub running_avg_points: usize,
    /// Unit for distances, velocities and accelerations.
    /// Default: miles
    pub distance_unit: DistanceUnit,
    /// Turn-radius definition.
    /// Default: [`CurvatureModel::Heuristic`]
    pub curvature_model: CurvatureModel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            running_avg_points: 3,
            distance_unit: DistanceUnit::default(),
            curvature_model: CurvatureModel::default(),
        }
    }
}

impl Config {
    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.running_avg_points == 0 {
            return Err(HazardError::InvalidConfig(
                "running_avg_points must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A sample augmented with its kinematic, geometric and hazard fields
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DerivedSample {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub time: f64,
    pub index: usize,
    pub distance_from_prev: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub running_avg_velocity: f64,
    pub running_avg_acceleration: f64,
    pub grade: f64,
    pub running_avg_grade: f64,
    pub turn_radius: f64,
    pub hazard: f64,
}

impl DerivedSample {
    /// The factors the hazard of this sample was scored from
    pub fn factors(&self) -> HazardFactors {
        HazardFactors {
            velocity: self.velocity,
            running_avg_velocity: self.running_avg_velocity,
            acceleration: self.acceleration,
            running_avg_acceleration: self.running_avg_acceleration,
            grade: self.grade,
            running_avg_grade: self.running_avg_grade,
            turn_radius: self.turn_radius,
        }
    }

    /// Minimal `(latitude, longitude, hazard)` projection
    #[inline]
    pub fn minimal(&self) -> MinimalRecord {
        MinimalRecord {
            latitude: self.latitude,
            longitude: self.longitude,
            hazard: self.hazard,
        }
    }
}

/// Position and hazard only, for map overlays
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MinimalRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub hazard: f64,
}

/// Aggregate statistics for a scored route
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HazardSummary {
    /// Number of samples in the route
    pub sample_count: usize,
    /// Total distance in the configured unit
    pub total_distance: f64,
    /// Highest hazard of any sample
    pub max_hazard: f64,
    /// Mean hazard over all samples
    pub mean_hazard: f64,
    /// Samples with a hazard above the neutral score of 1
    pub hazardous_samples: usize,
}

/// Derive every field for an already validated sample sequence
///
/// This never fails: zero elapsed time, zero distance, flat triangles and zero
/// bucket denominators all fall back to neutral values, so every output is finite
/// for finite input. An empty slice yields an empty result.
pub fn derive_samples(samples: &[Sample], config: &Config) -> Vec<DerivedSample> {
    #[cfg(feature = "profiling")]
    profiling::scope!("profile::derive");

    let window = config.running_avg_points.max(1);
    let unit = config.distance_unit;

    let distances = kinematics::distances_from_prev(samples, unit);
    let velocities = kinematics::velocities(samples, &distances);
    let accelerations = kinematics::accelerations(samples, &velocities);
    let avg_velocities = kinematics::running_average(&velocities, window);
    let avg_accelerations = kinematics::running_average(&accelerations, window);

    let grades = grade::grades(samples, &distances, window, unit);
    let avg_grades = kinematics::running_average(&grades, window);

    let radii = curvature::turn_radii(samples, unit, config.curvature_model);

    samples
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut derived = DerivedSample {
                latitude: s.latitude,
                longitude: s.longitude,
                altitude: s.altitude,
                time: s.time,
                index: s.index,
                distance_from_prev: distances[i],
                velocity: velocities[i],
                acceleration: accelerations[i],
                running_avg_velocity: avg_velocities[i],
                running_avg_acceleration: avg_accelerations[i],
                grade: grades[i],
                running_avg_grade: avg_grades[i],
                turn_radius: radii[i],
                hazard: 0.0,
            };
            // Nothing to compare the first sample against
            if i > 0 {
                derived.hazard = derived.factors().hazard();
            }
            derived
        })
        .collect()
}

/// Hazard scores for one route
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HazardProfile {
    /// One derived sample per input sample, in input order
    samples: Vec<DerivedSample>,
    /// Configuration the profile was computed with
    config: Config,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl HazardProfile {
    /// Validate the input and compute the hazard profile of a route
    ///
    /// Fails before any computation if the configuration or a sample breaks the
    /// input contract (see [`sample::validate`]).
    pub fn compute(samples: &[Sample], config: &Config) -> Result<Self> {
        config.validate()?;
        sample::validate(samples)?;

        let derived = derive_samples(samples, config);
        tracing::debug!(
            "Computed hazard profile for {} samples (window {}, {:?})",
            derived.len(),
            config.running_avg_points,
            config.distance_unit
        );

        Ok(Self {
            samples: derived,
            config: config.clone(),
        })
    }

    /// Compute profiles for several independent routes in parallel
    ///
    /// Results keep the input order. The first invalid route fails the batch.
    pub fn compute_many(routes: &[Vec<Sample>], config: &Config) -> Result<Vec<Self>> {
        #[cfg(feature = "profiling")]
        profiling::scope!("profile::compute_many");

        config.validate()?;
        routes
            .par_iter()
            .map(|samples| Self::compute(samples, config))
            .collect()
    }

    /// Compute the hazard profile of a parsed GPX document
    pub fn from_gpx(gpx: &gpx::Gpx, config: &Config) -> Result<Self> {
        let samples = sample::samples_from_gpx(gpx)?;
        Self::compute(&samples, config)
    }

    /// Full projection: every derived field of every sample
    #[inline]
    pub fn samples(&self) -> &[DerivedSample] {
        &self.samples
    }

    /// Consume the profile, keeping the derived samples
    #[inline]
    pub fn into_samples(self) -> Vec<DerivedSample> {
        self.samples
    }

    /// Minimal projection: `(latitude, longitude, hazard)` per sample
    pub fn minimal(&self) -> Vec<MinimalRecord> {
        self.samples.iter().map(DerivedSample::minimal).collect()
    }

    /// Hazard of the sample at `index`
    #[inline]
    pub fn hazard_at(&self, index: usize) -> Option<f64> {
        self.samples.get(index).map(|s| s.hazard)
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Aggregate statistics over the whole route
    pub fn summary(&self) -> HazardSummary {
        let sample_count = self.samples.len();
        if sample_count == 0 {
            return HazardSummary::default();
        }

        let total_distance = self.samples.iter().map(|s| s.distance_from_prev).sum();
        let hazard_sum: f64 = self.samples.iter().map(|s| s.hazard).sum();
        let max_hazard = self
            .samples
            .iter()
            .map(|s| s.hazard)
            .fold(f64::NEG_INFINITY, f64::max);
        let hazardous_samples = self.samples.iter().filter(|s| s.hazard > 1.0).count();

        HazardSummary {
            sample_count,
            total_distance,
            max_hazard,
            mean_hazard: hazard_sum / sample_count as f64,
            hazardous_samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::index_samples;

    /// A winding, climbing route with irregular timing (around Golden, CO)
    fn create_test_route(n: usize) -> Vec<Sample> {
        index_samples((0..n).map(|i| {
            let t = i as f64;
            (
                39.74 + t * 0.0002 + (t * 0.7).sin() * 0.0001,
                -105.22 - t * 0.0003 + (t * 0.4).cos() * 0.0001,
                1800.0 + t * 1.5 + (t * 0.3).sin() * 4.0,
                t * 5.0 + (t * 1.3).sin().abs() * 2.0,
            )
        }))
    }

    fn assert_all_finite(profile: &HazardProfile) {
        for s in profile.samples() {
            let fields = [
                s.distance_from_prev,
                s.velocity,
                s.acceleration,
                s.running_avg_velocity,
                s.running_avg_acceleration,
                s.grade,
                s.running_avg_grade,
                s.turn_radius,
                s.hazard,
            ];
            assert!(fields.iter().all(|f| f.is_finite()), "non-finite field at {}", s.index);
        }
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.running_avg_points, 3);
        assert_eq!(config.distance_unit, DistanceUnit::Miles);
        assert_eq!(config.curvature_model, CurvatureModel::Heuristic);
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let config = Config {
            running_avg_points: 0,
            ..Default::default()
        };
        let samples = create_test_route(5);
        assert!(matches!(
            HazardProfile::compute(&samples, &config),
            Err(HazardError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(
            HazardProfile::compute(&[], &Config::default()),
            Err(HazardError::EmptyInput)
        ));
        assert!(derive_samples(&[], &Config::default()).is_empty());
    }

    #[test]
    fn test_first_sample_is_neutral() {
        let profile = HazardProfile::compute(&create_test_route(50), &Config::default()).unwrap();
        let first = profile.samples()[0];
        assert_eq!(first.hazard, 0.0);
        assert_eq!(first.distance_from_prev, 0.0);
        assert_eq!(first.velocity, 0.0);
        assert_eq!(first.acceleration, 0.0);
    }

    #[test]
    fn test_one_record_per_sample() {
        let samples = create_test_route(50);
        let profile = HazardProfile::compute(&samples, &Config::default()).unwrap();
        assert_eq!(profile.len(), 50);
        for (input, derived) in samples.iter().zip(profile.samples()) {
            assert_eq!(input.index, derived.index);
            assert_eq!(input.time, derived.time);
            assert_eq!(input.altitude, derived.altitude);
        }
        assert_all_finite(&profile);
    }

    #[test]
    fn test_hazard_is_product_of_multipliers() {
        let profile = HazardProfile::compute(&create_test_route(50), &Config::default()).unwrap();
        for s in &profile.samples()[1..] {
            assert!(s.hazard >= 1.0);
            assert!(s.hazard <= 2.0 * 2.0 * 2.0 * 2.0);
            assert_eq!(s.hazard, s.factors().hazard());
        }
        assert!(profile.samples().iter().any(|s| s.hazard > 1.0));
    }

    #[test]
    fn test_single_sample() {
        let samples = index_samples([(39.74, -105.22, 1800.0, 0.0)]);
        let profile = HazardProfile::compute(&samples, &Config::default()).unwrap();
        assert_eq!(profile.len(), 1);
        let s = profile.samples()[0];
        assert_eq!(
            [
                s.distance_from_prev,
                s.velocity,
                s.acceleration,
                s.running_avg_velocity,
                s.running_avg_acceleration,
                s.grade,
                s.running_avg_grade,
                s.turn_radius,
                s.hazard,
            ],
            [0.0; 9]
        );
    }

    #[test]
    fn test_short_routes_do_not_fail() {
        for n in 1..=4 {
            let profile = HazardProfile::compute(&create_test_route(n), &Config::default()).unwrap();
            assert_eq!(profile.len(), n);
            assert!(profile.samples().iter().all(|s| s.turn_radius == 0.0));
            assert!(profile.samples().iter().take(3).all(|s| s.grade == 0.0));
            assert_all_finite(&profile);
        }
    }

    #[test]
    fn test_duplicate_timestamp() {
        let mut samples = create_test_route(12);
        samples[5].time = samples[4].time;
        let profile = HazardProfile::compute(&samples, &Config::default()).unwrap();
        assert_eq!(profile.samples()[5].velocity, 0.0);
        assert_eq!(profile.samples()[5].acceleration, 0.0);
        assert_all_finite(&profile);
    }

    #[test]
    fn test_stationary_rider() {
        let samples = index_samples((0..8).map(|_| (45.0, 7.0, 500.0, 10.0)));
        let profile = HazardProfile::compute(&samples, &Config::default()).unwrap();
        assert_all_finite(&profile);
        for s in &profile.samples()[1..] {
            assert_eq!(s.distance_from_prev, 0.0);
            assert_eq!(s.velocity, 0.0);
            assert_eq!(s.hazard, 1.0);
        }
    }

    #[test]
    fn test_straight_constant_speed_route() {
        // Equally spaced along the equator, 10 s apart
        let samples = index_samples((0..8).map(|i| (0.0, i as f64 * 0.001, 0.0, i as f64 * 10.0)));
        let profile = HazardProfile::compute(&samples, &Config::default()).unwrap();
        assert_all_finite(&profile);

        for s in profile.samples() {
            assert_eq!(s.turn_radius, 0.0);
            assert_eq!(s.grade, 0.0);
            assert_eq!(s.factors().curve_multiplier(), 1.0);
        }
        // Once the window only holds moving samples, speed matches its average
        for s in &profile.samples()[3..] {
            assert!((s.velocity - s.running_avg_velocity).abs() < 1e-12);
            assert_eq!(s.factors().grade_multiplier(), 1.0);
            assert!(s.hazard <= 1.1 * 1.1);
        }
    }

    #[test]
    fn test_minimal_projection_keeps_coordinates() {
        let samples = create_test_route(30);
        let profile = HazardProfile::compute(&samples, &Config::default()).unwrap();
        let minimal = profile.minimal();
        assert_eq!(minimal.len(), samples.len());
        for (input, record) in samples.iter().zip(&minimal) {
            assert_eq!(input.latitude, record.latitude);
            assert_eq!(input.longitude, record.longitude);
        }
        for (record, derived) in minimal.iter().zip(profile.samples()) {
            assert_eq!(record.hazard, derived.hazard);
        }
    }

    #[test]
    fn test_compute_is_deterministic() {
        let samples = create_test_route(40);
        let a = HazardProfile::compute(&samples, &Config::default()).unwrap();
        let b = HazardProfile::compute(&samples, &Config::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unit_only_scales_kinematics() {
        let samples = create_test_route(40);
        let miles = HazardProfile::compute(&samples, &Config::default()).unwrap();
        let meters = HazardProfile::compute(
            &samples,
            &Config {
                distance_unit: DistanceUnit::Meters,
                ..Default::default()
            },
        )
        .unwrap();
        for (a, b) in miles.samples().iter().zip(meters.samples()) {
            assert!((a.grade - b.grade).abs() < 1e-6);
            assert!((a.velocity * crate::utils::METERS_PER_MILE - b.velocity).abs() < 1e-6);
        }
    }

    #[test]
    fn test_circumradius_model() {
        let samples = create_test_route(20);
        let config = Config {
            curvature_model: CurvatureModel::Circumradius,
            ..Default::default()
        };
        let circum = HazardProfile::compute(&samples, &config).unwrap();
        let heuristic = HazardProfile::compute(&samples, &Config::default()).unwrap();
        assert_all_finite(&circum);
        for (c, h) in circum.samples().iter().zip(heuristic.samples()) {
            // Both models agree on whether there is a turn at all
            assert_eq!(c.turn_radius > 0.0, h.turn_radius > 0.0);
        }
    }

    #[test]
    fn test_invalid_sample_is_reported() {
        let mut samples = create_test_route(10);
        samples[6].latitude = 123.0;
        match HazardProfile::compute(&samples, &Config::default()) {
            Err(HazardError::InvalidSample { index, field, value }) => {
                assert_eq!(index, 6);
                assert_eq!(field, "latitude");
                assert_eq!(value, 123.0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_compute_many() {
        let routes: Vec<Vec<Sample>> = (5..15).map(create_test_route).collect();
        let profiles = HazardProfile::compute_many(&routes, &Config::default()).unwrap();
        assert_eq!(profiles.len(), 10);
        for (route, profile) in routes.iter().zip(&profiles) {
            assert_eq!(route.len(), profile.len());
            assert_eq!(
                *profile,
                HazardProfile::compute(route, &Config::default()).unwrap()
            );
        }
    }

    #[test]
    fn test_compute_many_fails_on_invalid_route() {
        let routes = vec![create_test_route(5), Vec::new()];
        assert!(HazardProfile::compute_many(&routes, &Config::default()).is_err());
    }

    #[test]
    fn test_hazard_at() {
        let profile = HazardProfile::compute(&create_test_route(10), &Config::default()).unwrap();
        assert_eq!(profile.hazard_at(0), Some(0.0));
        assert!(profile.hazard_at(9).is_some());
        assert!(profile.hazard_at(10).is_none());
    }

    #[test]
    fn test_summary() {
        let profile = HazardProfile::compute(&create_test_route(50), &Config::default()).unwrap();
        let summary = profile.summary();
        assert_eq!(summary.sample_count, 50);
        assert!(summary.total_distance > 0.0);
        assert!(summary.max_hazard >= summary.mean_hazard);
        assert!(summary.hazardous_samples > 0);
        assert_eq!(
            summary.hazardous_samples,
            profile.samples().iter().filter(|s| s.hazard > 1.0).count()
        );
    }

    #[test]
    fn test_summary_default() {
        let summary = HazardSummary::default();
        assert_eq!(summary.sample_count, 0);
        assert_eq!(summary.max_hazard, 0.0);
    }

    #[test]
    fn test_from_gpx() {
        let mut gpx = gpx::Gpx::default();
        let mut track = gpx::Track::default();
        let mut segment = gpx::TrackSegment::default();
        for i in 0..10 {
            let mut waypoint = gpx::Waypoint::new(geo::Point::new(-0.1278 + i as f64 * 0.0002, 51.5074));
            waypoint.elevation = Some(20.0 + i as f64);
            segment.points.push(waypoint);
        }
        track.segments.push(segment);
        gpx.tracks.push(track);

        let profile = HazardProfile::from_gpx(&gpx, &Config::default()).unwrap();
        assert_eq!(profile.len(), 10);
        assert_eq!(profile.samples()[9].time, 10.0);
    }
}
