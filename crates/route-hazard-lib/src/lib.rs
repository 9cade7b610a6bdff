//! Route Hazard Library - Hazard scoring for cycling routes
//!
//! This library turns a time-ordered sequence of GPS samples (latitude, longitude,
//! altitude, time) into a per-sample hazard score: the relative riskiness of each
//! point of a route compared with the stretch just before it.
//!
//! # Architecture
//!
//! - **[`utils`]**: Great-circle distance and distance units
//! - **[`Sample`]**: Input records, fail-early validation and GPX ingestion
//! - **[`kinematics`]**: Distance, velocity, acceleration and running averages
//! - **[`grade`]**: Windowed road grade from altitude
//! - **[`curvature`]**: Turn radius from three consecutive samples
//! - **[`scoring`]**: Multiplier tables and the composite hazard
//! - **[`HazardProfile`]**: The pipeline tying it all together
//!
//! # Example
//!
//! ```
//! use route_hazard_lib::{Config, HazardProfile, sample::index_samples};
//!
//! let samples = index_samples([
//!     (39.7400, -105.2278, 1800.0, 1.0),
//!     (39.7402, -105.2281, 1801.0, 2.0),
//!     (39.7405, -105.2283, 1803.0, 3.0),
//! ]);
//! let profile = HazardProfile::compute(&samples, &Config::default())?;
//! assert_eq!(profile.minimal().len(), 3);
//! # Ok::<(), route_hazard_lib::HazardError>(())
//! ```

pub mod curvature;
pub mod grade;
pub mod kinematics;
mod profile;
pub mod sample;
pub mod scoring;
pub mod utils;

// Public API exports
pub use curvature::CurvatureModel;
pub use profile::{Config, DerivedSample, HazardProfile, HazardSummary, MinimalRecord, derive_samples};
pub use sample::Sample;
pub use utils::DistanceUnit;

/// Error types for hazard computation
#[derive(Debug, thiserror::Error)]
pub enum HazardError {
    #[error("GPX parsing error: {0}")]
    GpxParse(#[from] gpx::errors::GpxError),

    #[error("Invalid sample {index}: {field} = {value}")]
    InvalidSample {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("Time goes backwards at sample {index}: {current} < {previous}")]
    NonMonotonicTime {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty route")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, HazardError>;

/// Read a GPX file and flatten it into samples
pub fn load_gpx<P: AsRef<std::path::Path>>(path: P) -> Result<Vec<Sample>> {
    let file = std::fs::File::open(path.as_ref())?;
    let reader = std::io::BufReader::new(file);
    let gpx = gpx::read(reader)?;
    sample::samples_from_gpx(&gpx)
}
