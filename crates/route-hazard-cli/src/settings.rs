use clap::{Parser, ValueEnum};
use route_hazard_lib::{Config, CurvatureModel, DistanceUnit};
use std::path::PathBuf;

/// Serialization format of scored routes
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Record-oriented JSON array
    Json,
    /// CSV with a header row
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitArg {
    Miles,
    Kilometers,
    Meters,
}

impl From<UnitArg> for DistanceUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Miles => DistanceUnit::Miles,
            UnitArg::Kilometers => DistanceUnit::Kilometers,
            UnitArg::Meters => DistanceUnit::Meters,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurvatureArg {
    /// Height of the sample triangle over its long side
    Heuristic,
    /// Radius of the circle through the three samples
    Circumradius,
}

impl From<CurvatureArg> for CurvatureModel {
    fn from(model: CurvatureArg) -> Self {
        match model {
            CurvatureArg::Heuristic => CurvatureModel::Heuristic,
            CurvatureArg::Circumradius => CurvatureModel::Circumradius,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Route Hazard - Score the riskiness of cycling routes from GPS samples
pub struct Settings {
    /// Route files to score (.csv with latitude,longitude,altitude,time columns, or .gpx)
    #[clap(value_name = "FILE", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Number of trailing samples in running averages and in the grade window
    #[clap(
        short = 'w',
        long,
        default_value = "3",
        env = "ROUTE_HAZARD_RUNNING_AVG_POINTS"
    )]
    pub running_avg_points: usize,

    /// Output format
    #[clap(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Write every derived field instead of only latitude, longitude and hazard
    #[clap(long, default_value = "false")]
    pub full: bool,

    /// Distance unit for distances, velocities and accelerations
    #[clap(short, long, value_enum, default_value = "miles")]
    pub unit: UnitArg,

    /// Turn-radius definition
    #[clap(long, value_enum, default_value = "heuristic")]
    pub curvature_model: CurvatureArg,

    /// Directory for `<name>.hazard.<format>` files (stdout when omitted)
    #[clap(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Log summary statistics for every route
    #[clap(long, default_value = "false")]
    pub summary: bool,
}

impl Settings {
    /// Parse the command line, exiting with usage information on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Engine configuration selected on the command line
    pub fn config(&self) -> Config {
        Config {
            running_avg_points: self.running_avg_points,
            distance_unit: self.unit.into(),
            curvature_model: self.curvature_model.into(),
        }
    }
}
