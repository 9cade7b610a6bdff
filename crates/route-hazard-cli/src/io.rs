//! Reading route files and writing scored routes

use crate::settings::OutputFormat;
use anyhow::{Context, Result, anyhow};
use route_hazard_lib::sample::index_samples;
use route_hazard_lib::{HazardProfile, Sample};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// Route file formats accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Gpx,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("gpx") => Ok(InputFormat::Gpx),
            _ => Err(anyhow!(
                "unsupported input {} (expected .csv or .gpx)",
                path.display()
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Lat")]
    latitude: f64,
    #[serde(alias = "Long")]
    longitude: f64,
    altitude: f64,
    time: f64,
}

/// Parse CSV route samples; extra columns are ignored
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Sample>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (row, record) in reader.deserialize::<CsvRow>().enumerate() {
        // +2: one-based, after the header line
        let record = record.with_context(|| format!("invalid CSV row {}", row + 2))?;
        rows.push((
            record.latitude,
            record.longitude,
            record.altitude,
            record.time,
        ));
    }
    Ok(index_samples(rows))
}

/// Load the samples of a route file, picking the parser from the extension
pub fn load_route(path: &Path) -> Result<Vec<Sample>> {
    match InputFormat::from_path(path)? {
        InputFormat::Csv => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            read_csv(BufReader::new(file))
                .with_context(|| format!("failed to parse {}", path.display()))
        }
        InputFormat::Gpx => route_hazard_lib::load_gpx(path)
            .with_context(|| format!("failed to load {}", path.display())),
    }
}

/// Write the profile as a JSON array of records
pub fn write_json<W: Write>(mut writer: W, profile: &HazardProfile, full: bool) -> Result<()> {
    if full {
        serde_json::to_writer_pretty(&mut writer, profile.samples())?;
    } else {
        serde_json::to_writer_pretty(&mut writer, &profile.minimal())?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Write the profile as CSV with a header row
pub fn write_csv<W: Write>(writer: W, profile: &HazardProfile, full: bool) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    if full {
        for sample in profile.samples() {
            writer.serialize(sample)?;
        }
    } else {
        for record in profile.minimal() {
            writer.serialize(record)?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn write_profile<W: Write>(
    writer: W,
    profile: &HazardProfile,
    format: OutputFormat,
    full: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(writer, profile, full),
        OutputFormat::Csv => write_csv(writer, profile, full),
    }
}

/// `<dir>/<stem>.hazard.<ext>` for an input file
pub fn output_path(dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "route".to_string());
    dir.join(format!("{}.hazard.{}", stem, format.extension()))
}
