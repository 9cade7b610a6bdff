mod io;
mod logging;
mod metadata;
mod settings;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use route_hazard_lib::HazardProfile;
use settings::Settings;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let _guard = logging::setup_logging_and_profiling();
    metadata::log_version_info();

    let settings = Settings::from_cli();
    tracing::debug!("Settings: {:?}", settings);

    let result = run(&settings);
    profiling::finish_frame!();
    result
}

fn run(settings: &Settings) -> Result<()> {
    let config = settings.config();
    config.validate()?;

    if settings.output_dir.is_none() && settings.inputs.len() > 1 {
        bail!("--output-dir is required when scoring more than one route");
    }
    let outputs = match &settings.output_dir {
        Some(dir) => {
            let outputs = planned_outputs(dir, settings)?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            Some(outputs)
        }
        None => None,
    };

    let start = std::time::Instant::now();
    let profiles: Vec<(PathBuf, HazardProfile)> = settings
        .inputs
        .par_iter()
        .map(|path| -> Result<(PathBuf, HazardProfile)> {
            let samples = io::load_route(path)?;
            let profile = HazardProfile::compute(&samples, &config)
                .with_context(|| format!("failed to score {}", path.display()))?;
            tracing::info!("Scored {} ({} samples)", path.display(), profile.len());
            Ok((path.clone(), profile))
        })
        .collect::<Result<_>>()?;
    tracing::info!(
        "Scored {} route(s) in {:.2?}",
        profiles.len(),
        start.elapsed()
    );

    for (i, (path, profile)) in profiles.iter().enumerate() {
        if settings.summary {
            let summary = profile.summary();
            tracing::info!(
                "{}: {} samples, distance {:.3} {:?}, max hazard {:.3}, mean hazard {:.3}, {} hazardous",
                path.display(),
                summary.sample_count,
                summary.total_distance,
                config.distance_unit,
                summary.max_hazard,
                summary.mean_hazard,
                summary.hazardous_samples
            );
        }

        match &outputs {
            Some(outputs) => {
                let out = &outputs[i];
                let file = File::create(out)
                    .with_context(|| format!("failed to create {}", out.display()))?;
                io::write_profile(BufWriter::new(file), profile, settings.format, settings.full)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                tracing::info!("Wrote {}", out.display());
            }
            None => {
                let stdout = std::io::stdout();
                io::write_profile(stdout.lock(), profile, settings.format, settings.full)
                    .context("failed to write to stdout")?;
            }
        }
    }

    Ok(())
}

/// Output file of every input, in input order; two inputs may not share one
fn planned_outputs(dir: &Path, settings: &Settings) -> Result<Vec<PathBuf>> {
    let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
    let mut outputs = Vec::with_capacity(settings.inputs.len());
    for input in &settings.inputs {
        let out = io::output_path(dir, input, settings.format);
        if let Some(previous) = seen.insert(out.clone(), input.as_path()) {
            bail!(
                "{} and {} would both be written to {}",
                previous.display(),
                input.display(),
                out.display()
            );
        }
        outputs.push(out);
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    const ROUTE_CSV: &str = "\
latitude,longitude,altitude,time
39.7400,-105.2278,1800.0,1
39.7402,-105.2281,1801.0,2
39.7405,-105.2283,1803.0,3
39.7409,-105.2284,1806.0,4
39.7414,-105.2284,1810.0,5
";

    fn write_route(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, ROUTE_CSV).unwrap();
        path
    }

    fn settings(args: &[&str]) -> Settings {
        let mut argv = vec!["route-hazard"];
        argv.extend_from_slice(args);
        Settings::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_multiple_inputs_need_output_dir() {
        let dir = tempdir().unwrap();
        let a = write_route(dir.path(), "a.csv");
        let b = write_route(dir.path(), "b.csv");

        let err = run(&settings(&[a.to_str().unwrap(), b.to_str().unwrap()])).unwrap_err();
        assert!(err.to_string().contains("--output-dir"));
    }

    #[test]
    fn test_writes_one_file_per_input() {
        let dir = tempdir().unwrap();
        let a = write_route(dir.path(), "a.csv");
        let b = write_route(dir.path(), "b.csv");
        let out_dir = dir.path().join("nested").join("out");

        run(&settings(&[
            a.to_str().unwrap(),
            b.to_str().unwrap(),
            "--output-dir",
            out_dir.to_str().unwrap(),
        ]))
        .unwrap();

        for name in ["a.hazard.json", "b.hazard.json"] {
            let text = std::fs::read_to_string(out_dir.join(name)).unwrap();
            let value: serde_json::Value = serde_json::from_str(&text).unwrap();
            let records = value.as_array().unwrap();
            assert_eq!(records.len(), 5);
            assert_eq!(records[0]["hazard"], 0.0);
            assert_eq!(records[4]["latitude"], 39.7414);
        }
    }

    #[test]
    fn test_csv_output_with_full_records() {
        let dir = tempdir().unwrap();
        let a = write_route(dir.path(), "a.csv");
        let out_dir = dir.path().join("out");

        run(&settings(&[
            a.to_str().unwrap(),
            "-o",
            out_dir.to_str().unwrap(),
            "-f",
            "csv",
            "--full",
        ]))
        .unwrap();

        let text = std::fs::read_to_string(out_dir.join("a.hazard.csv")).unwrap();
        assert!(text.lines().next().unwrap().contains("turn_radius"));
        assert_eq!(text.lines().count(), 6);
    }

    #[test]
    fn test_colliding_outputs_are_rejected_before_writing() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("north")).unwrap();
        std::fs::create_dir(dir.path().join("south")).unwrap();
        let north = write_route(&dir.path().join("north"), "ride.csv");
        let south = write_route(&dir.path().join("south"), "ride.csv");
        let out_dir = dir.path().join("out");

        let err = run(&settings(&[
            north.to_str().unwrap(),
            south.to_str().unwrap(),
            "-o",
            out_dir.to_str().unwrap(),
        ]))
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains(&north.display().to_string()));
        assert!(message.contains(&south.display().to_string()));
        assert!(!out_dir.join("ride.hazard.json").exists());
    }

    #[test]
    fn test_planned_outputs_keep_input_order() {
        let settings = settings(&["x/one.csv", "y/two.gpx", "-o", "out"]);
        let outputs = planned_outputs(Path::new("out"), &settings).unwrap();
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("out/one.hazard.json"),
                PathBuf::from("out/two.hazard.json")
            ]
        );
    }

    #[test]
    fn test_invalid_route_names_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "latitude,longitude,altitude,time\n95.0,0.0,0.0,1\n").unwrap();

        let err = run(&settings(&[path.to_str().unwrap(), "-o", dir.path().to_str().unwrap()]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("bad.csv"));
    }
}
