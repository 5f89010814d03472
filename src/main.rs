use serde::Deserialize;

use calibration::{
    CalibrationConfig, CalibrationFormatter, Calibrator, MeasurementMatrix, MeasurementValidator,
};

/// Input file structure: one row of ranges per sample transmitter position
#[derive(Debug, Deserialize)]
struct MeasurementsJson {
    measurements: Vec<Vec<f64>>,
}

struct CliOptions {
    measurements_path: String,
    config_path: Option<String>,
    seed: Option<u64>,
    json_output: bool,
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut measurements_path = None;
    let mut config_path = None;
    let mut seed = None;
    let mut json_output = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                let value = args.get(i).ok_or("--seed requires a value")?;
                seed = Some(value.parse::<u64>().map_err(|e| format!("Bad seed: {}", e))?);
            }
            "--config" => {
                i += 1;
                config_path = Some(args.get(i).ok_or("--config requires a path")?.clone());
            }
            "--json" => json_output = true,
            other if measurements_path.is_none() => {
                measurements_path = Some(other.to_string());
            }
            other => return Err(format!("Unexpected argument: {}", other)),
        }
        i += 1;
    }

    Ok(CliOptions {
        measurements_path: measurements_path.ok_or("Missing measurements file")?,
        config_path,
        seed,
        json_output,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!(
                "Usage: {} <measurements.json> [--config <config.json>] [--seed <n>] [--json]",
                args.first().map_or("calibration", |s| s.as_str())
            );
            return Err("Invalid arguments".into());
        }
    };

    let json_data = std::fs::read_to_string(&options.measurements_path)?;
    let measurements_json: MeasurementsJson = serde_json::from_str(&json_data)?;
    let matrix = MeasurementMatrix::from_rows(&measurements_json.measurements)?;

    let report = MeasurementValidator::new().validate(&matrix);
    for warning in &report.warnings {
        eprintln!("WARNING: {}", warning);
    }
    if !report.is_valid() {
        for error in &report.errors {
            eprintln!("Error: {}", error);
        }
        return Err("Measurement matrix rejected".into());
    }

    let mut config = match &options.config_path {
        Some(path) => CalibrationConfig::from_file(path)?,
        None => CalibrationConfig::default(),
    };
    if options.seed.is_some() {
        config.random_seed = options.seed;
    }

    let mut calibrator = Calibrator::with_config(config);
    let outcome = calibrator.calibrate(&matrix);

    let formatter = CalibrationFormatter::new();
    if options.json_output {
        println!("{}", formatter.format_json(&outcome)?);
    } else {
        print!("{}", formatter.format_text(&outcome));
    }

    if !outcome.success {
        return Err("Calibration did not reach the acceptance threshold".into());
    }
    Ok(())
}
