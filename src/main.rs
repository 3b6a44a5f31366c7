//! Soil probe host CLI.
//!
//! ## Usage
//!
//! ```bash
//! soilprobe ports                         # list serial ports
//! soilprobe read                          # probe every port, print the reading
//! soilprobe read --port /dev/ttyUSB0      # read one port only
//! soilprobe check [--port /dev/ttyUSB0]  # read + in-soil plausibility check
//! soilprobe dose rice Urea Loamy 12 8 20  # crop fertilizer soil N P K
//! soilprobe --config probe.json config init  # write a default config file
//! ```
//!
//! `--config <PATH>` loads a JSON configuration file.  Log verbosity
//! follows `RUST_LOG` (default `info`).

#![deny(unused_must_use)]

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use log::info;

use soilprobe::AppService;
use soilprobe::adapters::config_file::JsonConfigFile;
use soilprobe::adapters::log_sink::LogEventSink;
use soilprobe::adapters::serial::SerialProbeAdapter;
use soilprobe::app::outcome::{AcquisitionOutcome, SoilCheck};
use soilprobe::app::ports::ConfigPort;
use soilprobe::config::SystemConfig;
use soilprobe::dosage::{NutrientLevels, ReferenceTables};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = take_option(&mut args, "--config")?;
    let port = take_option(&mut args, "--port")?;

    let config_file = config_path.map(|path| JsonConfigFile::new(PathBuf::from(path)));
    let config = match &config_file {
        Some(file) => file.load()?,
        None => SystemConfig::default(),
    };

    let command = args.first().map(String::as_str);
    if port.is_some() && !matches!(command, Some("read" | "check")) {
        bail!("--port only applies to `read` and `check`");
    }

    let loaded_tables;
    let tables = match &config.tables_path {
        Some(path) => {
            loaded_tables = ReferenceTables::from_json_file(path)?;
            info!("Reference tables loaded from {}", path.display());
            &loaded_tables
        }
        None => ReferenceTables::builtin(),
    };

    let app = AppService::new(config, tables);
    let mut probe = SerialProbeAdapter::new();
    let mut sink = LogEventSink::new();

    match command {
        Some("ports") => {
            let endpoints = app.list_endpoints(&mut probe)?;
            if endpoints.is_empty() {
                println!("(no serial ports)");
            }
            for e in endpoints {
                println!("{}\t{}", e.name, e.description);
            }
        }
        Some("read") => {
            let measurement = match port {
                Some(name) => app.read_port(&mut probe, &name)?,
                None => match app.acquire_measurement(&mut probe, &mut sink) {
                    AcquisitionOutcome::Success(m) => m,
                    failed => bail!(failure_message(failed.user_message())),
                },
            };
            println!("{}", serde_json::to_string_pretty(&measurement)?);
        }
        Some("check") => match check(&app, &mut probe, port.as_deref(), &mut sink) {
            SoilCheck::Ready(m) => {
                println!("{}", serde_json::to_string_pretty(&m)?);
            }
            other => bail!(failure_message(other.user_message())),
        },
        Some("dose") => {
            let [crop, fertilizer, soil, n, p, k] = match &args[1..] {
                [a, b, c, d, e, f] => [a, b, c, d, e, f],
                _ => bail!("usage: soilprobe dose <crop> <fertilizer> <soil> <N> <P> <K>"),
            };
            let levels = NutrientLevels {
                n: parse_level("N", n)?,
                p: parse_level("P", p)?,
                k: parse_level("K", k)?,
            };
            let rec = app.recommend(crop, &levels, fertilizer, soil, &mut sink);
            println!("{rec}");
            println!("crop category: {}", app.crop_category(crop));
            if rec.basis.is_fallback() {
                println!("note: default rate used ({:?})", rec.basis);
            }
        }
        Some("config") => match args.get(1).map(String::as_str) {
            Some("init") => {
                let Some(file) = &config_file else {
                    bail!("`config init` needs --config PATH");
                };
                file.create(app.config())?;
                println!("wrote {}", file.path().display());
            }
            _ => bail!("usage: soilprobe --config PATH config init"),
        },
        Some("help") | None => print_help(),
        Some(other) => bail!("unknown command {other:?}; try `soilprobe help`"),
    }

    Ok(())
}

fn check(
    app: &AppService<'_>,
    probe: &mut SerialProbeAdapter,
    port: Option<&str>,
    sink: &mut LogEventSink,
) -> SoilCheck {
    match port {
        Some(name) => app.check_port(probe, name, sink),
        None => app.check_soil(probe, sink),
    }
}

/// Remove `--flag VALUE` from `args` and return the value.
fn take_option(args: &mut Vec<String>, flag: &str) -> Result<Option<String>> {
    let Some(idx) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    if idx + 1 >= args.len() {
        return Err(anyhow!("{flag} needs a value"));
    }
    let value = args.remove(idx + 1);
    args.remove(idx);
    Ok(Some(value))
}

fn parse_level(nutrient: &str, text: &str) -> Result<f64> {
    let value: f64 = text
        .parse()
        .with_context(|| format!("{nutrient} level {text:?} is not a number"))?;
    if !value.is_finite() || value < 0.0 {
        bail!("{nutrient} level must be a nonnegative number");
    }
    Ok(value)
}

fn failure_message(msg: Option<String>) -> String {
    msg.unwrap_or_else(|| "sensor reading failed".into())
}

fn print_help() {
    println!("soilprobe {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Commands:");
    println!("  ports                                   List serial ports");
    println!("  read [--port NAME]                      Read the soil probe");
    println!("  check [--port NAME]                     Read and verify the probe is in soil");
    println!("  dose <crop> <fert> <soil> <N> <P> <K>   Fertilizer dosage (kg/ha)");
    println!("  config init                             Write defaults to the --config file");
    println!("  help                                    Show this help");
    println!();
    println!("Options:");
    println!("  --config PATH                           JSON configuration file");
}
