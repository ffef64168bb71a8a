use std::env;
use std::fs;
use std::process;

use anyhow::{Context, Result};
use beatgrid::{convert, Config, Conversion, Sequence};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "config.yaml";

struct Options {
    config_path: String,
    scan_only: bool,
    to_stdout: bool,
    no_validate: bool,
}

fn print_usage() {
    eprintln!("Usage: beatgrid [--scan] [--stdout] [--no-validate] [config.yaml]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scan          Print the track list of the input file and exit");
    eprintln!("  --stdout        Write the chart to stdout instead of output_file");
    eprintln!("  --no-validate   Skip threshold and rule checks before converting");
    eprintln!("  --help          Show this help message");
}

fn parse_args(args: &[String]) -> Option<Options> {
    let mut options = Options {
        config_path: String::new(),
        scan_only: false,
        to_stdout: false,
        no_validate: false,
    };
    let mut config_path = None;

    for arg in args {
        match arg.as_str() {
            "--scan" => options.scan_only = true,
            "--stdout" => options.to_stdout = true,
            "--no-validate" => options.no_validate = true,
            "--help" | "-h" => return None,
            flag if flag.starts_with("--") => {
                eprintln!("Unknown option: {}", flag);
                return None;
            }
            path => {
                if config_path.is_some() {
                    eprintln!("Only one configuration file may be given");
                    return None;
                }
                config_path = Some(path.to_string());
            }
        }
    }

    options.config_path = match config_path {
        Some(path) => path,
        None => {
            print_usage();
            eprintln!("Using default config: {}", DEFAULT_CONFIG_FILE);
            DEFAULT_CONFIG_FILE.to_string()
        }
    };
    Some(options)
}

fn run(options: &Options) -> Result<()> {
    let config = Config::load(&options.config_path)
        .with_context(|| format!("Failed to load config '{}'", options.config_path))?;
    let input = config.input_path()?;
    let sequence = Sequence::load(&input)
        .with_context(|| format!("Failed to read MIDI file {:?}", input))?;
    let summary = sequence.summary().to_lines();

    if options.scan_only || config.scan_only {
        for line in summary {
            println!("{}", line);
        }
        eprintln!("Scan finished. Set 'scan_only: false' in the config to generate a chart.");
        return Ok(());
    }

    if !options.no_validate {
        config.validate().context("Configuration is not valid")?;
    }

    info!(input = ?input, "converting");
    for line in &summary {
        info!("{}", line);
    }

    let chart = match convert(&sequence, &config.rules, &config.players)? {
        Conversion::Generated(chart) => chart,
        Conversion::NothingGenerated => {
            warn!("Nothing generated. Check the track_name_contains keywords and measure ranges.");
            return Ok(());
        }
    };

    if options.to_stdout {
        println!("{}", chart.to_text());
        return Ok(());
    }

    let output = config.output_path();
    fs::write(&output, chart.to_text())
        .with_context(|| format!("Failed to write chart to {:?}", output))?;
    info!(lines = chart.line_count(), output = ?output, "chart written");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Some(options) => options,
        None => {
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(&options) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
