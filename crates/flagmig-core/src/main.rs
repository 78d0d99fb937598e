//! `flagmig` command line

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use flagmig_core::{Format, MigrationConfig, Migrator};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("flagmig")
        .version(flagmig_core::VERSION)
        .about("Convert feature flag files between TOML, JSON and YAML and upgrade them to the current schema")
        .arg(
            Arg::new("input-file")
                .long("input-file")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Flag file to read"),
        )
        .arg(
            Arg::new("input-format")
                .long("input-format")
                .help("Format of the input: toml, json or yaml [default: from the file extension, else yaml]"),
        )
        .arg(
            Arg::new("output-format")
                .long("output-format")
                .default_value("yaml")
                .help("Format to write: toml, json or yaml; anything else writes yaml"),
        )
        .arg(
            Arg::new("output-file")
                .long("output-file")
                .value_parser(value_parser!(PathBuf))
                .help("File to write [default: stdout]"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .action(ArgAction::SetTrue)
                .help("Normalize flags in parallel"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Log more (-v info, -vv debug); RUST_LOG overrides"),
        )
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Explicit tag, else the file extension, else yaml
fn input_format(tag: Option<&String>, path: &Path) -> String {
    tag.cloned().unwrap_or_else(|| {
        Format::from_path(path)
            .unwrap_or(Format::Yaml)
            .as_str()
            .to_string()
    })
}

fn run(args: &ArgMatches) -> Result<()> {
    let input_path = args
        .get_one::<PathBuf>("input-file")
        .context("missing --input-file")?;
    let output_format = args
        .get_one::<String>("output-format")
        .map_or("yaml", String::as_str);

    let config = MigrationConfig::new()
        .with_input_format(input_format(args.get_one::<String>("input-format"), input_path))
        .with_output_format(output_format)
        .with_parallel(args.get_flag("parallel"));
    tracing::debug!(?config, input = %input_path.display(), "starting migration");

    let input = std::fs::read(input_path)
        .with_context(|| format!("cannot read input file {}", input_path.display()))?;
    let report = Migrator::new(config)
        .migrate_report(&input)
        .with_context(|| format!("cannot migrate {}", input_path.display()))?;

    match args.get_one::<PathBuf>("output-file") {
        Some(path) => {
            std::fs::write(path, &report.output)
                .with_context(|| format!("cannot write output file {}", path.display()))?;
            tracing::info!(output = %path.display(), format = %report.output_format, "wrote output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&report.output)
                .and_then(|()| stdout.flush())
                .context("cannot write to stdout")?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = cli().get_matches();
    init_tracing(args.get_count("verbose"));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
