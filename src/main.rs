//! CLI binary for sdlog dump
//!
//! Decodes sdlog2 / DataFlash logs and writes CSV, GPX or a plain record dump.
//! Exported data goes to stdout unless an output file or directory is given;
//! diagnostics always go to stderr.

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use glob::glob;
use sdlog_dump::{export_file, ExportOptions, MessageFilter, OutputFormat};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn build_command() -> Command {
    Command::new("sdlog_dump")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Dump sdlog2 / DataFlash binary logs to CSV or GPX")
        .arg_required_else_help(true)
        .arg(
            Arg::new("files")
                .help("Log files to dump (supports globbing)")
                .required(true)
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug output and detailed decoding information")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only report errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("debug"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print every decoded record as text instead of exporting")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("recover")
                .short('e')
                .long("recover")
                .help("Skip corrupt bytes and unknown messages instead of failing")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("delimiter")
                .short('D')
                .long("delimiter")
                .help("CSV field delimiter")
                .value_name("CHAR")
                .default_value(","),
        )
        .arg(
            Arg::new("null")
                .short('n')
                .long("null")
                .help("Placeholder for missing values (default: empty)")
                .value_name("TEXT"),
        )
        .arg(
            Arg::new("message")
                .short('m')
                .long("message")
                .help("Export only this message, as MSG or MSG.field1,field2 (repeatable)")
                .value_name("SPEC")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("output-file")
                .short('f')
                .long("output-file")
                .help("Write output to this file instead of stdout")
                .value_name("FILE")
                .conflicts_with("output-dir"),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .help("Write <log name>.<format> files into this directory")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output format")
                .value_parser(["csv", "gpx", "none"])
                .default_value("csv"),
        )
}

fn init_logging(debug: bool, quiet: bool) {
    let level = if debug {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Expand glob patterns, keep plain paths as given
fn expand_input_paths(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let matched = glob(pattern)
                .with_context(|| format!("Invalid glob pattern '{pattern}'"))?
                .collect::<std::result::Result<Vec<_>, _>>()
                .with_context(|| format!("Error expanding glob pattern '{pattern}'"))?;
            debug!("Glob pattern '{}' matched {} files", pattern, matched.len());
            paths.extend(matched);
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

fn export_options_from_matches(matches: &ArgMatches) -> Result<ExportOptions> {
    let format: OutputFormat = matches
        .get_one::<String>("output")
        .map(String::as_str)
        .unwrap_or("csv")
        .parse()?;

    let filter_specs: Vec<&String> = matches
        .get_many::<String>("message")
        .map(|specs| specs.collect())
        .unwrap_or_default();

    let options = ExportOptions {
        format,
        delimiter: matches
            .get_one::<String>("delimiter")
            .cloned()
            .unwrap_or_else(|| ",".to_string()),
        null_placeholder: matches.get_one::<String>("null").cloned().unwrap_or_default(),
        message_filter: MessageFilter::parse(filter_specs)?,
        recover: matches.get_flag("recover"),
        verbose: matches.get_flag("verbose"),
        output_file: matches.get_one::<String>("output-file").map(PathBuf::from),
        output_dir: matches.get_one::<String>("output-dir").map(PathBuf::from),
        ..Default::default()
    };
    options.validate()?;
    Ok(options)
}

fn main() -> Result<()> {
    let matches = build_command().get_matches();
    init_logging(matches.get_flag("debug"), matches.get_flag("quiet"));

    let file_patterns: Vec<String> = matches
        .get_many::<String>("files")
        .map(|files| files.cloned().collect())
        .unwrap_or_default();
    if file_patterns.is_empty() {
        bail!("must specify at least 1 log");
    }

    let options = export_options_from_matches(&matches)?;
    let input_files = expand_input_paths(&file_patterns)?;

    if input_files.is_empty() {
        bail!("No log files found for input patterns {file_patterns:?}");
    }
    if options.output_file.is_some() && input_files.len() > 1 {
        bail!(
            "--output-file can only be used with a single input, got {} files",
            input_files.len()
        );
    }

    for path in &input_files {
        info!("Processing: {}", path.display());
        let report = export_file(path, &options)
            .with_context(|| format!("Failed to export {}", path.display()))?;
        debug!("Export report: {report:?}");
    }

    Ok(())
}
