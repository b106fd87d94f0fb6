//! Archvfs CLI - command line entry
//!
//! Front end only: parses arguments, builds a `Vfs` and prints what the
//! library finds.

use clap::Parser;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process;
use tracing::level_filters::LevelFilter;

mod config;
mod logging;
mod platform;

use crate::config::{load_vfs_config, parse_component_level, LogConfig};
use crate::logging::{init_with_file, LogFormat};
use crate::platform::print_error;
use archvfs::{FailurePolicy, FindFiles, Locator, Vfs, VfsConfig, VfsFile};
use archvfs_config::Component;

#[derive(Parser)]
#[command(
    name = "archvfs",
    about = "List files across directories and ZIP/JAR archives",
    version = "0.1.0"
)]
struct Cli {
    /// Locators (`file:/lib/a.jar`, `jar:file:/a.jar!/`) or plain paths
    #[arg(required = true, value_name = "LOCATOR")]
    locators: Vec<String>,

    /// Only files under this relative path prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Only files whose name ends with this suffix
    #[arg(long)]
    suffix: Option<String>,

    /// Print one JSON object per file, with its size
    #[arg(long)]
    json: bool,

    /// Resolver configuration file (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip locators that cannot be resolved instead of stopping
    #[arg(long)]
    skip_errors: bool,

    /// Log level (-v=info, -vv=debug, -vvv=trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Per-component log level, e.g. `archive=trace` (repeatable)
    #[arg(long = "log", value_name = "COMPONENT=LEVEL", value_parser = parse_component_level)]
    log_components: Vec<(Component, LevelFilter)>,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact")]
    format: LogFormatArg,

    /// Also write logs to a file
    #[arg(long, value_name = "FILE")]
    log_file: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// One line of `--json` output
#[derive(Serialize)]
struct FileRecord<'a> {
    name: &'a str,
    relative_path: &'a str,
    full_path: String,
    size: usize,
}

fn main() {
    let cli = Cli::parse();

    let format = match cli.format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    if let Err(e) = init_with_file(&build_log_config(&cli), format, cli.log_file.as_deref()) {
        eprintln!("Error: Cannot open log file: {e}");
        process::exit(1);
    }

    match run(&cli) {
        Ok(count) => {
            tracing::info!(target: "archvfs::cli", files = count, "done");
        }
        Err(e) => {
            print_error(e.as_ref());
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<usize, Box<dyn Error>> {
    let mut vfs_config = match &cli.config {
        Some(path) => load_vfs_config(path)?,
        None => VfsConfig::default(),
    };
    if cli.skip_errors {
        vfs_config.on_locator_error = FailurePolicy::Skip;
    }

    let vfs = Vfs::from_config(&vfs_config);
    tracing::debug!(target: "archvfs::cli", resolvers = ?vfs.registry(), "dispatcher ready");

    let locators: Vec<Locator> = cli.locators.iter().map(|arg| to_locator(arg)).collect();
    let suffix = cli.suffix.clone();
    let mut found = match &cli.prefix {
        Some(prefix) => vfs.find_files_with_prefix(locators, prefix, move |name| {
            suffix.as_deref().map_or(true, |s| name.ends_with(s))
        }),
        None => vfs.find_files(locators, move |file: &dyn VfsFile| {
            suffix.as_deref().map_or(true, |s| file.name().ends_with(s))
        }),
    };

    let result = print_files(&mut found, cli.json);
    found.close_all();
    result
}

fn print_files(found: &mut FindFiles, json: bool) -> Result<usize, Box<dyn Error>> {
    let mut count = 0;
    for file in found {
        let file = file?;
        if json {
            let record = FileRecord {
                name: file.name(),
                relative_path: file.relative_path(),
                full_path: file.full_path(),
                size: file.read_bytes()?.len(),
            };
            println!("{}", serde_json::to_string(&record)?);
        } else {
            println!("{}", file.full_path());
        }
        count += 1;
    }
    Ok(count)
}

/// Arguments with a scheme are locators, anything else is a host path
fn to_locator(arg: &str) -> Locator {
    let locator = Locator::new(arg);
    if locator.scheme().is_some() {
        locator
    } else {
        Locator::from_path(arg)
    }
}

fn build_log_config(cli: &Cli) -> LogConfig {
    // -v count sets the global level
    let global = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    LogConfig {
        global,
        components: cli.log_components.clone(),
    }
}
