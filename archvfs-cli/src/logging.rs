//! CLI logging initialization
//!
//! Per-component log control on top of `tracing-subscriber`. Logs go to
//! stderr so that stdout stays machine readable.

use crate::config::LogConfig;
use archvfs_config::Component;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{
    filter::Targets, fmt, fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt, Layer,
    Registry,
};

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Colored, multi-line
    Pretty,
    /// One line per event
    Compact,
    /// JSON lines, for tooling
    Json,
}

/// Filter targets for `log_config`
pub fn targets(log_config: &LogConfig) -> Targets {
    Component::ALL
        .into_iter()
        .fold(Targets::new().with_default(log_config.global), |targets, c| {
            targets.with_target(c.target(), log_config.level_for(c))
        })
        .with_target("archvfs::cli", log_config.global)
}

/// Initialize logging, optionally mirrored to a file
pub fn init_with_file<P: AsRef<Path>>(
    log_config: &LogConfig,
    format: LogFormat,
    file: Option<P>,
) -> io::Result<()> {
    let targets = targets(log_config);
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> =
        vec![format_layer(format, io::stderr, true)
            .with_filter(targets.clone())
            .boxed()];

    if let Some(path) = file {
        let file_handle = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        layers.push(
            format_layer(format, Mutex::new(file_handle), false)
                .with_filter(targets)
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).init();
    Ok(())
}

/// Create formatter layer based on format
fn format_layer<W>(
    format: LogFormat,
    make_writer: W,
    ansi: bool,
) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_ansi(ansi)
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .with_ansi(ansi)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(make_writer)
            .boxed(),
    }
}
