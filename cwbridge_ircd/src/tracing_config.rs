use crate::config::*;
use tracing_subscriber::{
    prelude::*,
    filter::{filter_fn, Targets},
    Layer,
    registry::LookupSpan,
};
use tracing::Subscriber;

use std::{
    io::Error as IoError,
    path::Path,
};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// A daily-rolling log file under `dir`, created if necessary
fn file_layer<S>(dir: &Path, filename: &Path) -> Result<BoxedLayer<S>, IoError>
    where S: Subscriber + Send + Sync,
          for<'span> S: LookupSpan<'span>,
{
    std::fs::create_dir_all(dir)?;

    Ok(tracing_subscriber::fmt::layer()
            .with_writer(tracing_appender::rolling::daily(dir, filename))
            .with_ansi(false)
            .boxed())
}

fn target_layer<S>(entry: LogEntry, dir: &Path) -> Result<BoxedLayer<S>, IoError>
    where S: Subscriber + Send + Sync,
          for<'span> S: LookupSpan<'span>,
{
    let layer = match &entry.target
    {
        LogTarget::File { filename } => file_layer(dir, filename)?,
        LogTarget::Builtin(BuiltinLogTarget::Stdout) => tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed(),
        LogTarget::Builtin(BuiltinLogTarget::Stderr) => tracing_subscriber::fmt::layer().with_writer(std::io::stderr).boxed(),
    };

    Ok(layer.with_filter(filter_fn(move |metadata| entry.enabled(metadata))).boxed())
}

/// Build the process-wide subscriber described by `conf`.
///
/// The caller is responsible for installing it.
pub fn build_subscriber(conf: LoggingConfig) -> Result<impl Subscriber + Send + Sync, IoError>
{
    let LoggingConfig { dir, default_level, module_levels, targets } = conf;

    let layers = targets.into_iter()
                        .map(|entry| target_layer(entry, &dir))
                        .collect::<Result<Vec<_>, _>>()?;

    // Per-module levels apply to every target; without a default level the
    // global filter lets everything through to the per-target filters
    let filter = Targets::new()
                    .with_default(default_level.unwrap_or(LogLevel::Trace))
                    .with_targets(module_levels);

    Ok(tracing_subscriber::registry()
            .with(filter)
            .with(layers)
        )
}
