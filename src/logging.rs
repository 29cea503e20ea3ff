use std::fs::File;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;


/// Sets up diagnostics on stderr and, optionally, in a file.
///
/// `RUST_LOG` overrides the default `info` level. The returned guard must be kept alive until
/// the process exits; dropping it flushes the file.
pub fn init(diagnostics_file: Option<&Path>) -> io::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match diagnostics_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(File::create(path)?);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .init();
    Ok(guard)
}
