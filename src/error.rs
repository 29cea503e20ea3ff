use std::io;
use std::path::PathBuf;

use thiserror::Error;


#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("{0:?} is not a valid IP address")]
    InvalidAddress(String),

    #[error("no valid IP addresses or resolvable hostnames were given")]
    NoTargets,

    #[error("failed to resolve {name:?}: {reason}")]
    Resolve { name: String, reason: String },

    #[error("failed to set up the hostname resolver: {0}")]
    ResolverSetup(String),

    #[error("adapter index {index} is out of range (there are {count} adapters)")]
    InvalidAdapter { index: usize, count: usize },

    #[error("{0:?} is not an adapter number")]
    AdapterChoice(String),

    #[error("no capture adapters are available")]
    NoAdapters,

    #[error("failed to list network adapters: {0}")]
    AdapterList(#[source] pcap::Error),

    #[error("failed to open adapter {adapter}: {source}")]
    CaptureOpen { adapter: String, #[source] source: pcap::Error },

    #[error("capture failed: {0}")]
    Capture(#[source] pcap::Error),

    #[error("failed to create event log {path:?}: {source}")]
    LogInit { path: PathBuf, #[source] source: csv::Error },

    #[error("failed to write event log: {0}")]
    LogWrite(#[source] csv::Error),

    #[error("event log lock was poisoned by a panicking writer")]
    LogPoisoned,

    #[error("failed to read from the console: {0}")]
    Console(#[source] io::Error),

    #[error("capture task failed: {0}")]
    Task(String),
}
impl MonitorError {
    /// The process exit code for this error when it is fatal.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidAddress(_)
            | Self::NoTargets
            | Self::InvalidAdapter { .. }
            | Self::AdapterChoice(_)
            | Self::NoAdapters => 2,
            Self::AdapterList(_) | Self::CaptureOpen { .. } | Self::Capture(_) => 3,
            Self::LogInit { .. } | Self::LogWrite(_) | Self::LogPoisoned => 4,
            Self::Resolve { .. } | Self::ResolverSetup(_) | Self::Console(_) | Self::Task(_) => 1,
        }
    }
}


impl From<csv::Error> for MonitorError {
    fn from(e: csv::Error) -> Self {
        Self::LogWrite(e)
    }
}
