use std::path::PathBuf;


pub const DEFAULT_LOG_PATH: &str = "traffic_report.csv";
pub const DEFAULT_SNAPSHOT_LENGTH: i32 = 1024;
pub const DEFAULT_READ_TIMEOUT_MS: i32 = 1000;


#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaptureSettings {
    pub snapshot_length: i32,
    pub promiscuous: bool,
    /// How long libpcap may buffer before handing over packets; also bounds how quickly an
    /// interrupt is noticed on a quiet link.
    pub read_timeout_ms: i32,
}
impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            snapshot_length: DEFAULT_SNAPSHOT_LENGTH,
            promiscuous: false,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}


/// Everything needed to start monitoring, gathered before any capture state exists.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MonitorConfig {
    /// IP addresses and hostnames, unresolved.
    pub targets: Vec<String>,
    pub adapter_index: usize,
    pub log_path: PathBuf,
    pub capture: CaptureSettings,
}
