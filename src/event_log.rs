use std::fs::File;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local, SecondsFormat};
use csv::{Writer, WriterBuilder};

use crate::classify::Direction;
use crate::error::MonitorError;


pub const HEADER: [&str; 4] = ["Timestamp", "Address", "Traffic", "Bytes"];
pub const DELIMITER: u8 = b';';


#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TrafficEvent {
    pub timestamp: DateTime<Local>,
    pub address: IpAddr,
    pub direction: Direction,
    pub size: u64,
}
impl TrafficEvent {
    pub fn now(address: IpAddr, direction: Direction, size: u64) -> Self {
        Self {
            timestamp: Local::now(),
            address,
            direction,
            size,
        }
    }

    fn to_record(&self) -> [String; 4] {
        [
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, false),
            self.address.to_string(),
            self.direction.to_string(),
            self.size.to_string(),
        ]
    }
}


/// Append-only report of traffic events.
///
/// Every row, the header included, is flushed and synced to disk before the call that wrote it
/// returns. Concurrent writers are serialized, so rows never interleave.
pub struct EventLog {
    path: PathBuf,
    writer: Mutex<Writer<File>>,
}
impl EventLog {
    /// Creates the log at `path`, truncating anything already there, and writes the header.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, MonitorError> {
        let path = path.as_ref().to_path_buf();
        let init_error = |source: csv::Error| MonitorError::LogInit { path: path.clone(), source };

        let file = File::create(&path)
            .map_err(|e| init_error(e.into()))?;
        let mut writer = WriterBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .from_writer(file);
        writer.write_record(HEADER)
            .map_err(init_error)?;
        sync(&mut writer)
            .map_err(init_error)?;

        Ok(Self {
            path,
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, event: &TrafficEvent) -> Result<(), MonitorError> {
        self.append(&event.to_record())
    }

    fn append<S: AsRef<[u8]>>(&self, record: &[S; 4]) -> Result<(), MonitorError> {
        let mut writer = self.writer.lock()
            .map_err(|_| MonitorError::LogPoisoned)?;
        writer.write_record(record)?;
        sync(&mut writer)?;
        Ok(())
    }

    /// Leaves the writer lock poisoned, as a writer panicking mid-row would.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _writer = self.writer.lock();
            panic!("writer panicked mid-row");
        }));
        assert!(outcome.is_err());
    }

    /// Flushes outstanding data and closes the file.
    pub fn close(self) -> Result<(), MonitorError> {
        let mut writer = self.writer.into_inner()
            .map_err(|_| MonitorError::LogPoisoned)?;
        writer.flush()
            .map_err(|e| MonitorError::LogWrite(e.into()))?;
        writer.get_ref().sync_all()
            .map_err(|e| MonitorError::LogWrite(e.into()))?;
        Ok(())
    }
}


fn sync(writer: &mut Writer<File>) -> Result<(), csv::Error> {
    writer.flush()?;
    writer.get_ref().sync_data()?;
    Ok(())
}
