use std::io::Write;

use tracing::{error, info, warn};

use crate::addresses::TrackedAddresses;
use crate::classify::{Classification, classify, Direction};
use crate::error::MonitorError;
use crate::event_log::{EventLog, TrafficEvent};
use crate::packet::CapturedFrame;


/// The state of one monitoring session: what to watch and where to record it.
pub struct Monitor {
    addresses: TrackedAddresses,
    log: EventLog,
}
impl Monitor {
    pub fn new(addresses: TrackedAddresses, log: EventLog) -> Self {
        Self {
            addresses,
            log,
        }
    }

    /// Classifies one frame and records it if it involves a tracked address.
    ///
    /// A failed write is reported but not returned; one lost row must not end the capture.
    pub fn handle_frame<W: Write>(&self, frame: &CapturedFrame, console: &mut W) -> Option<TrafficEvent> {
        let (address, direction, size) = match classify(frame, &self.addresses) {
            Classification::Emit { address, direction, size } => (address, direction, size),
            Classification::Ignore => return None,
        };

        let event = TrafficEvent::now(address, direction, size);
        if let Err(e) = self.log.record(&event) {
            error!("failed to record {} of {} bytes for {}: {}", direction, size, address, e);
        }

        let notified = match direction {
            Direction::Download => writeln!(console, "Inbound traffic (Download) from '{}' (size: {} bytes)", address, size),
            Direction::Upload => writeln!(console, "Outbound traffic (Upload) to '{}' (size: {} bytes)", address, size),
        };
        if let Err(e) = notified {
            warn!("failed to print notification: {}", e);
        }

        Some(event)
    }

    /// Processes frames in order until the stream ends or fails, then closes the event log.
    ///
    /// The frame stream (and with it the capture handle) is dropped before the log is closed.
    pub fn run<I, W>(self, frames: I, console: &mut W) -> Result<(), MonitorError>
        where
            I: IntoIterator<Item = Result<CapturedFrame, MonitorError>>,
            W: Write,
    {
        let outcome = self.pump(frames.into_iter(), console);
        if let Err(e) = &outcome {
            error!("stopping capture: {}", e);
        }

        let path = self.log.path().to_path_buf();
        let closed = self.log.close();
        if closed.is_ok() {
            info!("writing to {} completed", path.display());
        }
        outcome.and(closed)
    }

    fn pump<I, W>(&self, frames: I, console: &mut W) -> Result<(), MonitorError>
        where
            I: Iterator<Item = Result<CapturedFrame, MonitorError>>,
            W: Write,
    {
        for frame in frames {
            self.handle_frame(&frame?, console);
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use std::fs;
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;

    const PEER: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);
    const LOCAL: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 5);

    fn monitor(dir: &TempDir, tracked: Ipv4Addr) -> Monitor {
        let mut addresses = TrackedAddresses::new();
        addresses.insert(IpAddr::V4(tracked));
        let log = EventLog::create(dir.path().join("report.csv")).unwrap();
        Monitor::new(addresses, log)
    }

    fn rows(path: &Path) -> Vec<Vec<String>> {
        fs::read_to_string(path).unwrap()
            .lines()
            .map(|l| l.split(';').map(|f| f.to_owned()).collect())
            .collect()
    }

    #[test]
    fn download_from_tracked_peer() {
        let dir = TempDir::new().unwrap();
        let mut console = Vec::new();
        let frames = vec![Ok(CapturedFrame::ipv4(PEER, LOCAL, 512))];
        monitor(&dir, PEER).run(frames, &mut console).unwrap();

        let rows = rows(&dir.path().join("report.csv"));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["Timestamp", "Address", "Traffic", "Bytes"]);
        assert_eq!(&rows[1][1..], &["93.184.216.34", "Download", "512"]);
        assert_eq!(
            String::from_utf8(console).unwrap(),
            "Inbound traffic (Download) from '93.184.216.34' (size: 512 bytes)\n",
        );
    }

    #[test]
    fn upload_to_tracked_peer() {
        let dir = TempDir::new().unwrap();
        let mut console = Vec::new();
        let frames = vec![Ok(CapturedFrame::ipv4(PEER, LOCAL, 256))];
        monitor(&dir, LOCAL).run(frames, &mut console).unwrap();

        let rows = rows(&dir.path().join("report.csv"));
        assert_eq!(&rows[1][1..], &["10.0.0.5", "Upload", "256"]);
        assert_eq!(
            String::from_utf8(console).unwrap(),
            "Outbound traffic (Upload) to '10.0.0.5' (size: 256 bytes)\n",
        );
    }

    #[test]
    fn unrelated_and_malformed_frames_leave_no_trace() {
        let dir = TempDir::new().unwrap();
        let mut console = Vec::new();
        let frames = vec![
            Ok(CapturedFrame::ipv4(Ipv4Addr::new(198, 51, 100, 1), LOCAL, 60)),
            Ok(CapturedFrame { endpoints: None, length: 42 }),
            Ok(CapturedFrame::ipv4(PEER, LOCAL, 0)),
        ];
        monitor(&dir, PEER).run(frames, &mut console).unwrap();

        let rows = rows(&dir.path().join("report.csv"));
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][1..], &["93.184.216.34", "Download", "0"]);
        assert_eq!(String::from_utf8(console).unwrap().lines().count(), 1);
    }

    #[test]
    fn rows_follow_arrival_order() {
        let dir = TempDir::new().unwrap();
        let mut console = Vec::new();
        let frames = (0..50u64)
            .map(|i| Ok(if i % 2 == 0 {
                CapturedFrame::ipv4(PEER, LOCAL, i)
            } else {
                CapturedFrame::ipv4(LOCAL, PEER, i)
            }));
        monitor(&dir, PEER).run(frames, &mut console).unwrap();

        let rows = rows(&dir.path().join("report.csv"));
        let sizes: Vec<u64> = rows[1..].iter().map(|r| r[3].parse().unwrap()).collect();
        assert_eq!(sizes, (0..50).collect::<Vec<u64>>());
        assert_eq!(rows[2][2], "Upload");
    }

    #[test]
    fn capture_failure_still_closes_the_log() {
        let dir = TempDir::new().unwrap();
        let mut console = Vec::new();
        let frames = vec![
            Ok(CapturedFrame::ipv4(PEER, LOCAL, 100)),
            Err(MonitorError::Capture(pcap::Error::PcapError("adapter went away".into()))),
            Ok(CapturedFrame::ipv4(PEER, LOCAL, 200)),
        ];
        let result = monitor(&dir, PEER).run(frames, &mut console);
        assert!(matches!(result, Err(MonitorError::Capture(_))));

        let rows = rows(&dir.path().join("report.csv"));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][3], "100");
    }

    #[test]
    fn failed_writes_do_not_stop_the_capture() {
        let dir = TempDir::new().unwrap();
        let mut console = Vec::new();
        let monitor = monitor(&dir, PEER);
        monitor.log.poison();

        let first = monitor.handle_frame(&CapturedFrame::ipv4(PEER, LOCAL, 10), &mut console);
        assert_eq!(first.map(|e| e.size), Some(10));

        let frames = vec![
            Ok(CapturedFrame::ipv4(LOCAL, PEER, 20)),
            Ok(CapturedFrame::ipv4(PEER, LOCAL, 30)),
        ];
        let result = monitor.run(frames, &mut console);
        assert!(matches!(result, Err(MonitorError::LogPoisoned)));

        // every frame was still announced, though none could be recorded
        let shown = String::from_utf8(console).unwrap();
        let sizes: Vec<&str> = shown.lines()
            .map(|l| l.rsplit("size: ").next().unwrap())
            .collect();
        assert_eq!(sizes, vec!["10 bytes)", "20 bytes)", "30 bytes)"]);
        assert_eq!(rows(&dir.path().join("report.csv")).len(), 1);
    }

    #[test]
    fn handle_frame_returns_the_event() {
        let dir = TempDir::new().unwrap();
        let monitor = monitor(&dir, LOCAL);
        let mut console = Vec::new();

        let event = monitor.handle_frame(&CapturedFrame::ipv4(PEER, LOCAL, 77), &mut console).unwrap();
        assert_eq!(event.address, IpAddr::V4(LOCAL));
        assert_eq!(event.direction, Direction::Upload);
        assert_eq!(event.size, 77);

        assert!(monitor.handle_frame(&CapturedFrame::ipv4(PEER, PEER, 77), &mut console).is_none());
    }
}
