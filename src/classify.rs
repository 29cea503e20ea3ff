use std::fmt;
use std::net::IpAddr;

use crate::addresses::TrackedAddresses;
use crate::packet::CapturedFrame;


/// Direction of a frame as seen from the monitoring host.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Direction {
    /// Sent by a tracked peer.
    Download,
    /// Sent to a tracked peer.
    Upload,
}
impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Download => "Download",
            Self::Upload => "Upload",
        }
    }
}
impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Classification {
    Emit { address: IpAddr, direction: Direction, size: u64 },
    Ignore,
}


/// Decides whether a frame is traffic with a tracked peer.
///
/// The source address is checked first: a frame between two tracked peers counts only as a
/// download from its sender.
pub fn classify(frame: &CapturedFrame, addresses: &TrackedAddresses) -> Classification {
    let endpoints = match frame.endpoints {
        Some(e) => e,
        None => return Classification::Ignore,
    };

    let source = IpAddr::V4(endpoints.source);
    if addresses.contains(source) {
        return Classification::Emit {
            address: source,
            direction: Direction::Download,
            size: frame.length,
        };
    }

    let destination = IpAddr::V4(endpoints.destination);
    if addresses.contains(destination) {
        return Classification::Emit {
            address: destination,
            direction: Direction::Upload,
            size: frame.length,
        };
    }

    Classification::Ignore
}
