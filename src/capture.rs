use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pcap::{Active, Capture, Device, Error as PcapError};
use tracing::{debug, info, warn};

use crate::config::CaptureSettings;
use crate::error::MonitorError;
use crate::packet::{CapturedFrame, LinkLayer};


#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Adapter {
    pub name: String,
    pub description: Option<String>,
}
impl Adapter {
    /// The description if there is one, otherwise the name.
    pub fn label(&self) -> &str {
        self.description.as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(self.name.as_str())
    }
}
impl From<Device> for Adapter {
    fn from(device: Device) -> Self {
        Self {
            name: device.name,
            description: device.desc,
        }
    }
}


pub fn list_adapters() -> Result<Vec<Adapter>, MonitorError> {
    let devices = Device::list()
        .map_err(MonitorError::AdapterList)?;
    Ok(devices.into_iter().map(Adapter::from).collect())
}

pub fn select_adapter(mut adapters: Vec<Adapter>, index: usize) -> Result<Adapter, MonitorError> {
    if adapters.is_empty() {
        return Err(MonitorError::NoAdapters);
    }
    if index >= adapters.len() {
        return Err(MonitorError::InvalidAdapter { index, count: adapters.len() });
    }
    Ok(adapters.swap_remove(index))
}


/// A live capture on one adapter. The handle is released when the session is dropped.
pub struct CaptureSession {
    adapter: String,
    capture: Capture<Active>,
    link_layer: LinkLayer,
}
impl CaptureSession {
    pub fn open(adapter: &Adapter, settings: &CaptureSettings) -> Result<Self, MonitorError> {
        let open_error = |source| MonitorError::CaptureOpen { adapter: adapter.name.clone(), source };

        let capture = Capture::from_device(adapter.name.as_str())
            .map_err(open_error)?
            .promisc(settings.promiscuous)
            .snaplen(settings.snapshot_length)
            .timeout(settings.read_timeout_ms)
            .open()
            .map_err(open_error)?;

        let datalink = capture.get_datalink();
        let link_layer = LinkLayer::from_dlt(datalink.0);
        if link_layer.is_supported() {
            debug!("datalink of {} is {:?}", adapter.name, link_layer);
        } else {
            warn!("datalink {:?} of {} is not supported; no traffic will be recorded", datalink, adapter.name);
        }

        Ok(Self {
            adapter: adapter.name.clone(),
            capture,
            link_layer,
        })
    }

    /// Turns the session into the stream of captured frames.
    ///
    /// The stream ends once `stop` is set; the check happens between frames and whenever the
    /// read timeout expires.
    pub fn frames(self, stop: Arc<AtomicBool>) -> Frames {
        Frames {
            session: self,
            stop,
            finished: false,
        }
    }
}
impl Drop for CaptureSession {
    fn drop(&mut self) {
        match self.capture.stats() {
            Ok(stats) => info!(
                "closing capture on {}: {} packets received, {} dropped, {} dropped by the interface",
                self.adapter, stats.received, stats.dropped, stats.if_dropped,
            ),
            Err(e) => debug!("closing capture on {} (no statistics: {})", self.adapter, e),
        }
    }
}


pub struct Frames {
    session: CaptureSession,
    stop: Arc<AtomicBool>,
    finished: bool,
}
impl Iterator for Frames {
    type Item = Result<CapturedFrame, MonitorError>;

    fn next(&mut self) -> Option<Self::Item> {
        let link_layer = self.session.link_layer;
        while !self.finished {
            if self.stop.load(Ordering::SeqCst) {
                self.finished = true;
                break;
            }

            match self.session.capture.next_packet() {
                Ok(packet) => {
                    return Some(Ok(CapturedFrame::dissect(link_layer, packet.data, packet.header.len)));
                },
                Err(PcapError::TimeoutExpired) => continue,
                Err(PcapError::NoMorePackets) => {
                    self.finished = true;
                },
                Err(e) => {
                    self.finished = true;
                    return Some(Err(MonitorError::Capture(e)));
                },
            }
        }
        None
    }
}
