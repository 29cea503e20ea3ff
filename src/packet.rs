use std::net::Ipv4Addr;

use crate::bytes::TryFromBytes;
use crate::ethernet::{ETHERTYPE_IPV4, EthernetHeader, is_vlan_tag, VlanTagHeader};
use crate::ip::Ipv4Header;


#[derive(Debug, Eq, PartialEq)]
pub enum PacketDissection<H> {
    Success(H),
    TooShort,
    WrongType,
}


// BSD address family value for IPv4; identical on every platform libpcap runs on
const AF_INET: u32 = 2;

const LINUX_SLL_LENGTH: usize = 16;
const LINUX_SLL2_LENGTH: usize = 20;


/// The datalink framing of a capture, as reported by libpcap.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LinkLayer {
    /// BSD loopback, address family in host byte order.
    Null,
    Ethernet,
    /// Bare IP packets without any link-layer header.
    Raw,
    /// OpenBSD loopback, address family in network byte order.
    Loop,
    LinuxSll,
    LinuxSll2,
    Other(i32),
}
impl LinkLayer {
    // DLT_* values from pcap/dlt.h
    pub fn from_dlt(dlt: i32) -> Self {
        match dlt {
            0 => Self::Null,
            1 => Self::Ethernet,
            12 | 14 | 101 | 228 => Self::Raw,
            108 => Self::Loop,
            113 => Self::LinuxSll,
            276 => Self::LinuxSll2,
            other => Self::Other(other),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Strips the link-layer framing and returns the IPv4 packet it carries, if any.
    fn ipv4_payload<'a>(&self, data: &'a [u8]) -> Option<&'a [u8]> {
        match self {
            Self::Ethernet => {
                let (ethernet, mut rest) = EthernetHeader::try_take(data)?;
                let mut ethertype = ethernet.ethertype;
                while is_vlan_tag(ethertype) {
                    let (tag, after_tag) = VlanTagHeader::try_take(rest)?;
                    ethertype = tag.ethertype;
                    rest = after_tag;
                }
                (ethertype == ETHERTYPE_IPV4).then_some(rest)
            },
            Self::Raw => {
                let version = data.first()? >> 4;
                (version == 4).then_some(data)
            },
            Self::Null => {
                let family = u32::try_from_bytes(data)?;
                let is_inet = family == AF_INET || family.swap_bytes() == AF_INET;
                is_inet.then(|| &data[4..])
            },
            Self::Loop => {
                let family = u32::try_from_bytes(data)?;
                (family == AF_INET).then(|| &data[4..])
            },
            Self::LinuxSll => {
                let protocol = u16::try_from_bytes(data.get(14..16)?)?;
                (protocol == ETHERTYPE_IPV4).then(|| &data[LINUX_SLL_LENGTH..])
            },
            Self::LinuxSll2 => {
                let protocol = u16::try_from_bytes(data.get(0..2)?)?;
                if protocol != ETHERTYPE_IPV4 {
                    return None;
                }
                data.get(LINUX_SLL2_LENGTH..)
            },
            Self::Other(_) => None,
        }
    }
}


#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Endpoints {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}


/// The parts of one observed frame that matter for traffic accounting.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CapturedFrame {
    /// `None` if the frame does not carry an IPv4 header.
    pub endpoints: Option<Endpoints>,
    /// Length of the frame on the wire, regardless of how much of it was captured.
    pub length: u64,
}
impl CapturedFrame {
    #[cfg(test)]
    pub fn ipv4(source: Ipv4Addr, destination: Ipv4Addr, length: u64) -> Self {
        Self {
            endpoints: Some(Endpoints { source, destination }),
            length,
        }
    }

    pub fn dissect(link_layer: LinkLayer, data: &[u8], wire_length: u32) -> Self {
        let endpoints = link_layer.ipv4_payload(data)
            .and_then(|payload| match Ipv4Header::try_take(payload) {
                PacketDissection::Success(header) => Some(Endpoints {
                    source: header.source_address,
                    destination: header.destination_address,
                }),
                PacketDissection::TooShort|PacketDissection::WrongType => None,
            });
        Self {
            endpoints,
            length: wire_length.into(),
        }
    }
}
