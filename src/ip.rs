use std::net::Ipv4Addr;

use crate::bytes::TryFromBytes;
use crate::packet::PacketDissection;


/// The addresses of an IPv4 header (RFC791 section 3.1).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Ipv4Header {
    pub source_address: Ipv4Addr,
    pub destination_address: Ipv4Addr,
}
impl Ipv4Header {
    pub const MIN_LENGTH: usize = 20;

    /// Dissects the IPv4 header at the front of `bytes`.
    ///
    /// The header checksum is not verified; captures taken on the sending host routinely carry
    /// checksums that the NIC fills in later.
    pub fn try_take(bytes: &[u8]) -> PacketDissection<Self> {
        let version_and_length = match bytes.first() {
            Some(b) => *b,
            None => return PacketDissection::TooShort,
        };
        if version_and_length >> 4 != 4 {
            return PacketDissection::WrongType;
        }
        // header length is stored as the number of 32-bit words!
        let header_length_bytes = usize::from(version_and_length & 0b0000_1111) * 4;
        if header_length_bytes < Self::MIN_LENGTH || bytes.len() < header_length_bytes {
            return PacketDissection::TooShort;
        }

        let addresses = (
            Ipv4Addr::try_from_bytes(&bytes[12..16]),
            Ipv4Addr::try_from_bytes(&bytes[16..20]),
        );
        match addresses {
            (Some(source_address), Some(destination_address)) => PacketDissection::Success(Self {
                source_address,
                destination_address,
            }),
            _ => PacketDissection::TooShort,
        }
    }
}
