use crate::bytes::TryFromBytes;


/// The part of an Ethernet II header needed to find the payload: its ethertype.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct EthernetHeader {
    pub ethertype: u16,
}
impl EthernetHeader {
    // destination MAC, source MAC, ethertype
    pub const LENGTH: usize = 14;

    pub fn try_take(bytes: &[u8]) -> Option<(Self, &[u8])> {
        let ethertype = u16::try_from_bytes(bytes.get(12..Self::LENGTH)?)?;
        Some((Self { ethertype }, &bytes[Self::LENGTH..]))
    }
}

// managed by IEEE: https://regauth.standards.ieee.org/standards-ra-web/pub/view.html ("Ethertype")
pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_VLAN_TAG: u16 = 0x8100;
pub const ETHERTYPE_SERVICE_VLAN_TAG: u16 = 0x88A8;

pub fn is_vlan_tag(ethertype: u16) -> bool {
    ethertype == ETHERTYPE_VLAN_TAG || ethertype == ETHERTYPE_SERVICE_VLAN_TAG
}


/// An 802.1Q/802.1ad tag; only the ethertype of what follows it is kept.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct VlanTagHeader {
    pub ethertype: u16,
}
impl VlanTagHeader {
    // tag control information, ethertype
    pub const LENGTH: usize = 4;

    pub fn try_take(bytes: &[u8]) -> Option<(Self, &[u8])> {
        let ethertype = u16::try_from_bytes(bytes.get(2..Self::LENGTH)?)?;
        Some((Self { ethertype }, &bytes[Self::LENGTH..]))
    }
}
