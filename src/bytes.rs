use std::net::Ipv4Addr;


/// Reads a fixed-size value from the front of a byte slice.
///
/// Returns `None` if the slice is shorter than the value.
pub trait TryFromBytes : Sized {
    fn try_from_bytes(bytes: &[u8]) -> Option<Self>;
}

impl TryFromBytes for u16 {
    fn try_from_bytes(bytes: &[u8]) -> Option<Self> {
        let bs: [u8; 2] = bytes.get(0..2)?.try_into().ok()?;
        Some(Self::from_be_bytes(bs))
    }
}

impl TryFromBytes for u32 {
    fn try_from_bytes(bytes: &[u8]) -> Option<Self> {
        let bs: [u8; 4] = bytes.get(0..4)?.try_into().ok()?;
        Some(Self::from_be_bytes(bs))
    }
}

impl TryFromBytes for Ipv4Addr {
    fn try_from_bytes(bytes: &[u8]) -> Option<Self> {
        let bs: [u8; 4] = bytes.get(0..4)?.try_into().ok()?;
        Some(Self::from(bs))
    }
}
