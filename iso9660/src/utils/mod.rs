//! Byte-level helpers shared by the decoders

pub mod sector;
pub mod string;

/// Little-endian u16 at `offset`; `None` past the end of `data`
pub fn le16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Little-endian u32 at `offset`; `None` past the end of `data`
pub fn le32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
