//! Rock Ridge extension support
//!
//! Rock Ridge stores POSIX names in the System Use area of a directory
//! record as SUSP entries: `[sig0, sig1, length, version, data...]`.

/// SUSP entry header length
pub const ENTRY_HEADER_LEN: usize = 4;

/// NM header length (SUSP header plus one flags byte)
pub const NM_HEADER_LEN: usize = 5;

/// Signature constants
pub mod signatures {
    /// Alternate name signature
    pub const ALTERNATE_NAME: &[u8; 2] = b"NM";
}

/// Find the alternate name (`NM`) in a System Use area
///
/// Walks version-1 entries until one is malformed. Returns `None` when no
/// usable `NM` entry exists (absent, empty, or truncated), in which case the
/// ISO name applies.
pub fn alternate_name(system_use: &[u8]) -> Option<&[u8]> {
    let mut area = system_use;

    while area.len() >= ENTRY_HEADER_LEN && area[3] == 1 {
        let len = area[2] as usize;
        if len > area.len() {
            return None;
        }

        if &area[..2] == signatures::ALTERNATE_NAME {
            if len > NM_HEADER_LEN {
                return Some(&area[NM_HEADER_LEN..len]);
            }
            return None;
        }

        if len == 0 {
            return None;
        }
        area = &area[len..];
    }

    None
}
