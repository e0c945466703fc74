//! Directory record parsing and navigation
//!
//! Directories are fully buffered. Records never straddle a sector; a
//! zero length byte pads the rest of a sector.

pub mod record;

use crate::utils::sector::next_sector_boundary;
use record::DirectoryRecord;

/// Find a record by name in a directory buffer
///
/// Returns the byte offset of the matching record. The scan stops at the
/// first record that is shorter than a header or overruns the buffer.
pub fn find_entry(dir: &[u8], component: &[u8], case_sensitive: bool) -> Option<usize> {
    let mut offset = 0usize;

    while offset < dir.len() {
        if dir[offset] == 0 {
            offset = next_sector_boundary(offset);
            continue;
        }

        let record = DirectoryRecord::parse(&dir[offset..]).ok()?;
        if record.name().matches(component, case_sensitive) {
            return Some(offset);
        }
        offset += record.length();
    }

    None
}

/// Offset of the record following the one at `offset`
///
/// Skips sector padding. Returns `None` at the end of the buffer or when the
/// next record is malformed.
pub fn next_entry(dir: &[u8], offset: usize) -> Option<usize> {
    let length = *dir.get(offset)? as usize;

    let mut next = if length == 0 {
        next_sector_boundary(offset)
    } else {
        offset.checked_add(length)?
    };
    if next >= dir.len() {
        return None;
    }

    if dir[next] == 0 {
        next = next_sector_boundary(next);
        if next >= dir.len() || dir[next] == 0 {
            return None;
        }
    }

    DirectoryRecord::parse(&dir[next..]).ok()?;
    Some(next)
}
