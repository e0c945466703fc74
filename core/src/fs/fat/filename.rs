//! FAT 8.3 and long filename utilities
//!
//! Short names are stored as 11 space-padded upper-case bytes. Long names
//! are split over LFN records of 13 UCS-2 units each; only the low byte of
//! each unit is kept.

/// Bytes in a short (8.3) name
pub const SHORT_NAME_LEN: usize = 11;

/// UCS-2 units carried by one LFN record
pub const LFN_CHARS_PER_ENTRY: usize = 13;

/// LFN records accepted for one name
pub const LFN_MAX_ENTRIES: usize = 20;

/// Longest long name, and longest path component accepted
pub const LFN_MAX_LEN: usize = LFN_MAX_ENTRIES * LFN_CHARS_PER_ENTRY;

/// Offsets of the UCS-2 runs inside an LFN record, with their unit counts
const LFN_RUNS: [(usize, usize); 3] = [(1, 5), (14, 6), (28, 2)];

/// Convert a path component to its on-disk 8.3 form.
///
/// At most one dot is allowed; the base name may have up to 8 bytes and the
/// extension up to 3. Letters are upper-cased.
///
/// # Arguments
/// * `name` - Path component (e.g., "vmlinuz", "grub.cfg")
///
/// # Returns
/// * The 11-byte short name (e.g., "GRUB    CFG"), or `None` if `name` has
///   no 8.3 form
pub fn to_short_name(name: &[u8]) -> Option<[u8; SHORT_NAME_LEN]> {
    let mut short = [b' '; SHORT_NAME_LEN];
    let mut j = 0usize;
    let mut in_extension = false;

    for &c in name {
        if c == b'.' {
            if in_extension {
                return None;
            }
            in_extension = true;
            j = 8;
            continue;
        }
        if j >= SHORT_NAME_LEN || (j >= 8 && !in_extension) {
            return None;
        }
        short[j] = c.to_ascii_uppercase();
        j += 1;
    }

    Some(short)
}

/// The 13 name bytes of one LFN record
pub fn lfn_chars(record: &[u8]) -> [u8; LFN_CHARS_PER_ENTRY] {
    let mut chars = [0u8; LFN_CHARS_PER_ENTRY];
    let mut k = 0;
    for (offset, units) in LFN_RUNS {
        for unit in 0..units {
            chars[k] = record[offset + unit * 2];
            k += 1;
        }
    }
    chars
}

/// Assembled long name without its terminator, fill and padding
pub fn trim_long_name(name: &[u8]) -> &[u8] {
    let end = name.iter().position(|&c| c == 0).unwrap_or(name.len());
    let mut name = &name[..end];
    while let [rest @ .., b' ' | 0xFF] = name {
        name = rest;
    }
    name
}

pub fn names_equal(stored: &[u8], wanted: &[u8], case_sensitive: bool) -> bool {
    if case_sensitive {
        stored == wanted
    } else {
        stored.eq_ignore_ascii_case(wanted)
    }
}
