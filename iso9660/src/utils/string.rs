//! String handling utilities
//!
//! ISO9660 names are raw bytes (d-characters, a-characters); nothing here
//! assumes UTF-8.

/// Trim trailing spaces and NULs from a padded identifier field
pub fn trim_trailing_spaces(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && matches!(bytes[end - 1], b' ' | 0) {
        end -= 1;
    }
    &bytes[..end]
}

/// Strip the version suffix from an ISO name
///
/// The name ends at the first `;`, or at a `.` directly followed by `;`
/// ("FILE.TXT;1" -> "FILE.TXT", "FILE.;1" -> "FILE").
pub fn strip_version(name: &[u8]) -> &[u8] {
    for (i, &b) in name.iter().enumerate() {
        if b == b';' {
            return &name[..i];
        }
        if b == b'.' && name.get(i + 1) == Some(&b';') {
            return &name[..i];
        }
    }
    name
}
