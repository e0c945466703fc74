// Small parsing helpers shared by boot-time configuration code

use alloc::string::String;
use alloc::vec::Vec;

/// Packed BCD byte to binary (0x59 -> 59)
pub fn bcd_to_int(value: u8) -> u8 {
    (value & 0x0F) + (value >> 4) * 10
}

/// Binary to packed BCD (59 -> 0x59); `value` must be below 100
pub fn int_to_bcd(value: u8) -> u8 {
    (value % 10) | ((value / 10) << 4)
}

/// Value of a hex digit in either case
pub fn digit_to_int(c: u8) -> Option<u32> {
    match c {
        b'0'..=b'9' => Some(u32::from(c - b'0')),
        b'a'..=b'f' => Some(u32::from(c - b'a') + 10),
        b'A'..=b'F' => Some(u32::from(c - b'A') + 10),
        _ => None,
    }
}

/// Parse a leading unsigned integer in `base`
///
/// Stops at the first byte that is not a digit of `base` and returns the
/// value with the unparsed remainder. Overflow saturates to `u64::MAX`, with
/// the remainder starting at the digit that overflowed.
pub fn strtoui(s: &str, base: u32) -> (u64, &str) {
    let mut value: u64 = 0;
    for (i, c) in s.bytes().enumerate() {
        let digit = match digit_to_int(c) {
            Some(d) if d < base => d,
            _ => return (value, &s[i..]),
        };
        value = match value
            .checked_mul(u64::from(base))
            .and_then(|v| v.checked_add(u64::from(digit)))
        {
            Some(v) => v,
            None => return (u64::MAX, &s[i..]),
        };
    }
    (value, "")
}

/// Resolve `path` against the working directory `pwd`
///
/// "." and ".." are collapsed and ".." never climbs above the root. Repeated
/// and trailing slashes are dropped. Returns `None` when a relative path is
/// given with a relative `pwd`.
pub fn absolute_path(path: &str, pwd: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();

    if !path.starts_with('/') {
        if !pwd.starts_with('/') {
            return None;
        }
        push_components(&mut parts, pwd);
    }
    push_components(&mut parts, path);

    let mut result = String::from("/");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            result.push('/');
        }
        result.push_str(part);
    }
    Some(result)
}

fn push_components<'a>(parts: &mut Vec<&'a str>, path: &'a str) {
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            name => parts.push(name),
        }
    }
}
