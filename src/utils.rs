//! A collection of utility functions
use std::fs::Metadata;
use std::time::SystemTime;

use chrono::DateTime;
use chrono::Utc;

const IEC_UNIT: u64 = 1024;
const IEC_PREFIXES: &[u8] = b"KMGTPE";

/// Formats a `SystemTime` as an RFC 1123 date in UTC.
/// For example "Fri, 26 Jan 2018 18:30:09 UTC"
pub fn format_system_time(time: SystemTime) -> String {
    let datetime: DateTime<Utc> = time.into();
    datetime.format("%a, %d %b %Y %H:%M:%S UTC").to_string()
}

/// Formats a byte count using base 1024 units.
///
/// ```rust
/// # use restatic::utils::format_bytes;
/// assert_eq!(format_bytes(1023), "1023 B");
/// assert_eq!(format_bytes(1536), "1.5 KiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    if bytes < IEC_UNIT {
        return format!("{bytes} B");
    }
    let mut div = IEC_UNIT;
    let mut exp = 0;
    let mut n = bytes / IEC_UNIT;
    while n >= IEC_UNIT {
        div *= IEC_UNIT;
        exp += 1;
        n /= IEC_UNIT;
    }
    format!(
        "{:.1} {}iB",
        bytes as f64 / div as f64,
        IEC_PREFIXES[exp] as char
    )
}

/// Formats the type and permission bits of `metadata` as a ten character
/// mode string, such as `drwxr-xr-x` or `Lrwxrwxrwx`.
///
/// The type letter is `d` for directories, `L` for symlinks, `p` for named
/// pipes, `S` for sockets, `D` for block devices, `c` for character devices
/// and `-` for regular files.
pub fn format_mode(metadata: &Metadata) -> String {
    let file_type = metadata.file_type();
    let mut mode = String::with_capacity(10);
    mode.push(type_letter(&file_type));
    let bits = permission_bits(metadata);
    for (i, c) in "rwxrwxrwx".chars().enumerate() {
        if bits & (1 << (8 - i)) != 0 {
            mode.push(c);
        } else {
            mode.push('-');
        }
    }
    mode
}

#[cfg(unix)]
fn type_letter(file_type: &std::fs::FileType) -> char {
    use std::os::unix::fs::FileTypeExt;

    if file_type.is_dir() {
        'd'
    } else if file_type.is_symlink() {
        'L'
    } else if file_type.is_fifo() {
        'p'
    } else if file_type.is_socket() {
        'S'
    } else if file_type.is_block_device() {
        'D'
    } else if file_type.is_char_device() {
        'c'
    } else {
        '-'
    }
}

#[cfg(not(unix))]
fn type_letter(file_type: &std::fs::FileType) -> char {
    if file_type.is_dir() {
        'd'
    } else if file_type.is_symlink() {
        'L'
    } else {
        '-'
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}
