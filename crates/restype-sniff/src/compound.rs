//! OLE2 compound document identification.
//!
//! Word, Excel, PowerPoint and Visio binaries share one container format.
//! The specific application is only visible through the names of the
//! streams in the container's directory, stored as UTF-16LE. The directory
//! usually sits past the first few kilobytes, so a prefix is often not
//! enough to decide.

/// Compound file header signature.
pub const OLE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Directory stream names and the type they identify, checked in order.
const STREAM_TYPES: &[(&str, &str)] = &[
    ("WordDocument", "application/msword"),
    ("Workbook", "application/vnd.ms-excel"),
    ("Book", "application/vnd.ms-excel"),
    ("PowerPoint Document", "application/vnd.ms-powerpoint"),
    ("VisioDocument", "application/vnd.visio"),
];

pub fn is_compound(bytes: &[u8]) -> bool {
    bytes.starts_with(&OLE_SIGNATURE)
}

/// The application type named by a directory entry in `bytes`, if any.
pub fn application_type(bytes: &[u8]) -> Option<&'static str> {
    STREAM_TYPES
        .iter()
        .find(|(name, _)| contains(bytes, &directory_name(name)))
        .map(|(_, mime)| *mime)
}

/// A directory entry name as stored: UTF-16LE followed by a NUL code unit.
fn directory_name(name: &str) -> Vec<u8> {
    name.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
pub(crate) fn with_stream(name: &str, padding: usize) -> Vec<u8> {
    let mut bytes = OLE_SIGNATURE.to_vec();
    bytes.resize(padding, 0);
    bytes.extend(directory_name(name));
    bytes
}
