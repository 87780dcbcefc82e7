//! Content sniffing interface.
//!
//! Implementations inspect raw bytes only; reading and rewinding the upload
//! stream is the validator's job.

use crate::mime::MimeType;

/// Number of leading bytes inspected on the first sniffing pass. Large
/// enough for OOXML containers to expose their first part names.
pub const SNIFF_PREFIX_LEN: usize = 2048;

/// What a sniffer made of a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sniffed {
    /// A confident guess.
    Type(MimeType),
    /// An OLE2 compound document whose specific format is not visible in the
    /// buffer. The caller may retry with the whole stream.
    AmbiguousCompound,
    /// Nothing could be inferred (for example, an empty buffer).
    Indeterminate,
}

/// Infers a MIME type from file content.
pub trait ContentSniffer: Send + Sync {
    fn sniff(&self, bytes: &[u8]) -> Sniffed;
}
