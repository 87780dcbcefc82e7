//! # Magic-Byte Sniffer
//!
//! [`MagicSniffer`] checks, in order:
//!
//! 1. Custom signatures for formats `infer` does not know (Access databases,
//!    ESRI shapefiles, plus anything registered with
//!    [`MagicSniffer::with_signature`]).
//! 2. OLE2 compound documents, identified by their directory stream names or
//!    reported as [`Sniffed::AmbiguousCompound`].
//! 3. `infer`'s built-in signature table. Generic XML is refined by its
//!    root element (KML, GPX, RDF, SVG).
//! 4. Plain-text classification.

use restype_core::{ContentSniffer, MimeType, Sniffed};

use crate::{compound, text, xml};

/// A content matcher for one MIME type.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub mime: &'static str,
    pub matcher: fn(&[u8]) -> bool,
}

fn is_access_database(buf: &[u8]) -> bool {
    matches!(buf.get(4..19), Some(b"Standard Jet DB") | Some(b"Standard ACE DB"))
}

fn is_shapefile(buf: &[u8]) -> bool {
    buf.starts_with(&[0x00, 0x00, 0x27, 0x0A])
}

const DEFAULT_SIGNATURES: &[Signature] = &[
    Signature {
        mime: "application/x-msaccess",
        matcher: is_access_database,
    },
    Signature {
        mime: "x-gis/x-shapefile",
        matcher: is_shapefile,
    },
];

/// Content sniffer backed by `infer`.
#[derive(Debug, Clone)]
pub struct MagicSniffer {
    signatures: Vec<Signature>,
}

impl Default for MagicSniffer {
    fn default() -> Self {
        Self::new()
    }
}

impl MagicSniffer {
    pub fn new() -> Self {
        Self {
            signatures: DEFAULT_SIGNATURES.to_vec(),
        }
    }

    /// Register an extra signature, checked before the built-in table.
    pub fn with_signature(mut self, mime: &'static str, matcher: fn(&[u8]) -> bool) -> Self {
        self.signatures.push(Signature { mime, matcher });
        self
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }
}

impl ContentSniffer for MagicSniffer {
    fn sniff(&self, bytes: &[u8]) -> Sniffed {
        if bytes.is_empty() {
            return Sniffed::Indeterminate;
        }

        if let Some(signature) = self.signatures.iter().find(|s| (s.matcher)(bytes)) {
            tracing::debug!(mime = signature.mime, "matched custom signature");
            return Sniffed::Type(MimeType::from(signature.mime));
        }

        if compound::is_compound(bytes) {
            return match compound::application_type(bytes) {
                Some(mime) => Sniffed::Type(MimeType::from(mime)),
                None => {
                    tracing::debug!(bytes = bytes.len(), "compound document without known stream");
                    Sniffed::AmbiguousCompound
                }
            };
        }

        if let Some(kind) = infer::get(bytes) {
            let mime = match kind.mime_type() {
                "text/xml" | "application/xml" => xml::document_type(bytes),
                other => other,
            };
            return Sniffed::Type(MimeType::from(mime));
        }

        Sniffed::Type(MimeType::from(text::classify(bytes)))
    }
}
