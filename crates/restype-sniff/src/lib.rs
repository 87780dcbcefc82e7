//! # restype-sniff — Content Sniffing
//!
//! Implements [`restype_core::ContentSniffer`] by inspecting file bytes:
//! `infer`'s signature table, a few custom signatures for formats it lacks,
//! OLE2 compound document stream lookup, XML root-element refinement, and a
//! plain-text classifier.
//!
//! ```
//! use restype_core::{ContentSniffer, MimeType, Sniffed};
//! use restype_sniff::MagicSniffer;
//!
//! let sniffer = MagicSniffer::new();
//! assert_eq!(
//!     sniffer.sniff(b"%PDF-1.4\n"),
//!     Sniffed::Type(MimeType::from("application/pdf"))
//! );
//! ```

pub mod compound;
pub mod magic;
pub mod text;
pub mod xml;

pub use magic::{MagicSniffer, Signature};
