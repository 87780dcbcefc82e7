//! # Resource Validation Scenarios
//!
//! Drives `ResourceTypeValidator` through whole-resource scenarios with the
//! embedded policy: genuine uploads that must resolve, spoofed uploads that
//! must be rejected without touching the record, and metadata-only
//! re-validation.

use std::io::Cursor;
use std::sync::Arc;

use restype_core::{
    AllowList, ContentSniffer, MimeType, RejectionKind, ResourceRecord, ResourceTypeValidator,
    Sniffed, StoredRecord, Upload, ValidationError, ValidationOutcome, ValidatorSettings,
};

const EICAR: &[u8] = b"X5O!P%@AP[4\\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*";
const OLE_HEADER: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Recognizes a handful of leading signatures, enough to stand in for a
/// real sniffer in these scenarios.
struct PrefixSniffer;

impl ContentSniffer for PrefixSniffer {
    fn sniff(&self, bytes: &[u8]) -> Sniffed {
        let mime = if bytes.is_empty() {
            return Sniffed::Indeterminate;
        } else if bytes.starts_with(OLE_HEADER) {
            return Sniffed::AmbiguousCompound;
        } else if bytes.starts_with(b"%PDF") {
            "application/pdf"
        } else if bytes.starts_with(b"PK\x03\x04") {
            "application/zip"
        } else if bytes.starts_with(b"<?xml") {
            "text/xml"
        } else if bytes.split(|b| *b == b'\n').next().is_some_and(|l| l.contains(&b',')) {
            "text/csv"
        } else {
            "text/plain"
        };
        Sniffed::Type(MimeType::from(mime))
    }
}

fn validator_with(settings: ValidatorSettings) -> ResourceTypeValidator {
    ResourceTypeValidator::from_settings(&settings, Arc::new(PrefixSniffer)).unwrap()
}

fn validator() -> ResourceTypeValidator {
    validator_with(ValidatorSettings::default())
}

fn uploaded(filename: &str, format: &str, content: &[u8]) -> ResourceRecord<Cursor<Vec<u8>>> {
    ResourceRecord::with_upload(
        filename,
        format,
        Upload::new(filename, Cursor::new(content.to_vec())),
    )
}

fn pdf() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n".to_vec()
}

fn zip() -> Vec<u8> {
    let mut bytes = b"PK\x03\x04".to_vec();
    bytes.extend_from_slice(&[0x14, 0, 0, 0, 8, 0]);
    bytes
}

fn ole() -> Vec<u8> {
    let mut bytes = OLE_HEADER.to_vec();
    bytes.resize(4096, 0);
    bytes
}

// ---------------------------------------------------------------------------
// 1. Genuine uploads resolve
// ---------------------------------------------------------------------------

#[test]
fn sample_uploads_resolve() {
    let validator = validator();
    let cases: Vec<(&str, &str, Vec<u8>, &str)> = vec![
        ("foo.csv", "CSV", b"a,b\n1,2\n".to_vec(), "text/csv"),
        ("dummy.pdf", "PDF", pdf(), "application/pdf"),
        ("example.xml", "XML", b"<?xml version=\"1.0\"?><a/>".to_vec(), "text/xml"),
        ("example.txt", "TXT", b"hello world\n".to_vec(), "text/plain"),
        ("example.wfs", "WFS", b"<?xml version=\"1.0\"?><wfs/>".to_vec(), "application/xml"),
        ("example.json", "JSON", b"{\"a\": 1}".to_vec(), "application/json"),
        ("example.doc", "DOC", ole(), "application/msword"),
        ("example.zip", "ZIP", zip(), "application/zip"),
        // Well-formed archives may declare any format.
        ("example.zip", "PDF", zip(), "application/pdf"),
        ("example.zip", "DOC", zip(), "application/msword"),
    ];

    for (filename, format, content, expected) in cases {
        let mut record = uploaded(filename, format, &content);
        let outcome = validator
            .validate(&mut record)
            .unwrap_or_else(|e| panic!("{filename} as {format} should validate: {e}"));
        assert_eq!(
            outcome,
            ValidationOutcome::Resolved(MimeType::from(expected)),
            "{filename} as {format}"
        );
        assert_eq!(record.mimetype.as_deref(), Some(expected), "{filename} as {format}");
    }
}

#[test]
fn mixed_case_format_labels_resolve() {
    let validator = validator();
    let mut record = uploaded("foo.CSV", "csv", b"a,b\n1,2\n");
    validator.validate(&mut record).unwrap();
    assert_eq!(record.mimetype.as_deref(), Some("text/csv"));
}

#[test]
fn upload_stream_is_left_at_start() {
    let validator = validator();
    let mut content = b"a,b\n".to_vec();
    content.extend(std::iter::repeat(b"1,2\n").take(2000).flatten());
    let mut record = uploaded("foo.csv", "CSV", &content);
    validator.validate(&mut record).unwrap();

    let upload = record.upload.as_ref().unwrap();
    assert_eq!(upload.stream.position(), 0);
    assert_eq!(upload.stream.get_ref().len(), content.len());
}

// ---------------------------------------------------------------------------
// 2. Spoofed uploads are rejected
// ---------------------------------------------------------------------------

#[test]
fn spoofed_uploads_are_rejected() {
    let validator = validator();
    let cases: Vec<(&str, &str, Vec<u8>)> = vec![
        // contents and format are PDF, extension is CSV
        ("example.csv", "PDF", pdf()),
        // contents and extension are PDF, format is XML
        ("example.pdf", "XML", pdf()),
        // extension and format are PDF, contents are text
        ("example.pdf", "PDF", EICAR.to_vec()),
        // an archive behind a different extension
        ("example.pdf", "PDF", zip()),
        // ZIP extension, but not an archive
        ("example.zip", "PDF", EICAR.to_vec()),
        ("example.zip", "ZIP", EICAR.to_vec()),
    ];

    for (filename, format, content) in cases {
        let mut record = uploaded(filename, format, &content);
        let err = validator
            .validate(&mut record)
            .expect_err(&format!("{filename} as {format} should be rejected"));
        let rejection = err.rejection().expect("a type rejection");
        assert!(rejection.is_mismatch(), "{filename} as {format}: {rejection}");
        assert!(record.mimetype.is_none(), "{filename} as {format}");
    }
}

#[test]
fn mismatch_message_names_both_types() {
    let validator = validator();
    let mut record = uploaded("example.csv", "PDF", &pdf());
    let err = validator.validate(&mut record).unwrap_err();
    let rejection = err.rejection().unwrap();
    assert_eq!(rejection.field, "upload");
    assert!(
        rejection.message.contains("'text/csv' or 'application/pdf'"),
        "{}",
        rejection.message
    );
    assert!(rejection.message.ends_with("contact the site owner."));
}

#[test]
fn unlisted_extension_is_unsupported() {
    let validator = validator();
    let mut record = uploaded("setup.exe", "EXE", b"MZ\x90\x00");
    let err = validator.validate(&mut record).unwrap_err();
    let rejection = err.rejection().unwrap();
    assert_eq!(rejection.kind, RejectionKind::UnsupportedType);
    assert_eq!(rejection.message, validator.messages().unsupported_message());
}

#[test]
fn allow_list_rejects_resolved_type() {
    let validator = validator_with({
        let mut settings = ValidatorSettings::default();
        settings.allowed_mimetypes = AllowList::parse("text/csv,application/xml");
        settings
    });

    let mut record = uploaded("example.xml", "XML", b"<?xml version=\"1.0\"?><a/>");
    validator.validate(&mut record).unwrap();
    assert_eq!(record.mimetype.as_deref(), Some("text/xml"));

    let mut record = uploaded("dummy.pdf", "PDF", &pdf());
    let err = validator.validate(&mut record).unwrap_err();
    assert_eq!(err.rejection().unwrap().kind, RejectionKind::UnsupportedType);
    assert!(record.mimetype.is_none());
}

#[test]
fn custom_support_contact_in_messages() {
    let settings = ValidatorSettings::default().with_support_contact("data@example.org.");
    let validator = validator_with(settings);
    let mut record = uploaded("example.csv", "PDF", &pdf());
    let err = validator.validate(&mut record).unwrap_err();
    match err {
        ValidationError::Rejected(rejection) => {
            assert!(rejection.message.ends_with("contact data@example.org."));
        }
        other => panic!("unexpected error {other}"),
    }
}

// ---------------------------------------------------------------------------
// 3. Records without uploads
// ---------------------------------------------------------------------------

#[test]
fn revalidate_without_file_compares_url_and_format() {
    let validator = validator();
    let mut record = StoredRecord::stored("example.csv", "PDF");
    assert!(validator.validate(&mut record).is_err());

    record.format = Some("CSV".to_string());
    validator.validate(&mut record).unwrap();
    assert_eq!(record.mimetype.as_deref(), Some("text/csv"));

    // Idempotent once resolved.
    validator.validate(&mut record).unwrap();
    assert_eq!(record.mimetype.as_deref(), Some("text/csv"));
}

#[test]
fn link_resources_are_not_validated() {
    let validator = validator();
    let mut record = StoredRecord::stored("http://example.com/foo.csv", "PDF");
    assert_eq!(
        validator.validate(&mut record).unwrap(),
        ValidationOutcome::SkippedRemoteLink
    );
    assert!(record.mimetype.is_none());
}

#[test]
fn upload_then_revalidate_keeps_type() {
    let validator = validator();
    let mut record = uploaded("example.json", "JSON", b"{\"a\": 1}");
    validator.validate(&mut record).unwrap();
    let resolved = record.mimetype.clone();

    let mut stored = StoredRecord::stored("example.json", "JSON");
    stored.mimetype = resolved.clone();
    validator.validate(&mut stored).unwrap();
    assert_eq!(stored.mimetype, resolved);
}
