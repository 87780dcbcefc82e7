//! # Extension and Format Resolution
//!
//! Maps a filename (or a format label, resolved as `example.<format>`) to
//! the MIME type conventionally associated with its extension.
//!
//! [`ExtensionResolver`] ships a built-in table of common formats and
//! overlays the policy's `extra_mimetypes`. Policy entries win, since a
//! type that matches what sniffing reports is more useful than the RFC
//! registration.

use std::collections::HashMap;

use crate::mime::MimeType;
use crate::policy::TypePolicy;

/// Guesses a type from a file name.
pub trait TypeResolver: Send + Sync {
    /// The type for `name`'s extension, or `None` if unknown.
    fn guess_type(&self, name: &str) -> Option<MimeType>;

    /// The type for a format label such as `CSV`.
    fn guess_format_type(&self, format: &str) -> Option<MimeType> {
        self.guess_type(&format!("example.{}", format.trim()))
    }
}

const BUILTIN_TYPES: &[(&str, &str)] = &[
    // Text
    ("csv", "text/csv"),
    ("tsv", "text/tab-separated-values"),
    ("tab", "text/tab-separated-values"),
    ("txt", "text/plain"),
    ("text", "text/plain"),
    ("log", "text/plain"),
    ("md", "text/markdown"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("css", "text/css"),
    ("ics", "text/calendar"),
    ("xml", "text/xml"),
    ("xsl", "application/xml"),
    ("json", "application/json"),
    ("js", "application/javascript"),
    ("rtf", "application/rtf"),
    // Documents
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    ("dot", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pps", "application/vnd.ms-powerpoint"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("ods", "application/vnd.oasis.opendocument.spreadsheet"),
    ("odp", "application/vnd.oasis.opendocument.presentation"),
    ("vsd", "application/vnd.visio"),
    ("epub", "application/epub+zip"),
    // Archives
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tgz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("7z", "application/x-7z-compressed"),
    ("rar", "application/vnd.rar"),
    // Images
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("ico", "image/vnd.microsoft.icon"),
    // Audio / video
    ("mp3", "audio/mpeg"),
    ("wav", "audio/x-wav"),
    ("mp4", "video/mp4"),
    ("avi", "video/x-msvideo"),
    // Binary
    ("bin", "application/octet-stream"),
    ("exe", "application/octet-stream"),
    ("sh", "application/x-sh"),
];

/// Lowercased final extension of the last path segment of `name`, ignoring
/// any query string or fragment. Dotfiles such as `.csv` have no extension.
pub fn extension_of(name: &str) -> Option<String> {
    let path = name.split(['?', '#']).next().unwrap_or(name);
    let segment = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Built-in extension table plus policy additions.
#[derive(Debug, Clone)]
pub struct ExtensionResolver {
    table: HashMap<String, MimeType>,
}

impl ExtensionResolver {
    /// Built-in table only.
    pub fn builtin() -> Self {
        let table = BUILTIN_TYPES
            .iter()
            .map(|(ext, mime)| (ext.to_string(), MimeType::from(*mime)))
            .collect();
        Self { table }
    }

    /// Built-in table overlaid with the policy's `extra_mimetypes`.
    pub fn for_policy(policy: &TypePolicy) -> Self {
        let mut resolver = Self::builtin();
        for (ext, mime) in policy.extra_mimetypes() {
            resolver.table.insert(ext.clone(), mime.clone());
        }
        resolver
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl TypeResolver for ExtensionResolver {
    fn guess_type(&self, name: &str) -> Option<MimeType> {
        let ext = extension_of(name)?;
        self.table.get(&ext).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyFile;

    fn m(s: &str) -> MimeType {
        MimeType::from(s)
    }

    #[test]
    fn extension_extraction() {
        assert_eq!(extension_of("example.csv").as_deref(), Some("csv"));
        assert_eq!(extension_of("Report.PDF").as_deref(), Some("pdf"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension_of("/data/2024/file.xlsx").as_deref(), Some("xlsx"));
        assert_eq!(extension_of("download/file.json?v=2#top").as_deref(), Some("json"));
        assert_eq!(extension_of("dir.d/README"), None);
        assert_eq!(extension_of("example."), None);
        assert_eq!(extension_of(".csv"), None);
        assert_eq!(extension_of(""), None);
    }

    #[test]
    fn builtin_lookups() {
        let resolver = ExtensionResolver::builtin();
        assert_eq!(resolver.guess_type("foo.csv"), Some(m("text/csv")));
        assert_eq!(resolver.guess_type("dummy.PDF"), Some(m("application/pdf")));
        assert_eq!(resolver.guess_type("example.xml"), Some(m("text/xml")));
        assert_eq!(resolver.guess_type("example.zip"), Some(m("application/zip")));
        assert_eq!(resolver.guess_type("example.shp"), None);
        assert_eq!(resolver.guess_type("no_extension"), None);
    }

    #[test]
    fn format_labels_resolve_like_extensions() {
        let resolver = ExtensionResolver::builtin();
        assert_eq!(resolver.guess_format_type("CSV"), Some(m("text/csv")));
        assert_eq!(resolver.guess_format_type(" pdf "), Some(m("application/pdf")));
        assert_eq!(resolver.guess_format_type(""), None);
        assert_eq!(resolver.guess_format_type("NOT-A-FORMAT"), None);
    }

    #[test]
    fn policy_extras_overlay_builtins() {
        let file: PolicyFile = serde_json::from_value(serde_json::json!({
            "extra_mimetypes": {
                ".shp": "x-gis/x-shapefile",
                ".json": "application/geo+json"
            }
        }))
        .unwrap();
        let policy = TypePolicy::compile(&file).unwrap();
        let resolver = ExtensionResolver::for_policy(&policy);
        assert_eq!(resolver.guess_type("example.shp"), Some(m("x-gis/x-shapefile")));
        assert_eq!(resolver.guess_type("example.json"), Some(m("application/geo+json")));
        assert_eq!(resolver.len(), ExtensionResolver::builtin().len() + 1);
    }
}
