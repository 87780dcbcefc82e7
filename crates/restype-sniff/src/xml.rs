//! Markup refinement by root element.
//!
//! A generic XML signature says nothing about the vocabulary. KML, GPX,
//! RDF and SVG documents are told apart by the name of their root element,
//! found after skipping the prolog (declaration, processing instructions,
//! comments and doctype).

/// Type of any XML document whose root element is not recognized.
pub const XML: &str = "text/xml";

/// Root element local names and the types they identify.
const ROOT_TYPES: &[(&str, &str)] = &[
    ("kml", "application/vnd.google-earth.kml+xml"),
    ("gpx", "application/gpx+xml"),
    ("RDF", "application/rdf+xml"),
    ("svg", "image/svg+xml"),
];

/// Type of an XML document, from its root element. Falls back to
/// [`XML`] when the root is unrecognized or cannot be found in the prefix.
pub fn document_type(bytes: &[u8]) -> &'static str {
    let text = String::from_utf8_lossy(bytes);
    root_element(&text).and_then(root_type).unwrap_or(XML)
}

/// Type of text that starts with `<`, or `None` when it does not look like
/// markup at all.
///
/// HTML is recognized by doctype or root element. Anything else with an
/// XML declaration is [`document_type`].
pub fn markup_type(text: &str) -> Option<&'static str> {
    let text = text.trim_start_matches('\u{feff}').trim_start();
    let head = text.get(..14).unwrap_or(text);
    if head.eq_ignore_ascii_case("<!doctype html") {
        return Some("text/html");
    }
    if let Some(root) = root_element(text) {
        if root.eq_ignore_ascii_case("html") {
            return Some("text/html");
        }
        if let Some(mime) = root_type(root) {
            return Some(mime);
        }
    }
    text.starts_with("<?xml").then_some(XML)
}

/// Qualified name of the first element in `text`, skipping the prolog.
pub fn root_element(text: &str) -> Option<&str> {
    let mut rest = text.trim_start_matches('\u{feff}').trim_start();
    loop {
        let skipped = if let Some(after) = rest.strip_prefix("<?") {
            after.split_once("?>")?.1
        } else if let Some(after) = rest.strip_prefix("<!--") {
            after.split_once("-->")?.1
        } else if let Some(after) = rest.strip_prefix("<!") {
            after.split_once('>')?.1
        } else {
            break;
        };
        rest = skipped.trim_start();
    }

    let after = rest.strip_prefix('<')?;
    let end = after
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(after.len());
    let name = &after[..end];
    (!name.is_empty()).then_some(name)
}

fn root_type(name: &str) -> Option<&'static str> {
    let local = name.rsplit(':').next().unwrap_or(name);
    ROOT_TYPES
        .iter()
        .find(|(root, _)| *root == local)
        .map(|(_, mime)| *mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROLOG: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

    fn document(body: &str) -> Vec<u8> {
        format!("{PROLOG}{body}").into_bytes()
    }

    #[test]
    fn root_element_skips_prolog() {
        let text = "\u{feff}<?xml version=\"1.0\"?>\n<!-- exported -->\n\
                    <!DOCTYPE kml>\n<?xml-stylesheet href=\"a.xsl\"?>\n<kml xmlns=\"k\">";
        assert_eq!(root_element(text), Some("kml"));
        assert_eq!(root_element("<rdf:RDF xmlns:rdf=\"r\">"), Some("rdf:RDF"));
        assert_eq!(root_element("<gpx/>"), Some("gpx"));
        assert_eq!(root_element("<?xml version=\"1.0\"?"), None);
        assert_eq!(root_element("plain"), None);
    }

    #[test]
    fn kml_documents() {
        let kml = document("<kml xmlns=\"http://www.opengis.net/kml/2.2\"><Document/></kml>");
        assert_eq!(document_type(&kml), "application/vnd.google-earth.kml+xml");
    }

    #[test]
    fn rdf_documents() {
        let rdf = document(
            "<rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\
             <rdf:Description/></rdf:RDF>",
        );
        assert_eq!(document_type(&rdf), "application/rdf+xml");
    }

    #[test]
    fn gpx_documents() {
        let gpx = document("<gpx version=\"1.1\" creator=\"logger\"><trk/></gpx>");
        assert_eq!(document_type(&gpx), "application/gpx+xml");
    }

    #[test]
    fn svg_documents() {
        let svg = document("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"10\"/>");
        assert_eq!(document_type(&svg), "image/svg+xml");
    }

    #[test]
    fn other_roots_stay_generic_xml() {
        let wfs = document("<wfs:WFS_Capabilities version=\"2.0.0\"/>");
        assert_eq!(document_type(&wfs), XML);
        assert_eq!(document_type(PROLOG.as_bytes()), XML);
    }

    #[test]
    fn markup_without_declaration() {
        assert_eq!(markup_type("<!DOCTYPE html><head></head>"), Some("text/html"));
        assert_eq!(markup_type("<HTML><body/></HTML>"), Some("text/html"));
        assert_eq!(
            markup_type("<kml xmlns=\"http://www.opengis.net/kml/2.2\"/>"),
            Some("application/vnd.google-earth.kml+xml")
        );
        assert_eq!(markup_type("<?xml version=\"1.0\"?><catalog/>"), Some(XML));
        assert_eq!(markup_type("<b>bold</b> claims"), None);
    }
}
