//! Envelope parsing and field extraction.
//!
//! The request body is walked once with a streaming XML reader into a
//! flat multimap of leaf elements, keyed by local name (namespace
//! prefixes are transport artifacts). Field values are unescaped here
//! and re-escaped on output, so payload text can never corrupt field
//! boundaries.

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("Malformed request envelope: {0}")]
    Malformed(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Which fields an operation reads from the envelope, and how.
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    /// Checked in declared order; the first absent one wins the fault.
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    /// Fields collected as ordered multi-values; everything else keeps
    /// only its first occurrence.
    pub repeatable: &'static [&'static str],
}

impl FieldSchema {
    fn declares(&self, name: &str) -> bool {
        self.required.contains(&name) || self.optional.contains(&name)
    }

    fn is_repeatable(&self, name: &str) -> bool {
        self.repeatable.contains(&name)
    }
}

/// A parsed request envelope: the operation marker element plus every
/// leaf element in source order.
#[derive(Debug)]
pub struct EnvelopeDoc {
    operation: Option<String>,
    leaves: Vec<(String, String)>,
}

impl EnvelopeDoc {
    /// Parse a raw payload. Lenient: a payload with no recognizable
    /// elements parses to a document with no operation (routed to the
    /// unsupported-operation fault, never an internal error). Only hard
    /// XML errors such as mismatched tags are reported as malformed.
    pub fn parse(raw: &str) -> Result<Self, EnvelopeError> {
        let mut reader = Reader::from_str(raw);
        reader.config_mut().trim_text(true);

        let mut operation: Option<String> = None;
        let mut leaves: Vec<(String, String)> = Vec::new();
        // (local name, accumulated text, has child elements)
        let mut stack: Vec<(String, String, bool)> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = local_name(e.local_name().as_ref());
                    if let Some((_, _, has_children)) = stack.last_mut() {
                        *has_children = true;
                    }
                    if operation.is_none() && name.ends_with("Request") {
                        operation = Some(name.clone());
                    }
                    stack.push((name, String::new(), false));
                }
                Ok(Event::Empty(e)) => {
                    let name = local_name(e.local_name().as_ref());
                    if let Some((_, _, has_children)) = stack.last_mut() {
                        *has_children = true;
                    }
                    // Self-closing leaf: present with an empty value.
                    leaves.push((name, String::new()));
                }
                Ok(Event::Text(t)) => {
                    if let Some((_, text, _)) = stack.last_mut() {
                        let raw_text = reader
                            .decoder()
                            .decode(t.as_ref())
                            .map_err(|e| EnvelopeError::Malformed(e.to_string()))?
                            .into_owned();
                        match unescape(&raw_text) {
                            Ok(unescaped) => text.push_str(&unescaped),
                            // Stray ampersands are tolerated verbatim.
                            Err(_) => text.push_str(&raw_text),
                        }
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some((_, text, _)) = stack.last_mut() {
                        let raw_text = reader
                            .decoder()
                            .decode(c.as_ref())
                            .map_err(|e| EnvelopeError::Malformed(e.to_string()))?;
                        text.push_str(&raw_text);
                    }
                }
                Ok(Event::End(_)) => {
                    if let Some((name, text, has_children)) = stack.pop()
                        && !has_children
                    {
                        leaves.push((name, text));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(EnvelopeError::Malformed(e.to_string())),
            }
        }

        Ok(Self { operation, leaves })
    }

    /// The operation marker element, when one was found.
    #[must_use]
    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    /// Extract typed fields per the schema. A required field with no
    /// element in the payload yields `MissingField`; an absent optional
    /// field yields no entry, not an empty string.
    pub fn extract(&self, schema: &FieldSchema) -> Result<Fields, EnvelopeError> {
        for name in schema.required {
            if !self.leaves.iter().any(|(n, _)| n == name) {
                return Err(EnvelopeError::MissingField((*name).to_string()));
            }
        }

        let mut fields = Fields::default();
        for (name, value) in &self.leaves {
            if !schema.declares(name) {
                continue;
            }
            if !schema.is_repeatable(name) && fields.get(name).is_some() {
                continue;
            }
            fields
                .values
                .push((name.clone(), value.clone()));
        }

        Ok(fields)
    }
}

/// Extracted field values in source order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Fields {
    values: Vec<(String, String)>,
}

impl Fields {
    /// First value of a field, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values of a repeatable field, preserving order and
    /// duplicates.
    #[must_use]
    pub fn all(&self, name: &str) -> Vec<String> {
        self.values
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Like [`Fields::get`] but failing with `MissingField`; a
    /// belt-and-braces guard for fields the schema already required.
    pub fn required(&self, name: &str) -> Result<&str, EnvelopeError> {
        self.get(name)
            .ok_or_else(|| EnvelopeError::MissingField(name.to_string()))
    }
}

fn local_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: FieldSchema = FieldSchema {
        required: &["token", "title"],
        optional: &["tags", "reminder"],
        repeatable: &["tags"],
    };

    fn envelope(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:typ="http://notarr.dev/soap/types">
    <soapenv:Body>{body}</soapenv:Body>
</soapenv:Envelope>"#
        )
    }

    #[test]
    fn operation_marker_is_the_request_element() {
        let doc = EnvelopeDoc::parse(&envelope(
            "<typ:CreateNoteRequest><typ:token>t</typ:token><typ:title>x</typ:title></typ:CreateNoteRequest>",
        ))
        .unwrap();
        assert_eq!(doc.operation(), Some("CreateNoteRequest"));
    }

    #[test]
    fn repeatable_fields_preserve_order_and_duplicates() {
        let doc = EnvelopeDoc::parse(&envelope(
            "<typ:CreateNoteRequest>\
             <typ:token>t</typ:token><typ:title>x</typ:title>\
             <typ:tags>b</typ:tags><typ:tags>a</typ:tags><typ:tags>b</typ:tags>\
             </typ:CreateNoteRequest>",
        ))
        .unwrap();

        let fields = doc.extract(&SCHEMA).unwrap();
        assert_eq!(fields.all("tags"), vec!["b", "a", "b"]);
    }

    #[test]
    fn absent_optional_field_has_no_entry() {
        let doc = EnvelopeDoc::parse(&envelope(
            "<typ:CreateNoteRequest><typ:token>t</typ:token><typ:title>x</typ:title></typ:CreateNoteRequest>",
        ))
        .unwrap();

        let fields = doc.extract(&SCHEMA).unwrap();
        assert_eq!(fields.get("reminder"), None);
        assert!(fields.all("tags").is_empty());
    }

    #[test]
    fn missing_required_field_is_reported_in_order() {
        let doc = EnvelopeDoc::parse(&envelope(
            "<typ:CreateNoteRequest><typ:title>x</typ:title></typ:CreateNoteRequest>",
        ))
        .unwrap();

        assert_eq!(
            doc.extract(&SCHEMA),
            Err(EnvelopeError::MissingField("token".to_string()))
        );
    }

    #[test]
    fn escaped_values_are_unescaped() {
        let doc = EnvelopeDoc::parse(&envelope(
            "<typ:CreateNoteRequest>\
             <typ:token>t</typ:token>\
             <typ:title>Tom &amp; Jerry &lt;3</typ:title>\
             </typ:CreateNoteRequest>",
        ))
        .unwrap();

        let fields = doc.extract(&SCHEMA).unwrap();
        assert_eq!(fields.get("title"), Some("Tom & Jerry <3"));
    }

    #[test]
    fn delimiter_text_inside_a_value_stays_in_that_value() {
        // The value of one field names the delimiter of another.
        let doc = EnvelopeDoc::parse(&envelope(
            "<typ:CreateNoteRequest>\
             <typ:token>t</typ:token>\
             <typ:title>&lt;typ:token&gt;fake&lt;/typ:token&gt;</typ:title>\
             </typ:CreateNoteRequest>",
        ))
        .unwrap();

        let fields = doc.extract(&SCHEMA).unwrap();
        assert_eq!(fields.get("token"), Some("t"));
        assert_eq!(fields.get("title"), Some("<typ:token>fake</typ:token>"));
    }

    #[test]
    fn non_xml_payload_has_no_operation() {
        let doc = EnvelopeDoc::parse("just some text").unwrap();
        assert_eq!(doc.operation(), None);
    }

    #[test]
    fn mismatched_tags_are_malformed() {
        assert!(matches!(
            EnvelopeDoc::parse("<a><b></a></b>"),
            Err(EnvelopeError::Malformed(_))
        ));
    }

    #[test]
    fn self_closing_optional_field_is_present_and_empty() {
        let doc = EnvelopeDoc::parse(&envelope(
            "<typ:CreateNoteRequest>\
             <typ:token>t</typ:token><typ:title>x</typ:title><typ:reminder/>\
             </typ:CreateNoteRequest>",
        ))
        .unwrap();

        let fields = doc.extract(&SCHEMA).unwrap();
        assert_eq!(fields.get("reminder"), Some(""));
    }
}
