//! Success and fault envelope serialization.
//!
//! The business envelope is operation-specific; the fault envelope has
//! one fixed shape for every failed operation. All text values pass
//! through XML escaping on the way out.

use quick_xml::escape::escape;
use std::fmt::Write as _;

const WSDL_NS: &str = "http://notarr.dev/soap/wsdl";
const TYPES_NS: &str = "http://notarr.dev/soap/types";
const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// One response field. Repeated fields are expressed as repeated
/// entries with the same name; nested records as `Children`.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    value: FieldValue,
}

#[derive(Debug, Clone)]
enum FieldValue {
    Text(String),
    Children(Vec<Field>),
}

impl Field {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Text(value.into()),
        }
    }

    pub fn group(name: impl Into<String>, children: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Children(children),
        }
    }
}

/// Serialize a success envelope for `operation` (e.g. `RegisterUser`
/// becomes a `tns:RegisterUserResponse` wrapper).
#[must_use]
pub fn success_envelope(operation: &str, fields: &[Field]) -> String {
    let mut body = String::new();
    for field in fields {
        write_field(&mut body, field, 4);
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <soap:Envelope xmlns:soap=\"{SOAP_NS}\" xmlns:tns=\"{WSDL_NS}\" xmlns:types=\"{TYPES_NS}\">\n\
         {i1}<soap:Body>\n\
         {i2}<tns:{operation}Response>\n\
         {i3}<types:response>\n\
         {body}\
         {i3}</types:response>\n\
         {i2}</tns:{operation}Response>\n\
         {i1}</soap:Body>\n\
         </soap:Envelope>",
        i1 = indent(1),
        i2 = indent(2),
        i3 = indent(3),
    )
}

/// Serialize the fixed-shape fault envelope. The semantic code rides in
/// `detail/code`; the transport status is chosen by the caller.
#[must_use]
pub fn fault_envelope(message: &str, code: u16) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <soap:Envelope xmlns:soap=\"{SOAP_NS}\">\n\
         {i1}<soap:Body>\n\
         {i2}<soap:Fault>\n\
         {i3}<faultcode>soap:Server</faultcode>\n\
         {i3}<faultstring>{msg}</faultstring>\n\
         {i3}<detail>\n\
         {i4}<code>{code}</code>\n\
         {i3}</detail>\n\
         {i2}</soap:Fault>\n\
         {i1}</soap:Body>\n\
         </soap:Envelope>",
        msg = escape(message),
        i1 = indent(1),
        i2 = indent(2),
        i3 = indent(3),
        i4 = indent(4),
    )
}

fn write_field(out: &mut String, field: &Field, depth: usize) {
    match &field.value {
        FieldValue::Text(value) => {
            let _ = writeln!(
                out,
                "{}<types:{name}>{value}</types:{name}>",
                indent(depth),
                name = field.name,
                value = escape(value),
            );
        }
        FieldValue::Children(children) => {
            let _ = writeln!(out, "{}<types:{}>", indent(depth), field.name);
            for child in children {
                write_field(out, child, depth + 1);
            }
            let _ = writeln!(out, "{}</types:{}>", indent(depth), field.name);
        }
    }
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_wraps_fields_in_the_operation_response() {
        let xml = success_envelope(
            "RegisterUser",
            &[
                Field::text("id", "u1"),
                Field::text("username", "alice"),
            ],
        );

        assert!(xml.contains("<tns:RegisterUserResponse>"));
        assert!(xml.contains("<types:response>"));
        assert!(xml.contains("<types:id>u1</types:id>"));
        assert!(xml.contains("<types:username>alice</types:username>"));
    }

    #[test]
    fn list_fields_repeat_per_value_in_order() {
        let xml = success_envelope(
            "CreateNote",
            &[
                Field::text("tags", "b"),
                Field::text("tags", "a"),
                Field::text("tags", "b"),
            ],
        );

        let first = xml.find("<types:tags>b</types:tags>").unwrap();
        let second = xml.find("<types:tags>a</types:tags>").unwrap();
        assert!(first < second);
        assert_eq!(xml.matches("<types:tags>b</types:tags>").count(), 2);
    }

    #[test]
    fn nested_records_emit_child_elements() {
        let xml = success_envelope(
            "GetTags",
            &[Field::group(
                "tags",
                vec![Field::text("id", "t1"), Field::text("name", "work")],
            )],
        );

        assert!(xml.contains("<types:tags>"));
        assert!(xml.contains("<types:name>work</types:name>"));
        assert!(xml.contains("</types:tags>"));
    }

    #[test]
    fn values_are_escaped() {
        let xml = success_envelope("CreateNote", &[Field::text("title", "Tom & <Jerry>")]);
        assert!(xml.contains("<types:title>Tom &amp; &lt;Jerry&gt;</types:title>"));
    }

    #[test]
    fn fault_shape_is_operation_independent() {
        let xml = fault_envelope("Note not found", 404);

        assert!(xml.contains("<soap:Fault>"));
        assert!(xml.contains("<faultcode>soap:Server</faultcode>"));
        assert!(xml.contains("<faultstring>Note not found</faultstring>"));
        assert!(xml.contains("<code>404</code>"));
    }
}
