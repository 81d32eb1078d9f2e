//! `multipart/form-data` encoding.
//!
//! # Design
//! Output is byte-exact and depends only on the boundary and the fields, so
//! encoding the same form twice yields identical bytes. Each part is
//!
//! ```text
//! --{boundary}\r\n
//! {headers, Content-Disposition first}\r\n
//! \r\n
//! {body}\r\n
//! ```
//!
//! followed by `--{boundary}--\r\n` once after the last part.
//!
//! `encode` never escapes a boundary that also occurs inside a part body.
//! Picking a safe boundary is the caller's job; `validate` detects the
//! collision and `generate_boundary` produces a random one.

use uuid::Uuid;

use crate::error::{RequestError, Result};
use crate::header::MimeType;

const CONTENT_DISPOSITION: &str = "Content-Disposition";
const CONTENT_TYPE: &str = "Content-Type";

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartField {
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl MultipartField {
    /// A text part, UTF-8 encoded.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            headers: Vec::new(),
            body: value.into().into_bytes(),
        }
    }

    /// A binary part used verbatim.
    pub fn file(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            headers: Vec::new(),
            body: bytes.into(),
        }
    }

    /// `name` and `filename` are quoted; `"`, CR and LF inside them are
    /// written as `%22`, `%0D` and `%0A` the way browsers encode form fields.
    pub fn content_disposition(self, name: impl Into<String>, filename: Option<&str>) -> Self {
        let mut value = format!("form-data; name=\"{}\"", escape_quoted(&name.into()));
        if let Some(filename) = filename {
            value.push_str(&format!("; filename=\"{}\"", escape_quoted(filename)));
        }
        self.with_header(CONTENT_DISPOSITION, value)
    }

    pub fn content_type(self, mime: impl Into<MimeType>) -> Self {
        self.with_header(CONTENT_TYPE, mime.into().to_string())
    }

    /// Set any other part header; an existing header of the same name is
    /// replaced in place.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(entry) => *entry = (name, value),
            None => self.headers.push((name, value)),
        }
        self
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Headers in wire order: Content-Disposition first, the rest as attached.
    fn wire_headers(&self) -> Vec<&(String, String)> {
        let mut headers: Vec<_> = self.headers.iter().collect();
        headers.sort_by_key(|(name, _)| !name.eq_ignore_ascii_case(CONTENT_DISPOSITION));
        headers
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    boundary: String,
    fields: Vec<MultipartField>,
}

impl MultipartForm {
    pub fn new(boundary: impl Into<String>, fields: impl IntoIterator<Item = MultipartField>) -> Self {
        Self {
            boundary: boundary.into(),
            fields: fields.into_iter().collect(),
        }
    }

    /// A random boundary. Callers opt into this explicitly; the encoder itself
    /// is deterministic.
    pub fn generate_boundary() -> String {
        format!("reqwire.boundary.{}", Uuid::new_v4().simple())
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn fields(&self) -> &[MultipartField] {
        &self.fields
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for field in &self.fields {
            out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            for (name, value) in field.wire_headers() {
                out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
            }
            out.extend_from_slice(b"\r\n");
            out.extend_from_slice(&field.body);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        out
    }

    /// Fail if a part body contains the delimiter `--{boundary}`.
    pub fn validate(&self) -> Result<()> {
        let delimiter = format!("--{}", self.boundary);
        let needle = delimiter.as_bytes();
        for (index, field) in self.fields.iter().enumerate() {
            if field.body.windows(needle.len()).any(|window| window == needle) {
                return Err(RequestError::BoundaryCollision {
                    boundary: self.boundary.clone(),
                    field: index,
                });
            }
        }
        Ok(())
    }
}

fn escape_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("%22"),
            '\r' => out.push_str("%0D"),
            '\n' => out.push_str("%0A"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_text_field() {
        let form = MultipartForm::new("B1", [MultipartField::text("Hello").content_disposition("message", None)]);
        assert_eq!(
            form.encode(),
            b"--B1\r\nContent-Disposition: form-data; name=\"message\"\r\n\r\nHello\r\n--B1--\r\n"
        );
    }

    #[test]
    fn disposition_precedes_content_type_in_either_order() {
        let late = MultipartField::file(vec![0xFF, 0x00])
            .content_type(MimeType::Png)
            .content_disposition("avatar", Some("me.png"));
        let early = MultipartField::file(vec![0xFF, 0x00])
            .content_disposition("avatar", Some("me.png"))
            .content_type(MimeType::Png);

        let expected: &[u8] = b"--X\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"me.png\"\r\nContent-Type: image/png\r\n\r\n\xFF\x00\r\n--X--\r\n";
        assert_eq!(MultipartForm::new("X", [late]).encode(), expected);
        assert_eq!(MultipartForm::new("X", [early]).encode(), expected);
    }

    #[test]
    fn other_headers_keep_relative_order() {
        let field = MultipartField::text("v")
            .with_header("X-B", "b")
            .with_header("X-A", "a")
            .content_disposition("f", None);
        let names: Vec<_> = field.wire_headers().into_iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["Content-Disposition", "X-B", "X-A"]);
    }

    #[test]
    fn fields_keep_declaration_order() {
        let form = MultipartForm::new(
            "b",
            [
                MultipartField::text("1").content_disposition("first", None),
                MultipartField::text("2").content_disposition("second", None),
            ],
        );
        let text = String::from_utf8(form.encode()).unwrap();
        assert!(text.find("first").unwrap() < text.find("second").unwrap());
        assert!(text.ends_with("\r\n--b--\r\n"));
    }

    #[test]
    fn empty_form_is_only_the_closing_delimiter() {
        let form = MultipartForm::new("e", Vec::new());
        assert_eq!(form.encode(), b"--e--\r\n");
    }

    #[test]
    fn redisposition_replaces_in_place() {
        let field = MultipartField::text("v")
            .content_disposition("old", None)
            .content_disposition("new", None);
        assert_eq!(field.headers().len(), 1);
        assert_eq!(field.headers()[0].1, "form-data; name=\"new\"");
    }

    #[test]
    fn disposition_parameters_cannot_break_the_header() {
        let field = MultipartField::text("v").content_disposition("a\"\r\nX-Evil: 1", Some("q\".txt"));
        assert_eq!(
            field.headers()[0].1,
            "form-data; name=\"a%22%0D%0AX-Evil: 1\"; filename=\"q%22.txt\""
        );
        let encoded = MultipartForm::new("b", [field]).encode();
        let text = String::from_utf8(encoded).unwrap();
        assert!(!text.contains("\r\nX-Evil"));
    }

    #[test]
    fn plain_disposition_parameters_are_untouched() {
        let field = MultipartField::text("v").content_disposition("résumé", Some("my file.pdf"));
        assert_eq!(field.headers()[0].1, "form-data; name=\"résumé\"; filename=\"my file.pdf\"");
    }

    #[test]
    fn content_type_header_value() {
        assert_eq!(MultipartForm::new("B1", Vec::new()).content_type(), "multipart/form-data; boundary=B1");
    }

    #[test]
    fn validate_detects_collision() {
        let form = MultipartForm::new(
            "abc",
            [
                MultipartField::text("safe"),
                MultipartField::text("oops --abc inside"),
            ],
        );
        let err = form.validate().unwrap_err();
        assert!(matches!(err, RequestError::BoundaryCollision { field: 1, .. }));
    }

    #[test]
    fn generated_boundaries_are_distinct_and_valid() {
        let a = MultipartForm::generate_boundary();
        let b = MultipartForm::generate_boundary();
        assert_ne!(a, b);
        assert!(a.len() <= 70);
        let form = MultipartForm::new(a, [MultipartField::text("payload")]);
        assert!(form.validate().is_ok());
    }
}
