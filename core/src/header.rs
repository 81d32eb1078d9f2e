//! Typed header values.
//!
//! # Design
//! Anything that can produce a `(name, value)` pair implements `HeaderValue`.
//! The common headers are a closed `Header` enum so they can be matched and
//! compared; extension happens in two places only: `Header::Custom` /
//! user types implementing `HeaderValue`, and the `AuthScheme` trait for
//! authorization schemes beyond Bearer and Basic.
//!
//! Values are not validated here. `HeaderSet` accepts any string and the
//! serializer rejects malformed names and values later.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// A producer of one HTTP header.
pub trait HeaderValue {
    fn name(&self) -> String;
    fn value(&self) -> String;
}

impl<T: HeaderValue + ?Sized> HeaderValue for &T {
    fn name(&self) -> String {
        (**self).name()
    }

    fn value(&self) -> String {
        (**self).value()
    }
}

impl<T: HeaderValue + ?Sized> HeaderValue for Box<T> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn value(&self) -> String {
        (**self).value()
    }
}

impl HeaderValue for (String, String) {
    fn name(&self) -> String {
        self.0.clone()
    }

    fn value(&self) -> String {
        self.1.clone()
    }
}

impl HeaderValue for (&str, &str) {
    fn name(&self) -> String {
        self.0.to_string()
    }

    fn value(&self) -> String {
        self.1.to_string()
    }
}

/// Built-in headers.
#[derive(Debug, Clone, PartialEq)]
pub enum Header {
    Authorization(Authorization),
    ContentType(MimeType),
    Accept(MimeType),
    UserAgent(String),
    AcceptLanguage(LanguageTag),
    ContentLanguage(LanguageTag),
    ContentLength(u64),
    CacheControl(CacheDirective),
    Custom { name: String, value: String },
}

impl Header {
    pub fn bearer(token: impl Into<String>) -> Self {
        Header::Authorization(Authorization::Bearer(token.into()))
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Header::Authorization(Authorization::Basic {
            username: username.into(),
            password: password.into(),
        })
    }

    pub fn content_type(mime: impl Into<MimeType>) -> Self {
        Header::ContentType(mime.into())
    }

    pub fn accept(mime: impl Into<MimeType>) -> Self {
        Header::Accept(mime.into())
    }

    pub fn user_agent(agent: impl Into<String>) -> Self {
        Header::UserAgent(agent.into())
    }

    pub fn custom(name: impl Into<String>, value: impl Into<String>) -> Self {
        Header::Custom {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl HeaderValue for Header {
    fn name(&self) -> String {
        let name = match self {
            Header::Authorization(_) => "Authorization",
            Header::ContentType(_) => "Content-Type",
            Header::Accept(_) => "Accept",
            Header::UserAgent(_) => "User-Agent",
            Header::AcceptLanguage(_) => "Accept-Language",
            Header::ContentLanguage(_) => "Content-Language",
            Header::ContentLength(_) => "Content-Length",
            Header::CacheControl(_) => "Cache-Control",
            Header::Custom { name, .. } => return name.clone(),
        };
        name.to_string()
    }

    fn value(&self) -> String {
        match self {
            Header::Authorization(auth) => auth.to_string(),
            Header::ContentType(mime) | Header::Accept(mime) => mime.to_string(),
            Header::UserAgent(agent) => agent.clone(),
            Header::AcceptLanguage(tag) | Header::ContentLanguage(tag) => tag.to_string(),
            Header::ContentLength(len) => len.to_string(),
            Header::CacheControl(directive) => directive.to_string(),
            Header::Custom { value, .. } => value.clone(),
        }
    }
}

/// An authorization scheme not covered by `Authorization::Bearer` or
/// `Authorization::Basic`.
pub trait AuthScheme {
    /// Scheme token, e.g. `Digest` or `AWS4-HMAC-SHA256`.
    fn scheme(&self) -> String;
    fn credentials(&self) -> String;
}

/// Value of the `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Bearer(String),
    Basic { username: String, password: String },
    Scheme { scheme: String, credentials: String },
}

impl Authorization {
    pub fn from_scheme(scheme: &impl AuthScheme) -> Self {
        Authorization::Scheme {
            scheme: scheme.scheme(),
            credentials: scheme.credentials(),
        }
    }
}

impl fmt::Display for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authorization::Bearer(token) => write!(f, "Bearer {token}"),
            Authorization::Basic { username, password } => {
                let encoded = STANDARD.encode(format!("{username}:{password}"));
                write!(f, "Basic {encoded}")
            }
            Authorization::Scheme { scheme, credentials } => write!(f, "{scheme} {credentials}"),
        }
    }
}

/// MIME type used by `Content-Type` and `Accept`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MimeType {
    Json,
    Xml,
    PlainText,
    Html,
    FormUrlEncoded,
    OctetStream,
    Pdf,
    Png,
    Jpeg,
    Any,
    Other(String),
}

impl MimeType {
    pub fn as_str(&self) -> &str {
        match self {
            MimeType::Json => "application/json",
            MimeType::Xml => "application/xml",
            MimeType::PlainText => "text/plain",
            MimeType::Html => "text/html",
            MimeType::FormUrlEncoded => "application/x-www-form-urlencoded",
            MimeType::OctetStream => "application/octet-stream",
            MimeType::Pdf => "application/pdf",
            MimeType::Png => "image/png",
            MimeType::Jpeg => "image/jpeg",
            MimeType::Any => "*/*",
            MimeType::Other(mime) => mime,
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MimeType {
    fn from(mime: &str) -> Self {
        MimeType::Other(mime.to_string())
    }
}

impl From<String> for MimeType {
    fn from(mime: String) -> Self {
        MimeType::Other(mime)
    }
}

/// Language tag with an optional quality weight, e.g. `en-US;q=0.8`.
///
/// Weights render clamped to `0..=1`; a `NaN` weight is omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageTag {
    pub tag: String,
    pub quality: Option<f32>,
}

impl LanguageTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            quality: None,
        }
    }

    pub fn with_quality(self, quality: f32) -> Self {
        Self {
            quality: Some(quality),
            ..self
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `+ 0.0` turns a clamped `-0.0` into `0`.
        let quality = self.quality.filter(|q| !q.is_nan()).map(|q| q.clamp(0.0, 1.0) + 0.0);
        match quality {
            Some(q) => write!(f, "{};q={q}", self.tag),
            None => f.write_str(&self.tag),
        }
    }
}

/// A single `Cache-Control` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDirective {
    NoCache,
    NoStore,
    NoTransform,
    OnlyIfCached,
    MustRevalidate,
    Public,
    Private,
    Immutable,
    MaxAge(u64),
    MaxStale(Option<u64>),
    MinFresh(u64),
    Custom(String),
}

impl fmt::Display for CacheDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheDirective::NoCache => f.write_str("no-cache"),
            CacheDirective::NoStore => f.write_str("no-store"),
            CacheDirective::NoTransform => f.write_str("no-transform"),
            CacheDirective::OnlyIfCached => f.write_str("only-if-cached"),
            CacheDirective::MustRevalidate => f.write_str("must-revalidate"),
            CacheDirective::Public => f.write_str("public"),
            CacheDirective::Private => f.write_str("private"),
            CacheDirective::Immutable => f.write_str("immutable"),
            CacheDirective::MaxAge(secs) => write!(f, "max-age={secs}"),
            CacheDirective::MaxStale(None) => f.write_str("max-stale"),
            CacheDirective::MaxStale(Some(secs)) => write!(f, "max-stale={secs}"),
            CacheDirective::MinFresh(secs) => write!(f, "min-fresh={secs}"),
            CacheDirective::Custom(token) => f.write_str(token),
        }
    }
}

/// Header name/value mapping with case-insensitive names.
///
/// Inserting a name that is already present replaces the stored name and
/// value in place, so the set keeps the position of the first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(entry) => *entry = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries.clone()
    }
}

/// Check a header against RFC 9110 token rules and reject CR/LF in values.
pub(crate) fn validate(name: &str, value: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("empty name");
    }
    if !name.bytes().all(is_token_byte) {
        return Err("name is not a valid token");
    }
    if value.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0) {
        return Err("value contains a line break or NUL");
    }
    Ok(())
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Digest;

    impl AuthScheme for Digest {
        fn scheme(&self) -> String {
            "Digest".to_string()
        }

        fn credentials(&self) -> String {
            r#"username="bob", nonce="abc""#.to_string()
        }
    }

    #[test]
    fn bearer_and_basic_render() {
        assert_eq!(Header::bearer("tok").value(), "Bearer tok");
        assert_eq!(Header::basic("aladdin", "opensesame").value(), "Basic YWxhZGRpbjpvcGVuc2VzYW1l");
        assert_eq!(Header::basic("a", "b").name(), "Authorization");
    }

    #[test]
    fn custom_auth_scheme() {
        let header = Header::Authorization(Authorization::from_scheme(&Digest));
        assert_eq!(header.value(), r#"Digest username="bob", nonce="abc""#);
    }

    #[test]
    fn language_quality() {
        let tag = LanguageTag::new("en-US").with_quality(0.8);
        assert_eq!(Header::AcceptLanguage(tag).value(), "en-US;q=0.8");
        assert_eq!(Header::ContentLanguage(LanguageTag::new("de")).value(), "de");
    }

    #[test]
    fn language_quality_out_of_range() {
        assert_eq!(LanguageTag::new("en").with_quality(1.5).to_string(), "en;q=1");
        assert_eq!(LanguageTag::new("en").with_quality(-0.2).to_string(), "en;q=0");
        assert_eq!(LanguageTag::new("en").with_quality(-0.0).to_string(), "en;q=0");
        assert_eq!(LanguageTag::new("en").with_quality(f32::NAN).to_string(), "en");
    }

    #[test]
    fn cache_control_parameterized() {
        assert_eq!(Header::CacheControl(CacheDirective::MaxAge(300)).value(), "max-age=300");
        assert_eq!(Header::CacheControl(CacheDirective::MaxStale(None)).value(), "max-stale");
        assert_eq!(Header::CacheControl(CacheDirective::NoStore).name(), "Cache-Control");
    }

    #[test]
    fn mime_from_str_is_verbatim() {
        assert_eq!(Header::accept("application/vnd.api+json").value(), "application/vnd.api+json");
        assert_eq!(Header::content_type(MimeType::Json).value(), "application/json");
    }

    #[test]
    fn header_set_overwrites_case_insensitively() {
        let mut set = HeaderSet::new();
        set.insert("Accept", "text/html");
        set.insert("X-Trace", "1");
        set.insert("accept", "application/json");
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("ACCEPT"), Some("application/json"));
        assert_eq!(
            set.to_pairs(),
            vec![
                ("accept".to_string(), "application/json".to_string()),
                ("X-Trace".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn validate_rejects_bad_names_and_values() {
        assert!(validate("X-Ok", "fine").is_ok());
        assert!(validate("", "x").is_err());
        assert!(validate("Bad Name", "x").is_err());
        assert!(validate("X-Inject", "a\r\nb").is_err());
    }
}
