//! Turns a descriptor plus a base endpoint into a `SerializedRequest`.
//!
//! # Design
//! `WireSerializer` is a pure function of its inputs: the same endpoint and
//! descriptor always produce the same output, and one serializer can be shared
//! across threads. It adds no headers of its own. Encodable bodies are encoded
//! here, with the body's own encoder if it has one and the serializer's
//! default otherwise.
//!
//! Serialization is all or nothing; the first problem found is returned and no
//! partial request escapes.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::body::{BodyEncoder, JsonEncoder};
use crate::descriptor::RequestDescriptor;
use crate::error::{RequestError, Result};
use crate::header;
use crate::http::SerializedRequest;
use crate::query;

/// Characters escaped inside the endpoint's base path. `%` is left alone
/// since a base path usually comes out of an already-encoded URL.
const BASE_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped inside a descriptor's path segments. Segments are
/// literal text, so `%` is escaped too.
const PATH_SEGMENT: &AsciiSet = &BASE_PATH
    .add(b'%')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'|');

/// Base endpoint a descriptor is resolved against.
///
/// Deserializable so it can live in configuration:
///
/// ```
/// let endpoint: reqwire_core::Endpoint = serde_json::from_str(
///     r#"{"scheme": "https", "authority": "api.example.com", "base_path": "/v1"}"#,
/// ).unwrap();
/// assert_eq!(endpoint.authority, "api.example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub scheme: String,
    pub authority: String,
    #[serde(default)]
    pub base_path: Option<String>,
}

impl Endpoint {
    pub fn new(scheme: impl Into<String>, authority: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            authority: authority.into(),
            base_path: None,
        }
    }

    pub fn with_base_path(self, base_path: impl Into<String>) -> Self {
        Self {
            base_path: Some(base_path.into()),
            ..self
        }
    }

    /// Parse `scheme://authority[/base/path]`. Query and fragment are not
    /// allowed on a base endpoint.
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input).map_err(|e| RequestError::InvalidEndpoint(format!("{input}: {e}")))?;
        if url.query().is_some() || url.fragment().is_some() {
            return Err(RequestError::InvalidEndpoint(format!(
                "{input}: base endpoint cannot carry a query or fragment"
            )));
        }
        let host = url
            .host_str()
            .ok_or_else(|| RequestError::InvalidEndpoint(format!("{input}: missing host")))?;
        let mut authority = String::new();
        if !url.username().is_empty() {
            authority.push_str(url.username());
            if let Some(password) = url.password() {
                authority.push(':');
                authority.push_str(password);
            }
            authority.push('@');
        }
        authority.push_str(host);
        if let Some(port) = url.port() {
            authority.push_str(&format!(":{port}"));
        }
        let base_path = match url.path() {
            "" | "/" => None,
            path => Some(path.to_string()),
        };
        Ok(Self {
            scheme: url.scheme().to_string(),
            authority,
            base_path,
        })
    }
}

impl FromStr for Endpoint {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self> {
        Endpoint::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.base_path.as_deref().unwrap_or(""))
    }
}

#[derive(Debug, Clone)]
pub struct WireSerializer {
    default_encoder: Arc<dyn BodyEncoder>,
}

impl Default for WireSerializer {
    fn default() -> Self {
        Self {
            default_encoder: Arc::new(JsonEncoder::compact()),
        }
    }
}

impl WireSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder used for encodable bodies that carry no encoder of their own.
    pub fn with_default_encoder(self, encoder: Arc<dyn BodyEncoder>) -> Self {
        Self {
            default_encoder: encoder,
        }
    }

    pub fn serialize(&self, endpoint: &Endpoint, descriptor: &RequestDescriptor) -> Result<SerializedRequest> {
        check_authority(endpoint)?;

        let path = join_path(endpoint.base_path.as_deref(), descriptor.path_segments())?;
        let components = descriptor.components();
        let query = query::encode(&components.query_items);

        let mut url = format!("{}://{}{}", endpoint.scheme, endpoint.authority, path);
        if let Some(query) = &query {
            url.push('?');
            url.push_str(query);
        }
        let parsed = Url::parse(&url).map_err(|e| RequestError::InvalidEndpoint(format!("{url}: {e}")))?;
        if parsed.path() != path {
            return Err(RequestError::InvalidEndpoint(format!(
                "{url}: path would be sent as {:?}",
                parsed.path()
            )));
        }

        for (name, value) in components.headers.iter() {
            header::validate(name, value).map_err(|reason| RequestError::InvalidHeader {
                name: name.to_string(),
                reason,
            })?;
        }

        let body = match &components.body {
            Some(content) => {
                let bytes = content.resolve(self.default_encoder.as_ref())?;
                tracing::trace!(id = %descriptor.id(), len = bytes.len(), "resolved request body");
                Some(bytes)
            }
            None => None,
        };

        tracing::debug!(
            id = %descriptor.id(),
            method = %descriptor.method(),
            %path,
            "serialized request"
        );

        Ok(SerializedRequest {
            id: descriptor.id(),
            method: descriptor.method(),
            scheme: endpoint.scheme.clone(),
            authority: endpoint.authority.clone(),
            path,
            query,
            headers: components.headers.to_pairs(),
            body,
            timeout: components.timeout,
            cache_policy: components.cache_policy,
            allows_metered_transport: components.allows_metered_transport,
        })
    }

    /// Serialize and render as a `curl` command in one step.
    pub fn curl_command(&self, endpoint: &Endpoint, descriptor: &RequestDescriptor) -> Result<String> {
        Ok(self.serialize(endpoint, descriptor)?.curl_command())
    }
}

fn check_authority(endpoint: &Endpoint) -> Result<()> {
    if endpoint.scheme.is_empty() {
        return Err(RequestError::InvalidEndpoint("empty scheme".to_string()));
    }
    if endpoint.authority.is_empty() {
        return Err(RequestError::InvalidEndpoint("empty authority".to_string()));
    }
    if endpoint
        .authority
        .chars()
        .any(|c| matches!(c, '/' | '?' | '#') || c.is_whitespace())
    {
        return Err(RequestError::InvalidEndpoint(format!(
            "authority {:?} contains a path, query or whitespace character",
            endpoint.authority
        )));
    }
    Ok(())
}

/// Base path plus segments, with empty pieces dropped so that `/` never
/// repeats. The result always starts with `/`.
///
/// `.` and `..` pieces are rejected: a URL parser resolves them, so the path
/// on the wire would no longer be the one built here.
fn join_path(base_path: Option<&str>, segments: &[String]) -> Result<String> {
    let base = base_path.into_iter().map(|part| (part, BASE_PATH));
    let segments = segments.iter().map(|part| (part.as_str(), PATH_SEGMENT));

    let mut path = String::new();
    for (part, set) in base.chain(segments) {
        for piece in part.split('/').filter(|piece| !piece.is_empty()) {
            if is_dot_segment(piece) {
                return Err(RequestError::InvalidEndpoint(format!(
                    "dot segment {piece:?} in path {part:?}"
                )));
            }
            path.push('/');
            path.extend(utf8_percent_encode(piece, set));
        }
    }
    if path.is_empty() {
        path.push('/');
    }
    Ok(path)
}

/// `.` and `..`, including the `%2e` spellings URL parsers also resolve.
fn is_dot_segment(piece: &str) -> bool {
    matches!(
        piece.to_ascii_lowercase().as_str(),
        "." | ".." | "%2e" | ".%2e" | "%2e." | "%2e%2e"
    )
}
