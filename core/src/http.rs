//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe the serializer's output and the adapter's raw result
//! as plain data. The core produces `SerializedRequest` values without ever
//! touching the network; a transport adapter executes them and hands back an
//! `HttpResponse`. Decoding response bytes is not the core's job.
//!
//! All fields use owned types (`String`, `Vec`) so values can be moved to
//! another thread or across an adapter boundary without lifetime concerns.

use std::fmt;
use std::time::Duration;

use uuid::Uuid;

use crate::descriptor::CachePolicy;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
    Connect,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request ready for a transport adapter.
///
/// Produced by `WireSerializer::serialize`. `path` always starts with `/`,
/// `query` is already percent-encoded, and `headers` holds exactly the
/// descriptor's headers in their stored order.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedRequest {
    pub id: Uuid,
    pub method: HttpMethod,
    pub scheme: String,
    pub authority: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
    pub cache_policy: CachePolicy,
    pub allows_metered_transport: bool,
}

impl SerializedRequest {
    /// Absolute URL: scheme, authority, path and query.
    pub fn url(&self) -> String {
        let mut url = format!("{}://{}{}", self.scheme, self.authority, self.path);
        if let Some(query) = &self.query {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Render this request as a `curl` command. See [`crate::curl`].
    pub fn curl_command(&self) -> String {
        crate::curl::curl_command(self)
    }
}

/// A raw HTTP response described as plain data.
///
/// Constructed by the transport adapter after executing a
/// `SerializedRequest`. The body is left as bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
