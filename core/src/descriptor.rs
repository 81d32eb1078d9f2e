//! Immutable request descriptors and the modifier algebra.
//!
//! # Design
//! A `RequestDescriptor` is plain data: an id for caller-side tracing, a
//! method, path segments, and a `Components` bag. Modifiers consume the
//! descriptor and return a new one with a single aspect changed, so a value
//! that was handed out is never mutated afterwards. Clone before modifying if
//! the original is still needed; clones share nothing mutable.
//!
//! Construction never fails. Malformed header names and unencodable bodies
//! are reported by `WireSerializer::serialize`.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::body::{self, BodyContent, BodyEncoder, EncodableBody, IntoBody};
use crate::error::Result;
use crate::header::{HeaderSet, HeaderValue, MimeType};
use crate::http::HttpMethod;
use crate::multipart::MultipartForm;
use crate::query::QueryItem;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Cache behaviour requested from the transport adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    #[default]
    ProtocolDefault,
    ReloadIgnoringLocalCache,
    ReloadIgnoringLocalAndRemoteCache,
    ReturnCacheDataElseLoad,
    ReturnCacheDataDontLoad,
    ReloadRevalidatingCache,
}

/// Everything about a request other than its method and path.
#[derive(Debug, Clone)]
pub struct Components {
    pub headers: HeaderSet,
    pub query_items: Vec<QueryItem>,
    pub body: Option<BodyContent>,
    pub timeout: Duration,
    pub cache_policy: CachePolicy,
    pub allows_metered_transport: bool,
}

impl Default for Components {
    fn default() -> Self {
        Self {
            headers: HeaderSet::new(),
            query_items: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
            cache_policy: CachePolicy::default(),
            allows_metered_transport: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    id: Uuid,
    method: HttpMethod,
    path_segments: Vec<String>,
    components: Components,
}

impl RequestDescriptor {
    pub fn new<I>(method: HttpMethod, path_segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            id: Uuid::new_v4(),
            method,
            path_segments: path_segments.into_iter().map(Into::into).collect(),
            components: Components::default(),
        }
    }

    pub fn get<I>(path_segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(HttpMethod::Get, path_segments)
    }

    pub fn post<I>(path_segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(HttpMethod::Post, path_segments)
    }

    pub fn put<I>(path_segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(HttpMethod::Put, path_segments)
    }

    pub fn patch<I>(path_segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(HttpMethod::Patch, path_segments)
    }

    pub fn delete<I>(path_segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(HttpMethod::Delete, path_segments)
    }

    pub fn head<I>(path_segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(HttpMethod::Head, path_segments)
    }

    pub fn options<I>(path_segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(HttpMethod::Options, path_segments)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path_segments(&self) -> &[String] {
        &self.path_segments
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.components.headers
    }

    pub fn query_items(&self) -> &[QueryItem] {
        &self.components.query_items
    }

    pub fn body(&self) -> Option<&BodyContent> {
        self.components.body.as_ref()
    }

    // ---------------------------------------------------------------------
    // Modifiers
    // ---------------------------------------------------------------------

    /// Set a header. Names match case-insensitively; the last write wins.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.components.headers.insert(name, value);
        self
    }

    pub fn with_headers<I>(mut self, headers: I) -> Self
    where
        I: IntoIterator,
        I::Item: HeaderValue,
    {
        for header in headers {
            self.components.headers.insert(header.name(), header.value());
        }
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.components.query_items.push(QueryItem::new(name, value));
        self
    }

    /// Append a query parameter without a value, e.g. `?verbose`.
    pub fn with_query_flag(mut self, name: impl Into<String>) -> Self {
        self.components.query_items.push(QueryItem::flag(name));
        self
    }

    pub fn with_queries<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<QueryItem>,
    {
        self.components.query_items.extend(items.into_iter().map(Into::into));
        self
    }

    /// Attach a body.
    ///
    /// Encodable bodies (`Json(..)`) also set `Content-Type: application/json`.
    /// Raw bytes are used verbatim and leave the headers alone. `None` attaches
    /// nothing and changes nothing.
    pub fn with_body(self, body: impl IntoBody) -> Self {
        match body.into_body() {
            Some(content) => self.attach_body(content),
            None => self,
        }
    }

    /// Attach an encodable body that is encoded with `encoder` instead of the
    /// serializer's default.
    pub fn with_encoded_body<T>(self, value: T, encoder: Arc<dyn BodyEncoder>) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        self.with_body(EncodableBody::new(value).with_encoder(encoder))
    }

    /// Attach the single body produced by a body block.
    ///
    /// Fails with `MultipleBodyValuesSpecified` if the block yielded more than
    /// one value; an empty block leaves the descriptor unchanged.
    pub fn with_body_block<I>(self, block: I) -> Result<Self>
    where
        I: IntoIterator<Item = BodyContent>,
    {
        Ok(self.with_body(body::single(block.into_iter().collect())?))
    }

    /// Attach an encoded multipart form and its `Content-Type`.
    pub fn with_multipart(mut self, form: &MultipartForm) -> Self {
        if let Err(err) = form.validate() {
            tracing::warn!(id = %self.id, error = %err, "multipart boundary collision");
        }
        self.components.headers.insert("Content-Type", form.content_type());
        self.components.body = Some(BodyContent::Raw(form.encode()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.components.timeout = timeout;
        self
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.components.cache_policy = policy;
        self
    }

    pub fn with_metered_transport_allowed(mut self, allowed: bool) -> Self {
        self.components.allows_metered_transport = allowed;
        self
    }

    pub fn appending_path(mut self, segment: impl Into<String>) -> Self {
        self.path_segments.push(segment.into());
        self
    }

    /// Give the descriptor a fresh id, e.g. when reusing a template.
    pub fn regenerate_id(mut self) -> Self {
        self.id = Uuid::new_v4();
        self
    }

    fn attach_body(mut self, content: BodyContent) -> Self {
        if !content.is_raw() {
            self.components.headers.insert("Content-Type", MimeType::Json.as_str());
        }
        self.components.body = Some(content);
        self
    }
}
