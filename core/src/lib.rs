//! Declarative HTTP request descriptors and their wire serialization.
//!
//! # Overview
//! Builds `RequestDescriptor` values and serializes them into
//! `SerializedRequest` values without touching the network (host-does-IO
//! pattern). A transport adapter outside this crate executes the request,
//! which keeps the core deterministic and testable.
//!
//! # Design
//! - Descriptors are immutable values; every modifier consumes one and returns
//!   a new one, so they are `Send + Sync` and need no locking.
//! - `ListBuilder` gives conditional and looped construction of header, query
//!   and body lists.
//! - `WireSerializer` combines an `Endpoint` with a descriptor into path,
//!   query, headers and body bytes. Bodies are encoded only at that point.
//! - `MultipartForm` encodes byte-exact `multipart/form-data` bodies.
//! - `curl` renders a serialized request as a shell command for debugging.
//!
//! ```
//! use reqwire_core::{Endpoint, Header, Json, MimeType, RequestDescriptor, WireSerializer};
//!
//! let request = RequestDescriptor::post(["posts"])
//!     .with_headers([Header::accept(MimeType::Json)])
//!     .with_body(Json(serde_json::json!({"title": "hi"})));
//! let endpoint = Endpoint::parse("https://api.example.com").unwrap();
//! let wire = WireSerializer::new().serialize(&endpoint, &request).unwrap();
//! assert_eq!(wire.url(), "https://api.example.com/posts");
//! assert_eq!(wire.body.as_deref(), Some(&br#"{"title":"hi"}"#[..]));
//! ```

pub mod body;
pub mod builder;
pub mod curl;
pub mod descriptor;
pub mod error;
pub mod header;
pub mod http;
pub mod multipart;
pub mod query;
pub mod serializer;

pub use body::{BodyContent, BodyEncoder, EncodableBody, IntoBody, Json, JsonEncoder};
pub use builder::ListBuilder;
pub use descriptor::{CachePolicy, Components, RequestDescriptor, DEFAULT_TIMEOUT};
pub use error::{EncodeError, RequestError, Result};
pub use header::{
    AuthScheme, Authorization, CacheDirective, Header, HeaderSet, HeaderValue, LanguageTag, MimeType,
};
pub use http::{HttpMethod, HttpResponse, SerializedRequest};
pub use multipart::{MultipartField, MultipartForm};
pub use query::QueryItem;
pub use serializer::{Endpoint, WireSerializer};
