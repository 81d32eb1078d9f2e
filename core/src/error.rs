//! Error types for request serialization.
//!
//! # Design
//! Building a descriptor never fails. Everything that can go wrong is
//! discovered when the descriptor is serialized against an endpoint (or, for
//! body blocks and explicit multipart validation, when the caller asks), and
//! surfaces as one `RequestError`. Nothing is retried or recovered here;
//! retry policy belongs to the transport adapter.

/// Errors returned while serializing a `RequestDescriptor`.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The base endpoint, or the endpoint combined with path and query, does
    /// not form a valid URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The attached or default encoder failed on an `Encodable` body.
    #[error("body encoding failed: {0}")]
    BodyEncodingFailed(String),

    /// A body block yielded more than one value.
    #[error("body block yielded {count} values, expected at most one")]
    MultipleBodyValuesSpecified { count: usize },

    /// A header name is not an HTTP token, or its value contains CR/LF.
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: &'static str },

    /// The multipart boundary appears verbatim inside a field body.
    #[error("multipart boundary {boundary:?} collides with the body of field {field}")]
    BoundaryCollision { boundary: String, field: usize },
}

pub type Result<T> = std::result::Result<T, RequestError>;

/// Boxed error returned by `BodyEncoder` implementations.
pub type EncodeError = Box<dyn std::error::Error + Send + Sync>;
