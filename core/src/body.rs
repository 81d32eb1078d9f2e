//! Request bodies and their encoders.
//!
//! # Design
//! A body is either raw bytes, attached verbatim, or an encodable value whose
//! bytes are produced only when the descriptor is serialized. Encoders work on
//! `serde_json::Value`, which is the serde data model boundary: the value is
//! captured behind a closure at attach time and converted on demand, so an
//! encoding failure surfaces from serialization and never from a modifier.
//!
//! The default encoder emits compact JSON. `serde_json::Value` keeps object
//! keys sorted, so the output for a given value is canonical.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{EncodeError, RequestError, Result};

/// Turns an encodable body into bytes.
pub trait BodyEncoder: Send + Sync + fmt::Debug {
    fn encode(&self, value: &Value) -> std::result::Result<Vec<u8>, EncodeError>;
}

/// JSON encoder, compact unless built with [`JsonEncoder::pretty`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonEncoder {
    pretty: bool,
}

impl JsonEncoder {
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl BodyEncoder for JsonEncoder {
    fn encode(&self, value: &Value) -> std::result::Result<Vec<u8>, EncodeError> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        Ok(bytes)
    }
}

type Deferred = dyn Fn() -> serde_json::Result<Value> + Send + Sync;

/// A value to be encoded at serialization time, optionally with its own
/// encoder.
#[derive(Clone)]
pub struct EncodableBody {
    value: Arc<Deferred>,
    encoder: Option<Arc<dyn BodyEncoder>>,
}

impl EncodableBody {
    pub fn new<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self {
            value: Arc::new(move || serde_json::to_value(&value)),
            encoder: None,
        }
    }

    pub fn with_encoder(self, encoder: Arc<dyn BodyEncoder>) -> Self {
        Self {
            encoder: Some(encoder),
            ..self
        }
    }

    pub fn encoder(&self) -> Option<&Arc<dyn BodyEncoder>> {
        self.encoder.as_ref()
    }

    /// Encode with the attached encoder, falling back to `default`.
    pub fn encode(&self, default: &dyn BodyEncoder) -> Result<Vec<u8>> {
        let value = (self.value)().map_err(|e| RequestError::BodyEncodingFailed(e.to_string()))?;
        let encoder = self.encoder.as_deref().unwrap_or(default);
        encoder
            .encode(&value)
            .map_err(|e| RequestError::BodyEncodingFailed(e.to_string()))
    }
}

impl fmt::Debug for EncodableBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodableBody")
            .field("encoder", &self.encoder)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum BodyContent {
    Raw(Vec<u8>),
    Encodable(EncodableBody),
}

impl BodyContent {
    pub fn resolve(&self, default: &dyn BodyEncoder) -> Result<Vec<u8>> {
        match self {
            BodyContent::Raw(bytes) => Ok(bytes.clone()),
            BodyContent::Encodable(body) => body.encode(default),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, BodyContent::Raw(_))
    }
}

impl<T> From<Json<T>> for BodyContent
where
    T: Serialize + Send + Sync + 'static,
{
    fn from(json: Json<T>) -> Self {
        BodyContent::Encodable(EncodableBody::new(json.0))
    }
}

impl From<Vec<u8>> for BodyContent {
    fn from(bytes: Vec<u8>) -> Self {
        BodyContent::Raw(bytes)
    }
}

/// Marks a value for encoding, e.g. `with_body(Json(payload))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Json<T>(pub T);

/// Conversion into an optional body. `None` means "attach nothing".
pub trait IntoBody {
    fn into_body(self) -> Option<BodyContent>;
}

impl<T> IntoBody for Json<T>
where
    T: Serialize + Send + Sync + 'static,
{
    fn into_body(self) -> Option<BodyContent> {
        Some(BodyContent::Encodable(EncodableBody::new(self.0)))
    }
}

impl IntoBody for EncodableBody {
    fn into_body(self) -> Option<BodyContent> {
        Some(BodyContent::Encodable(self))
    }
}

impl IntoBody for BodyContent {
    fn into_body(self) -> Option<BodyContent> {
        Some(self)
    }
}

impl IntoBody for Vec<u8> {
    fn into_body(self) -> Option<BodyContent> {
        Some(BodyContent::Raw(self))
    }
}

impl IntoBody for &[u8] {
    fn into_body(self) -> Option<BodyContent> {
        Some(BodyContent::Raw(self.to_vec()))
    }
}

impl<const N: usize> IntoBody for &[u8; N] {
    fn into_body(self) -> Option<BodyContent> {
        Some(BodyContent::Raw(self.to_vec()))
    }
}

impl<B: IntoBody> IntoBody for Option<B> {
    fn into_body(self) -> Option<BodyContent> {
        self.and_then(IntoBody::into_body)
    }
}

/// Collapse a body block to at most one value.
pub(crate) fn single(items: Vec<BodyContent>) -> Result<Option<BodyContent>> {
    let count = items.len();
    if count > 1 {
        return Err(RequestError::MultipleBodyValuesSpecified { count });
    }
    Ok(items.into_iter().next())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Debug)]
    struct Failing;

    impl BodyEncoder for Failing {
        fn encode(&self, _value: &Value) -> std::result::Result<Vec<u8>, EncodeError> {
            Err("encoder refused".into())
        }
    }

    #[derive(Serialize)]
    struct Post {
        title: String,
        draft: bool,
    }

    #[test]
    fn default_encoder_emits_compact_sorted_json() {
        let body = EncodableBody::new(Post { title: "hi".to_string(), draft: true });
        let bytes = body.encode(&JsonEncoder::default()).unwrap();
        assert_eq!(bytes, br#"{"draft":true,"title":"hi"}"#);
    }

    #[test]
    fn attached_encoder_wins_over_default() {
        let body = EncodableBody::new(serde_json::json!({"a": 1}))
            .with_encoder(Arc::new(JsonEncoder::pretty()));
        let bytes = body.encode(&JsonEncoder::compact()).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn encoder_failure_is_reported() {
        let body = EncodableBody::new("x").with_encoder(Arc::new(Failing));
        let err = body.encode(&JsonEncoder::default()).unwrap_err();
        assert!(matches!(err, RequestError::BodyEncodingFailed(msg) if msg == "encoder refused"));
    }

    #[test]
    fn unrepresentable_value_fails_at_encode_time() {
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple keys are not JSON");
        let content = Json(map).into_body().unwrap();
        let err = content.resolve(&JsonEncoder::default()).unwrap_err();
        assert!(matches!(err, RequestError::BodyEncodingFailed(_)));
    }

    #[test]
    fn raw_bytes_are_verbatim() {
        let content = b"\x00\x01raw".into_body().unwrap();
        assert!(content.is_raw());
        assert_eq!(content.resolve(&JsonEncoder::default()).unwrap(), b"\x00\x01raw");
    }

    #[test]
    fn none_attaches_nothing() {
        assert!(None::<Json<u8>>.into_body().is_none());
        assert!(Some(Json(1)).into_body().is_some());
    }

    #[test]
    fn body_block_allows_at_most_one_value() {
        assert!(single(Vec::new()).unwrap().is_none());
        assert!(single(vec![BodyContent::Raw(Vec::new())]).unwrap().is_some());
        let err = single(vec![BodyContent::Raw(Vec::new()), BodyContent::Raw(Vec::new())]).unwrap_err();
        assert!(matches!(err, RequestError::MultipleBodyValuesSpecified { count: 2 }));
    }
}
