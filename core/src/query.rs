//! Query parameters.
//!
//! Items are kept in declaration order and never deduplicated; a name may
//! legally repeat. A `None` value is a flag parameter rendered without `=`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except RFC 3986 unreserved characters.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryItem {
    pub name: String,
    pub value: Option<String>,
}

impl QueryItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for QueryItem {
    fn from((name, value): (N, V)) -> Self {
        QueryItem::new(name, value)
    }
}

/// Percent-encode items into a query string, `None` when there are no items.
pub(crate) fn encode(items: &[QueryItem]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let pairs: Vec<String> = items
        .iter()
        .map(|item| {
            let name = utf8_percent_encode(&item.name, QUERY_COMPONENT);
            match &item.value {
                Some(value) => format!("{name}={}", utf8_percent_encode(value, QUERY_COMPONENT)),
                None => name.to_string(),
            }
        })
        .collect();
    Some(pairs.join("&"))
}
