//! Ordered list builder for declarative header, query and body blocks.
//!
//! Every step appends zero or more items; the final list is the declaration
//! order of the steps, with nested blocks flattened depth-first.
//!
//! ```
//! use reqwire_core::{Header, ListBuilder, QueryItem};
//!
//! let admin = true;
//! let tags = ["a", "b"];
//! let headers = ListBuilder::<Header>::new()
//!     .add(Header::bearer("token"))
//!     .add_if(admin, || Header::custom("X-Admin", "1"))
//!     .build();
//! let query = ListBuilder::<QueryItem>::new()
//!     .add_each(tags.iter().map(|t| ("tag", *t)))
//!     .effect(|| println!("building query"))
//!     .build();
//! assert_eq!(headers.len(), 2);
//! assert_eq!(query.len(), 2);
//! ```

#[derive(Debug, Clone, PartialEq)]
pub struct ListBuilder<T> {
    items: Vec<T>,
}

impl<T> Default for ListBuilder<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> ListBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, item: impl Into<T>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Append the item only when `condition` holds. The item is built lazily.
    pub fn add_if<U: Into<T>>(self, condition: bool, item: impl FnOnce() -> U) -> Self {
        if condition {
            self.add(item())
        } else {
            self
        }
    }

    pub fn add_if_else<U: Into<T>>(
        self,
        condition: bool,
        then: impl FnOnce() -> U,
        otherwise: impl FnOnce() -> U,
    ) -> Self {
        if condition {
            self.add(then())
        } else {
            self.add(otherwise())
        }
    }

    pub fn add_option<U: Into<T>>(self, item: Option<U>) -> Self {
        match item {
            Some(item) => self.add(item),
            None => self,
        }
    }

    pub fn add_each<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<T>,
    {
        self.items.extend(items.into_iter().map(Into::into));
        self
    }

    /// Run a nested block and splice its items in place.
    pub fn add_block(mut self, block: impl FnOnce(ListBuilder<T>) -> ListBuilder<T>) -> Self {
        self.items.extend(block(ListBuilder::new()).items);
        self
    }

    /// A step that only runs for its side effect and contributes nothing.
    pub fn effect(self, f: impl FnOnce()) -> Self {
        f();
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn build(self) -> Vec<T> {
        self.items
    }
}

impl<T> IntoIterator for ListBuilder<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T> FromIterator<T> for ListBuilder<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
