//! HTTP header types

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A single HTTP header with name and value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The header name (e.g., "Content-Type")
    pub name: String,
    /// The header value (e.g., "application/json")
    pub value: String,
}

impl Header {
    /// Creates a new header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Checks that the name is a valid RFC 7230 token.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidHeaderName` for empty names or names
    /// containing separators, whitespace or control characters.
    pub fn validate(&self) -> DomainResult<()> {
        let valid = !self.name.is_empty()
            && self.name.bytes().all(|b| {
                b.is_ascii_alphanumeric()
                    || matches!(
                        b,
                        b'!' | b'#'
                            | b'$'
                            | b'%'
                            | b'&'
                            | b'\''
                            | b'*'
                            | b'+'
                            | b'-'
                            | b'.'
                            | b'^'
                            | b'_'
                            | b'`'
                            | b'|'
                            | b'~'
                    )
            });
        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidHeaderName(self.name.clone()))
        }
    }
}

/// An ordered header collection where names are compared case-insensitively.
///
/// Setting a header that already exists replaces its value in place, so
/// layering defaults, credentials and per-request overrides keeps one entry
/// per name with the last value winning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    items: Vec<Header>,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Sets a header, replacing any existing header with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let header = Header::new(name, value);
        match self
            .items
            .iter_mut()
            .find(|h| h.name.eq_ignore_ascii_case(&header.name))
        {
            Some(existing) => existing.value = header.value,
            None => self.items.push(header),
        }
    }

    /// Returns the value of a header, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Returns true if a header with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes a header by name, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self
            .items
            .iter()
            .position(|h| h.name.eq_ignore_ascii_case(name))?;
        Some(self.items.remove(index).value)
    }

    /// Applies every header of `other` on top of this collection.
    pub fn merge(&mut self, other: &Self) {
        for header in &other.items {
            self.set(header.name.clone(), header.value.clone());
        }
    }

    /// Returns an iterator over the headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.items.iter()
    }

    /// Returns the number of headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len is not const in stable
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty is not const in stable
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Header> for Headers {
    fn from_iter<T: IntoIterator<Item = Header>>(iter: T) -> Self {
        let mut headers = Self::new();
        for header in iter {
            headers.set(header.name, header.value);
        }
        headers
    }
}
