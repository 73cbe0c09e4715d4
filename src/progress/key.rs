//! Request keys correlating registered listeners with in-flight transfers.

use reqwest::Url;
use std::borrow::Borrow;
use std::fmt;

/// Identifies one download in the [`ProgressRegistry`](super::ProgressRegistry).
///
/// Keys are normalized URLs: anything that parses as a URL is re-serialized
/// by the `url` parser, so `"HTTPS://Example.com/a b"` and
/// `"https://example.com/a%20b"` name the same transfer. Strings that do not
/// parse are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey(String);

impl RequestKey {
    /// Build a key from a URL string, normalizing it when possible.
    pub fn new(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) => Self(url.into()),
            Err(_) => Self(raw.to_owned()),
        }
    }

    /// The normalized key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RequestKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&Url> for RequestKey {
    fn from(url: &Url) -> Self {
        Self(url.as_str().to_owned())
    }
}

impl From<Url> for RequestKey {
    fn from(url: Url) -> Self {
        Self(url.into())
    }
}

impl From<&str> for RequestKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for RequestKey {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&RequestKey> for RequestKey {
    fn from(key: &RequestKey) -> Self {
        key.clone()
    }
}
