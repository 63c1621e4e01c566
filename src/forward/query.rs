//! Inbound query parameters and their re-serialization onto the upstream URL.

use url::{form_urlencoded, Url};

/// Ordered query pairs. Duplicate keys are kept, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Decode a raw query string (without the leading `?`).
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(raw) => form_urlencoded::parse(raw.as_bytes()).into_owned().collect(),
            None => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `base` with these pairs appended. No pairs leaves `base` untouched,
    /// without even a trailing `?`.
    pub fn append_to(&self, base: &Url) -> Url {
        let mut url = base.clone();
        if !self.is_empty() {
            url.query_pairs_mut().extend_pairs(self.iter());
        }
        url
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
