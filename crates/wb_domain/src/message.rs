//! A decoded email message, as handed to the reading-list formatter.
//!
//! Header names are stored lower-cased so every lookup is case-insensitive.
//! Values are already-decoded text; transport decoding happens upstream.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    headers: BTreeMap<String, String>,
    body_plain: Option<String>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any earlier value with the same name.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Set the decoded `text/plain` body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body_plain = Some(body.into());
        self
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_lowercase(), value.into());
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn body_plain(&self) -> Option<&str> {
        self.body_plain.as_deref()
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
