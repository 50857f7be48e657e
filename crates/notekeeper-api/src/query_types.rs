//! Request parameter types with user-friendly error messages.
//!
//! Tag lists arrive in two shapes: repeated or comma-separated query values
//! (`?tags=a&tags=b,c`) and JSON array bodies where an empty body means "no
//! tags". Both parse into [`TagList`]; normalization happens in the services.

use std::ops::Deref;

use serde::Deserialize;

/// Raw (not yet normalized) tag arguments from a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagList(pub Vec<String>);

impl TagList {
    /// Collect every value of `key` from a raw query string.
    ///
    /// Values may repeat and may each hold a comma-separated list. Entries are
    /// kept verbatim so they compare equal to stored tags; empty entries are
    /// dropped and a missing key yields an empty list.
    pub fn from_query(query: Option<&str>, key: &str) -> Result<Self, String> {
        let mut tags = Vec::new();
        let Some(query) = query else {
            return Ok(Self(tags));
        };

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            if decode(name)? != key {
                continue;
            }
            tags.extend(
                decode(value)?
                    .split(',')
                    .filter(|tag| !tag.is_empty())
                    .map(String::from),
            );
        }
        Ok(Self(tags))
    }

    /// Parse a JSON array of strings. An empty or whitespace-only body is an empty list.
    pub fn from_json_body(body: &[u8]) -> Result<Self, String> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice::<Vec<String>>(body)
            .map(Self)
            .map_err(|e| format!("Expected a JSON array of tag strings: {}", e))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Deref for TagList {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn decode(component: &str) -> Result<String, String> {
    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .map_err(|_| format!("Query component '{}' is not valid UTF-8", component))
}

/// `?tagpart=` parameter of the tag substring search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagPartQuery {
    pub tagpart: Option<String>,
}
