//! Transport-agnostic request description. The library never touches a
//! socket: callers build a [`HeaderBlock`] from whatever HTTP stack they
//! front, and servers additionally implement [`RequestView`].

use std::collections::BTreeSet;

/// An ordered multimap from lowercase header name to the list of values
/// seen for that name, preserving insertion order within a name.
#[derive(Debug, Clone, Default)]
pub struct HeaderBlock {
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header value. The name is lowercased; a second insert
    /// under the same name appends rather than replaces (multi-valued
    /// headers — see spec.md §3).
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        if let Some((_, values)) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            values.push(value.into());
        } else {
            self.entries.push((name, vec![value.into()]));
        }
    }

    /// All values recorded for `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&[String]> {
        let name = name.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// The first value recorded for `name`, if any.
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.entries.iter().any(|(n, _)| *n == name)
    }

    /// Render as `name:value` lines, one per value — the input format
    /// [`crate::canonical::canonicalize_headers`] expects.
    pub fn raw_block(&self) -> String {
        let mut lines = Vec::new();
        for (name, values) in &self.entries {
            for value in values {
                lines.push(format!("{name}:{value}"));
            }
        }
        lines.join("\n")
    }
}

/// A sorted, deduplicated, lowercase set of header names to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders(Vec<String>);

impl SignedHeaders {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = names
            .into_iter()
            .map(|n| n.into().to_ascii_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        Self(set.into_iter().collect())
    }

    pub fn from_joined(joined: &str) -> Self {
        Self::new(joined.split(';'))
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.0.iter().any(|n| *n == name)
    }

    pub fn joined(&self) -> String {
        self.0.join(";")
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

/// What the verifier needs from an incoming request. Implemented by a
/// thin adapter over whichever HTTP stack fronts the service. The
/// request body is deliberately not part of this trait — it is passed
/// separately to [`crate::verify::Verifier::authenticate`] so adapters
/// that stream bodies aren't forced to buffer them just to satisfy this
/// interface.
pub trait RequestView {
    /// Uppercase HTTP method.
    fn method(&self) -> &str;
    /// Request path, unnormalized.
    fn path(&self) -> &str;
    /// Raw query string, without a leading `?`.
    fn query(&self) -> &str;
    /// The server name the transport actually accepted the connection
    /// on — not the `Host` header. Used for the host-spoof check in
    /// spec.md §4.6 step 5.
    fn server_name(&self) -> &str;
    /// The transport-level port, if known.
    fn server_port(&self) -> Option<u16>;
    /// `"http"` or `"https"`.
    fn scheme(&self) -> &str;
    /// All headers as sent.
    fn headers(&self) -> &HeaderBlock;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_block_groups_multivalued_headers() {
        let mut headers = HeaderBlock::new();
        headers.insert("X-Forwarded-For", "a");
        headers.insert("x-forwarded-for", "b");
        assert_eq!(headers.get("X-FORWARDED-FOR"), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(headers.raw_block(), "x-forwarded-for:a\nx-forwarded-for:b");
    }

    #[test]
    fn signed_headers_sorts_and_dedupes() {
        let signed = SignedHeaders::from_joined("Host;content-type;host");
        assert_eq!(signed.joined(), "content-type;host");
        assert!(signed.contains("HOST"));
    }
}
