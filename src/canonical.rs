//! Canonical request construction (spec.md §4.1): path normalization,
//! query-string and header canonicalization, and the final newline-joined
//! canonical string.

use std::collections::{BTreeMap, BTreeSet};

/// Resolve `..` and `.` segments, collapse repeated `/`, and preserve a
/// leading `/`. Never percent-decodes or percent-encodes a segment.
pub fn normalize_path(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                stack.pop();
            }
            s => stack.push(s),
        }
    }
    let joined = stack.join("/");
    if joined.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        format!("/{joined}")
    } else {
        joined
    }
}

/// RFC 3986 unreserved-character percent-encoding, uppercase hex.
pub fn rfc3986_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.as_bytes() {
        let c = *byte as char;
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') {
            out.push(c);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Split the query string on `&`, split each pair on the first `=`,
/// apply the documented "key contains a space" compatibility quirk,
/// substitute `+` for space, percent-encode, and sort the encoded pairs
/// byte-wise. Empty input yields empty output. See spec.md §4.1.
pub fn canonical_query_string(query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }
    let mut pairs: Vec<String> = Vec::new();
    for part in query.split('&') {
        let (raw_key, raw_value) = match part.split_once('=') {
            Some((k, v)) => (k, v),
            None => (part, ""),
        };
        // Compatibility quirk: a key containing a space is truncated at
        // the space and its value is discarded.
        let (key, value) = match raw_key.find(' ') {
            Some(idx) => (&raw_key[..idx], ""),
            None => (raw_key, raw_value),
        };
        let key = key.replace('+', " ");
        let value = value.replace('+', " ");
        pairs.push(format!("{}={}", rfc3986_encode(&key), rfc3986_encode(&value)));
    }
    pairs.sort();
    pairs.join("&")
}

/// Lowercase names, trim values, keep only signed names, group
/// multi-valued headers, sort each group's values, and sort groups by
/// name. Returns `(name, sorted values)` pairs in name order.
pub fn canonicalize_headers(
    raw_header_block: &str,
    signed_headers: &[String],
) -> Vec<(String, Vec<String>)> {
    let signed: BTreeSet<String> = signed_headers
        .iter()
        .map(|s| s.to_ascii_lowercase())
        .collect();
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for line in raw_header_block.split('\n') {
        if line.is_empty() {
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        if !signed.contains(&name) {
            continue;
        }
        let value = value
            .trim_matches(|c: char| c.is_ascii_whitespace())
            .to_string();
        groups.entry(name).or_default().push(value);
    }
    for values in groups.values_mut() {
        values.sort();
    }
    groups.into_iter().collect()
}

/// Build the full canonical request string: method, normalized path,
/// canonical query, one `name:values` line per signed header, a blank
/// line, the signed-headers list, and the payload hash — newline
/// joined, in that order. `payload_hash` is the already-computed hex
/// digest of the body (or the literal `UNSIGNED-PAYLOAD` sentinel for
/// presigned URLs) — this function never hashes it again.
pub fn build_canonical_request(
    method: &str,
    path: &str,
    query: &str,
    raw_header_block: &str,
    signed_headers: &[String],
    payload_hash: &str,
) -> String {
    let canonical_path = normalize_path(path);
    let canonical_query = canonical_query_string(query);
    let groups = canonicalize_headers(raw_header_block, signed_headers);

    let mut header_lines = String::new();
    for (name, values) in &groups {
        header_lines.push_str(name);
        header_lines.push(':');
        header_lines.push_str(&values.join(","));
        header_lines.push('\n');
    }

    let mut names: Vec<String> = signed_headers
        .iter()
        .map(|s| s.to_ascii_lowercase())
        .collect();
    names.sort();
    names.dedup();
    let signed_headers_line = names.join(";");

    format!(
        "{}\n{canonical_path}\n{canonical_query}\n{header_lines}\n{signed_headers_line}\n{payload_hash}",
        method.to_ascii_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_dot_dot_segments() {
        assert_eq!(normalize_path("/a/b/../c"), "/a/c");
        assert_eq!(normalize_path("/a/../../c"), "/c");
    }

    #[test]
    fn removes_dot_segments_and_collapses_slashes() {
        assert_eq!(normalize_path("/a/./b//c"), "/a/b/c");
    }

    #[test]
    fn empty_path_becomes_root() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn normalize_path_is_idempotent() {
        for p in ["/a/b/../c", "/a/./b//c", "", "/", "/x/y/z", "/../../x"] {
            let once = normalize_path(p);
            let twice = normalize_path(&once);
            assert_eq!(once, twice, "not idempotent for {p:?}");
        }
    }

    #[test]
    fn empty_query_yields_empty_string() {
        assert_eq!(canonical_query_string(""), "");
    }

    #[test]
    fn query_sorted_and_encoded() {
        assert_eq!(canonical_query_string("foo=bar&baz=barbaz"), "baz=barbaz&foo=bar");
    }

    #[test]
    fn query_is_order_independent_on_input() {
        let a = canonical_query_string("z=1&a=2&m=3");
        let b = canonical_query_string("m=3&z=1&a=2");
        assert_eq!(a, b);
    }

    #[test]
    fn query_key_with_space_quirk() {
        assert_eq!(canonical_query_string("a b=c"), "a=");
    }

    #[test]
    fn query_plus_becomes_space_then_encoded() {
        assert_eq!(canonical_query_string("a=b+c"), "a=b%20c");
    }

    #[test]
    fn header_canonicalization_is_case_and_whitespace_insensitive() {
        let raw = "Host:  example.com  \nX-Ems-Date:20110909T233600Z";
        let signed = vec!["host".to_string(), "x-ems-date".to_string()];
        let groups = canonicalize_headers(raw, &signed);
        assert_eq!(
            groups,
            vec![
                ("host".to_string(), vec!["example.com".to_string()]),
                ("x-ems-date".to_string(), vec!["20110909T233600Z".to_string()]),
            ]
        );
    }

    #[test]
    fn header_canonicalization_drops_unsigned_headers() {
        let raw = "host:example.com\nx-extra:ignored";
        let signed = vec!["host".to_string()];
        let groups = canonicalize_headers(raw, &signed);
        assert_eq!(groups, vec![("host".to_string(), vec!["example.com".to_string()])]);
    }

    #[test]
    fn header_canonicalization_sorts_multivalued_header() {
        let raw = "x-amz-meta-tag:zebra\nx-amz-meta-tag:apple";
        let signed = vec!["x-amz-meta-tag".to_string()];
        let groups = canonicalize_headers(raw, &signed);
        assert_eq!(
            groups,
            vec![(
                "x-amz-meta-tag".to_string(),
                vec!["apple".to_string(), "zebra".to_string()]
            )]
        );
    }
}
