//! Pulling signing elements out of an `Authorization` header or a
//! presigned query string (spec.md §4.5 / §5).

use crate::errors::AuthError;
use crate::hash::HashAlgorithm;
use crate::party::ParsedCredentials;
use crate::request::HeaderBlock;

/// Which of the two presentation modes a request arrived in (the
/// REDESIGN FLAG in spec.md replacing a boolean `is_presigned` with a
/// tagged enum so header-only and query-only fields can't both be unset
/// or both be set at once).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOrigin {
    Header,
    Query,
}

/// The pieces pulled out of either an `Authorization` header or a
/// presigned query string, normalized to one shape regardless of origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthElements {
    pub origin: AuthOrigin,
    pub hash_algo_token: String,
    pub credentials: ParsedCredentials,
    pub signed_headers: Vec<String>,
    pub signature: String,
    /// Only set for [`AuthOrigin::Query`] — seconds until expiry.
    pub expires_seconds: Option<u64>,
}

fn is_algo_charset(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

fn is_credentials_charset(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.')
}

fn is_signed_headers_charset(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, ';' | '-')
}

fn is_hex_charset(c: char) -> bool {
    c.is_ascii_hexdigit() && !c.is_ascii_uppercase()
}

/// Parse an `Authorization: <vendor>-HMAC-<ALGO> Credential=..., SignedHeaders=..., Signature=...`
/// value. Grammar violations produce [`AuthError::MalformedAuthorizationHeader`];
/// a credentials string with the wrong number of `/`-separated parts
/// produces the more specific [`AuthError::InvalidCredentialScope`].
pub fn parse_header(value: &str, vendor_prefix: &str) -> Result<AuthElements, AuthError> {
    let prefix = format!("{vendor_prefix}-HMAC-");
    let rest = value
        .strip_prefix(&prefix)
        .ok_or(AuthError::MalformedAuthorizationHeader)?;
    let (algo_token, fields) = rest
        .split_once(' ')
        .ok_or(AuthError::MalformedAuthorizationHeader)?;
    if algo_token.is_empty() || !algo_token.chars().all(is_algo_charset) {
        return Err(AuthError::MalformedAuthorizationHeader);
    }

    let mut credential = None;
    let mut signed_headers = None;
    let mut signature = None;

    for part in fields.split(',') {
        let part = part.trim();
        let (key, val) = part
            .split_once('=')
            .ok_or(AuthError::MalformedAuthorizationHeader)?;
        match key.trim() {
            "Credential" => credential = Some(val),
            "SignedHeaders" => signed_headers = Some(val),
            "Signature" => signature = Some(val),
            _ => return Err(AuthError::MalformedAuthorizationHeader),
        }
    }

    let credential = credential.ok_or(AuthError::MalformedAuthorizationHeader)?;
    let signed_headers_raw = signed_headers.ok_or(AuthError::MalformedAuthorizationHeader)?;
    let signature = signature.ok_or(AuthError::MalformedAuthorizationHeader)?;

    if !credential.chars().all(is_credentials_charset) {
        return Err(AuthError::MalformedAuthorizationHeader);
    }
    if !signed_headers_raw.chars().all(is_signed_headers_charset) {
        return Err(AuthError::MalformedAuthorizationHeader);
    }
    if signature.is_empty() || !signature.chars().all(is_hex_charset) {
        return Err(AuthError::MalformedAuthorizationHeader);
    }

    let credentials = ParsedCredentials::parse(credential).ok_or(AuthError::InvalidCredentialScope)?;

    Ok(AuthElements {
        origin: AuthOrigin::Header,
        hash_algo_token: algo_token.to_string(),
        credentials,
        signed_headers: signed_headers_raw.split(';').map(str::to_string).collect(),
        signature: signature.to_string(),
        expires_seconds: None,
    })
}

/// Parse the query-string form of a presigned URL:
/// `X-<vendor>-Algorithm`, `X-<vendor>-Credentials`, `X-<vendor>-Date`,
/// `X-<vendor>-Expires`, `X-<vendor>-SignedHeaders`, `X-<vendor>-Signature`.
/// A missing parameter produces [`AuthError::MissingQueryParameter`]; a
/// credentials string with the wrong part count produces
/// [`AuthError::InvalidCredentialScope`].
pub fn parse_query(query_map: &[(String, String)], vendor_prefix: &str) -> Result<AuthElements, AuthError> {
    let get = |suffix: &str| -> Option<&str> {
        let name = format!("X-{vendor_prefix}-{suffix}");
        query_map
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
            .map(|(_, v)| v.as_str())
    };
    let missing = |suffix: &str| AuthError::MissingQueryParameter(format!("X-{vendor_prefix}-{suffix}"));

    let algorithm = get("Algorithm").ok_or_else(|| missing("Algorithm"))?;
    let credential = get("Credentials").ok_or_else(|| missing("Credentials"))?;
    get("Date").ok_or_else(|| missing("Date"))?;
    let expires = get("Expires").ok_or_else(|| missing("Expires"))?;
    let signed_headers = get("SignedHeaders").ok_or_else(|| missing("SignedHeaders"))?;
    let signature = get("Signature").ok_or_else(|| missing("Signature"))?;

    let algo_prefix = format!("{vendor_prefix}-HMAC-");
    let algo_token = algorithm
        .strip_prefix(&algo_prefix)
        .filter(|t| !t.is_empty() && t.chars().all(is_algo_charset))
        .ok_or_else(|| missing("Algorithm"))?;

    let credentials = ParsedCredentials::parse(credential).ok_or(AuthError::InvalidCredentialScope)?;

    let expires_seconds: u64 = expires.parse().map_err(|_| missing("Expires"))?;

    Ok(AuthElements {
        origin: AuthOrigin::Query,
        hash_algo_token: algo_token.to_string(),
        credentials,
        signed_headers: signed_headers.split(';').map(str::to_string).collect(),
        signature: signature.to_string(),
        expires_seconds: Some(expires_seconds),
    })
}

/// Resolve a [`HashAlgorithm`] out of the raw algorithm token captured
/// while parsing.
pub fn resolve_hash_algorithm(elements: &AuthElements) -> Option<HashAlgorithm> {
    HashAlgorithm::parse(&elements.hash_algo_token)
}

/// Split a raw query string into `(name, value)` pairs without any
/// canonicalization — used to look up the `X-<vendor>-*` parameters
/// themselves, as distinct from [`crate::canonical::canonical_query_string`]
/// which builds the signed artifact.
pub fn raw_query_map(query: &str) -> Vec<(String, String)> {
    if query.is_empty() {
        return Vec::new();
    }
    query
        .split('&')
        .map(|part| match part.split_once('=') {
            Some((k, v)) => (percent_decode(k), percent_decode(v)),
            None => (percent_decode(part), String::new()),
        })
        .collect()
}

/// Minimal percent-decoder for query parameter names/values. `+` is left
/// untouched here — query-parameter names don't carry the space-as-plus
/// convention the signed query string's canonicalization applies.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(byte) = u8::from_str_radix(&input[i + 1..i + 3], 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Read the `Host` header out of a [`HeaderBlock`], for the host-spoof
/// check in spec.md §4.6 step 5.
pub fn host_from_headers(headers: &HeaderBlock) -> Option<&str> {
    headers.get_first("host")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_header() {
        let value = "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20110909/us-east-1/iam/aws4_request, SignedHeaders=host;x-amz-date, Signature=deadbeef";
        let elements = parse_header(value, "AWS4").unwrap();
        assert_eq!(elements.origin, AuthOrigin::Header);
        assert_eq!(elements.hash_algo_token, "SHA256");
        assert_eq!(elements.credentials.access_key_id, "AKIDEXAMPLE");
        assert_eq!(elements.signed_headers, vec!["host", "x-amz-date"]);
        assert_eq!(elements.signature, "deadbeef");
        assert_eq!(elements.expires_seconds, None);
    }

    #[test]
    fn rejects_wrong_vendor_prefix() {
        let value = "EMS-HMAC-SHA256 Credential=A/20110909/us/svc/req, SignedHeaders=host, Signature=ab";
        assert_eq!(
            parse_header(value, "AWS4").unwrap_err(),
            AuthError::MalformedAuthorizationHeader
        );
    }

    #[test]
    fn rejects_uppercase_signature_hex() {
        let value = "AWS4-HMAC-SHA256 Credential=A/20110909/us/svc/req, SignedHeaders=host, Signature=DEADBEEF";
        assert_eq!(
            parse_header(value, "AWS4").unwrap_err(),
            AuthError::MalformedAuthorizationHeader
        );
    }

    #[test]
    fn rejects_credentials_with_wrong_part_count() {
        let value = "AWS4-HMAC-SHA256 Credential=A/20110909/us/svc, SignedHeaders=host, Signature=ab";
        assert_eq!(
            parse_header(value, "AWS4").unwrap_err(),
            AuthError::InvalidCredentialScope
        );
    }

    #[test]
    fn parses_query_parameters() {
        let map = vec![
            ("X-Ems-Algorithm".to_string(), "EMS-HMAC-SHA256".to_string()),
            (
                "X-Ems-Credentials".to_string(),
                "AKID/20110909/us-east-1/iam/ems_request".to_string(),
            ),
            ("X-Ems-Date".to_string(), "20110909T233600Z".to_string()),
            ("X-Ems-Expires".to_string(), "900".to_string()),
            ("X-Ems-SignedHeaders".to_string(), "host".to_string()),
            ("X-Ems-Signature".to_string(), "ab12".to_string()),
        ];
        let elements = parse_query(&map, "Ems").unwrap();
        assert_eq!(elements.origin, AuthOrigin::Query);
        assert_eq!(elements.expires_seconds, Some(900));
    }

    #[test]
    fn missing_query_parameter_names_the_parameter() {
        let map = vec![("X-Ems-Algorithm".to_string(), "EMS-HMAC-SHA256".to_string())];
        let err = parse_query(&map, "Ems").unwrap_err();
        assert_eq!(
            err,
            AuthError::MissingQueryParameter("X-Ems-Credentials".to_string())
        );
    }

    #[test]
    fn percent_decode_handles_escapes() {
        assert_eq!(percent_decode("a%20b"), "a b");
        assert_eq!(percent_decode("100%25"), "100%");
    }
}
