//! Assembling a signature into its two presentation forms (spec.md §5):
//! an `Authorization` header, or a presigned URL's query parameters.

use chrono::{DateTime, Utc};
use url::Url;

use crate::canonical::{build_canonical_request, rfc3986_encode};
use crate::hash::HashAlgorithm;
use crate::keys::derive_signing_key;
use crate::party::{credentials_string, Party};
use crate::signer::{format_long_date, format_short_date, signature, string_to_sign};

/// Sentinel payload hash for requests that don't want to hash a body
/// up front (streaming uploads, presigned URLs with no body).
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Everything needed to sign one request, gathered in one place so
/// [`authorization_header`] and [`presigned_url`] build identical
/// canonical requests from the same inputs.
pub struct SigningInput<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    pub raw_header_block: &'a str,
    pub signed_headers: &'a [String],
    pub payload_hash: &'a str,
    pub access_key_id: &'a str,
    pub secret: &'a str,
    pub party: &'a Party,
    pub hash_algo: HashAlgorithm,
    pub vendor_prefix: &'a str,
    pub when: DateTime<Utc>,
}

/// Compute the final signature for `input`, given a canonical request
/// already built from it (so presigned-URL callers can build their own
/// canonical request with the `X-<vendor>-*` params stripped first).
fn compute_signature(input: &SigningInput, canonical_request: &str) -> String {
    let long_date = format_long_date(input.when);
    let short_date = format_short_date(input.when);
    let full_scope = format!("{short_date}/{}", input.party.scope());

    let sts = string_to_sign(
        input.vendor_prefix,
        input.hash_algo,
        &long_date,
        &short_date,
        &input.party.scope(),
        canonical_request,
    );
    let signing_key = derive_signing_key(input.secret, &full_scope, input.hash_algo, input.vendor_prefix);
    signature(&signing_key, &sts, input.hash_algo)
}

/// Build the `Authorization` header value for `input`.
pub fn authorization_header(input: &SigningInput) -> String {
    let canonical_request = build_canonical_request(
        input.method,
        input.path,
        input.query,
        input.raw_header_block,
        input.signed_headers,
        input.payload_hash,
    );
    let sig = compute_signature(input, &canonical_request);

    let short_date = format_short_date(input.when);
    let credentials = credentials_string(input.access_key_id, &short_date, input.party);
    let signed_headers_line = {
        let mut names: Vec<String> = input
            .signed_headers
            .iter()
            .map(|s| s.to_ascii_lowercase())
            .collect();
        names.sort();
        names.dedup();
        names.join(";")
    };

    format!(
        "{}-HMAC-{} Credential={credentials}, SignedHeaders={signed_headers_line}, Signature={sig}",
        input.vendor_prefix,
        input.hash_algo.token()
    )
}

/// Build the six `X-<vendor>-*` query parameters for a presigned URL, with
/// values already percent-encoded per spec.md §4.4 ("Values are
/// URL-encoded when appended; keys are literal"). Per spec.md §4.6 step 7,
/// these parameters themselves are never part of the canonical query
/// string used to compute the signature — the caller's `query` must
/// already exclude them.
pub fn presigned_url(input: &SigningInput, expires_seconds: u64) -> Vec<(String, String)> {
    let canonical_request = build_canonical_request(
        input.method,
        input.path,
        input.query,
        input.raw_header_block,
        input.signed_headers,
        input.payload_hash,
    );
    let sig = compute_signature(input, &canonical_request);

    let short_date = format_short_date(input.when);
    let long_date = format_long_date(input.when);
    let credentials = credentials_string(input.access_key_id, &short_date, input.party);
    let signed_headers_line = {
        let mut names: Vec<String> = input
            .signed_headers
            .iter()
            .map(|s| s.to_ascii_lowercase())
            .collect();
        names.sort();
        names.dedup();
        names.join(";")
    };

    vec![
        (
            format!("X-{}-Algorithm", input.vendor_prefix),
            rfc3986_encode(&format!("{}-HMAC-{}", input.vendor_prefix, input.hash_algo.token())),
        ),
        (
            format!("X-{}-Credentials", input.vendor_prefix),
            rfc3986_encode(&credentials),
        ),
        (format!("X-{}-Date", input.vendor_prefix), rfc3986_encode(&long_date)),
        (
            format!("X-{}-Expires", input.vendor_prefix),
            rfc3986_encode(&expires_seconds.to_string()),
        ),
        (
            format!("X-{}-SignedHeaders", input.vendor_prefix),
            rfc3986_encode(&signed_headers_line),
        ),
        (format!("X-{}-Signature", input.vendor_prefix), rfc3986_encode(&sig)),
    ]
}

/// Append already-encoded query parameters (as returned by
/// [`presigned_url`]) to `base_url` and return the resulting URL (spec.md
/// §4.4/§6's `signUrl(...) → signedUrl`). Parameter values are appended
/// as given — [`presigned_url`] has already percent-encoded them — so
/// this only ever joins the literal query string, it never re-encodes.
pub fn build_signed_url(base_url: &Url, params: &[(String, String)]) -> String {
    let mut url = base_url.clone();
    let mut query = url.query().unwrap_or("").to_string();
    for (key, value) in params {
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(key);
        query.push('=');
        query.push_str(value);
    }
    url.set_query(Some(&query));
    url.into()
}
