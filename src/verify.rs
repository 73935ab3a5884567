//! The verification state machine (spec.md §4.6): seven ordered checks,
//! each able to fail with its own typed error, ending in either
//! `accepted(accessKeyId)` or `rejected(errorKind, message)`.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::canonical::build_canonical_request;
use crate::errors::AuthError;
use crate::hash::HashAlgorithm;
use crate::keys::derive_signing_key;
use crate::parse::{self, AuthElements, AuthOrigin};
use crate::party::Party;
use crate::request::{HeaderBlock, RequestView};
use crate::signer::string_to_sign;
use crate::time::Clock;

/// Maximum age of a presigned URL's `X-<vendor>-Expires`, in seconds
/// (spec.md §4.6 step 6).
pub const HEADER_MODE_EXPIRY_SECONDS: i64 = 900;

/// Allowed forward clock skew for header-mode requests (spec.md §4.6
/// step 6): the request's date may not be more than this far in the
/// future relative to the verifier's clock.
pub const FORWARD_DRIFT_TOLERANCE_SECONDS: i64 = 900;

/// Looks up the secret behind an access key id. Implementations return
/// `None` for an unknown key so the verifier can report
/// [`AuthError::InvalidAccessKeyId`] without leaking which keys exist.
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, access_key_id: &str) -> Option<String>;
}

impl<F> SecretResolver for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn resolve(&self, access_key_id: &str) -> Option<String> {
        self(access_key_id)
    }
}

/// The outcome of [`Verifier::authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted { access_key_id: String },
    Rejected(AuthError),
}

/// Verifies incoming requests against one [`Party`] scope.
pub struct Verifier<'a> {
    pub party: &'a Party,
    pub vendor_prefix: &'a str,
    pub auth_header_name: &'a str,
    pub date_header_name: &'a str,
    pub allowed_algorithms: &'a [HashAlgorithm],
    pub key_lookup: &'a dyn SecretResolver,
    pub clock: &'a dyn Clock,
}

impl<'a> Verifier<'a> {
    /// `body` is the raw request body, hashed in header mode to
    /// reconstruct the canonical request the signer built (spec.md §4.6
    /// step 7). Ignored in query mode, where the signer always used the
    /// `UNSIGNED-PAYLOAD` sentinel.
    pub fn authenticate<R: RequestView>(&self, request: &R, body: &[u8]) -> Verdict {
        match self.authenticate_inner(request, body) {
            Ok(access_key_id) => {
                debug!(%access_key_id, "request accepted");
                Verdict::Accepted { access_key_id }
            }
            Err(err) => {
                warn!(error = %err, "request rejected");
                Verdict::Rejected(err)
            }
        }
    }

    fn authenticate_inner<R: RequestView>(&self, request: &R, body: &[u8]) -> Result<String, AuthError> {
        let headers = request.headers();

        // Step 1: locate the signing elements, in either presentation.
        let elements = self.extract_auth_elements(request)?;

        // Step 2: mandatory-signed-headers check. `host` must always be
        // signed; in header mode the date header must be too.
        if !elements
            .signed_headers
            .iter()
            .any(|h| h.eq_ignore_ascii_case("host"))
        {
            return Err(AuthError::HostHeaderNotSigned);
        }
        if matches!(elements.origin, AuthOrigin::Header)
            && !elements
                .signed_headers
                .iter()
                .any(|h| h.eq_ignore_ascii_case(&self.date_header_name.to_ascii_lowercase()))
        {
            return Err(AuthError::DateHeaderNotSigned);
        }

        // Step 3: algorithm must both parse and be on the allow list.
        let hash_algo = HashAlgorithm::parse(&elements.hash_algo_token)
            .filter(|algo| self.allowed_algorithms.contains(algo))
            .ok_or(AuthError::DisallowedAlgorithm)?;

        // Step 4: the date, wherever it lives, must be present, parse,
        // agree with the credential scope's short date, and fall within
        // the acceptable freshness interval.
        let long_date = match elements.origin {
            AuthOrigin::Header => {
                let name = self.date_header_name.to_ascii_lowercase();
                headers
                    .get_first(&name)
                    .ok_or_else(|| AuthError::MissingDateHeader(self.date_header_name.to_string()))?
                    .to_string()
            }
            AuthOrigin::Query => {
                let query_map = parse::raw_query_map(request.query());
                query_map
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(&format!("X-{}-Date", self.vendor_prefix)))
                    .map(|(_, v)| v.clone())
                    .ok_or_else(|| AuthError::MissingDateHeader(format!("X-{}-Date", self.vendor_prefix)))?
            }
        };
        let parsed_date = parse_long_date(&long_date).ok_or(AuthError::InvalidRequestDate)?;
        let short_date = parsed_date.format("%Y%m%d").to_string();
        if short_date != elements.credentials.short_date {
            return Err(AuthError::DateCredentialMismatch);
        }

        // skew = serverTime - requestTime. A non-negative skew (request
        // in the past) must not exceed the mode's expiry window; a
        // negative skew (request in the future) must not exceed the
        // fixed forward-drift tolerance, regardless of mode.
        let now = self.clock.now();
        let skew = (now - parsed_date).num_seconds();
        if skew >= 0 {
            let expiry = match elements.origin {
                AuthOrigin::Query => elements.expires_seconds.ok_or(AuthError::InvalidRequestDate)? as i64,
                AuthOrigin::Header => HEADER_MODE_EXPIRY_SECONDS,
            };
            if skew > expiry {
                return Err(AuthError::RequestExpired);
            }
        } else if -skew > FORWARD_DRIFT_TOLERANCE_SECONDS {
            return Err(AuthError::RequestExpired);
        }

        // Step 5: Host header must be present and match the
        // transport-level host the connection actually arrived on.
        let host = parse::host_from_headers(headers).ok_or(AuthError::MissingHostHeader)?;
        if !hosts_match(host, request.server_name(), request.server_port(), request.scheme()) {
            return Err(AuthError::HostMismatch);
        }

        // Step 6: the credential scope must name this party.
        if elements.credentials.party() != *self.party {
            return Err(AuthError::InvalidCredentials);
        }

        // Step 7: recompute the signature and compare in constant time.
        let secret = self
            .key_lookup
            .resolve(&elements.credentials.access_key_id)
            .ok_or(AuthError::InvalidAccessKeyId)?;

        let expected = self.recompute_signature(request, &elements, &long_date, hash_algo, &secret, body)?;
        if !constant_time_eq(expected.as_bytes(), elements.signature.as_bytes()) {
            return Err(AuthError::SignatureMismatch);
        }

        Ok(elements.credentials.access_key_id)
    }

    /// Step 1: prefer the configured authorization header regardless of
    /// any query-string auth present alongside it; fall back to query
    /// parsing only for a `GET` request carrying a presigned signature.
    fn extract_auth_elements<R: RequestView>(&self, request: &R) -> Result<AuthElements, AuthError> {
        let headers = request.headers();
        let header_name = self.auth_header_name.to_ascii_lowercase();
        if let Some(value) = headers.get_first(&header_name) {
            return parse::parse_header(value, self.vendor_prefix);
        }

        let query_map = parse::raw_query_map(request.query());
        let has_presigned_signature = query_map
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case(&format!("X-{}-Signature", self.vendor_prefix)));
        if request.method().eq_ignore_ascii_case("GET") && has_presigned_signature {
            return parse::parse_query(&query_map, self.vendor_prefix);
        }

        Err(AuthError::NotSigned)
    }

    fn recompute_signature<R: RequestView>(
        &self,
        request: &R,
        elements: &AuthElements,
        long_date: &str,
        hash_algo: HashAlgorithm,
        secret: &str,
        body: &[u8],
    ) -> Result<String, AuthError> {
        let headers = request.headers();
        let raw_header_block = headers.raw_block();

        let query = match elements.origin {
            AuthOrigin::Header => request.query().to_string(),
            AuthOrigin::Query => strip_vendor_params(request.query(), self.vendor_prefix),
        };

        let payload_hash = match elements.origin {
            AuthOrigin::Query => crate::present::UNSIGNED_PAYLOAD.to_string(),
            AuthOrigin::Header => hash_algo.digest_hex(body),
        };

        let canonical_request = build_canonical_request(
            request.method(),
            request.path(),
            &query,
            &raw_header_block,
            &elements.signed_headers,
            &payload_hash,
        );

        let full_scope = format!("{}/{}", elements.credentials.short_date, self.party.scope());
        let sts = string_to_sign(
            self.vendor_prefix,
            hash_algo,
            long_date,
            &elements.credentials.short_date,
            &self.party.scope(),
            &canonical_request,
        );
        let signing_key = derive_signing_key(secret, &full_scope, hash_algo, self.vendor_prefix);
        Ok(crate::signer::signature(&signing_key, &sts, hash_algo))
    }
}

/// The only six query parameters a presigned URL contributes — nothing
/// else gets stripped, even if it happens to share the `X-<vendor>-`
/// prefix (spec.md §4.6 step 7).
const RECOGNIZED_PRESIGN_PARAMS: &[&str] = &[
    "algorithm",
    "credentials",
    "date",
    "expires",
    "signedheaders",
    "signature",
];

/// Remove the six recognized `X-<vendor>-*` parameters from a raw query
/// string, to reconstruct what the signer originally canonicalized
/// (spec.md §4.6 step 7 / §8).
fn strip_vendor_params(query: &str, vendor_prefix: &str) -> String {
    if query.is_empty() {
        return String::new();
    }
    let prefix = format!("x-{}-", vendor_prefix.to_ascii_lowercase());
    query
        .split('&')
        .filter(|part| {
            let key = part.split('=').next().unwrap_or("").to_ascii_lowercase();
            match key.strip_prefix(&prefix) {
                Some(suffix) => !RECOGNIZED_PRESIGN_PARAMS.contains(&suffix),
                None => true,
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse a `YYYYMMDDTHHMMSSZ` timestamp.
pub fn parse_long_date(value: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%SZ").ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Host comparison treats a default port for the request's scheme as
/// equivalent to no port at all (`example.com` == `example.com:443` over
/// HTTPS — spec.md §8).
fn hosts_match(header_host: &str, server_name: &str, server_port: Option<u16>, scheme: &str) -> bool {
    normalized_host(header_host) == normalized_host_str(server_name, server_port, scheme)
}

fn normalized_host(raw: &str) -> (String, Option<u16>) {
    match raw.rsplit_once(':') {
        Some((host, port)) => match port.parse::<u16>() {
            Ok(p) => (host.to_ascii_lowercase(), Some(p)),
            Err(_) => (raw.to_ascii_lowercase(), None),
        },
        None => (raw.to_ascii_lowercase(), None),
    }
}

fn normalized_host_str(server_name: &str, port: Option<u16>, scheme: &str) -> (String, Option<u16>) {
    let default_port = match scheme {
        "https" => 443,
        _ => 80,
    };
    let effective_port = port.filter(|p| *p != default_port);
    (server_name.to_ascii_lowercase(), effective_port)
}

/// Byte-for-byte constant-time comparison, to avoid leaking timing
/// information about how many leading bytes of a guessed signature
/// matched.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
