//! The signing half of the library (spec.md §6): given a request
//! description and a secret, produce either an augmented header map or a
//! presigned URL.

use chrono::{DateTime, Utc};
use url::Url;

use crate::hash::HashAlgorithm;
use crate::party::Party;
use crate::present::{authorization_header, build_signed_url, presigned_url, SigningInput, UNSIGNED_PAYLOAD};
use crate::request::HeaderBlock;

/// A caller-held signer scoped to one access key and one [`Party`].
/// Stateless beyond its configuration — safe to share across requests
/// and threads.
pub struct Client {
    pub access_key_id: String,
    pub secret: String,
    pub party: Party,
    pub hash_algo: HashAlgorithm,
    pub vendor_prefix: String,
    pub auth_header_name: String,
    pub date_header_name: String,
}

impl Client {
    pub fn new(access_key_id: impl Into<String>, secret: impl Into<String>, party: Party) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret: secret.into(),
            party,
            hash_algo: HashAlgorithm::Sha256,
            vendor_prefix: "EMS".to_string(),
            auth_header_name: "X-Ems-Auth".to_string(),
            date_header_name: "X-Ems-Date".to_string(),
        }
    }

    pub fn with_hash_algorithm(mut self, hash_algo: HashAlgorithm) -> Self {
        self.hash_algo = hash_algo;
        self
    }

    pub fn with_vendor_prefix(mut self, vendor_prefix: impl Into<String>) -> Self {
        self.vendor_prefix = vendor_prefix.into();
        self
    }

    /// `signHeaders` (spec.md §6): returns `extra_headers` augmented with
    /// the date header, `host`, and the authorization header — the full
    /// header map a caller attaches to the outgoing request. `host` and
    /// the date header are signed even if `headers_to_sign` omits them,
    /// since both are mandatory per spec.md §4.6 step 2.
    pub fn sign_headers(
        &self,
        method: &str,
        url: &str,
        body: &[u8],
        extra_headers: &HeaderBlock,
        headers_to_sign: &[String],
        date: DateTime<Utc>,
    ) -> Result<HeaderBlock, url::ParseError> {
        let parsed = Url::parse(url)?;
        let host = parsed.host_str().unwrap_or_default().to_string();
        let path = parsed.path().to_string();
        let query = parsed.query().unwrap_or("").to_string();
        let long_date = date.format("%Y%m%dT%H%M%SZ").to_string();

        let mut headers = extra_headers.clone();
        headers.insert("host", host.as_str());
        headers.insert(&self.date_header_name, long_date.as_str());

        let mut signed_headers: Vec<String> = headers_to_sign
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect();
        signed_headers.push("host".to_string());
        signed_headers.push(self.date_header_name.to_ascii_lowercase());

        let payload_hash = self.hash_algo.digest_hex(body);
        let input = self.signing_input(
            method,
            &path,
            &query,
            &headers.raw_block(),
            &signed_headers,
            &payload_hash,
            date,
        );
        headers.insert(&self.auth_header_name, authorization_header(&input));
        Ok(headers)
    }

    /// `signUrl` (spec.md §6/§4.4): returns `url` with the six
    /// `X-<vendor>-*` presigned parameters appended, values percent-encoded.
    /// `host` is always signed, taken from `url` itself; the only allowed
    /// method for a presigned URL is `GET`.
    pub fn sign_url(
        &self,
        url: &str,
        date: DateTime<Utc>,
        expires_seconds: u64,
        extra_headers: &HeaderBlock,
        headers_to_sign: &[String],
    ) -> Result<String, url::ParseError> {
        let parsed = Url::parse(url)?;
        let host = parsed.host_str().unwrap_or_default().to_string();
        let path = parsed.path().to_string();
        let query = parsed.query().unwrap_or("").to_string();

        let mut headers = extra_headers.clone();
        headers.insert("host", host.as_str());

        let mut signed_headers: Vec<String> = headers_to_sign
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect();
        signed_headers.push("host".to_string());

        let input = self.signing_input(
            "GET",
            &path,
            &query,
            &headers.raw_block(),
            &signed_headers,
            UNSIGNED_PAYLOAD,
            date,
        );
        let params = presigned_url(&input, expires_seconds);
        Ok(build_signed_url(&parsed, &params))
    }

    fn signing_input<'b>(
        &'b self,
        method: &'b str,
        path: &'b str,
        query: &'b str,
        raw_header_block: &'b str,
        signed_headers: &'b [String],
        payload_hash: &'b str,
        when: DateTime<Utc>,
    ) -> SigningInput<'b> {
        SigningInput {
            method,
            path,
            query,
            raw_header_block,
            signed_headers,
            payload_hash,
            access_key_id: &self.access_key_id,
            secret: &self.secret,
            party: &self.party,
            hash_algo: self.hash_algo,
            vendor_prefix: &self.vendor_prefix,
            when,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sign_headers_augments_the_header_map() {
        let party = Party::new("us-east-1", "iam", "aws4_request");
        let when = Utc.with_ymd_and_hms(2011, 9, 9, 23, 36, 0).unwrap();
        let client = Client::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY", party)
            .with_vendor_prefix("AWS4");

        let headers = client
            .sign_headers(
                "GET",
                "https://iam.amazonaws.com/",
                b"",
                &HeaderBlock::new(),
                &[],
                when,
            )
            .unwrap();

        assert_eq!(headers.get_first("host"), Some("iam.amazonaws.com"));
        assert_eq!(headers.get_first("x-ems-date"), Some("20110909T233600Z"));
        let auth = headers.get_first("x-ems-auth").unwrap();
        assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20110909/us-east-1/iam/aws4_request"));
        assert!(auth.contains("SignedHeaders=host;x-ems-date"));
    }

    #[test]
    fn sign_url_returns_a_fully_assembled_url() {
        let party = Party::new("us-east-1", "s3", "aws4_request");
        let when = Utc.with_ymd_and_hms(2013, 5, 24, 0, 0, 0).unwrap();
        let client = Client::new("AKIDEXAMPLE", "secret", party).with_vendor_prefix("AWS4");

        let signed = client
            .sign_url(
                "https://examplebucket.s3.amazonaws.com/test.txt",
                when,
                86400,
                &HeaderBlock::new(),
                &[],
            )
            .unwrap();

        assert!(signed.starts_with("https://examplebucket.s3.amazonaws.com/test.txt?"));
        assert!(signed.contains("X-AWS4-Expires=86400"));
        assert!(signed.contains("X-AWS4-Signature="));
        // The Credential parameter's `/` separators are percent-encoded.
        assert!(signed.contains("X-AWS4-Credentials=AKIDEXAMPLE%2F20130524%2Fus-east-1%2Fs3%2Faws4_request"));
    }

    #[test]
    fn sign_url_rejects_an_unparseable_url() {
        let party = Party::new("us-east-1", "s3", "aws4_request");
        let client = Client::new("AKIDEXAMPLE", "secret", party);
        let when = Utc.with_ymd_and_hms(2013, 5, 24, 0, 0, 0).unwrap();
        assert!(client
            .sign_url("not a url", when, 900, &HeaderBlock::new(), &[])
            .is_err());
    }
}
