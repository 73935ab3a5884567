//! The string-to-sign and final signature (spec.md §4.3–4.4).

use chrono::{DateTime, Utc};

use crate::hash::HashAlgorithm;

/// `YYYYMMDDTHHMMSSZ`, the long-form date carried in the `X-<vendor>-Date`
/// header / query parameter and as the second line of the string-to-sign.
pub fn format_long_date(when: DateTime<Utc>) -> String {
    when.format("%Y%m%dT%H%M%SZ").to_string()
}

/// `YYYYMMDD`, the day granularity the signing key is scoped to.
pub fn format_short_date(when: DateTime<Utc>) -> String {
    when.format("%Y%m%d").to_string()
}

/// Build the four-line string-to-sign: algorithm line, long date, scope
/// line, and the hex digest of the canonical request.
pub fn string_to_sign(
    vendor_prefix: &str,
    hash_algo: HashAlgorithm,
    long_date: &str,
    short_date: &str,
    party_scope: &str,
    canonical_request: &str,
) -> String {
    format!(
        "{vendor_prefix}-HMAC-{}\n{long_date}\n{short_date}/{party_scope}\n{}",
        hash_algo.token(),
        hash_algo.digest_hex(canonical_request.as_bytes())
    )
}

/// HMAC the string-to-sign with the derived signing key; hex-encode.
pub fn signature(signing_key: &[u8], string_to_sign: &str, hash_algo: HashAlgorithm) -> String {
    hash_algo.hmac_hex(signing_key, string_to_sign.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_long_and_short_dates() {
        let when = Utc.with_ymd_and_hms(2011, 9, 9, 23, 36, 0).unwrap();
        assert_eq!(format_long_date(when), "20110909T233600Z");
        assert_eq!(format_short_date(when), "20110909");
    }

    #[test]
    fn string_to_sign_has_four_lines() {
        let sts = string_to_sign(
            "AWS4",
            HashAlgorithm::Sha256,
            "20110909T233600Z",
            "20110909",
            "us-east-1/iam/aws4_request",
            "canonical-request-body",
        );
        assert_eq!(sts.lines().count(), 4);
        assert!(sts.starts_with("AWS4-HMAC-SHA256\n"));
        assert!(sts.contains("20110909T233600Z\n20110909/us-east-1/iam/aws4_request\n"));
    }

    #[test]
    fn signature_is_deterministic_hex() {
        let key = b"fixed-signing-key";
        let sts = "string-to-sign";
        let sig_a = signature(key, sts, HashAlgorithm::Sha256);
        let sig_b = signature(key, sts, HashAlgorithm::Sha256);
        assert_eq!(sig_a, sig_b);
        assert_eq!(sig_a.len(), 64);
        assert!(sig_a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
