//! Signing-key derivation (spec.md §4.2): a four-step HMAC chain that
//! scopes a long-lived secret to one day, one region, one service, and
//! one request type.

use crate::hash::HashAlgorithm;

/// Fold `vendorPrefix + secret` through the four scope segments of
/// `full_credential_scope` (`shortDate/region/service/requestType`),
/// HMAC-ing each segment with the previous step's output.
pub fn derive_signing_key(
    secret: &str,
    full_credential_scope: &str,
    hash_algo: HashAlgorithm,
    vendor_prefix: &str,
) -> Vec<u8> {
    let seed = format!("{vendor_prefix}{secret}");
    full_credential_scope
        .split('/')
        .fold(seed.into_bytes(), |key, segment| {
            hash_algo.hmac(&key, segment.as_bytes())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_a_full_width_digest() {
        let key = derive_signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20110909/us-east-1/iam/aws4_request",
            HashAlgorithm::Sha256,
            "AWS4",
        );
        assert_eq!(key.len(), 32);
    }

    #[test]
    fn scope_order_matters() {
        let a = derive_signing_key("secret", "20110909/us/svc/req", HashAlgorithm::Sha256, "EMS");
        let b = derive_signing_key("secret", "req/svc/us/20110909", HashAlgorithm::Sha256, "EMS");
        assert_ne!(a, b);
    }

    #[test]
    fn different_vendor_prefix_changes_key() {
        let a = derive_signing_key("secret", "20110909/us/svc/req", HashAlgorithm::Sha256, "AWS4");
        let b = derive_signing_key("secret", "20110909/us/svc/req", HashAlgorithm::Sha256, "EMS");
        assert_ne!(a, b);
    }

    #[test]
    fn is_deterministic() {
        let a = derive_signing_key("secret", "20110909/us/svc/req", HashAlgorithm::Sha256, "EMS");
        let b = derive_signing_key("secret", "20110909/us/svc/req", HashAlgorithm::Sha256, "EMS");
        assert_eq!(a, b);
    }
}
