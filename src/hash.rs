//! Hash-algorithm abstraction. Both the signer and the verifier restrict
//! themselves to SHA-256 and SHA-512 — the Open Question in spec §9 about
//! letting the signer pick any algorithm its host recognizes is resolved
//! here by not giving it that freedom in the first place.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Parse an algorithm token, case-insensitively. `None` for anything
    /// other than `SHA256` / `SHA512`.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "SHA256" => Some(Self::Sha256),
            "SHA512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// The uppercase token used in the algorithm line of the
    /// string-to-sign and in the `Authorization`/presigned algorithm field.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }

    /// Lowercase hex digest of `data`.
    pub fn digest_hex(&self, data: &[u8]) -> String {
        match self {
            Self::Sha256 => hex::encode(Sha256::digest(data)),
            Self::Sha512 => hex::encode(Sha512::digest(data)),
        }
    }

    /// Raw HMAC bytes (not hex) over `data`, keyed by `key`.
    pub fn hmac(&self, key: &[u8], data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => {
                let mut mac =
                    Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts a key of any length");
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            Self::Sha512 => {
                let mut mac =
                    Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts a key of any length");
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
        }
    }

    /// Lowercase hex HMAC of `data`, keyed by `key`.
    pub fn hmac_hex(&self, key: &[u8], data: &[u8]) -> String {
        hex::encode(self.hmac(key, data))
    }
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        Self::Sha256
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(HashAlgorithm::parse("sha256"), Some(HashAlgorithm::Sha256));
        assert_eq!(HashAlgorithm::parse("Sha512"), Some(HashAlgorithm::Sha512));
    }

    #[test]
    fn rejects_unknown_algorithm() {
        assert_eq!(HashAlgorithm::parse("SHA123"), None);
        assert_eq!(HashAlgorithm::parse("MD5"), None);
    }

    #[test]
    fn digest_is_lowercase_hex_of_empty_string() {
        let digest = HashAlgorithm::Sha256.digest_hex(b"");
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }

    #[test]
    fn hmac_is_deterministic() {
        let a = HashAlgorithm::Sha256.hmac_hex(b"key", b"data");
        let b = HashAlgorithm::Sha256.hmac_hex(b"key", b"data");
        assert_eq!(a, b);
    }
}
