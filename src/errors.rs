//! Typed verification failures (spec.md §7). Every variant's `Display`
//! text is part of the wire contract other implementations interoperate
//! against — don't reword a message without checking the table in the
//! spec.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AuthError {
    #[error("Request has not been signed.")]
    NotSigned,

    #[error("Could not parse authorization header.")]
    MalformedAuthorizationHeader,

    #[error("Missing query parameter: {0}")]
    MissingQueryParameter(String),

    #[error("Invalid credential scope")]
    InvalidCredentialScope,

    #[error("The Host header is missing")]
    MissingHostHeader,

    #[error("The {0} header is missing")]
    MissingDateHeader(String),

    #[error("Invalid request date.")]
    InvalidRequestDate,

    #[error("The request date and credential date do not match.")]
    DateCredentialMismatch,

    #[error("Request date is not within the accepted time interval.")]
    RequestExpired,

    #[error("The host header does not match.")]
    HostMismatch,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid access key id")]
    InvalidAccessKeyId,

    #[error("Only SHA256 and SHA512 hash algorithms are allowed.")]
    DisallowedAlgorithm,

    #[error("Host header not signed")]
    HostHeaderNotSigned,

    #[error("Date header not signed")]
    DateHeaderNotSigned,

    #[error("The signatures do not match")]
    SignatureMismatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_query_parameter_includes_the_name() {
        let err = AuthError::MissingQueryParameter("X-Ems-Signature".to_string());
        assert_eq!(err.to_string(), "Missing query parameter: X-Ems-Signature");
    }

    #[test]
    fn missing_date_header_names_the_configured_header() {
        let err = AuthError::MissingDateHeader("X-Ems-Date".to_string());
        assert_eq!(err.to_string(), "The X-Ems-Date header is missing");
    }

    #[test]
    fn variants_are_comparable() {
        assert_eq!(AuthError::NotSigned, AuthError::NotSigned);
        assert_ne!(AuthError::NotSigned, AuthError::SignatureMismatch);
    }
}
