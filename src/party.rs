//! The credential-scope prefix: an immutable `(region, service,
//! requestType)` triple, plus the five-part credentials string it
//! contributes to.

/// Restricts a signing key to one region, one service, and one
/// request-type marker. Created at configuration time, lives for the
/// life of a [`crate::client::Client`] or [`crate::server::Server`], and
/// is never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub region: String,
    pub service: String,
    pub request_type: String,
}

impl Party {
    pub fn new(
        region: impl Into<String>,
        service: impl Into<String>,
        request_type: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            service: service.into(),
            request_type: request_type.into(),
        }
    }

    /// The static `region/service/requestType` part of the credential
    /// scope (three segments — used inside the string-to-sign, see
    /// spec.md §4.3).
    pub fn scope(&self) -> String {
        format!("{}/{}/{}", self.region, self.service, self.request_type)
    }
}

/// The five parts read out of a `Credential=` field or an
/// `X-<vendor>-Credentials` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCredentials {
    pub access_key_id: String,
    pub short_date: String,
    pub region: String,
    pub service: String,
    pub request_type: String,
}

impl ParsedCredentials {
    /// Parse a `/`-joined credentials string. Fails unless it has exactly
    /// five parts.
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.split('/').collect();
        if parts.len() != 5 {
            return None;
        }
        Some(Self {
            access_key_id: parts[0].to_string(),
            short_date: parts[1].to_string(),
            region: parts[2].to_string(),
            service: parts[3].to_string(),
            request_type: parts[4].to_string(),
        })
    }

    pub fn party(&self) -> Party {
        Party::new(&self.region, &self.service, &self.request_type)
    }

    /// `shortDate/region/service/requestType` — the four-segment scope
    /// the key deriver folds into the signing key.
    pub fn full_scope(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.short_date, self.region, self.service, self.request_type
        )
    }
}

/// Build the five-part credentials string embedded in `Credential=` and
/// `X-<vendor>-Credentials`.
pub fn credentials_string(access_key_id: &str, short_date: &str, party: &Party) -> String {
    format!("{access_key_id}/{short_date}/{}", party.scope())
}
