//! The verification half of the library (spec.md §6): a [`Server`] bundles
//! a [`Party`], presentation defaults, and a [`SecretResolver`] into one
//! reusable object that authenticates incoming requests.

use crate::config::{AuthConfig, PartyConfig};
use crate::hash::HashAlgorithm;
use crate::party::Party;
use crate::request::RequestView;
use crate::time::{Clock, SystemClock};
use crate::verify::{SecretResolver, Verdict, Verifier};

/// Owns the configuration a [`Verifier`] needs and hands out a
/// short-lived `Verifier` per request. Long-lived — build one per
/// process, not one per request.
pub struct Server<'a> {
    party: Party,
    vendor_prefix: String,
    auth_header_name: String,
    date_header_name: String,
    allowed_algorithms: Vec<HashAlgorithm>,
    key_lookup: &'a dyn SecretResolver,
    clock: &'a dyn Clock,
}

impl<'a> Server<'a> {
    pub fn new(party: Party, key_lookup: &'a dyn SecretResolver) -> Self {
        Self {
            party,
            vendor_prefix: "EMS".to_string(),
            auth_header_name: "X-Ems-Auth".to_string(),
            date_header_name: "X-Ems-Date".to_string(),
            allowed_algorithms: vec![HashAlgorithm::Sha256],
            key_lookup,
            clock: &SystemClock,
        }
    }

    /// Build a `Server` from loaded [`PartyConfig`]/[`AuthConfig`] sections.
    pub fn from_config(party: &PartyConfig, auth: &AuthConfig, key_lookup: &'a dyn SecretResolver) -> Self {
        let resolved = auth.resolved_algorithms();
        Self {
            party: party.to_party(),
            vendor_prefix: auth.vendor_prefix.clone(),
            auth_header_name: auth.auth_header_name.clone(),
            date_header_name: auth.date_header_name.clone(),
            allowed_algorithms: if resolved.is_empty() {
                vec![HashAlgorithm::Sha256]
            } else {
                resolved
            },
            key_lookup,
            clock: &SystemClock,
        }
    }

    pub fn with_clock(mut self, clock: &'a dyn Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn authenticate<R: RequestView>(&self, request: &R, body: &[u8]) -> Verdict {
        let verifier = Verifier {
            party: &self.party,
            vendor_prefix: &self.vendor_prefix,
            auth_header_name: &self.auth_header_name,
            date_header_name: &self.date_header_name,
            allowed_algorithms: &self.allowed_algorithms,
            key_lookup: self.key_lookup,
            clock: self.clock,
        };
        verifier.authenticate(request, body)
    }
}
