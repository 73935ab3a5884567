//! Configuration loading and types for emssign.
//!
//! Configuration is read from a YAML file and deserialized into the
//! [`Config`] struct. Each subsection governs a different part of the
//! system: the credential-scope party, authentication defaults, and
//! logging.

use serde::Deserialize;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// The credential-scope party this installation signs/verifies for.
    #[serde(default)]
    pub party: PartyConfig,

    /// Authentication presentation defaults.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The static `(region, service, requestType)` triple — see
/// [`crate::party::Party`].
#[derive(Debug, Clone, Deserialize)]
pub struct PartyConfig {
    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_service")]
    pub service: String,

    #[serde(default = "default_request_type")]
    pub request_type: String,
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            service: default_service(),
            request_type: default_request_type(),
        }
    }
}

impl PartyConfig {
    pub fn to_party(&self) -> crate::party::Party {
        crate::party::Party::new(&self.region, &self.service, &self.request_type)
    }
}

/// Authentication presentation defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// The vendor prefix used in `Authorization` values and the six
    /// `X-<vendor>-*` query parameters (e.g. `AWS4`, `EMS`).
    #[serde(default = "default_vendor_prefix")]
    pub vendor_prefix: String,

    /// The header carrying the signed request, when presented that way.
    #[serde(default = "default_auth_header_name")]
    pub auth_header_name: String,

    /// The header carrying the long-form signing date, when presented
    /// that way.
    #[serde(default = "default_date_header_name")]
    pub date_header_name: String,

    /// Algorithm tokens (`SHA256`, `SHA512`) accepted from a signer.
    #[serde(default = "default_allowed_algorithms")]
    pub allowed_algorithms: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            vendor_prefix: default_vendor_prefix(),
            auth_header_name: default_auth_header_name(),
            date_header_name: default_date_header_name(),
            allowed_algorithms: default_allowed_algorithms(),
        }
    }
}

impl AuthConfig {
    /// Resolve the configured tokens into [`crate::hash::HashAlgorithm`]
    /// values, silently dropping any token that doesn't parse.
    pub fn resolved_algorithms(&self) -> Vec<crate::hash::HashAlgorithm> {
        self.allowed_algorithms
            .iter()
            .filter_map(|token| crate::hash::HashAlgorithm::parse(token))
            .collect()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: text or json.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// -- Defaults ----------------------------------------------------------------

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_service() -> String {
    "service".to_string()
}

fn default_request_type() -> String {
    "ems_request".to_string()
}

fn default_vendor_prefix() -> String {
    "EMS".to_string()
}

fn default_auth_header_name() -> String {
    "X-Ems-Auth".to_string()
}

fn default_date_header_name() -> String {
    "X-Ems-Date".to_string()
}

fn default_allowed_algorithms() -> Vec<String> {
    vec!["SHA256".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

// -- Loader ------------------------------------------------------------------

/// Load and parse configuration from a YAML file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let config: Config = serde_yaml::from_str(&contents)?;
    Ok(config)
}
