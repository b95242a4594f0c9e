//! Configuration for the procedure gateway.
//!
//! Loaded in layers: built-in defaults, then an optional YAML file, then
//! `PDA__`-prefixed environment variables (`PDA__ENDPOINTS__GENERAL`,
//! `PDA__HTTP__REQUEST_TIMEOUT_MS`, ...).

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use pda_http::{HttpClientConfig, TlsRootConfig, TransportSecurity};
use procedure_gateway_sdk::EndpointTag;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable prefix; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "PDA__";

/// Procedure used by [`translations`](procedure_gateway_sdk::ProcedureGatewayClient::translations)
/// unless configured otherwise.
pub const DEFAULT_DICTIONARY_PROCEDURE: &str = "USP_PDA_DICTIONARY";

/// Reported as `clientNetworkType` when no descriptor is configured.
pub const UNKNOWN_NETWORK_TYPE: &str = "unknown";

const DEFAULT_USER_AGENT: &str = concat!("pda-procedure-gateway/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcedureGatewayConfig {
    pub endpoints: EndpointsConfig,
    pub http: HttpConfig,
    /// Network descriptor sent as `clientNetworkType` (e.g. `"4g"`).
    pub client_network_type: Option<String>,
    /// Log every call's inputs and outputs at info level.
    pub verbose: bool,
    pub dictionary: DictionaryConfig,
}

impl Default for ProcedureGatewayConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointsConfig::default(),
            http: HttpConfig::default(),
            client_network_type: None,
            verbose: false,
            dictionary: DictionaryConfig::default(),
        }
    }
}

/// Base URL per endpoint. Unset or blank entries are unconfigured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EndpointsConfig {
    pub general: Option<String>,
    pub output: Option<String>,
    pub output_front: Option<String>,
    pub getdate: Option<String>,
    pub dictionary: Option<String>,
}

impl EndpointsConfig {
    /// Configured base URL for a call endpoint.
    #[must_use]
    pub fn url_for(&self, tag: EndpointTag) -> Option<&str> {
        let url = match tag {
            EndpointTag::General => &self.general,
            EndpointTag::Output => &self.output,
            EndpointTag::OutputFront => &self.output_front,
            EndpointTag::GetDate => &self.getdate,
        };
        non_blank(url.as_deref())
    }

    #[must_use]
    pub fn dictionary_url(&self) -> Option<&str> {
        non_blank(self.dictionary.as_deref())
    }
}

fn non_blank(url: Option<&str>) -> Option<&str> {
    url.map(str::trim).filter(|u| !u.is_empty())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsRoots {
    #[default]
    Webpki,
    Native,
}

/// Transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub request_timeout_ms: u64,
    pub max_body_size: usize,
    pub user_agent: String,
    /// Permit `http://` endpoints (plant LAN hosts are often plain HTTP).
    pub allow_insecure_http: bool,
    pub tls_roots: TlsRoots,
    pub buffer_capacity: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            max_body_size: pda_http::DEFAULT_MAX_BODY_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            allow_insecure_http: false,
            tls_roots: TlsRoots::Webpki,
            buffer_capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DictionaryConfig {
    pub procedure: String,
    /// Language that needs no dictionary; lookups for it return nothing without I/O.
    pub native_language: Option<String>,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            procedure: DEFAULT_DICTIONARY_PROCEDURE.to_owned(),
            native_language: None,
        }
    }
}

impl ProcedureGatewayConfig {
    /// Load defaults, then `path` (if given), then the environment.
    ///
    /// # Errors
    ///
    /// `MissingFile` if `path` does not exist, `Invalid` if a layer fails to
    /// parse or contains unknown keys.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Network descriptor to report, `"unknown"` when unset.
    #[must_use]
    pub fn network_type(&self) -> &str {
        self.client_network_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNKNOWN_NETWORK_TYPE)
    }

    #[must_use]
    pub fn http_client_config(&self) -> HttpClientConfig {
        let transport = if self.http.allow_insecure_http {
            TransportSecurity::AllowInsecureHttp
        } else {
            TransportSecurity::TlsOnly
        };
        let tls_roots = match self.http.tls_roots {
            TlsRoots::Webpki => TlsRootConfig::WebPki,
            TlsRoots::Native => TlsRootConfig::Native,
        };

        HttpClientConfig {
            request_timeout: Duration::from_millis(self.http.request_timeout_ms),
            max_body_size: self.http.max_body_size,
            user_agent: self.http.user_agent.clone(),
            transport,
            tls_roots,
            buffer_capacity: self.http.buffer_capacity.max(1),
            ..HttpClientConfig::default()
        }
    }
}
