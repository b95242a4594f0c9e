use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("pda-http/", env!("CARGO_PKG_VERSION"));

/// 10 MB; dictionary and list procedures can return large row sets.
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Where HTTPS trust anchors come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TlsRootConfig {
    /// Bundled Mozilla roots; works on device images without a usable OS store
    #[default]
    WebPki,
    /// OS certificate store, loaded once per process
    Native,
}

/// Which URL schemes a client accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    #[default]
    TlsOnly,
    /// Accept `http://` as well.
    ///
    /// PDA service hosts on a plant LAN are frequently plain HTTP
    /// (`http://192.168.x.x:8000/API`); this has to be opted into through
    /// configuration.
    AllowInsecureHttp,
}

/// Settings for [`HttpClientBuilder::with_config`](crate::HttpClientBuilder::with_config)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Bounds the whole exchange: connect, send, and response headers.
    pub request_timeout: Duration,
    /// Applied to the decompressed body.
    pub max_body_size: usize,
    pub user_agent: String,
    pub transport: TransportSecurity,
    pub tls_roots: TlsRootConfig,
    /// Requests that may wait for the worker; further ones fail with
    /// `HttpError::Overloaded`.
    pub buffer_capacity: usize,
    /// `None` keeps hyper-util's default.
    pub pool_idle_timeout: Option<Duration>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRootConfig::WebPki,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            pool_idle_timeout: Some(Duration::from_secs(90)),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults_require_tls() {
        let config = HttpClientConfig::default();
        assert_eq!(config.transport, TransportSecurity::TlsOnly);
        assert_eq!(config.tls_roots, TlsRootConfig::WebPki);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);
        assert!(config.user_agent.starts_with("pda-http/"));
    }
}
