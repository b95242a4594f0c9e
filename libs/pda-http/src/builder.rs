use crate::client::{BufferedService, HttpClient};
use crate::config::{HttpClientConfig, TlsRootConfig, TransportSecurity};
use crate::error::HttpError;
use crate::layers::{SpanLayer, UserAgentLayer};
use crate::response::ResponseBody;
use crate::tls;
use bytes::Bytes;
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::time::Duration;
use tower::buffer::Buffer;
use tower::timeout::TimeoutLayer;
use tower::{Layer, ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;

type PooledClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Builder for [`HttpClient`]
///
/// Gateways normally start from [`with_config`](Self::with_config); the
/// setters cover what tests and one-off tools adjust.
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HttpClientConfig::default())
    }

    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Accept `http://` URLs (mock servers in tests)
    ///
    /// Only available in debug builds or with the `allow-insecure-http`
    /// feature. Production plain-HTTP hosts are enabled through
    /// [`HttpClientConfig::transport`].
    #[must_use]
    #[cfg(any(debug_assertions, feature = "allow-insecure-http"))]
    pub fn allow_insecure_http(mut self) -> Self {
        self.config.transport = TransportSecurity::AllowInsecureHttp;
        self
    }

    /// Clamped to at least 1; tower's `Buffer` panics on 0.
    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity.max(1);
        self
    }

    /// Build the client; must run inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// `HttpError::Tls` when the trust roots cannot be set up, and
    /// `HttpError::InvalidHeaderValue` for an unusable user agent.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let HttpClientConfig {
            request_timeout,
            max_body_size,
            user_agent,
            transport,
            tls_roots,
            buffer_capacity,
            pool_idle_timeout,
        } = self.config;

        if transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!(
                target: "pda_http::security",
                "plain HTTP allowed; traffic to http:// endpoints is not encrypted"
            );
        }

        let user_agent = UserAgentLayer::try_new(&user_agent)?;
        let hyper_client = pooled_client(https_connector(tls_roots, transport)?, pool_idle_timeout);

        // Outer to inner: Buffer, Span, Timeout, UserAgent, Decompression, hyper.
        // Every HTTP status comes back as Ok; the checked readers turn non-2xx
        // into HttpError::HttpStatus.
        let stack = ServiceBuilder::new()
            .layer(TimeoutLayer::new(request_timeout))
            .layer(user_agent)
            .layer(DecompressionLayer::new())
            .service(hyper_client)
            .map_response(box_body)
            .map_err(move |e: tower::BoxError| classify_error(e, request_timeout));

        let service: BufferedService =
            Buffer::new(SpanLayer::new().layer(stack), buffer_capacity.max(1));

        Ok(HttpClient {
            service,
            max_body_size,
            transport_security: transport,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn pooled_client(
    connector: HttpsConnector<HttpConnector>,
    pool_idle_timeout: Option<Duration>,
) -> PooledClient {
    let mut builder = Client::builder(TokioExecutor::new());
    // The idle timeout only takes effect with a pool timer.
    builder.pool_timer(TokioTimer::new());
    if let Some(idle) = pool_idle_timeout {
        builder.pool_idle_timeout(idle);
    }
    builder.build(connector)
}

/// HTTPS connector with h2 and http/1.1 ALPN; also dials `http://` when
/// insecure transport is allowed.
fn https_connector(
    tls_roots: TlsRootConfig,
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let with_roots = match tls_roots {
        TlsRootConfig::WebPki => HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(tls::get_crypto_provider())
            .map_err(|e| HttpError::Tls(Box::new(e)))?,
        TlsRootConfig::Native => HttpsConnectorBuilder::new()
            .with_tls_config(tls::native_roots_client_config().map_err(|e| HttpError::Tls(e.into()))?),
    };

    Ok(match transport {
        TransportSecurity::AllowInsecureHttp => {
            with_roots.https_or_http().enable_all_versions().build()
        }
        TransportSecurity::TlsOnly => with_roots.https_only().enable_all_versions().build(),
    })
}

/// Timeouts become `HttpError::Timeout`; anything else that is not already an
/// `HttpError` is a transport failure.
fn classify_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(other) => HttpError::Transport(other),
    }
}

fn box_body<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    response.map(|body| body.map_err(Into::into).boxed())
}
