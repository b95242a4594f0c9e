use crate::client::{BufferedService, map_buffer_error, try_acquire_buffer_slot};
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::response::HttpResponse;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, Method, Request, Uri};
use http_body_util::Full;
use serde::Serialize;
use tower::Service;

/// One pending request, started by [`HttpClient::post`](crate::HttpClient::post)
///
/// A bad header is remembered and returned by the next fallible call
/// ([`json`](Self::json) or [`send`](Self::send)).
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder {
    service: BufferedService,
    max_body_size: usize,
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Option<Bytes>,
    deferred: Option<HttpError>,
    transport_security: TransportSecurity,
}

impl RequestBuilder {
    pub(crate) fn new(
        service: BufferedService,
        max_body_size: usize,
        method: Method,
        url: String,
        transport_security: TransportSecurity,
    ) -> Self {
        Self {
            service,
            max_body_size,
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            deferred: None,
            transport_security,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.deferred.is_none() {
            match parse_header(name, value) {
                Ok((name, value)) => {
                    self.headers.append(name, value);
                }
                Err(e) => self.deferred = Some(e),
            }
        }
        self
    }

    /// Serialize `body` as the request payload.
    ///
    /// `Content-Type: application/json` is added at send time unless a
    /// content type header was set.
    ///
    /// # Errors
    ///
    /// A deferred header error, or `HttpError::Json` when serialization fails.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        if let Some(e) = self.deferred.take() {
            return Err(e);
        }
        self.body = Some(Bytes::from(serde_json::to_vec(body)?));
        Ok(self)
    }

    /// Issue the request once.
    ///
    /// Any HTTP status is a successful send; use the checked readers on
    /// [`HttpResponse`] to reject non-2xx answers.
    ///
    /// # Errors
    ///
    /// A deferred header error, an unusable URL or scheme, a connection or TLS
    /// failure, the request timeout, or `HttpError::Overloaded` when the
    /// client buffer is full.
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(e) = self.deferred.take() {
            return Err(e);
        }
        let uri = check_url(&self.url, self.transport_security)?;

        if self.body.is_some() && !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let mut request = Request::builder()
            .method(self.method)
            .uri(uri)
            .body(Full::new(self.body.unwrap_or_default()))?;
        *request.headers_mut() = self.headers;

        try_acquire_buffer_slot(&mut self.service).await?;
        let inner = self.service.call(request).await.map_err(map_buffer_error)?;

        Ok(HttpResponse {
            inner,
            max_body_size: self.max_body_size,
        })
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), HttpError> {
    Ok((HeaderName::try_from(name)?, HeaderValue::try_from(value)?))
}

/// Absolute `https://` URL, or `http://` when the transport allows it.
fn check_url(url: &str, transport: TransportSecurity) -> Result<Uri, HttpError> {
    let invalid = |kind, reason: String| HttpError::InvalidUri {
        url: url.to_owned(),
        kind,
        reason,
    };

    let uri: Uri = url
        .parse()
        .map_err(|e: http::uri::InvalidUri| invalid(InvalidUriKind::ParseError, e.to_string()))?;
    if uri.authority().is_none() {
        return Err(invalid(
            InvalidUriKind::MissingAuthority,
            "no host in URL".to_owned(),
        ));
    }

    match (uri.scheme_str(), transport) {
        (Some("https"), _) | (Some("http"), TransportSecurity::AllowInsecureHttp) => Ok(uri),
        (Some("http"), TransportSecurity::TlsOnly) => Err(HttpError::InvalidScheme {
            scheme: "http".to_owned(),
            reason: "plain HTTP is not enabled for this client".to_owned(),
        }),
        (Some(other), _) => Err(HttpError::InvalidScheme {
            scheme: other.to_owned(),
            reason: "expected http or https".to_owned(),
        }),
        (None, _) => Err(invalid(InvalidUriKind::MissingScheme, "no scheme in URL".to_owned())),
    }
}
