use http::{Method, Request, Response, Uri};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{Instrument, Span, field};

/// Runs each request inside an `outgoing_http` span
///
/// Fields: `http.method`, `http.url` (query stripped, it may carry tokens),
/// `http.status_code`, and `error` for transport failures and 4xx/5xx.
#[derive(Clone, Copy, Default)]
pub struct SpanLayer;

impl SpanLayer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for SpanLayer {
    type Service = SpanService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SpanService { inner }
    }
}

#[derive(Clone)]
pub struct SpanService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for SpanService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let span = request_span(req.method(), req.uri());
        // The ready instance handles this call; the clone waits for the next poll_ready.
        let ready = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, ready);

        Box::pin(async move {
            let result = inner.call(req).instrument(span.clone()).await;
            record_outcome(&span, result.as_ref().ok().map(Response::status));
            result
        })
    }
}

fn request_span(method: &Method, uri: &Uri) -> Span {
    tracing::info_span!(
        "outgoing_http",
        http.method = %method,
        http.url = %sanitized_url(uri),
        http.status_code = field::Empty,
        error = field::Empty,
    )
}

/// `None` means the request never got a response.
fn record_outcome(span: &Span, status: Option<http::StatusCode>) {
    let failed = status.is_none_or(|status| {
        span.record("http.status_code", status.as_u16());
        status.is_client_error() || status.is_server_error()
    });
    if failed {
        span.record("error", true);
    }
}

fn sanitized_url(uri: &Uri) -> String {
    let scheme = uri.scheme_str().unwrap_or("https");
    let authority = uri.authority().map_or("", http::uri::Authority::as_str);
    format!("{scheme}://{authority}{}", uri.path())
}
