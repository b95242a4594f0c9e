use crate::error::HttpError;
use bytes::{Bytes, BytesMut};
use http::{HeaderMap, Response, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

/// Longest error body kept in `HttpError::HttpStatus`.
const STATUS_PREVIEW_BYTES: usize = 4096;

/// Response body after the decompression layer.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// Received status and headers with an unread body
///
/// `bytes` ignores the status. `checked_bytes` and `json` turn a non-2xx
/// answer into `HttpError::HttpStatus` carrying the start of the body. Every
/// reader stops at the client's `max_body_size`.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// # Errors
    /// `HttpError::BodyTooLarge` past the size limit, `HttpError::Transport`
    /// when the connection drops mid-body.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        collect_limited(self.inner, self.max_body_size).await
    }

    /// # Errors
    /// `HttpError::HttpStatus` for a non-2xx status, otherwise as [`bytes`](Self::bytes).
    pub async fn checked_bytes(self) -> Result<Bytes, HttpError> {
        let Self { inner, max_body_size } = self;
        if inner.status().is_success() {
            return collect_limited(inner, max_body_size).await;
        }
        Err(status_error(inner, max_body_size).await)
    }

    /// # Errors
    /// As [`checked_bytes`](Self::checked_bytes), plus `HttpError::Json` for a
    /// body that does not deserialize into `T`.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let body = self.checked_bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(http::header::CONTENT_TYPE)?;
    value.to_str().ok().map(str::to_owned)
}

async fn status_error(response: Response<ResponseBody>, max_body_size: usize) -> HttpError {
    let status = response.status();
    let content_type = content_type(response.headers());
    let body_preview =
        match collect_limited(response, max_body_size.min(STATUS_PREVIEW_BYTES)).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(HttpError::BodyTooLarge { .. }) => "<body too large for preview>".to_owned(),
            Err(other) => return other,
        };
    HttpError::HttpStatus {
        status,
        body_preview,
        content_type,
    }
}

async fn collect_limited(
    response: Response<ResponseBody>,
    limit: usize,
) -> Result<Bytes, HttpError> {
    let mut body = response.into_body();
    let mut buf = BytesMut::new();

    while let Some(frame) = body.frame().await {
        let Ok(data) = frame.map_err(HttpError::Transport)?.into_data() else {
            continue;
        };
        let actual = buf.len() + data.len();
        if actual > limit {
            return Err(HttpError::BodyTooLarge { limit, actual });
        }
        buf.extend_from_slice(&data);
    }

    Ok(buf.freeze())
}
