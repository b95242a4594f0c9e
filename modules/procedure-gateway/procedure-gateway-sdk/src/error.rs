//! Error types for the procedure gateway.

use thiserror::Error;

/// Errors returned by [`ProcedureGatewayClient`](crate::ProcedureGatewayClient).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProcedureGatewayError {
    /// Caller input failed validation; nothing was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The request did not complete or the response was not a usable envelope.
    #[error("transport error{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Transport {
        /// HTTP status when the server answered with a non-2xx code.
        status: Option<u16>,
        message: String,
    },

    /// The server reported `returnErrorMsg` (or `returnUserMessage` treated as an error).
    ///
    /// The message is carried verbatim.
    #[error("{0}")]
    Remote(String),

    /// The gateway is not configured for the requested operation.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ProcedureGatewayError {
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    #[must_use]
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// HTTP status of a `Transport` error, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn remote_message_is_verbatim() {
        let err = ProcedureGatewayError::remote("Lot L-77 is on hold");
        assert_eq!(err.to_string(), "Lot L-77 is on hold");
    }

    #[test]
    fn transport_display_includes_status() {
        let err = ProcedureGatewayError::transport(Some(502), "bad gateway");
        assert_eq!(err.to_string(), "transport error (HTTP 502): bad gateway");
        assert_eq!(err.status(), Some(502));

        let err = ProcedureGatewayError::transport(None, "connection refused");
        assert_eq!(err.to_string(), "transport error: connection refused");
        assert_eq!(err.status(), None);
    }
}
