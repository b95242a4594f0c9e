//! Domain errors for the procedure gateway.

use pda_http::HttpError;
use procedure_gateway_sdk::ProcedureGatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("procedure is null")]
    ProcedureNull,

    #[error("procedure is undefined")]
    ProcedureUndefined,

    #[error("procedure is empty")]
    ProcedureEmpty,

    #[error("parameters are undefined; pass a string, a number, or a list")]
    ParametersUndefined,

    #[error("parameters are null; pass an empty list for procedures without parameters")]
    ParametersNull,

    #[error("unsupported parameter type: {kind}")]
    UnsupportedParameter { kind: &'static str },

    #[error("unsupported parameter list element at index {index}: {kind}")]
    UnsupportedListElement { index: usize, kind: &'static str },

    #[error("endpoint missing")]
    EndpointMissing,

    #[error("endpoint unknown: {0}")]
    EndpointUnknown(String),

    #[error("endpoint {0} has no configured base URL")]
    EndpointNotConfigured(&'static str),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("{0}")]
    RemoteError(String),

    #[error("{0}")]
    RemoteUserMessage(String),
}

impl From<DomainError> for ProcedureGatewayError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::ProcedureNull
            | DomainError::ProcedureUndefined
            | DomainError::ProcedureEmpty
            | DomainError::ParametersUndefined
            | DomainError::ParametersNull
            | DomainError::UnsupportedParameter { .. }
            | DomainError::UnsupportedListElement { .. }
            | DomainError::EndpointMissing
            | DomainError::EndpointUnknown(_) => Self::InvalidArgument(e.to_string()),
            DomainError::EndpointNotConfigured(_) => Self::Configuration(e.to_string()),
            DomainError::Http(http) => Self::Transport {
                status: http.status().map(|s| s.as_u16()),
                message: http.to_string(),
            },
            DomainError::MalformedBody(message) => Self::Transport {
                status: None,
                message: format!("malformed response body: {message}"),
            },
            DomainError::RemoteError(message) | DomainError::RemoteUserMessage(message) => {
                Self::Remote(message)
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_become_invalid_argument() {
        let err: ProcedureGatewayError = DomainError::ProcedureNull.into();
        assert_eq!(err, ProcedureGatewayError::InvalidArgument("procedure is null".to_owned()));

        let err: ProcedureGatewayError = DomainError::EndpointMissing.into();
        assert_eq!(err, ProcedureGatewayError::InvalidArgument("endpoint missing".to_owned()));

        let err: ProcedureGatewayError = DomainError::EndpointUnknown("ARCHIVE".to_owned()).into();
        assert!(matches!(err, ProcedureGatewayError::InvalidArgument(m) if m.starts_with("endpoint unknown")));
    }

    #[test]
    fn unconfigured_endpoint_is_configuration_error() {
        let err: ProcedureGatewayError = DomainError::EndpointNotConfigured("OUTPUT").into();
        assert!(matches!(err, ProcedureGatewayError::Configuration(_)));
    }

    #[test]
    fn remote_messages_are_verbatim() {
        let err: ProcedureGatewayError = DomainError::RemoteError("boom".to_owned()).into();
        assert_eq!(err, ProcedureGatewayError::Remote("boom".to_owned()));
    }

    #[test]
    fn http_status_is_carried() {
        let http = HttpError::HttpStatus {
            status: http_status(503),
            body_preview: String::new(),
            content_type: None,
        };
        let err: ProcedureGatewayError = DomainError::Http(http).into();
        assert_eq!(err.status(), Some(503));
    }

    fn http_status(code: u16) -> pda_http::StatusCode {
        pda_http::StatusCode::from_u16(code).unwrap()
    }
}
