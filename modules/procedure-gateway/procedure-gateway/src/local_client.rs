//! In-process client implementing the `ProcedureGatewayClient` trait.

use std::sync::Arc;

use async_trait::async_trait;
use procedure_gateway_sdk::{
    CallerIdentity, Dictionary, ProcedureCall, ProcedureGatewayClient, ProcedureGatewayError,
    ProcedureOutcome,
};

use crate::domain::{DomainError, Service};

/// Delegates to the domain [`Service`] and converts its errors.
#[derive(Clone)]
pub struct ProcedureGatewayLocalClient {
    svc: Arc<Service>,
}

impl ProcedureGatewayLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

/// Log a failed gateway operation and convert it for the caller.
///
/// Errors reported by the remote procedure log at debug.
fn log_and_convert(op: &str, e: DomainError) -> ProcedureGatewayError {
    match &e {
        DomainError::RemoteError(_) | DomainError::RemoteUserMessage(_) => {
            tracing::debug!(operation = op, error = %e, "procedure gateway call returned a remote error");
        }
        _ => tracing::error!(operation = op, error = ?e, "procedure gateway call failed"),
    }
    e.into()
}

#[async_trait]
impl ProcedureGatewayClient for ProcedureGatewayLocalClient {
    async fn invoke(
        &self,
        identity: &CallerIdentity,
        call: ProcedureCall,
    ) -> Result<ProcedureOutcome, ProcedureGatewayError> {
        self.svc
            .invoke(identity, &call)
            .await
            .map_err(|e| log_and_convert("invoke", e))
    }

    async fn server_time(&self, format: Option<&str>) -> Result<String, ProcedureGatewayError> {
        self.svc
            .server_time(format)
            .await
            .map_err(|e| log_and_convert("server_time", e))
    }

    async fn translations(
        &self,
        identity: &CallerIdentity,
        language: &str,
    ) -> Result<Option<Dictionary>, ProcedureGatewayError> {
        self.svc
            .translations(identity, language)
            .await
            .map_err(|e| log_and_convert("translations", e))
    }
}
