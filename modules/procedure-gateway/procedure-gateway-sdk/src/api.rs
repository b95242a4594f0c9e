//! Public API trait for the procedure gateway.

use async_trait::async_trait;

use crate::error::ProcedureGatewayError;
use crate::models::{CallerIdentity, Dictionary, ProcedureCall, ProcedureOutcome};

/// Client for the PDA procedure-call convention.
///
/// Every method issues at most one HTTP request. Calls are independent and
/// may run concurrently on a shared client.
///
/// ```ignore
/// let outcome = client.invoke(&identity, ProcedureCall::new("USP_PING").no_params()).await?;
/// let now = client.server_time(Some("YYYY-MM-DD")).await?;
/// ```
#[async_trait]
pub trait ProcedureGatewayClient: Send + Sync {
    /// Invoke a stored procedure.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` when the procedure, parameters, or endpoint selector
    ///   fail validation (no request is sent)
    /// - `Configuration` when the selected endpoint has no base URL
    /// - `Transport` for network failures, non-2xx statuses, and non-JSON bodies
    /// - `Remote` when the server reports an error or, by default, a user message
    async fn invoke(
        &self,
        identity: &CallerIdentity,
        call: ProcedureCall,
    ) -> Result<ProcedureOutcome, ProcedureGatewayError>;

    /// Fetch the server clock from the GETDATE endpoint.
    ///
    /// Without a format key the raw server value is returned. With one, the
    /// value is rendered through the date formatter, which yields
    /// `"Invalid Date"` or `"Invalid format"` rather than an error.
    ///
    /// # Errors
    ///
    /// `Configuration` if GETDATE is not configured, `Transport` on request failure.
    async fn server_time(&self, format: Option<&str>) -> Result<String, ProcedureGatewayError>;

    /// Fetch the translation dictionary for `language`.
    ///
    /// Returns `Ok(None)` when the language is the configured native language
    /// or the server returns no dictionary.
    ///
    /// # Errors
    ///
    /// `Configuration` if the dictionary endpoint is not configured,
    /// `Transport` on request failure or a malformed body.
    async fn translations(
        &self,
        identity: &CallerIdentity,
        language: &str,
    ) -> Result<Option<Dictionary>, ProcedureGatewayError>;
}
