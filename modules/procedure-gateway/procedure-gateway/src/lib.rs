//! Procedure Gateway Implementation
//!
//! Marshals stored-procedure calls to a PDA service host and decodes the
//! `returnErrorMsg` / `returnUserMessage` / `returnValue` envelope it answers
//! with. The public contract lives in `procedure-gateway-sdk` and is
//! re-exported here.
//!
//! ## Architecture
//!
//! - **Validation before I/O**: procedure, parameters, then endpoint
//! - **One POST per call**: no retries, no redirects
//! - **Endpoint table**: tag to base URL, fixed at construction from [`config`]
//!
//! ```ignore
//! let config = ProcedureGatewayConfig::load(Some(Path::new("pda.yaml")))?;
//! let client = procedure_gateway::build_client(&config)?;
//! let outcome = client
//!     .invoke(&CallerIdentity::new("U1001", "P100"), ProcedureCall::new("USP_LIST").no_params())
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::sync::Arc;

// === PUBLIC API (from SDK) ===
pub use procedure_gateway_sdk::{
    CallerIdentity, Dictionary, EndpointTag, Presence, ProcedureCall, ProcedureGatewayClient,
    ProcedureGatewayError, ProcedureOutcome, ResultShape, Row,
};

// === CONFIGURATION ===
pub mod config;
pub use config::{ConfigError, ProcedureGatewayConfig};

// === DATE FORMATTING ===
pub mod datetime;

// === CLIENT ===
pub mod local_client;
pub use local_client::ProcedureGatewayLocalClient;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod domain;
pub mod wire;

pub use wire::parse_call;

/// Build a shared gateway client from configuration.
///
/// # Errors
///
/// Returns `ProcedureGatewayError::Configuration` if the HTTP client cannot be
/// built.
pub fn build_client(
    config: &ProcedureGatewayConfig,
) -> Result<Arc<dyn ProcedureGatewayClient>, ProcedureGatewayError> {
    let svc = domain::Service::from_config(config).map_err(|e| {
        tracing::error!(error = %e, "failed to build procedure gateway HTTP client");
        ProcedureGatewayError::configuration(format!("HTTP client: {e}"))
    })?;
    tracing::debug!(
        network_type = config.network_type(),
        verbose = config.verbose,
        "procedure gateway ready"
    );
    Ok(Arc::new(ProcedureGatewayLocalClient::new(Arc::new(svc))))
}
