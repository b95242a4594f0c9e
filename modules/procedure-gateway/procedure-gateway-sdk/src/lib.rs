//! Procedure gateway SDK
//!
//! Public contract for calling stored procedures on a PDA service host:
//! the client trait, the call/outcome models, and the error type.
//!
//! ## Usage
//!
//! ```ignore
//! use procedure_gateway_sdk::{CallerIdentity, ProcedureCall, ProcedureGatewayClient};
//!
//! let identity = CallerIdentity::new("U1001", "P100");
//! let call = ProcedureCall::new("USP_PDA_STOCK_LIST")
//!     .params(["WH01", "A-100"])
//!     .endpoint("general");
//!
//! let outcome = client.invoke(&identity, call).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod error;
pub mod models;

pub use api::ProcedureGatewayClient;
pub use error::ProcedureGatewayError;
pub use models::{
    CallerIdentity, Dictionary, EndpointTag, Presence, ProcedureCall, ProcedureOutcome,
    ResultShape, Row,
};
