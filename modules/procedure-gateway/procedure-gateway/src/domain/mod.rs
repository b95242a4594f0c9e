//! Domain layer for the procedure gateway.

pub mod decode;
pub mod endpoint;
pub mod error;
pub mod request;
pub mod service;

pub use endpoint::EndpointTable;
pub use error::DomainError;
pub use service::Service;
