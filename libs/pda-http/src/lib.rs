#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP transport for the PDA procedure gateway
//!
//! A pooled hyper client for the POST-and-read-JSON exchanges the gateway
//! has with PDA service hosts. Requests go through rustls (plain HTTP only
//! when configured), one timeout per request, gzip/brotli/deflate response
//! decoding, and an `outgoing_http` tracing span.
//!
//! Each `send()` is exactly one attempt. Nothing is retried.
//!
//! # Example
//!
//! ```ignore
//! use pda_http::HttpClient;
//!
//! let client = HttpClient::builder()
//!     .user_agent("pda-gateway/1.0")
//!     .build()?;
//!
//! let envelope: serde_json::Value = client
//!     .post("https://pda.example.com/API/ServiceExecute/pda/general")
//!     .header("accept", "application/json")
//!     .json(&body)?
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod layers;
mod request;
mod response;
mod tls;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{
    DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_BODY_SIZE, DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT,
    HttpClientConfig, TlsRootConfig, TransportSecurity,
};
pub use error::{HttpError, InvalidUriKind};
pub use request::RequestBuilder;
pub use response::{HttpResponse, ResponseBody};

pub use http::StatusCode;
