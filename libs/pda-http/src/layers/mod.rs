//! Middleware wrapped around the hyper client
//!
//! [`SpanLayer`] sits outside the timeout so the span covers the whole wait;
//! [`UserAgentLayer`] fills in the header before decompression negotiation.

mod span;
mod user_agent;

pub use span::SpanLayer;
pub use user_agent::UserAgentLayer;
