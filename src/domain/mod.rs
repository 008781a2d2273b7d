//! Domain layer containing provider identity, webhook handling and errors.
//!
//! # Module Organization
//!
//! - `provider` - The closed set of supported platforms
//! - `webhooks` - Signature verification, registry, canonical events, dispatch
//! - `errors` - Errors raised by outbound provider calls

pub mod errors;
pub mod provider;
pub mod webhooks;

pub use errors::GatewayError;
pub use provider::{Provider, UnknownProvider, WebhookProvider};
