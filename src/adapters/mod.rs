//! Adapters - Implementations of port interfaces and provider clients.
//!
//! - `rest` - Shared authenticated HTTP transport
//! - `shopify`, `godaddy`, `stripe`, `square`, `woocommerce` - Provider clients
//! - `idempotency` - Processed-event store implementations

pub mod godaddy;
pub mod idempotency;
pub mod rest;
pub mod shopify;
pub mod square;
pub mod stripe;
pub mod woocommerce;

pub use godaddy::GoDaddyClient;
pub use idempotency::InMemoryProcessedEventStore;
pub use rest::{AuthScheme, ListParams, RequestOptions, RestClient, DEFAULT_TIMEOUT};
pub use shopify::ShopifyClient;
pub use square::SquareClient;
pub use stripe::StripeClient;
pub use woocommerce::WooCommerceClient;
