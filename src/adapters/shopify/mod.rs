//! Shopify Admin API adapter.
//!
//! Authenticates with the `X-Shopify-Access-Token` header and wraps request
//! and response bodies in Shopify's `{ "order": .. }` style envelopes.

mod client;
mod types;

pub use client::ShopifyClient;
pub use types::{
    ShopifyFulfillment, ShopifyFulfillmentInput, ShopifyLineItem, ShopifyLineItemInput,
    ShopifyOrder, ShopifyOrderInput, ShopifyProduct, ShopifyProductInput, ShopifyVariant,
};
