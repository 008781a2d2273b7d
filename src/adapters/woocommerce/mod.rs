//! WooCommerce adapter: orders, products and customers.

mod client;
mod types;

pub use client::WooCommerceClient;
pub use types::{
    WooCustomer, WooCustomerInput, WooLineItem, WooOrder, WooOrderInput, WooProduct,
    WooProductInput,
};
