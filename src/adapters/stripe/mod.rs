//! Stripe adapter: payment intents, customers, charges and refunds.

mod client;
mod types;

pub use client::StripeClient;
pub use types::{
    CreateChargeRequest, CreateCustomerRequest, CreatePaymentIntentRequest, CreateRefundRequest,
    StripeCharge, StripeCustomer, StripePaymentIntent, StripeRefund,
};
