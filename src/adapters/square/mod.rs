//! Square adapter: payments, orders, refunds and locations.

mod client;
mod types;

pub use client::SquareClient;
pub use types::{
    CreatePaymentRequest, RefundPaymentRequest, SquareLineItem, SquareLocation, SquareMoney,
    SquareOrder, SquareOrderInput, SquarePayment, SquarePaymentList, SquareRefund,
};
