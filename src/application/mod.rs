//! Application layer - Entry points that coordinate domain and adapters.
//!
//! - `unified_client` - Outbound façade over the provider clients
//! - `webhook_intake` - Inbound verify-then-dispatch entry point

pub mod unified_client;
pub mod webhook_intake;

pub use unified_client::{
    PaymentRequest, ProviderOrder, ProviderPayment, ProviderProducts, UnifiedApiClient,
};
pub use webhook_intake::{IntakeError, ReceiveWebhookCommand, WebhookIntake};
