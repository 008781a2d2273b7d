//! Stripe REST client.
//!
//! Payment intents, customers, charges and refunds. Authenticates with the
//! secret key as a bearer token and sends form-encoded bodies.

use std::time::Duration;

use secrecy::ExposeSecret;

use super::types::{
    CreateChargeRequest, CreateCustomerRequest, CreatePaymentIntentRequest, CreateRefundRequest,
    StripeCharge, StripeCustomer, StripePaymentIntent, StripeRefund,
};
use crate::adapters::rest::{AuthScheme, RequestOptions, RestClient};
use crate::config::StripeConfig;
use crate::domain::{GatewayError, Provider};

#[derive(Debug, Clone)]
pub struct StripeClient {
    rest: RestClient,
}

impl StripeClient {
    pub fn new(config: &StripeConfig, timeout: Duration) -> Result<Self, GatewayError> {
        let rest = RestClient::new(
            Provider::Stripe,
            config.api_base_url(),
            AuthScheme::bearer(config.api_key.expose_secret().as_str()),
            timeout,
        )?;
        Ok(Self { rest })
    }

    pub fn base_url(&self) -> &str {
        self.rest.base_url()
    }

    pub async fn create_payment_intent(
        &self,
        request: &CreatePaymentIntentRequest,
    ) -> Result<StripePaymentIntent, GatewayError> {
        let intent: StripePaymentIntent = self
            .rest
            .post(
                "payment_intents",
                RequestOptions::new().form(request.to_form()),
            )
            .await?;
        tracing::info!(
            payment_intent_id = %intent.id,
            amount = intent.amount,
            currency = %intent.currency,
            "Stripe payment intent created"
        );
        Ok(intent)
    }

    pub async fn get_payment_intent(&self, id: &str) -> Result<StripePaymentIntent, GatewayError> {
        self.rest
            .get(&format!("payment_intents/{}", self.rest.segment(id)?), RequestOptions::new())
            .await
    }

    /// Captures an authorized intent; `amount` captures part of it.
    pub async fn capture_payment_intent(
        &self,
        id: &str,
        amount: Option<i64>,
    ) -> Result<StripePaymentIntent, GatewayError> {
        let form = amount
            .map(|amount| vec![("amount_to_capture".to_string(), amount.to_string())])
            .unwrap_or_default();
        self.rest
            .post(
                &format!("payment_intents/{}/capture", self.rest.segment(id)?),
                RequestOptions::new().form(form),
            )
            .await
    }

    pub async fn create_customer(
        &self,
        request: &CreateCustomerRequest,
    ) -> Result<StripeCustomer, GatewayError> {
        self.rest
            .post("customers", RequestOptions::new().form(request.to_form()))
            .await
    }

    /// Returns `None` for unknown or deleted customers.
    pub async fn get_customer(&self, id: &str) -> Result<Option<StripeCustomer>, GatewayError> {
        match self
            .rest
            .get::<StripeCustomer>(
                &format!("customers/{}", self.rest.segment(id)?),
                RequestOptions::new(),
            )
            .await
        {
            Ok(customer) if customer.deleted => Ok(None),
            Ok(customer) => Ok(Some(customer)),
            Err(GatewayError::ProviderApi { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn create_charge(
        &self,
        request: &CreateChargeRequest,
    ) -> Result<StripeCharge, GatewayError> {
        self.rest
            .post("charges", RequestOptions::new().form(request.to_form()))
            .await
    }

    pub async fn create_refund(
        &self,
        request: &CreateRefundRequest,
    ) -> Result<StripeRefund, GatewayError> {
        if request.payment_intent.is_none() && request.charge.is_none() {
            return Err(GatewayError::validation(
                Provider::Stripe,
                "refund requires payment_intent or charge",
            ));
        }
        self.rest
            .post("refunds", RequestOptions::new().form(request.to_form()))
            .await
    }
}
