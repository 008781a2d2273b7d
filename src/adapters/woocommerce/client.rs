//! WooCommerce REST v3 client.

use std::time::Duration;

use secrecy::ExposeSecret;

use super::types::{
    WooCustomer, WooCustomerInput, WooOrder, WooOrderInput, WooProduct, WooProductInput,
};
use crate::adapters::rest::{AuthScheme, ListParams, RequestOptions, RestClient};
use crate::config::WooCommerceConfig;
use crate::domain::{GatewayError, Provider};

/// Client for one WooCommerce store.
///
/// Consumer key and secret are sent as HTTP Basic credentials, which
/// WooCommerce accepts over HTTPS.
#[derive(Debug, Clone)]
pub struct WooCommerceClient {
    rest: RestClient,
}

impl WooCommerceClient {
    pub fn new(config: &WooCommerceConfig, timeout: Duration) -> Result<Self, GatewayError> {
        let rest = RestClient::new(
            Provider::WooCommerce,
            config.api_base_url(),
            AuthScheme::basic(
                config.consumer_key.as_str(),
                config.consumer_secret.expose_secret().as_str(),
            ),
            timeout,
        )?;
        Ok(Self { rest })
    }

    pub fn base_url(&self) -> &str {
        self.rest.base_url()
    }

    fn list_query(params: &ListParams) -> RequestOptions {
        RequestOptions::new().query_pairs(params.to_query("per_page", Some("page"), None))
    }

    // ─── Orders ───

    pub async fn list_orders(&self, params: &ListParams) -> Result<Vec<WooOrder>, GatewayError> {
        self.rest.get("orders", Self::list_query(params)).await
    }

    pub async fn get_order(&self, order_id: &str) -> Result<WooOrder, GatewayError> {
        self.rest
            .get(&format!("orders/{}", self.rest.segment(order_id)?), RequestOptions::new())
            .await
    }

    pub async fn create_order(&self, input: &WooOrderInput) -> Result<WooOrder, GatewayError> {
        let body = self.rest.to_json(input)?;
        let order: WooOrder = self
            .rest
            .post("orders", RequestOptions::new().json(body))
            .await?;
        tracing::info!(order_id = order.id, status = %order.status, "WooCommerce order created");
        Ok(order)
    }

    pub async fn update_order(
        &self,
        order_id: &str,
        input: &WooOrderInput,
    ) -> Result<WooOrder, GatewayError> {
        let body = self.rest.to_json(input)?;
        self.rest
            .put(
                &format!("orders/{}", self.rest.segment(order_id)?),
                RequestOptions::new().json(body),
            )
            .await
    }

    // ─── Products ───

    pub async fn list_products(&self, params: &ListParams) -> Result<Vec<WooProduct>, GatewayError> {
        self.rest.get("products", Self::list_query(params)).await
    }

    pub async fn get_product(&self, product_id: &str) -> Result<WooProduct, GatewayError> {
        self.rest
            .get(&format!("products/{}", self.rest.segment(product_id)?), RequestOptions::new())
            .await
    }

    pub async fn create_product(&self, input: &WooProductInput) -> Result<WooProduct, GatewayError> {
        let body = self.rest.to_json(input)?;
        self.rest
            .post("products", RequestOptions::new().json(body))
            .await
    }

    pub async fn update_product(
        &self,
        product_id: &str,
        input: &WooProductInput,
    ) -> Result<WooProduct, GatewayError> {
        let body = self.rest.to_json(input)?;
        self.rest
            .put(
                &format!("products/{}", self.rest.segment(product_id)?),
                RequestOptions::new().json(body),
            )
            .await
    }

    // ─── Customers ───

    pub async fn list_customers(&self, params: &ListParams) -> Result<Vec<WooCustomer>, GatewayError> {
        self.rest.get("customers", Self::list_query(params)).await
    }

    pub async fn get_customer(&self, customer_id: &str) -> Result<WooCustomer, GatewayError> {
        self.rest
            .get(&format!("customers/{}", self.rest.segment(customer_id)?), RequestOptions::new())
            .await
    }

    pub async fn create_customer(
        &self,
        input: &WooCustomerInput,
    ) -> Result<WooCustomer, GatewayError> {
        if input.email.as_deref().map_or(true, |email| email.trim().is_empty()) {
            return Err(GatewayError::validation(
                Provider::WooCommerce,
                "customer email is required",
            ));
        }
        let body = self.rest.to_json(input)?;
        self.rest
            .post("customers", RequestOptions::new().json(body))
            .await
    }

    pub async fn update_customer(
        &self,
        customer_id: &str,
        input: &WooCustomerInput,
    ) -> Result<WooCustomer, GatewayError> {
        let body = self.rest.to_json(input)?;
        self.rest
            .put(
                &format!("customers/{}", self.rest.segment(customer_id)?),
                RequestOptions::new().json(body),
            )
            .await
    }
}
