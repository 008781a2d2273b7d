//! Shopify Admin REST API client.

use std::time::Duration;

use secrecy::ExposeSecret;
use serde::de::IgnoredAny;
use serde_json::json;

use super::types::{
    FulfillmentEnvelope, OrderEnvelope, OrdersEnvelope, ProductEnvelope, ProductsEnvelope,
    ShopifyFulfillment, ShopifyFulfillmentInput, ShopifyOrder, ShopifyOrderInput,
    ShopifyProduct, ShopifyProductInput,
};
use crate::adapters::rest::{AuthScheme, ListParams, RequestOptions, RestClient};
use crate::config::ShopifyConfig;
use crate::domain::{GatewayError, Provider};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Client for one shop.
#[derive(Debug, Clone)]
pub struct ShopifyClient {
    rest: RestClient,
}

impl ShopifyClient {
    pub fn new(config: &ShopifyConfig, timeout: Duration) -> Result<Self, GatewayError> {
        let rest = RestClient::new(
            Provider::Shopify,
            config.api_base_url(),
            AuthScheme::header(ACCESS_TOKEN_HEADER, config.access_token.expose_secret().as_str()),
            timeout,
        )?;
        Ok(Self { rest })
    }

    pub fn base_url(&self) -> &str {
        self.rest.base_url()
    }

    fn list_query(params: &ListParams) -> RequestOptions {
        // Shopify paginates with cursor-based page_info links
        RequestOptions::new().query_pairs(params.to_query("limit", None, Some("page_info")))
    }

    // ─── Orders ───

    pub async fn list_orders(&self, params: &ListParams) -> Result<Vec<ShopifyOrder>, GatewayError> {
        let envelope: OrdersEnvelope = self
            .rest
            .get("orders.json", Self::list_query(params))
            .await?;
        Ok(envelope.orders)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<ShopifyOrder, GatewayError> {
        let envelope: OrderEnvelope = self
            .rest
            .get(&format!("orders/{}.json", self.rest.segment(order_id)?), RequestOptions::new())
            .await?;
        Ok(envelope.order)
    }

    pub async fn create_order(&self, input: &ShopifyOrderInput) -> Result<ShopifyOrder, GatewayError> {
        let body = json!({ "order": self.rest.to_json(input)? });
        let envelope: OrderEnvelope = self
            .rest
            .post("orders.json", RequestOptions::new().json(body))
            .await?;
        tracing::info!(order_id = envelope.order.id, "Shopify order created");
        Ok(envelope.order)
    }

    pub async fn update_order(
        &self,
        order_id: &str,
        input: &ShopifyOrderInput,
    ) -> Result<ShopifyOrder, GatewayError> {
        let mut order = self.rest.to_json(input)?;
        if let Some(fields) = order.as_object_mut() {
            fields.insert("id".to_string(), json!(order_id));
        }
        let envelope: OrderEnvelope = self
            .rest
            .put(
                &format!("orders/{}.json", self.rest.segment(order_id)?),
                RequestOptions::new().json(json!({ "order": order })),
            )
            .await?;
        Ok(envelope.order)
    }

    pub async fn delete_order(&self, order_id: &str) -> Result<(), GatewayError> {
        let _: IgnoredAny = self
            .rest
            .delete(&format!("orders/{}.json", self.rest.segment(order_id)?), RequestOptions::new())
            .await?;
        Ok(())
    }

    pub async fn create_fulfillment(
        &self,
        order_id: &str,
        input: &ShopifyFulfillmentInput,
    ) -> Result<ShopifyFulfillment, GatewayError> {
        let body = json!({ "fulfillment": self.rest.to_json(input)? });
        let envelope: FulfillmentEnvelope = self
            .rest
            .post(
                &format!("orders/{}/fulfillments.json", self.rest.segment(order_id)?),
                RequestOptions::new().json(body),
            )
            .await?;
        Ok(envelope.fulfillment)
    }

    // ─── Products ───

    pub async fn list_products(
        &self,
        params: &ListParams,
    ) -> Result<Vec<ShopifyProduct>, GatewayError> {
        let envelope: ProductsEnvelope = self
            .rest
            .get("products.json", Self::list_query(params))
            .await?;
        Ok(envelope.products)
    }

    pub async fn get_product(&self, product_id: &str) -> Result<ShopifyProduct, GatewayError> {
        let envelope: ProductEnvelope = self
            .rest
            .get(
                &format!("products/{}.json", self.rest.segment(product_id)?),
                RequestOptions::new(),
            )
            .await?;
        Ok(envelope.product)
    }

    pub async fn create_product(
        &self,
        input: &ShopifyProductInput,
    ) -> Result<ShopifyProduct, GatewayError> {
        let body = json!({ "product": self.rest.to_json(input)? });
        let envelope: ProductEnvelope = self
            .rest
            .post("products.json", RequestOptions::new().json(body))
            .await?;
        Ok(envelope.product)
    }

    pub async fn update_product(
        &self,
        product_id: &str,
        input: &ShopifyProductInput,
    ) -> Result<ShopifyProduct, GatewayError> {
        let body = json!({ "product": self.rest.to_json(input)? });
        let envelope: ProductEnvelope = self
            .rest
            .put(
                &format!("products/{}.json", self.rest.segment(product_id)?),
                RequestOptions::new().json(body),
            )
            .await?;
        Ok(envelope.product)
    }

    pub async fn delete_product(&self, product_id: &str) -> Result<(), GatewayError> {
        let _: IgnoredAny = self
            .rest
            .delete(
                &format!("products/{}.json", self.rest.segment(product_id)?),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }
}
