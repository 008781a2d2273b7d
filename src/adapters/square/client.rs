//! Square Connect v2 client.
//!
//! Every request carries the `Square-Version` header from configuration.
//! Mutating calls take a caller-supplied idempotency key so retries are safe.

use std::time::Duration;

use secrecy::ExposeSecret;
use serde_json::{json, Value};

use super::types::{
    CreatePaymentRequest, LocationEnvelope, LocationsEnvelope, OrderEnvelope, PaymentEnvelope,
    RefundEnvelope, RefundPaymentRequest, SquareLocation, SquareOrder, SquareOrderInput,
    SquarePayment, SquarePaymentList, SquareRefund,
};
use crate::adapters::rest::{AuthScheme, ListParams, RequestOptions, RestClient};
use crate::config::SquareConfig;
use crate::domain::{GatewayError, Provider};

const VERSION_HEADER: &str = "Square-Version";

#[derive(Debug, Clone)]
pub struct SquareClient {
    rest: RestClient,
}

impl SquareClient {
    pub fn new(config: &SquareConfig, timeout: Duration) -> Result<Self, GatewayError> {
        let rest = RestClient::new(
            Provider::Square,
            config.api_base_url(),
            AuthScheme::bearer(config.access_token.expose_secret().as_str()),
            timeout,
        )?
        .with_default_header(VERSION_HEADER, config.api_version.clone());
        Ok(Self { rest })
    }

    pub fn base_url(&self) -> &str {
        self.rest.base_url()
    }

    fn require_idempotency_key(key: &str) -> Result<(), GatewayError> {
        if key.trim().is_empty() {
            return Err(GatewayError::validation(
                Provider::Square,
                "idempotency_key must not be empty",
            ));
        }
        Ok(())
    }

    // ─── Payments ───

    pub async fn create_payment(
        &self,
        request: &CreatePaymentRequest,
    ) -> Result<SquarePayment, GatewayError> {
        Self::require_idempotency_key(&request.idempotency_key)?;
        let body = self.rest.to_json(request)?;
        let envelope: PaymentEnvelope = self
            .rest
            .post("payments", RequestOptions::new().json(body))
            .await?;
        tracing::info!(
            payment_id = %envelope.payment.id,
            status = ?envelope.payment.status,
            "Square payment created"
        );
        Ok(envelope.payment)
    }

    pub async fn get_payment(&self, payment_id: &str) -> Result<SquarePayment, GatewayError> {
        let envelope: PaymentEnvelope = self
            .rest
            .get(&format!("payments/{}", self.rest.segment(payment_id)?), RequestOptions::new())
            .await?;
        Ok(envelope.payment)
    }

    pub async fn list_payments(&self, params: &ListParams) -> Result<SquarePaymentList, GatewayError> {
        self.rest
            .get(
                "payments",
                RequestOptions::new().query_pairs(params.to_query("limit", None, Some("cursor"))),
            )
            .await
    }

    pub async fn create_refund(
        &self,
        request: &RefundPaymentRequest,
    ) -> Result<SquareRefund, GatewayError> {
        Self::require_idempotency_key(&request.idempotency_key)?;
        let body = self.rest.to_json(request)?;
        let envelope: RefundEnvelope = self
            .rest
            .post("refunds", RequestOptions::new().json(body))
            .await?;
        Ok(envelope.refund)
    }

    // ─── Orders ───

    pub async fn create_order(
        &self,
        order: &SquareOrderInput,
        idempotency_key: Option<&str>,
    ) -> Result<SquareOrder, GatewayError> {
        let body = self.order_body(order, idempotency_key)?;
        let envelope: OrderEnvelope = self
            .rest
            .post("orders", RequestOptions::new().json(body))
            .await?;
        tracing::info!(
            order_id = %envelope.order.id,
            location_id = %envelope.order.location_id,
            "Square order created"
        );
        Ok(envelope.order)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<SquareOrder, GatewayError> {
        let envelope: OrderEnvelope = self
            .rest
            .get(&format!("orders/{}", self.rest.segment(order_id)?), RequestOptions::new())
            .await?;
        Ok(envelope.order)
    }

    /// Sparse update; `order.version` must match the current version.
    pub async fn update_order(
        &self,
        order_id: &str,
        order: &SquareOrderInput,
        idempotency_key: Option<&str>,
    ) -> Result<SquareOrder, GatewayError> {
        let body = self.order_body(order, idempotency_key)?;
        let envelope: OrderEnvelope = self
            .rest
            .put(
                &format!("orders/{}", self.rest.segment(order_id)?),
                RequestOptions::new().json(body),
            )
            .await?;
        Ok(envelope.order)
    }

    fn order_body(
        &self,
        order: &SquareOrderInput,
        idempotency_key: Option<&str>,
    ) -> Result<Value, GatewayError> {
        let mut body = json!({ "order": self.rest.to_json(order)? });
        if let Some(key) = idempotency_key {
            body["idempotency_key"] = Value::String(key.to_string());
        }
        Ok(body)
    }

    // ─── Locations ───

    pub async fn list_locations(&self) -> Result<Vec<SquareLocation>, GatewayError> {
        let envelope: LocationsEnvelope = self.rest.get("locations", RequestOptions::new()).await?;
        Ok(envelope.locations)
    }

    pub async fn get_location(&self, location_id: &str) -> Result<SquareLocation, GatewayError> {
        let envelope: LocationEnvelope = self
            .rest
            .get(&format!("locations/{}", self.rest.segment(location_id)?), RequestOptions::new())
            .await?;
        Ok(envelope.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rest::DEFAULT_TIMEOUT;
    use crate::adapters::square::{SquareLineItem, SquareMoney};
    use wiremock::matchers::{bearer_token, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, SquareClient) {
        let server = MockServer::start().await;
        let config = SquareConfig::new("sq_token").with_base_url(server.uri());
        let client = SquareClient::new(&config, DEFAULT_TIMEOUT).unwrap();
        (server, client)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Payments
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn create_payment_sends_version_and_key() {
        let (server, client) = setup().await;
        Mock::given(method("POST"))
            .and(path("/payments"))
            .and(bearer_token("sq_token"))
            .and(header("Square-Version", "2024-01-18"))
            .and(body_json(json!({
                "source_id": "cnon:card-nonce-ok",
                "idempotency_key": "key-1",
                "amount_money": {"amount": 1500, "currency": "USD"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "payment": {"id": "pay_1", "status": "COMPLETED"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = CreatePaymentRequest {
            source_id: "cnon:card-nonce-ok".to_string(),
            idempotency_key: "key-1".to_string(),
            amount_money: SquareMoney::new(1500, "usd"),
            ..Default::default()
        };
        let payment = client.create_payment(&request).await.unwrap();

        assert_eq!(payment.id, "pay_1");
        assert_eq!(payment.status.as_deref(), Some("COMPLETED"));
    }

    #[tokio::test]
    async fn blank_idempotency_key_never_reaches_network() {
        let (server, client) = setup().await;

        let request = CreatePaymentRequest {
            source_id: "cnon:x".to_string(),
            idempotency_key: "  ".to_string(),
            amount_money: SquareMoney::new(1, "USD"),
            ..Default::default()
        };
        let err = client.create_payment(&request).await.unwrap_err();

        assert!(matches!(err, GatewayError::Validation { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_payments_forwards_cursor() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/payments"))
            .and(query_param("cursor", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "payments": [{"id": "p1"}, {"id": "p2"}],
                "cursor": "def"
            })))
            .mount(&server)
            .await;

        let page = client
            .list_payments(&ListParams::new().with_cursor("abc"))
            .await
            .unwrap();

        assert_eq!(page.payments.len(), 2);
        assert_eq!(page.cursor.as_deref(), Some("def"));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Orders
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn create_order_wraps_body() {
        let (server, client) = setup().await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .and(body_json(json!({
                "order": {
                    "location_id": "L1",
                    "line_items": [{"name": "Latte", "quantity": "1"}]
                },
                "idempotency_key": "order-1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "order": {"id": "o1", "location_id": "L1", "state": "OPEN", "version": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let order = SquareOrderInput {
            location_id: "L1".to_string(),
            line_items: vec![SquareLineItem {
                name: Some("Latte".to_string()),
                quantity: "1".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let created = client.create_order(&order, Some("order-1")).await.unwrap();

        assert_eq!(created.id, "o1");
        assert_eq!(created.version, Some(1));
    }

    #[tokio::test]
    async fn update_order_uses_put() {
        let (server, client) = setup().await;
        Mock::given(method("PUT"))
            .and(path("/orders/o1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "order": {"id": "o1", "location_id": "L1", "version": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let order = SquareOrderInput {
            location_id: "L1".to_string(),
            version: Some(1),
            ..Default::default()
        };
        let updated = client.update_order("o1", &order, None).await.unwrap();

        assert_eq!(updated.version, Some(2));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Locations
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn list_locations_unwraps_envelope() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/locations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "locations": [{"id": "L1", "name": "Main", "status": "ACTIVE"}]
            })))
            .mount(&server)
            .await;

        let locations = client.list_locations().await.unwrap();

        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].name.as_deref(), Some("Main"));
    }

    #[test]
    fn sandbox_is_default() {
        let client = SquareClient::new(&SquareConfig::new("t"), DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "https://connect.squareupsandbox.com/v2");
    }
}
