//! UnifiedApiClient - One entry point for outbound calls to every provider.
//!
//! A provider client is built only when its sub-configuration is present.
//! Unified operations match over the closed [`Provider`] set; each arm owns
//! that provider's field mapping.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::adapters::godaddy::{
    DomainAvailability, DomainPurchaseRequest, DomainPurchaseResponse, GoDaddyClient,
    GoDaddyDomain, HostingAccount, HostingProvisionRequest,
};
use crate::adapters::rest::ListParams;
use crate::adapters::shopify::{ShopifyClient, ShopifyOrder, ShopifyOrderInput, ShopifyProduct};
use crate::adapters::square::{
    CreatePaymentRequest, SquareClient, SquareMoney, SquareOrder, SquareOrderInput, SquarePayment,
};
use crate::adapters::stripe::{CreatePaymentIntentRequest, StripeClient, StripePaymentIntent};
use crate::adapters::woocommerce::{WooCommerceClient, WooOrder, WooOrderInput, WooProduct};
use crate::config::UnifiedConfig;
use crate::domain::{GatewayError, Provider};

/// Provider-neutral payment request.
///
/// `metadata` carries provider-specific fields. Square reads `source_id`,
/// `idempotency_key` and optionally `location_id` from it. Stripe forwards
/// every entry as payment intent metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentRequest {
    /// Amount in the smallest currency unit.
    pub amount: i64,
    pub currency: String,
    pub metadata: Map<String, Value>,
}

impl PaymentRequest {
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "provider", content = "order", rename_all = "lowercase")]
pub enum ProviderOrder {
    Shopify(ShopifyOrder),
    Square(SquareOrder),
    WooCommerce(WooOrder),
}

impl ProviderOrder {
    pub fn provider(&self) -> Provider {
        match self {
            ProviderOrder::Shopify(_) => Provider::Shopify,
            ProviderOrder::Square(_) => Provider::Square,
            ProviderOrder::WooCommerce(_) => Provider::WooCommerce,
        }
    }

    /// Provider-assigned order id.
    pub fn id(&self) -> String {
        match self {
            ProviderOrder::Shopify(order) => order.id.to_string(),
            ProviderOrder::Square(order) => order.id.clone(),
            ProviderOrder::WooCommerce(order) => order.id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "provider", content = "payment", rename_all = "lowercase")]
pub enum ProviderPayment {
    Stripe(StripePaymentIntent),
    Square(SquarePayment),
}

impl ProviderPayment {
    pub fn provider(&self) -> Provider {
        match self {
            ProviderPayment::Stripe(_) => Provider::Stripe,
            ProviderPayment::Square(_) => Provider::Square,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ProviderPayment::Stripe(intent) => &intent.id,
            ProviderPayment::Square(payment) => &payment.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "provider", content = "products", rename_all = "lowercase")]
pub enum ProviderProducts {
    Shopify(Vec<ShopifyProduct>),
    WooCommerce(Vec<WooProduct>),
}

impl ProviderProducts {
    pub fn len(&self) -> usize {
        match self {
            ProviderProducts::Shopify(products) => products.len(),
            ProviderProducts::WooCommerce(products) => products.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Façade over the configured provider clients.
#[derive(Debug, Clone)]
pub struct UnifiedApiClient {
    shopify: Option<ShopifyClient>,
    godaddy: Option<GoDaddyClient>,
    stripe: Option<StripeClient>,
    square: Option<SquareClient>,
    woocommerce: Option<WooCommerceClient>,
}

impl UnifiedApiClient {
    pub fn new(config: UnifiedConfig) -> Result<Self, GatewayError> {
        let timeout = config.timeout();
        let client = Self {
            shopify: config
                .shopify
                .as_ref()
                .map(|c| ShopifyClient::new(c, timeout))
                .transpose()?,
            godaddy: config
                .godaddy
                .as_ref()
                .map(|c| GoDaddyClient::new(c, timeout))
                .transpose()?,
            stripe: config
                .stripe
                .as_ref()
                .map(|c| StripeClient::new(c, timeout))
                .transpose()?,
            square: config
                .square
                .as_ref()
                .map(|c| SquareClient::new(c, timeout))
                .transpose()?,
            woocommerce: config
                .woocommerce
                .as_ref()
                .map(|c| WooCommerceClient::new(c, timeout))
                .transpose()?,
        };

        tracing::info!(
            providers = ?client.configured_providers(),
            timeout_secs = timeout.as_secs(),
            "Unified API client initialized"
        );
        Ok(client)
    }

    // ─── Per-provider access ───

    pub fn shopify(&self) -> Result<&ShopifyClient, GatewayError> {
        self.shopify
            .as_ref()
            .ok_or(GatewayError::not_configured(Provider::Shopify))
    }

    pub fn godaddy(&self) -> Result<&GoDaddyClient, GatewayError> {
        self.godaddy
            .as_ref()
            .ok_or(GatewayError::not_configured(Provider::GoDaddy))
    }

    pub fn stripe(&self) -> Result<&StripeClient, GatewayError> {
        self.stripe
            .as_ref()
            .ok_or(GatewayError::not_configured(Provider::Stripe))
    }

    pub fn square(&self) -> Result<&SquareClient, GatewayError> {
        self.square
            .as_ref()
            .ok_or(GatewayError::not_configured(Provider::Square))
    }

    pub fn woocommerce(&self) -> Result<&WooCommerceClient, GatewayError> {
        self.woocommerce
            .as_ref()
            .ok_or(GatewayError::not_configured(Provider::WooCommerce))
    }

    pub fn is_configured(&self, provider: Provider) -> bool {
        match provider {
            Provider::Shopify => self.shopify.is_some(),
            Provider::GoDaddy => self.godaddy.is_some(),
            Provider::Stripe => self.stripe.is_some(),
            Provider::Square => self.square.is_some(),
            Provider::WooCommerce => self.woocommerce.is_some(),
        }
    }

    pub fn configured_providers(&self) -> Vec<Provider> {
        Provider::ALL
            .iter()
            .copied()
            .filter(|p| self.is_configured(*p))
            .collect()
    }

    // ─── Unified operations ───

    pub async fn get_order(
        &self,
        provider: Provider,
        order_id: &str,
    ) -> Result<ProviderOrder, GatewayError> {
        log_call(provider, "get_order");
        match provider {
            Provider::Shopify => Ok(ProviderOrder::Shopify(
                self.shopify()?.get_order(order_id).await?,
            )),
            Provider::Square => Ok(ProviderOrder::Square(
                self.square()?.get_order(order_id).await?,
            )),
            Provider::WooCommerce => Ok(ProviderOrder::WooCommerce(
                self.woocommerce()?.get_order(order_id).await?,
            )),
            Provider::Stripe | Provider::GoDaddy => {
                Err(GatewayError::unsupported("get_order", provider))
            }
        }
    }

    /// Creates an order from a provider-shaped JSON payload.
    pub async fn create_order(
        &self,
        provider: Provider,
        payload: Value,
    ) -> Result<ProviderOrder, GatewayError> {
        log_call(provider, "create_order");
        match provider {
            Provider::Shopify => {
                let client = self.shopify()?;
                let input: ShopifyOrderInput = parse_payload(provider, payload)?;
                Ok(ProviderOrder::Shopify(client.create_order(&input).await?))
            }
            Provider::Square => {
                let client = self.square()?;
                let (input, idempotency_key) = square_order_input(payload)?;
                let order = client
                    .create_order(&input, idempotency_key.as_deref())
                    .await?;
                Ok(ProviderOrder::Square(order))
            }
            Provider::WooCommerce => {
                let client = self.woocommerce()?;
                let input: WooOrderInput = parse_payload(provider, payload)?;
                Ok(ProviderOrder::WooCommerce(client.create_order(&input).await?))
            }
            Provider::Stripe | Provider::GoDaddy => {
                Err(GatewayError::unsupported("create_order", provider))
            }
        }
    }

    pub async fn create_payment(
        &self,
        provider: Provider,
        request: PaymentRequest,
    ) -> Result<ProviderPayment, GatewayError> {
        log_call(provider, "create_payment");
        match provider {
            Provider::Stripe => {
                let client = self.stripe()?;
                validate_amount(provider, &request)?;
                let intent_request = stripe_payment_intent(&request);
                Ok(ProviderPayment::Stripe(
                    client.create_payment_intent(&intent_request).await?,
                ))
            }
            Provider::Square => {
                let client = self.square()?;
                validate_amount(provider, &request)?;
                let payment_request = square_payment(&request)?;
                Ok(ProviderPayment::Square(
                    client.create_payment(&payment_request).await?,
                ))
            }
            Provider::Shopify | Provider::GoDaddy | Provider::WooCommerce => {
                Err(GatewayError::unsupported("create_payment", provider))
            }
        }
    }

    pub async fn get_products(
        &self,
        provider: Provider,
        params: &ListParams,
    ) -> Result<ProviderProducts, GatewayError> {
        log_call(provider, "get_products");
        match provider {
            Provider::Shopify => Ok(ProviderProducts::Shopify(
                self.shopify()?.list_products(params).await?,
            )),
            Provider::WooCommerce => Ok(ProviderProducts::WooCommerce(
                self.woocommerce()?.list_products(params).await?,
            )),
            Provider::GoDaddy | Provider::Stripe | Provider::Square => {
                Err(GatewayError::unsupported("get_products", provider))
            }
        }
    }

    // ─── GoDaddy passthroughs ───

    pub async fn list_domains(&self, params: &ListParams) -> Result<Vec<GoDaddyDomain>, GatewayError> {
        log_call(Provider::GoDaddy, "list_domains");
        self.godaddy()?.list_domains(params).await
    }

    pub async fn check_domain_availability(
        &self,
        domain: &str,
    ) -> Result<DomainAvailability, GatewayError> {
        log_call(Provider::GoDaddy, "check_domain_availability");
        self.godaddy()?.check_availability(domain).await
    }

    pub async fn purchase_domain(
        &self,
        request: &DomainPurchaseRequest,
    ) -> Result<DomainPurchaseResponse, GatewayError> {
        log_call(Provider::GoDaddy, "purchase_domain");
        self.godaddy()?.purchase_domain(request).await
    }

    pub async fn list_hosting_accounts(&self) -> Result<Vec<HostingAccount>, GatewayError> {
        log_call(Provider::GoDaddy, "list_hosting_accounts");
        self.godaddy()?.list_hosting_accounts().await
    }

    pub async fn provision_hosting(
        &self,
        request: &HostingProvisionRequest,
    ) -> Result<HostingAccount, GatewayError> {
        log_call(Provider::GoDaddy, "provision_hosting");
        self.godaddy()?.provision_hosting(request).await
    }
}

fn log_call(provider: Provider, operation: &'static str) {
    tracing::info!(provider = %provider, operation, "Unified API call");
}

fn parse_payload<T: serde::de::DeserializeOwned>(
    provider: Provider,
    payload: Value,
) -> Result<T, GatewayError> {
    serde_json::from_value(payload)
        .map_err(|e| GatewayError::validation(provider, format!("invalid order payload: {}", e)))
}

fn validate_amount(provider: Provider, request: &PaymentRequest) -> Result<(), GatewayError> {
    if request.amount <= 0 {
        return Err(GatewayError::validation(provider, "amount must be positive"));
    }
    if request.currency.trim().is_empty() {
        return Err(GatewayError::validation(provider, "currency is required"));
    }
    Ok(())
}

/// Square orders need `location_id` and `line_items`; `idempotency_key`
/// travels beside the order rather than inside it.
fn square_order_input(payload: Value) -> Result<(SquareOrderInput, Option<String>), GatewayError> {
    let invalid = |message: &str| GatewayError::validation(Provider::Square, message);

    let Value::Object(mut fields) = payload else {
        return Err(invalid("order payload must be a JSON object"));
    };
    match fields.get("location_id") {
        Some(Value::String(id)) if !id.trim().is_empty() => {}
        _ => return Err(invalid("location_id is required")),
    }
    if !matches!(fields.get("line_items"), Some(Value::Array(_))) {
        return Err(invalid("line_items is required"));
    }
    let idempotency_key = match fields.remove("idempotency_key") {
        None | Some(Value::Null) => None,
        Some(Value::String(key)) => Some(key),
        Some(_) => return Err(invalid("idempotency_key must be a string")),
    };

    let input = parse_payload(Provider::Square, Value::Object(fields))?;
    Ok((input, idempotency_key))
}

fn metadata_str<'a>(metadata: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    metadata
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn square_payment(request: &PaymentRequest) -> Result<CreatePaymentRequest, GatewayError> {
    let required = |key: &str| {
        metadata_str(&request.metadata, key).ok_or_else(|| {
            GatewayError::validation(Provider::Square, format!("metadata.{} is required", key))
        })
    };

    Ok(CreatePaymentRequest {
        source_id: required("source_id")?.to_string(),
        idempotency_key: required("idempotency_key")?.to_string(),
        amount_money: SquareMoney::new(request.amount, request.currency.as_str()),
        location_id: metadata_str(&request.metadata, "location_id").map(str::to_string),
        order_id: metadata_str(&request.metadata, "order_id").map(str::to_string),
        reference_id: metadata_str(&request.metadata, "reference_id").map(str::to_string),
        note: metadata_str(&request.metadata, "note").map(str::to_string),
    })
}

/// Stripe metadata values are strings; other JSON values are rendered as
/// JSON text and nulls are dropped.
fn stripe_payment_intent(request: &PaymentRequest) -> CreatePaymentIntentRequest {
    request.metadata.iter().fold(
        CreatePaymentIntentRequest::new(request.amount, request.currency.as_str()),
        |intent, (key, value)| match value {
            Value::Null => intent,
            Value::String(s) => intent.with_metadata(key.as_str(), s.as_str()),
            other => intent.with_metadata(key.as_str(), other.to_string()),
        },
    )
}
