//! GoDaddy domains and hosting client.

use std::time::Duration;

use secrecy::ExposeSecret;
use serde::de::IgnoredAny;

use super::types::{
    DnsRecord, DomainAvailability, DomainPurchaseRequest, DomainPurchaseResponse, GoDaddyDomain,
    HostingAccount, HostingProvisionRequest,
};
use crate::adapters::rest::{AuthScheme, ListParams, RequestOptions, RestClient};
use crate::config::GoDaddyConfig;
use crate::domain::{GatewayError, Provider};

#[derive(Debug, Clone)]
pub struct GoDaddyClient {
    rest: RestClient,
}

impl GoDaddyClient {
    pub fn new(config: &GoDaddyConfig, timeout: Duration) -> Result<Self, GatewayError> {
        let rest = RestClient::new(
            Provider::GoDaddy,
            config.api_base_url(),
            AuthScheme::sso_key(config.api_key.as_str(), config.api_secret.expose_secret().as_str()),
            timeout,
        )?;
        Ok(Self { rest })
    }

    pub fn base_url(&self) -> &str {
        self.rest.base_url()
    }

    pub async fn list_domains(&self, params: &ListParams) -> Result<Vec<GoDaddyDomain>, GatewayError> {
        let query = params.to_query("limit", None, Some("marker"));
        self.rest
            .get("v1/domains", RequestOptions::new().query_pairs(query))
            .await
    }

    pub async fn get_domain(&self, domain: &str) -> Result<GoDaddyDomain, GatewayError> {
        self.rest
            .get(&format!("v1/domains/{}", self.rest.segment(domain)?), RequestOptions::new())
            .await
    }

    pub async fn check_availability(&self, domain: &str) -> Result<DomainAvailability, GatewayError> {
        self.rest
            .get(
                "v1/domains/available",
                RequestOptions::new().query("domain", domain),
            )
            .await
    }

    pub async fn purchase_domain(
        &self,
        request: &DomainPurchaseRequest,
    ) -> Result<DomainPurchaseResponse, GatewayError> {
        let body = self.rest.to_json(request)?;
        let response: DomainPurchaseResponse = self
            .rest
            .post("v1/domains/purchase", RequestOptions::new().json(body))
            .await?;
        tracing::info!(
            domain = %request.domain,
            order_id = ?response.order_id,
            "GoDaddy domain purchased"
        );
        Ok(response)
    }

    /// Records for `domain`, optionally limited to one record type.
    pub async fn get_dns_records(
        &self,
        domain: &str,
        record_type: Option<&str>,
    ) -> Result<Vec<DnsRecord>, GatewayError> {
        let endpoint = match record_type {
            Some(record_type) => format!(
                "v1/domains/{}/records/{}",
                self.rest.segment(domain)?,
                self.rest.segment(record_type)?
            ),
            None => format!("v1/domains/{}/records", self.rest.segment(domain)?),
        };
        self.rest.get(&endpoint, RequestOptions::new()).await
    }

    /// Adds or updates the given records, leaving others untouched.
    pub async fn update_dns_records(
        &self,
        domain: &str,
        records: &[DnsRecord],
    ) -> Result<(), GatewayError> {
        let body = self.rest.to_json(&records)?;
        let _: IgnoredAny = self
            .rest
            .patch(
                &format!("v1/domains/{}/records", self.rest.segment(domain)?),
                RequestOptions::new().json(body),
            )
            .await?;
        Ok(())
    }

    pub async fn list_hosting_accounts(&self) -> Result<Vec<HostingAccount>, GatewayError> {
        self.rest
            .get("v1/hosting/accounts", RequestOptions::new())
            .await
    }

    pub async fn provision_hosting(
        &self,
        request: &HostingProvisionRequest,
    ) -> Result<HostingAccount, GatewayError> {
        let body = self.rest.to_json(request)?;
        self.rest
            .post("v1/hosting/accounts", RequestOptions::new().json(body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rest::DEFAULT_TIMEOUT;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, GoDaddyClient) {
        let server = MockServer::start().await;
        let config = GoDaddyConfig::new("gd_key", "gd_secret").with_base_url(server.uri());
        let client = GoDaddyClient::new(&config, DEFAULT_TIMEOUT).unwrap();
        (server, client)
    }

    #[tokio::test]
    async fn check_availability_uses_sso_key() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/v1/domains/available"))
            .and(query_param("domain", "example.com"))
            .and(header("Authorization", "sso-key gd_key:gd_secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "available": true,
                "domain": "example.com",
                "definitive": true,
                "price": 11990000,
                "currency": "USD",
                "period": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let availability = client.check_availability("example.com").await.unwrap();

        assert!(availability.available);
        assert_eq!(availability.price, Some(11990000));
    }

    #[tokio::test]
    async fn list_domains_parses_camel_case() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/v1/domains"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"domain": "a.com", "domainId": 1, "status": "ACTIVE", "renewAuto": true},
                {"domain": "b.com", "domainId": 2, "status": "EXPIRED"}
            ])))
            .mount(&server)
            .await;

        let domains = client.list_domains(&ListParams::new()).await.unwrap();

        assert_eq!(domains.len(), 2);
        assert_eq!(domains[0].domain_id, Some(1));
        assert_eq!(domains[0].renew_auto, Some(true));
    }

    #[tokio::test]
    async fn update_dns_records_patches() {
        let (server, client) = setup().await;
        Mock::given(method("PATCH"))
            .and(path("/v1/domains/example.com/records"))
            .and(body_json(json!([
                {"type": "A", "name": "@", "data": "192.0.2.1", "ttl": 600}
            ])))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let records = vec![DnsRecord::new("A", "@", "192.0.2.1").with_ttl(600)];
        client
            .update_dns_records("example.com", &records)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn get_dns_records_by_type() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/v1/domains/example.com/records/MX"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"type": "MX", "name": "@", "data": "mail.example.com", "priority": 10}
            ])))
            .mount(&server)
            .await;

        let records = client
            .get_dns_records("example.com", Some("MX"))
            .await
            .unwrap();

        assert_eq!(records[0].priority, Some(10));
    }

    #[tokio::test]
    async fn provision_hosting_posts_plan() {
        let (server, client) = setup().await;
        Mock::given(method("POST"))
            .and(path("/v1/hosting/accounts"))
            .and(body_json(json!({"plan": "cpanel-starter", "domain": "example.com"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "accountId": "acc_1", "status": "PENDING"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = HostingProvisionRequest {
            plan: "cpanel-starter".to_string(),
            domain: Some("example.com".to_string()),
            ..Default::default()
        };
        let account = client.provision_hosting(&request).await.unwrap();

        assert_eq!(account.account_id.as_deref(), Some("acc_1"));
    }

    #[test]
    fn sandbox_is_default() {
        let client = GoDaddyClient::new(&GoDaddyConfig::new("k", "s"), DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "https://api.ote-godaddy.com");
    }
}
