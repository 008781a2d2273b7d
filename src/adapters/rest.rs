//! Shared REST transport for provider clients.
//!
//! Every outbound call goes through [`RestClient::request`], which builds the
//! absolute URL, attaches the provider's auth scheme, issues the call and maps
//! the outcome into [`GatewayError`].

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::domain::{GatewayError, Provider};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How a provider authenticates API calls.
#[derive(Clone)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    Bearer(SecretString),
    /// Token in a provider-specific header.
    Header {
        name: &'static str,
        value: SecretString,
    },
    /// HTTP Basic.
    Basic {
        username: String,
        password: SecretString,
    },
    /// `Authorization: sso-key <key>:<secret>`
    SsoKey {
        key: SecretString,
        secret: SecretString,
    },
}

impl AuthScheme {
    pub fn bearer(token: impl Into<String>) -> Self {
        AuthScheme::Bearer(SecretString::new(token.into()))
    }

    pub fn header(name: &'static str, value: impl Into<String>) -> Self {
        AuthScheme::Header {
            name,
            value: SecretString::new(value.into()),
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthScheme::Basic {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }

    pub fn sso_key(key: impl Into<String>, secret: impl Into<String>) -> Self {
        AuthScheme::SsoKey {
            key: SecretString::new(key.into()),
            secret: SecretString::new(secret.into()),
        }
    }

    fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            AuthScheme::Bearer(token) => builder.bearer_auth(token.expose_secret()),
            AuthScheme::Header { name, value } => builder.header(*name, value.expose_secret()),
            AuthScheme::Basic { username, password } => {
                builder.basic_auth(username, Some(password.expose_secret()))
            }
            AuthScheme::SsoKey { key, secret } => builder.header(
                AUTHORIZATION,
                format!("sso-key {}:{}", key.expose_secret(), secret.expose_secret()),
            ),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AuthScheme::Bearer(_) => "bearer",
            AuthScheme::Header { .. } => "header",
            AuthScheme::Basic { .. } => "basic",
            AuthScheme::SsoKey { .. } => "sso-key",
        }
    }
}

impl fmt::Debug for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthScheme::{}([REDACTED])", self.name())
    }
}

/// Request body encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
}

/// Per-request query, body and extra headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    query: Vec<(String, String)>,
    body: Option<RequestBody>,
    headers: Vec<(&'static str, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(pairs));
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// Pagination and filters for list operations.
///
/// Each client maps these onto its provider's parameter names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListParams {
    pub limit: Option<u32>,
    pub page: Option<u32>,
    pub cursor: Option<String>,
    /// Passed through verbatim as query parameters.
    pub filters: BTreeMap<String, String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Query pairs using the given names for limit, page and cursor.
    pub(crate) fn to_query(
        &self,
        limit_key: &str,
        page_key: Option<&str>,
        cursor_key: Option<&str>,
    ) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push((limit_key.to_string(), limit.to_string()));
        }
        if let (Some(key), Some(page)) = (page_key, self.page) {
            pairs.push((key.to_string(), page.to_string()));
        }
        if let (Some(key), Some(cursor)) = (cursor_key, &self.cursor) {
            pairs.push((key.to_string(), cursor.clone()));
        }
        pairs.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }
}

/// Authenticated HTTP client bound to one provider's base URL.
#[derive(Clone)]
pub struct RestClient {
    provider: Provider,
    base_url: String,
    auth: AuthScheme,
    default_headers: Vec<(&'static str, String)>,
    http: Client,
}

impl RestClient {
    pub fn new(
        provider: Provider,
        base_url: impl Into<String>,
        auth: AuthScheme,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        Ok(Self {
            provider,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
            default_headers: Vec::new(),
            http,
        })
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.default_headers.push((name, value.into()));
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Percent-encodes a caller-supplied id for use as one path segment.
    ///
    /// Empty ids and dot segments are rejected since they would address a
    /// different resource once the URL is normalized.
    pub fn segment(&self, value: &str) -> Result<String, GatewayError> {
        if value.is_empty() || value == "." || value == ".." {
            return Err(GatewayError::validation(
                self.provider,
                format!("invalid path segment {:?}", value),
            ));
        }
        Ok(urlencoding::encode(value).into_owned())
    }

    /// Serializes a typed input for a JSON body.
    pub fn to_json<B: Serialize>(&self, body: &B) -> Result<Value, GatewayError> {
        serde_json::to_value(body).map_err(|e| GatewayError::validation(self.provider, e.to_string()))
    }

    /// Issues a request and parses the response body.
    ///
    /// An empty body parses as JSON `null`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        let url = self.url(endpoint);
        tracing::debug!(
            provider = %self.provider,
            method = %method,
            endpoint = endpoint,
            "Sending provider request"
        );

        let mut builder = self.auth.apply(self.http.request(method.clone(), &url));
        for (name, value) in self.default_headers.iter().chain(options.headers.iter()) {
            builder = builder.header(*name, value);
        }
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        builder = match &options.body {
            Some(RequestBody::Json(body)) => builder.json(body),
            Some(RequestBody::Form(pairs)) => builder.form(pairs),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(
                provider = %self.provider,
                method = %method,
                endpoint = endpoint,
                error = %e,
                "Provider request failed"
            );
            GatewayError::Network {
                provider: self.provider,
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                provider = %self.provider,
                method = %method,
                endpoint = endpoint,
                status = status.as_u16(),
                "Provider API error"
            );
            return Err(GatewayError::ProviderApi {
                provider: self.provider,
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| GatewayError::Network {
            provider: self.provider,
            message: e.to_string(),
        })?;
        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };

        serde_json::from_slice(body).map_err(|e| {
            tracing::warn!(
                provider = %self.provider,
                endpoint = endpoint,
                error = %e,
                "Failed to decode provider response"
            );
            GatewayError::Decode {
                provider: self.provider,
                message: e.to_string(),
            }
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        self.request(Method::GET, endpoint, options).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        self.request(Method::POST, endpoint, options).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        self.request(Method::PUT, endpoint, options).await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        self.request(Method::PATCH, endpoint, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        self.request(Method::DELETE, endpoint, options).await
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
