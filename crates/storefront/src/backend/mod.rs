//! Aprova Fácil backend REST API client.
//!
//! # Architecture
//!
//! - The backend owns customers, orders and payments; the storefront keeps
//!   nothing but the session
//! - Authenticated calls carry the customer's bearer token
//! - `X-API-Key` is added to every call when configured
//! - Product listings and the payment public key are cached with `moka`
//!   (5-minute TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use aprova_facil_storefront::backend::BackendClient;
//!
//! let backend = BackendClient::new(&config.backend)?;
//! let token = backend.login("maria@exemplo.com.br", &password).await?;
//! let me = backend.me(&token).await?;
//! ```

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use aprova_facil_core::{OrderId, PaymentId, PaymentMethod, PersonType, ProductId};

use crate::config::BackendConfig;
pub use types::*;

const CACHE_TTL: Duration = Duration::from_secs(300);
const PRODUCTS_KEY: &str = "products";
const PUBLIC_KEY_KEY: &str = "public_key";

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl BackendError {
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }

    /// 4xx responses: the request was understood and refused.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Api { status: 400..=499, .. })
    }

    /// Message safe to show to the customer.
    ///
    /// Client errors carry the backend's own wording (e.g. "Email já
    /// cadastrado"); anything else collapses to the generic fallback.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Api { status: 400..=499, message, .. } => message,
            _ => ApiErrorBody::FALLBACK_MESSAGE,
        }
    }
}

/// Client for the Aprova Fácil backend API.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    config: BackendConfig,
    products: Cache<&'static str, Arc<Vec<ProductResponse>>>,
    public_key: Cache<&'static str, String>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key() {
            let mut value = HeaderValue::from_str(key)
                .map_err(|e| BackendError::Parse(format!("Invalid API key format: {e}")))?;
            value.set_sensitive(true);
            headers.insert("X-API-Key", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let products = Cache::builder()
            .max_capacity(1)
            .time_to_live(CACHE_TTL)
            .build();
        let public_key = Cache::builder()
            .max_capacity(1)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                config: config.clone(),
                products,
                public_key,
            }),
        })
    }

    fn request(&self, method: Method, path: &str, token: Option<&SecretString>) -> RequestBuilder {
        let builder = self
            .inner
            .client
            .request(method, self.inner.config.endpoint(path));
        match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and decode the JSON body.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, BackendError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .unwrap_or_default()
                .into_message();
            debug!(status = %status, message = %message, "Backend returned non-success status");
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            BackendError::Parse(e.to_string())
        })
    }

    /// Send a request whose response body is irrelevant.
    async fn send_ignoring_body(&self, builder: RequestBuilder) -> Result<(), BackendError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(BackendError::Api {
            status: status.as_u16(),
            message: serde_json::from_str::<ApiErrorBody>(&text)
                .unwrap_or_default()
                .into_message(),
        })
    }

    fn json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
        body: &B,
    ) -> RequestBuilder {
        self.request(method, path, token).json(body)
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// `GET /health`
    ///
    /// # Errors
    ///
    /// Returns error if the backend is unreachable or unhealthy.
    pub async fn health(&self) -> Result<(), BackendError> {
        self.send_ignoring_body(self.request(Method::GET, "/health", None))
            .await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the registration.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest<'_>) -> Result<UserResponse, BackendError> {
        self.send(self.json(Method::POST, "/api/auth/register", None, request))
            .await
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Api` with status 401 for bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SecretString, BackendError> {
        let token: Token = self
            .send(self.json(
                Method::POST,
                "/api/auth/login",
                None,
                &LoginRequest { email, password },
            ))
            .await?;
        if !token.token_type.is_empty() && !token.token_type.eq_ignore_ascii_case("bearer") {
            debug!(token_type = %token.token_type, "Unexpected token type");
        }
        Ok(SecretString::from(token.access_token))
    }

    /// Invalidate the token on the backend.
    ///
    /// # Errors
    ///
    /// Returns error if the call fails; callers treat logout as best-effort.
    pub async fn logout(&self, token: &SecretString) -> Result<(), BackendError> {
        self.send_ignoring_body(self.request(Method::POST, "/api/auth/logout", Some(token)))
            .await
    }

    /// The customer owning `token`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Api` with status 401 when the token expired.
    pub async fn me(&self, token: &SecretString) -> Result<UserResponse, BackendError> {
        self.send(self.request(Method::GET, "/api/auth/me", Some(token)))
            .await
    }

    /// Update the customer's profile and address.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the update.
    pub async fn update_me(
        &self,
        token: &SecretString,
        update: &UserUpdate<'_>,
    ) -> Result<UserResponse, BackendError> {
        self.send(self.json(Method::PATCH, "/api/auth/me", Some(token), update))
            .await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Active products, cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns error if the listing cannot be fetched (failures are not cached).
    pub async fn products(&self) -> Result<Arc<Vec<ProductResponse>>, BackendError> {
        if let Some(cached) = self.inner.products.get(PRODUCTS_KEY).await {
            debug!("Product listing cache hit");
            return Ok(cached);
        }

        let products: Vec<ProductResponse> = self
            .send(self.request(Method::GET, "/api/products", None))
            .await?;
        let products = Arc::new(products);
        self.inner
            .products
            .insert(PRODUCTS_KEY, Arc::clone(&products))
            .await;
        Ok(products)
    }

    /// # Errors
    ///
    /// Returns `BackendError::Api` with status 404 for unknown slugs.
    pub async fn product_by_slug(&self, slug: &str) -> Result<ProductResponse, BackendError> {
        let path = format!("/api/products/slug/{}", urlencoding::encode(slug));
        self.send(self.request(Method::GET, &path, None)).await
    }

    /// Backend id for a catalog slug, from the cached listing when possible.
    ///
    /// # Errors
    ///
    /// Returns error if neither the listing nor the slug lookup knows it.
    pub async fn resolve_product_id(&self, slug: &str) -> Result<ProductId, BackendError> {
        match self.products().await {
            Ok(products) => {
                if let Some(product) = products.iter().find(|p| p.slug == slug) {
                    return Ok(product.id);
                }
            }
            Err(e) => debug!(error = %e, "Product listing unavailable, trying slug lookup"),
        }
        Ok(self.product_by_slug(slug).await?.id)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// # Errors
    ///
    /// Returns error if the orders cannot be fetched.
    pub async fn orders(&self, token: &SecretString) -> Result<Vec<OrderResponse>, BackendError> {
        self.send(self.request(Method::GET, "/api/orders", Some(token)))
            .await
    }

    /// Create a single-item order.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the order.
    #[instrument(skip(self, token))]
    pub async fn create_order(
        &self,
        token: &SecretString,
        product_id: ProductId,
        person_type: PersonType,
    ) -> Result<OrderResponse, BackendError> {
        let body = OrderCreate {
            items: vec![OrderItemCreate {
                product_id,
                quantity: 1,
            }],
            person_type,
            notes: None,
        };
        self.send(self.json(Method::POST, "/api/orders", Some(token), &body))
            .await
    }

    /// # Errors
    ///
    /// Returns error if the order cannot be fetched.
    pub async fn order(
        &self,
        token: &SecretString,
        order_id: OrderId,
    ) -> Result<OrderResponse, BackendError> {
        self.send(self.request(
            Method::GET,
            &format!("/api/orders/{order_id}"),
            Some(token),
        ))
        .await
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Create a hosted-checkout preference (Pix/boleto).
    ///
    /// # Errors
    ///
    /// Returns error if the preference cannot be created.
    #[instrument(skip(self, token))]
    pub async fn create_preference(
        &self,
        token: &SecretString,
        order_id: OrderId,
        payment_method: PaymentMethod,
    ) -> Result<PreferenceResponse, BackendError> {
        let body = PreferenceRequest {
            order_id,
            payment_method,
        };
        self.send(self.json(Method::POST, "/api/payment/preference", Some(token), &body))
            .await
    }

    /// Charge a tokenized card.
    ///
    /// # Errors
    ///
    /// Returns error if the backend call fails. A declined card is a
    /// successful call with status `rejected`.
    #[instrument(skip(self, token, request), fields(order_id = %request.order_id))]
    pub async fn process_payment(
        &self,
        token: &SecretString,
        request: &CardPaymentRequest,
    ) -> Result<PaymentResponse, BackendError> {
        self.send(self.json(Method::POST, "/api/payment/process", Some(token), request))
            .await
    }

    /// # Errors
    ///
    /// Returns error if the payment cannot be fetched.
    pub async fn payment(
        &self,
        token: &SecretString,
        payment_id: PaymentId,
    ) -> Result<PaymentResponse, BackendError> {
        self.send(self.request(
            Method::GET,
            &format!("/api/payment/{payment_id}"),
            Some(token),
        ))
        .await
    }

    /// Latest payment for an order.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Api` with status 404 when the order has no
    /// payment yet.
    pub async fn payment_for_order(
        &self,
        token: &SecretString,
        order_id: OrderId,
    ) -> Result<PaymentResponse, BackendError> {
        self.send(self.request(
            Method::GET,
            &format!("/api/payment/order/{order_id}"),
            Some(token),
        ))
        .await
    }

    /// Payment provider public key, cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns error if the key cannot be fetched or is empty.
    pub async fn public_key(&self) -> Result<String, BackendError> {
        if let Some(key) = self.inner.public_key.get(PUBLIC_KEY_KEY).await {
            return Ok(key);
        }

        let response: PublicKeyResponse = self
            .send(self.request(Method::GET, "/api/payment/public-key", None))
            .await?;
        if response.public_key.trim().is_empty() {
            return Err(BackendError::Parse("empty public key".to_string()));
        }
        self.inner
            .public_key
            .insert(PUBLIC_KEY_KEY, response.public_key.clone())
            .await;
        Ok(response.public_key)
    }
}
