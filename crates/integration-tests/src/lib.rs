//! Integration tests for the Aprova Fácil storefront.
//!
//! Each test spawns the real router on an ephemeral port, with the backend
//! API and the CEP service replaced by `wiremock` servers.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p aprova-facil-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `address` - CEP lookup and autofill endpoints
//! - `auth` - Login and registration flows
//! - `checkout` - Order creation, card widget relay and hosted checkout

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;

use aprova_facil_core::PersonType;
use aprova_facil_storefront::{AppState, StorefrontConfig, app};
use reqwest::{Client, Response, redirect};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Bearer token the mocked backend hands out.
pub const TEST_TOKEN: &str = "test-token";

/// Backend id of the `limpa-nome` plan in the mocked product listing.
pub const LIMPA_NOME_ID: i64 = 7;

/// Order id returned by the mocked order endpoint.
pub const ORDER_ID: i64 = 42;

/// A running storefront wired to mock upstreams.
pub struct TestApp {
    pub address: SocketAddr,
    pub backend: MockServer,
    pub viacep: MockServer,
    /// Cookie-keeping client that does not follow redirects.
    pub client: Client,
}

impl TestApp {
    /// Start the storefront with fresh mock servers.
    ///
    /// The product listing is mounted up front since every page that shows
    /// plans asks for it.
    pub async fn spawn() -> Self {
        let backend = MockServer::start().await;
        let viacep = MockServer::start().await;
        mount_products(&backend).await;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let address = listener.local_addr().expect("Listener has no address");

        let mut config = StorefrontConfig::new(
            format!("http://{address}"),
            backend.uri().parse().expect("Invalid backend mock URL"),
        );
        config.cep_lookup_url = viacep.uri().parse().expect("Invalid CEP mock URL");

        let state = AppState::new(config).expect("Failed to build app state");
        tokio::spawn(async move {
            axum::serve(
                listener,
                app(state).into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Storefront server failed");
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            address,
            backend,
            viacep,
            client,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.address)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST form request failed")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .expect("POST JSON request failed")
    }

    /// Log in as the default customer.
    pub async fn login(&self) {
        mount_login(&self.backend).await;
        let resp = self
            .post_form(
                "/auth/login",
                &[("email", "maria@example.com"), ("password", "segredo123")],
            )
            .await;
        assert_eq!(resp.status(), 303, "login should redirect");
        assert_eq!(location(&resp), "/?success=welcome");
    }

    /// Put a plan in the cart.
    pub async fn select_plan(&self, slug: &str, person_type: PersonType) {
        let resp = self
            .post_form(
                "/cart/select",
                &[("product_id", slug), ("person_type", person_type.code())],
            )
            .await;
        assert!(resp.status().is_redirection(), "select should redirect");
    }

    /// Log in, choose the plan and open the checkout page so the order is
    /// created. Returns the rendered page.
    pub async fn open_checkout(&self, person_type: PersonType) -> String {
        mount_order(&self.backend, person_type).await;
        self.login().await;
        self.select_plan("limpa-nome", person_type).await;

        let resp = self.get("/checkout").await;
        assert_eq!(resp.status(), 200);
        resp.text().await.expect("Failed to read checkout page")
    }

    /// Mount the card widget and report it ready. Returns the generation.
    pub async fn mount_widget(&self) -> u64 {
        let resp = self.post_json("/checkout/widget/mount", &json!({})).await;
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.expect("Invalid mount response");
        let generation = body["status"]["generation"]
            .as_u64()
            .expect("Mount response has no generation");

        let resp = self
            .post_json(
                "/checkout/widget/ready",
                &json!({ "generation": generation }),
            )
            .await;
        let body: Value = resp.json().await.expect("Invalid ready response");
        assert_eq!(body["status"]["state"], "ready");
        generation
    }
}

/// `Location` header of a redirect.
#[must_use]
pub fn location(resp: &Response) -> String {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

/// Card submission body for the given widget generation.
#[must_use]
pub fn card_submission(generation: u64) -> Value {
    json!({
        "generation": generation,
        "token": "card-token-123",
        "installments": 3,
        "payment_method_id": "visa",
        "issuer_id": "25",
    })
}

// ============================================================================
// Backend mocks
// ============================================================================

pub async fn mount_products(backend: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": LIMPA_NOME_ID,
                "name": "Limpa Nome",
                "slug": "limpa-nome",
                "description": "Remoção de negativações",
                "price_pf": "1500.00",
                "price_pj": "1800.00",
                "is_active": true
            }
        ])))
        .mount(backend)
        .await;
}

/// Profile returned by `GET /api/auth/me`.
#[must_use]
pub fn customer_profile() -> Value {
    json!({
        "id": 11,
        "name": "Maria Silva",
        "email": "maria@example.com",
        "cpf": "529.982.247-25",
        "phone": "(11) 98765-4321",
        "cep": "01310-100",
        "street": "Avenida Paulista",
        "number": "1000",
        "complement": "Apto 12",
        "neighborhood": "Bela Vista",
        "city": "São Paulo",
        "state": "SP",
        "is_admin": false
    })
}

pub async fn mount_login(backend: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TEST_TOKEN,
            "token_type": "bearer"
        })))
        .mount(backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(customer_profile()))
        .mount(backend)
        .await;
}

pub async fn mount_order(backend: &MockServer, person_type: PersonType) {
    let total = match person_type {
        PersonType::Pf => "1500.00",
        PersonType::Pj => "1800.00",
    };
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": ORDER_ID,
            "user_id": 11,
            "status": "pending",
            "person_type": person_type.code(),
            "subtotal": total,
            "total": total,
            "items": [{
                "id": 1,
                "product_id": LIMPA_NOME_ID,
                "product_name": "Limpa Nome",
                "quantity": 1,
                "unit_price": total,
                "total_price": total
            }]
        })))
        .mount(backend)
        .await;
}

pub async fn mount_public_key(backend: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/payment/public-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "public_key": "TEST-pk-123" })),
        )
        .mount(backend)
        .await;
}

/// Card payment response with the given provider status.
#[must_use]
pub fn payment_response(status: &str, status_detail: &str) -> Value {
    json!({
        "payment_id": 99,
        "order_id": ORDER_ID,
        "mp_payment_id": "1234567890",
        "method": "credit_card",
        "status": status,
        "status_detail": status_detail,
        "amount": "1500.00"
    })
}
