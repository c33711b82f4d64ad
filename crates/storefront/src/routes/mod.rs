//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page (hero, stats, services, plans)
//! GET  /sobre                  - About page
//! GET  /servicos               - Services page
//! GET  /contato                - Contact form
//! POST /contato                - Contact form -> WhatsApp redirect
//! GET  /simular                - Credit simulation form
//! POST /simular                - Simulation form -> WhatsApp redirect
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (backend reachable)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Registration page
//! POST /auth/register          - Registration action
//! POST /auth/logout            - Logout action
//! GET  /login, /cadastro       - Aliases
//!
//! # Cart
//! POST /cart/select            - Select the single plan to buy
//! POST /cart/person-type       - Switch PF/PJ pricing
//! POST /cart/clear             - Drop the selection
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Checkout page (creates the order)
//! POST /checkout/method        - Change payment method
//! POST /checkout/widget/mount  - Card widget is being created
//! POST /checkout/widget/ready  - Card widget ready callback
//! POST /checkout/widget/error  - Card widget / SDK error callback
//! POST /checkout/card          - Card widget submit callback
//! POST /checkout/pix-boleto    - Create preference and redirect
//! POST /checkout/retry         - Rejected -> start over
//! GET  /checkout/status        - Current state (JSON)
//! GET  /checkout/config        - Widget settings (JSON)
//!
//! # Address
//! GET  /api/cep/{cep}          - CEP lookup (JSON)
//! POST /api/cep/autofill       - Merge lookup into submitted address (JSON)
//!
//! # Account (requires auth)
//! GET  /conta                  - Profile and orders
//! POST /conta                  - Update profile
//! GET  /conta/pedidos/{id}     - Order detail with payment
//! ```

pub mod account;
pub mod address;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod home;
pub mod pages;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::models::CurrentCustomer;
use crate::state::AppState;

// =============================================================================
// Shared page data
// =============================================================================

/// Data every page layout needs.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub nonce: String,
    pub customer_name: Option<String>,
    pub whatsapp_link: String,
}

impl PageContext {
    #[must_use]
    pub fn new(state: &AppState, nonce: &str, customer: Option<&CurrentCustomer>) -> Self {
        Self {
            nonce: nonce.to_owned(),
            customer_name: customer.map(|c| c.first_name().to_owned()),
            whatsapp_link: state.whatsapp().default_link(),
        }
    }
}

/// Query parameters for error/success display.
///
/// Values are message codes; unknown codes are not shown.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl MessageQuery {
    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        self.error.as_deref().and_then(message_for)
    }

    #[must_use]
    pub fn success_message(&self) -> Option<&'static str> {
        self.success.as_deref().and_then(message_for)
    }
}

/// Text for a flash message code.
#[must_use]
pub fn message_for(code: &str) -> Option<&'static str> {
    Some(match code {
        "login_required" => "Faça login para continuar",
        "no_product" => "Nenhum produto selecionado",
        "session" => "Sua sessão expirou. Tente novamente.",
        "payment" => "Erro ao processar pagamento.",
        "order" => "Não foi possível criar o pedido. Tente novamente.",
        "logged_out" => "Você saiu da sua conta.",
        "registered" => "Cadastro realizado! Bem-vindo ao Aprova Fácil!",
        "welcome" => "Login realizado com sucesso.",
        "profile_updated" => "Dados atualizados com sucesso!",
        "order_not_found" => "Pedido não encontrado.",
        _ => return None,
    })
}

// =============================================================================
// Health
// =============================================================================

/// Liveness health check endpoint.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the backend is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.backend().health().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Backend health check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/select", post(cart::select))
        .route("/person-type", post(cart::person_type))
        .route("/clear", post(cart::clear))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/method", post(checkout::select_method))
        .route("/widget/mount", post(checkout::widget_mount))
        .route("/widget/ready", post(checkout::widget_ready))
        .route("/widget/error", post(checkout::widget_error))
        .route("/card", post(checkout::card))
        .route("/pix-boleto", post(checkout::pix_boleto))
        .route("/retry", post(checkout::retry))
        .route("/status", get(checkout::status))
        .route("/config", get(checkout::config))
        .layer(api_rate_limiter())
}

/// Create the CEP API router.
pub fn cep_routes() -> Router<AppState> {
    Router::new()
        .route("/autofill", post(address::autofill))
        .route("/{cep}", get(address::lookup))
        .layer(api_rate_limiter())
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index).post(account::update))
        .route("/pedidos/{id}", get(account::order))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/sobre", get(pages::about))
        .route("/servicos", get(pages::services))
        .route(
            "/contato",
            get(contact::contact_page).post(contact::submit_contact),
        )
        .route(
            "/simular",
            get(contact::simulate_page).post(contact::submit_simulation),
        )
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/login", get(|| async { Redirect::permanent("/auth/login") }))
        .route(
            "/cadastro",
            get(|| async { Redirect::permanent("/auth/register") }),
        )
        .nest("/auth", auth_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/api/cep", cep_routes())
        .nest("/conta", account_routes())
}
