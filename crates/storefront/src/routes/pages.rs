//! Static content page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use super::PageContext;
use crate::content::{self, Highlight, ServiceLine};
use crate::filters;
use crate::middleware::{CspNonce, OptionalAuth};
use crate::state::AppState;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub page: PageContext,
    pub values: &'static [Highlight],
}

/// Services page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/services.html")]
pub struct ServicesTemplate {
    pub page: PageContext,
    pub services: &'static [ServiceLine],
    pub simulate_link: &'static str,
}

/// Display the about page.
#[instrument(skip(state, nonce, customer))]
pub async fn about(
    State(state): State<AppState>,
    nonce: CspNonce,
    OptionalAuth(customer): OptionalAuth,
) -> impl IntoResponse {
    AboutTemplate {
        page: PageContext::new(&state, nonce.value(), customer.as_ref()),
        values: content::VALUES,
    }
}

/// Display the services page.
#[instrument(skip(state, nonce, customer))]
pub async fn services(
    State(state): State<AppState>,
    nonce: CspNonce,
    OptionalAuth(customer): OptionalAuth,
) -> impl IntoResponse {
    ServicesTemplate {
        page: PageContext::new(&state, nonce.value(), customer.as_ref()),
        services: content::SERVICE_LINES,
        simulate_link: "/simular",
    }
}
