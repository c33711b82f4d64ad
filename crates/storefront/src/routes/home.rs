//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use aprova_facil_core::{PersonType, Product};

use super::{MessageQuery, PageContext};
use crate::catalog::FEATURED_SLUG;
use crate::content::{self, Highlight, Stat, Testimonial};
use crate::filters;
use crate::middleware::{CspNonce, OptionalAuth};
use crate::models::{Cart, keys};
use crate::state::AppState;

/// Plan display data for templates.
#[derive(Debug, Clone)]
pub struct PlanView {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub deliverables: Vec<String>,
    pub deadline: String,
    pub deadline_note: Option<String>,
    pub payment_terms: String,
    pub price_pf: String,
    pub price_pj: String,
    /// Price for the tier currently selected on the page.
    pub price: String,
    pub featured: bool,
    pub whatsapp_link: String,
}

impl PlanView {
    #[must_use]
    pub fn new(product: &Product, person_type: PersonType, whatsapp_link: String) -> Self {
        Self {
            slug: product.slug.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            deliverables: product.deliverables.clone(),
            deadline: product.deadline.clone(),
            deadline_note: product.deadline_note.clone(),
            payment_terms: product.payment_terms.clone(),
            price_pf: product.price_for(PersonType::Pf).display(),
            price_pj: product.price_for(PersonType::Pj).display(),
            price: product.price_for(person_type).display(),
            featured: product.slug == FEATURED_SLUG,
            whatsapp_link,
        }
    }
}

/// Landing page query: `?tipo=PJ` switches the displayed prices.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub tipo: Option<String>,
    #[serde(flatten)]
    pub messages: MessageQuery,
}

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
    pub person_type: PersonType,
    pub plans: Vec<PlanView>,
    pub trust_badges: &'static [Highlight],
    pub stats: &'static [Stat],
    pub services: &'static [Highlight],
    pub plan_features: &'static [&'static str],
    pub testimonials: &'static [Testimonial],
    pub partners: &'static [&'static str],
}

/// Display the landing page.
#[instrument(skip(state, session, nonce, customer))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    OptionalAuth(customer): OptionalAuth,
    Query(query): Query<HomeQuery>,
) -> impl IntoResponse {
    let cart: Option<Cart> = session.get(keys::CART).await.ok().flatten();
    let person_type = query
        .tipo
        .as_deref()
        .and_then(|t| t.parse().ok())
        .or_else(|| cart.map(|c| c.person_type))
        .unwrap_or_default();

    let whatsapp = state.whatsapp();
    let plans = state
        .catalog()
        .products()
        .await
        .iter()
        .map(|p| PlanView::new(p, person_type, whatsapp.plan_link(&p.name)))
        .collect();

    HomeTemplate {
        page: PageContext::new(&state, nonce.value(), customer.as_ref()),
        error: query.messages.error_message(),
        success: query.messages.success_message(),
        person_type,
        plans,
        trust_badges: content::TRUST_BADGES,
        stats: content::STATS,
        services: content::SERVICES,
        plan_features: content::PLAN_FEATURES,
        testimonials: content::TESTIMONIALS,
        partners: content::PARTNERS,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn test_plan_view_prices() {
        let products = catalog::builtin();
        let limpa_nome = products.iter().find(|p| p.slug == FEATURED_SLUG).unwrap();
        let view = PlanView::new(limpa_nome, PersonType::Pj, String::new());
        assert_eq!(view.price, "R$ 1.800,00");
        assert_eq!(view.price_pf, "R$ 1.500,00");
        assert!(view.featured);
    }
}
