//! Plan selection route handlers.
//!
//! The cart holds exactly one plan. Any change to it drops the pending
//! checkout so the next visit to `/checkout` creates a fresh order at the
//! current price.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use aprova_facil_core::PersonType;

use crate::error::{AppError, add_breadcrumb};
use crate::middleware::{OptionalAuth, login_url};
use crate::models::{Cart, CheckoutSession, keys};
use crate::state::AppState;

/// Plan selection form.
#[derive(Debug, Deserialize)]
pub struct SelectForm {
    /// Plan slug.
    pub product_id: String,
    #[serde(default)]
    pub person_type: Option<String>,
}

/// PF/PJ switch form.
#[derive(Debug, Deserialize)]
pub struct PersonTypeForm {
    pub person_type: String,
}

fn parse_person_type(raw: Option<&str>) -> PersonType {
    raw.and_then(|t| t.parse().ok()).unwrap_or_default()
}

async fn drop_checkout(session: &Session) -> Result<(), AppError> {
    session.remove::<CheckoutSession>(keys::CHECKOUT).await?;
    Ok(())
}

/// Select the plan to buy, replacing any previous selection.
#[instrument(skip(state, session, customer))]
pub async fn select(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(form): Form<SelectForm>,
) -> Result<Response, AppError> {
    let Some(product) = state.catalog().product(form.product_id.trim()).await else {
        tracing::warn!(slug = %form.product_id, "Unknown plan selected");
        return Ok(Redirect::to("/?error=no_product").into_response());
    };

    let cart = Cart {
        product_slug: product.slug.clone(),
        person_type: parse_person_type(form.person_type.as_deref()),
    };
    session.insert(keys::CART, &cart).await?;
    drop_checkout(&session).await?;

    add_breadcrumb(
        "cart",
        "Plan selected",
        Some(&[("slug", &cart.product_slug), ("person_type", cart.person_type.code())]),
    );

    let target = if customer.is_some() {
        "/checkout".to_owned()
    } else {
        login_url("/checkout")
    };
    Ok(Redirect::to(&target).into_response())
}

/// Switch between PF and PJ pricing.
#[instrument(skip(session, customer))]
pub async fn person_type(
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(form): Form<PersonTypeForm>,
) -> Result<Response, AppError> {
    let person_type = parse_person_type(Some(&form.person_type));

    let cart: Option<Cart> = session.get(keys::CART).await?;
    match cart {
        Some(mut cart) => {
            if cart.person_type != person_type {
                cart.person_type = person_type;
                session.insert(keys::CART, &cart).await?;
                drop_checkout(&session).await?;
            }
            let target = if customer.is_some() {
                "/checkout"
            } else {
                "/#planos"
            };
            Ok(Redirect::to(target).into_response())
        }
        None => Ok(Redirect::to(&format!("/?tipo={}#planos", person_type.code())).into_response()),
    }
}

/// Drop the selected plan.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Response, AppError> {
    session.remove::<Cart>(keys::CART).await?;
    drop_checkout(&session).await?;
    Ok(Redirect::to("/").into_response())
}
