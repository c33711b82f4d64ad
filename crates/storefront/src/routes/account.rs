//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use tower_sessions::Session;
use tracing::instrument;

use aprova_facil_core::{OrderId, Price};

use super::{MessageQuery, PageContext};
use crate::backend::{AddressFields, BackendError, OrderResponse, PaymentResponse, UserUpdate};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{
    CspNonce, RequireAuth, clear_current_customer, login_url, set_current_customer,
};
use crate::models::CurrentCustomer;
use crate::state::AppState;
use crate::validation::{FILL_ALL_FIELDS, FieldErrors, ProfileForm, validate_profile};

/// Order display data for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: OrderId,
    pub status: String,
    pub status_label: String,
    pub products: String,
    pub person_type: &'static str,
    pub total: String,
    pub created_at: Option<String>,
    pub paid_at: Option<String>,
}

impl From<&OrderResponse> for OrderView {
    fn from(order: &OrderResponse) -> Self {
        Self {
            id: order.id,
            status: order.status.clone(),
            status_label: order.status_label().to_owned(),
            products: order.product_names(),
            person_type: order.person_type.label(),
            total: Price::brl(order.total).display(),
            created_at: order.created_at.clone(),
            paid_at: order.paid_at.clone(),
        }
    }
}

/// Payment display data for the order page.
#[derive(Debug, Clone)]
pub struct PaymentView {
    pub id: String,
    pub status: String,
    pub method: Option<String>,
    pub amount: Option<String>,
    pub pix_qr_code: Option<String>,
    pub boleto_url: Option<String>,
    pub boleto_barcode: Option<String>,
    pub paid_at: Option<String>,
}

impl From<PaymentResponse> for PaymentView {
    fn from(payment: PaymentResponse) -> Self {
        Self {
            id: payment.display_id(),
            status: payment.status,
            method: payment.method,
            amount: payment.amount.map(|a: Decimal| Price::brl(a).display()),
            pix_qr_code: payment.pix_qr_code,
            boleto_url: payment.boleto_url,
            boleto_barcode: payment.boleto_barcode,
            paid_at: payment.paid_at,
        }
    }
}

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub page: PageContext,
    pub email: String,
    pub form: ProfileForm,
    pub errors: FieldErrors,
    pub error: Option<String>,
    pub success: Option<&'static str>,
    pub orders: Vec<OrderView>,
    pub orders_unavailable: bool,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order.html")]
pub struct OrderTemplate {
    pub page: PageContext,
    pub order: OrderView,
    pub payment: Option<PaymentView>,
}

fn profile_form(customer: &CurrentCustomer) -> ProfileForm {
    let address = &customer.address;
    ProfileForm {
        name: customer.name.clone(),
        document: customer.document.clone(),
        phone: customer.phone.clone(),
        cep: address.cep.clone(),
        street: address.street.clone(),
        number: address.number.clone(),
        complement: address.complement.clone(),
        neighborhood: address.neighborhood.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
    }
}

/// The backend no longer accepts the token: forget the customer and ask
/// for a fresh login.
async fn expired(session: &Session, next: &str) -> Response {
    if let Err(e) = clear_current_customer(session).await {
        tracing::warn!(error = %e, "Failed to clear expired customer");
    }
    Redirect::to(&login_url(next)).into_response()
}

/// Fetch orders for the overview. `None` when the backend is unavailable.
async fn load_orders(
    state: &AppState,
    customer: &CurrentCustomer,
) -> Result<Option<Vec<OrderView>>, BackendError> {
    match state.backend().orders(&customer.token()).await {
        Ok(orders) => Ok(Some(orders.iter().map(OrderView::from).collect())),
        Err(e) if e.is_unauthorized() => Err(e),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch orders");
            Ok(None)
        }
    }
}

/// Display account overview page.
#[instrument(skip(state, session, nonce, customer), fields(customer_id = %customer.id))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    RequireAuth(customer): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    let Ok(orders) = load_orders(&state, &customer).await else {
        return expired(&session, "/conta").await;
    };

    AccountIndexTemplate {
        page: PageContext::new(&state, nonce.value(), Some(&customer)),
        email: customer.email.clone(),
        form: profile_form(&customer),
        errors: FieldErrors::new(),
        error: query.error_message().map(str::to_owned),
        success: query.success_message(),
        orders_unavailable: orders.is_none(),
        orders: orders.unwrap_or_default(),
    }
    .into_response()
}

/// Update profile and address.
#[instrument(skip_all, fields(customer_id = %customer.id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    RequireAuth(mut customer): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let (errors, error) = match validate_profile(&form) {
        Ok(valid) => {
            let document = valid.document.formatted();
            let phone = valid.phone.formatted();
            let update = UserUpdate {
                name: &valid.name,
                phone: &phone,
                cpf: &document,
                address: AddressFields::from(&valid.address),
            };

            match state.backend().update_me(&customer.token(), &update).await {
                Ok(user) => {
                    customer.update_profile(user);
                    set_current_customer(&session, &customer).await?;
                    tracing::info!("Profile updated");
                    return Ok(Redirect::to("/conta?success=profile_updated").into_response());
                }
                Err(e) if e.is_unauthorized() => return Ok(expired(&session, "/conta").await),
                Err(e) => {
                    tracing::warn!(error = %e, "Profile update rejected");
                    (FieldErrors::new(), e.user_message().to_owned())
                }
            }
        }
        Err(errors) => (errors, format!("{FILL_ALL_FIELDS} corretamente")),
    };

    let orders = load_orders(&state, &customer).await.ok().flatten();
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        AccountIndexTemplate {
            page: PageContext::new(&state, nonce.value(), Some(&customer)),
            email: customer.email.clone(),
            form,
            errors,
            error: Some(error),
            success: None,
            orders_unavailable: orders.is_none(),
            orders: orders.unwrap_or_default(),
        },
    )
        .into_response())
}

/// Display one order with its latest payment.
#[instrument(skip(state, session, nonce, customer), fields(customer_id = %customer.id))]
pub async fn order(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    RequireAuth(customer): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let order_id = OrderId::new(id);
    let token = customer.token();

    let order = match state.backend().order(&token, order_id).await {
        Ok(order) => order,
        Err(e) if e.is_unauthorized() => {
            return Ok(expired(&session, &format!("/conta/pedidos/{id}")).await);
        }
        Err(e) if e.is_client_error() => {
            tracing::info!(%order_id, error = %e, "Order not available");
            return Ok(Redirect::to("/conta?error=order_not_found").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let payment = match state.backend().payment_for_order(&token, order_id).await {
        Ok(payment) => Some(PaymentView::from(payment)),
        Err(e) if e.status() == Some(404) => None,
        Err(e) => {
            tracing::warn!(error = %e, %order_id, "Failed to fetch payment");
            None
        }
    };

    Ok(OrderTemplate {
        page: PageContext::new(&state, nonce.value(), Some(&customer)),
        order: OrderView::from(&order),
        payment,
    }
    .into_response())
}
