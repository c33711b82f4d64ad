//! Checkout route handlers.
//!
//! The browser loads the payment provider's script and mounts the card
//! widget. Every widget callback is relayed here and applied to the
//! session's [`CheckoutMachine`](aprova_facil_core::CheckoutMachine), which
//! decides whether it counts. Pix and boleto skip the widget and go to the
//! provider's hosted page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use aprova_facil_core::{
    CheckoutState, IgnoreReason, MountGeneration, OrderId, PaymentFailure, PaymentMethod,
    PaymentOutcome, PersonType, Product, TaxDocument, Transition, digits_only,
};

use super::home::PlanView;
use super::{MessageQuery, PageContext};
use crate::backend::{BackendError, CardPaymentRequest};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{CspNonce, RequireAuth, clear_current_customer, login_url};
use crate::models::{Cart, CheckoutSession, CurrentCustomer, keys};
use crate::state::AppState;

/// DOM id the card widget is mounted into.
pub const WIDGET_CONTAINER_ID: &str = "cardPaymentBrick_container";

const SESSION_EXPIRED: &str = "Sessão de pagamento expirada. Recarregue a página.";

// =============================================================================
// Response Types
// =============================================================================

/// Checkout state as seen by the glue script.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutStatus {
    pub state: CheckoutState,
    pub method: PaymentMethod,
    /// Current widget mount, if any.
    pub generation: Option<MountGeneration>,
    pub message: Option<&'static str>,
    pub can_retry: bool,
    pub order_id: Option<OrderId>,
    pub payment_id: Option<String>,
    pub status_detail: Option<String>,
    /// Follow-up link once the payment is approved or pending.
    pub whatsapp_link: Option<String>,
}

impl CheckoutStatus {
    async fn of(state: &AppState, checkout: &CheckoutSession) -> Self {
        let machine = &checkout.machine;
        let finished = matches!(
            machine.state(),
            CheckoutState::Approved | CheckoutState::Pending
        );

        let whatsapp_link = match (finished, checkout.order_id) {
            (true, Some(order_id)) => {
                let name = state
                    .catalog()
                    .product(&checkout.product_slug)
                    .await
                    .map_or_else(|| checkout.product_slug.clone(), |p| p.name);
                Some(state.whatsapp().order_link(&name, order_id))
            }
            _ => None,
        };

        Self {
            state: machine.state(),
            method: machine.method(),
            generation: machine.slot().current(),
            message: machine.failure().map(PaymentFailure::message),
            can_retry: machine.can_retry(),
            order_id: checkout.order_id,
            payment_id: checkout.last_payment.as_ref().map(|p| p.display_id()),
            status_detail: checkout
                .last_payment
                .as_ref()
                .and_then(|p| p.status_detail.clone()),
            whatsapp_link,
        }
    }
}

/// Result of relaying a widget event.
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub applied: bool,
    pub reason: Option<IgnoreReason>,
    pub status: CheckoutStatus,
}

/// Widget settings for the glue script.
#[derive(Debug, Serialize)]
pub struct WidgetConfig {
    pub public_key: String,
    /// Decimal string, e.g. `"1800.00"`.
    pub amount: String,
    pub payer: Payer,
    pub method: PaymentMethod,
    pub max_installments: u8,
    pub container_id: &'static str,
    pub locale: &'static str,
    pub sdk_url: String,
    pub order_id: Option<OrderId>,
}

#[derive(Debug, Serialize)]
pub struct Payer {
    pub email: String,
    pub identification: Identification,
}

#[derive(Debug, Serialize)]
pub struct Identification {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub number: String,
}

impl Identification {
    fn of(document: &str) -> Self {
        match TaxDocument::parse(document) {
            Ok(doc) => Self {
                kind: doc.kind().label(),
                number: doc.digits().to_owned(),
            },
            Err(_) => {
                let number = digits_only(document);
                let kind = if number.len() > 11 { "CNPJ" } else { "CPF" };
                Self { kind, number }
            }
        }
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// Payment method switch.
#[derive(Debug, Deserialize)]
pub struct MethodForm {
    pub method: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerationPayload {
    pub generation: MountGeneration,
}

/// Widget `onError`, or the provider script failing to load.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WidgetErrorPayload {
    pub generation: Option<MountGeneration>,
    pub sdk_unavailable: bool,
    /// Provider detail. Logged, never shown.
    pub message: Option<String>,
}

/// Widget `onSubmit` form data.
#[derive(Deserialize)]
pub struct CardSubmission {
    pub generation: MountGeneration,
    pub token: String,
    pub installments: u32,
    pub payment_method_id: String,
    #[serde(default)]
    pub issuer_id: Option<String>,
}

impl CardSubmission {
    fn check(&self, method: PaymentMethod) -> Result<(), AppError> {
        if self.token.trim().is_empty() || self.payment_method_id.trim().is_empty() {
            return Err(AppError::BadRequest("Dados do cartão incompletos".to_string()));
        }
        if self.installments == 0 || self.installments > u32::from(method.max_installments()) {
            return Err(AppError::BadRequest("Número de parcelas inválido".to_string()));
        }
        Ok(())
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Payment method choice.
#[derive(Debug, Clone)]
pub struct MethodOption {
    pub code: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub error: Option<&'static str>,
    pub product: PlanView,
    pub person_type: PersonType,
    pub order_id: OrderId,
    pub methods: Vec<MethodOption>,
    pub status: CheckoutStatus,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_document: String,
    pub sdk_url: String,
    pub container_id: &'static str,
}

// =============================================================================
// Helpers
// =============================================================================

async fn current_cart(
    state: &AppState,
    session: &Session,
) -> Result<Option<(Cart, Product)>, AppError> {
    let Some(cart) = session.get::<Cart>(keys::CART).await? else {
        return Ok(None);
    };
    Ok(state
        .catalog()
        .product(&cart.product_slug)
        .await
        .map(|product| (cart, product)))
}

async fn load_checkout(session: &Session) -> Result<CheckoutSession, AppError> {
    session
        .get::<CheckoutSession>(keys::CHECKOUT)
        .await?
        .ok_or_else(|| AppError::BadRequest(SESSION_EXPIRED.to_string()))
}

async fn store_checkout(session: &Session, checkout: &CheckoutSession) -> Result<(), AppError> {
    session.insert(keys::CHECKOUT, checkout).await?;
    Ok(())
}

async fn create_order(
    state: &AppState,
    customer: &CurrentCustomer,
    product: &Product,
    person_type: PersonType,
) -> Result<OrderId, BackendError> {
    let product_id = match product.backend_id {
        Some(id) => id,
        None => state.backend().resolve_product_id(&product.slug).await?,
    };
    let order = state
        .backend()
        .create_order(&customer.token(), product_id, person_type)
        .await?;
    tracing::info!(order_id = %order.id, slug = %product.slug, "Order created");
    Ok(order.id)
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

async fn transition_response(
    state: &AppState,
    checkout: &CheckoutSession,
    transition: Transition,
    status: StatusCode,
) -> Response {
    let reason = match transition {
        Transition::Applied { .. } => None,
        Transition::Ignored { reason, .. } => Some(reason),
    };
    let body = TransitionResponse {
        applied: transition.is_applied(),
        reason,
        status: CheckoutStatus::of(state, checkout).await,
    };
    (status, Json(body)).into_response()
}

/// JSON for the glue script, a redirect back to the page for plain forms.
async fn respond(
    state: &AppState,
    headers: &HeaderMap,
    checkout: &CheckoutSession,
    transition: Transition,
) -> Response {
    if wants_json(headers) {
        transition_response(state, checkout, transition, StatusCode::OK).await
    } else {
        Redirect::to("/checkout").into_response()
    }
}

// =============================================================================
// Page
// =============================================================================

/// Display the checkout page.
///
/// Creates the backend order on first visit for the current cart; later
/// visits reuse it. A card widget mounted by an earlier render is dropped
/// so the page mounts a fresh one.
#[instrument(skip(state, session, nonce, customer), fields(customer_id = %customer.id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    RequireAuth(customer): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let Some((cart, product)) = current_cart(&state, &session).await? else {
        return Ok(Redirect::to("/?error=no_product").into_response());
    };

    let mut checkout = match session.get::<CheckoutSession>(keys::CHECKOUT).await? {
        Some(existing) if existing.matches(&cart) => existing,
        _ => CheckoutSession::new(&cart),
    };

    let order_id = match checkout.order_id {
        Some(id) => id,
        None => match create_order(&state, &customer, &product, cart.person_type).await {
            Ok(id) => {
                checkout.order_id = Some(id);
                id
            }
            Err(e) if e.is_unauthorized() => {
                tracing::info!("Backend token expired, asking for login again");
                clear_current_customer(&session).await?;
                return Ok(Redirect::to(&login_url("/checkout")).into_response());
            }
            Err(e) => {
                tracing::error!(error = %e, slug = %product.slug, "Failed to create order");
                return Ok(Redirect::to("/?error=order").into_response());
            }
        },
    };
    if checkout.machine.page_rendered().is_applied() {
        tracing::debug!("Dropped widget from a previous page render");
    }
    store_checkout(&session, &checkout).await?;

    let selected = checkout.machine.method();
    let methods = PaymentMethod::ALL
        .into_iter()
        .map(|m| MethodOption {
            code: m.code(),
            label: m.label(),
            selected: m == selected,
        })
        .collect();

    let whatsapp_link = state.whatsapp().plan_link(&product.name);
    Ok(CheckoutTemplate {
        page: PageContext::new(&state, nonce.value(), Some(&customer)),
        error: query.error_message(),
        product: PlanView::new(&product, cart.person_type, whatsapp_link),
        person_type: cart.person_type,
        order_id,
        methods,
        status: CheckoutStatus::of(&state, &checkout).await,
        customer_name: customer.name.clone(),
        customer_email: customer.email.clone(),
        customer_document: customer.document.clone(),
        sdk_url: state.config().mercadopago_sdk_url.to_string(),
        container_id: WIDGET_CONTAINER_ID,
    }
    .into_response())
}

// =============================================================================
// Method & widget lifecycle
// =============================================================================

/// Change the payment method.
#[instrument(skip(state, session, headers, form), fields(method = %form.method))]
pub async fn select_method(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_customer): RequireAuth,
    headers: HeaderMap,
    Form(form): Form<MethodForm>,
) -> Result<Response, AppError> {
    let method: PaymentMethod = form
        .method
        .parse()
        .map_err(|e: aprova_facil_core::PaymentMethodError| AppError::BadRequest(e.to_string()))?;

    let mut checkout = load_checkout(&session).await?;
    let transition = checkout.machine.select_method(method);
    if transition.is_applied() {
        store_checkout(&session, &checkout).await?;
    }
    Ok(respond(&state, &headers, &checkout, transition).await)
}

/// The glue script is about to create the card widget.
///
/// Any previous mount is released; callbacks still carrying its generation
/// are ignored from now on.
#[instrument(skip(state, session))]
pub async fn widget_mount(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_customer): RequireAuth,
) -> Result<Response, AppError> {
    let mut checkout = load_checkout(&session).await?;
    match checkout.machine.begin_mount() {
        Ok(generation) => {
            store_checkout(&session, &checkout).await?;
            tracing::debug!(%generation, "Card widget mount started");
            let transition = Transition::Applied {
                state: checkout.machine.state(),
            };
            Ok(transition_response(&state, &checkout, transition, StatusCode::OK).await)
        }
        Err(reason) => {
            let transition = Transition::Ignored {
                state: checkout.machine.state(),
                reason,
            };
            Ok(transition_response(&state, &checkout, transition, StatusCode::CONFLICT).await)
        }
    }
}

/// Widget `onReady`.
#[instrument(skip(state, session))]
pub async fn widget_ready(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_customer): RequireAuth,
    Json(payload): Json<GenerationPayload>,
) -> Result<Response, AppError> {
    let mut checkout = load_checkout(&session).await?;
    let transition = checkout.machine.widget_ready(payload.generation);
    if transition.is_applied() {
        store_checkout(&session, &checkout).await?;
    }
    Ok(transition_response(&state, &checkout, transition, StatusCode::OK).await)
}

/// Widget `onError`, or the provider script failed to load.
#[instrument(skip(state, session))]
pub async fn widget_error(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_customer): RequireAuth,
    Json(payload): Json<WidgetErrorPayload>,
) -> Result<Response, AppError> {
    tracing::warn!(
        generation = ?payload.generation,
        sdk_unavailable = payload.sdk_unavailable,
        detail = payload.message.as_deref().unwrap_or(""),
        "Payment widget reported an error"
    );

    let mut checkout = load_checkout(&session).await?;
    let transition = match (payload.sdk_unavailable, payload.generation) {
        (true, _) => checkout.machine.setup_failed(PaymentFailure::SdkUnavailable),
        (false, Some(generation)) => checkout.machine.widget_failed(generation),
        (false, None) => checkout.machine.setup_failed(PaymentFailure::WidgetError),
    };
    if transition.is_applied() {
        store_checkout(&session, &checkout).await?;
    }
    Ok(transition_response(&state, &checkout, transition, StatusCode::OK).await)
}

// =============================================================================
// Payment
// =============================================================================

/// Widget `onSubmit`: charge the tokenized card.
///
/// `processing` is persisted before the backend call, so a second submit
/// arriving meanwhile is ignored instead of charging twice.
#[instrument(skip_all, fields(customer_id = %customer.id))]
pub async fn card(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    Json(submission): Json<CardSubmission>,
) -> Result<Response, AppError> {
    let mut checkout = load_checkout(&session).await?;
    let Some(order_id) = checkout.order_id else {
        return Err(AppError::BadRequest(SESSION_EXPIRED.to_string()));
    };
    submission.check(checkout.machine.method())?;

    let transition = checkout.machine.submit(submission.generation);
    if !transition.is_applied() {
        tracing::info!(state = %transition.state(), "Card submission ignored");
        return Ok(
            transition_response(&state, &checkout, transition, StatusCode::CONFLICT).await,
        );
    }
    store_checkout(&session, &checkout).await?;
    session.save().await?;

    let order_ref = order_id.to_string();
    add_breadcrumb(
        "checkout",
        "Card payment submitted",
        Some(&[("order_id", &order_ref)]),
    );

    let request = CardPaymentRequest {
        order_id,
        token: submission.token,
        installments: submission.installments,
        payment_method_id: submission.payment_method_id,
        issuer_id: submission.issuer_id.filter(|id| !id.trim().is_empty()),
    };

    let transition = match state
        .backend()
        .process_payment(&customer.token(), &request)
        .await
    {
        Ok(payment) => {
            tracing::info!(
                %order_id,
                status = %payment.status,
                status_detail = payment.status_detail.as_deref().unwrap_or(""),
                "Card payment processed"
            );
            let outcome = PaymentOutcome::from_provider_status(&payment.status);
            checkout.last_payment = Some(payment);
            checkout.machine.resolve(outcome)
        }
        Err(e) => {
            tracing::error!(error = %e, %order_id, "Card payment failed");
            checkout.machine.processing_failed()
        }
    };
    store_checkout(&session, &checkout).await?;

    Ok(transition_response(&state, &checkout, transition, StatusCode::OK).await)
}

/// Create a hosted-checkout preference and send the browser there.
#[instrument(skip(state, session, customer), fields(customer_id = %customer.id))]
pub async fn pix_boleto(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
) -> Result<Response, AppError> {
    let Some(mut checkout) = session.get::<CheckoutSession>(keys::CHECKOUT).await? else {
        return Ok(Redirect::to("/checkout").into_response());
    };
    let Some(order_id) = checkout.order_id else {
        return Ok(Redirect::to("/checkout").into_response());
    };

    if checkout.machine.method() != PaymentMethod::PixBoleto {
        if !checkout
            .machine
            .select_method(PaymentMethod::PixBoleto)
            .is_applied()
        {
            return Ok(Redirect::to("/checkout").into_response());
        }
        store_checkout(&session, &checkout).await?;
    }
    if checkout.machine.state() != CheckoutState::Ready {
        return Ok(Redirect::to("/checkout").into_response());
    }

    match state
        .backend()
        .create_preference(&customer.token(), order_id, PaymentMethod::PixBoleto)
        .await
    {
        Ok(preference) if preference.init_point.starts_with("https://") => {
            tracing::info!(
                %order_id,
                preference_id = %preference.preference_id,
                "Redirecting to hosted checkout"
            );
            Ok(Redirect::to(&preference.init_point).into_response())
        }
        Ok(preference) => {
            tracing::error!(
                %order_id,
                init_point = %preference.init_point,
                "Preference returned an unusable checkout URL"
            );
            Ok(Redirect::to("/checkout?error=payment").into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, %order_id, "Failed to create payment preference");
            Ok(Redirect::to("/checkout?error=payment").into_response())
        }
    }
}

/// Start over after a rejection.
#[instrument(skip(state, session, headers))]
pub async fn retry(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_customer): RequireAuth,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let mut checkout = load_checkout(&session).await?;
    let transition = checkout.machine.retry();
    if transition.is_applied() {
        checkout.last_payment = None;
        store_checkout(&session, &checkout).await?;
    }
    Ok(respond(&state, &headers, &checkout, transition).await)
}

// =============================================================================
// JSON
// =============================================================================

/// Current checkout state.
///
/// A pending payment's details are refreshed from the backend; the state
/// itself stays `pending` for the rest of the attempt.
#[instrument(skip(state, session, customer), fields(customer_id = %customer.id))]
pub async fn status(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
) -> Result<Json<CheckoutStatus>, AppError> {
    let mut checkout = load_checkout(&session).await?;
    if checkout.machine.state() == CheckoutState::Pending
        && let Some(payment_id) = checkout.last_payment.as_ref().map(|p| p.payment_id)
    {
        match state.backend().payment(&customer.token(), payment_id).await {
            Ok(payment) => {
                checkout.last_payment = Some(payment);
                store_checkout(&session, &checkout).await?;
            }
            Err(e) => tracing::debug!(error = %e, %payment_id, "Payment refresh failed"),
        }
    }
    Ok(Json(CheckoutStatus::of(&state, &checkout).await))
}

/// Settings for mounting the card widget.
///
/// If the public key cannot be fetched the attempt is rejected and the
/// response is 503 with the updated status.
#[instrument(skip(state, session, customer), fields(customer_id = %customer.id))]
pub async fn config(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
) -> Result<Response, AppError> {
    let mut checkout = load_checkout(&session).await?;
    let Some(product) = state.catalog().product(&checkout.product_slug).await else {
        return Err(AppError::NotFound("Produto não encontrado".to_string()));
    };

    let public_key = match state.backend().public_key().await {
        Ok(key) => key,
        Err(e) => {
            tracing::error!(error = %e, "Payment public key unavailable");
            let transition = checkout
                .machine
                .setup_failed(PaymentFailure::PublicKeyUnavailable);
            if transition.is_applied() {
                store_checkout(&session, &checkout).await?;
            }
            return Ok(transition_response(
                &state,
                &checkout,
                transition,
                StatusCode::SERVICE_UNAVAILABLE,
            )
            .await);
        }
    };

    let method = checkout.machine.method();
    Ok(Json(WidgetConfig {
        public_key,
        amount: product.price_for(checkout.person_type).charge_amount(),
        payer: Payer {
            email: customer.email.clone(),
            identification: Identification::of(&customer.document),
        },
        method,
        max_installments: method.max_installments(),
        container_id: WIDGET_CONTAINER_ID,
        locale: "pt-BR",
        sdk_url: state.config().mercadopago_sdk_url.to_string(),
        order_id: checkout.order_id,
    })
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn submission(installments: u32) -> CardSubmission {
        CardSubmission {
            generation: MountGeneration::new(1),
            token: "card-token".to_string(),
            installments,
            payment_method_id: "visa".to_string(),
            issuer_id: None,
        }
    }

    #[test]
    fn test_installments_bounded_by_method() {
        assert!(submission(12).check(PaymentMethod::CreditCard).is_ok());
        assert!(submission(13).check(PaymentMethod::CreditCard).is_err());
        assert!(submission(0).check(PaymentMethod::CreditCard).is_err());
        assert!(submission(2).check(PaymentMethod::DebitCard).is_err());
        assert!(submission(1).check(PaymentMethod::DebitCard).is_ok());
    }

    #[test]
    fn test_identification_from_document() {
        let cpf = Identification::of("111.444.777-35");
        assert_eq!(cpf.kind, "CPF");
        assert_eq!(cpf.number, "11144477735");

        let cnpj = Identification::of("11.222.333/0001-81");
        assert_eq!(cnpj.kind, "CNPJ");
        assert_eq!(cnpj.number, "11222333000181");
    }

    #[test]
    fn test_wants_json() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));
        headers.insert(header::ACCEPT, "application/json".parse().unwrap());
        assert!(wants_json(&headers));
    }
}
