//! Authentication route handlers.
//!
//! The backend owns accounts and issues bearer tokens. A successful login
//! stores the customer profile and token in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{MessageQuery, PageContext};
use crate::backend::{AddressFields, RegisterRequest};
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{CspNonce, OptionalAuth, clear_current_customer, set_current_customer};
use crate::models::CurrentCustomer;
use crate::state::AppState;
use crate::validation::{FILL_ALL_FIELDS, FieldErrors, RegistrationForm, validate_registration};

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Query for the auth pages.
#[derive(Debug, Default, Deserialize)]
pub struct AuthQuery {
    pub next: Option<String>,
    #[serde(flatten)]
    pub messages: MessageQuery,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub email: String,
    pub next: Option<String>,
    pub error: Option<String>,
    pub success: Option<&'static str>,
    /// Shown when the customer was sent here from a protected page.
    pub notice: Option<&'static str>,
    pub register_url: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub form: RegistrationForm,
    pub errors: FieldErrors,
    pub error: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Keep only same-site absolute paths as redirect targets.
#[must_use]
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.map(str::trim).filter(|n| {
        n.starts_with('/') && !n.starts_with("//") && !n.contains('\\')
    })
}

/// Registration link that keeps the `next` target.
fn register_url(next: Option<&str>) -> String {
    next.map_or_else(
        || "/auth/register".to_owned(),
        |n| format!("/auth/register?next={}", urlencoding::encode(n)),
    )
}

/// Where to go after logging in.
fn landing(next: Option<&str>, success: &str) -> String {
    safe_next(next).map_or_else(|| format!("/?success={success}"), str::to_owned)
}

/// Fetch the profile for a fresh token and store it in the session.
async fn start_session(
    state: &AppState,
    session: &Session,
    token: &SecretString,
) -> Result<CurrentCustomer, AppError> {
    let user = state.backend().me(token).await?;
    let customer = CurrentCustomer::from_user(user, token);

    session.cycle_id().await?;
    set_current_customer(session, &customer).await?;
    set_sentry_user(&customer.id, Some(&customer.email));

    tracing::info!(customer_id = %customer.id, "Customer logged in");
    Ok(customer)
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page.
#[instrument(skip(state, nonce, customer))]
pub async fn login_page(
    State(state): State<AppState>,
    nonce: CspNonce,
    OptionalAuth(customer): OptionalAuth,
    Query(query): Query<AuthQuery>,
) -> Response {
    let next = safe_next(query.next.as_deref()).map(str::to_owned);
    if customer.is_some() {
        return Redirect::to(next.as_deref().unwrap_or("/conta")).into_response();
    }

    LoginTemplate {
        page: PageContext::new(&state, nonce.value(), None),
        email: String::new(),
        notice: next.as_ref().map(|_| "Faça login para continuar"),
        register_url: register_url(next.as_deref()),
        next,
        error: query.messages.error_message().map(str::to_owned),
        success: query.messages.success_message(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, nonce, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = safe_next(form.next.as_deref()).map(str::to_owned);
    let render = |error: String, status: StatusCode| {
        (
            status,
            LoginTemplate {
                page: PageContext::new(&state, nonce.value(), None),
                email: form.email.trim().to_owned(),
                next: next.clone(),
                error: Some(error),
                success: None,
                notice: None,
                register_url: register_url(next.as_deref()),
            },
        )
            .into_response()
    };

    if form.email.trim().is_empty() || form.password.is_empty() {
        return render(FILL_ALL_FIELDS.to_owned(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    let token = match state.backend().login(form.email.trim(), &form.password).await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            let status = if e.is_client_error() {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::BAD_GATEWAY
            };
            return render(e.user_message().to_owned(), status);
        }
    };

    match start_session(&state, &session, &token).await {
        Ok(_) => Redirect::to(&landing(next.as_deref(), "welcome")).into_response(),
        Err(e) => e.into_response(),
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
#[instrument(skip(state, nonce, customer))]
pub async fn register_page(
    State(state): State<AppState>,
    nonce: CspNonce,
    OptionalAuth(customer): OptionalAuth,
    Query(query): Query<AuthQuery>,
) -> Response {
    if customer.is_some() {
        return Redirect::to("/conta").into_response();
    }

    RegisterTemplate {
        page: PageContext::new(&state, nonce.value(), None),
        form: RegistrationForm {
            next: safe_next(query.next.as_deref()).map(str::to_owned),
            ..RegistrationForm::default()
        },
        errors: FieldErrors::new(),
        error: query.messages.error_message().map(str::to_owned),
    }
    .into_response()
}

/// Handle registration form submission.
///
/// On success the customer is logged in straight away.
#[instrument(skip_all, fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    nonce: CspNonce,
    Form(form): Form<RegistrationForm>,
) -> Response {
    let render = |form: RegistrationForm, errors: FieldErrors, error: String, status| {
        (
            status,
            RegisterTemplate {
                page: PageContext::new(&state, nonce.value(), None),
                form: form.without_passwords(),
                errors,
                error: Some(error),
            },
        )
            .into_response()
    };

    let valid = match validate_registration(&form) {
        Ok(valid) => valid,
        Err(errors) => {
            let message = format!("{FILL_ALL_FIELDS} corretamente");
            return render(form, errors, message, StatusCode::UNPROCESSABLE_ENTITY);
        }
    };

    let document = valid.document.formatted();
    let phone = valid.phone.formatted();
    let request = RegisterRequest {
        name: &valid.name,
        email: valid.email.as_str(),
        password: &valid.password,
        cpf: &document,
        phone: &phone,
        address: AddressFields::from(&valid.address),
    };

    if let Err(e) = state.backend().register(&request).await {
        tracing::warn!(error = %e, "Registration failed");
        let status = if e.is_client_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::BAD_GATEWAY
        };
        let message = e.user_message().to_owned();
        return render(form, FieldErrors::new(), message, status);
    }

    let token = match state
        .backend()
        .login(valid.email.as_str(), &valid.password)
        .await
    {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(error = %e, "Login after registration failed");
            return Redirect::to("/auth/login?success=registered").into_response();
        }
    };

    match start_session(&state, &session, &token).await {
        Ok(_) => Redirect::to(&landing(form.next.as_deref(), "registered")).into_response(),
        Err(e) => e.into_response(),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// The backend call is best-effort; the session is always flushed.
#[instrument(skip(state, session, customer))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Response {
    if let Some(customer) = customer
        && let Err(e) = state.backend().logout(&customer.token()).await
    {
        tracing::debug!(error = %e, "Backend logout failed");
    }

    if let Err(e) = clear_current_customer(&session).await {
        tracing::warn!(error = %e, "Failed to clear customer from session");
    }
    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to flush session");
    }
    clear_sentry_user();

    Redirect::to("/?success=logged_out").into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next_rejects_offsite_targets() {
        assert_eq!(safe_next(Some("/checkout")), Some("/checkout"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn test_landing_defaults_to_home() {
        assert_eq!(landing(None, "welcome"), "/?success=welcome");
        assert_eq!(landing(Some("/checkout"), "welcome"), "/checkout");
    }
}
