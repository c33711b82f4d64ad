//! Authentication extractors.
//!
//! The backend issues the bearer token; the storefront only remembers the
//! customer in the session.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentCustomer, keys};

/// Extractor that requires a logged-in customer.
///
/// Page requests are redirected to the login page with a `next` parameter
/// pointing back to where the customer was going; API and checkout JSON
/// requests get a bare 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(customer): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Olá, {}!", customer.first_name())
/// }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

/// Error returned when authentication is required but the customer is not logged in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin(String),
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(next) => Redirect::to(&login_url(&next)).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Login page URL that returns to `next` afterwards.
#[must_use]
pub fn login_url(next: &str) -> String {
    if next.is_empty() || next == "/" {
        "/auth/login".to_string()
    } else {
        format!("/auth/login?next={}", urlencoding::encode(next))
    }
}

/// Whether the request expects JSON rather than a page.
/// Full request path, including the prefix of any router it is nested in.
fn request_path(parts: &Parts) -> &str {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path(), |uri| uri.path())
}

fn is_api_request(parts: &Parts) -> bool {
    let path = request_path(parts);
    path.starts_with("/api/")
        || (path.starts_with("/checkout/") && parts.method != axum::http::Method::GET)
        || path == "/checkout/status"
        || path == "/checkout/config"
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let customer: CurrentCustomer = session
            .get(keys::CURRENT_CUSTOMER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                if is_api_request(parts) {
                    AuthRejection::Unauthorized
                } else {
                    AuthRejection::RedirectToLogin(request_path(parts).to_owned())
                }
            })?;

        Ok(Self(customer))
    }
}

/// Extractor that optionally gets the current customer.
///
/// Unlike `RequireAuth`, this does not reject the request if the customer is not logged in.
pub struct OptionalAuth(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentCustomer>(keys::CURRENT_CUSTOMER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(customer))
    }
}

/// Store the customer in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CURRENT_CUSTOMER, customer).await
}

/// Remove the customer from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentCustomer>(keys::CURRENT_CUSTOMER)
        .await?;
    Ok(())
}
