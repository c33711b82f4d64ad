//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::backend::BackendError;
use crate::services::CepError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// CEP lookup failed.
    #[error("CEP error: {0}")]
    Cep(#[from] CepError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

}

impl AppError {
    /// Server-side failures worth an error report.
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Session(_) => true,
            Self::Backend(err) => !err.is_client_error(),
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Backend(err) => match err.status() {
                Some(401) => StatusCode::UNAUTHORIZED,
                Some(404) => StatusCode::NOT_FOUND,
                Some(status @ 400..=499) => {
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST)
                }
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Cep(CepError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Cep(_) => StatusCode::BAD_GATEWAY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message shown to the customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Session(_) => "Erro interno. Tente novamente.".to_string(),
            Self::Backend(err) => err.user_message().to_string(),
            Self::Cep(err) => err.user_message().to_string(),
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else if matches!(self, Self::Cep(CepError::Http(_) | CepError::Parse(_))) {
            tracing::warn!(error = %self, "CEP lookup failed");
        }

        (self.status(), self.user_message()).into_response()
    }
}

/// Set the Sentry user context from a customer ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Payment submitted", Some(&[("order_id", "42")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("pedido 42".to_string());
        assert_eq!(err.to_string(), "Not found: pedido 42");
        assert_eq!(err.user_message(), "pedido 42");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_backend_errors_map_by_status() {
        let conflict = AppError::Backend(BackendError::Api {
            status: 409,
            message: "Email já cadastrado".to_string(),
        });
        assert_eq!(conflict.user_message(), "Email já cadastrado");
        assert_eq!(get_status(conflict), StatusCode::CONFLICT);

        let server = AppError::Backend(BackendError::Api {
            status: 500,
            message: "stack trace".to_string(),
        });
        assert_eq!(server.user_message(), crate::backend::ApiErrorBody::FALLBACK_MESSAGE);
        assert_eq!(get_status(server), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_cep_errors() {
        assert_eq!(get_status(AppError::Cep(CepError::NotFound)), StatusCode::NOT_FOUND);
        let parse = AppError::Cep(CepError::Parse("x".to_string()));
        assert_eq!(parse.user_message(), "Erro ao buscar CEP. Tente novamente.");
        assert_eq!(get_status(parse), StatusCode::BAD_GATEWAY);
    }
}
