//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! Adds restrictive security headers to all responses. The CSP is built per
//! request so inline scripts can carry the request's nonce, and it admits
//! only the payment provider origins the checkout needs.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::CspNonce;
use crate::state::AppState;

/// Origins the Mercado Pago SDK and card widget load from and talk to.
const PAYMENT_ORIGINS: &str = "https://*.mercadopago.com https://*.mercadopago.com.br \
                               https://*.mercadolibre.com https://*.mlstatic.com";

/// Build the Content-Security-Policy for one response.
///
/// ```text
/// default-src 'self';
/// script-src 'self' 'nonce-…' <sdk origin> <payment origins>;
/// style-src 'self' 'unsafe-inline' <payment origins>;
/// img-src 'self' data: <payment origins>;
/// font-src 'self' data: <payment origins>;
/// connect-src 'self' <payment origins>;
/// frame-src <payment origins>;
/// object-src 'none';
/// base-uri 'self';
/// form-action 'self' https://wa.me <payment origins>;
/// frame-ancestors 'none'
/// ```
///
/// The card widget injects its own styles, hence `'unsafe-inline'` for
/// styles only. Form posts may redirect to WhatsApp or to the provider's
/// hosted checkout.
#[must_use]
pub fn content_security_policy(nonce: &str, sdk_origin: &str) -> String {
    let nonce_source = if nonce.is_empty() {
        String::new()
    } else {
        format!(" 'nonce-{nonce}'")
    };
    format!(
        "default-src 'self'; \
         script-src 'self'{nonce_source} {sdk_origin} {PAYMENT_ORIGINS}; \
         style-src 'self' 'unsafe-inline' {PAYMENT_ORIGINS}; \
         img-src 'self' data: {PAYMENT_ORIGINS}; \
         font-src 'self' data: {PAYMENT_ORIGINS}; \
         connect-src 'self' {PAYMENT_ORIGINS}; \
         frame-src {PAYMENT_ORIGINS}; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self' https://wa.me {PAYMENT_ORIGINS}; \
         frame-ancestors 'none'"
    )
}

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY` - Prevent clickjacking
/// - `X-Content-Type-Options: nosniff` - Prevent MIME sniffing
/// - `Referrer-Policy: strict-origin-when-cross-origin`
/// - `Content-Security-Policy` - see [`content_security_policy`]
/// - `Permissions-Policy` - Deny sensitive features, payment for self only
/// - `Cache-Control: no-store, max-age=0` - unless the handler set one
/// - `Cross-Origin-Opener-Policy: same-origin-allow-popups`
/// - `X-DNS-Prefetch-Control: off`
///
/// No `Cross-Origin-Embedder-Policy`: the provider's iframes do not send
/// CORP headers.
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let nonce = request
        .extensions()
        .get::<CspNonce>()
        .map(|n| n.value().to_owned())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));

    // The provider's widget checks the referrer origin
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    let csp = content_security_policy(&nonce, &state.config().mercadopago_sdk_origin());
    match HeaderValue::from_str(&csp) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => tracing::error!(error = %e, "Invalid CSP header value"),
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), \
             camera=(), \
             display-capture=(), \
             geolocation=(), \
             gyroscope=(), \
             magnetometer=(), \
             microphone=(), \
             payment=(self), \
             usb=(), \
             xr-spatial-tracking=()",
        ),
    );

    if !headers.contains_key(axum::http::header::CACHE_CONTROL) {
        headers.insert(
            axum::http::header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, max-age=0"),
        );
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin-allow-popups"),
    );

    headers.insert(
        HeaderName::from_static("x-dns-prefetch-control"),
        HeaderValue::from_static("off"),
    );

    response
}
