//! Integration tests for login, registration and protected pages.

use aprova_facil_integration_tests::{TestApp, customer_profile, location, mount_login};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn registration<'a>(document: &'a str, phone: &'a str) -> Vec<(&'static str, &'a str)> {
    vec![
        ("name", "Maria Silva"),
        ("email", "maria@example.com"),
        ("password", "segredo123"),
        ("password_confirm", "segredo123"),
        ("document", document),
        ("phone", phone),
        ("cep", "01310-100"),
        ("street", "Avenida Paulista"),
        ("number", "1000"),
        ("complement", ""),
        ("neighborhood", "Bela Vista"),
        ("city", "São Paulo"),
        ("state", "SP"),
    ]
}

// ============================================================================
// Protected pages
// ============================================================================

#[tokio::test]
async fn test_account_requires_login() {
    let app = TestApp::spawn().await;

    let resp = app.get("/conta").await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/auth/login?next=%2Fconta");
}

#[tokio::test]
async fn test_checkout_json_endpoints_answer_401() {
    let app = TestApp::spawn().await;

    let resp = app.get("/checkout/status").await;
    assert_eq!(resp.status(), 401);
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_opens_session() {
    let app = TestApp::spawn().await;
    app.login().await;

    let resp = app.get("/conta").await;
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.expect("Failed to read account page");
    assert!(body.contains("maria@example.com"));
    assert!(body.contains("Maria"));
}

#[tokio::test]
async fn test_login_follows_local_next_only() {
    let app = TestApp::spawn().await;
    mount_login(&app.backend).await;

    let resp = app
        .post_form(
            "/auth/login",
            &[
                ("email", "maria@example.com"),
                ("password", "segredo123"),
                ("next", "https://evil.example.com"),
            ],
        )
        .await;
    assert_eq!(location(&resp), "/?success=welcome");

    let resp = app
        .post_form(
            "/auth/login",
            &[
                ("email", "maria@example.com"),
                ("password", "segredo123"),
                ("next", "/checkout"),
            ],
        )
        .await;
    assert_eq!(location(&resp), "/checkout");
}

#[tokio::test]
async fn test_login_rejected_by_backend() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "E-mail ou senha incorretos" })),
        )
        .mount(&app.backend)
        .await;

    let resp = app
        .post_form(
            "/auth/login",
            &[("email", "maria@example.com"), ("password", "errada")],
        )
        .await;
    assert_eq!(resp.status(), 401);
    let body = resp.text().await.expect("Failed to read login page");
    assert!(body.contains("E-mail ou senha incorretos"));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let app = TestApp::spawn().await;
    app.login().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&app.backend)
        .await;

    let resp = app.post_form("/auth/logout", &[]).await;
    assert_eq!(location(&resp), "/?success=logged_out");

    let resp = app.get("/conta").await;
    assert!(resp.status().is_redirection());
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_registration_reports_field_errors() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.backend)
        .await;

    let resp = app
        .post_form(
            "/auth/register",
            &registration("111.111.111-11", "(11) 98765-4321"),
        )
        .await;
    assert_eq!(resp.status(), 422);

    let body = resp.text().await.expect("Failed to read register page");
    assert!(body.contains("CPF inválido"));
    assert!(body.contains("Avenida Paulista"), "typed fields are kept");
    assert!(!body.contains("segredo123"), "passwords are never echoed");
}

#[tokio::test]
async fn test_registration_logs_customer_in() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_partial_json(json!({
            "email": "maria@example.com",
            "cpf": "529.982.247-25",
            "phone": "(11) 98765-4321",
            "cep": "01310-100",
            "state": "SP"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(customer_profile()))
        .expect(1)
        .mount(&app.backend)
        .await;
    mount_login(&app.backend).await;

    let resp = app
        .post_form("/auth/register", &registration("52998224725", "11987654321"))
        .await;
    assert_eq!(location(&resp), "/?success=registered");

    let resp = app.get("/conta").await;
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_registration_surfaces_backend_conflict() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "E-mail já cadastrado" })),
        )
        .mount(&app.backend)
        .await;

    let resp = app
        .post_form(
            "/auth/register",
            &registration("529.982.247-25", "(11) 98765-4321"),
        )
        .await;
    assert_eq!(resp.status(), 422);
    let body = resp.text().await.expect("Failed to read register page");
    assert!(body.contains("E-mail já cadastrado"));
}
