//! Integration tests for the CEP lookup endpoints.
//!
//! ViaCEP is replaced by a mock server, so these run without network access.

use aprova_facil_integration_tests::TestApp;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_paulista(app: &TestApp) {
    Mock::given(method("GET"))
        .and(path("/01310100/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cep": "01310-100",
            "logradouro": "Avenida Paulista",
            "complemento": "de 612 a 1510 - lado par",
            "bairro": "Bela Vista",
            "localidade": "São Paulo",
            "uf": "SP",
            "ibge": "3550308"
        })))
        .mount(&app.viacep)
        .await;
}

// ============================================================================
// Lookup
// ============================================================================

#[tokio::test]
async fn test_lookup_returns_address() {
    let app = TestApp::spawn().await;
    mount_paulista(&app).await;

    let resp = app.get("/api/cep/01310-100").await;
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("Invalid lookup body");
    assert_eq!(body["street"], "Avenida Paulista");
    assert_eq!(body["neighborhood"], "Bela Vista");
    assert_eq!(body["city"], "São Paulo");
    assert_eq!(body["state"], "SP");
}

#[tokio::test]
async fn test_lookup_unknown_cep_is_not_found() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path("/99999999/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "erro": true })))
        .mount(&app.viacep)
        .await;

    let resp = app.get("/api/cep/99999-999").await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_lookup_malformed_cep_never_reaches_service() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.viacep)
        .await;

    let resp = app.get("/api/cep/0131").await;
    assert_eq!(resp.status(), 400);
    assert_eq!(resp.text().await.expect("Invalid body"), "CEP inválido");
}

#[tokio::test]
async fn test_lookup_service_failure_is_bad_gateway() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.viacep)
        .await;

    let resp = app.get("/api/cep/01310100").await;
    assert_eq!(resp.status(), 502);
}

// ============================================================================
// Autofill
// ============================================================================

#[tokio::test]
async fn test_autofill_keeps_typed_complement() {
    let app = TestApp::spawn().await;
    mount_paulista(&app).await;

    let resp = app
        .post_form(
            "/api/cep/autofill",
            &[
                ("cep", "01310100"),
                ("number", "1000"),
                ("complement", "Apto 12"),
                ("street", "rua antiga"),
            ],
        )
        .await;
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("Invalid autofill body");
    assert_eq!(body["cep"], "01310-100");
    assert_eq!(body["street"], "Avenida Paulista");
    assert_eq!(body["number"], "1000");
    assert_eq!(body["complement"], "Apto 12");
    assert_eq!(body["city"], "São Paulo");
}

#[tokio::test]
async fn test_autofill_fills_empty_complement() {
    let app = TestApp::spawn().await;
    mount_paulista(&app).await;

    let resp = app
        .post_form("/api/cep/autofill", &[("cep", "01310-100")])
        .await;
    let body: Value = resp.json().await.expect("Invalid autofill body");
    assert_eq!(body["complement"], "de 612 a 1510 - lado par");
}

#[tokio::test]
async fn test_autofill_unknown_cep_leaves_address_alone() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path("/99999999/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "erro": true })))
        .mount(&app.viacep)
        .await;

    let resp = app
        .post_form(
            "/api/cep/autofill",
            &[
                ("cep", "99999-999"),
                ("street", "Rua das Flores"),
                ("city", "Campinas"),
                ("state", "SP"),
            ],
        )
        .await;
    assert_eq!(resp.status(), 404);
    assert_eq!(
        resp.text().await.expect("Invalid body"),
        "CEP não encontrado"
    );
}
