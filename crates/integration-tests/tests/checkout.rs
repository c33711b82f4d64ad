//! Integration tests for the checkout flow.
//!
//! The browser side of the card widget is played by the test: it relays
//! mount, ready and submit events exactly as the glue script does.

use std::time::Duration;

use aprova_facil_core::PersonType;
use aprova_facil_integration_tests::{
    ORDER_ID, TestApp, card_submission, location, mount_public_key, payment_response,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_payment(app: &TestApp, status: &str, detail: &str) {
    Mock::given(method("POST"))
        .and(path("/api/payment/process"))
        .respond_with(ResponseTemplate::new(201).set_body_json(payment_response(status, detail)))
        .mount(&app.backend)
        .await;
}

async fn submit_card(app: &TestApp, generation: u64) -> (u16, Value) {
    let resp = app
        .post_json("/checkout/card", &card_submission(generation))
        .await;
    let status = resp.status().as_u16();
    (status, resp.json().await.expect("Invalid card response"))
}

// ============================================================================
// Page & pricing
// ============================================================================

#[tokio::test]
async fn test_checkout_without_plan_goes_home() {
    let app = TestApp::spawn().await;
    app.login().await;

    let resp = app.get("/checkout").await;
    assert_eq!(location(&resp), "/?error=no_product");
}

#[tokio::test]
async fn test_checkout_creates_order_once() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(body_partial_json(json!({
            "items": [{ "product_id": 7, "quantity": 1 }],
            "person_type": "PF"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": ORDER_ID,
            "user_id": 11,
            "status": "pending",
            "person_type": "PF",
            "subtotal": "1500.00",
            "total": "1500.00"
        })))
        .expect(1)
        .mount(&app.backend)
        .await;
    app.login().await;
    app.select_plan("limpa-nome", PersonType::Pf).await;

    for _ in 0..2 {
        let resp = app.get("/checkout").await;
        assert_eq!(resp.status(), 200);
        let body = resp.text().await.expect("Failed to read checkout page");
        assert!(body.contains("R$ 1.500,00"));
    }
}

#[tokio::test]
async fn test_pj_checkout_charges_pj_price() {
    let app = TestApp::spawn().await;
    mount_public_key(&app.backend).await;

    let page = app.open_checkout(PersonType::Pj).await;
    assert!(page.contains("R$ 1.800,00"));

    let resp = app.get("/checkout/config").await;
    assert_eq!(resp.status(), 200);
    let config: Value = resp.json().await.expect("Invalid config body");
    assert_eq!(config["amount"], "1800.00");
    assert_eq!(config["public_key"], "TEST-pk-123");
    assert_eq!(config["payer"]["email"], "maria@example.com");
    assert_eq!(config["payer"]["identification"]["type"], "CPF");
    assert_eq!(config["payer"]["identification"]["number"], "52998224725");
    assert_eq!(config["order_id"], ORDER_ID);
}

#[tokio::test]
async fn test_missing_public_key_rejects_attempt() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path("/api/payment/public-key"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.backend)
        .await;
    app.open_checkout(PersonType::Pf).await;

    let resp = app.get("/checkout/config").await;
    assert_eq!(resp.status(), 503);
    let body: Value = resp.json().await.expect("Invalid config body");
    assert_eq!(body["status"]["state"], "rejected");
    assert_eq!(
        body["status"]["message"],
        "Não foi possível inicializar o pagamento"
    );
    assert_eq!(body["status"]["can_retry"], true);
}

// ============================================================================
// Card widget
// ============================================================================

#[tokio::test]
async fn test_card_payment_approved() {
    let app = TestApp::spawn().await;
    mount_payment(&app, "approved", "accredited").await;
    app.open_checkout(PersonType::Pf).await;

    let generation = app.mount_widget().await;
    let (status, body) = submit_card(&app, generation).await;
    assert_eq!(status, 200);
    assert_eq!(body["applied"], true);
    assert_eq!(body["status"]["state"], "approved");
    assert_eq!(body["status"]["payment_id"], "1234567890");
    assert!(
        body["status"]["whatsapp_link"]
            .as_str()
            .is_some_and(|link| link.starts_with("https://wa.me/")),
    );

    // A finished attempt cannot be remounted or resubmitted.
    let resp = app.post_json("/checkout/widget/mount", &json!({})).await;
    assert_eq!(resp.status(), 409);
    let (status, body) = submit_card(&app, generation).await;
    assert_eq!(status, 409);
    assert_eq!(body["reason"], "finished");
}

#[tokio::test]
async fn test_card_payment_rejected_then_retry() {
    let app = TestApp::spawn().await;
    mount_payment(&app, "rejected", "cc_rejected_insufficient_amount").await;
    app.open_checkout(PersonType::Pf).await;

    let generation = app.mount_widget().await;
    let (_, body) = submit_card(&app, generation).await;
    assert_eq!(body["status"]["state"], "rejected");
    assert_eq!(
        body["status"]["message"],
        "Pagamento recusado. Tente outro cartão."
    );
    assert_eq!(body["status"]["can_retry"], true);
    assert_eq!(
        body["status"]["status_detail"],
        "cc_rejected_insufficient_amount"
    );

    let resp = app.post_json("/checkout/retry", &json!({})).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("Invalid retry body");
    assert_eq!(body["status"]["state"], "idle");
    assert!(body["status"]["message"].is_null());
    assert!(body["status"]["payment_id"].is_null());

    let next = app.mount_widget().await;
    assert!(next > generation);
}

#[tokio::test]
async fn test_pending_payment_refreshes_details() {
    let app = TestApp::spawn().await;
    mount_payment(&app, "in_process", "pending_contingency").await;
    Mock::given(method("GET"))
        .and(path("/api/payment/99"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(payment_response("in_process", "pending_review_manual")),
        )
        .expect(1)
        .mount(&app.backend)
        .await;
    app.open_checkout(PersonType::Pf).await;

    let generation = app.mount_widget().await;
    let (_, body) = submit_card(&app, generation).await;
    assert_eq!(body["status"]["state"], "pending");
    assert_eq!(body["status"]["can_retry"], false);

    let resp = app.get("/checkout/status").await;
    let body: Value = resp.json().await.expect("Invalid status body");
    assert_eq!(body["state"], "pending");
    assert_eq!(body["status_detail"], "pending_review_manual");
}

#[tokio::test]
async fn test_backend_failure_rejects_payment() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/api/payment/process"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.backend)
        .await;
    app.open_checkout(PersonType::Pf).await;

    let generation = app.mount_widget().await;
    let (status, body) = submit_card(&app, generation).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"]["state"], "rejected");
    assert_eq!(
        body["status"]["message"],
        "Ocorreu um erro ao processar seu pagamento."
    );
}

#[tokio::test]
async fn test_double_submit_charges_once() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/api/payment/process"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(payment_response("approved", "accredited"))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&app.backend)
        .await;
    app.open_checkout(PersonType::Pf).await;
    let generation = app.mount_widget().await;

    let client = app.client.clone();
    let url = app.url("/checkout/card");
    let first = tokio::spawn(async move {
        client
            .post(url)
            .json(&card_submission(generation))
            .send()
            .await
            .expect("First submit failed")
    });
    tokio::time::sleep(Duration::from_millis(150)).await;

    let (status, body) = submit_card(&app, generation).await;
    assert_eq!(status, 409);
    assert_eq!(body["applied"], false);
    assert_eq!(body["reason"], "already_processing");
    assert_eq!(body["status"]["state"], "processing");

    let first = first.await.expect("First submit task panicked");
    assert_eq!(first.status(), 200);
    let body: Value = first.json().await.expect("Invalid card response");
    assert_eq!(body["status"]["state"], "approved");
}

#[tokio::test]
async fn test_stale_widget_callbacks_are_ignored() {
    let app = TestApp::spawn().await;
    app.open_checkout(PersonType::Pf).await;

    let old = app.mount_widget().await;
    let current = app.mount_widget().await;
    assert_ne!(old, current);

    let resp = app
        .post_json("/checkout/widget/error", &json!({ "generation": old }))
        .await;
    let body: Value = resp.json().await.expect("Invalid error body");
    assert_eq!(body["applied"], false);
    assert_eq!(body["reason"], "stale_mount");
    assert_eq!(body["status"]["state"], "ready");

    let (status, body) = submit_card(&app, old).await;
    assert_eq!(status, 409);
    assert_eq!(body["reason"], "stale_mount");
}

#[tokio::test]
async fn test_reloaded_page_mounts_fresh_widget() {
    let app = TestApp::spawn().await;
    app.open_checkout(PersonType::Pf).await;
    let old = app.mount_widget().await;

    let resp = app.get("/checkout").await;
    assert_eq!(resp.status(), 200);
    let page = resp.text().await.expect("Failed to read checkout page");
    assert!(page.contains(r#"data-state="idle""#));

    let resp = app.get("/checkout/status").await;
    let body: Value = resp.json().await.expect("Invalid status body");
    assert_eq!(body["state"], "idle");

    let (status, body) = submit_card(&app, old).await;
    assert_eq!(status, 409);
    assert_eq!(body["reason"], "stale_mount");

    let current = app.mount_widget().await;
    assert!(current > old);
}

#[tokio::test]
async fn test_sdk_failure_rejects_attempt() {
    let app = TestApp::spawn().await;
    app.open_checkout(PersonType::Pf).await;

    let resp = app
        .post_json(
            "/checkout/widget/error",
            &json!({ "sdk_unavailable": true, "message": "script blocked" }),
        )
        .await;
    let body: Value = resp.json().await.expect("Invalid error body");
    assert_eq!(body["applied"], true);
    assert_eq!(body["status"]["state"], "rejected");
    assert_eq!(
        body["status"]["message"],
        "Erro ao carregar SDK do Mercado Pago"
    );
}

#[tokio::test]
async fn test_card_submission_validates_installments() {
    let app = TestApp::spawn().await;
    app.open_checkout(PersonType::Pf).await;
    let generation = app.mount_widget().await;

    let mut submission = card_submission(generation);
    submission["installments"] = json!(0);
    let resp = app.post_json("/checkout/card", &submission).await;
    assert_eq!(resp.status(), 400);

    let resp = app.get("/checkout/status").await;
    let body: Value = resp.json().await.expect("Invalid status body");
    assert_eq!(body["state"], "ready");
}

// ============================================================================
// Pix / boleto
// ============================================================================

async fn select_pix(app: &TestApp) {
    let resp = app
        .post_form("/checkout/method", &[("method", "pix_boleto")])
        .await;
    assert_eq!(location(&resp), "/checkout");
}

#[tokio::test]
async fn test_pix_redirects_to_hosted_checkout() {
    let app = TestApp::spawn().await;
    let init_point = "https://www.mercadopago.com.br/checkout/v1/redirect?pref_id=123";
    Mock::given(method("POST"))
        .and(path("/api/payment/preference"))
        .and(body_partial_json(json!({
            "order_id": ORDER_ID,
            "payment_method": "pix_boleto"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "preference_id": "123",
            "init_point": init_point
        })))
        .expect(1)
        .mount(&app.backend)
        .await;
    app.open_checkout(PersonType::Pf).await;
    select_pix(&app).await;

    let resp = app.post_form("/checkout/pix-boleto", &[]).await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), init_point);
}

#[tokio::test]
async fn test_pix_refuses_insecure_checkout_url() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/api/payment/preference"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "preference_id": "123",
            "init_point": "http://phishing.example.com/pay"
        })))
        .mount(&app.backend)
        .await;
    app.open_checkout(PersonType::Pf).await;
    select_pix(&app).await;

    let resp = app.post_form("/checkout/pix-boleto", &[]).await;
    assert_eq!(location(&resp), "/checkout?error=payment");
}

#[tokio::test]
async fn test_pix_has_no_card_widget() {
    let app = TestApp::spawn().await;
    app.open_checkout(PersonType::Pf).await;
    select_pix(&app).await;

    let resp = app.post_json("/checkout/widget/mount", &json!({})).await;
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.expect("Invalid mount body");
    assert_eq!(body["reason"], "not_applicable");
    assert_eq!(body["status"]["method"], "pix_boleto");
    assert_eq!(body["status"]["state"], "ready");
}
