//! Contact and credit simulation forms.
//!
//! Neither form is stored: a valid submission redirects to WhatsApp with
//! the answers typed into the message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use super::PageContext;
use crate::content;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{CspNonce, OptionalAuth};
use crate::services::WhatsApp;
use crate::state::AppState;
use crate::validation::{
    ContactForm, FILL_ALL_FIELDS, FINANCING_TYPES, FieldErrors, SimulationForm,
    financing_type_label, validate_contact, validate_simulation,
};

// =============================================================================
// Templates
// =============================================================================

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub page: PageContext,
    pub form: ContactForm,
    pub errors: FieldErrors,
    pub error: Option<&'static str>,
    pub phone: &'static str,
    pub email: &'static str,
    pub location: &'static str,
    pub hours: &'static str,
}

/// Simulation page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/simulate.html")]
pub struct SimulateTemplate {
    pub page: PageContext,
    pub form: SimulationForm,
    pub errors: FieldErrors,
    pub error: Option<&'static str>,
    pub financing_options: Vec<FinancingOption>,
}

/// One entry of the financing type select.
#[derive(Debug, Clone)]
pub struct FinancingOption {
    pub code: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn financing_options(selected: &str) -> Vec<FinancingOption> {
    FINANCING_TYPES
        .iter()
        .map(|&(code, label)| FinancingOption {
            code,
            label,
            selected: code == selected.trim(),
        })
        .collect()
}

// =============================================================================
// Messages
// =============================================================================

/// WhatsApp link for a contact submission.
#[must_use]
pub fn contact_link(whatsapp: &WhatsApp, form: &ContactForm) -> String {
    whatsapp.form_link(
        "Olá! Contato via site:",
        &[
            ("Nome", &form.name),
            ("E-mail", &form.email),
            ("Telefone", &form.phone),
            ("Mensagem", &form.message),
        ],
    )
}

/// WhatsApp link for a simulation request.
#[must_use]
pub fn simulation_link(whatsapp: &WhatsApp, form: &SimulationForm) -> String {
    let property_value = format!("R$ {}", form.property_value.trim());
    let monthly_income = format!("R$ {}", form.monthly_income.trim());
    let financing_type =
        financing_type_label(form.financing_type.trim()).unwrap_or(form.financing_type.as_str());
    whatsapp.form_link(
        "Olá! Gostaria de simular um financiamento:",
        &[
            ("Nome", &form.name),
            ("Telefone", &form.phone),
            ("E-mail", &form.email),
            ("Valor do imóvel", &property_value),
            ("Renda mensal", &monthly_income),
            ("Tipo de financiamento", financing_type),
        ],
    )
}

// =============================================================================
// Handlers
// =============================================================================

fn contact_template(
    page: PageContext,
    form: ContactForm,
    errors: FieldErrors,
) -> ContactTemplate {
    let error = (!errors.is_empty()).then_some(FILL_ALL_FIELDS);
    ContactTemplate {
        page,
        form,
        errors,
        error,
        phone: content::contact::PHONE,
        email: content::contact::EMAIL,
        location: content::contact::LOCATION,
        hours: content::contact::HOURS,
    }
}

/// Display the contact page.
#[instrument(skip(state, nonce, customer))]
pub async fn contact_page(
    State(state): State<AppState>,
    nonce: CspNonce,
    OptionalAuth(customer): OptionalAuth,
) -> impl IntoResponse {
    let form = ContactForm {
        name: customer.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
        email: customer.as_ref().map(|c| c.email.clone()).unwrap_or_default(),
        phone: customer.as_ref().map(|c| c.phone.clone()).unwrap_or_default(),
        message: String::new(),
    };
    contact_template(
        PageContext::new(&state, nonce.value(), customer.as_ref()),
        form,
        FieldErrors::new(),
    )
}

/// Handle the contact form.
#[instrument(skip_all)]
pub async fn submit_contact(
    State(state): State<AppState>,
    nonce: CspNonce,
    OptionalAuth(customer): OptionalAuth,
    Form(form): Form<ContactForm>,
) -> Response {
    match validate_contact(&form) {
        Ok(()) => {
            add_breadcrumb("contact", "Contact form sent to WhatsApp", None);
            Redirect::to(&contact_link(state.whatsapp(), &form)).into_response()
        }
        Err(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            contact_template(
                PageContext::new(&state, nonce.value(), customer.as_ref()),
                form,
                errors,
            ),
        )
            .into_response(),
    }
}

/// Display the simulation page.
#[instrument(skip(state, nonce, customer))]
pub async fn simulate_page(
    State(state): State<AppState>,
    nonce: CspNonce,
    OptionalAuth(customer): OptionalAuth,
) -> impl IntoResponse {
    let form = SimulationForm {
        name: customer.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
        email: customer.as_ref().map(|c| c.email.clone()).unwrap_or_default(),
        phone: customer.as_ref().map(|c| c.phone.clone()).unwrap_or_default(),
        ..SimulationForm::default()
    };
    SimulateTemplate {
        page: PageContext::new(&state, nonce.value(), customer.as_ref()),
        form,
        errors: FieldErrors::new(),
        error: None,
        financing_options: financing_options(""),
    }
}

/// Handle the simulation form.
#[instrument(skip_all)]
pub async fn submit_simulation(
    State(state): State<AppState>,
    nonce: CspNonce,
    OptionalAuth(customer): OptionalAuth,
    Form(form): Form<SimulationForm>,
) -> Response {
    match validate_simulation(&form) {
        Ok(()) => {
            add_breadcrumb("simulation", "Simulation sent to WhatsApp", None);
            Redirect::to(&simulation_link(state.whatsapp(), &form)).into_response()
        }
        Err(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            SimulateTemplate {
                page: PageContext::new(&state, nonce.value(), customer.as_ref()),
                financing_options: financing_options(&form.financing_type),
                form,
                errors,
                error: Some(FILL_ALL_FIELDS),
            },
        )
            .into_response(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn decoded_text(link: &str) -> String {
        urlencoding::decode(link.split_once("text=").unwrap().1)
            .unwrap()
            .into_owned()
    }

    #[test]
    fn test_contact_message() {
        let link = contact_link(
            &WhatsApp::new("5511999999999"),
            &ContactForm {
                name: "Maria".to_string(),
                email: "maria@exemplo.com.br".to_string(),
                phone: "(11) 99999-8888".to_string(),
                message: "Quero limpar meu nome".to_string(),
            },
        );
        assert!(link.starts_with("https://wa.me/5511999999999?text="));
        assert_eq!(
            decoded_text(&link),
            "Olá! Contato via site:\n\nNome: Maria\nE-mail: maria@exemplo.com.br\nTelefone: (11) 99999-8888\nMensagem: Quero limpar meu nome"
        );
    }

    #[test]
    fn test_simulation_message_uses_labels() {
        let link = simulation_link(
            &WhatsApp::new("5511999999999"),
            &SimulationForm {
                name: "João".to_string(),
                phone: "11999998888".to_string(),
                email: "joao@exemplo.com.br".to_string(),
                property_value: "350.000".to_string(),
                monthly_income: "9.000".to_string(),
                financing_type: "mcmv".to_string(),
            },
        );
        let text = decoded_text(&link);
        assert!(text.starts_with("Olá! Gostaria de simular um financiamento:\n\n"));
        assert!(text.contains("Valor do imóvel: R$ 350.000"));
        assert!(text.contains("Tipo de financiamento: Minha Casa Minha Vida"));
    }
}
