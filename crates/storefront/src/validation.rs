//! Form validation.
//!
//! Each validator returns either the normalized values ready for the
//! backend or the per-field error messages shown inline next to the inputs.

use std::collections::BTreeMap;

use serde::Deserialize;

use aprova_facil_core::{Address, Cep, Email, Phone, TaxDocument};

/// Message shown when a required field of the contact forms is blank.
pub const FILL_ALL_FIELDS: &str = "Por favor, preencha todos os campos";

const REQUIRED: &str = "Obrigatório";

/// Per-field error messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. The first error for a field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(value)` when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns the collected errors when any field failed.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}

fn min_len(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    min: usize,
    message: &str,
) -> String {
    if char_len(value) < min {
        errors.add(field, message);
    }
    value.trim().to_owned()
}

fn required(errors: &mut FieldErrors, field: &'static str, value: &str) -> String {
    min_len(errors, field, value, 1, REQUIRED)
}

// =============================================================================
// Address
// =============================================================================

/// Validate and normalize address fields (CEP masked, UF uppercase).
pub fn validate_address(address: &Address, errors: &mut FieldErrors) -> Address {
    let cep = match Cep::parse(&address.cep) {
        Ok(cep) => cep.formatted(),
        Err(e) => {
            errors.add("cep", e.to_string());
            address.cep.trim().to_owned()
        }
    };

    let state = address.state.trim().to_uppercase();
    if state.chars().count() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
        errors.add("state", "UF inválido");
    }

    Address {
        cep,
        street: min_len(errors, "street", &address.street, 3, "Rua inválida"),
        number: min_len(errors, "number", &address.number, 1, REQUIRED),
        complement: address.complement.trim().to_owned(),
        neighborhood: min_len(errors, "neighborhood", &address.neighborhood, 2, "Bairro inválido"),
        city: min_len(errors, "city", &address.city, 2, "Cidade inválida"),
        state,
    }
}

fn validate_name(errors: &mut FieldErrors, name: &str) -> String {
    min_len(errors, "name", name, 3, "Nome deve ter pelo menos 3 caracteres")
}

fn validate_document(errors: &mut FieldErrors, value: &str) -> Option<TaxDocument> {
    TaxDocument::parse(value)
        .map_err(|e| errors.add("document", e.to_string()))
        .ok()
}

fn validate_phone(errors: &mut FieldErrors, value: &str) -> Option<Phone> {
    Phone::parse(value)
        .map_err(|e| errors.add("phone", e.to_string()))
        .ok()
}

fn validate_email(errors: &mut FieldErrors, value: &str) -> Option<Email> {
    Email::parse(value)
        .map_err(|e| errors.add("email", e.to_string()))
        .ok()
}

// =============================================================================
// Registration & profile
// =============================================================================

/// Registration form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub document: String,
    pub phone: String,
    pub cep: String,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub next: Option<String>,
}

impl RegistrationForm {
    #[must_use]
    pub fn address(&self) -> Address {
        Address {
            cep: self.cep.clone(),
            street: self.street.clone(),
            number: self.number.clone(),
            complement: self.complement.clone(),
            neighborhood: self.neighborhood.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
        }
    }

    /// Copy of the form safe to render back into the page.
    #[must_use]
    pub fn without_passwords(mut self) -> Self {
        self.password.clear();
        self.password_confirm.clear();
        self
    }
}

/// Registration data that passed validation.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub name: String,
    pub email: Email,
    pub password: String,
    pub document: TaxDocument,
    pub phone: Phone,
    pub address: Address,
}

/// Validate a registration form.
///
/// # Errors
///
/// Returns every failing field with its message.
pub fn validate_registration(form: &RegistrationForm) -> Result<ValidRegistration, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = validate_name(&mut errors, &form.name);
    let email = validate_email(&mut errors, &form.email);
    if form.password.chars().count() < 6 {
        errors.add("password", "Senha deve ter pelo menos 6 caracteres");
    }
    if form.password != form.password_confirm {
        errors.add("password_confirm", "Senhas não conferem");
    }
    let document = validate_document(&mut errors, &form.document);
    let phone = validate_phone(&mut errors, &form.phone);
    let address = validate_address(&form.address(), &mut errors);

    match (email, document, phone) {
        (Some(email), Some(document), Some(phone)) if errors.is_empty() => {
            Ok(ValidRegistration {
                name,
                email,
                password: form.password.clone(),
                document,
                phone,
                address,
            })
        }
        _ => Err(errors),
    }
}

/// Profile form on the account page. Email and password are not editable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub name: String,
    pub document: String,
    pub phone: String,
    pub cep: String,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

impl ProfileForm {
    #[must_use]
    pub fn address(&self) -> Address {
        Address {
            cep: self.cep.clone(),
            street: self.street.clone(),
            number: self.number.clone(),
            complement: self.complement.clone(),
            neighborhood: self.neighborhood.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidProfile {
    pub name: String,
    pub document: TaxDocument,
    pub phone: Phone,
    pub address: Address,
}

/// Validate a profile update.
///
/// # Errors
///
/// Returns every failing field with its message.
pub fn validate_profile(form: &ProfileForm) -> Result<ValidProfile, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = validate_name(&mut errors, &form.name);
    let document = validate_document(&mut errors, &form.document);
    let phone = validate_phone(&mut errors, &form.phone);
    let address = validate_address(&form.address(), &mut errors);

    match (document, phone) {
        (Some(document), Some(phone)) if errors.is_empty() => Ok(ValidProfile {
            name,
            document,
            phone,
            address,
        }),
        _ => Err(errors),
    }
}

// =============================================================================
// Contact & simulation
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

/// Validate the contact form.
///
/// # Errors
///
/// Returns the blank fields and an invalid e-mail.
pub fn validate_contact(form: &ContactForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    required(&mut errors, "name", &form.name);
    required(&mut errors, "email", &form.email);
    required(&mut errors, "phone", &form.phone);
    required(&mut errors, "message", &form.message);
    if !errors.has("email") {
        validate_email(&mut errors, &form.email);
    }
    errors.finish(())
}

/// Financing types offered on the simulation form, as `(code, label)`.
pub const FINANCING_TYPES: &[(&str, &str)] = &[
    ("compra", "Compra de Imóvel"),
    ("terreno-construcao", "Terreno + Construção"),
    ("construcao", "Construção em Terreno Próprio"),
    ("mcmv", "Minha Casa Minha Vida"),
    ("credito-real", "Crédito Real Caixa"),
    ("outro", "Outro"),
];

#[must_use]
pub fn financing_type_label(code: &str) -> Option<&'static str> {
    FINANCING_TYPES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimulationForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub property_value: String,
    pub monthly_income: String,
    pub financing_type: String,
}

/// Validate the credit simulation form.
///
/// # Errors
///
/// Returns the blank fields, an invalid e-mail and an unknown financing type.
pub fn validate_simulation(form: &SimulationForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    required(&mut errors, "name", &form.name);
    required(&mut errors, "phone", &form.phone);
    required(&mut errors, "email", &form.email);
    required(&mut errors, "property_value", &form.property_value);
    required(&mut errors, "monthly_income", &form.monthly_income);
    required(&mut errors, "financing_type", &form.financing_type);
    if !errors.has("email") {
        validate_email(&mut errors, &form.email);
    }
    if !errors.has("financing_type") && financing_type_label(form.financing_type.trim()).is_none() {
        errors.add("financing_type", "Tipo de financiamento inválido");
    }
    errors.finish(())
}
