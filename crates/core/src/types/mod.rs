//! Core types for Aprova Fácil.
//!
//! This module provides type-safe wrappers for the domain concepts shared by
//! the storefront: taxpayer documents, contact data, prices and the checkout
//! state machine.

pub mod address;
pub mod checkout;
pub mod document;
pub mod email;
pub mod id;
mod mask;
pub mod payment;
pub mod phone;
pub mod postal_code;
pub mod price;
pub mod product;

pub use address::{Address, AddressLookup};
pub use checkout::{
    CheckoutMachine, CheckoutState, IgnoreReason, MountGeneration, Transition, WidgetSlot,
};
pub use document::{
    DocumentError, DocumentKind, TaxDocument, format_document_input, is_valid_cnpj, is_valid_cpf,
};
pub use email::{Email, EmailError};
pub use id::*;
pub use mask::digits_only;
pub use payment::{PaymentFailure, PaymentMethod, PaymentMethodError, PaymentOutcome};
pub use phone::{Phone, PhoneError, format_phone_input};
pub use postal_code::{Cep, CepParseError, format_cep_input};
pub use price::{CurrencyCode, Price};
pub use product::{PersonType, PersonTypeError, Product};
