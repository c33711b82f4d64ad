//! Aprova Fácil Core - Shared domain types.
//!
//! This crate provides the domain types used by the storefront and its
//! integration tests:
//! - Brazilian taxpayer documents (CPF/CNPJ) with checksum validation
//! - Postal codes (CEP), phone numbers and email addresses
//! - Plans, person types (PF/PJ) and BRL prices
//! - Payment methods, provider statuses and the checkout state machine
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers and the checkout state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
