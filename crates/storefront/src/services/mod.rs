//! Outbound integrations other than the backend API.
//!
//! - `cep` - Postal code lookup (ViaCEP)
//! - `whatsapp` - Pre-filled WhatsApp deep links

pub mod cep;
pub mod whatsapp;

pub use cep::{CepClient, CepError};
pub use whatsapp::WhatsApp;
