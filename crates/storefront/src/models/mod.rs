//! Session-held models for the storefront.

pub mod session;

pub use session::{Cart, CheckoutSession, CurrentCustomer, keys};
