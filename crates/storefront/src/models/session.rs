//! Session-related types.
//!
//! Everything the storefront remembers about a browser lives here: the
//! logged-in customer, the selected plan and the payment attempt.

use core::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use aprova_facil_core::{
    Address, CheckoutMachine, CustomerId, OrderId, PaymentMethod, PersonType,
};

use crate::backend::{PaymentResponse, UserResponse};

/// Session-stored customer identity and profile.
///
/// Holds the backend bearer token; `Debug` never prints it.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub document: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: Address,
    token: String,
}

impl CurrentCustomer {
    /// Build the session identity from the backend profile and login token.
    #[must_use]
    pub fn from_user(user: UserResponse, token: &SecretString) -> Self {
        use secrecy::ExposeSecret;

        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            document: user.cpf.unwrap_or_default(),
            phone: user.phone.unwrap_or_default(),
            address: Address {
                cep: user.cep.unwrap_or_default(),
                street: user.street.unwrap_or_default(),
                number: user.number.unwrap_or_default(),
                complement: user.complement.unwrap_or_default(),
                neighborhood: user.neighborhood.unwrap_or_default(),
                city: user.city.unwrap_or_default(),
                state: user.state.unwrap_or_default(),
            },
            token: token.expose_secret().to_owned(),
        }
    }

    /// Refresh profile fields after an update, keeping the token.
    pub fn update_profile(&mut self, user: UserResponse) {
        let token = SecretString::from(core::mem::take(&mut self.token));
        *self = Self::from_user(user, &token);
    }

    /// Bearer token for backend calls.
    #[must_use]
    pub fn token(&self) -> SecretString {
        SecretString::from(self.token.clone())
    }

    /// First name, for greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

impl fmt::Debug for CurrentCustomer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentCustomer")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// The plan selected for checkout. Exactly one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub product_slug: String,
    #[serde(default)]
    pub person_type: PersonType,
}

/// Payment attempt bound to the current cart.
///
/// The order id is kept so reloading the checkout page reuses the order
/// instead of creating another one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub product_slug: String,
    pub person_type: PersonType,
    pub order_id: Option<OrderId>,
    pub machine: CheckoutMachine,
    #[serde(default)]
    pub last_payment: Option<PaymentResponse>,
}

impl CheckoutSession {
    #[must_use]
    pub fn new(cart: &Cart) -> Self {
        Self {
            product_slug: cart.product_slug.clone(),
            person_type: cart.person_type,
            order_id: None,
            machine: CheckoutMachine::new(PaymentMethod::default()),
            last_payment: None,
        }
    }

    /// Whether this attempt was started for the given cart.
    #[must_use]
    pub fn matches(&self, cart: &Cart) -> bool {
        self.product_slug == cart.product_slug && self.person_type == cart.person_type
    }
}

/// Session keys.
pub mod keys {
    /// Key for the logged-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the selected plan.
    pub const CART: &str = "cart";

    /// Key for the payment attempt.
    pub const CHECKOUT: &str = "checkout";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> UserResponse {
        serde_json::from_value(serde_json::json!({
            "id": 5,
            "name": "Maria da Silva",
            "email": "maria@exemplo.com.br",
            "cpf": "111.444.777-35",
            "city": "São Paulo"
        }))
        .unwrap()
    }

    #[test]
    fn test_debug_redacts_token() {
        let customer = CurrentCustomer::from_user(user(), &SecretString::from("tok-123"));
        let debug = format!("{customer:?}");
        assert!(!debug.contains("tok-123"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_session_roundtrip_keeps_token() {
        use secrecy::ExposeSecret;

        let customer = CurrentCustomer::from_user(user(), &SecretString::from("tok-123"));
        let json = serde_json::to_value(&customer).unwrap();
        let restored: CurrentCustomer = serde_json::from_value(json).unwrap();
        assert_eq!(restored.token().expose_secret(), "tok-123");
        assert_eq!(restored.address.city, "São Paulo");
        assert_eq!(restored.first_name(), "Maria");
    }

    #[test]
    fn test_update_profile_keeps_token() {
        use secrecy::ExposeSecret;

        let mut customer = CurrentCustomer::from_user(user(), &SecretString::from("tok-123"));
        let mut updated = user();
        updated.name = "Maria Souza".to_string();
        customer.update_profile(updated);
        assert_eq!(customer.name, "Maria Souza");
        assert_eq!(customer.token().expose_secret(), "tok-123");
    }

    #[test]
    fn test_checkout_matches_cart() {
        let cart = Cart {
            product_slug: "limpa-nome".to_string(),
            person_type: PersonType::Pf,
        };
        let checkout = CheckoutSession::new(&cart);
        assert!(checkout.matches(&cart));

        let pj = Cart {
            person_type: PersonType::Pj,
            ..cart
        };
        assert!(!checkout.matches(&pj));
    }
}
