//! Request and response bodies for the backend REST API.
//!
//! Monetary values travel as decimal strings (`"1800.00"`); timestamps are
//! kept as the raw strings the backend sends and formatted for display by
//! the `br_date` template filter.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use aprova_facil_core::{
    Address, CustomerId, OrderId, PaymentId, PaymentMethod, PersonType, ProductId,
};

// =============================================================================
// Auth
// =============================================================================

/// `POST /api/auth/register`
#[derive(Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub cpf: &'a str,
    pub phone: &'a str,
    #[serde(flatten)]
    pub address: AddressFields<'a>,
}

/// Address fields shared by registration and profile updates.
#[derive(Serialize)]
pub struct AddressFields<'a> {
    pub cep: &'a str,
    pub street: &'a str,
    pub number: &'a str,
    pub complement: &'a str,
    pub neighborhood: &'a str,
    pub city: &'a str,
    pub state: &'a str,
}

impl<'a> From<&'a Address> for AddressFields<'a> {
    fn from(address: &'a Address) -> Self {
        Self {
            cep: &address.cep,
            street: &address.street,
            number: &address.number,
            complement: &address.complement,
            neighborhood: &address.neighborhood,
            city: &address.city,
            state: &address.state,
        }
    }
}

/// `POST /api/auth/login`
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Bearer token returned by login. Deliberately not `Debug`.
#[derive(Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// `GET /api/auth/me`
#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cep: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub complement: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `PATCH /api/auth/me`
#[derive(Serialize)]
pub struct UserUpdate<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub cpf: &'a str,
    #[serde(flatten)]
    pub address: AddressFields<'a>,
}

// =============================================================================
// Products & Orders
// =============================================================================

/// `GET /api/products`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_pf: Decimal,
    pub price_pj: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct OrderItemCreate {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// `POST /api/orders`
#[derive(Debug, Serialize)]
pub struct OrderCreate {
    pub items: Vec<OrderItemCreate>,
    pub person_type: PersonType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemResponse {
    pub id: i64,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub user_id: CustomerId,
    pub status: String,
    pub person_type: PersonType,
    pub subtotal: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemResponse>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
}

impl OrderResponse {
    /// Portuguese label for the order status.
    #[must_use]
    pub fn status_label(&self) -> &str {
        match self.status.as_str() {
            "pending" => "Aguardando pagamento",
            "paid" => "Pago",
            "processing" => "Em andamento",
            "completed" => "Concluído",
            "cancelled" => "Cancelado",
            other => other,
        }
    }

    /// Names of the ordered products, comma separated.
    #[must_use]
    pub fn product_names(&self) -> String {
        self.items
            .iter()
            .map(|i| i.product_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// =============================================================================
// Payments
// =============================================================================

/// `POST /api/payment/preference`
#[derive(Debug, Serialize)]
pub struct PreferenceRequest {
    pub order_id: OrderId,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreferenceResponse {
    pub preference_id: String,
    pub init_point: String,
    #[serde(default)]
    pub sandbox_init_point: Option<String>,
}

/// `POST /api/payment/process`, built from the card widget's submit payload.
#[derive(Serialize)]
pub struct CardPaymentRequest {
    pub order_id: OrderId,
    pub token: String,
    pub installments: u32,
    pub payment_method_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub payment_id: PaymentId,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub mp_payment_id: Option<String>,
    #[serde(default)]
    pub mp_preference_id: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    pub status: String,
    #[serde(default)]
    pub status_detail: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub pix_qr_code: Option<String>,
    #[serde(default)]
    pub pix_qr_code_base64: Option<String>,
    #[serde(default)]
    pub boleto_url: Option<String>,
    #[serde(default)]
    pub boleto_barcode: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
}

impl PaymentResponse {
    /// Identifier shown to the customer: the provider's id when known.
    #[must_use]
    pub fn display_id(&self) -> String {
        self.mp_payment_id
            .clone()
            .unwrap_or_else(|| self.payment_id.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct PublicKeyResponse {
    pub public_key: String,
}

// =============================================================================
// Errors
// =============================================================================

/// Error body. FastAPI-style backends put a string or a list of validation
/// errors in `detail`; others use `message`.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    pub const FALLBACK_MESSAGE: &'static str = "Erro na requisição";

    /// The most specific message available.
    #[must_use]
    pub fn into_message(self) -> String {
        let detail = match self.detail {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
            Some(serde_json::Value::Array(items)) => items.into_iter().find_map(|item| {
                item.get("msg")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_owned)
            }),
            _ => None,
        };
        detail
            .or(self.message.filter(|m| !m.is_empty()))
            .unwrap_or_else(|| Self::FALLBACK_MESSAGE.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn message(body: &str) -> String {
        serde_json::from_str::<ApiErrorBody>(body)
            .unwrap_or_default()
            .into_message()
    }

    #[test]
    fn test_error_message_prefers_detail() {
        assert_eq!(
            message(r#"{"detail": "Email já cadastrado", "message": "x"}"#),
            "Email já cadastrado"
        );
        assert_eq!(message(r#"{"message": "Pedido não encontrado"}"#), "Pedido não encontrado");
    }

    #[test]
    fn test_error_message_from_validation_list() {
        assert_eq!(
            message(r#"{"detail": [{"loc": ["body", "email"], "msg": "value is not a valid email"}]}"#),
            "value is not a valid email"
        );
    }

    #[test]
    fn test_error_message_fallback() {
        assert_eq!(message("{}"), "Erro na requisição");
        assert_eq!(message("<html>502</html>"), "Erro na requisição");
        assert_eq!(message(r#"{"detail": ""}"#), "Erro na requisição");
    }

    #[test]
    fn test_product_prices_parse_from_strings() {
        let product: ProductResponse = serde_json::from_str(
            r#"{"id": 3, "name": "SCORE", "slug": "score", "price_pf": "800.00", "price_pj": "1000.00"}"#,
        )
        .unwrap();
        assert_eq!(product.price_pj, Decimal::from(1000));
        assert!(product.is_active);
    }

    #[test]
    fn test_order_status_label() {
        let order: OrderResponse = serde_json::from_str(
            r#"{"id": 1, "user_id": 2, "status": "paid", "person_type": "PJ",
                "subtotal": "1800.00", "total": "1800.00",
                "items": [{"id": 1, "product_id": 1, "product_name": "LIMPA NOME",
                           "quantity": 1, "unit_price": "1800.00", "total_price": "1800.00"}]}"#,
        )
        .unwrap();
        assert_eq!(order.status_label(), "Pago");
        assert_eq!(order.person_type, PersonType::Pj);
        assert_eq!(order.product_names(), "LIMPA NOME");
    }

    #[test]
    fn test_register_request_flattens_address() {
        let body = RegisterRequest {
            name: "Maria Silva",
            email: "maria@exemplo.com.br",
            password: "segredo1",
            cpf: "111.444.777-35",
            phone: "(11) 99999-8888",
            address: AddressFields {
                cep: "01310-100",
                street: "Avenida Paulista",
                number: "1000",
                complement: "",
                neighborhood: "Bela Vista",
                city: "São Paulo",
                state: "SP",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["street"], "Avenida Paulista");
        assert_eq!(json["cpf"], "111.444.777-35");
    }
}
