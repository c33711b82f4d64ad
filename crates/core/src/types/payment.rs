//! Payment methods, provider status mapping and user-facing failures.

use core::fmt;

use serde::{Deserialize, Serialize};

/// How the customer chose to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    DebitCard,
    /// Pix or boleto, chosen on the provider's hosted checkout.
    PixBoleto,
}

impl PaymentMethod {
    pub const ALL: [Self; 3] = [Self::CreditCard, Self::DebitCard, Self::PixBoleto];

    /// Card methods are paid through the embedded widget; the rest redirect.
    #[must_use]
    pub const fn is_card(self) -> bool {
        matches!(self, Self::CreditCard | Self::DebitCard)
    }

    #[must_use]
    pub const fn max_installments(self) -> u8 {
        match self {
            Self::CreditCard => 12,
            Self::DebitCard | Self::PixBoleto => 1,
        }
    }

    /// Wire code, also used as the widget's card type.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
            Self::PixBoleto => "pix_boleto",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreditCard => "Cartão de Crédito",
            Self::DebitCard => "Cartão de Débito",
            Self::PixBoleto => "Pix ou Boleto",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error for an unrecognized payment method code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("forma de pagamento inválida: {0}")]
pub struct PaymentMethodError(String);

impl std::str::FromStr for PaymentMethod {
    type Err = PaymentMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.code() == s)
            .ok_or_else(|| PaymentMethodError(s.to_owned()))
    }
}

/// Why a payment attempt ended without success.
///
/// Each variant carries a fixed message shown to the customer; provider and
/// backend details are logged, never displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFailure {
    /// The public key could not be fetched.
    PublicKeyUnavailable,
    /// The provider's script failed to load.
    SdkUnavailable,
    /// The card widget reported an error.
    WidgetError,
    /// The provider declined the payment.
    Rejected,
    /// The provider answered with a status we do not know.
    UnknownStatus,
    /// The backend call failed.
    ProcessingError,
}

impl PaymentFailure {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::PublicKeyUnavailable => "Não foi possível inicializar o pagamento",
            Self::SdkUnavailable => "Erro ao carregar SDK do Mercado Pago",
            Self::WidgetError => "Erro ao carregar formulário de pagamento.",
            Self::Rejected => "Pagamento recusado. Tente outro cartão.",
            Self::UnknownStatus => "Status desconhecido. Tente novamente.",
            Self::ProcessingError => "Ocorreu um erro ao processar seu pagamento.",
        }
    }
}

impl fmt::Display for PaymentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of a processed payment, as far as the customer is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "failure")]
pub enum PaymentOutcome {
    Approved,
    Pending,
    Rejected(PaymentFailure),
}

impl PaymentOutcome {
    /// Map the provider's status string.
    ///
    /// `pending` and `in_process` both mean the payment is still being
    /// reviewed. Anything unrecognized is treated as a rejection.
    #[must_use]
    pub fn from_provider_status(status: &str) -> Self {
        match status {
            "approved" => Self::Approved,
            "pending" | "in_process" => Self::Pending,
            "rejected" => Self::Rejected(PaymentFailure::Rejected),
            _ => Self::Rejected(PaymentFailure::UnknownStatus),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_status_mapping() {
        assert_eq!(
            PaymentOutcome::from_provider_status("approved"),
            PaymentOutcome::Approved
        );
        assert_eq!(
            PaymentOutcome::from_provider_status("pending"),
            PaymentOutcome::Pending
        );
        assert_eq!(
            PaymentOutcome::from_provider_status("in_process"),
            PaymentOutcome::Pending
        );
        assert_eq!(
            PaymentOutcome::from_provider_status("rejected"),
            PaymentOutcome::Rejected(PaymentFailure::Rejected)
        );
        assert_eq!(
            PaymentOutcome::from_provider_status("charged_back"),
            PaymentOutcome::Rejected(PaymentFailure::UnknownStatus)
        );
        assert_eq!(
            PaymentOutcome::from_provider_status(""),
            PaymentOutcome::Rejected(PaymentFailure::UnknownStatus)
        );
    }

    #[test]
    fn test_payment_method_codes() {
        for method in PaymentMethod::ALL {
            assert_eq!(method.code().parse::<PaymentMethod>().unwrap(), method);
            assert_eq!(
                serde_json::to_value(method).unwrap(),
                serde_json::Value::String(method.code().to_string())
            );
        }
        assert!("boleto".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_card_methods() {
        assert!(PaymentMethod::CreditCard.is_card());
        assert!(PaymentMethod::DebitCard.is_card());
        assert!(!PaymentMethod::PixBoleto.is_card());
        assert_eq!(PaymentMethod::CreditCard.max_installments(), 12);
        assert_eq!(PaymentMethod::DebitCard.max_installments(), 1);
    }

    #[test]
    fn test_unknown_status_message() {
        assert_eq!(
            PaymentFailure::UnknownStatus.to_string(),
            "Status desconhecido. Tente novamente."
        );
    }
}
