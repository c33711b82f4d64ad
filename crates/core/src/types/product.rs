//! Service plans and the PF/PJ pricing tier.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// Pricing tier: individual (PF) or company (PJ).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PersonType {
    #[default]
    #[serde(rename = "PF")]
    Pf,
    #[serde(rename = "PJ")]
    Pj,
}

impl PersonType {
    /// Wire code (`"PF"` / `"PJ"`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pf => "PF",
            Self::Pj => "PJ",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pf => "Pessoa Física",
            Self::Pj => "Pessoa Jurídica",
        }
    }
}

impl fmt::Display for PersonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error for an unrecognized person type code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("tipo de pessoa inválido: {0}")]
pub struct PersonTypeError(String);

impl std::str::FromStr for PersonType {
    type Err = PersonTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PF" => Ok(Self::Pf),
            "PJ" => Ok(Self::Pj),
            _ => Err(PersonTypeError(s.to_owned())),
        }
    }
}

/// A service plan offered in the storefront.
///
/// The slug is the stable identifier used in forms and the session; the
/// backend's numeric id is attached once the backend catalog has been
/// fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub deliverables: Vec<String>,
    /// Estimated turnaround, e.g. "30 a 60 dias úteis".
    pub deadline: String,
    pub deadline_note: Option<String>,
    pub payment_terms: String,
    pub price_pf: Decimal,
    pub price_pj: Decimal,
    pub backend_id: Option<ProductId>,
}

impl Product {
    /// Price charged for the given tier, in BRL.
    #[must_use]
    pub const fn price_for(&self, person_type: PersonType) -> Price {
        match person_type {
            PersonType::Pf => Price::brl(self.price_pf),
            PersonType::Pj => Price::brl(self.price_pj),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn limpa_nome() -> Product {
        Product {
            slug: "limpa-nome".to_string(),
            name: "LIMPA NOME".to_string(),
            description: String::new(),
            deliverables: vec![],
            deadline: "30 a 60 dias úteis".to_string(),
            deadline_note: None,
            payment_terms: String::new(),
            price_pf: Decimal::from(1500),
            price_pj: Decimal::from(1800),
            backend_id: None,
        }
    }

    #[test]
    fn test_price_for_person_type() {
        let product = limpa_nome();
        assert_eq!(product.price_for(PersonType::Pf).charge_amount(), "1500.00");
        assert_eq!(product.price_for(PersonType::Pj).charge_amount(), "1800.00");
        assert_eq!(product.price_for(PersonType::Pj).display(), "R$ 1.800,00");
    }

    #[test]
    fn test_person_type_serde_codes() {
        assert_eq!(serde_json::to_string(&PersonType::Pj).unwrap(), "\"PJ\"");
        let parsed: PersonType = serde_json::from_str("\"PF\"").unwrap();
        assert_eq!(parsed, PersonType::Pf);
    }

    #[test]
    fn test_person_type_from_str() {
        assert_eq!("pj".parse::<PersonType>().unwrap(), PersonType::Pj);
        assert!("PX".parse::<PersonType>().is_err());
        assert_eq!(PersonType::default(), PersonType::Pf);
    }
}
