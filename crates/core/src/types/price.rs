//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are kept as [`Decimal`] in the currency's standard unit (reais,
//! not centavos). The backend exchanges prices as decimal strings
//! (`"1800.00"`), which is what [`Price::charge_amount`] produces.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A price in Brazilian reais.
    #[must_use]
    pub const fn brl(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::BRL)
    }

    /// The amount rounded half-away-from-zero to two decimal places.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        let mut amount = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(2);
        amount
    }

    /// The amount as sent to the payment backend, e.g. `"1800.00"`.
    #[must_use]
    pub fn charge_amount(&self) -> String {
        self.rounded().to_string()
    }

    /// Localized display, e.g. `R$ 1.800,00`.
    #[must_use]
    pub fn display(&self) -> String {
        let text = self.rounded().abs().to_string();
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(self.currency_code.group_separator());
            }
            grouped.push(c);
        }

        let sign = if self.amount.is_sign_negative() && !self.rounded().is_zero() {
            "-"
        } else {
            ""
        };
        format!(
            "{sign}{} {grouped}{}{frac_part}",
            self.currency_code.symbol(),
            self.currency_code.decimal_separator()
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
}

impl CurrencyCode {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::BRL => "R$",
            Self::USD => "US$",
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::BRL => "BRL",
            Self::USD => "USD",
        }
    }

    const fn group_separator(self) -> char {
        match self {
            Self::BRL => '.',
            Self::USD => ',',
        }
    }

    const fn decimal_separator(self) -> char {
        match self {
            Self::BRL => ',',
            Self::USD => '.',
        }
    }
}
