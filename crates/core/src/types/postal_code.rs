//! Brazilian postal code (CEP).

use core::fmt;

use serde::{Deserialize, Serialize};

use super::mask::{apply_mask, digits_only};

const CEP_MASK: [(usize, &str); 1] = [(5, "-")];

/// Errors that can occur when parsing a [`Cep`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CepParseError {
    #[error("CEP obrigatório")]
    Empty,
    #[error("CEP inválido")]
    WrongLength,
}

/// An 8-digit CEP, stored without the dash.
///
/// ```
/// use aprova_facil_core::Cep;
///
/// let cep = Cep::parse("01310-100").unwrap();
/// assert_eq!(cep.as_str(), "01310100");
/// assert_eq!(cep.formatted(), "01310-100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cep(String);

impl Cep {
    /// Number of digits in a CEP.
    pub const LENGTH: usize = 8;

    /// Parse a CEP, ignoring the mask.
    ///
    /// # Errors
    ///
    /// Returns [`CepParseError::Empty`] when no digits are present and
    /// [`CepParseError::WrongLength`] for anything other than 8 digits.
    pub fn parse(input: &str) -> Result<Self, CepParseError> {
        let digits = digits_only(input);
        match digits.len() {
            0 => Err(CepParseError::Empty),
            Self::LENGTH => Ok(Self(digits)),
            _ => Err(CepParseError::WrongLength),
        }
    }

    /// The bare 8 digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `00000-000`.
    #[must_use]
    pub fn formatted(&self) -> String {
        apply_mask(&self.0, &CEP_MASK, Self::LENGTH)
    }
}

/// Progressive mask for a CEP being typed.
#[must_use]
pub fn format_cep_input(input: &str) -> String {
    apply_mask(&digits_only(input), &CEP_MASK, Cep::LENGTH)
}

impl fmt::Display for Cep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl std::str::FromStr for Cep {
    type Err = CepParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cep {
    type Error = CepParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cep> for String {
    fn from(cep: Cep) -> Self {
        cep.0
    }
}
