//! Brazilian phone numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::mask::{apply_mask, digits_only};

const MOBILE_MASK: [(usize, &str); 3] = [(0, "("), (2, ") "), (7, "-")];
const LANDLINE_MASK: [(usize, &str); 3] = [(0, "("), (2, ") "), (6, "-")];

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Telefone obrigatório")]
    Empty,
    #[error("Telefone inválido")]
    TooShort,
    #[error("Telefone inválido")]
    TooLong,
}

/// A phone number with area code: 10 digits (landline) or 11 (mobile).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    pub const MIN_DIGITS: usize = 10;
    pub const MAX_DIGITS: usize = 11;

    /// Parse a phone number, ignoring punctuation.
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] unless the input has 10 or 11 digits.
    pub fn parse(input: &str) -> Result<Self, PhoneError> {
        let digits = digits_only(input);
        match digits.len() {
            0 => Err(PhoneError::Empty),
            n if n < Self::MIN_DIGITS => Err(PhoneError::TooShort),
            n if n > Self::MAX_DIGITS => Err(PhoneError::TooLong),
            _ => Ok(Self(digits)),
        }
    }

    #[must_use]
    pub fn digits(&self) -> &str {
        &self.0
    }

    /// `(11) 99999-9999` for mobiles, `(11) 3333-4444` for landlines.
    #[must_use]
    pub fn formatted(&self) -> String {
        format_phone_input(&self.0)
    }
}

/// Progressive mask for a phone number being typed.
///
/// The dash moves one position right once the eleventh digit arrives.
#[must_use]
pub fn format_phone_input(input: &str) -> String {
    let digits = digits_only(input);
    if digits.len() > Phone::MIN_DIGITS {
        apply_mask(&digits, &MOBILE_MASK, Phone::MAX_DIGITS)
    } else {
        apply_mask(&digits, &LANDLINE_MASK, Phone::MIN_DIGITS)
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.formatted()
    }
}
