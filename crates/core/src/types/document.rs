//! Brazilian taxpayer documents (CPF and CNPJ).
//!
//! Both identifiers end in two check digits computed from a weighted sum of
//! the preceding digits:
//!
//! - **CPF** (individuals, 11 digits): weights descend from 10 for the first
//!   check digit and from 11 for the second; the digit is `(sum * 10) % 11`,
//!   with 10 folded to 0.
//! - **CNPJ** (companies, 14 digits): fixed weight tables; the digit is `0`
//!   when `sum % 11 < 2`, otherwise `11 - sum % 11`.
//!
//! Sequences of a single repeated digit satisfy both checksums and are
//! rejected explicitly.
//!
//! ## Examples
//!
//! ```
//! use aprova_facil_core::{TaxDocument, is_valid_cnpj, is_valid_cpf};
//!
//! assert!(is_valid_cpf("111.444.777-35"));
//! assert!(!is_valid_cpf("111.111.111-11"));
//! assert!(is_valid_cnpj("11.222.333/0001-81"));
//!
//! let doc = TaxDocument::parse("11144477735").unwrap();
//! assert_eq!(doc.formatted(), "111.444.777-35");
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use super::PersonType;
use super::mask::{apply_mask, digits_only};

/// Number of digits in a CPF.
pub const CPF_LENGTH: usize = 11;

/// Number of digits in a CNPJ.
pub const CNPJ_LENGTH: usize = 14;

const CNPJ_WEIGHTS_FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_WEIGHTS_SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

const CPF_MASK: [(usize, &str); 3] = [(3, "."), (6, "."), (9, "-")];
const CNPJ_MASK: [(usize, &str); 4] = [(2, "."), (5, "."), (8, "/"), (12, "-")];

/// Errors that can occur when parsing a [`TaxDocument`].
///
/// The variants follow the order in which a user typing the number
/// encounters them, so each one maps to a distinct inline message.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentError {
    /// No digits were entered.
    #[error("CPF/CNPJ obrigatório")]
    Empty,
    /// Fewer than 11 digits.
    #[error("CPF/CNPJ incompleto")]
    Incomplete,
    /// 11 digits with wrong check digits or a repeated-digit sequence.
    #[error("CPF inválido")]
    InvalidCpf,
    /// 12 or 13 digits.
    #[error("CNPJ incompleto")]
    CnpjIncomplete,
    /// 14 digits with wrong check digits or a repeated-digit sequence.
    #[error("CNPJ inválido")]
    InvalidCnpj,
    /// More than 14 digits.
    #[error("CPF/CNPJ inválido")]
    TooLong,
}

/// Which document a [`TaxDocument`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentKind {
    Cpf,
    Cnpj,
}

impl DocumentKind {
    /// Label shown next to the number (e.g. "CPF").
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cpf => "CPF",
            Self::Cnpj => "CNPJ",
        }
    }
}

/// A validated CPF or CNPJ, stored as bare digits.
///
/// Serializes to the formatted representation, which is what the backend
/// stores for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TaxDocument {
    /// Individual taxpayer (11 digits).
    Cpf(String),
    /// Company taxpayer (14 digits).
    Cnpj(String),
}

impl TaxDocument {
    /// Parse a CPF or CNPJ, ignoring mask characters.
    ///
    /// # Errors
    ///
    /// Returns the [`DocumentError`] describing why the input is not a valid
    /// document (empty, incomplete, wrong check digits or too long).
    pub fn parse(input: &str) -> Result<Self, DocumentError> {
        let digits = digits_only(input);
        match digits.len() {
            0 => Err(DocumentError::Empty),
            1..CPF_LENGTH => Err(DocumentError::Incomplete),
            CPF_LENGTH => {
                if cpf_digits_valid(&digits) {
                    Ok(Self::Cpf(digits))
                } else {
                    Err(DocumentError::InvalidCpf)
                }
            }
            12..CNPJ_LENGTH => Err(DocumentError::CnpjIncomplete),
            CNPJ_LENGTH => {
                if cnpj_digits_valid(&digits) {
                    Ok(Self::Cnpj(digits))
                } else {
                    Err(DocumentError::InvalidCnpj)
                }
            }
            _ => Err(DocumentError::TooLong),
        }
    }

    /// The bare digits.
    #[must_use]
    pub fn digits(&self) -> &str {
        match self {
            Self::Cpf(d) | Self::Cnpj(d) => d,
        }
    }

    /// Whether this is a CPF or a CNPJ.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        match self {
            Self::Cpf(_) => DocumentKind::Cpf,
            Self::Cnpj(_) => DocumentKind::Cnpj,
        }
    }

    /// The pricing tier implied by the document.
    #[must_use]
    pub const fn person_type(&self) -> PersonType {
        match self {
            Self::Cpf(_) => PersonType::Pf,
            Self::Cnpj(_) => PersonType::Pj,
        }
    }

    /// The masked representation (`000.000.000-00` or `00.000.000/0000-00`).
    #[must_use]
    pub fn formatted(&self) -> String {
        match self {
            Self::Cpf(d) => apply_mask(d, &CPF_MASK, CPF_LENGTH),
            Self::Cnpj(d) => apply_mask(d, &CNPJ_MASK, CNPJ_LENGTH),
        }
    }
}

impl fmt::Display for TaxDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl std::str::FromStr for TaxDocument {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TaxDocument {
    type Error = DocumentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TaxDocument> for String {
    fn from(doc: TaxDocument) -> Self {
        doc.formatted()
    }
}

/// Returns `true` if `input` is a valid CPF (mask characters are ignored).
#[must_use]
pub fn is_valid_cpf(input: &str) -> bool {
    let digits = digits_only(input);
    digits.len() == CPF_LENGTH && cpf_digits_valid(&digits)
}

/// Returns `true` if `input` is a valid CNPJ (mask characters are ignored).
#[must_use]
pub fn is_valid_cnpj(input: &str) -> bool {
    let digits = digits_only(input);
    digits.len() == CNPJ_LENGTH && cnpj_digits_valid(&digits)
}

/// Progressive mask for a document being typed.
///
/// Up to 11 digits are masked as a CPF; past that the input switches to the
/// CNPJ mask. Extra digits beyond 14 are dropped.
#[must_use]
pub fn format_document_input(input: &str) -> String {
    let digits = digits_only(input);
    if digits.len() > CPF_LENGTH {
        apply_mask(&digits, &CNPJ_MASK, CNPJ_LENGTH)
    } else {
        apply_mask(&digits, &CPF_MASK, CPF_LENGTH)
    }
}

fn to_values(digits: &str) -> Vec<u32> {
    digits.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_equal(values: &[u32]) -> bool {
    values.windows(2).all(|w| w.first() == w.get(1))
}

/// CPF check digit over `values`, with weights descending from `len + 1`.
fn cpf_check_digit(values: &[u32]) -> u32 {
    let top = u32::try_from(values.len()).unwrap_or(0) + 1;
    let sum: u32 = values
        .iter()
        .zip((2..=top).rev())
        .map(|(d, w)| d * w)
        .sum();
    match (sum * 10) % 11 {
        10 => 0,
        d => d,
    }
}

fn cnpj_check_digit(values: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = values.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
        0 | 1 => 0,
        r => 11 - r,
    }
}

/// Expects exactly [`CPF_LENGTH`] ASCII digits.
fn cpf_digits_valid(digits: &str) -> bool {
    let values = to_values(digits);
    if values.len() != CPF_LENGTH || all_equal(&values) {
        return false;
    }
    let (body, check) = values.split_at(9);
    let first = cpf_check_digit(body);
    let second = cpf_check_digit(values.get(..10).unwrap_or_default());
    check == [first, second]
}

/// Expects exactly [`CNPJ_LENGTH`] ASCII digits.
fn cnpj_digits_valid(digits: &str) -> bool {
    let values = to_values(digits);
    if values.len() != CNPJ_LENGTH || all_equal(&values) {
        return false;
    }
    let (body, check) = values.split_at(12);
    let first = cnpj_check_digit(body, &CNPJ_WEIGHTS_FIRST);
    let second = cnpj_check_digit(values.get(..13).unwrap_or_default(), &CNPJ_WEIGHTS_SECOND);
    check == [first, second]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const VALID_CPF: &str = "11144477735";
    const VALID_CNPJ: &str = "11222333000181";

    /// Every string obtained by replacing exactly one digit with another.
    fn single_digit_mutations(digits: &str) -> Vec<String> {
        let mut out = Vec::new();
        for (i, original) in digits.char_indices() {
            for replacement in '0'..='9' {
                if replacement == original {
                    continue;
                }
                let mut mutated = digits.to_string();
                mutated.replace_range(i..=i, &replacement.to_string());
                out.push(mutated);
            }
        }
        out
    }

    #[test]
    fn test_cpf_reference_values() {
        assert!(is_valid_cpf(VALID_CPF));
        assert!(is_valid_cpf("111.444.777-35"));
        assert!(!is_valid_cpf("11111111111"));
        assert!(!is_valid_cpf("12345678900"));
    }

    #[test]
    fn test_cpf_rejects_every_repeated_digit_sequence() {
        for d in '0'..='9' {
            let repeated: String = std::iter::repeat_n(d, CPF_LENGTH).collect();
            assert!(!is_valid_cpf(&repeated), "{repeated} should be invalid");
        }
    }

    #[test]
    fn test_cpf_single_digit_change_invalidates() {
        for mutated in single_digit_mutations(VALID_CPF) {
            assert!(!is_valid_cpf(&mutated), "{mutated} should be invalid");
        }
    }

    #[test]
    fn test_cpf_wrong_lengths() {
        assert!(!is_valid_cpf("1114447773"));
        assert!(!is_valid_cpf("111444777350"));
        assert!(!is_valid_cpf(""));
    }

    #[test]
    fn test_cnpj_reference_values() {
        assert!(is_valid_cnpj(VALID_CNPJ));
        assert!(is_valid_cnpj("11.222.333/0001-81"));
        assert!(!is_valid_cnpj("11222333000180"));
        assert!(!is_valid_cnpj("00000000000000"));
    }

    #[test]
    fn test_cnpj_single_digit_change_invalidates() {
        for mutated in single_digit_mutations(VALID_CNPJ) {
            assert!(!is_valid_cnpj(&mutated), "{mutated} should be invalid");
        }
    }

    #[test]
    fn test_cnpj_rejects_cpf_length() {
        assert!(!is_valid_cnpj(VALID_CPF));
        assert!(!is_valid_cpf(VALID_CNPJ));
    }

    #[test]
    fn test_parse_errors_follow_typing_progress() {
        assert_eq!(TaxDocument::parse(""), Err(DocumentError::Empty));
        assert_eq!(TaxDocument::parse("..-"), Err(DocumentError::Empty));
        assert_eq!(TaxDocument::parse("111.444"), Err(DocumentError::Incomplete));
        assert_eq!(
            TaxDocument::parse("12345678900"),
            Err(DocumentError::InvalidCpf)
        );
        assert_eq!(
            TaxDocument::parse("1122233300"),
            Err(DocumentError::Incomplete)
        );
        assert_eq!(
            TaxDocument::parse("112223330001"),
            Err(DocumentError::CnpjIncomplete)
        );
        assert_eq!(
            TaxDocument::parse("11222333000180"),
            Err(DocumentError::InvalidCnpj)
        );
        assert_eq!(
            TaxDocument::parse("112223330001811"),
            Err(DocumentError::TooLong)
        );
    }

    #[test]
    fn test_parse_kind_and_person_type() {
        let cpf = TaxDocument::parse("111.444.777-35").unwrap();
        assert_eq!(cpf.kind(), DocumentKind::Cpf);
        assert_eq!(cpf.person_type(), PersonType::Pf);
        assert_eq!(cpf.digits(), VALID_CPF);

        let cnpj = TaxDocument::parse(VALID_CNPJ).unwrap();
        assert_eq!(cnpj.kind(), DocumentKind::Cnpj);
        assert_eq!(cnpj.person_type(), PersonType::Pj);
        assert_eq!(cnpj.formatted(), "11.222.333/0001-81");
    }

    #[test]
    fn test_serde_uses_formatted_string() {
        let cpf = TaxDocument::parse(VALID_CPF).unwrap();
        let json = serde_json::to_string(&cpf).unwrap();
        assert_eq!(json, "\"111.444.777-35\"");

        let parsed: TaxDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cpf);

        assert!(serde_json::from_str::<TaxDocument>("\"12345678900\"").is_err());
    }

    #[test]
    fn test_format_document_input_progressive() {
        assert_eq!(format_document_input("111"), "111");
        assert_eq!(format_document_input("1114447"), "111.444.7");
        assert_eq!(format_document_input("11144477735"), "111.444.777-35");
        assert_eq!(format_document_input("112223330001"), "11.222.333/0001");
        assert_eq!(
            format_document_input("11222333000181999"),
            "11.222.333/0001-81"
        );
    }
}
