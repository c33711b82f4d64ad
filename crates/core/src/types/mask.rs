//! Digit extraction and input masks shared by the document types.

/// Strip everything that is not an ASCII digit.
///
/// Users type CPF, CNPJ, CEP and phone numbers with or without punctuation,
/// so every parser normalizes through this first.
#[must_use]
pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Apply a progressive mask to a digit string.
///
/// `separators` lists `(index, text)` pairs: `text` is emitted right before the
/// digit at `index`, so a separator only appears once a digit follows it.
/// Digits past `max_digits` are dropped.
pub(crate) fn apply_mask(digits: &str, separators: &[(usize, &str)], max_digits: usize) -> String {
    let mut out = String::with_capacity(max_digits + separators.len() * 2);
    for (i, c) in digits.chars().take(max_digits).enumerate() {
        if let Some((_, sep)) = separators.iter().find(|(at, _)| *at == i) {
            out.push_str(sep);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("111.444.777-35"), "11144477735");
        assert_eq!(digits_only("(11) 9 9999-9999"), "11999999999");
        assert_eq!(digits_only("abc"), "");
    }

    #[test]
    fn test_apply_mask_partial() {
        let seps = [(3, "."), (6, "."), (9, "-")];
        assert_eq!(apply_mask("111", &seps, 11), "111");
        assert_eq!(apply_mask("1114", &seps, 11), "111.4");
        assert_eq!(apply_mask("11144477735", &seps, 11), "111.444.777-35");
    }

    #[test]
    fn test_apply_mask_truncates() {
        assert_eq!(apply_mask("123456789", &[(5, "-")], 8), "12345-678");
    }
}
