//! Postal address and CEP lookup merge.

use serde::{Deserialize, Serialize};

/// A customer's postal address as entered in the forms.
///
/// Fields hold the raw user text; validation lives with the form that
/// collects them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub cep: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub complement: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

/// Address fields returned by a successful CEP lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressLookup {
    pub cep: String,
    pub street: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

impl Address {
    /// Merge a lookup result into the address.
    ///
    /// Street, neighborhood, city and state are overwritten. The complement
    /// is only taken from the lookup when the customer left it blank. Number
    /// and CEP are never touched.
    pub fn apply_lookup(&mut self, lookup: &AddressLookup) {
        self.street.clone_from(&lookup.street);
        self.neighborhood.clone_from(&lookup.neighborhood);
        self.city.clone_from(&lookup.city);
        self.state.clone_from(&lookup.state);
        if self.complement.trim().is_empty() {
            self.complement.clone_from(&lookup.complement);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paulista() -> AddressLookup {
        AddressLookup {
            cep: "01310-100".to_string(),
            street: "Avenida Paulista".to_string(),
            complement: "de 612 a 1510 - lado par".to_string(),
            neighborhood: "Bela Vista".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
        }
    }

    #[test]
    fn test_apply_lookup_overwrites_location_fields() {
        let mut address = Address {
            cep: "01310-100".to_string(),
            street: "Rua Velha".to_string(),
            number: "1000".to_string(),
            city: "Campinas".to_string(),
            ..Address::default()
        };
        address.apply_lookup(&paulista());

        assert_eq!(address.street, "Avenida Paulista");
        assert_eq!(address.neighborhood, "Bela Vista");
        assert_eq!(address.city, "São Paulo");
        assert_eq!(address.state, "SP");
        assert_eq!(address.number, "1000");
    }

    #[test]
    fn test_apply_lookup_keeps_filled_complement() {
        let mut address = Address {
            complement: "Apto 42".to_string(),
            ..Address::default()
        };
        address.apply_lookup(&paulista());
        assert_eq!(address.complement, "Apto 42");
    }

    #[test]
    fn test_apply_lookup_fills_blank_complement() {
        let mut address = Address {
            complement: "   ".to_string(),
            ..Address::default()
        };
        address.apply_lookup(&paulista());
        assert_eq!(address.complement, "de 612 a 1510 - lado par");
    }
}
