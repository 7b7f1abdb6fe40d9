//! [`Address`] form.
//!
//! [`Address`]: crate::domain::Address

use serde::{Deserialize, Serialize};

use crate::domain::{self, address};

use super::{required_text, Errors};

/// Submitted form creating or editing an [`Address`].
///
/// [`Address`]: crate::domain::Address
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Address {
    /// Street name.
    pub street: Option<String>,

    /// Street number.
    pub number: Option<String>,

    /// Zip code.
    pub zip_code: Option<String>,

    /// Town.
    pub town: Option<String>,

    /// Country.
    pub country: Option<String>,
}

impl Address {
    /// Validates this [`Address`] form into an [`address::Draft`].
    ///
    /// # Errors
    ///
    /// With the [`Errors`] of every failed check, in the order of the fields.
    pub fn validate(&self) -> Result<address::Draft, Errors> {
        let mut errors = Errors::default();

        let street = required_text(
            &mut errors,
            "Street",
            "Gatuadress",
            address::Street::MAX_LEN,
            self.street.as_deref(),
            address::Street::new,
        );
        let number = required_text(
            &mut errors,
            "Number",
            "Nummer",
            address::Number::MAX_LEN,
            self.number.as_deref(),
            address::Number::new,
        );
        let zip_code = required_text(
            &mut errors,
            "ZipCode",
            "Postnummer",
            address::ZipCode::MAX_LEN,
            self.zip_code.as_deref(),
            address::ZipCode::new,
        );
        let town = required_text(
            &mut errors,
            "Town",
            "Ort",
            address::Town::MAX_LEN,
            self.town.as_deref(),
            address::Town::new,
        );
        let country = required_text(
            &mut errors,
            "Country",
            "Land",
            address::Country::MAX_LEN,
            self.country.as_deref(),
            address::Country::new,
        );

        match (street, number, zip_code, town, country) {
            (
                Some(street),
                Some(number),
                Some(zip_code),
                Some(town),
                Some(country),
            ) => Ok(address::Draft {
                street,
                number,
                zip_code,
                town,
                country,
            }),
            _ => Err(errors),
        }
    }
}

impl From<&domain::Address> for Address {
    fn from(address: &domain::Address) -> Self {
        Self {
            street: Some(address.street.to_string()),
            number: Some(address.number.to_string()),
            zip_code: Some(address.zip_code.to_string()),
            town: Some(address.town.to_string()),
            country: Some(address.country.to_string()),
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::read::test::address;

    use super::Address;

    #[test]
    fn prefills_from_stored_address() {
        let stored = address(4);

        let draft = Address::from(&stored).validate().unwrap();

        assert_eq!(draft.street, stored.street);
        assert_eq!(draft.zip_code, stored.zip_code);
    }

    #[test]
    fn reports_every_missing_field_in_order() {
        let form = Address {
            street: Some("Storgatan".into()),
            number: Some(String::new()),
            ..Address::default()
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(
            errors.iter().map(|e| e.field).collect::<Vec<_>>(),
            ["Number", "ZipCode", "Town", "Country"],
        );
        assert_eq!(errors.get("Town"), Some("Ort fältet är obligatoriskt!"));
    }

    #[test]
    fn trims_accepted_values() {
        let form = Address {
            street: Some(" Storgatan ".into()),
            number: Some("1".into()),
            zip_code: Some("111 22".into()),
            town: Some("Stockholm".into()),
            country: Some("Sverige".into()),
        };

        let draft = form.validate().unwrap();

        assert_eq!(draft.street.as_ref(), "Storgatan");
    }
}
