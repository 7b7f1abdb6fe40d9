//! [`Flat`] form.

use serde::{Deserialize, Serialize};

use crate::domain::{address, flat};

use super::{optional_text, required, Errors};

/// Submitted form creating or editing a [`flat::Flat`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Flat {
    /// Floor the flat is located on.
    pub floor: i32,

    /// Number of the flat on its floor.
    pub number: Option<String>,

    /// Code opening the entry door, if any.
    pub entry_door_code: Option<String>,
}

impl Flat {
    /// Name of the floor field.
    pub const FLOOR: &'static str = "Floor";

    /// Name of the number field.
    pub const NUMBER: &'static str = "Number";

    /// Name of the entry door code field.
    pub const ENTRY_DOOR_CODE: &'static str = "EntryDoorCode";

    /// Message reported when another flat occupies the same position.
    pub const DUPLICATE: &'static str =
        "En lägenhet med samma våning och nummer finns redan på adressen.";

    /// Validates this [`Flat`] form into a [`flat::Draft`] located at the
    /// provided [`address::Id`].
    ///
    /// The number is checked before the floor.
    ///
    /// # Errors
    ///
    /// With the [`Errors`] of every failed check.
    pub fn validate(
        &self,
        address_id: address::Id,
    ) -> Result<flat::Draft, Errors> {
        let mut errors = Errors::default();

        let number = match self.number.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push(Self::NUMBER, required("Nummer"));
                None
            }
            Some(n) => {
                let number = flat::Number::new(n);
                if number.is_none() {
                    errors.push(
                        Self::NUMBER,
                        format!(
                            "Nummer fältet får innehålla högst {} tecken!",
                            flat::Number::MAX_LEN,
                        ),
                    );
                }
                number
            }
        };

        let floor = flat::Floor::new(self.floor);
        if floor.is_none() {
            errors.push(
                Self::FLOOR,
                format!(
                    "Våning fältet måste vara mellan {} och {}!",
                    flat::Floor::RANGE.start(),
                    flat::Floor::RANGE.end(),
                ),
            );
        }

        let entry_door_code = optional_text(
            &mut errors,
            Self::ENTRY_DOOR_CODE,
            "Portkod",
            flat::EntryDoorCode::MAX_LEN,
            self.entry_door_code.as_deref(),
            flat::EntryDoorCode::new,
        );

        match (number, floor) {
            (Some(number), Some(floor)) if errors.is_empty() => {
                Ok(flat::Draft {
                    address_id,
                    floor,
                    number,
                    entry_door_code,
                })
            }
            _ => Err(errors),
        }
    }
}

impl From<&flat::Flat> for Flat {
    fn from(flat: &flat::Flat) -> Self {
        Self {
            floor: i16::from(flat.floor).into(),
            number: Some(flat.number.to_string()),
            entry_door_code: flat
                .entry_door_code
                .as_ref()
                .map(ToString::to_string),
        }
    }
}
