//! [`Address`] definitions.

use std::fmt;

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

/// Building address managed by the platform.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Address {
    /// ID of this [`Address`].
    pub id: Id,

    /// [`Street`] of this [`Address`].
    pub street: Street,

    /// Street [`Number`] of this [`Address`].
    pub number: Number,

    /// [`ZipCode`] of this [`Address`].
    pub zip_code: ZipCode,

    /// [`Town`] of this [`Address`].
    pub town: Town,

    /// [`Country`] of this [`Address`].
    pub country: Country,
}

impl Address {
    /// Creates a new [`Address`] out of the stored [`Draft`].
    #[must_use]
    pub fn from_draft(id: Id, draft: Draft) -> Self {
        let Draft {
            street,
            number,
            zip_code,
            town,
            country,
        } = draft;
        Self {
            id,
            street,
            number,
            zip_code,
            town,
            country,
        }
    }

    /// Replaces the editable fields of this [`Address`] with the [`Draft`]
    /// ones.
    pub fn apply(&mut self, draft: Draft) {
        *self = Self::from_draft(self.id, draft);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}, {} {}",
            self.street, self.number, self.zip_code, self.town,
        )
    }
}

/// [`Address`] not stored yet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Draft {
    /// [`Street`] of the new [`Address`].
    pub street: Street,

    /// Street [`Number`] of the new [`Address`].
    pub number: Number,

    /// [`ZipCode`] of the new [`Address`].
    pub zip_code: ZipCode,

    /// [`Town`] of the new [`Address`].
    pub town: Town,

    /// [`Country`] of the new [`Address`].
    pub country: Country,
}

/// ID of an [`Address`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Id(i32);

define_text! {
    #[doc = "Street of an [`Address`]."]
    Street(max = 256)
}

define_text! {
    #[doc = "Street number of an [`Address`]."]
    Number(max = 16)
}

define_text! {
    #[doc = "Zip code of an [`Address`]."]
    ZipCode(max = 16)
}

define_text! {
    #[doc = "Town of an [`Address`]."]
    Town(max = 128)
}

define_text! {
    #[doc = "Country of an [`Address`]."]
    Country(max = 128)
}
