//! [`Flat`] definitions.

use std::ops::RangeInclusive;

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use crate::domain::address;

/// Flat located at an [`Address`].
///
/// [`Address`]: crate::domain::Address
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Flat {
    /// ID of this [`Flat`].
    pub id: Id,

    /// ID of the [`Address`] this [`Flat`] is located at.
    ///
    /// [`Address`]: crate::domain::Address
    pub address_id: address::Id,

    /// [`Floor`] of this [`Flat`].
    pub floor: Floor,

    /// [`Number`] of this [`Flat`] on its [`Floor`].
    pub number: Number,

    /// [`EntryDoorCode`] of this [`Flat`], if any.
    pub entry_door_code: Option<EntryDoorCode>,
}

impl Flat {
    /// Creates a new [`Flat`] out of the stored [`Draft`].
    #[must_use]
    pub fn from_draft(id: Id, draft: Draft) -> Self {
        let Draft {
            address_id,
            floor,
            number,
            entry_door_code,
        } = draft;
        Self {
            id,
            address_id,
            floor,
            number,
            entry_door_code,
        }
    }

    /// Returns the [`Position`] of this [`Flat`].
    #[must_use]
    pub fn position(&self) -> Position {
        Position {
            address_id: self.address_id,
            floor: self.floor,
            number: self.number.clone(),
        }
    }
}

/// [`Flat`] not stored yet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Draft {
    /// ID of the [`Address`] the new [`Flat`] is located at.
    ///
    /// [`Address`]: crate::domain::Address
    pub address_id: address::Id,

    /// [`Floor`] of the new [`Flat`].
    pub floor: Floor,

    /// [`Number`] of the new [`Flat`].
    pub number: Number,

    /// [`EntryDoorCode`] of the new [`Flat`].
    pub entry_door_code: Option<EntryDoorCode>,
}

impl Draft {
    /// Returns the [`Position`] the new [`Flat`] would occupy.
    #[must_use]
    pub fn position(&self) -> Position {
        Position {
            address_id: self.address_id,
            floor: self.floor,
            number: self.number.clone(),
        }
    }
}

/// Position uniquely identifying a [`Flat`] at its [`Address`].
///
/// [`Address`]: crate::domain::Address
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Position {
    /// ID of the [`Address`].
    ///
    /// [`Address`]: crate::domain::Address
    pub address_id: address::Id,

    /// [`Floor`] at the [`Address`].
    ///
    /// [`Address`]: crate::domain::Address
    pub floor: Floor,

    /// [`Number`] on the [`Floor`].
    pub number: Number,
}

/// ID of a [`Flat`].
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

/// Floor of a [`Flat`].
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Floor(i16);

impl Floor {
    /// Range of the allowed [`Floor`]s.
    pub const RANGE: RangeInclusive<i16> = -5..=200;

    /// Creates a new [`Floor`] if the given `floor` is in the [`Floor::RANGE`].
    #[must_use]
    pub fn new(floor: i32) -> Option<Self> {
        i16::try_from(floor)
            .ok()
            .filter(|f| Self::RANGE.contains(f))
            .map(Self)
    }
}

define_text! {
    #[doc = "Number of a [`Flat`] on its [`Floor`]."]
    Number(max = 16)
}

define_text! {
    #[doc = "Code opening the entry door of a [`Flat`]."]
    EntryDoorCode(max = 32)
}
