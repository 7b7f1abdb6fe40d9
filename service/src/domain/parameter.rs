//! [`Parameter`] definitions.

use serde::Serialize;

#[cfg(doc)]
use crate::domain::{Flat, User};
use crate::domain::{flat, user};

/// Residency of a [`User`] in a [`Flat`] along with the contact preferences
/// of that [`User`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[expect(clippy::struct_excessive_bools, reason = "independent flags")]
pub struct Parameter {
    /// ID of the [`User`] living in the [`Flat`].
    pub user_id: user::Id,

    /// ID of the [`Flat`] the [`User`] lives in.
    pub flat_id: flat::Id,

    /// Whether the [`User`]'s email may be shown to other tenants.
    pub is_email_visible: bool,

    /// Whether the [`User`]'s phone numbers may be shown to other tenants.
    pub is_phone_number_visible: bool,

    /// Whether the [`User`] agrees to be contacted by other tenants.
    pub can_be_contacted: bool,
}

impl Parameter {
    /// Returns the key identifying this [`Parameter`].
    #[must_use]
    pub fn key(&self) -> (user::Id, flat::Id) {
        (self.user_id, self.flat_id)
    }
}
