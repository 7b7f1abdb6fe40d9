//! [`AddressHost`] definitions.

#[cfg(doc)]
use crate::domain::{user::Role, Address, User};
use crate::domain::{address, user};

/// Link between an [`Address`] and a [`User`] hosting it with the
/// [`Role::Host`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AddressHost {
    /// ID of the hosted [`Address`].
    pub address_id: address::Id,

    /// ID of the hosting [`User`].
    pub user_id: user::Id,
}
