//! [`Parameter`]-related read definitions.

use serde::Serialize;

use crate::domain::{
    user::{self, Role},
    Address, Flat, Parameter, User,
};

/// [`User`] living in a [`Flat`] by a [`Parameter`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Tenant {
    /// [`Parameter`] of the residency.
    pub parameter: Parameter,

    /// [`User`] living in the [`Flat`].
    pub user: User,
}

impl Tenant {
    /// Returns the [`Contact`] details of this [`Tenant`] visible to a viewer
    /// with the provided [`Role`].
    ///
    /// Administrators and hosts see everything, while other tenants see only
    /// what this [`Tenant`] agreed to share.
    #[must_use]
    pub fn contact(&self, viewer: Role) -> Contact {
        let (email, phone) = match viewer {
            Role::Admin | Role::Host => (true, true),
            Role::User => (
                self.parameter.is_email_visible,
                self.parameter.is_phone_number_visible,
            ),
        };
        Contact {
            email: email.then(|| self.user.email.clone()),
            phone_number: phone
                .then(|| self.user.phone_number.clone())
                .flatten(),
            phone_number2: phone
                .then(|| self.user.phone_number2.clone())
                .flatten(),
        }
    }
}

/// Contact details of a [`Tenant`] visible to a particular viewer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Contact {
    /// [`user::Email`], if visible.
    pub email: Option<user::Email>,

    /// Primary [`user::Phone`], if visible.
    pub phone_number: Option<user::Phone>,

    /// Secondary [`user::Phone`], if visible.
    pub phone_number2: Option<user::Phone>,
}

/// [`Flat`] a [`User`] lives in by a [`Parameter`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Residence {
    /// [`Parameter`] of the residency.
    pub parameter: Parameter,

    /// [`Flat`] the [`User`] lives in.
    pub flat: Flat,

    /// [`Address`] of the [`Flat`].
    pub address: Address,
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{flat, user::Role, Parameter},
        read::test::user,
    };

    use super::Tenant;

    fn tenant(is_email_visible: bool, is_phone_number_visible: bool) -> Tenant {
        let user = user("Berg");
        Tenant {
            parameter: Parameter {
                user_id: user.id,
                flat_id: flat::Id::from(1),
                is_email_visible,
                is_phone_number_visible,
                can_be_contacted: true,
            },
            user,
        }
    }

    #[test]
    fn other_tenants_see_shared_contacts_only() {
        let contact = tenant(false, true).contact(Role::User);

        assert_eq!(contact.email, None);
        assert!(contact.phone_number.is_some());
    }

    #[test]
    fn hosts_and_admins_see_everything() {
        for role in [Role::Admin, Role::Host] {
            let contact = tenant(false, false).contact(role);

            assert!(contact.email.is_some());
            assert!(contact.phone_number.is_some());
        }
    }
}
