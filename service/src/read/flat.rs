//! [`Flat`]-related read definitions.

use serde::Serialize;

use crate::{
    domain::{user, user::Role, Address, Flat, Parameter},
    read::{
        address::{self, AvailableFlats},
        parameter::{Contact, Tenant},
    },
};

/// Tenant of a [`Flat`] as seen by a particular viewer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Resident {
    /// ID of the tenant.
    pub user_id: user::Id,

    /// First name of the tenant.
    pub first_name: Option<user::Name>,

    /// Last name of the tenant.
    pub last_name: Option<user::Name>,

    /// [`Parameter`] of the residency.
    pub parameter: Parameter,

    /// [`Contact`] details visible to the viewer.
    pub contact: Contact,
}

/// Detailed view of a [`Flat`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Details {
    /// [`Flat`] itself.
    pub flat: Flat,

    /// [`Resident`]s of the [`Flat`].
    pub residents: Vec<Resident>,

    /// Details of the [`Address`] the [`Flat`] is located at, without its
    /// flats and hosts.
    pub address: address::Details,
}

impl Details {
    /// Assembles [`Details`] of the provided [`Flat`] as seen by a viewer with
    /// the provided [`Role`].
    ///
    /// [`None`] `tenants` are treated as no tenants at all.
    #[must_use]
    pub fn assemble(
        flat: Flat,
        tenants: Option<Vec<Tenant>>,
        address: Address,
        available: AvailableFlats,
        viewer: Role,
    ) -> Self {
        let residents = tenants
            .unwrap_or_default()
            .into_iter()
            .map(|tenant| Resident {
                contact: tenant.contact(viewer),
                user_id: tenant.user.id,
                first_name: tenant.user.first_name,
                last_name: tenant.user.last_name,
                parameter: tenant.parameter,
            })
            .collect();

        Self {
            flat,
            residents,
            address: address::Details::assemble(
                address, None, None, available, viewer,
            ),
        }
    }
}
