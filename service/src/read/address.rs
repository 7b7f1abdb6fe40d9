//! [`Address`]-related read definitions.

use common::Groups;
use derive_more::{From, Into};
use serde::Serialize;

use crate::{
    domain::{flat, user::Role, Address, Flat, User},
    read::parameter::Tenant,
};

/// Number of [`Flat`]s at an [`Address`] nobody lives in, as counted by the
/// storage.
#[derive(Clone, Copy, Debug, Default, Eq, From, Into, PartialEq)]
pub struct AvailableFlats(pub i64);

/// [`Flat`] along with the [`Tenant`]s living in it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FlatEntry {
    /// [`Flat`] itself.
    pub flat: Flat,

    /// [`Tenant`]s living in the [`Flat`].
    pub tenants: Vec<Tenant>,
}

/// Detailed view of an [`Address`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Details {
    /// [`Address`] itself.
    pub address: Address,

    /// [`Flat`]s at the [`Address`] grouped by their [`flat::Floor`], if
    /// loaded.
    pub flats: Option<Groups<flat::Floor, FlatEntry>>,

    /// Hosts of the [`Address`], if loaded.
    pub hosts: Option<Vec<User>>,

    /// Number of loaded [`Flat`]s.
    pub amount_flats: usize,

    /// Number of [`Flat`]s nobody lives in.
    pub amount_available_flats: u64,

    /// Number of [`Tenant`]s across all the loaded [`Flat`]s.
    pub amount_users: usize,

    /// Number of loaded hosts.
    pub amount_hosts: usize,

    /// Whether the viewer may delete the [`Address`].
    pub can_data_be_deleted: bool,
}

impl Details {
    /// Assembles [`Details`] of the provided [`Address`] as seen by a viewer
    /// with the provided [`Role`].
    ///
    /// [`None`] `flats` or `hosts` mean they were not loaded and stay [`None`]
    /// in the [`Details`], while empty ones are kept empty.
    #[must_use]
    pub fn assemble(
        address: Address,
        flats: Option<Vec<FlatEntry>>,
        hosts: Option<Vec<User>>,
        available: AvailableFlats,
        viewer: Role,
    ) -> Self {
        let amount_flats = flats.as_ref().map_or(0, Vec::len);
        let amount_users = flats
            .iter()
            .flatten()
            .map(|entry| entry.tenants.len())
            .sum();
        let amount_hosts = hosts.as_ref().map_or(0, Vec::len);

        Self {
            address,
            flats: flats.map(|f| Groups::by(f, |entry| entry.flat.floor)),
            hosts,
            amount_flats,
            amount_available_flats: u64::try_from(available.0).unwrap_or(0),
            amount_users,
            amount_hosts,
            can_data_be_deleted: amount_flats == 0
                && amount_hosts == 0
                && viewer == Role::Admin,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{flat, user::Role, Parameter},
        read::{
            parameter::Tenant,
            test::{address, flat, user, with_role},
        },
    };

    use super::{AvailableFlats, Details, FlatEntry};

    fn entry(id: i32, floor: i32, tenants: usize) -> FlatEntry {
        let flat = flat(id, 1, floor);
        let tenants = (0..tenants)
            .map(|_| {
                let user = user("Berg");
                Tenant {
                    parameter: Parameter {
                        user_id: user.id,
                        flat_id: flat.id,
                        is_email_visible: false,
                        is_phone_number_visible: false,
                        can_be_contacted: false,
                    },
                    user,
                }
            })
            .collect();
        FlatEntry { flat, tenants }
    }

    #[test]
    fn not_loaded_flats_stay_absent() {
        let details = Details::assemble(
            address(1),
            None,
            None,
            AvailableFlats(0),
            Role::Admin,
        );

        assert_eq!(details.flats, None);
        assert_eq!(details.hosts, None);
        assert_eq!(details.amount_flats, 0);
        assert_eq!(details.amount_hosts, 0);
    }

    #[test]
    fn empty_flats_stay_empty() {
        let details = Details::assemble(
            address(1),
            Some(vec![]),
            Some(vec![]),
            AvailableFlats(0),
            Role::Admin,
        );

        assert!(details.flats.is_some_and(|f| f.is_empty()));
        assert_eq!(details.hosts, Some(vec![]));
        assert_eq!(details.amount_flats, 0);
    }

    #[test]
    fn groups_flats_by_first_seen_floor() {
        let details = Details::assemble(
            address(1),
            Some(vec![entry(1, 10, 0), entry(2, 20, 1), entry(3, 10, 2)]),
            None,
            AvailableFlats(1),
            Role::Admin,
        );

        let flats = details.flats.unwrap();
        assert_eq!(
            flats.keys().map(|f| i16::from(*f)).collect::<Vec<_>>(),
            [10, 20],
        );
        assert_eq!(
            flats
                .get(&flat::Floor::new(10).unwrap())
                .unwrap()
                .iter()
                .map(|e| i32::from(e.flat.id))
                .collect::<Vec<_>>(),
            [1, 3],
        );
        assert_eq!(details.amount_flats, 3);
        assert_eq!(details.amount_users, 3);
    }

    #[test]
    fn clamps_negative_available_flats() {
        let details = Details::assemble(
            address(1),
            None,
            None,
            AvailableFlats(-1),
            Role::Admin,
        );

        assert_eq!(details.amount_available_flats, 0);
    }

    #[test]
    fn only_admin_may_delete_empty_address() {
        for (role, expected) in
            [(Role::Admin, true), (Role::Host, false), (Role::User, false)]
        {
            let details = Details::assemble(
                address(1),
                Some(vec![]),
                Some(vec![]),
                AvailableFlats(0),
                role,
            );

            assert_eq!(details.can_data_be_deleted, expected, "{role}");
        }
    }

    #[test]
    fn referenced_address_is_not_deletable() {
        let with_flat = Details::assemble(
            address(1),
            Some(vec![entry(1, 1, 0)]),
            None,
            AvailableFlats(1),
            Role::Admin,
        );
        let with_host = Details::assemble(
            address(1),
            None,
            Some(vec![with_role("Lind", Role::Host)]),
            AvailableFlats(0),
            Role::Admin,
        );

        assert!(!with_flat.can_data_be_deleted);
        assert!(!with_host.can_data_be_deleted);
    }

    #[test]
    fn user_viewing_address_with_flat_and_host() {
        let details = Details::assemble(
            address(1),
            Some(vec![entry(1, 10, 0)]),
            Some(vec![with_role("Lind", Role::Host)]),
            AvailableFlats(0),
            Role::User,
        );

        assert_eq!(details.amount_flats, 1);
        assert_eq!(details.amount_available_flats, 0);
        assert_eq!(details.amount_users, 0);
        assert_eq!(details.amount_hosts, 1);
        assert!(!details.can_data_be_deleted);
    }
}
