//! [`User`]-related read definitions.

use common::Groups;
use derive_more::{From, Into};
use itertools::Itertools as _;
use serde::Serialize;

use crate::{
    domain::{address, Address, Flat, Parameter, User},
    read::{self, parameter::Residence},
};

/// Selector of the [`User`]s hosting an [`Address`].
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct HostsOf(pub address::Id);

/// Selector of the [`User`]s living at an [`Address`].
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct TenantsOf(pub address::Id);

/// Detailed view of a [`User`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Details {
    /// [`User`] itself.
    pub user: User,

    /// Details of every [`Address`] the [`User`] hosts, if the [`User`] is a
    /// host.
    pub addresses: Option<Vec<read::address::Details>>,

    /// [`Flat`]s the [`User`] lives in, grouped by their [`Address`] in the
    /// postal form.
    pub flats: Groups<String, Flat>,

    /// [`Parameter`]s of the [`User`]'s residencies, ungrouped.
    pub parameters: Vec<Parameter>,
}

impl Details {
    /// Assembles [`Details`] of the provided [`User`].
    ///
    /// `addresses` are deduplicated by their ID keeping the first occurrence.
    #[must_use]
    pub fn assemble(
        user: User,
        addresses: Option<Vec<read::address::Details>>,
        residences: Vec<Residence>,
    ) -> Self {
        let addresses = addresses.map(|a| {
            a.into_iter().unique_by(|d| d.address.id).collect::<Vec<_>>()
        });

        let mut parameters = Vec::with_capacity(residences.len());
        let flats = residences
            .into_iter()
            .map(|Residence { parameter, flat, address }| {
                parameters.push(parameter);
                (address.to_string(), flat)
            })
            .collect();

        Self {
            user,
            addresses,
            flats,
            parameters,
        }
    }
}

/// Returns the provided [`Address`]es without duplicates, keeping the first
/// occurrence of every ID.
#[must_use]
pub fn distinct_addresses(addresses: Vec<Address>) -> Vec<Address> {
    addresses.into_iter().unique_by(|a| a.id).collect()
}

/// Groups the provided [`User`]s by the initial of their last name.
///
/// Groups follow the first-seen order of the initials, and [`User`]s inside a
/// group keep their order. [`User`]s without a last name are grouped under
/// [`None`].
#[must_use]
pub fn by_surname_initial(users: Vec<User>) -> Groups<Option<char>, User> {
    Groups::by(users, |u| {
        u.last_name
            .as_ref()
            .and_then(|n| n.as_ref().chars().next())
    })
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{user::Role, Parameter},
        read::{
            address::{self, AvailableFlats},
            parameter::Residence,
            test::{address, flat, user, with_role},
        },
    };

    use super::{by_surname_initial, distinct_addresses, Details};

    #[test]
    fn groups_by_first_seen_initial() {
        let users = vec![
            user("Andersson"),
            user("Berg"),
            user("Axelsson"),
            user("Bäck"),
            user("Svensson"),
        ];

        let groups = by_surname_initial(users);

        assert_eq!(
            groups.keys().copied().collect::<Vec<_>>(),
            [Some('A'), Some('B'), Some('S')],
        );
        assert_eq!(
            groups
                .get(&Some('A'))
                .unwrap()
                .iter()
                .filter_map(|u| u.last_name.as_ref())
                .map(|n| n.to_string())
                .collect::<Vec<_>>(),
            ["Andersson", "Axelsson"],
        );
        assert_eq!(groups.count(), 5);
    }

    #[test]
    fn users_without_last_name_share_group() {
        let mut anonymous = user("Berg");
        anonymous.last_name = None;

        let groups = by_surname_initial(vec![anonymous.clone(), anonymous]);

        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), [None]);
    }

    #[test]
    fn deduplicates_addresses_keeping_first() {
        let mut renamed = address(1);
        renamed.town = crate::domain::address::Town::new("Uppsala").unwrap();

        let distinct =
            distinct_addresses(vec![address(1), address(2), renamed]);

        assert_eq!(distinct, [address(1), address(2)]);
    }

    #[test]
    fn host_addresses_are_deduplicated_and_kept_separate() {
        let host = with_role("Lind", Role::Host);
        let details = |id| {
            address::Details::assemble(
                address(id),
                Some(vec![]),
                Some(vec![host.clone()]),
                AvailableFlats(0),
                Role::Admin,
            )
        };

        let view = Details::assemble(
            host.clone(),
            Some(vec![details(1), details(2), details(1)]),
            vec![],
        );

        let addresses = view.addresses.unwrap();
        assert_eq!(addresses.len(), 2);
        assert!(addresses.iter().all(|a| a.amount_hosts == 1));
        assert!(view.flats.is_empty());
    }

    #[test]
    fn residences_grouped_by_address_and_parameters_listed() {
        let tenant = user("Berg");
        let residence = |flat_id, address_id| {
            let flat = flat(flat_id, address_id, 1);
            Residence {
                parameter: Parameter {
                    user_id: tenant.id,
                    flat_id: flat.id,
                    is_email_visible: true,
                    is_phone_number_visible: true,
                    can_be_contacted: true,
                },
                flat,
                address: address(address_id),
            }
        };

        let view = Details::assemble(
            tenant.clone(),
            None,
            vec![residence(1, 1), residence(2, 2), residence(3, 1)],
        );

        assert_eq!(view.addresses, None);
        assert_eq!(
            view.flats.keys().cloned().collect::<Vec<_>>(),
            [address(1).to_string(), address(2).to_string()],
        );
        assert_eq!(view.flats.get(&address(1).to_string()).unwrap().len(), 2);
        assert_eq!(view.parameters.len(), 3);
    }
}
