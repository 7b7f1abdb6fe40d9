//! [`Query`] collection related to multiple [`User`]s.

use common::{operations::By, Groups};
use tracerr::Traced;

use crate::{
    domain::{address, user::Role, User},
    infra::database,
    read::{self, user::by_surname_initial},
    Query, Service,
};

use super::DatabaseQuery;

/// Queries all the [`User`]s.
pub type All = DatabaseQuery<By<Vec<User>, ()>>;

/// Queries all the [`User`]s having a [`Role`].
pub type ByRole = DatabaseQuery<By<Vec<User>, Role>>;

/// Queries all the [`User`]s hosting an [`Address`].
///
/// [`Address`]: crate::domain::Address
pub type Hosts = DatabaseQuery<By<Vec<User>, read::user::HostsOf>>;

/// Queries all the [`User`]s living at an [`Address`].
///
/// [`Address`]: crate::domain::Address
pub type Tenants = DatabaseQuery<By<Vec<User>, read::user::TenantsOf>>;

/// [`User`]s grouped by the initial of their last name.
pub type ByInitial = Groups<Option<char>, User>;

/// [`Query`] of the hosts of an [`Address`] grouped by the initial of their
/// last name.
///
/// [`Address`]: crate::domain::Address
#[derive(Clone, Copy, Debug)]
pub struct HostsAtAddress {
    /// ID of the [`Address`].
    ///
    /// [`Address`]: crate::domain::Address
    pub address_id: address::Id,
}

impl<Db, Ml> Query<HostsAtAddress> for Service<Db, Ml>
where
    Self: Query<Hosts, Ok = Vec<User>, Err = Traced<database::Error>>,
{
    type Ok = ByInitial;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        HostsAtAddress { address_id }: HostsAtAddress,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Hosts::by(read::user::HostsOf(address_id)))
            .await
            .map(by_surname_initial)
            .map_err(tracerr::wrap!())
    }
}

/// [`Query`] of the tenants of an [`Address`] grouped by the initial of their
/// last name.
///
/// [`Address`]: crate::domain::Address
#[derive(Clone, Copy, Debug)]
pub struct TenantsAtAddress {
    /// ID of the [`Address`].
    ///
    /// [`Address`]: crate::domain::Address
    pub address_id: address::Id,
}

impl<Db, Ml> Query<TenantsAtAddress> for Service<Db, Ml>
where
    Self: Query<Tenants, Ok = Vec<User>, Err = Traced<database::Error>>,
{
    type Ok = ByInitial;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        TenantsAtAddress { address_id }: TenantsAtAddress,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Tenants::by(read::user::TenantsOf(address_id)))
            .await
            .map(by_surname_initial)
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        domain::{user::Role, AddressHost, Parameter},
        infra::Database as _,
        read::test::{user, with_role},
        test::{address_draft, flat_draft, service},
        Query as _,
    };

    use super::{HostsAtAddress, TenantsAtAddress};

    #[tokio::test]
    async fn groups_tenants_of_address_only() {
        let service = service();
        let db = service.database();
        let here =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();
        let there =
            db.execute(Insert(address_draft("Kungsgatan"))).await.unwrap();
        let flat_here = db
            .execute(Insert(flat_draft(here.id, 1, "1")))
            .await
            .unwrap();
        let flat_there = db
            .execute(Insert(flat_draft(there.id, 1, "1")))
            .await
            .unwrap();

        let tenants = [
            (user("Andersson"), flat_here.id),
            (user("Berg"), flat_here.id),
            (user("Axelsson"), flat_here.id),
            (user("Cederlund"), flat_there.id),
        ];
        for (tenant, flat_id) in &tenants {
            db.execute(Insert(tenant.clone())).await.unwrap();
            db.execute(Insert(Parameter {
                user_id: tenant.id,
                flat_id: *flat_id,
                is_email_visible: false,
                is_phone_number_visible: false,
                can_be_contacted: false,
            }))
            .await
            .unwrap();
        }

        let groups = service
            .execute(TenantsAtAddress {
                address_id: here.id,
            })
            .await
            .unwrap();

        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), [
            Some('A'),
            Some('B'),
        ]);
        assert_eq!(groups.count(), 3);
        let a = groups.get(&Some('A')).unwrap();
        assert_eq!(a[0], tenants[0].0);
        assert_eq!(a[1], tenants[2].0);
    }

    #[tokio::test]
    async fn groups_hosts_of_address() {
        let service = service();
        let db = service.database();
        let address =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();
        let host = with_role("Holm", Role::Host);
        db.execute(Insert(host.clone())).await.unwrap();
        db.execute(Insert(AddressHost {
            address_id: address.id,
            user_id: host.id,
        }))
        .await
        .unwrap();

        let groups = service
            .execute(HostsAtAddress {
                address_id: address.id,
            })
            .await
            .unwrap();

        assert_eq!(groups.get(&Some('H')), Some(&[host][..]));
    }
}
