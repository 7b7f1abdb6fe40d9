//! [`Query`] collection related to multiple [`Flat`]s.

use common::operations::By;
use futures::future;
use tracerr::Traced;

use crate::{
    domain::{address, flat, Flat},
    infra::database,
    read::{self, address::FlatEntry},
    Query, Service,
};

use super::DatabaseQuery;

/// Queries all the [`Flat`]s located at an [`Address`].
///
/// [`Address`]: crate::domain::Address
pub type ByAddress = DatabaseQuery<By<Vec<Flat>, address::Id>>;

/// Queries all the [`Tenant`]s living in a [`Flat`].
///
/// [`Tenant`]: read::parameter::Tenant
pub type Tenants = DatabaseQuery<By<Vec<read::parameter::Tenant>, flat::Id>>;

/// [`Query`] of all the [`Flat`]s located at an [`Address`] along with their
/// [`Tenant`]s.
///
/// [`Address`]: crate::domain::Address
/// [`Tenant`]: read::parameter::Tenant
#[derive(Clone, Copy, Debug)]
pub struct WithTenants {
    /// ID of the [`Address`].
    ///
    /// [`Address`]: crate::domain::Address
    pub address_id: address::Id,
}

impl<Db, Ml> Query<WithTenants> for Service<Db, Ml>
where
    Self: Query<ByAddress, Ok = Vec<Flat>, Err = Traced<database::Error>>
        + Query<
            Tenants,
            Ok = Vec<read::parameter::Tenant>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<FlatEntry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        WithTenants { address_id }: WithTenants,
    ) -> Result<Self::Ok, Self::Err> {
        let flats = self
            .execute(ByAddress::by(address_id))
            .await
            .map_err(tracerr::wrap!())?;

        future::try_join_all(flats.into_iter().map(|flat| async move {
            let tenants = self
                .execute(Tenants::by(flat.id))
                .await
                .map_err(tracerr::wrap!())?;
            Ok::<_, Traced<database::Error>>(FlatEntry { flat, tenants })
        }))
        .await
    }
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        domain::Parameter,
        infra::Database as _,
        read,
        test::{address_draft, flat_draft, service},
        Query as _,
    };

    use super::WithTenants;

    #[tokio::test]
    async fn loads_tenants_per_flat() {
        let service = service();
        let db = service.database();
        let address =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();
        let first = db
            .execute(Insert(flat_draft(address.id, 1, "1")))
            .await
            .unwrap();
        let second = db
            .execute(Insert(flat_draft(address.id, 1, "2")))
            .await
            .unwrap();
        let tenant = read::test::user("Berg");
        db.execute(Insert(tenant.clone())).await.unwrap();
        db.execute(Insert(Parameter {
            user_id: tenant.id,
            flat_id: second.id,
            is_email_visible: true,
            is_phone_number_visible: false,
            can_be_contacted: true,
        }))
        .await
        .unwrap();

        let entries = service
            .execute(WithTenants {
                address_id: address.id,
            })
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].flat, first);
        assert!(entries[0].tenants.is_empty());
        assert_eq!(entries[1].tenants.len(), 1);
        assert_eq!(entries[1].tenants[0].user, tenant);
    }
}
