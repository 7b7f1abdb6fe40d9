//! [`Query`] collection related to a single [`User`].

use common::operations::By;
use futures::future;
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, Role},
        Address, User,
    },
    infra::database,
    query::{address, addresses},
    read::{self, parameter::Residence, user::distinct_addresses},
    Query, Service,
};

use super::DatabaseQuery;

/// Queries a [`User`] by its [`user::Id`].
pub type ById = DatabaseQuery<By<Option<User>, user::Id>>;

/// Queries a [`User`] by its [`user::Email`].
pub type ByEmail = DatabaseQuery<By<Option<User>, user::Email>>;

/// Queries a [`User`] by its [`user::PersonalNumber`] within a [`Role`].
pub type ByPersonalNumber =
    DatabaseQuery<By<Option<User>, (user::PersonalNumber, Role)>>;

/// Queries all the [`Residence`]s of a [`User`].
pub type Residences = DatabaseQuery<By<Vec<Residence>, user::Id>>;

/// [`Query`] of [`read::user::Details`] of a [`User`].
#[derive(Clone, Copy, Debug)]
pub struct Details {
    /// ID of the [`User`].
    pub id: user::Id,

    /// [`Role`] of the viewer.
    pub role: Role,
}

impl<Db, Ml> Query<Details> for Service<Db, Ml>
where
    Self: Query<ById, Ok = Option<User>, Err = Traced<database::Error>>
        + Query<
            addresses::ByHost,
            Ok = Vec<Address>,
            Err = Traced<database::Error>,
        > + Query<
            address::Details,
            Ok = Option<read::address::Details>,
            Err = Traced<database::Error>,
        > + Query<
            Residences,
            Ok = Vec<Residence>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<read::user::Details>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Details { id, role }: Details,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(user) = self
            .execute(ById::by(id))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let addresses = if user.role == Role::Host {
            let hosted = self
                .execute(addresses::ByHost::by(id))
                .await
                .map_err(tracerr::wrap!())?;
            let details = future::try_join_all(
                distinct_addresses(hosted).into_iter().map(|a| {
                    self.execute(address::Details { id: a.id, role })
                }),
            )
            .await
            .map_err(tracerr::wrap!())?;
            Some(details.into_iter().flatten().collect())
        } else {
            None
        };

        let residences = self
            .execute(Residences::by(id))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Some(read::user::Details::assemble(user, addresses, residences)))
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

    use super::Details;

    #[tokio::test]
    async fn host_sees_hosted_addresses() {
        let service = service();
        let db = service.database();
        let first =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();
        let second =
            db.execute(Insert(address_draft("Kungsgatan"))).await.unwrap();
        let host = with_role("Holm", Role::Host);
        db.execute(Insert(host.clone())).await.unwrap();
        for address_id in [first.id, second.id] {
            db.execute(Insert(AddressHost {
                address_id,
                user_id: host.id,
            }))
            .await
            .unwrap();
        }

        let details = service
            .execute(Details {
                id: host.id,
                role: Role::Admin,
            })
            .await
            .unwrap()
            .unwrap();

        let addresses = details.addresses.unwrap();
        assert_eq!(
            addresses.iter().map(|a| a.address.id).collect::<Vec<_>>(),
            [first.id, second.id],
        );
        assert!(addresses.iter().all(|a| a.amount_hosts == 1));
        assert!(details.flats.is_empty());
    }

    #[tokio::test]
    async fn tenant_sees_residences() {
        let service = service();
        let db = service.database();
        let address =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();
        let flat = db
            .execute(Insert(flat_draft(address.id, 3, "31")))
            .await
            .unwrap();
        let tenant = user("Berg");
        db.execute(Insert(tenant.clone())).await.unwrap();
        let parameter = Parameter {
            user_id: tenant.id,
            flat_id: flat.id,
            is_email_visible: true,
            is_phone_number_visible: true,
            can_be_contacted: false,
        };
        db.execute(Insert(parameter)).await.unwrap();

        let details = service
            .execute(Details {
                id: tenant.id,
                role: Role::User,
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(details.addresses, None);
        assert_eq!(
            details.flats.get(&address.to_string()),
            Some(&[flat][..]),
        );
        assert_eq!(details.parameters, [parameter]);
    }

    #[tokio::test]
    async fn absent_user_has_no_details() {
        let service = service();

        let details = service
            .execute(Details {
                id: crate::domain::user::Id::new(),
                role: Role::Admin,
            })
            .await
            .unwrap();

        assert_eq!(details, None);
    }
}
