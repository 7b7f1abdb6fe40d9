//! [`Command`] for making a [`User`] host an [`Address`].

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        address,
        user::{self, Role},
        Address, AddressHost, User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for making a [`User`] with the [`Role::Host`] host an
/// [`Address`].
///
/// Adding an already existing [`AddressHost`] succeeds without changes.
#[derive(Clone, Copy, Debug, From)]
pub struct AddAddressHost(pub AddressHost);

impl<Db, Ml> Command<AddAddressHost> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Address>, address::Id>>,
            Ok = Option<Address>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<AddressHost>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = AddressHost;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        AddAddressHost(host): AddAddressHost,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        drop(
            tx.execute(Select(By::<Option<Address>, _>::new(host.address_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::AddressNotExists(host.address_id))
                .map_err(tracerr::wrap!())?,
        );
        let user = tx
            .execute(Select(By::<Option<User>, _>::new(host.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(host.user_id))
            .map_err(tracerr::wrap!())?;
        if user.role != Role::Host {
            return Err(tracerr::new!(E::NotHost(user.id)));
        }

        tx.execute(Insert(host))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            address_id = %host.address_id,
            user_id = %host.user_id,
            "address host added",
        );

        Ok(host)
    }
}

/// Error of [`AddAddressHost`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Address`] with the provided ID does not exist.
    #[display("`Address(id: {_0})` does not exist")]
    #[from(ignore)]
    AddressNotExists(#[error(not(source))] address::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`User`] doesn't have the [`Role::Host`].
    #[display("`User(id: {_0})` is not a host")]
    #[from(ignore)]
    NotHost(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use crate::{
        domain::{user::Role, AddressHost, User},
        infra::Database as _,
        read::{self, test::with_role},
        test::{address_draft, service},
        Command as _,
    };

    use super::{AddAddressHost, ExecutionError};

    #[tokio::test]
    async fn links_host_once() {
        let service = service();
        let db = service.database();
        let address =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();
        let host = with_role("Holm", Role::Host);
        db.execute(Insert(host.clone())).await.unwrap();
        let link = AddressHost {
            address_id: address.id,
            user_id: host.id,
        };

        _ = service.execute(AddAddressHost(link)).await.unwrap();
        _ = service.execute(AddAddressHost(link)).await.unwrap();

        let hosts = db
            .execute(Select(By::<Vec<User>, _>::new(read::user::HostsOf(
                address.id,
            ))))
            .await
            .unwrap();
        assert_eq!(hosts, [host]);
    }

    #[tokio::test]
    async fn refuses_non_host_users() {
        let service = service();
        let db = service.database();
        let address =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();
        let tenant = with_role("Berg", Role::User);
        db.execute(Insert(tenant.clone())).await.unwrap();

        let err = service
            .execute(AddAddressHost(AddressHost {
                address_id: address.id,
                user_id: tenant.id,
            }))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotHost(id) if *id == tenant.id,
        ));
    }
}
