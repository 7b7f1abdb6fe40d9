//! [`Command`] for deleting an [`Address`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{address, user::Role, Address, Flat, User},
    infra::{database, Database},
    read::{
        self,
        address::{AvailableFlats, FlatEntry},
    },
    Service,
};

use super::Command;

/// [`Command`] for deleting an [`Address`].
///
/// Only an [`Address`] nothing references may be deleted, and only by an
/// administrator.
#[derive(Clone, Copy, Debug)]
pub struct DeleteAddress {
    /// ID of the [`Address`] to delete.
    pub id: address::Id,

    /// [`Role`] of the acting [`User`].
    pub role: Role,
}

impl<Db, Ml> Command<DeleteAddress> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Address, address::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Address>, address::Id>>,
            Ok = Option<Address>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Flat>, address::Id>>,
            Ok = Vec<Flat>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<User>, read::user::HostsOf>>,
            Ok = Vec<User>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Address, address::Id>>,
            Ok = u64,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Address;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteAddress) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteAddress { id, role } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid flats or hosts being added while checking deletability.
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let address = tx
            .execute(Select(By::<Option<Address>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AddressNotExists(id))
            .map_err(tracerr::wrap!())?;
        let flats = tx
            .execute(Select(By::<Vec<Flat>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let hosts = tx
            .execute(Select(By::<Vec<User>, _>::new(read::user::HostsOf(id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let details = read::address::Details::assemble(
            address,
            Some(
                flats
                    .into_iter()
                    .map(|flat| FlatEntry {
                        flat,
                        tenants: vec![],
                    })
                    .collect(),
            ),
            Some(hosts),
            AvailableFlats::default(),
            role,
        );
        if !details.can_data_be_deleted {
            return Err(tracerr::new!(E::NotDeletable(id)));
        }

        tx.execute(Delete(By::<Address, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(address_id = %id, "address deleted");

        Ok(details.address)
    }
}

/// Error of [`DeleteAddress`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Address`] with the provided ID does not exist.
    #[display("`Address(id: {_0})` does not exist")]
    #[from(ignore)]
    AddressNotExists(#[error(not(source))] address::Id),

    /// [`Address`] is still referenced or the acting [`User`] may not delete
    /// it.
    #[display("`Address(id: {_0})` cannot be deleted")]
    #[from(ignore)]
    NotDeletable(#[error(not(source))] address::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use crate::{
        domain::{user::Role, Address, Flat},
        infra::Database as _,
        test::{address_draft, flat_draft, service},
        Command as _,
    };

    use super::{DeleteAddress, ExecutionError};

    #[tokio::test]
    async fn admin_deletes_empty_address() {
        let service = service();
        let db = service.database();
        let address =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();

        let deleted = service
            .execute(DeleteAddress {
                id: address.id,
                role: Role::Admin,
            })
            .await
            .unwrap();

        assert_eq!(deleted, address);
        assert_eq!(
            db.execute(Select(By::<Option<Address>, _>::new(address.id)))
                .await
                .unwrap(),
            None,
        );
    }

    #[tokio::test]
    async fn refuses_address_with_flats() {
        let service = service();
        let db = service.database();
        let address =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();
        let flat = db
            .execute(Insert(flat_draft(address.id, 1, "1")))
            .await
            .unwrap();

        let err = service
            .execute(DeleteAddress {
                id: address.id,
                role: Role::Admin,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotDeletable(_)));
        assert_eq!(
            db.execute(Select(By::<Vec<Flat>, _>::new(address.id)))
                .await
                .unwrap(),
            [flat],
        );
    }

    #[tokio::test]
    async fn refuses_non_admins() {
        let service = service();
        let address = service
            .database()
            .execute(Insert(address_draft("Storgatan")))
            .await
            .unwrap();

        for role in [Role::Host, Role::User] {
            let err = service
                .execute(DeleteAddress {
                    id: address.id,
                    role,
                })
                .await
                .unwrap_err();

            assert!(matches!(err.as_ref(), ExecutionError::NotDeletable(_)));
        }
    }
}
