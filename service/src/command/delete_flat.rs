//! [`Command`] for deleting a [`Flat`].

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{flat, Flat},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Flat`] along with its residencies and error
/// reports.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteFlat {
    /// ID of the [`Flat`] to delete.
    pub id: flat::Id,
}

impl<Db, Ml> Command<DeleteFlat> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Flat>, flat::Id>>,
            Ok = Option<Flat>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Flat, flat::Id>>,
            Ok = u64,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Flat;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteFlat) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteFlat { id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let flat = tx
            .execute(Select(By::<Option<Flat>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::FlatNotExists(id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::<Flat, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            flat_id = %id,
            address_id = %flat.address_id,
            "flat deleted",
        );

        Ok(flat)
    }
}

/// Error of [`DeleteFlat`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Flat`] with the provided ID does not exist.
    #[display("`Flat(id: {_0})` does not exist")]
    #[from(ignore)]
    FlatNotExists(#[error(not(source))] flat::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use crate::{
        domain::{flat, Parameter},
        infra::Database as _,
        read,
        test::{address_draft, flat_draft, service},
        Command as _,
    };

    use super::{DeleteFlat, ExecutionError};

    #[tokio::test]
    async fn removes_flat_and_residencies() {
        let service = service();
        let db = service.database();
        let address =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();
        let flat = db
            .execute(Insert(flat_draft(address.id, 1, "1")))
            .await
            .unwrap();
        let tenant = read::test::user("Berg");
        db.execute(Insert(tenant.clone())).await.unwrap();
        db.execute(Insert(Parameter {
            user_id: tenant.id,
            flat_id: flat.id,
            is_email_visible: false,
            is_phone_number_visible: false,
            can_be_contacted: false,
        }))
        .await
        .unwrap();

        let deleted =
            service.execute(DeleteFlat { id: flat.id }).await.unwrap();

        assert_eq!(deleted, flat);
        let residences = db
            .execute(Select(By::<Vec<read::parameter::Residence>, _>::new(
                tenant.id,
            )))
            .await
            .unwrap();
        assert!(residences.is_empty());
    }

    #[tokio::test]
    async fn fails_on_absent_flat() {
        let service = service();

        let err = service
            .execute(DeleteFlat {
                id: flat::Id::from(1),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::FlatNotExists(_)));
    }
}
