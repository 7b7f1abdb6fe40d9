//! [`Command`] for updating an existing [`Flat`].

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{flat, Flat},
    form,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Flat`].
///
/// The [`Flat`] stays at its [`Address`].
///
/// [`Address`]: crate::domain::Address
#[derive(Clone, Debug)]
pub struct UpdateFlat {
    /// ID of the [`Flat`] to update.
    pub id: flat::Id,

    /// Submitted [`form::flat::Flat`].
    pub form: form::flat::Flat,
}

impl<Db, Ml> Command<UpdateFlat> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Flat>, flat::Id>>,
            Ok = Option<Flat>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Flat>, flat::Position>>,
            Ok = Option<Flat>,
            Err = Traced<database::Error>,
        > + Database<Update<Flat>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Flat;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateFlat) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateFlat { id, form } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let stored = tx
            .execute(Select(By::<Option<Flat>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::FlatNotExists(id))
            .map_err(tracerr::wrap!())?;

        let draft = form
            .validate(stored.address_id)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let occupant = tx
            .execute(Select(By::<Option<Flat>, _>::new(draft.position())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupant.is_some_and(|f| f.id != id) {
            return Err(tracerr::new!(E::Invalid(form::Errors::single(
                form::flat::Flat::NUMBER,
                form::flat::Flat::DUPLICATE,
            ))));
        }

        let flat = Flat::from_draft(id, draft);
        if flat == stored {
            return Ok(flat);
        }

        tx.execute(Update(flat.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(flat)
    }
}

/// Error of [`UpdateFlat`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Submitted [`form::flat::Flat`] is invalid or its position is occupied.
    #[display("Invalid flat: {_0}")]
    Invalid(#[error(not(source))] form::Errors),

    /// [`Flat`] with the provided ID does not exist.
    #[display("`Flat(id: {_0})` does not exist")]
    #[from(ignore)]
    FlatNotExists(#[error(not(source))] flat::Id),
}
