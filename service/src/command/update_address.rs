//! [`Command`] for updating an existing [`Address`].

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{address, Address},
    form,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Address`].
#[derive(Clone, Debug)]
pub struct UpdateAddress {
    /// ID of the [`Address`] to update.
    pub id: address::Id,

    /// Submitted [`form::address::Address`].
    pub form: form::address::Address,
}

impl<Db, Ml> Command<UpdateAddress> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Address>, address::Id>>,
            Ok = Option<Address>,
            Err = Traced<database::Error>,
        > + Database<Update<Address>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Address;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateAddress) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateAddress { id, form } = cmd;

        let draft = form.validate().map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut address = tx
            .execute(Select(By::<Option<Address>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AddressNotExists(id))
            .map_err(tracerr::wrap!())?;
        address.apply(draft);

        tx.execute(Update(address.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(address)
    }
}

/// Error of [`UpdateAddress`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Submitted [`form::address::Address`] is invalid.
    #[display("Invalid address: {_0}")]
    Invalid(#[error(not(source))] form::Errors),

    /// [`Address`] with the provided ID does not exist.
    #[display("`Address(id: {_0})` does not exist")]
    #[from(ignore)]
    AddressNotExists(#[error(not(source))] address::Id),
}
