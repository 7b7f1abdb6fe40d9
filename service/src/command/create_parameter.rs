//! [`Command`] for settling a tenant into a [`Flat`].

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        flat,
        user::{self, Role},
        Flat, Parameter, User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Parameter`], making a [`User`] with the
/// [`Role::User`] a tenant of a [`Flat`].
#[derive(Clone, Copy, Debug, From)]
pub struct CreateParameter(pub Parameter);

impl<Db, Ml> Command<CreateParameter> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Flat>, flat::Id>>,
            Ok = Option<Flat>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Parameter>, (user::Id, flat::Id)>>,
            Ok = Option<Parameter>,
            Err = Traced<database::Error>,
        > + Database<Insert<Parameter>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Parameter;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        CreateParameter(parameter): CreateParameter,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        drop(
            tx.execute(Select(By::<Option<Flat>, _>::new(parameter.flat_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::FlatNotExists(parameter.flat_id))
                .map_err(tracerr::wrap!())?,
        );
        let user = tx
            .execute(Select(By::<Option<User>, _>::new(parameter.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(parameter.user_id))
            .map_err(tracerr::wrap!())?;
        if user.role != Role::User {
            return Err(tracerr::new!(E::NotTenant(user.id)));
        }

        let existing = tx
            .execute(Select(By::<Option<Parameter>, _>::new(parameter.key())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::AlreadyExists {
                user_id: parameter.user_id,
                flat_id: parameter.flat_id,
            }));
        }

        tx.execute(Insert(parameter))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            user_id = %parameter.user_id,
            flat_id = %parameter.flat_id,
            "parameter created",
        );

        Ok(parameter)
    }
}

/// Error of [`CreateParameter`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Flat`] with the provided ID does not exist.
    #[display("`Flat(id: {_0})` does not exist")]
    #[from(ignore)]
    FlatNotExists(#[error(not(source))] flat::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`User`] doesn't have the [`Role::User`].
    #[display("`User(id: {_0})` is not a tenant")]
    #[from(ignore)]
    NotTenant(#[error(not(source))] user::Id),

    /// [`User`] lives in the [`Flat`] already.
    #[display("`User(id: {user_id})` lives in `Flat(id: {flat_id})` already")]
    #[from(ignore)]
    AlreadyExists {
        /// ID of the [`User`].
        user_id: user::Id,

        /// ID of the [`Flat`].
        flat_id: flat::Id,
    },
}
