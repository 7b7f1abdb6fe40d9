//! [`Command`] for updating contact preferences of a tenant.

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Flat, User};
use crate::{
    domain::{flat, user, Parameter},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating the visibility flags of an existing
/// [`Parameter`].
#[derive(Clone, Copy, Debug, From)]
pub struct UpdateParameter(pub Parameter);

impl<Db, Ml> Command<UpdateParameter> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Parameter>, (user::Id, flat::Id)>>,
            Ok = Option<Parameter>,
            Err = Traced<database::Error>,
        > + Database<Update<Parameter>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Parameter;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        UpdateParameter(parameter): UpdateParameter,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let stored = tx
            .execute(Select(By::<Option<Parameter>, _>::new(parameter.key())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ParameterNotExists {
                user_id: parameter.user_id,
                flat_id: parameter.flat_id,
            })
            .map_err(tracerr::wrap!())?;
        if stored == parameter {
            return Ok(stored);
        }

        tx.execute(Update(parameter))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(parameter)
    }
}

/// Error of [`UpdateParameter`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] doesn't live in the [`Flat`].
    #[display("`User(id: {user_id})` doesn't live in `Flat(id: {flat_id})`")]
    #[from(ignore)]
    ParameterNotExists {
        /// ID of the [`User`].
        user_id: user::Id,

        /// ID of the [`Flat`].
        flat_id: flat::Id,
    },
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use crate::{
        domain::{flat, user, Parameter},
        infra::Database as _,
        test::service,
        Command as _,
    };

    use super::{ExecutionError, UpdateParameter};

    fn parameter() -> Parameter {
        Parameter {
            user_id: user::Id::new(),
            flat_id: flat::Id::from(1),
            is_email_visible: false,
            is_phone_number_visible: false,
            can_be_contacted: false,
        }
    }

    #[tokio::test]
    async fn updates_flags() {
        let service = service();
        let db = service.database();
        let stored = parameter();
        db.execute(Insert(stored)).await.unwrap();
        let updated = Parameter {
            can_be_contacted: true,
            ..stored
        };

        _ = service.execute(UpdateParameter(updated)).await.unwrap();

        let found = db
            .execute(Select(By::<Option<Parameter>, _>::new(stored.key())))
            .await
            .unwrap();
        assert_eq!(found, Some(updated));
    }

    #[tokio::test]
    async fn fails_on_absent_parameter() {
        let service = service();

        let err = service
            .execute(UpdateParameter(parameter()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ParameterNotExists { .. },
        ));
    }
}
