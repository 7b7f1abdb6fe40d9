//! [`Command`] for moving a tenant out of a [`Flat`].
//!
//! [`Flat`]: crate::domain::Flat

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::{Flat, User};
use crate::{
    domain::{flat, user, Parameter},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Parameter`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteParameter {
    /// ID of the [`User`] moving out.
    pub user_id: user::Id,

    /// ID of the [`Flat`] the [`User`] moves out of.
    pub flat_id: flat::Id,
}

impl<Db, Ml> Command<DeleteParameter> for Service<Db, Ml>
where
    Db: Database<
        Delete<By<Parameter, (user::Id, flat::Id)>>,
        Ok = u64,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteParameter,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteParameter { user_id, flat_id } = cmd;

        let removed = self
            .database()
            .execute(Delete(By::new((user_id, flat_id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if removed == 0 {
            return Err(tracerr::new!(E::ParameterNotExists {
                user_id,
                flat_id,
            }));
        }

        log::info!(%user_id, %flat_id, "parameter deleted");

        Ok(())
    }
}

/// Error of [`DeleteParameter`] [`Command`] execution.
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
    use common::operations::Insert;

    use crate::{
        domain::{flat, user, Parameter},
        infra::Database as _,
        test::service,
        Command as _,
    };

    use super::{DeleteParameter, ExecutionError};

    #[tokio::test]
    async fn deletes_only_once() {
        let service = service();
        let parameter = Parameter {
            user_id: user::Id::new(),
            flat_id: flat::Id::from(1),
            is_email_visible: false,
            is_phone_number_visible: false,
            can_be_contacted: false,
        };
        service.database().execute(Insert(parameter)).await.unwrap();
        let cmd = DeleteParameter {
            user_id: parameter.user_id,
            flat_id: parameter.flat_id,
        };

        service.execute(cmd).await.unwrap();
        let err = service.execute(cmd).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ParameterNotExists { .. },
        ));
    }
}
