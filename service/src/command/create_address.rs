//! [`Command`] for creating a new [`Address`].

use common::operations::{Commit, Insert, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{address, Address},
    form,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Address`].
#[derive(Clone, Debug, From)]
pub struct CreateAddress {
    /// Submitted [`form::address::Address`].
    pub form: form::address::Address,
}

impl<Db, Ml> Command<CreateAddress> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Insert<address::Draft>,
            Ok = Address,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Address;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateAddress) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let draft =
            cmd.form.validate().map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let address = tx
            .execute(Insert(draft))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(address_id = %address.id, "address created");

        Ok(address)
    }
}

/// Error of [`CreateAddress`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Submitted [`form::address::Address`] is invalid.
    #[display("Invalid address: {_0}")]
    Invalid(#[error(not(source))] form::Errors),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::Address, form, infra::Database as _, test::service,
        Command as _,
    };

    use super::{CreateAddress, ExecutionError};

    fn form() -> form::address::Address {
        form::address::Address {
            street: Some("Storgatan".into()),
            number: Some("12".into()),
            zip_code: Some("111 22".into()),
            town: Some("Stockholm".into()),
            country: Some("Sverige".into()),
        }
    }

    #[tokio::test]
    async fn stores_valid_address() {
        let service = service();

        let address =
            service.execute(CreateAddress { form: form() }).await.unwrap();

        let stored = service
            .database()
            .execute(Select(By::<Option<Address>, _>::new(address.id)))
            .await
            .unwrap();
        assert_eq!(stored, Some(address));
    }

    #[tokio::test]
    async fn rejects_missing_street() {
        let service = service();
        let form = form::address::Address {
            street: None,
            ..form()
        };

        let err = service.execute(CreateAddress { form }).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(e) if e.get("Street").is_some(),
        ));
    }
}
