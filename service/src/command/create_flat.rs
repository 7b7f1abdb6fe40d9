//! [`Command`] for creating a new [`Flat`].

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{address, flat, Address, Flat},
    form,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Flat`] at an [`Address`].
#[derive(Clone, Debug)]
pub struct CreateFlat {
    /// ID of the [`Address`] the new [`Flat`] is located at.
    pub address_id: address::Id,

    /// Submitted [`form::flat::Flat`].
    pub form: form::flat::Flat,
}

impl<Db, Ml> Command<CreateFlat> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Address>, address::Id>>,
            Ok = Option<Address>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Flat>, flat::Position>>,
            Ok = Option<Flat>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<flat::Draft>,
            Ok = Flat,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Flat;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateFlat) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateFlat { address_id, form } = cmd;

        let draft = form
            .validate(address_id)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        drop(
            tx.execute(Select(By::<Option<Address>, _>::new(address_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::AddressNotExists(address_id))
                .map_err(tracerr::wrap!())?,
        );

        let occupied = tx
            .execute(Select(By::<Option<Flat>, _>::new(draft.position())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupied.is_some() {
            return Err(tracerr::new!(E::Invalid(form::Errors::single(
                form::flat::Flat::NUMBER,
                form::flat::Flat::DUPLICATE,
            ))));
        }

        let flat = tx
            .execute(Insert(draft))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(flat_id = %flat.id, %address_id, "flat created");

        Ok(flat)
    }
}

/// Error of [`CreateFlat`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Submitted [`form::flat::Flat`] is invalid or its position is occupied.
    #[display("Invalid flat: {_0}")]
    Invalid(#[error(not(source))] form::Errors),

    /// [`Address`] with the provided ID does not exist.
    #[display("`Address(id: {_0})` does not exist")]
    #[from(ignore)]
    AddressNotExists(#[error(not(source))] address::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        domain::address,
        form,
        infra::Database as _,
        test::{address_draft, service},
        Command as _,
    };

    use super::{CreateFlat, ExecutionError};

    fn form(floor: i32, number: Option<&str>) -> form::flat::Flat {
        form::flat::Flat {
            floor,
            number: number.map(Into::into),
            entry_door_code: Some("1234".into()),
        }
    }

    #[tokio::test]
    async fn creates_flat_at_free_position() {
        let service = service();
        let address = service
            .database()
            .execute(Insert(address_draft("Storgatan")))
            .await
            .unwrap();

        let flat = service
            .execute(CreateFlat {
                address_id: address.id,
                form: form(1, Some("2")),
            })
            .await
            .unwrap();

        assert_eq!(flat.address_id, address.id);
        assert_eq!(i16::from(flat.floor), 1);
        assert_eq!(flat.entry_door_code.unwrap().as_ref(), "1234");
    }

    #[tokio::test]
    async fn reports_number_before_floor() {
        let service = service();

        let err = service
            .execute(CreateFlat {
                address_id: address::Id::from(1),
                form: form(-6, None),
            })
            .await
            .unwrap_err();

        let ExecutionError::Invalid(errors) = err.as_ref() else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(
            errors.iter().map(|e| e.field).collect::<Vec<_>>(),
            ["Number", "Floor"],
        );
        assert_eq!(
            errors.get("Number"),
            Some("Nummer fältet är obligatoriskt!"),
        );
        assert_eq!(
            errors.get("Floor"),
            Some("Våning fältet måste vara mellan -5 och 200!"),
        );
    }

    #[tokio::test]
    async fn rejects_occupied_position() {
        let service = service();
        let address = service
            .database()
            .execute(Insert(address_draft("Storgatan")))
            .await
            .unwrap();
        let cmd = CreateFlat {
            address_id: address.id,
            form: form(3, Some("31")),
        };
        _ = service.execute(cmd.clone()).await.unwrap();

        let err = service.execute(cmd).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(e)
                if e.get("Number") == Some(form::flat::Flat::DUPLICATE),
        ));
    }

    #[tokio::test]
    async fn fails_on_absent_address() {
        let service = service();

        let err = service
            .execute(CreateFlat {
                address_id: address::Id::from(5),
                form: form(1, Some("1")),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::AddressNotExists(_)));
    }
}
