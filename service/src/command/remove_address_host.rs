//! [`Command`] for making a [`User`] stop hosting an [`Address`].
//!
//! [`User`]: crate::domain::User
//! [`Address`]: crate::domain::Address

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{address, user, AddressHost},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for removing an [`AddressHost`].
///
/// Removing a non-existing [`AddressHost`] succeeds silently.
#[derive(Clone, Copy, Debug, From)]
pub struct RemoveAddressHost(pub AddressHost);

impl<Db, Ml> Command<RemoveAddressHost> for Service<Db, Ml>
where
    Db: Database<
        Delete<By<AddressHost, (address::Id, user::Id)>>,
        Ok = u64,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        RemoveAddressHost(host): RemoveAddressHost,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let removed = self
            .database()
            .execute(Delete(By::new((host.address_id, host.user_id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if removed == 0 {
            log::debug!(
                address_id = %host.address_id,
                user_id = %host.user_id,
                "no address host to remove",
            );
        } else {
            log::info!(
                address_id = %host.address_id,
                user_id = %host.user_id,
                "address host removed",
            );
        }

        Ok(())
    }
}

/// Error of [`RemoveAddressHost`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select};

    use crate::{
        domain::{address, user, AddressHost},
        infra::Database as _,
        test::{address_draft, service},
        Command as _,
    };

    use super::RemoveAddressHost;

    #[tokio::test]
    async fn unlinks_existing_host() {
        let service = service();
        let db = service.database();
        let address =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();
        let link = AddressHost {
            address_id: address.id,
            user_id: user::Id::new(),
        };
        db.execute(Insert(link)).await.unwrap();

        service.execute(RemoveAddressHost(link)).await.unwrap();

        let stored = db
            .execute(Select(By::<Option<AddressHost>, _>::new((
                link.address_id,
                link.user_id,
            ))))
            .await
            .unwrap();
        assert_eq!(stored, None);
    }

    #[tokio::test]
    async fn absent_host_is_removed_silently() {
        let service = service();

        let removed = service
            .execute(RemoveAddressHost(AddressHost {
                address_id: address::Id::from(1),
                user_id: user::Id::new(),
            }))
            .await;

        assert!(removed.is_ok());
    }
}
