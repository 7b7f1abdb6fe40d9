//! [`AddressHost`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{address, user, AddressHost},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<AddressHost>, (address::Id, user::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<AddressHost>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<AddressHost>, (address::Id, user::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (address_id, user_id) = by.into_inner();

        const SQL: &str = "\
            SELECT address_id, user_id \
            FROM address_hosts \
            WHERE address_id = $1::INT4 \
              AND user_id = $2::UUID";
        Ok(self
            .query_opt(SQL, &[&address_id, &user_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| AddressHost {
                address_id: row.get("address_id"),
                user_id: row.get("user_id"),
            }))
    }
}

impl<C> Database<Insert<AddressHost>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(link): Insert<AddressHost>,
    ) -> Result<Self::Ok, Self::Err> {
        let AddressHost {
            address_id,
            user_id,
        } = link;

        const SQL: &str = "\
            INSERT INTO address_hosts (address_id, user_id) \
            VALUES ($1::INT4, $2::UUID) \
            ON CONFLICT (address_id, user_id) DO NOTHING";
        self.exec(SQL, &[&address_id, &user_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<AddressHost, (address::Id, user::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<AddressHost, (address::Id, user::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (address_id, user_id) = by.into_inner();

        const SQL: &str = "\
            DELETE FROM address_hosts \
            WHERE address_id = $1::INT4 \
              AND user_id = $2::UUID";
        self.exec(SQL, &[&address_id, &user_id])
            .await
            .map_err(tracerr::wrap!())
    }
}
