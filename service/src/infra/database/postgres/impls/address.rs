//! [`Address`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{address, user, Address},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `addresses` table.
const COLUMNS: &str = "id, street, number, zip_code, town, country";

/// Maps the provided [`Row`] into an [`Address`].
fn from_row(row: &Row) -> Address {
    Address {
        id: row.get("id"),
        street: row.get("street"),
        number: row.get("number"),
        zip_code: row.get("zip_code"),
        town: row.get("town"),
        country: row.get("country"),
    }
}

impl<C> Database<Select<By<HashMap<address::Id, Address>, Vec<address::Id>>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = HashMap<address::Id, Address>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<address::Id, Address>, Vec<address::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM addresses \
             WHERE id IN (SELECT unnest($1::INT4[]))",
        );
        Ok(self
            .query(sql.as_str(), &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let address = from_row(row);
                (address.id, address)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Address>, address::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<address::Id, Address>, Vec<address::Id>>>,
        Ok = HashMap<address::Id, Address>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Address>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Address>, address::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new(vec![id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<Address>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Address>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Address>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!("SELECT {COLUMNS} FROM addresses ORDER BY id");
        Ok(self
            .query(sql.as_str(), &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Address>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Address>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Address>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let host: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM addresses \
             WHERE id IN (SELECT address_id \
                          FROM address_hosts \
                          WHERE user_id = $1::UUID) \
             ORDER BY id",
        );
        Ok(self
            .query(sql.as_str(), &[&host])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<read::address::AvailableFlats, address::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::address::AvailableFlats;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::address::AvailableFlats, address::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: address::Id = by.into_inner();

        const SQL: &str = "\
            SELECT COUNT(*) AS amount \
            FROM flats AS f \
            WHERE f.address_id = $1::INT4 \
              AND NOT EXISTS (SELECT 1 \
                              FROM parameters AS p \
                              WHERE p.flat_id = f.id)";
        let row = self
            .query_one(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(read::address::AvailableFlats(row.get("amount")))
    }
}

impl<C> Database<Insert<address::Draft>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Address;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<address::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let address::Draft {
            street,
            number,
            zip_code,
            town,
            country,
        } = &draft;

        const SQL: &str = "\
            INSERT INTO addresses (street, number, zip_code, town, country) \
            VALUES ($1::VARCHAR, $2::VARCHAR, $3::VARCHAR, \
                    $4::VARCHAR, $5::VARCHAR) \
            RETURNING id";
        let row = self
            .query_one(SQL, &[street, number, zip_code, town, country])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(Address::from_draft(row.get("id"), draft))
    }
}

impl<C> Database<Update<Address>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(address): Update<Address>,
    ) -> Result<Self::Ok, Self::Err> {
        let Address {
            id,
            street,
            number,
            zip_code,
            town,
            country,
        } = address;

        const SQL: &str = "\
            UPDATE addresses \
            SET street = $2::VARCHAR, \
                number = $3::VARCHAR, \
                zip_code = $4::VARCHAR, \
                town = $5::VARCHAR, \
                country = $6::VARCHAR \
            WHERE id = $1::INT4";
        self.exec(SQL, &[&id, &street, &number, &zip_code, &town, &country])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Address, address::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Address, address::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: address::Id = by.into_inner();

        const SQL: &str = "DELETE FROM addresses WHERE id = $1::INT4";
        self.exec(SQL, &[&id]).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Lock<By<Address, address::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Address, address::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: address::Id = by.into_inner();

        // `FOR UPDATE` conflicts with the key share lock taken by inserts of
        // referencing `flats` and `address_hosts` rows.
        const SQL: &str =
            "SELECT id FROM addresses WHERE id = $1::INT4 FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
