//! [`Flat`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{address, flat, Flat},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Maps the provided [`Row`] into a [`Flat`].
fn from_row(row: &Row) -> Flat {
    Flat {
        id: row.get("id"),
        address_id: row.get("address_id"),
        floor: row.get("floor"),
        number: row.get("number"),
        entry_door_code: row.get("entry_door_code"),
    }
}

impl<C> Database<Select<By<HashMap<flat::Id, Flat>, Vec<flat::Id>>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = HashMap<flat::Id, Flat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<flat::Id, Flat>, Vec<flat::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        const SQL: &str = "\
            SELECT id, address_id, floor, number, entry_door_code \
            FROM flats \
            WHERE id IN (SELECT unnest($1::INT4[]))";
        Ok(self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let flat = from_row(row);
                (flat.id, flat)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Flat>, flat::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<flat::Id, Flat>, Vec<flat::Id>>>,
        Ok = HashMap<flat::Id, Flat>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Flat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Flat>, flat::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new(vec![id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Option<Flat>, flat::Position>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Flat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Flat>, flat::Position>>,
    ) -> Result<Self::Ok, Self::Err> {
        let flat::Position {
            address_id,
            floor,
            number,
        } = by.into_inner();

        const SQL: &str = "\
            SELECT id, address_id, floor, number, entry_door_code \
            FROM flats \
            WHERE address_id = $1::INT4 \
              AND floor = $2::INT2 \
              AND number = $3::VARCHAR";
        Ok(self
            .query_opt(SQL, &[&address_id, &floor, &number])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Flat>, address::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Flat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Flat>, address::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let address_id: address::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, address_id, floor, number, entry_door_code \
            FROM flats \
            WHERE address_id = $1::INT4 \
            ORDER BY id";
        Ok(self
            .query(SQL, &[&address_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<flat::Draft>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Flat;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<flat::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let flat::Draft {
            address_id,
            floor,
            number,
            entry_door_code,
        } = &draft;

        const SQL: &str = "\
            INSERT INTO flats (address_id, floor, number, entry_door_code) \
            VALUES ($1::INT4, $2::INT2, $3::VARCHAR, $4::VARCHAR) \
            RETURNING id";
        let row = self
            .query_one(SQL, &[address_id, floor, number, entry_door_code])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(Flat::from_draft(row.get("id"), draft))
    }
}

impl<C> Database<Update<Flat>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(flat): Update<Flat>,
    ) -> Result<Self::Ok, Self::Err> {
        let Flat {
            id,
            address_id,
            floor,
            number,
            entry_door_code,
        } = flat;

        const SQL: &str = "\
            UPDATE flats \
            SET address_id = $2::INT4, \
                floor = $3::INT2, \
                number = $4::VARCHAR, \
                entry_door_code = $5::VARCHAR \
            WHERE id = $1::INT4";
        self.exec(
            SQL,
            &[&id, &address_id, &floor, &number, &entry_door_code],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Flat, flat::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Flat, flat::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: flat::Id = by.into_inner();

        const SQL: &str = "DELETE FROM flats WHERE id = $1::INT4";
        self.exec(SQL, &[&id]).await.map_err(tracerr::wrap!())
    }
}
