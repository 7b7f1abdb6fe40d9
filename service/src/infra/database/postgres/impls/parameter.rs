//! [`Parameter`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{flat, user, Address, Flat, Parameter},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::user::{from_row as user_from_row, COLUMNS as USER_COLUMNS};

/// Columns of the `parameters` table, qualified with the `p` alias.
const COLUMNS: &str = "\
    p.user_id, p.flat_id, \
    p.is_email_visible, p.is_phone_number_visible, p.can_be_contacted";

/// Maps the provided [`Row`] into a [`Parameter`].
fn from_row(row: &Row) -> Parameter {
    Parameter {
        user_id: row.get("user_id"),
        flat_id: row.get("flat_id"),
        is_email_visible: row.get("is_email_visible"),
        is_phone_number_visible: row.get("is_phone_number_visible"),
        can_be_contacted: row.get("can_be_contacted"),
    }
}

impl<C> Database<Select<By<Vec<read::parameter::Tenant>, flat::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::parameter::Tenant>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<read::parameter::Tenant>, flat::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let flat_id: flat::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS}, {USER_COLUMNS} \
             FROM parameters AS p \
             INNER JOIN users AS u ON u.id = p.user_id \
             WHERE p.flat_id = $1::INT4 \
             ORDER BY p.created_at, u.id",
        );
        Ok(self
            .query(sql.as_str(), &[&flat_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| read::parameter::Tenant {
                parameter: from_row(row),
                user: user_from_row(row),
            })
            .collect())
    }
}

impl<C> Database<Select<By<Vec<read::parameter::Residence>, user::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::parameter::Residence>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<read::parameter::Residence>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id: user::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS}, \
                    f.address_id, f.floor, \
                    f.number AS flat_number, f.entry_door_code, \
                    a.street, a.number AS address_number, \
                    a.zip_code, a.town, a.country \
             FROM parameters AS p \
             INNER JOIN flats AS f ON f.id = p.flat_id \
             INNER JOIN addresses AS a ON a.id = f.address_id \
             WHERE p.user_id = $1::UUID \
             ORDER BY p.created_at, f.id",
        );
        Ok(self
            .query(sql.as_str(), &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let parameter = from_row(row);
                let address_id = row.get("address_id");
                read::parameter::Residence {
                    parameter,
                    flat: Flat {
                        id: parameter.flat_id,
                        address_id,
                        floor: row.get("floor"),
                        number: row.get("flat_number"),
                        entry_door_code: row.get("entry_door_code"),
                    },
                    address: Address {
                        id: address_id,
                        street: row.get("street"),
                        number: row.get("address_number"),
                        zip_code: row.get("zip_code"),
                        town: row.get("town"),
                        country: row.get("country"),
                    },
                }
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Parameter>, (user::Id, flat::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Parameter>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Parameter>, (user::Id, flat::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (user_id, flat_id) = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM parameters AS p \
             WHERE p.user_id = $1::UUID \
               AND p.flat_id = $2::INT4",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&user_id, &flat_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<Parameter>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(parameter): Insert<Parameter>,
    ) -> Result<Self::Ok, Self::Err> {
        let Parameter {
            user_id,
            flat_id,
            is_email_visible,
            is_phone_number_visible,
            can_be_contacted,
        } = parameter;

        const SQL: &str = "\
            INSERT INTO parameters (\
                user_id, flat_id, \
                is_email_visible, is_phone_number_visible, can_be_contacted\
            ) \
            VALUES ($1::UUID, $2::INT4, $3::BOOL, $4::BOOL, $5::BOOL) \
            ON CONFLICT (user_id, flat_id) DO NOTHING";
        self.exec(
            SQL,
            &[
                &user_id,
                &flat_id,
                &is_email_visible,
                &is_phone_number_visible,
                &can_be_contacted,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Parameter>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(parameter): Update<Parameter>,
    ) -> Result<Self::Ok, Self::Err> {
        let Parameter {
            user_id,
            flat_id,
            is_email_visible,
            is_phone_number_visible,
            can_be_contacted,
        } = parameter;

        const SQL: &str = "\
            UPDATE parameters \
            SET is_email_visible = $3::BOOL, \
                is_phone_number_visible = $4::BOOL, \
                can_be_contacted = $5::BOOL \
            WHERE user_id = $1::UUID \
              AND flat_id = $2::INT4";
        self.exec(
            SQL,
            &[
                &user_id,
                &flat_id,
                &is_email_visible,
                &is_phone_number_visible,
                &can_be_contacted,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Parameter, (user::Id, flat::Id)>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Parameter, (user::Id, flat::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (user_id, flat_id) = by.into_inner();

        const SQL: &str = "\
            DELETE FROM parameters \
            WHERE user_id = $1::UUID \
              AND flat_id = $2::INT4";
        self.exec(SQL, &[&user_id, &flat_id])
            .await
            .map_err(tracerr::wrap!())
    }
}
