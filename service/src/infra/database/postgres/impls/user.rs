//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, Role},
        User,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `users` table, qualified with the `u` alias.
pub(super) const COLUMNS: &str = "\
    u.id, u.role, u.personal_number, \
    u.first_name, u.last_name, \
    u.email, u.phone_number, u.phone_number2, \
    u.password_hash, u.registration_code, \
    u.created_at";

/// Maps the provided [`Row`] into a [`User`].
pub(super) fn from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        role: row.get("role"),
        personal_number: row.get("personal_number"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        phone_number: row.get("phone_number"),
        phone_number2: row.get("phone_number2"),
        password_hash: row.get("password_hash"),
        registration_code: row.get("registration_code"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: user::Id = by.into_inner();

        let sql =
            format!("SELECT {COLUMNS} FROM users AS u WHERE u.id = $1::UUID");
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Option<User>, (user::PersonalNumber, Role)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, (user::PersonalNumber, Role)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (personal_number, role) = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users AS u \
             WHERE u.personal_number = $1::VARCHAR \
               AND u.role = $2::INT2",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&personal_number, &role])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Option<User>, user::Email>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let normalized = by.into_inner().normalized();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users AS u \
             WHERE u.normalized_email = $1::VARCHAR",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&normalized])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<User>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<User>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} FROM users AS u ORDER BY u.created_at, u.id",
        );
        Ok(self
            .query(sql.as_str(), &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<User>, Role>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<User>, Role>>,
    ) -> Result<Self::Ok, Self::Err> {
        let role: Role = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users AS u \
             WHERE u.role = $1::INT2 \
             ORDER BY u.created_at, u.id",
        );
        Ok(self
            .query(sql.as_str(), &[&role])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<User>, read::user::HostsOf>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<User>, read::user::HostsOf>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::user::HostsOf(address_id) = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM address_hosts AS h \
             INNER JOIN users AS u ON u.id = h.user_id \
             WHERE h.address_id = $1::INT4 \
             ORDER BY h.created_at, u.id",
        );
        Ok(self
            .query(sql.as_str(), &[&address_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<User>, read::user::TenantsOf>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<User>, read::user::TenantsOf>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::user::TenantsOf(address_id) = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users AS u \
             WHERE EXISTS (SELECT 1 \
                           FROM parameters AS p \
                           INNER JOIN flats AS f ON f.id = p.flat_id \
                           WHERE p.user_id = u.id \
                             AND f.address_id = $1::INT4) \
             ORDER BY u.created_at, u.id",
        );
        Ok(self
            .query(sql.as_str(), &[&address_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(user)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let normalized_email = user.email.normalized();
        let User {
            id,
            role,
            personal_number,
            first_name,
            last_name,
            email,
            phone_number,
            phone_number2,
            password_hash,
            registration_code,
            created_at,
        } = user;

        const SQL: &str = "\
            INSERT INTO users (\
                id, role, personal_number, \
                first_name, last_name, \
                email, normalized_email, \
                phone_number, phone_number2, \
                password_hash, registration_code, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, $2::INT2, $3::VARCHAR, \
                $4::VARCHAR, $5::VARCHAR, \
                $6::VARCHAR, $7::VARCHAR, \
                $8::VARCHAR, $9::VARCHAR, \
                $10::VARCHAR, $11::VARCHAR, \
                $12::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET role = EXCLUDED.role, \
                personal_number = EXCLUDED.personal_number, \
                first_name = EXCLUDED.first_name, \
                last_name = EXCLUDED.last_name, \
                email = EXCLUDED.email, \
                normalized_email = EXCLUDED.normalized_email, \
                phone_number = EXCLUDED.phone_number, \
                phone_number2 = EXCLUDED.phone_number2, \
                password_hash = EXCLUDED.password_hash, \
                registration_code = EXCLUDED.registration_code";
        self.exec(
            SQL,
            &[
                &id,
                &role,
                &personal_number,
                &first_name,
                &last_name,
                &email,
                &normalized_email,
                &phone_number,
                &phone_number2,
                &password_hash,
                &registration_code,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<User, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: user::Id = by.into_inner();

        const SQL: &str = "DELETE FROM users WHERE id = $1::UUID";
        self.exec(SQL, &[&id]).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Lock<By<User, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: user::Id = by.into_inner();

        const SQL: &str = "SELECT id FROM users WHERE id = $1::UUID FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
