//! [`ErrorReport`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        error_report::{self, comment, Comment},
        ErrorReport,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `error_reports` table, qualified with the `r` alias.
const COLUMNS: &str = "\
    r.id, r.flat_id, r.user_id, \
    r.subject, r.description, \
    r.submitted_at, r.seen_at, \
    r.status, r.priority";

/// Maps the provided [`Row`] into an [`ErrorReport`].
fn from_row(row: &Row) -> ErrorReport {
    ErrorReport {
        id: row.get("id"),
        flat_id: row.get("flat_id"),
        user_id: row.get("user_id"),
        subject: row.get("subject"),
        description: row.get("description"),
        submitted_at: row.get("submitted_at"),
        seen_at: row.get("seen_at"),
        status: row.get("status"),
        priority: row.get("priority"),
    }
}

impl<C> Database<Select<By<Option<ErrorReport>, error_report::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<ErrorReport>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<ErrorReport>, error_report::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: error_report::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} FROM error_reports AS r WHERE r.id = $1::INT4",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<ErrorReport>, read::error_report::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<ErrorReport>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<ErrorReport>, read::error_report::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        use read::error_report::Filter;

        let filter = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let filtering = match &filter {
            Filter::All => "",
            Filter::SubmittedBy(user_id) => {
                ps.push(user_id);
                "WHERE r.user_id = $1::UUID"
            }
            Filter::HostedBy(host_id) => {
                ps.push(host_id);
                "WHERE EXISTS (SELECT 1 \
                               FROM flats AS f \
                               INNER JOIN address_hosts AS h \
                                       ON h.address_id = f.address_id \
                               WHERE f.id = r.flat_id \
                                 AND h.user_id = $1::UUID)"
            }
        };

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM error_reports AS r \
             {filtering} \
             ORDER BY r.id DESC",
        );
        Ok(self
            .query(sql.as_str(), ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<error_report::Draft>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ErrorReport;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<error_report::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let error_report::Draft {
            flat_id,
            user_id,
            subject,
            description,
            submitted_at,
            priority,
        } = &draft;
        let status = error_report::Status::Registered;

        const SQL: &str = "\
            INSERT INTO error_reports (\
                flat_id, user_id, \
                subject, description, \
                submitted_at, status, priority\
            ) \
            VALUES (\
                $1::INT4, $2::UUID, \
                $3::VARCHAR, $4::VARCHAR, \
                $5::TIMESTAMPTZ, $6::INT2, $7::INT2\
            ) \
            RETURNING id";
        let row = self
            .query_one(
                SQL,
                &[
                    flat_id,
                    user_id,
                    subject,
                    description,
                    submitted_at,
                    &status,
                    priority,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ErrorReport::from_draft(row.get("id"), draft))
    }
}

impl<C> Database<Update<ErrorReport>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(report): Update<ErrorReport>,
    ) -> Result<Self::Ok, Self::Err> {
        let ErrorReport {
            id,
            flat_id,
            user_id,
            subject,
            description,
            submitted_at,
            seen_at,
            status,
            priority,
        } = report;

        const SQL: &str = "\
            UPDATE error_reports \
            SET flat_id = $2::INT4, \
                user_id = $3::UUID, \
                subject = $4::VARCHAR, \
                description = $5::VARCHAR, \
                submitted_at = $6::TIMESTAMPTZ, \
                seen_at = $7::TIMESTAMPTZ, \
                status = $8::INT2, \
                priority = $9::INT2 \
            WHERE id = $1::INT4";
        self.exec(
            SQL,
            &[
                &id,
                &flat_id,
                &user_id,
                &subject,
                &description,
                &submitted_at,
                &seen_at,
                &status,
                &priority,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<ErrorReport, error_report::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<ErrorReport, error_report::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id: error_report::Id = by.into_inner();

        const SQL: &str = "DELETE FROM error_reports WHERE id = $1::INT4";
        self.exec(SQL, &[&id]).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Comment>, error_report::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Comment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Comment>, error_report::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let report_id: error_report::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, report_id, user_id, text, created_at \
            FROM error_report_comments \
            WHERE report_id = $1::INT4 \
            ORDER BY id";
        Ok(self
            .query(SQL, &[&report_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Comment {
                id: row.get("id"),
                report_id: row.get("report_id"),
                user_id: row.get("user_id"),
                text: row.get("text"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

impl<C> Database<Insert<comment::Draft>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Comment;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(draft): Insert<comment::Draft>,
    ) -> Result<Self::Ok, Self::Err> {
        let comment::Draft {
            report_id,
            user_id,
            text,
            created_at,
        } = &draft;

        const SQL: &str = "\
            INSERT INTO error_report_comments (\
                report_id, user_id, text, created_at\
            ) \
            VALUES ($1::INT4, $2::UUID, $3::VARCHAR, $4::TIMESTAMPTZ) \
            RETURNING id";
        let row = self
            .query_one(SQL, &[report_id, user_id, text, created_at])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(Comment::from_draft(row.get("id"), draft))
    }
}
