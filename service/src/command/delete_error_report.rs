//! [`Command`] for deleting an [`ErrorReport`].

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{error_report, ErrorReport},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting an [`ErrorReport`] along with its comments.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteErrorReport {
    /// ID of the [`ErrorReport`] to delete.
    pub id: error_report::Id,
}

impl<Db, Ml> Command<DeleteErrorReport> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<ErrorReport>, error_report::Id>>,
            Ok = Option<ErrorReport>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<ErrorReport, error_report::Id>>,
            Ok = u64,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ErrorReport;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteErrorReport,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteErrorReport { id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let report = tx
            .execute(Select(By::<Option<ErrorReport>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ErrorReportNotExists(id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::<ErrorReport, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            report_id = %id,
            flat_id = %report.flat_id,
            "error report deleted",
        );

        Ok(report)
    }
}

/// Error of [`DeleteErrorReport`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`ErrorReport`] with the provided ID does not exist.
    #[display("`ErrorReport(id: {_0})` does not exist")]
    #[from(ignore)]
    ErrorReportNotExists(#[error(not(source))] error_report::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select},
        DateTime,
    };

    use crate::{
        domain::{
            error_report::{self, comment, Comment, Priority},
            user, ErrorReport,
        },
        infra::Database as _,
        test::service,
        Command as _,
    };

    use super::DeleteErrorReport;

    #[tokio::test]
    async fn removes_report_with_comments() {
        let service = service();
        let db = service.database();
        let author = user::Id::new();
        let report = db
            .execute(Insert(error_report::Draft {
                flat_id: 1.into(),
                user_id: author,
                subject: error_report::Subject::new("Dörren").unwrap(),
                description: error_report::Description::new("Kärvar.")
                    .unwrap(),
                submitted_at: DateTime::now().coerce(),
                priority: Priority::Low,
            }))
            .await
            .unwrap();
        _ = db
            .execute(Insert(comment::Draft {
                report_id: report.id,
                user_id: author,
                text: comment::Text::new("Snälla laga.").unwrap(),
                created_at: DateTime::now().coerce(),
            }))
            .await
            .unwrap();

        let deleted = service
            .execute(DeleteErrorReport { id: report.id })
            .await
            .unwrap();

        assert_eq!(deleted, report);
        let stored = db
            .execute(Select(By::<Option<ErrorReport>, _>::new(report.id)))
            .await
            .unwrap();
        assert_eq!(stored, None);
        let comments = db
            .execute(Select(By::<Vec<Comment>, _>::new(report.id)))
            .await
            .unwrap();
        assert!(comments.is_empty());
    }
}
