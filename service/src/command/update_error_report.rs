//! [`Command`] for updating the handling state of an [`ErrorReport`].

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        error_report::{self, Priority, Status},
        ErrorReport,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating the [`Status`] and [`Priority`] of an
/// [`ErrorReport`].
#[derive(Clone, Copy, Debug)]
pub struct UpdateErrorReport {
    /// ID of the [`ErrorReport`] to update.
    pub id: error_report::Id,

    /// New [`Status`] of the [`ErrorReport`].
    pub status: Status,

    /// New [`Priority`] of the [`ErrorReport`].
    pub priority: Priority,
}

impl<Db, Ml> Command<UpdateErrorReport> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<ErrorReport>, error_report::Id>>,
            Ok = Option<ErrorReport>,
            Err = Traced<database::Error>,
        > + Database<Update<ErrorReport>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ErrorReport;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateErrorReport,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateErrorReport {
            id,
            status,
            priority,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut report = tx
            .execute(Select(By::<Option<ErrorReport>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ErrorReportNotExists(id))
            .map_err(tracerr::wrap!())?;
        if report.status == status && report.priority == priority {
            return Ok(report);
        }

        report.status = status;
        report.priority = priority;
        tx.execute(Update(report.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::debug!(
            report_id = %id,
            %status,
            %priority,
            "error report updated",
        );

        Ok(report)
    }
}

/// Error of [`UpdateErrorReport`] [`Command`] execution.
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
    use common::{operations::Insert, DateTime};

    use crate::{
        domain::{
            error_report::{self, Priority, Status},
            user,
        },
        infra::Database as _,
        test::service,
        Command as _,
    };

    use super::{ExecutionError, UpdateErrorReport};

    #[tokio::test]
    async fn changes_status_and_priority() {
        let service = service();
        let report = service
            .database()
            .execute(Insert(error_report::Draft {
                flat_id: 1.into(),
                user_id: user::Id::new(),
                subject: error_report::Subject::new("Dörren").unwrap(),
                description: error_report::Description::new("Kärvar.")
                    .unwrap(),
                submitted_at: DateTime::now().coerce(),
                priority: Priority::Low,
            }))
            .await
            .unwrap();

        let updated = service
            .execute(UpdateErrorReport {
                id: report.id,
                status: Status::InProgress,
                priority: Priority::Medium,
            })
            .await
            .unwrap();

        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.priority, Priority::Medium);
        assert_eq!(updated.subject, report.subject);
    }

    #[tokio::test]
    async fn fails_on_absent_report() {
        let service = service();

        let err = service
            .execute(UpdateErrorReport {
                id: 7.into(),
                status: Status::Finished,
                priority: Priority::Low,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ErrorReportNotExists(_),
        ));
    }
}
