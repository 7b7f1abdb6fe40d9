//! [`Command`] for marking an [`ErrorReport`] as seen.

use common::{
    operations::{By, Commit, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{error_report, ErrorReport},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for marking an [`ErrorReport`] as seen by a host or an
/// administrator.
///
/// Only the first sighting is remembered.
#[derive(Clone, Copy, Debug, From)]
pub struct MarkErrorReportSeen {
    /// ID of the seen [`ErrorReport`].
    pub id: error_report::Id,
}

impl<Db, Ml> Command<MarkErrorReportSeen> for Service<Db, Ml>
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
        cmd: MarkErrorReportSeen,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkErrorReportSeen { id } = cmd;

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
        if report.seen_at.is_some() {
            return Ok(report);
        }

        report.seen_at = Some(DateTime::now().coerce());
        tx.execute(Update(report.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(report)
    }
}

/// Error of [`MarkErrorReportSeen`] [`Command`] execution.
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
            error_report::{self, Priority},
            user,
        },
        infra::Database as _,
        test::service,
        Command as _,
    };

    use super::MarkErrorReportSeen;

    #[tokio::test]
    async fn remembers_first_sighting() {
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

        let first = service
            .execute(MarkErrorReportSeen { id: report.id })
            .await
            .unwrap();
        let second = service
            .execute(MarkErrorReportSeen { id: report.id })
            .await
            .unwrap();

        assert!(first.seen_at.is_some());
        assert_eq!(first.seen_at, second.seen_at);
    }
}
