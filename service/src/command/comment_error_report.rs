//! [`Command`] for commenting an [`ErrorReport`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{
        error_report::{self, comment, Comment},
        user, ErrorReport,
    },
    form,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for leaving a [`Comment`] on an [`ErrorReport`].
#[derive(Clone, Debug)]
pub struct CommentErrorReport {
    /// ID of the commented [`ErrorReport`].
    pub report_id: error_report::Id,

    /// ID of the commenting [`User`].
    pub user_id: user::Id,

    /// Submitted [`form::error_report::Comment`].
    pub form: form::error_report::Comment,
}

impl<Db, Ml> Command<CommentErrorReport> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<ErrorReport>, error_report::Id>>,
            Ok = Option<ErrorReport>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<comment::Draft>,
            Ok = Comment,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Comment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CommentErrorReport,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CommentErrorReport {
            report_id,
            user_id,
            form,
        } = cmd;

        let text = form.validate().map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        drop(
            tx.execute(Select(By::<Option<ErrorReport>, _>::new(report_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::ErrorReportNotExists(report_id))
                .map_err(tracerr::wrap!())?,
        );

        let comment = tx
            .execute(Insert(comment::Draft {
                report_id,
                user_id,
                text,
                created_at: DateTime::now().coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            %report_id,
            comment_id = %comment.id,
            %user_id,
            "error report commented",
        );

        Ok(comment)
    }
}

/// Error of [`CommentErrorReport`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Submitted [`form::error_report::Comment`] is invalid.
    #[display("Invalid comment: {_0}")]
    Invalid(#[error(not(source))] form::Errors),

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
            error_report::{self, Comment, Priority},
            user,
        },
        form,
        infra::Database as _,
        test::service,
        Command as _,
    };

    use super::{CommentErrorReport, ExecutionError};

    #[tokio::test]
    async fn appends_comment() {
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

        let comment = service
            .execute(CommentErrorReport {
                report_id: report.id,
                user_id: author,
                form: form::error_report::Comment {
                    text: Some("Fortfarande trasig.".into()),
                },
            })
            .await
            .unwrap();

        let comments = db
            .execute(Select(By::<Vec<Comment>, _>::new(report.id)))
            .await
            .unwrap();
        assert_eq!(comments, [comment]);
    }

    #[tokio::test]
    async fn fails_on_absent_report() {
        let service = service();

        let err = service
            .execute(CommentErrorReport {
                report_id: 3.into(),
                user_id: user::Id::new(),
                form: form::error_report::Comment {
                    text: Some("Hallå?".into()),
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::ErrorReportNotExists(_),
        ));
    }
}
