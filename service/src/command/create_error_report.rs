//! [`Command`] for filing a new [`ErrorReport`].

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
    domain::{error_report, flat, user, ErrorReport, Flat, Parameter},
    form,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for filing a new [`ErrorReport`] about a [`Flat`] by one of
/// its tenants.
#[derive(Clone, Debug)]
pub struct CreateErrorReport {
    /// ID of the reporting [`User`].
    pub user_id: user::Id,

    /// ID of the [`Flat`] to report about.
    pub flat_id: flat::Id,

    /// Submitted [`form::error_report::ErrorReport`].
    pub form: form::error_report::ErrorReport,
}

impl<Db, Ml> Command<CreateErrorReport> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Flat>, flat::Id>>,
            Ok = Option<Flat>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Parameter>, (user::Id, flat::Id)>>,
            Ok = Option<Parameter>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<error_report::Draft>,
            Ok = ErrorReport,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ErrorReport;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateErrorReport,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateErrorReport {
            user_id,
            flat_id,
            form,
        } = cmd;

        let (subject, description) =
            form.validate().map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        drop(
            tx.execute(Select(By::<Option<Flat>, _>::new(flat_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::FlatNotExists(flat_id))
                .map_err(tracerr::wrap!())?,
        );
        let residency = tx
            .execute(Select(By::<Option<Parameter>, _>::new((
                user_id, flat_id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if residency.is_none() {
            return Err(tracerr::new!(E::NotResident { user_id, flat_id }));
        }

        let report = tx
            .execute(Insert(error_report::Draft {
                flat_id,
                user_id,
                subject,
                description,
                submitted_at: DateTime::now().coerce(),
                priority: form.priority,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            report_id = %report.id,
            %flat_id,
            %user_id,
            "error report created",
        );

        Ok(report)
    }
}

/// Error of [`CreateErrorReport`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Submitted [`form::error_report::ErrorReport`] is invalid.
    #[display("Invalid error report: {_0}")]
    Invalid(#[error(not(source))] form::Errors),

    /// [`Flat`] with the provided ID does not exist.
    #[display("`Flat(id: {_0})` does not exist")]
    #[from(ignore)]
    FlatNotExists(#[error(not(source))] flat::Id),

    /// Reporting [`User`] doesn't live in the [`Flat`].
    #[display("`User(id: {user_id})` doesn't live in `Flat(id: {flat_id})`")]
    #[from(ignore)]
    NotResident {
        /// ID of the reporting [`User`].
        user_id: user::Id,

        /// ID of the [`Flat`].
        flat_id: flat::Id,
    },
}

#[cfg(test)]
mod spec {
    use common::operations::Insert;

    use crate::{
        domain::{
            error_report::{Priority, Status},
            Parameter,
        },
        form,
        infra::Database as _,
        read::test::user,
        test::{address_draft, flat_draft, service},
        Command as _,
    };

    use super::{CreateErrorReport, ExecutionError};

    fn form() -> form::error_report::ErrorReport {
        form::error_report::ErrorReport {
            subject: Some("Kranen läcker".into()),
            description: Some("Droppar hela natten.".into()),
            priority: Priority::High,
        }
    }

    #[tokio::test]
    async fn files_report_of_resident() {
        let service = service();
        let db = service.database();
        let address =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();
        let flat = db
            .execute(Insert(flat_draft(address.id, 1, "1")))
            .await
            .unwrap();
        let tenant = user("Berg");
        db.execute(Insert(tenant.clone())).await.unwrap();
        db.execute(Insert(Parameter {
            user_id: tenant.id,
            flat_id: flat.id,
            is_email_visible: false,
            is_phone_number_visible: false,
            can_be_contacted: false,
        }))
        .await
        .unwrap();

        let report = service
            .execute(CreateErrorReport {
                user_id: tenant.id,
                flat_id: flat.id,
                form: form(),
            })
            .await
            .unwrap();

        assert_eq!(report.status, Status::Registered);
        assert_eq!(report.priority, Priority::High);
        assert_eq!(report.seen_at, None);
        assert_eq!(report.subject.as_ref(), "Kranen läcker");
    }

    #[tokio::test]
    async fn refuses_non_resident() {
        let service = service();
        let db = service.database();
        let address =
            db.execute(Insert(address_draft("Storgatan"))).await.unwrap();
        let flat = db
            .execute(Insert(flat_draft(address.id, 1, "1")))
            .await
            .unwrap();
        let tenant = user("Berg");
        db.execute(Insert(tenant.clone())).await.unwrap();

        let err = service
            .execute(CreateErrorReport {
                user_id: tenant.id,
                flat_id: flat.id,
                form: form(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotResident { .. }));
    }

    #[tokio::test]
    async fn requires_subject() {
        let service = service();
        let tenant = user("Berg");

        let err = service
            .execute(CreateErrorReport {
                user_id: tenant.id,
                flat_id: 1.into(),
                form: form::error_report::ErrorReport {
                    subject: None,
                    ..form()
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(e) if e.get("Subject").is_some(),
        ));
    }
}
