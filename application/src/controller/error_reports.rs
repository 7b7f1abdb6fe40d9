//! Controller of [`ErrorReport`]s.

use axum::{
    extract::Path,
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{
        error_report::{self, Priority, Status},
        flat,
        user::{Role, Session},
        ErrorReport,
    },
    form, query,
    read::{self, error_report::Filter},
    Query as _,
};

use crate::{
    controller::flats::FlatError, define_error, error::RequestError,
    outcome::rerender, AsError, Context, Error, Outcome, Redirect, View,
};

/// Route name of this controller.
pub const NAME: &str = "error-reports";

/// Builds the [`Router`] of this controller.
pub(crate) fn routes() -> Router {
    Router::new()
        .route("/error-reports", get(index))
        .route("/error-reports/index", get(index))
        .route("/error-reports/details/:id", get(details))
        .route("/error-reports/create/:flat_id", get(new).post(create))
        .route("/error-reports/edit/:id", get(edit).post(update))
        .route("/error-reports/comment/:id", post(comment))
        .route("/error-reports/delete/:id", post(delete))
}

/// Handling state of an [`ErrorReport`] set by a host or an administrator.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Triage {
    /// New [`Status`] of the [`ErrorReport`].
    pub status: Status,

    /// New [`Priority`] of the [`ErrorReport`].
    pub priority: Priority,
}

/// Lists the [`ErrorReport`]s visible to the current [`Session`], grouped by
/// their [`Address`].
///
/// [`Address`]: service::domain::Address
///
/// # Errors
///
/// If the request is not authorized.
#[tracing::instrument(skip_all, fields(http.action = "ErrorReports/Index"))]
pub async fn index(
    ctx: Context,
) -> Result<Outcome<Vec<read::error_report::AddressGroup>>, Error> {
    let session = ctx.current_session().await?;

    let groups = ctx
        .service()
        .execute(query::error_reports::List {
            filter: Filter::visible_to(session.user_id, session.role),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(View::new("ErrorReports/Index", groups).into())
}

/// Shows the [`read::error_report::Details`] of an [`ErrorReport`], marking
/// it as seen when viewed by a host or an administrator.
///
/// # Errors
///
/// If the request is not authorized to see the [`ErrorReport`], or it
/// doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "ErrorReports/Details", error_report.id = %id),
)]
pub async fn details(
    ctx: Context,
    Path(id): Path<error_report::Id>,
) -> Result<Outcome<read::error_report::Details>, Error> {
    let session = ctx.current_session().await?;
    let mut details = visible(&ctx, session, id).await?;

    match session.role {
        Role::Admin | Role::Host => {
            details.entry.report = ctx
                .service()
                .execute(command::MarkErrorReportSeen { id })
                .await
                .map_err(AsError::into_error)?;
        }
        Role::User => {}
    }

    Ok(View::new("ErrorReports/Details", details).into())
}

/// Loads the [`read::error_report::Details`] of an [`ErrorReport`] if the
/// [`Session`] may see it: administrators see everything, hosts see the
/// reports at their addresses, tenants see their own reports.
async fn visible(
    ctx: &Context,
    session: Session,
    id: error_report::Id,
) -> Result<read::error_report::Details, Error> {
    let details = ctx
        .service()
        .execute(query::error_report::Details { id })
        .await
        .map_err(AsError::into_error)?
        .ok_or(RequestError::NotFound)?;

    let allowed = match session.role {
        Role::Admin => true,
        Role::Host => match &details.address {
            Some(address) => {
                ctx.hosted_by(session.user_id).await?.contains(&address.id)
            }
            None => false,
        },
        Role::User => details.entry.report.user_id == session.user_id,
    };
    if !allowed {
        return Err(Context::forbidden());
    }

    Ok(details)
}

/// Shows an empty [`form::error_report::ErrorReport`] about a [`Flat`].
///
/// [`Flat`]: service::domain::Flat
///
/// # Errors
///
/// If the request is not authorized as a tenant.
#[tracing::instrument(
    skip_all,
    fields(http.action = "ErrorReports/Create", flat.id = %flat_id),
)]
pub async fn new(
    ctx: Context,
    Path(flat_id): Path<flat::Id>,
) -> Result<Outcome<form::error_report::ErrorReport>, Error> {
    _ = ctx.require(&[Role::User]).await?;

    let model = form::error_report::ErrorReport::default();
    Ok(View::new("ErrorReports/Create", model).into())
}

/// Files a new [`ErrorReport`] about a [`Flat`] the tenant lives in.
///
/// [`Flat`]: service::domain::Flat
///
/// # Errors
///
/// If the request is not authorized as a tenant living in the [`Flat`].
#[tracing::instrument(
    skip_all,
    fields(http.action = "ErrorReports/Create", flat.id = %flat_id),
)]
pub async fn create(
    ctx: Context,
    Path(flat_id): Path<flat::Id>,
    Form(form): Form<form::error_report::ErrorReport>,
) -> Result<Outcome<form::error_report::ErrorReport>, Error> {
    let session = ctx.require(&[Role::User]).await?;

    match ctx
        .service()
        .execute(command::CreateErrorReport {
            user_id: session.user_id,
            flat_id,
            form: form.clone(),
        })
        .await
    {
        Ok(report) => {
            Ok(Redirect::to(NAME, "details").with_id(report.id).into())
        }
        Err(e) => rerender("ErrorReports/Create", form, e),
    }
}

/// Shows the current [`Triage`] of an [`ErrorReport`].
///
/// # Errors
///
/// If the request is not authorized to handle the [`ErrorReport`], or it
/// doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "ErrorReports/Edit", error_report.id = %id),
)]
pub async fn edit(
    ctx: Context,
    Path(id): Path<error_report::Id>,
) -> Result<Outcome<Triage>, Error> {
    let session = ctx.require(&[Role::Admin, Role::Host]).await?;
    let ErrorReport {
        status, priority, ..
    } = visible(&ctx, session, id).await?.entry.report;

    Ok(View::new("ErrorReports/Edit", Triage { status, priority }).into())
}

/// Changes the [`Triage`] of an [`ErrorReport`].
///
/// # Errors
///
/// If the request is not authorized to handle the [`ErrorReport`], or it
/// doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "ErrorReports/Edit", error_report.id = %id),
)]
pub async fn update(
    ctx: Context,
    Path(id): Path<error_report::Id>,
    Form(triage): Form<Triage>,
) -> Result<Outcome<Triage>, Error> {
    let session = ctx.require(&[Role::Admin, Role::Host]).await?;
    drop(visible(&ctx, session, id).await?);

    drop(
        ctx.service()
            .execute(command::UpdateErrorReport {
                id,
                status: triage.status,
                priority: triage.priority,
            })
            .await
            .map_err(AsError::into_error)?,
    );

    Ok(Redirect::to(NAME, "details").with_id(id).into())
}

/// Adds a comment to an [`ErrorReport`] on behalf of anyone who may see it.
///
/// # Errors
///
/// If the request is not authorized to see the [`ErrorReport`], or it
/// doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "ErrorReports/Comment", error_report.id = %id),
)]
pub async fn comment(
    ctx: Context,
    Path(id): Path<error_report::Id>,
    Form(form): Form<form::error_report::Comment>,
) -> Result<Outcome<form::error_report::Comment>, Error> {
    let session = ctx.current_session().await?;
    drop(visible(&ctx, session, id).await?);

    match ctx
        .service()
        .execute(command::CommentErrorReport {
            report_id: id,
            user_id: session.user_id,
            form: form.clone(),
        })
        .await
    {
        Ok(_) => Ok(Redirect::to(NAME, "details").with_id(id).into()),
        Err(e) => rerender("ErrorReports/Comment", form, e),
    }
}

/// Deletes an [`ErrorReport`] along with its comments.
///
/// # Errors
///
/// If the request is not authorized as an administrator, or the
/// [`ErrorReport`] doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "ErrorReports/Delete", error_report.id = %id),
)]
pub async fn delete(
    ctx: Context,
    Path(id): Path<error_report::Id>,
) -> Result<Outcome<()>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    drop(
        ctx.service()
            .execute(command::DeleteErrorReport { id })
            .await
            .map_err(AsError::into_error)?,
    );

    Ok(Redirect::to(NAME, "index").into())
}

impl AsError for command::create_error_report::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
            Self::FlatNotExists(_) => Some(FlatError::NotExists.into()),
            Self::NotResident { .. } => {
                Some(ErrorReportError::NotResident.into())
            }
        }
    }
}

impl AsError for command::update_error_report::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ErrorReportNotExists(_) => {
                Some(ErrorReportError::NotExists.into())
            }
        }
    }
}

impl AsError for command::mark_error_report_seen::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ErrorReportNotExists(_) => {
                Some(ErrorReportError::NotExists.into())
            }
        }
    }
}

impl AsError for command::comment_error_report::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
            Self::ErrorReportNotExists(_) => {
                Some(ErrorReportError::NotExists.into())
            }
        }
    }
}

impl AsError for command::delete_error_report::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ErrorReportNotExists(_) => {
                Some(ErrorReportError::NotExists.into())
            }
        }
    }
}

define_error! {
    enum ErrorReportError {
        #[code = "ERROR_REPORT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Error report does not exist"]
        NotExists,

        #[code = "NOT_RESIDENT"]
        #[status = FORBIDDEN]
        #[message = "Only residents report errors of a flat"]
        NotResident,
    }
}

#[cfg(test)]
mod spec {
    use axum::{extract::Path, Form};
    use service::{
        command::{self, create_account::Link, Command as _},
        domain::{
            error_report::{Priority, Status},
            user::Role,
            Address, ErrorReport, Flat,
        },
        form,
    };

    use crate::{
        test::{context_of, service, user},
        Redirect, Service,
    };

    use super::{comment, create, delete, details, index, update, Triage};

    async fn address(service: &Service, street: &str) -> Address {
        service
            .execute(command::CreateAddress {
                form: form::address::Address {
                    street: Some(street.into()),
                    number: Some("12".into()),
                    zip_code: Some("111 22".into()),
                    town: Some("Stockholm".into()),
                    country: Some("Sverige".into()),
                },
            })
            .await
            .unwrap()
    }

    async fn flat(service: &Service, address: &Address) -> Flat {
        service
            .execute(command::CreateFlat {
                address_id: address.id,
                form: form::flat::Flat {
                    floor: 1,
                    number: Some("11".into()),
                    entry_door_code: None,
                },
            })
            .await
            .unwrap()
    }

    fn report_form() -> form::error_report::ErrorReport {
        form::error_report::ErrorReport {
            subject: Some("Kran".into()),
            description: Some("Kranen i köket droppar.".into()),
            priority: Priority::High,
        }
    }

    async fn reported(service: &Service, flat: &Flat) -> ErrorReport {
        let tenant =
            user(service, "Lind", Role::User, Some(Link::Flat(flat.id))).await;
        service
            .execute(command::CreateErrorReport {
                user_id: tenant.id,
                flat_id: flat.id,
                form: report_form(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn resident_files_report() {
        let service = service();
        let address = address(&service, "Storgatan").await;
        let flat = flat(&service, &address).await;
        let tenant =
            user(&service, "Lind", Role::User, Some(Link::Flat(flat.id)))
                .await;

        let outcome = create(
            context_of(&service, &tenant),
            Path(flat.id),
            Form(report_form()),
        )
        .await
        .unwrap();

        let redirect = outcome.redirect().unwrap();
        assert_eq!(
            (redirect.controller, redirect.action),
            ("error-reports", "details"),
        );
    }

    #[tokio::test]
    async fn stranger_cannot_file_report() {
        let service = service();
        let address = address(&service, "Storgatan").await;
        let flat = flat(&service, &address).await;
        let stranger = user(&service, "Berg", Role::User, None).await;

        let err = create(
            context_of(&service, &stranger),
            Path(flat.id),
            Form(report_form()),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, "NOT_RESIDENT");
    }

    #[tokio::test]
    async fn host_sees_only_hosted_reports() {
        let service = service();
        let hosted = address(&service, "Storgatan").await;
        let other = address(&service, "Kungsgatan").await;
        let report = reported(&service, &flat(&service, &other).await).await;
        let host =
            user(&service, "Berg", Role::Host, Some(Link::Address(hosted.id)))
                .await;

        let err = details(context_of(&service, &host), Path(report.id))
            .await
            .unwrap_err();
        let listed = index(context_of(&service, &host)).await.unwrap();

        assert_eq!(err.status_code, http::StatusCode::FORBIDDEN);
        assert!(listed.view().unwrap().model.is_empty());
    }

    #[tokio::test]
    async fn admin_marks_report_seen() {
        let service = service();
        let admin = user(&service, "Admin", Role::Admin, None).await;
        let address = address(&service, "Storgatan").await;
        let report = reported(&service, &flat(&service, &address).await).await;

        let outcome = details(context_of(&service, &admin), Path(report.id))
            .await
            .unwrap();

        assert!(report.seen_at.is_none());
        assert!(outcome.view().unwrap().model.entry.report.seen_at.is_some());
    }

    #[tokio::test]
    async fn admin_triages_report() {
        let service = service();
        let admin = user(&service, "Admin", Role::Admin, None).await;
        let address = address(&service, "Storgatan").await;
        let report = reported(&service, &flat(&service, &address).await).await;

        _ = update(
            context_of(&service, &admin),
            Path(report.id),
            Form(Triage {
                status: Status::InProgress,
                priority: Priority::Low,
            }),
        )
        .await
        .unwrap();
        let outcome = details(context_of(&service, &admin), Path(report.id))
            .await
            .unwrap();

        let report = &outcome.view().unwrap().model.entry.report;
        assert_eq!(report.status, Status::InProgress);
        assert_eq!(report.priority, Priority::Low);
    }

    #[tokio::test]
    async fn empty_comment_is_rerendered() {
        let service = service();
        let admin = user(&service, "Admin", Role::Admin, None).await;
        let address = address(&service, "Storgatan").await;
        let report = reported(&service, &flat(&service, &address).await).await;

        let outcome = comment(
            context_of(&service, &admin),
            Path(report.id),
            Form(form::error_report::Comment { text: None }),
        )
        .await
        .unwrap();

        assert!(outcome.view().unwrap().errors.get("Text").is_some());
    }

    #[tokio::test]
    async fn delete_returns_to_index() {
        let service = service();
        let admin = user(&service, "Admin", Role::Admin, None).await;
        let address = address(&service, "Storgatan").await;
        let report = reported(&service, &flat(&service, &address).await).await;

        let outcome = delete(context_of(&service, &admin), Path(report.id))
            .await
            .unwrap();
        let err = details(context_of(&service, &admin), Path(report.id))
            .await
            .unwrap_err();

        assert_eq!(
            outcome.redirect(),
            Some(&Redirect::to("error-reports", "index")),
        );
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
    }
}
