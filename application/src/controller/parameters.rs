//! Controller of [`Parameter`]s: residencies of tenants in flats.

use axum::{
    extract::Path,
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{
        flat,
        user::{self, Role},
        Parameter,
    },
    query, Query as _,
};

use crate::{
    controller::{flats, flats::FlatError, users::UserError},
    define_error,
    error::RequestError,
    AsError, Context, Error, Outcome, Redirect, View,
};

/// Builds the [`Router`] of this controller.
pub(crate) fn routes() -> Router {
    Router::new()
        .route(
            "/parameters/create/:flat_id/:user_id",
            get(new).post(create),
        )
        .route("/parameters/edit/:flat_id/:user_id", get(edit).post(update))
        .route("/parameters/delete/:flat_id/:user_id", post(delete))
}

/// Contact preferences of a tenant.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Preferences {
    /// Whether the email address is shown to the neighbours.
    pub is_email_visible: bool,

    /// Whether the phone number is shown to the neighbours.
    pub is_phone_number_visible: bool,

    /// Whether the tenant agrees to be contacted.
    pub can_be_contacted: bool,
}

impl Preferences {
    /// Applies these [`Preferences`] to the residency of the [`User`] in
    /// the [`Flat`].
    ///
    /// [`Flat`]: service::domain::Flat
    /// [`User`]: service::domain::User
    fn apply(self, flat_id: flat::Id, user_id: user::Id) -> Parameter {
        Parameter {
            user_id,
            flat_id,
            is_email_visible: self.is_email_visible,
            is_phone_number_visible: self.is_phone_number_visible,
            can_be_contacted: self.can_be_contacted,
        }
    }
}

impl From<&Parameter> for Preferences {
    fn from(p: &Parameter) -> Self {
        Self {
            is_email_visible: p.is_email_visible,
            is_phone_number_visible: p.is_phone_number_visible,
            can_be_contacted: p.can_be_contacted,
        }
    }
}

/// Shows empty [`Preferences`] of a new residency.
///
/// # Errors
///
/// If the request is not authorized as an administrator.
#[tracing::instrument(
    skip_all,
    fields(
        http.action = "Parameters/Create",
        flat.id = %flat_id,
        user.id = %user_id,
    ),
)]
pub async fn new(
    ctx: Context,
    Path((flat_id, user_id)): Path<(flat::Id, user::Id)>,
) -> Result<Outcome<Preferences>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    Ok(View::new("Parameters/Create", Preferences::default()).into())
}

/// Moves a tenant into a [`Flat`].
///
/// [`Flat`]: service::domain::Flat
///
/// # Errors
///
/// If the request is not authorized as an administrator, or the tenant
/// cannot move into the [`Flat`].
#[tracing::instrument(
    skip_all,
    fields(
        http.action = "Parameters/Create",
        flat.id = %flat_id,
        user.id = %user_id,
    ),
)]
pub async fn create(
    ctx: Context,
    Path((flat_id, user_id)): Path<(flat::Id, user::Id)>,
    Form(preferences): Form<Preferences>,
) -> Result<Outcome<Preferences>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    drop(
        ctx.service()
            .execute(command::CreateParameter(
                preferences.apply(flat_id, user_id),
            ))
            .await
            .map_err(AsError::into_error)?,
    );

    Ok(Redirect::to(flats::NAME, "details").with_id(flat_id).into())
}

/// Shows the [`Preferences`] of an existing residency.
///
/// # Errors
///
/// If the request is not authorized as an administrator or the tenant
/// itself, or the tenant doesn't live in the [`Flat`].
///
/// [`Flat`]: service::domain::Flat
#[tracing::instrument(
    skip_all,
    fields(
        http.action = "Parameters/Edit",
        flat.id = %flat_id,
        user.id = %user_id,
    ),
)]
pub async fn edit(
    ctx: Context,
    Path((flat_id, user_id)): Path<(flat::Id, user::Id)>,
) -> Result<Outcome<Preferences>, Error> {
    _ = ctx.require_owner_or(user_id, &[Role::Admin]).await?;

    let parameter = ctx
        .service()
        .execute(query::parameter::ByKey::by((user_id, flat_id)))
        .await
        .map_err(AsError::into_error)?
        .ok_or(RequestError::NotFound)?;

    Ok(View::new("Parameters/Edit", Preferences::from(&parameter)).into())
}

/// Updates the [`Preferences`] of an existing residency.
///
/// # Errors
///
/// If the request is not authorized as an administrator or the tenant
/// itself, or the tenant doesn't live in the [`Flat`].
///
/// [`Flat`]: service::domain::Flat
#[tracing::instrument(
    skip_all,
    fields(
        http.action = "Parameters/Edit",
        flat.id = %flat_id,
        user.id = %user_id,
    ),
)]
pub async fn update(
    ctx: Context,
    Path((flat_id, user_id)): Path<(flat::Id, user::Id)>,
    Form(preferences): Form<Preferences>,
) -> Result<Outcome<Preferences>, Error> {
    _ = ctx.require_owner_or(user_id, &[Role::Admin]).await?;

    drop(
        ctx.service()
            .execute(command::UpdateParameter(
                preferences.apply(flat_id, user_id),
            ))
            .await
            .map_err(AsError::into_error)?,
    );

    Ok(Redirect::to(flats::NAME, "details").with_id(flat_id).into())
}

/// Moves a tenant out of a [`Flat`].
///
/// [`Flat`]: service::domain::Flat
///
/// # Errors
///
/// If the request is not authorized as an administrator, or the tenant
/// doesn't live in the [`Flat`].
#[tracing::instrument(
    skip_all,
    fields(
        http.action = "Parameters/Delete",
        flat.id = %flat_id,
        user.id = %user_id,
    ),
)]
pub async fn delete(
    ctx: Context,
    Path((flat_id, user_id)): Path<(flat::Id, user::Id)>,
) -> Result<Outcome<()>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    ctx.service()
        .execute(command::DeleteParameter { user_id, flat_id })
        .await
        .map_err(AsError::into_error)?;

    Ok(Redirect::to(flats::NAME, "details").with_id(flat_id).into())
}

impl AsError for command::create_parameter::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::FlatNotExists(_) => Some(FlatError::NotExists.into()),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
            Self::NotTenant(_) => Some(ParameterError::NotTenant.into()),
            Self::AlreadyExists { .. } => {
                Some(ParameterError::AlreadyExists.into())
            }
        }
    }
}

impl AsError for command::update_parameter::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ParameterNotExists { .. } => {
                Some(ParameterError::NotExists.into())
            }
        }
    }
}

impl AsError for command::delete_parameter::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ParameterNotExists { .. } => {
                Some(ParameterError::NotExists.into())
            }
        }
    }
}

define_error! {
    enum ParameterError {
        #[code = "PARAMETER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "User does not live in the flat"]
        NotExists,

        #[code = "PARAMETER_ALREADY_EXISTS"]
        #[status = CONFLICT]
        #[message = "User lives in the flat already"]
        AlreadyExists,

        #[code = "NOT_TENANT"]
        #[status = BAD_REQUEST]
        #[message = "Only tenants live in flats"]
        NotTenant,
    }
}

#[cfg(test)]
mod spec {
    use axum::{extract::Path, Form};
    use service::{
        command::{self, Command as _},
        domain::{user::Role, Flat},
        form,
    };

    use crate::{
        test::{context_of, service, user},
        Redirect, Service,
    };

    use super::{create, delete, edit, update, Preferences};

    async fn flat(service: &Service) -> Flat {
        let address = service
            .execute(command::CreateAddress {
                form: form::address::Address {
                    street: Some("Storgatan".into()),
                    number: Some("12".into()),
                    zip_code: Some("111 22".into()),
                    town: Some("Stockholm".into()),
                    country: Some("Sverige".into()),
                },
            })
            .await
            .unwrap();
        service
            .execute(command::CreateFlat {
                address_id: address.id,
                form: form::flat::Flat {
                    floor: 2,
                    number: Some("21".into()),
                    entry_door_code: None,
                },
            })
            .await
            .unwrap()
    }

    const VISIBLE: Preferences = Preferences {
        is_email_visible: true,
        is_phone_number_visible: false,
        can_be_contacted: true,
    };

    #[tokio::test]
    async fn moves_tenant_in_once() {
        let service = service();
        let admin = user(&service, "Admin", Role::Admin, None).await;
        let tenant = user(&service, "Lind", Role::User, None).await;
        let flat = flat(&service).await;

        let outcome = create(
            context_of(&service, &admin),
            Path((flat.id, tenant.id)),
            Form(VISIBLE),
        )
        .await
        .unwrap();
        let err = create(
            context_of(&service, &admin),
            Path((flat.id, tenant.id)),
            Form(VISIBLE),
        )
        .await
        .unwrap_err();

        assert_eq!(
            outcome.redirect(),
            Some(&Redirect::to("flats", "details").with_id(flat.id)),
        );
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn hosts_do_not_live_in_flats() {
        let service = service();
        let admin = user(&service, "Admin", Role::Admin, None).await;
        let host = user(&service, "Berg", Role::Host, None).await;
        let flat = flat(&service).await;

        let err = create(
            context_of(&service, &admin),
            Path((flat.id, host.id)),
            Form(VISIBLE),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, "NOT_TENANT");
    }

    #[tokio::test]
    async fn tenant_edits_own_preferences() {
        let service = service();
        let admin = user(&service, "Admin", Role::Admin, None).await;
        let tenant = user(&service, "Lind", Role::User, None).await;
        let flat = flat(&service).await;
        _ = create(
            context_of(&service, &admin),
            Path((flat.id, tenant.id)),
            Form(VISIBLE),
        )
        .await
        .unwrap();

        _ = update(
            context_of(&service, &tenant),
            Path((flat.id, tenant.id)),
            Form(Preferences::default()),
        )
        .await
        .unwrap();
        let outcome = edit(
            context_of(&service, &tenant),
            Path((flat.id, tenant.id)),
        )
        .await
        .unwrap();

        assert_eq!(outcome.view().unwrap().model, Preferences::default());
    }

    #[tokio::test]
    async fn neighbour_cannot_edit_preferences() {
        let service = service();
        let tenant = user(&service, "Lind", Role::User, None).await;
        let neighbour = user(&service, "Berg", Role::User, None).await;
        let flat = flat(&service).await;

        let err = update(
            context_of(&service, &neighbour),
            Path((flat.id, tenant.id)),
            Form(VISIBLE),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code, http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn moving_out_absent_tenant_is_not_found() {
        let service = service();
        let admin = user(&service, "Admin", Role::Admin, None).await;
        let tenant = user(&service, "Lind", Role::User, None).await;
        let flat = flat(&service).await;

        let err = delete(
            context_of(&service, &admin),
            Path((flat.id, tenant.id)),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
    }
}
