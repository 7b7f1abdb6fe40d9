//! Controller of [`User`]s.

use axum::{
    extract::{Path, Query},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, create_account::Link, Command as _},
    domain::{
        address, flat,
        user::{self, Role},
        User,
    },
    form, query, read, Query as _,
};

use crate::{
    controller::{addresses::AddressError, flats::FlatError},
    define_error,
    error::RequestError,
    outcome::rerender,
    AsError, Context, Error, Outcome, Redirect, View,
};

/// Route name of this controller.
pub const NAME: &str = "users";

/// Builds the [`Router`] of this controller.
pub(crate) fn routes() -> Router {
    Router::new()
        .route("/users", get(index))
        .route("/users/index", get(index))
        .route("/users/details/:id", get(details))
        .route("/users/create/:role", get(new).post(create))
        .route("/users/edit/:id", get(edit).post(update))
        .route("/users/delete/:id", post(delete))
}

/// Filter of the [`index`] action.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Filter {
    /// [`Role`] to list the [`User`]s of, if any.
    pub role: Option<Role>,
}

/// Place a newly created [`User`] is linked to.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Placement {
    /// [`Flat`] a new tenant moves into.
    ///
    /// [`Flat`]: service::domain::Flat
    pub flat_id: Option<flat::Id>,

    /// [`Address`] a new host starts hosting.
    ///
    /// [`Address`]: service::domain::Address
    pub address_id: Option<address::Id>,
}

impl From<Placement> for Option<Link> {
    fn from(p: Placement) -> Self {
        p.flat_id
            .map(Link::Flat)
            .or_else(|| p.address_id.map(Link::Address))
    }
}

/// Model of the account editing view.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Edited {
    /// Submitted [`form::account::Account`].
    pub form: form::account::Account,

    /// Status message about the last successful update, if any.
    pub message: Option<String>,
}

/// Lists all the [`User`]s, optionally of a single [`Role`].
///
/// # Errors
///
/// If the request is not authorized as an administrator.
#[tracing::instrument(skip_all, fields(http.action = "Users/Index"))]
pub async fn index(
    ctx: Context,
    Query(filter): Query<Filter>,
) -> Result<Outcome<Vec<User>>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    let users = match filter.role {
        Some(role) => {
            ctx.service().execute(query::users::ByRole::by(role)).await
        }
        None => ctx.service().execute(query::users::All::by(())).await,
    }
    .map_err(AsError::into_error)?;

    Ok(View::new("Users/Index", users).into())
}

/// Shows the [`read::user::Details`] of a [`User`].
///
/// Tenants may only see themselves, and hosts only the people living at or
/// hosting their [`Address`]es.
///
/// [`Address`]: service::domain::Address
///
/// # Errors
///
/// If the request is not authorized, or the [`User`] doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Users/Details", user.id = %id),
)]
pub async fn details(
    ctx: Context,
    Path(id): Path<user::Id>,
) -> Result<Outcome<read::user::Details>, Error> {
    let session =
        ctx.require_owner_or(id, &[Role::Admin, Role::Host]).await?;
    if session.role == Role::Host && session.user_id != id {
        let hosted = ctx.hosted_by(session.user_id).await?;
        if !neighbourhood(&ctx, id).await?.any(|a| hosted.contains(&a)) {
            return Err(Context::forbidden());
        }
    }

    let details = ctx
        .service()
        .execute(query::user::Details {
            id,
            role: session.role,
        })
        .await
        .map_err(AsError::into_error)?
        .ok_or(RequestError::NotFound)?;

    Ok(View::new("Users/Details", details).into())
}

/// Returns IDs of the [`Address`]es the [`User`] with the provided `id`
/// lives at or hosts.
///
/// [`Address`]: service::domain::Address
async fn neighbourhood(
    ctx: &Context,
    id: user::Id,
) -> Result<impl Iterator<Item = address::Id>, Error> {
    let residences = ctx
        .service()
        .execute(query::user::Residences::by(id))
        .await
        .map_err(AsError::into_error)?;
    let hosted = ctx.hosted_by(id).await?;

    Ok(residences
        .into_iter()
        .map(|r| r.address.id)
        .chain(hosted))
}

/// Shows an empty [`form::account::Account`] of a new [`User`].
///
/// # Errors
///
/// If the request is not authorized to create a [`User`] of the `role`.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Users/Create", user.role = %role),
)]
pub async fn new(
    ctx: Context,
    Path(role): Path<Role>,
) -> Result<Outcome<form::account::Account>, Error> {
    authorize_creation(&ctx, role, None).await?;

    Ok(View::new("Users/Create", form::account::Account::default()).into())
}

/// Creates a new [`User`] of the `role`, optionally placed into a [`Flat`]
/// or onto an [`Address`].
///
/// [`Address`]: service::domain::Address
/// [`Flat`]: service::domain::Flat
///
/// # Errors
///
/// If the request is not authorized to create a [`User`] of the `role`, or
/// the [`Placement`] doesn't suit it.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Users/Create", user.role = %role),
)]
pub async fn create(
    ctx: Context,
    Path(role): Path<Role>,
    Query(placement): Query<Placement>,
    Form(form): Form<form::account::Account>,
) -> Result<Outcome<form::account::Account>, Error> {
    authorize_creation(&ctx, role, placement.flat_id).await?;

    match ctx
        .service()
        .execute(command::CreateAccount {
            form: form.clone(),
            role,
            link: placement.into(),
        })
        .await
    {
        Ok(user) => Ok(Redirect::to(NAME, "details").with_id(user.id).into()),
        Err(e) => rerender("Users/Create", form, e),
    }
}

/// Checks that the current [`Session`] may create a [`User`] of the `role`
/// moving into the [`Flat`] with the provided `flat_id` (if any).
///
/// Administrators create anyone anywhere, hosts create tenants only, and
/// only in [`Flat`]s at their own [`Address`]es.
///
/// [`Address`]: service::domain::Address
/// [`Flat`]: service::domain::Flat
/// [`Session`]: service::domain::user::Session
async fn authorize_creation(
    ctx: &Context,
    role: Role,
    flat_id: Option<flat::Id>,
) -> Result<(), Error> {
    let session = ctx.require(&[Role::Admin, Role::Host]).await?;
    if session.role == Role::Admin {
        return Ok(());
    }
    if role != Role::User {
        return Err(Context::forbidden());
    }

    let Some(flat_id) = flat_id else {
        return Ok(());
    };
    let flat = ctx
        .service()
        .execute(query::flat::ById::by(flat_id))
        .await
        .map_err(AsError::into_error)?
        .ok_or(FlatError::NotExists)?;
    _ = ctx.require_host_of(flat.address_id).await?;

    Ok(())
}

/// Shows the [`form::account::Account`] of an existing [`User`].
///
/// # Errors
///
/// If the request is not authorized as an administrator or the [`User`]
/// itself, or the [`User`] doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Users/Edit", user.id = %id),
)]
pub async fn edit(
    ctx: Context,
    Path(id): Path<user::Id>,
) -> Result<Outcome<Edited>, Error> {
    _ = ctx.require_owner_or(id, &[Role::Admin]).await?;

    let user = ctx
        .service()
        .execute(query::user::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or(RequestError::NotFound)?;

    let model = Edited {
        form: form::account::Account::from(&user),
        message: None,
    };
    Ok(View::new("Users/Edit", model).into())
}

/// Updates the profile of an existing [`User`].
///
/// # Errors
///
/// If the request is not authorized as an administrator or the [`User`]
/// itself, or the [`User`] doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Users/Edit", user.id = %id),
)]
pub async fn update(
    ctx: Context,
    Path(id): Path<user::Id>,
    Form(form): Form<form::account::Account>,
) -> Result<Outcome<Edited>, Error> {
    let session = ctx.require_owner_or(id, &[Role::Admin]).await?;

    match ctx
        .service()
        .execute(command::UpdateAccount {
            user_id: id,
            editor_id: session.user_id,
            form: form.clone(),
        })
        .await
    {
        Ok(out) => {
            let model = Edited {
                form,
                message: Some(out.message),
            };
            Ok(View::new("Users/Edit", model).into())
        }
        Err(e) => rerender(
            "Users/Edit",
            Edited {
                form,
                message: None,
            },
            e,
        ),
    }
}

/// Deletes a [`User`] along with all its residences.
///
/// # Errors
///
/// If the request is not authorized as an administrator, or the [`User`]
/// doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Users/Delete", user.id = %id),
)]
pub async fn delete(
    ctx: Context,
    Path(id): Path<user::Id>,
) -> Result<Outcome<()>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    drop(
        ctx.service()
            .execute(command::DeleteUser { id })
            .await
            .map_err(AsError::into_error)?,
    );

    Ok(Redirect::to(NAME, "index").into())
}

impl AsError for command::create_account::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
            Self::LinkMismatch { .. } => Some(UserError::LinkMismatch.into()),
            Self::FlatNotExists(_) => Some(FlatError::NotExists.into()),
            Self::AddressNotExists(_) => Some(AddressError::NotExists.into()),
            Self::PasswordHash(_) => None,
        }
    }
}

impl AsError for command::update_account::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
            Self::EditorNotExists(_) => None,
        }
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "User does not exist"]
        NotExists,

        #[code = "LINK_MISMATCH"]
        #[status = BAD_REQUEST]
        #[message = "Tenants live in flats, hosts host addresses"]
        LinkMismatch,
    }
}
