//! Controller of [`Flat`]s.

use axum::{
    extract::Path,
    routing::{get, post},
    Form, Router,
};
use service::{
    command::{self, Command as _},
    domain::{address, flat, user::Role, Flat},
    form, query, read, Query as _,
};

use crate::{
    controller::addresses::{self, AddressError},
    define_error,
    error::RequestError,
    outcome::rerender,
    AsError, Context, Error, Outcome, Redirect, View,
};

/// Route name of this controller.
pub const NAME: &str = "flats";

/// Builds the [`Router`] of this controller.
pub(crate) fn routes() -> Router {
    Router::new()
        .route("/flats/details/:id", get(details))
        .route("/flats/create/:address_id", get(new).post(create))
        .route("/flats/edit/:id", get(edit).post(update))
        .route("/flats/delete/:id", post(delete))
}

/// Shows the [`read::flat::Details`] of a [`Flat`].
///
/// # Errors
///
/// If the request is not authorized, or the [`Flat`] doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Flats/Details", flat.id = %id),
)]
pub async fn details(
    ctx: Context,
    Path(id): Path<flat::Id>,
) -> Result<Outcome<read::flat::Details>, Error> {
    let session = ctx.current_session().await?;

    let details = ctx
        .service()
        .execute(query::flat::Details {
            id,
            role: session.role,
        })
        .await
        .map_err(AsError::into_error)?
        .ok_or(RequestError::NotFound)?;

    Ok(View::new("Flats/Details", details).into())
}

/// Shows an empty [`form::flat::Flat`] at an existing [`Address`].
///
/// [`Address`]: service::domain::Address
///
/// # Errors
///
/// If the request is not authorized as an administrator, or the [`Address`]
/// doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Flats/Create", address.id = %address_id),
)]
pub async fn new(
    ctx: Context,
    Path(address_id): Path<address::Id>,
) -> Result<Outcome<form::flat::Flat>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    drop(
        ctx.service()
            .execute(query::address::ById::by(address_id))
            .await
            .map_err(AsError::into_error)?
            .ok_or(RequestError::NotFound)?,
    );

    Ok(View::new("Flats/Create", form::flat::Flat::default()).into())
}

/// Creates a new [`Flat`] at an existing [`Address`].
///
/// [`Address`]: service::domain::Address
///
/// # Errors
///
/// If the request is not authorized as an administrator, or the [`Address`]
/// doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Flats/Create", address.id = %address_id),
)]
pub async fn create(
    ctx: Context,
    Path(address_id): Path<address::Id>,
    Form(form): Form<form::flat::Flat>,
) -> Result<Outcome<form::flat::Flat>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    match ctx
        .service()
        .execute(command::CreateFlat {
            address_id,
            form: form.clone(),
        })
        .await
    {
        Ok(_) => Ok(Redirect::to(addresses::NAME, "details")
            .with_id(address_id)
            .into()),
        Err(e) => rerender("Flats/Create", form, e),
    }
}

/// Shows the [`form::flat::Flat`] of an existing [`Flat`].
///
/// # Errors
///
/// If the request is not authorized as an administrator, or the [`Flat`]
/// doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Flats/Edit", flat.id = %id),
)]
pub async fn edit(
    ctx: Context,
    Path(id): Path<flat::Id>,
) -> Result<Outcome<form::flat::Flat>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    let flat = ctx
        .service()
        .execute(query::flat::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or(RequestError::NotFound)?;

    Ok(View::new("Flats/Edit", form::flat::Flat::from(&flat)).into())
}

/// Updates an existing [`Flat`].
///
/// # Errors
///
/// If the request is not authorized as an administrator, or the [`Flat`]
/// doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Flats/Edit", flat.id = %id),
)]
pub async fn update(
    ctx: Context,
    Path(id): Path<flat::Id>,
    Form(form): Form<form::flat::Flat>,
) -> Result<Outcome<form::flat::Flat>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    match ctx
        .service()
        .execute(command::UpdateFlat {
            id,
            form: form.clone(),
        })
        .await
    {
        Ok(_) => Ok(Redirect::to(NAME, "details").with_id(id).into()),
        Err(e) => rerender("Flats/Edit", form, e),
    }
}

/// Deletes a [`Flat`] and returns to its [`Address`].
///
/// [`Address`]: service::domain::Address
///
/// # Errors
///
/// If the request is not authorized as an administrator, or the [`Flat`]
/// doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Flats/Delete", flat.id = %id),
)]
pub async fn delete(
    ctx: Context,
    Path(id): Path<flat::Id>,
) -> Result<Outcome<()>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    let Flat { address_id, .. } = ctx
        .service()
        .execute(command::DeleteFlat { id })
        .await
        .map_err(AsError::into_error)?;

    Ok(Redirect::to(addresses::NAME, "details")
        .with_id(address_id)
        .into())
}

impl AsError for command::create_flat::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
            Self::AddressNotExists(_) => Some(AddressError::NotExists.into()),
        }
    }
}

impl AsError for command::update_flat::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
            Self::FlatNotExists(_) => Some(FlatError::NotExists.into()),
        }
    }
}

impl AsError for command::delete_flat::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::FlatNotExists(_) => Some(FlatError::NotExists.into()),
        }
    }
}

define_error! {
    enum FlatError {
        #[code = "FLAT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Flat does not exist"]
        NotExists,
    }
}
