//! Controller of [`Address`]es.

use axum::{
    extract::Path,
    routing::{get, post},
    Form, Router,
};
use common::Groups;
use service::{
    command::{self, Command as _},
    domain::{
        address,
        user::{self, Role},
        Address, AddressHost, User,
    },
    form,
    infra::export::Export,
    query, read, Query as _,
};
use tracing as log;

use crate::{
    controller::{flats, users::UserError},
    define_error,
    error::RequestError,
    outcome::rerender,
    AsError, Context, Error, File, Outcome, Redirect, View,
};

/// Route name of this controller.
pub const NAME: &str = "addresses";

/// Builds the [`Router`] of this controller.
pub(crate) fn routes() -> Router {
    Router::new()
        .route("/addresses", get(index))
        .route("/addresses/index", get(index))
        .route("/addresses/details/:id", get(details))
        .route("/addresses/create", get(new).post(create))
        .route("/addresses/edit/:id", get(edit).post(update))
        .route("/addresses/delete/:id", post(delete))
        .route("/addresses/export-users/:id", get(export_users))
        .route("/addresses/hosts/:id", get(hosts))
        .route("/addresses/users/:id", get(users))
        .route("/addresses/add-host/:id/:user_id", post(add_host))
        .route("/addresses/remove-host/:id/:user_id", post(remove_host))
}

/// Lists all the [`Address`]es for an administrator, or the hosted ones for
/// a host.
///
/// # Errors
///
/// If the request is not authorized as an administrator or a host.
#[tracing::instrument(skip_all, fields(http.action = "Addresses/Index"))]
pub async fn index(ctx: Context) -> Result<Outcome<Vec<Address>>, Error> {
    let session = ctx.require(&[Role::Admin, Role::Host]).await?;

    let addresses = match session.role {
        Role::Admin => {
            ctx.service().execute(query::addresses::All::by(())).await
        }
        Role::Host | Role::User => {
            ctx.service()
                .execute(query::addresses::ByHost::by(session.user_id))
                .await
        }
    }
    .map_err(AsError::into_error)?;

    Ok(View::new("Addresses/Index", addresses).into())
}

/// Shows the [`read::address::Details`] of an [`Address`].
///
/// # Errors
///
/// If the request is not authorized, or the [`Address`] doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Addresses/Details", address.id = %id),
)]
pub async fn details(
    ctx: Context,
    Path(id): Path<address::Id>,
) -> Result<Outcome<read::address::Details>, Error> {
    let session = ctx.current_session().await?;

    let details = ctx
        .service()
        .execute(query::address::Details {
            id,
            role: session.role,
        })
        .await
        .map_err(AsError::into_error)?
        .ok_or(RequestError::NotFound)?;

    Ok(View::new("Addresses/Details", details).into())
}

/// Shows an empty [`form::address::Address`].
///
/// # Errors
///
/// If the request is not authorized as an administrator.
#[tracing::instrument(skip_all, fields(http.action = "Addresses/Create"))]
pub async fn new(
    ctx: Context,
) -> Result<Outcome<form::address::Address>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    Ok(View::new("Addresses/Create", form::address::Address::default()).into())
}

/// Creates a new [`Address`] and continues with adding [`Flat`]s to it.
///
/// [`Flat`]: service::domain::Flat
///
/// # Errors
///
/// If the request is not authorized as an administrator.
#[tracing::instrument(skip_all, fields(http.action = "Addresses/Create"))]
pub async fn create(
    ctx: Context,
    Form(form): Form<form::address::Address>,
) -> Result<Outcome<form::address::Address>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    match ctx
        .service()
        .execute(command::CreateAddress { form: form.clone() })
        .await
    {
        Ok(address) => {
            Ok(Redirect::to(flats::NAME, "create").with_id(address.id).into())
        }
        Err(e) => rerender("Addresses/Create", form, e),
    }
}

/// Shows the [`form::address::Address`] of an existing [`Address`].
///
/// # Errors
///
/// If the request is not authorized as an administrator, or the [`Address`]
/// doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Addresses/Edit", address.id = %id),
)]
pub async fn edit(
    ctx: Context,
    Path(id): Path<address::Id>,
) -> Result<Outcome<form::address::Address>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    let address = ctx
        .service()
        .execute(query::address::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or(RequestError::NotFound)?;

    Ok(View::new("Addresses/Edit", form::address::Address::from(&address))
        .into())
}

/// Updates an existing [`Address`].
///
/// # Errors
///
/// If the request is not authorized as an administrator, or the [`Address`]
/// doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Addresses/Edit", address.id = %id),
)]
pub async fn update(
    ctx: Context,
    Path(id): Path<address::Id>,
    Form(form): Form<form::address::Address>,
) -> Result<Outcome<form::address::Address>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    match ctx
        .service()
        .execute(command::UpdateAddress {
            id,
            form: form.clone(),
        })
        .await
    {
        Ok(_) => Ok(Redirect::to(NAME, "details").with_id(id).into()),
        Err(e) => rerender("Addresses/Edit", form, e),
    }
}

/// Deletes an [`Address`] without any flats or hosts.
///
/// # Errors
///
/// If the request is not authorized as an administrator, or the [`Address`]
/// doesn't exist or cannot be deleted.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Addresses/Delete", address.id = %id),
)]
pub async fn delete(
    ctx: Context,
    Path(id): Path<address::Id>,
) -> Result<Outcome<()>, Error> {
    let session = ctx.require(&[Role::Admin]).await?;

    _ = ctx
        .service()
        .execute(command::DeleteAddress {
            id,
            role: session.role,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Redirect::to(NAME, "index").into())
}

/// Downloads the tenants of an [`Address`] as a zip archive.
///
/// Falls back to the [`Address`] details whenever the export fails.
///
/// # Errors
///
/// If the request is not authorized as an administrator or a host of the
/// [`Address`], or the [`Address`] doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(http.action = "Addresses/ExportUsers", address.id = %id),
)]
pub async fn export_users(
    ctx: Context,
    Path(id): Path<address::Id>,
) -> Result<Outcome<()>, Error> {
    _ = ctx.require_host_of(id).await?;

    drop(
        ctx.service()
            .execute(query::address::ById::by(id))
            .await
            .map_err(AsError::into_error)?
            .ok_or(RequestError::NotFound)?,
    );
    let export = ctx
        .service()
        .execute(query::address::ExportUsers { id })
        .await
        .map_err(AsError::into_error)?;

    Ok(exported(id, export))
}

/// Turns the result of exporting the tenants of the [`Address`] into a
/// [`File`] download, or into a [`Redirect`] back to the [`Address`]
/// details if nothing usable was exported.
fn exported(id: address::Id, export: Option<Export>) -> Outcome<()> {
    match export {
        Some(Export { file_name, bytes }) if !file_name.is_empty() => {
            File {
                name: file_name,
                bytes,
            }
            .into()
        }
        Some(_) | None => {
            log::warn!(address.id = %id, "nothing exported");
            Redirect::to(NAME, "details").with_id(id).into()
        }
    }
}

/// Lists the hosts of an [`Address`] grouped by the initial of their last
/// name.
///
/// # Errors
///
/// If the request is not authorized as an administrator or a host of the
/// [`Address`].
#[tracing::instrument(
    skip_all,
    fields(http.action = "Addresses/Hosts", address.id = %id),
)]
pub async fn hosts(
    ctx: Context,
    Path(id): Path<address::Id>,
) -> Result<Outcome<Groups<Option<char>, User>>, Error> {
    _ = ctx.require_host_of(id).await?;

    ctx.service()
        .execute(query::users::HostsAtAddress { address_id: id })
        .await
        .map(Outcome::Json)
        .map_err(AsError::into_error)
}

/// Lists the tenants of an [`Address`] grouped by the initial of their last
/// name.
///
/// # Errors
///
/// If the request is not authorized as an administrator or a host of the
/// [`Address`].
#[tracing::instrument(
    skip_all,
    fields(http.action = "Addresses/Users", address.id = %id),
)]
pub async fn users(
    ctx: Context,
    Path(id): Path<address::Id>,
) -> Result<Outcome<Groups<Option<char>, User>>, Error> {
    _ = ctx.require_host_of(id).await?;

    ctx.service()
        .execute(query::users::TenantsAtAddress { address_id: id })
        .await
        .map(Outcome::Json)
        .map_err(AsError::into_error)
}

/// Makes a host [`User`] hosting an [`Address`].
///
/// # Errors
///
/// If the request is not authorized as an administrator, or the [`Address`]
/// or the host doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(
        http.action = "Addresses/AddHost",
        address.id = %id,
        user.id = %user_id,
    ),
)]
pub async fn add_host(
    ctx: Context,
    Path((id, user_id)): Path<(address::Id, user::Id)>,
) -> Result<Outcome<()>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    _ = ctx
        .service()
        .execute(command::AddAddressHost(AddressHost {
            address_id: id,
            user_id,
        }))
        .await
        .map_err(AsError::into_error)?;

    Ok(Redirect::to(NAME, "details").with_id(id).into())
}

/// Stops a host [`User`] hosting an [`Address`].
///
/// # Errors
///
/// If the request is not authorized as an administrator.
#[tracing::instrument(
    skip_all,
    fields(
        http.action = "Addresses/RemoveHost",
        address.id = %id,
        user.id = %user_id,
    ),
)]
pub async fn remove_host(
    ctx: Context,
    Path((id, user_id)): Path<(address::Id, user::Id)>,
) -> Result<Outcome<()>, Error> {
    _ = ctx.require(&[Role::Admin]).await?;

    ctx.service()
        .execute(command::RemoveAddressHost(AddressHost {
            address_id: id,
            user_id,
        }))
        .await
        .map_err(AsError::into_error)?;

    Ok(Redirect::to(NAME, "details").with_id(id).into())
}

impl AsError for command::create_address::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_address::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
            Self::AddressNotExists(_) => Some(AddressError::NotExists.into()),
        }
    }
}

impl AsError for command::delete_address::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::AddressNotExists(_) => Some(AddressError::NotExists.into()),
            Self::NotDeletable(_) => Some(AddressError::NotDeletable.into()),
        }
    }
}

impl AsError for command::add_address_host::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::AddressNotExists(_) => Some(AddressError::NotExists.into()),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
            Self::NotHost(_) => Some(AddressError::NotHost.into()),
        }
    }
}

impl AsError for command::remove_address_host::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

define_error! {
    enum AddressError {
        #[code = "ADDRESS_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Address does not exist"]
        NotExists,

        #[code = "ADDRESS_NOT_DELETABLE"]
        #[status = CONFLICT]
        #[message = "Address still has flats or hosts"]
        NotDeletable,

        #[code = "NOT_HOST"]
        #[status = BAD_REQUEST]
        #[message = "User is not a host"]
        NotHost,
    }
}

#[cfg(test)]
mod spec {
    use axum::{extract::Path, Form};
    use service::{
        command::{self, create_account::Link, Command as _},
        domain::{address, user::Role},
        form,
        infra::export::Export,
    };

    use crate::{
        test::{context_of, service, user},
        File, Outcome, Redirect,
    };

    use super::{
        create, delete, details, export_users, exported, hosts, index, users,
    };

    fn address_form() -> form::address::Address {
        form::address::Address {
            street: Some("Storgatan".into()),
            number: Some("12".into()),
            zip_code: Some("111 22".into()),
            town: Some("Stockholm".into()),
            country: Some("Sverige".into()),
        }
    }

    #[tokio::test]
    async fn details_aggregate_flats_and_hosts_for_tenant() {
        let service = service();
        let address = service
            .execute(command::CreateAddress {
                form: address_form(),
            })
            .await
            .unwrap();
        _ = service
            .execute(command::CreateFlat {
                address_id: address.id,
                form: form::flat::Flat {
                    floor: 10,
                    number: Some("1001".into()),
                    entry_door_code: None,
                },
            })
            .await
            .unwrap();
        _ = user(
            &service,
            "Holm",
            Role::Host,
            Some(Link::Address(address.id)),
        )
        .await;
        let tenant = user(&service, "Lind", Role::User, None).await;
        let ctx = context_of(&service, &tenant);

        let outcome = details(ctx, Path(address.id)).await.unwrap();

        let view = outcome.view().unwrap();
        assert_eq!(view.name, "Addresses/Details");
        let details = &view.model;
        assert_eq!(details.amount_flats, 1);
        assert_eq!(details.amount_available_flats, 1);
        assert_eq!(details.amount_users, 0);
        assert_eq!(details.amount_hosts, 1);
        assert!(!details.can_data_be_deleted);
    }

    #[tokio::test]
    async fn details_of_absent_address_is_not_found() {
        let service = service();
        let admin = user(&service, "Admin", Role::Admin, None).await;

        let err = details(context_of(&service, &admin), Path(404.into()))
            .await
            .unwrap_err();

        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_continues_with_flats_of_new_address() {
        let service = service();
        let admin = user(&service, "Admin", Role::Admin, None).await;

        let outcome = create(context_of(&service, &admin), Form(address_form()))
            .await
            .unwrap();

        let Some(Redirect {
            controller,
            action,
            id: Some(id),
        }) = outcome.redirect()
        else {
            panic!("expected redirect");
        };
        assert_eq!((*controller, *action), ("flats", "create"));
        let id = id.parse::<address::Id>().unwrap();
        let index = index(context_of(&service, &admin)).await.unwrap();
        assert_eq!(index.view().unwrap().model[0].id, id);
    }

    #[tokio::test]
    async fn create_rerenders_invalid_form() {
        let service = service();
        let admin = user(&service, "Admin", Role::Admin, None).await;
        let form = form::address::Address {
            town: None,
            ..address_form()
        };

        let outcome = create(context_of(&service, &admin), Form(form.clone()))
            .await
            .unwrap();

        let view = outcome.view().unwrap();
        assert_eq!(view.model, form);
        assert!(view.errors.get("Town").is_some());
    }

    #[tokio::test]
    async fn create_is_forbidden_for_host() {
        let service = service();
        let host = user(&service, "Holm", Role::Host, None).await;

        let err = create(context_of(&service, &host), Form(address_form()))
            .await
            .unwrap_err();

        assert_eq!(err.status_code, http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn delete_refuses_address_with_flats() {
        let service = service();
        let admin = user(&service, "Admin", Role::Admin, None).await;
        let address = service
            .execute(command::CreateAddress {
                form: address_form(),
            })
            .await
            .unwrap();
        _ = service
            .execute(command::CreateFlat {
                address_id: address.id,
                form: form::flat::Flat {
                    floor: 1,
                    number: Some("2".into()),
                    entry_door_code: None,
                },
            })
            .await
            .unwrap();

        let err = delete(context_of(&service, &admin), Path(address.id))
            .await
            .unwrap_err();

        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unrelated_host_cannot_see_tenants() {
        let service = service();
        let address = service
            .execute(command::CreateAddress {
                form: address_form(),
            })
            .await
            .unwrap();
        let flat = service
            .execute(command::CreateFlat {
                address_id: address.id,
                form: form::flat::Flat {
                    floor: 1,
                    number: Some("2".into()),
                    entry_door_code: None,
                },
            })
            .await
            .unwrap();
        _ = user(&service, "Lind", Role::User, Some(Link::Flat(flat.id)))
            .await;
        let own = user(
            &service,
            "Holm",
            Role::Host,
            Some(Link::Address(address.id)),
        )
        .await;
        let other = user(&service, "Berg", Role::Host, None).await;

        let ctx = || context_of(&service, &other);
        let export =
            export_users(ctx(), Path(address.id)).await.unwrap_err();
        let tenants = users(ctx(), Path(address.id)).await.unwrap_err();
        let hosted = hosts(ctx(), Path(address.id)).await.unwrap_err();
        let listed = users(context_of(&service, &own), Path(address.id))
            .await
            .unwrap();

        for err in [export, tenants, hosted] {
            assert_eq!(err.status_code, http::StatusCode::FORBIDDEN);
        }
        let Outcome::Json(listed) = listed else {
            panic!("expected JSON outcome");
        };
        assert_eq!(listed.count(), 1);
    }

    #[test]
    fn failed_export_redirects_to_details() {
        let id = address::Id::from(1);

        for export in [
            None,
            Some(Export {
                file_name: String::new(),
                bytes: vec![1],
            }),
        ] {
            let outcome = exported(id, export);

            assert_eq!(
                outcome.redirect(),
                Some(&Redirect::to("addresses", "details").with_id(1)),
            );
        }
    }

    #[test]
    fn successful_export_is_downloaded() {
        let outcome = exported(
            1.into(),
            Some(Export {
                file_name: "Storgatan 12.zip".into(),
                bytes: vec![1, 2],
            }),
        );

        let Outcome::File(File { name, bytes }) = outcome else {
            panic!("expected file");
        };
        assert_eq!(name, "Storgatan 12.zip");
        assert_eq!(bytes, [1, 2]);
    }
}
