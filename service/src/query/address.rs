//! [`Query`] collection related to a single [`Address`].

use common::operations::By;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{address, user::Role, Address, User},
    infra::{database, export},
    query::{flats, users},
    read::{self, address::FlatEntry},
    Query, Service,
};

use super::DatabaseQuery;

/// Queries an [`Address`] by its [`address::Id`].
pub type ById = DatabaseQuery<By<Option<Address>, address::Id>>;

/// Queries the number of [`Flat`]s at an [`Address`] nobody lives in.
///
/// [`Flat`]: crate::domain::Flat
pub type AvailableFlats =
    DatabaseQuery<By<read::address::AvailableFlats, address::Id>>;

/// [`Query`] of [`read::address::Details`] of an [`Address`].
#[derive(Clone, Copy, Debug)]
pub struct Details {
    /// ID of the [`Address`].
    pub id: address::Id,

    /// [`Role`] of the viewer.
    pub role: Role,
}

impl<Db, Ml> Query<Details> for Service<Db, Ml>
where
    Self: Query<ById, Ok = Option<Address>, Err = Traced<database::Error>>
        + Query<
            flats::WithTenants,
            Ok = Vec<FlatEntry>,
            Err = Traced<database::Error>,
        > + Query<users::Hosts, Ok = Vec<User>, Err = Traced<database::Error>>
        + Query<
            AvailableFlats,
            Ok = read::address::AvailableFlats,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<read::address::Details>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Details { id, role }: Details,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(address) = self
            .execute(ById::by(id))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let flats = self
            .execute(flats::WithTenants { address_id: id })
            .await
            .map_err(tracerr::wrap!())?;
        let hosts = self
            .execute(users::Hosts::by(read::user::HostsOf(id)))
            .await
            .map_err(tracerr::wrap!())?;
        let available = self
            .execute(AvailableFlats::by(id))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Some(read::address::Details::assemble(
            address,
            Some(flats),
            Some(hosts),
            available,
            role,
        )))
    }
}

/// [`Query`] exporting the tenants of an [`Address`] as a zip archive.
///
/// Export failures are logged and result in no [`export::Export`] at all.
#[derive(Clone, Copy, Debug)]
pub struct ExportUsers {
    /// ID of the [`Address`].
    pub id: address::Id,
}

impl<Db, Ml> Query<ExportUsers> for Service<Db, Ml>
where
    Self: Query<ById, Ok = Option<Address>, Err = Traced<database::Error>>
        + Query<
            flats::WithTenants,
            Ok = Vec<FlatEntry>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<export::Export>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        ExportUsers { id }: ExportUsers,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(address) = self
            .execute(ById::by(id))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let flats = self
            .execute(flats::WithTenants { address_id: id })
            .await
            .map_err(tracerr::wrap!())?;

        Ok(export::users(&address, &flats)
            .inspect_err(|e| {
                log::warn!(address_id = %id, "failed to export users: {e}");
            })
            .ok())
    }
}
