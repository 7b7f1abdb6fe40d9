//! [`Query`] collection related to a single [`Flat`].

use common::operations::By;
use tracerr::Traced;

use crate::{
    domain::{flat, user::Role, Address, Flat},
    infra::database,
    query::{address, flats},
    read,
    Query, Service,
};

use super::DatabaseQuery;

/// Queries a [`Flat`] by its [`flat::Id`].
pub type ById = DatabaseQuery<By<Option<Flat>, flat::Id>>;

/// Queries a [`Flat`] by its [`flat::Position`].
pub type ByPosition = DatabaseQuery<By<Option<Flat>, flat::Position>>;

/// [`Query`] of [`read::flat::Details`] of a [`Flat`].
#[derive(Clone, Copy, Debug)]
pub struct Details {
    /// ID of the [`Flat`].
    pub id: flat::Id,

    /// [`Role`] of the viewer.
    pub role: Role,
}

impl<Db, Ml> Query<Details> for Service<Db, Ml>
where
    Self: Query<ById, Ok = Option<Flat>, Err = Traced<database::Error>>
        + Query<
            flats::Tenants,
            Ok = Vec<read::parameter::Tenant>,
            Err = Traced<database::Error>,
        > + Query<
            address::ById,
            Ok = Option<Address>,
            Err = Traced<database::Error>,
        > + Query<
            address::AvailableFlats,
            Ok = read::address::AvailableFlats,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<read::flat::Details>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Details { id, role }: Details,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(flat) = self
            .execute(ById::by(id))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };
        let Some(address) = self
            .execute(address::ById::by(flat.address_id))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let tenants = self
            .execute(flats::Tenants::by(id))
            .await
            .map_err(tracerr::wrap!())?;
        let available = self
            .execute(address::AvailableFlats::by(flat.address_id))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Some(read::flat::Details::assemble(
            flat,
            Some(tenants),
            address,
            available,
            role,
        )))
    }
}
