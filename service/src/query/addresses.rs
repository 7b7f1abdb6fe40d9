//! [`Query`] collection related to multiple [`Address`]es.

use common::operations::By;

use crate::domain::{user, Address};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries all the [`Address`]es.
pub type All = DatabaseQuery<By<Vec<Address>, ()>>;

/// Queries all the [`Address`]es hosted by a [`User`].
pub type ByHost = DatabaseQuery<By<Vec<Address>, user::Id>>;
