//! [`Query`] collection related to a single [`Parameter`].
//!
//! [`Query`]: crate::Query

use common::operations::By;

use crate::domain::{flat, user, Parameter};

use super::DatabaseQuery;

/// Queries the [`Parameter`] of a [`User`] living in a [`Flat`].
///
/// [`Flat`]: crate::domain::Flat
/// [`User`]: crate::domain::User
pub type ByKey = DatabaseQuery<By<Option<Parameter>, (user::Id, flat::Id)>>;
