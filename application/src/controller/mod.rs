//! HTTP controllers.
//!
//! Every action responds with an [`Outcome`] or an [`Error`].
//!
//! [`Error`]: crate::Error
//! [`Outcome`]: crate::Outcome

pub mod account;
pub mod addresses;
pub mod error_reports;
pub mod flats;
pub mod parameters;
pub mod users;

use axum::Router;

/// Builds the [`Router`] of all the controllers.
pub(crate) fn routes() -> Router {
    Router::new()
        .merge(account::routes())
        .merge(addresses::routes())
        .merge(error_reports::routes())
        .merge(flats::routes())
        .merge(parameters::routes())
        .merge(users::routes())
}
