//! Application provides HTTP API for interacting with the [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod args;
pub mod config;
mod context;
pub mod controller;
pub mod error;
pub mod outcome;

use axum::Router;
// Used in binary.
use axum_client_ip as _;
use refinery as _;
use tower_http as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::Context,
    error::{AsError, Error},
    outcome::{File, Outcome, Redirect, View},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
#[cfg(not(test))]
pub type Service = service::Service<
    service::infra::Postgres,
    service::infra::mail::Log,
>;

/// [`Service`] with in-memory infrastructure dependencies.
///
/// [`Service`]: service::Service
#[cfg(test)]
pub type Service = service::Service<
    service::infra::Memory,
    service::infra::mail::Outbox,
>;

/// Builds the [`Router`] serving every controller action.
///
/// The [`Service`] is expected to be provided as an [`axum::Extension`].
#[must_use]
pub fn router() -> Router {
    controller::routes()
}

#[cfg(test)]
pub(crate) mod test {
    //! Helpers shared by the tests of this crate.

    use std::time::Duration;

    use common::DateTime;
    use service::{
        command::{self, create_account::Link, Command as _},
        domain::user::{self, Role, Session},
        form,
        infra::{mail::Outbox, Memory},
    };

    use crate::{Context, Service};

    /// Creates a new empty [`Service`].
    pub(crate) fn service() -> Service {
        Service::new(
            service::Config::from_secret(
                b"test-secret",
                Duration::from_secs(60),
            ),
            Memory::default(),
            Outbox::default(),
        )
    }

    /// Creates a new [`form::account::Account`] of a person with the
    /// provided `last_name`.
    pub(crate) fn account(last_name: &str) -> form::account::Account {
        form::account::Account {
            personal_number: Some(format!("19800101-{last_name}")),
            first_name: None,
            last_name: Some(last_name.to_owned()),
            email: Some(format!("{}@example.se", last_name.to_lowercase())),
            phone_number: Some("070-123 45 67".to_owned()),
            phone_number2: None,
        }
    }

    /// Creates a new [`user::User`] with the provided `last_name` and
    /// [`Role`], optionally [`Link`]ed.
    pub(crate) async fn user(
        service: &Service,
        last_name: &str,
        role: Role,
        link: Option<Link>,
    ) -> user::User {
        service
            .execute(command::CreateAccount {
                form: account(last_name),
                role,
                link,
            })
            .await
            .unwrap()
    }

    /// Creates a new [`Context`] authorized as the provided [`user::User`].
    pub(crate) fn context_of(service: &Service, user: &user::User) -> Context {
        Context::authorized(
            service.clone(),
            Some(Session {
                user_id: user.id,
                role: user.role,
                expires_at: DateTime::now().coerce(),
            }),
        )
    }
}
