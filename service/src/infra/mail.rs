//! [`Mailer`]-related implementations.

#[cfg(any(test, feature = "memory"))]
use std::sync::Arc;

use common::operations::Deliver;
use derive_more::{Display, Error as StdError};
#[cfg(any(test, feature = "memory"))]
use tokio::sync::Mutex;
use tracerr::Traced;
use tracing as log;

use crate::domain::user::{self, RegistrationCode};
#[cfg(doc)]
use crate::domain::User;

/// Mail delivery operation.
pub use common::Handler as Mailer;

/// Mail inviting a new [`User`] to complete the registration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Registration {
    /// [`user::Email`] to deliver this [`Registration`] mail to.
    pub to: user::Email,

    /// [`user::Name`] to address the recipient by, if any.
    pub name: Option<user::Name>,

    /// [`RegistrationCode`] to complete the registration with.
    pub code: RegistrationCode,
}

/// [`Mailer`] error.
#[derive(Debug, Display, StdError)]
pub enum Error {
    /// Mail was rejected by the delivery backend.
    #[display("Mail to `{_0}` was rejected")]
    Rejected(#[error(not(source))] user::Email),
}

/// [`Mailer`] writing every mail into the log instead of sending it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Log;

impl Mailer<Deliver<Registration>> for Log {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Deliver(mail): Deliver<Registration>,
    ) -> Result<Self::Ok, Self::Err> {
        log::info!(to = %mail.to, "registration mail delivered");
        log::debug!(
            to = %mail.to,
            name = mail.name.as_ref().map(AsRef::<str>::as_ref),
            code = %mail.code,
            "registration mail content",
        );
        Ok(())
    }
}

/// [`Mailer`] collecting every delivered mail in memory.
#[cfg(any(test, feature = "memory"))]
#[derive(Clone, Debug, Default)]
pub struct Outbox(Arc<Mutex<Vec<Registration>>>);

#[cfg(any(test, feature = "memory"))]
impl Outbox {
    /// Returns all the [`Registration`] mails delivered so far.
    pub async fn registrations(&self) -> Vec<Registration> {
        self.0.lock().await.clone()
    }
}

#[cfg(any(test, feature = "memory"))]
impl Mailer<Deliver<Registration>> for Outbox {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Deliver(mail): Deliver<Registration>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0.lock().await.push(mail);
        Ok(())
    }
}
