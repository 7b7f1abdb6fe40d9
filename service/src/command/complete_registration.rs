//! [`Command`] for completing a [`User`] registration.

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use secrecy::ExposeSecret as _;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{user, User},
    form,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for completing a [`User`] registration: setting the chosen
/// [`user::Password`] once the mailed [`user::RegistrationCode`] is proven.
#[derive(Clone, Debug, From)]
pub struct CompleteRegistration {
    /// Submitted [`form::account::Registration`].
    pub form: form::account::Registration,
}

impl<Db, Ml> Command<CompleteRegistration> for Service<Db, Ml>
where
    Db: Database<
            Select<By<Option<User>, user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<User, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CompleteRegistration,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let credentials =
            cmd.form.validate().map_err(tracerr::from_and_wrap!(=> E))?;

        let user_id = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(
                credentials.email.clone(),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::WrongRegistrationCode)
            .map_err(tracerr::wrap!())?
            .id;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `User`.
        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::WrongRegistrationCode)
            .map_err(tracerr::wrap!())?;
        let Some(code) = user.registration_code.as_ref() else {
            return Err(tracerr::new!(E::AlreadyRegistered));
        };
        if !code.matches(&credentials.registration_code) {
            return Err(tracerr::new!(E::WrongRegistrationCode));
        }

        user.password_hash =
            user::PasswordHash::new(credentials.password.expose_secret())
                .map_err(tracerr::from_and_wrap!(=> E))?;
        user.registration_code = None;

        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(user_id = %user.id, "registration completed");

        Ok(user)
    }
}

/// Error of [`CompleteRegistration`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Submitted [`form::account::Registration`] is invalid.
    #[display("Invalid registration: {_0}")]
    Invalid(#[error(not(source))] form::Errors),

    /// Email and registration code don't match any unregistered [`User`].
    #[display("Wrong registration code")]
    WrongRegistrationCode,

    /// [`User`] has completed the registration already.
    #[display("`User` is registered already")]
    AlreadyRegistered,

    /// [`user::Password`] hashing failed.
    #[display("Failed to hash a password: {_0}")]
    PasswordHash(argon2::password_hash::Error),
}
