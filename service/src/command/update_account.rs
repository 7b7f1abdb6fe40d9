//! [`Command`] for updating the profile of an existing [`User`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, Role},
        User,
    },
    form,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating the profile of an existing [`User`].
#[derive(Clone, Debug)]
pub struct UpdateAccount {
    /// ID of the [`User`] to update.
    pub user_id: user::Id,

    /// ID of the [`User`] performing the update.
    pub editor_id: user::Id,

    /// Submitted [`form::account::Account`].
    pub form: form::account::Account,
}

/// Output of [`UpdateAccount`] [`Command`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// Updated [`User`].
    pub user: User,

    /// Status message to show to the editor.
    pub message: String,
}

impl Output {
    /// Returns the status message about updating the `user`'s profile by the
    /// [`User`] with the provided `editor_id`.
    fn message(user: &User, editor_id: user::Id) -> String {
        if user.id == editor_id {
            return "Din profil uppdateras!".into();
        }
        let name = user.addressed_name().map_or_else(
            || user.personal_number.to_string(),
            ToString::to_string,
        );
        format!("{name}s profil uppdateras!")
    }
}

impl<Db, Ml> Command<UpdateAccount> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, (user::PersonalNumber, Role)>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
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
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateAccount) -> Result<Self::Ok, Self::Err> {
        use form::account::Account as F;
        use ExecutionError as E;

        let UpdateAccount {
            user_id,
            editor_id,
            form,
        } = cmd;

        let profile = form.validate().map_err(tracerr::from_and_wrap!(=> E))?;

        let editor = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(editor_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::EditorNotExists(editor_id))
            .map_err(tracerr::wrap!())?;
        let stored = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        if profile.personal_number != stored.personal_number {
            let other = self
                .database()
                .execute(Select(By::<Option<User>, _>::new((
                    profile.personal_number.clone(),
                    stored.role,
                ))))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if other.is_some_and(|u| u.id != user_id) {
                return Err(tracerr::new!(E::Invalid(form::Errors::single(
                    F::PERSONAL_NUMBER,
                    F::PERSONAL_NUMBER_TAKEN,
                ))));
            }
        }
        if profile.email.normalized() != stored.email.normalized() {
            let other = self
                .database()
                .execute(Select(By::<Option<User>, _>::new(
                    profile.email.clone(),
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if other.is_some_and(|u| u.id != user_id) {
                return Err(tracerr::new!(E::Invalid(form::Errors::single(
                    F::EMAIL,
                    F::EMAIL_TAKEN,
                ))));
            }
        }

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
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;
        profile.apply_to(&mut user);

        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(Output {
            message: Output::message(&user, editor.id),
            user,
        })
    }
}

/// Error of [`UpdateAccount`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Submitted [`form::account::Account`] is invalid, or its personal
    /// number or email is taken by another [`User`].
    #[display("Invalid account: {_0}")]
    Invalid(#[error(not(source))] form::Errors),

    /// [`User`] to update does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`User`] performing the update does not exist.
    #[display("Editing `User(id: {_0})` does not exist")]
    #[from(ignore)]
    EditorNotExists(#[error(not(source))] user::Id),
}
