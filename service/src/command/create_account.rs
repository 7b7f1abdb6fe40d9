//! [`Command`] for creating a new [`User`] account.

use common::{
    operations::{By, Commit, Deliver, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        address, flat,
        user::{self, Role},
        Address, AddressHost, Flat, Parameter, User,
    },
    form,
    infra::{database, mail, Database, Mailer},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`] account.
///
/// The new [`User`] receives a [`user::RegistrationCode`] by mail and sets
/// the password when completing the registration.
#[derive(Clone, Debug)]
pub struct CreateAccount {
    /// Submitted [`form::account::Account`].
    pub form: form::account::Account,

    /// [`Role`] of the new [`User`].
    pub role: Role,

    /// Optional [`Link`] of the new [`User`].
    pub link: Option<Link>,
}

/// Entity a new [`User`] is linked to right away.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Link {
    /// Tenant living in the [`Flat`].
    Flat(flat::Id),

    /// Host of the [`Address`].
    Address(address::Id),
}

impl<Db, Ml> Command<CreateAccount> for Service<Db, Ml>
where
    Db: Database<
            Select<By<Option<User>, (user::PersonalNumber, Role)>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Flat>, flat::Id>>,
            Ok = Option<Flat>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Address>, address::Id>>,
            Ok = Option<Address>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Insert<Parameter>, Err = Traced<database::Error>>
        + Database<Insert<AddressHost>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Ml: Mailer<Deliver<mail::Registration>, Err = Traced<mail::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateAccount) -> Result<Self::Ok, Self::Err> {
        use form::account::Account as F;
        use ExecutionError as E;

        let CreateAccount { form, role, link } = cmd;

        match (link, role) {
            (None, _)
            | (Some(Link::Flat(_)), Role::User)
            | (Some(Link::Address(_)), Role::Host) => {}
            (Some(link), role) => {
                return Err(tracerr::new!(E::LinkMismatch { link, role }));
            }
        }

        let profile = form.validate().map_err(tracerr::from_and_wrap!(=> E))?;

        let same_number = self
            .database()
            .execute(Select(By::new((profile.personal_number.clone(), role))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if same_number.is_some() {
            return Err(tracerr::new!(E::Invalid(form::Errors::single(
                F::PERSONAL_NUMBER,
                F::PERSONAL_NUMBER_TAKEN,
            ))));
        }

        let same_email = self
            .database()
            .execute(Select(By::new(profile.email.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if same_email.is_some() {
            return Err(tracerr::new!(E::Invalid(form::Errors::single(
                F::EMAIL,
                F::EMAIL_TAKEN,
            ))));
        }

        let code = user::RegistrationCode::generate();
        let password_hash =
            user::PasswordHash::new(&user::Password::generate())
                .map_err(tracerr::from_and_wrap!(=> E))?;

        let user = User {
            id: user::Id::new(),
            role,
            personal_number: profile.personal_number,
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            phone_number: profile.phone_number,
            phone_number2: profile.phone_number2,
            password_hash,
            registration_code: Some(code.clone()),
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        match link {
            Some(Link::Flat(flat_id)) => drop(
                tx.execute(Select(By::<Option<Flat>, _>::new(flat_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::FlatNotExists(flat_id))
                    .map_err(tracerr::wrap!())?,
            ),
            Some(Link::Address(address_id)) => drop(
                tx.execute(Select(By::<Option<Address>, _>::new(address_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::AddressNotExists(address_id))
                    .map_err(tracerr::wrap!())?,
            ),
            None => {}
        }

        tx.execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        match link {
            Some(Link::Flat(flat_id)) => tx
                .execute(Insert(Parameter {
                    user_id: user.id,
                    flat_id,
                    is_email_visible: false,
                    is_phone_number_visible: false,
                    can_be_contacted: false,
                }))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?,
            Some(Link::Address(address_id)) => tx
                .execute(Insert(AddressHost {
                    address_id,
                    user_id: user.id,
                }))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?,
            None => {}
        }
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(user_id = %user.id, %role, "account created");

        if let Err(e) = self
            .mailer()
            .execute(Deliver(mail::Registration {
                to: user.email.clone(),
                name: user.addressed_name().cloned(),
                code,
            }))
            .await
        {
            log::warn!(user_id = %user.id, "failed to mail registration: {e}");
        }

        Ok(user)
    }
}

/// Error of [`CreateAccount`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Submitted [`form::account::Account`] is invalid, or its personal
    /// number or email is already taken.
    #[display("Invalid account: {_0}")]
    Invalid(#[error(not(source))] form::Errors),

    /// [`Link`] doesn't suit the [`Role`] of the new [`User`].
    #[display("`{role}` account cannot be linked to `{link:?}`")]
    #[from(ignore)]
    LinkMismatch {
        /// Requested [`Link`].
        link: Link,

        /// [`Role`] of the new [`User`].
        role: Role,
    },

    /// [`Flat`] with the provided ID does not exist.
    #[display("`Flat(id: {_0})` does not exist")]
    #[from(ignore)]
    FlatNotExists(#[error(not(source))] flat::Id),

    /// [`Address`] with the provided ID does not exist.
    #[display("`Address(id: {_0})` does not exist")]
    #[from(ignore)]
    AddressNotExists(#[error(not(source))] address::Id),

    /// [`user::Password`] hashing failed.
    #[display("Failed to hash a password: {_0}")]
    PasswordHash(argon2::password_hash::Error),
}
