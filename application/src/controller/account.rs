//! Controller of the current [`User`]'s account.

use axum::{
    routing::{get, post},
    Form, Router,
};
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{
        user::{self, session, Session},
        User,
    },
    form,
};

use crate::{
    controller::users::UserError, define_error, outcome::rerender, AsError,
    Context, Error, Outcome, Redirect,
};

/// Route name of this controller.
pub const NAME: &str = "account";

/// Builds the [`Router`] of this controller.
pub(crate) fn routes() -> Router {
    Router::new()
        .route("/account/login", post(login))
        .route("/account/register", post(register))
        .route("/account/password", post(change_password))
        .route("/account/me", get(me))
}

/// Submitted login form.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Login {
    /// Email address of the [`User`].
    pub email: String,

    /// Password of the [`User`].
    pub password: String,
}

/// Submitted password changing form.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PasswordChange {
    /// Current password of the [`User`].
    pub old_password: String,

    /// Chosen new password.
    pub new_password: String,
}

/// Session issued on a successful login.
#[derive(Clone, Debug, Serialize)]
pub struct SignedIn {
    /// Bearer token authorizing further requests.
    pub token: String,

    /// [`User`] who logged in.
    pub user: User,

    /// When the [`SignedIn::token`] expires.
    pub expires_at: session::ExpirationDateTime,
}

/// Model of the registration view re-rendered on failure.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Registering {
    /// Email address the registration code was sent to.
    pub email: Option<String>,
}

/// Logs a [`User`] in with the email and password.
///
/// # Errors
///
/// If the credentials are wrong, or the [`User`] hasn't completed the
/// registration yet.
#[tracing::instrument(skip_all, fields(http.action = "Account/Login"))]
pub async fn login(
    ctx: Context,
    Form(form): Form<Login>,
) -> Result<Outcome<SignedIn>, Error> {
    let (Some(email), Some(password)) = (
        user::Email::new(form.email),
        user::Password::new(form.password),
    ) else {
        return Err(AccountError::WrongCredentials.into());
    };

    let command::create_user_session::Output {
        token,
        user,
        expires_at,
    } = ctx
        .service()
        .execute(command::CreateUserSession::ByCredentials {
            email,
            password: SecretBox::new(Box::new(password)),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Outcome::Json(SignedIn {
        token: token.as_ref().to_owned(),
        user,
        expires_at,
    }))
}

/// Completes the registration of a [`User`] with the mailed code.
///
/// # Errors
///
/// If the email and the code don't match any unregistered [`User`].
#[tracing::instrument(skip_all, fields(http.action = "Account/Register"))]
pub async fn register(
    ctx: Context,
    Form(form): Form<form::account::Registration>,
) -> Result<Outcome<Registering>, Error> {
    let model = Registering {
        email: form.email.clone(),
    };

    match ctx
        .service()
        .execute(command::CompleteRegistration { form })
        .await
    {
        Ok(_) => Ok(Redirect::to(NAME, "login").into()),
        Err(e) => rerender("Account/Register", model, e),
    }
}

/// Changes the password of the current [`User`].
///
/// # Errors
///
/// If the request is not authorized, the old password is wrong, or the new
/// one is too short.
#[tracing::instrument(skip_all, fields(http.action = "Account/Password"))]
pub async fn change_password(
    ctx: Context,
    Form(change): Form<PasswordChange>,
) -> Result<Outcome<Session>, Error> {
    let session = ctx.current_session().await?;

    let old_password = user::Password::new(change.old_password)
        .ok_or(AccountError::WrongPassword)?;
    let new_password =
        user::Password::new(change.new_password).ok_or_else(|| {
            Error::invalid(&form::Errors::single(
                "NewPassword",
                format!(
                    "Lösenord fältet måste innehålla minst {} tecken!",
                    user::Password::MIN_LEN,
                ),
            ))
        })?;

    drop(
        ctx.service()
            .execute(command::UpdateUserPassword {
                user_id: session.user_id,
                new_password: SecretBox::new(Box::new(new_password)),
                old_password: SecretBox::new(Box::new(old_password)),
            })
            .await
            .map_err(AsError::into_error)?,
    );

    Ok(Outcome::Json(session))
}

/// Returns the [`Session`] the request is authorized with.
///
/// # Errors
///
/// If the request is not authorized.
#[tracing::instrument(skip_all, fields(http.action = "Account/Me"))]
pub async fn me(ctx: Context) -> Result<Outcome<Session>, Error> {
    Ok(Outcome::Json(ctx.current_session().await?))
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::WrongCredentials => {
                Some(AccountError::WrongCredentials.into())
            }
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
            Self::JsonWebTokenEncodeError(_) => None,
        }
    }
}

impl AsError for command::complete_registration::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
            Self::WrongRegistrationCode => {
                Some(AccountError::WrongRegistrationCode.into())
            }
            Self::AlreadyRegistered => {
                Some(AccountError::AlreadyRegistered.into())
            }
            Self::PasswordHash(_) => None,
        }
    }
}

impl AsError for command::update_user_password::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
            Self::WrongPassword => Some(AccountError::WrongPassword.into()),
            Self::PasswordHash(_) => None,
        }
    }
}

define_error! {
    enum AccountError {
        #[code = "WRONG_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Wrong email or password"]
        WrongCredentials,

        #[code = "WRONG_REGISTRATION_CODE"]
        #[status = BAD_REQUEST]
        #[message = "Wrong email or registration code"]
        WrongRegistrationCode,

        #[code = "ALREADY_REGISTERED"]
        #[status = CONFLICT]
        #[message = "Registration is completed already"]
        AlreadyRegistered,

        #[code = "WRONG_PASSWORD"]
        #[status = BAD_REQUEST]
        #[message = "Wrong old password"]
        WrongPassword,
    }
}

#[cfg(test)]
mod spec {
    use axum::Form;
    use service::{
        domain::{user::Role, User},
        form,
    };

    use crate::{
        test::{context_of, service, user},
        Redirect, Service,
    };

    use super::{change_password, login, register, Login, PasswordChange};

    const PASSWORD: &str = "correct horse";

    async fn registered(service: &Service, last_name: &str) -> User {
        let tenant = user(service, last_name, Role::User, None).await;
        let code = service
            .mailer()
            .registrations()
            .await
            .into_iter()
            .find(|m| m.to == tenant.email)
            .unwrap()
            .code;

        let outcome = register(
            context_of(service, &tenant),
            Form(form::account::Registration {
                email: Some(tenant.email.to_string()),
                registration_code: Some(code.as_ref().to_lowercase()),
                password: Some(PASSWORD.into()),
                confirm_password: Some(PASSWORD.into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(outcome.redirect(), Some(&Redirect::to("account", "login")));

        tenant
    }

    fn credentials(user: &User, password: &str) -> Login {
        Login {
            email: user.email.to_string(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn logs_in_after_registration() {
        let service = service();
        let tenant = registered(&service, "Lind").await;

        let outcome = login(
            context_of(&service, &tenant),
            Form(credentials(&tenant, PASSWORD)),
        )
        .await
        .unwrap();

        let crate::Outcome::Json(signed_in) = outcome else {
            panic!("expected JSON outcome");
        };
        assert_eq!(signed_in.user.last_name.unwrap().as_ref(), "Lind");
        assert!(!signed_in.token.is_empty());
    }

    #[tokio::test]
    async fn unregistered_cannot_log_in() {
        let service = service();
        let tenant = user(&service, "Lind", Role::User, None).await;

        let err = login(
            context_of(&service, &tenant),
            Form(credentials(&tenant, PASSWORD)),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, "WRONG_CREDENTIALS");
        assert_eq!(err.status_code, http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_rerenders_mismatched_passwords() {
        let service = service();
        let tenant = user(&service, "Lind", Role::User, None).await;

        let outcome = register(
            context_of(&service, &tenant),
            Form(form::account::Registration {
                email: Some(tenant.email.to_string()),
                registration_code: Some("whatever".into()),
                password: Some(PASSWORD.into()),
                confirm_password: Some("another horse".into()),
            }),
        )
        .await
        .unwrap();

        let view = outcome.view().unwrap();
        assert!(view.errors.get("ConfirmPassword").is_some());
        assert_eq!(view.model.email, Some(tenant.email.to_string()));
    }

    #[tokio::test]
    async fn logs_in_with_changed_password() {
        let service = service();
        let tenant = registered(&service, "Lind").await;

        _ = change_password(
            context_of(&service, &tenant),
            Form(PasswordChange {
                old_password: PASSWORD.into(),
                new_password: "better horse".into(),
            }),
        )
        .await
        .unwrap();

        let old = login(
            context_of(&service, &tenant),
            Form(credentials(&tenant, PASSWORD)),
        )
        .await
        .unwrap_err();
        let new = login(
            context_of(&service, &tenant),
            Form(credentials(&tenant, "better horse")),
        )
        .await;

        assert_eq!(old.code, "WRONG_CREDENTIALS");
        assert!(new.is_ok());
    }

    #[tokio::test]
    async fn wrong_old_password_is_rejected() {
        let service = service();
        let tenant = user(&service, "Lind", Role::User, None).await;

        let err = change_password(
            context_of(&service, &tenant),
            Form(PasswordChange {
                old_password: "wrong horse".into(),
                new_password: "better horse".into(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, "WRONG_PASSWORD");
    }

    #[tokio::test]
    async fn short_new_password_is_invalid() {
        let service = service();
        let tenant = user(&service, "Lind", Role::User, None).await;

        let err = change_password(
            context_of(&service, &tenant),
            Form(PasswordChange {
                old_password: PASSWORD.into(),
                new_password: "short".into(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, "INVALID_FORM");
    }
}
