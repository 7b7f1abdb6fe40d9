//! [`Context`]-related definitions.

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    command::{self, Command as _},
    domain::{
        address,
        user::{self, session, Role, Session},
    },
    query, Query as _,
};
use tokio::sync::OnceCell;
use tracing as log;

use crate::{define_error, AsError, Error, Service};

/// Request context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// Parts of the HTTP request.
    parts: http::request::Parts,

    /// Current [`Session`].
    current_session: OnceCell<Session>,

    /// Last authentication [`Error`].
    auth_error: OnceCell<Error>,
}

impl Context {
    /// Creates a new [`Context`] of the provided HTTP request `parts`.
    #[must_use]
    pub fn new(service: Service, parts: http::request::Parts) -> Self {
        Self {
            service,
            parts,
            current_session: OnceCell::new(),
            auth_error: OnceCell::new(),
        }
    }

    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Tries to get the current [`Session`] for this [`Context`].
    ///
    /// # Errors
    ///
    /// Errors if the provided authentication token is invalid.
    pub async fn try_current_session(&self) -> Result<Option<Session>, Error> {
        self.current_session().await.map(Some).or_else(|e| {
            if e.code == Error::from(AuthError::AuthorizationRequired).code {
                Ok(None)
            } else {
                Err(e)
            }
        })
    }

    /// Returns the current [`Session`] for this [`Context`].
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the provided authentication token is invalid.
    pub async fn current_session(&self) -> Result<Session, Error> {
        self.current_session
            .get_or_try_init(|| async {
                match self
                    .auth_error
                    .get_or_try_init(|| async {
                        match self.do_authentication().await {
                            Ok(s) => Err(s),
                            Err(e) => Ok(e),
                        }
                    })
                    .await
                {
                    Ok(e) => Err(e),
                    Err(s) => Ok(s),
                }
            })
            .await
            .copied()
            .map_err(Clone::clone)
    }

    /// Returns the current [`Session`] if its [`Role`] is one of the
    /// `allowed` ones.
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the current [`Session`] has a [`Role`] not listed in `allowed`.
    pub async fn require(&self, allowed: &[Role]) -> Result<Session, Error> {
        let session = self.current_session().await?;
        if allowed.contains(&session.role) {
            Ok(session)
        } else {
            log::debug!(
                user_id = %session.user_id,
                role = %session.role,
                "role is not allowed",
            );
            Err(AuthError::Forbidden.into())
        }
    }

    /// Returns the current [`Session`] if it belongs to the [`User`] with the
    /// provided `owner` ID, or has a [`Role`] listed in `allowed`.
    ///
    /// [`User`]: service::domain::User
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the current [`Session`] is neither the `owner`'s nor `allowed`.
    pub async fn require_owner_or(
        &self,
        owner: user::Id,
        allowed: &[Role],
    ) -> Result<Session, Error> {
        let session = self.current_session().await?;
        if session.user_id == owner || allowed.contains(&session.role) {
            Ok(session)
        } else {
            Err(AuthError::Forbidden.into())
        }
    }

    /// Returns the current [`Session`] of an administrator, or of a host
    /// hosting the [`Address`] with the provided `address_id`.
    ///
    /// [`Address`]: service::domain::Address
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the current [`Session`] is neither an administrator's nor a host's
    ///   of the [`Address`].
    pub async fn require_host_of(
        &self,
        address_id: address::Id,
    ) -> Result<Session, Error> {
        let session = self.require(&[Role::Admin, Role::Host]).await?;
        if session.role == Role::Admin
            || self.hosted_by(session.user_id).await?.contains(&address_id)
        {
            Ok(session)
        } else {
            log::debug!(
                user_id = %session.user_id,
                address_id = %address_id,
                "address is not hosted",
            );
            Err(AuthError::Forbidden.into())
        }
    }

    /// Returns IDs of the [`Address`]es hosted by the [`User`] with the
    /// provided `host_id`.
    ///
    /// [`Address`]: service::domain::Address
    /// [`User`]: service::domain::User
    ///
    /// # Errors
    ///
    /// If the [`Address`]es cannot be loaded.
    pub async fn hosted_by(
        &self,
        host_id: user::Id,
    ) -> Result<Vec<address::Id>, Error> {
        Ok(self
            .service
            .execute(query::addresses::ByHost::by(host_id))
            .await
            .map_err(AsError::into_error)?
            .into_iter()
            .map(|a| a.id)
            .collect())
    }

    /// Rejects the current [`Session`] as not allowed.
    #[must_use]
    pub fn forbidden() -> Error {
        AuthError::Forbidden.into()
    }

    /// Performs the [`Session`] authentication.
    ///
    /// # Errors
    ///
    /// Errors if the provided authentication token is invalid.
    async fn do_authentication(&self) -> Result<Session, Error> {
        let res = self
            .parts
            .clone()
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await;
        match res {
            Ok(TypedHeader(Authorization(bearer))) => {
                #[expect(unsafe_code, reason = "specified in correct header")]
                let token = unsafe {
                    session::Token::new_unchecked(bearer.token().to_owned())
                };
                self.service
                    .execute(command::AuthorizeUserSession { token })
                    .await
                    .map_err(AsError::into_error)
            }
            Err(e) => {
                if e.is_missing() {
                    Err(AuthError::AuthorizationRequired.into())
                } else {
                    Err(e.into_error())
                }
            }
        }
    }
}

#[cfg(test)]
impl Context {
    /// Creates a new [`Context`] without any request behind it, already
    /// authorized with the provided [`Session`] (if any).
    pub(crate) fn authorized(
        service: Service,
        session: Option<Session>,
    ) -> Self {
        let (parts, ()) = http::Request::new(()).into_parts();
        Self {
            service,
            parts,
            current_session: OnceCell::new_with(session),
            auth_error: OnceCell::new_with(Some(
                AuthError::AuthorizationRequired.into(),
            )),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;

        Ok(Self::new(service, parts.clone()))
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(_) | Self::UserNotExists(_) => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "FORBIDDEN"]
        #[status = FORBIDDEN]
        #[message = "Not allowed for the current role"]
        Forbidden,
    }
}
