//! [`Command`] for authorizing a [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`].
///
/// The [`user::Role`] of the resulting [`Session`] is the one currently
/// stored, not the one the token was issued with.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db, Ml> Command<AuthorizeUserSession> for Service<Db, Ml>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let mut session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        session.role = self
            .database()
            .execute(Select(By::new(session.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::UserNotExists(session.user_id))
            .map_err(tracerr::wrap!())?
            .role;

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Delete, Insert, Update};

    use crate::{
        command::CreateUserSession,
        domain::{
            user::{session, Role},
            User,
        },
        infra::Database as _,
        read::test::with_role,
        test::service,
        Command as _,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    #[tokio::test]
    async fn rereads_role_from_store() {
        let service = service();
        let db = service.database();
        let mut user = with_role("Holm", Role::Host);
        db.execute(Insert(user.clone())).await.unwrap();
        let token = service
            .execute(CreateUserSession::ByUserId(user.id))
            .await
            .unwrap()
            .token;
        user.role = Role::Admin;
        db.execute(Update(user.clone())).await.unwrap();

        let session = service
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap();

        assert_eq!(session.user_id, user.id);
        assert_eq!(session.role, Role::Admin);
    }

    #[tokio::test]
    async fn rejects_token_of_deleted_user() {
        let service = service();
        let user = with_role("Holm", Role::Host);
        service.database().execute(Insert(user.clone())).await.unwrap();
        let token = service
            .execute(CreateUserSession::ByUserId(user.id))
            .await
            .unwrap()
            .token;
        _ = service
            .database()
            .execute(Delete(By::<User, _>::new(user.id)))
            .await
            .unwrap();

        let err = service
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UserNotExists(_)));
    }

    #[tokio::test]
    async fn rejects_garbage_token() {
        let service = service();

        // SAFETY: Invalid on purpose.
        #[expect(unsafe_code, reason = "testing")]
        let token = unsafe { session::Token::new_unchecked("garbage".into()) };

        let err = service
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }
}
