//! Infrastructure layer.

pub mod database;
pub mod export;
pub mod mail;

#[cfg(any(test, feature = "memory"))]
pub use self::database::Memory;
pub use self::{database::Database, mail::Mailer};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
