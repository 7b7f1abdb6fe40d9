//! [`Comment`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::{ErrorReport, User};
use crate::domain::{error_report, user};

/// Comment left on an [`ErrorReport`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Comment {
    /// ID of this [`Comment`].
    pub id: Id,

    /// ID of the commented [`ErrorReport`].
    pub report_id: error_report::Id,

    /// ID of the commenting [`User`].
    pub user_id: user::Id,

    /// [`Text`] of this [`Comment`].
    pub text: Text,

    /// [`DateTime`] when this [`Comment`] was created.
    pub created_at: CreationDateTime,
}

/// [`Comment`] not stored yet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Draft {
    /// ID of the commented [`ErrorReport`].
    pub report_id: error_report::Id,

    /// ID of the commenting [`User`].
    pub user_id: user::Id,

    /// [`Text`] of the new [`Comment`].
    pub text: Text,

    /// [`DateTime`] when the new [`Comment`] is created.
    pub created_at: CreationDateTime,
}

impl Comment {
    /// Creates a new [`Comment`] out of the stored [`Draft`].
    #[must_use]
    pub fn from_draft(id: Id, draft: Draft) -> Self {
        let Draft {
            report_id,
            user_id,
            text,
            created_at,
        } = draft;
        Self {
            id,
            report_id,
            user_id,
            text,
            created_at,
        }
    }
}

/// ID of a [`Comment`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Id(i32);

define_text! {
    #[doc = "Text of a [`Comment`]."]
    Text(max = 2048)
}

/// [`DateTime`] when a [`Comment`] was created.
pub type CreationDateTime = DateTimeOf<(Comment, unit::Creation)>;
