//! [`ErrorReport`] definitions.

pub mod comment;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::{Flat, User};
use crate::domain::{flat, user};

pub use self::comment::Comment;

/// Error (malfunction) reported by a tenant about a [`Flat`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ErrorReport {
    /// ID of this [`ErrorReport`].
    pub id: Id,

    /// ID of the [`Flat`] this [`ErrorReport`] is about.
    pub flat_id: flat::Id,

    /// ID of the [`User`] who submitted this [`ErrorReport`].
    pub user_id: user::Id,

    /// [`Subject`] of this [`ErrorReport`].
    pub subject: Subject,

    /// [`Description`] of this [`ErrorReport`].
    pub description: Description,

    /// [`DateTime`] when this [`ErrorReport`] was submitted.
    pub submitted_at: SubmissionDateTime,

    /// [`DateTime`] when this [`ErrorReport`] was first seen by a host or an
    /// administrator, if it was.
    pub seen_at: Option<SightingDateTime>,

    /// Current [`Status`] of this [`ErrorReport`].
    pub status: Status,

    /// Current [`Priority`] of this [`ErrorReport`].
    pub priority: Priority,
}

impl ErrorReport {
    /// Creates a new [`ErrorReport`] out of the stored [`Draft`].
    #[must_use]
    pub fn from_draft(id: Id, draft: Draft) -> Self {
        let Draft {
            flat_id,
            user_id,
            subject,
            description,
            submitted_at,
            priority,
        } = draft;
        Self {
            id,
            flat_id,
            user_id,
            subject,
            description,
            submitted_at,
            seen_at: None,
            status: Status::Registered,
            priority,
        }
    }
}

/// [`ErrorReport`] not stored yet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Draft {
    /// ID of the [`Flat`] the new [`ErrorReport`] is about.
    pub flat_id: flat::Id,

    /// ID of the submitting [`User`].
    pub user_id: user::Id,

    /// [`Subject`] of the new [`ErrorReport`].
    pub subject: Subject,

    /// [`Description`] of the new [`ErrorReport`].
    pub description: Description,

    /// [`DateTime`] when the new [`ErrorReport`] is submitted.
    pub submitted_at: SubmissionDateTime,

    /// Initial [`Priority`] of the new [`ErrorReport`].
    pub priority: Priority,
}

/// ID of an [`ErrorReport`].
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
    #[doc = "Subject of an [`ErrorReport`]."]
    Subject(max = 128)
}

define_text! {
    #[doc = "Description of an [`ErrorReport`]."]
    Description(max = 4096)
}

define_kind! {
    #[doc = "Handling status of an [`ErrorReport`]."]
    enum Status {
        #[doc = "Submitted and not handled yet."]
        Registered = 1,

        #[doc = "Being handled."]
        InProgress = 2,

        #[doc = "Handled."]
        Finished = 3,

        #[doc = "Not worth handling."]
        Irrelevant = 4,
    }
}

define_kind! {
    #[doc = "Urgency of an [`ErrorReport`]."]
    enum Priority {
        #[doc = "May wait."]
        Low = 1,

        #[doc = "Should be handled soon."]
        Medium = 2,

        #[doc = "Must be handled immediately."]
        High = 3,
    }
}

/// [`DateTime`] when an [`ErrorReport`] was submitted.
pub type SubmissionDateTime = DateTimeOf<(ErrorReport, unit::Submission)>;

/// [`DateTime`] when an [`ErrorReport`] was first seen.
pub type SightingDateTime = DateTimeOf<(ErrorReport, unit::Sighting)>;
