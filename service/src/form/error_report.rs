//! [`ErrorReport`] forms.
//!
//! [`ErrorReport`]: crate::domain::ErrorReport

use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::domain::error_report::{self, comment, Priority};

use super::{required_text, Errors};

/// Submitted form filing an [`ErrorReport`].
///
/// [`ErrorReport`]: crate::domain::ErrorReport
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, SmartDefault)]
#[serde(default, rename_all = "PascalCase")]
pub struct ErrorReport {
    /// Short subject.
    pub subject: Option<String>,

    /// Detailed description.
    pub description: Option<String>,

    /// Initial priority.
    #[default(Priority::Medium)]
    pub priority: Priority,
}

impl ErrorReport {
    /// Validates this [`ErrorReport`] form.
    ///
    /// # Errors
    ///
    /// With the [`Errors`] of every failed check, in the order of the fields.
    pub fn validate(
        &self,
    ) -> Result<(error_report::Subject, error_report::Description), Errors>
    {
        let mut errors = Errors::default();

        let subject = required_text(
            &mut errors,
            "Subject",
            "Ämne",
            error_report::Subject::MAX_LEN,
            self.subject.as_deref(),
            error_report::Subject::new,
        );
        let description = required_text(
            &mut errors,
            "Description",
            "Beskrivning",
            error_report::Description::MAX_LEN,
            self.description.as_deref(),
            error_report::Description::new,
        );

        match (subject, description) {
            (Some(s), Some(d)) => Ok((s, d)),
            _ => Err(errors),
        }
    }
}

/// Submitted form commenting an [`ErrorReport`].
///
/// [`ErrorReport`]: crate::domain::ErrorReport
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Comment {
    /// Text of the comment.
    pub text: Option<String>,
}

impl Comment {
    /// Validates this [`Comment`] form.
    ///
    /// # Errors
    ///
    /// If the text is missing or too long.
    pub fn validate(&self) -> Result<comment::Text, Errors> {
        let mut errors = Errors::default();
        required_text(
            &mut errors,
            "Text",
            "Kommentar",
            comment::Text::MAX_LEN,
            self.text.as_deref(),
            comment::Text::new,
        )
        .ok_or(errors)
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::error_report::Priority;

    use super::{Comment, ErrorReport};

    #[test]
    fn defaults_to_medium_priority() {
        assert_eq!(ErrorReport::default().priority, Priority::Medium);
    }

    #[test]
    fn requires_subject_and_description() {
        let errors = ErrorReport::default().validate().unwrap_err();

        assert_eq!(
            errors.iter().map(|e| e.field).collect::<Vec<_>>(),
            ["Subject", "Description"],
        );
    }

    #[test]
    fn comment_requires_text() {
        assert!(Comment::default().validate().is_err());
        assert_eq!(
            Comment {
                text: Some(" Fixed. ".into()),
            }
            .validate()
            .unwrap()
            .as_ref(),
            "Fixed.",
        );
    }
}
