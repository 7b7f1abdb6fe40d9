//! Validation of submitted forms.
//!
//! Every form validates into a domain value or into [`Errors`] keyed by the
//! offending form field, in the order the checks were performed.

pub mod account;
pub mod address;
pub mod error_report;
pub mod flat;

use std::{borrow::Cow, fmt};

use serde::Serialize;

/// Field-level validation error.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FieldError {
    /// Name of the offending form field.
    pub field: &'static str,

    /// Human-readable message describing the problem.
    pub message: Cow<'static, str>,
}

/// Ordered collection of [`FieldError`]s.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Errors(Vec<FieldError>);

impl Errors {
    /// Creates new [`Errors`] containing a single [`FieldError`].
    #[must_use]
    pub fn single(
        field: &'static str,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    /// Appends a new [`FieldError`].
    pub fn push(
        &mut self,
        field: &'static str,
        message: impl Into<Cow<'static, str>>,
    ) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Indicates whether there are no [`FieldError`]s.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of [`FieldError`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the [`FieldError`]s in their order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Returns the first message reported for the provided `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_ref())
    }

    /// Returns the provided `value` if there are no [`FieldError`]s, or these
    /// [`Errors`] otherwise.
    ///
    /// # Errors
    ///
    /// If there is at least one [`FieldError`].
    pub fn or_ok<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

/// Returns the message of a missing required field labeled with `label`.
fn required(label: &str) -> String {
    format!("{label} fältet är obligatoriskt!")
}

/// Returns the message of a too long field labeled with `label`.
fn too_long(label: &str, max: usize) -> String {
    format!("{label} fältet får innehålla högst {max} tecken!")
}

/// Parses a required text `input` of the provided `field` with the
/// `parse` function, reporting problems into `errors`.
fn required_text<T>(
    errors: &mut Errors,
    field: &'static str,
    label: &str,
    max: usize,
    input: Option<&str>,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        None => {
            errors.push(field, required(label));
            None
        }
        Some(s) => optional_parsed(errors, field, label, max, s, parse),
    }
}

/// Parses an optional text `input` of the provided `field` with the
/// `parse` function, reporting problems into `errors`.
///
/// Blank input is treated as absent.
fn optional_text<T>(
    errors: &mut Errors,
    field: &'static str,
    label: &str,
    max: usize,
    input: Option<&str>,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    let s = input.map(str::trim).filter(|s| !s.is_empty())?;
    optional_parsed(errors, field, label, max, s, parse)
}

/// Parses the provided non-blank `input`, reporting problems into `errors`.
fn optional_parsed<T>(
    errors: &mut Errors,
    field: &'static str,
    label: &str,
    max: usize,
    input: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    if input.chars().count() > max {
        errors.push(field, too_long(label, max));
        return None;
    }
    let parsed = parse(input);
    if parsed.is_none() {
        errors.push(field, format!("{label} fältet har ett ogiltigt värde!"));
    }
    parsed
}
