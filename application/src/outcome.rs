//! [`Outcome`]s of controller actions.

use std::fmt;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use service::form;
use tracerr::Traced;

use crate::{AsError, Error};

/// Result of a controller action.
#[derive(Debug)]
pub enum Outcome<M> {
    /// [`View`] rendered with a typed model.
    View(View<M>),

    /// [`Redirect`] to another action.
    Redirect(Redirect),

    /// Plain data serialized as the response body.
    Json(M),

    /// [`File`] download.
    File(File),
}

impl<M> Outcome<M> {
    /// Returns the [`View`] of this [`Outcome`], if any.
    #[must_use]
    pub fn view(&self) -> Option<&View<M>> {
        match self {
            Self::View(v) => Some(v),
            Self::Redirect(_) | Self::Json(_) | Self::File(_) => None,
        }
    }

    /// Returns the [`Redirect`] of this [`Outcome`], if any.
    #[must_use]
    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            Self::Redirect(r) => Some(r),
            Self::View(_) | Self::Json(_) | Self::File(_) => None,
        }
    }
}

impl<M> From<View<M>> for Outcome<M> {
    fn from(view: View<M>) -> Self {
        Self::View(view)
    }
}

impl<M> From<Redirect> for Outcome<M> {
    fn from(redirect: Redirect) -> Self {
        Self::Redirect(redirect)
    }
}

impl<M> From<File> for Outcome<M> {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}

impl<M: Serialize> IntoResponse for Outcome<M> {
    fn into_response(self) -> Response {
        match self {
            Self::View(v) => Json(v).into_response(),
            Self::Redirect(r) => r.into_response(),
            Self::Json(m) => Json(m).into_response(),
            Self::File(f) => f.into_response(),
        }
    }
}

/// Named view along with its model and the validation errors to show.
#[derive(Debug, Serialize)]
pub struct View<M> {
    /// Name of this [`View`], in the `Controller/Action` form.
    pub name: &'static str,

    /// Model of this [`View`].
    pub model: M,

    /// Validation [`form::Errors`] of the submitted model.
    pub errors: form::Errors,
}

impl<M> View<M> {
    /// Creates a new [`View`] without any errors.
    #[must_use]
    pub fn new(name: &'static str, model: M) -> Self {
        Self {
            name,
            model,
            errors: form::Errors::default(),
        }
    }

    /// Attaches the provided validation `errors` to this [`View`].
    #[must_use]
    pub fn with_errors(mut self, errors: form::Errors) -> Self {
        self.errors = errors;
        self
    }
}

/// Redirect to an action of a controller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redirect {
    /// Controller to redirect to.
    pub controller: &'static str,

    /// Action of the [`Redirect::controller`].
    pub action: &'static str,

    /// ID route value, if any.
    pub id: Option<String>,
}

impl Redirect {
    /// Creates a new [`Redirect`] to the `action` of the `controller`.
    #[must_use]
    pub fn to(controller: &'static str, action: &'static str) -> Self {
        Self {
            controller,
            action,
            id: None,
        }
    }

    /// Attaches the provided `id` route value to this [`Redirect`].
    #[must_use]
    pub fn with_id(mut self, id: impl fmt::Display) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Returns the location this [`Redirect`] points to.
    #[must_use]
    pub fn location(&self) -> String {
        let Self {
            controller,
            action,
            id,
        } = self;
        match id {
            Some(id) => format!("/{controller}/{action}/{id}"),
            None => format!("/{controller}/{action}"),
        }
    }
}

impl IntoResponse for Redirect {
    fn into_response(self) -> Response {
        axum::response::Redirect::to(&self.location()).into_response()
    }
}

/// File attachment download.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct File {
    /// Name the downloaded file is saved under.
    pub name: String,

    /// Contents of this [`File`].
    pub bytes: Vec<u8>,
}

impl IntoResponse for File {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.name);
        (
            [
                (http::header::CONTENT_TYPE, "application/zip".to_owned()),
                (http::header::CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}

/// Validation failure of a submitted form.
pub trait Invalid {
    /// Returns the [`form::Errors`] if this is a validation failure.
    fn form_errors(&self) -> Option<&form::Errors>;
}

/// Re-renders the `view` with the submitted `model` if the `err`or is a
/// validation failure, or converts the `err`or into an [`Error`] otherwise.
///
/// # Errors
///
/// If the `err`or is not a validation failure.
pub fn rerender<M, E>(
    view: &'static str,
    model: M,
    err: Traced<E>,
) -> Result<Outcome<M>, Error>
where
    E: AsError + Invalid + fmt::Display,
{
    match err.as_ref().form_errors() {
        Some(errors) => {
            Ok(View::new(view, model).with_errors(errors.clone()).into())
        }
        None => Err(err.into_error()),
    }
}

/// Implements [`Invalid`] for the provided errors having an `Invalid`
/// variant.
macro_rules! impl_invalid {
    ($($ty:path),* $(,)?) => {$(
        impl Invalid for $ty {
            fn form_errors(&self) -> Option<&form::Errors> {
                if let Self::Invalid(errors) = self {
                    Some(errors)
                } else {
                    None
                }
            }
        }
    )*};
}

impl_invalid! {
    service::command::comment_error_report::ExecutionError,
    service::command::complete_registration::ExecutionError,
    service::command::create_account::ExecutionError,
    service::command::create_address::ExecutionError,
    service::command::create_error_report::ExecutionError,
    service::command::create_flat::ExecutionError,
    service::command::update_account::ExecutionError,
    service::command::update_address::ExecutionError,
    service::command::update_flat::ExecutionError,
}
