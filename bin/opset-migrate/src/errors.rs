//! Errors shown to the user of the CLI.

use std::fmt;

/// Errors displayed to the user when using the CLI
#[derive(Debug)]
pub(crate) enum DisplayedError {
    /// Errors the user can address by fixing the config, the snapshot or the arguments.
    UserError(String, Box<dyn fmt::Debug>),
    /// Internal errors encountered when servicing the user's request.
    InternalError(String, Box<dyn fmt::Debug>),
}

#[inline]
fn user_error<E>(msg: impl Into<String>) -> impl FnOnce(E) -> DisplayedError
where
    E: fmt::Debug + 'static,
{
    move |e| DisplayedError::UserError(msg.into(), Box::new(e))
}

#[inline]
fn internal_error<E>(msg: impl Into<String>) -> impl FnOnce(E) -> DisplayedError
where
    E: fmt::Debug + 'static,
{
    move |e| DisplayedError::InternalError(msg.into(), Box::new(e))
}

pub(crate) trait DisplayableError {
    type Output;
    fn user_error(self, msg: impl Into<String>) -> Result<Self::Output, DisplayedError>;
    fn internal_error(self, msg: impl Into<String>) -> Result<Self::Output, DisplayedError>;
}

impl<T, E: fmt::Debug + 'static> DisplayableError for Result<T, E> {
    type Output = T;

    #[inline]
    fn user_error(self, msg: impl Into<String>) -> Result<Self::Output, DisplayedError> {
        self.map_err(user_error(msg))
    }

    #[inline]
    fn internal_error(self, msg: impl Into<String>) -> Result<Self::Output, DisplayedError> {
        self.map_err(internal_error(msg))
    }
}

impl fmt::Display for DisplayedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayedError::UserError(msg, e) => write!(f, "User error: {msg}: {e:?}"),
            DisplayedError::InternalError(msg, e) => write!(f, "Internal error: {msg}: {e:?}"),
        }
    }
}
